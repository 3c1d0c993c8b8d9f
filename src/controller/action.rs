// src/controller/action.rs

//! Effects the state machine asks the controller to carry out.
//!
//! The machine never touches a bridge itself. It queues actions while it
//! handles an event, and the controller applies them in queue order once the
//! bridge call that delivered the event has returned.

use crate::controller::ViewState;
use crate::host::{AdEvent, RenderingSurface};
use crate::metrics::FollowUp;
use crate::router::UrlAction;
use std::fmt;

/// Which bridges a viewability change goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Primary,
    TwoPart,
    Both,
}

pub enum ControllerAction {
    /// Bind a fresh two-part bridge to `surface` and load `url` into it.
    AttachTwoPart {
        surface: Box<dyn RenderingSurface>,
        url: String,
    },
    /// Release the two-part bridge and its surface.
    DetachTwoPart,
    /// Tell the primary bridge, and a loaded two-part bridge, the new state.
    PublishViewState(ViewState),
    PublishViewability { audience: Audience, viewable: bool },
    /// Deliver a lifecycle callback to the host.
    Notify(AdEvent),
    /// Hand a classified URL to the host's router.
    Route { action: UrlAction, user_clicked: bool },
    /// Re-measure after the next layout pass.
    RefreshMetrics(Option<FollowUp>),
}

impl fmt::Debug for ControllerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerAction::AttachTwoPart { url, .. } => {
                f.debug_struct("AttachTwoPart").field("url", url).finish()
            }
            ControllerAction::DetachTwoPart => f.write_str("DetachTwoPart"),
            ControllerAction::PublishViewState(state) => {
                f.debug_tuple("PublishViewState").field(state).finish()
            }
            ControllerAction::PublishViewability { audience, viewable } => f
                .debug_struct("PublishViewability")
                .field("audience", audience)
                .field("viewable", viewable)
                .finish(),
            ControllerAction::Notify(event) => f.debug_tuple("Notify").field(event).finish(),
            ControllerAction::Route {
                action,
                user_clicked,
            } => f
                .debug_struct("Route")
                .field("action", action)
                .field("user_clicked", user_clicked)
                .finish(),
            ControllerAction::RefreshMetrics(follow_up) => {
                f.debug_tuple("RefreshMetrics").field(follow_up).finish()
            }
        }
    }
}
