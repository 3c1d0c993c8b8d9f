// src/host/mod.rs

//! Collaborator interfaces the controller consumes from its host.
//!
//! The host owns the view tree, the script-capable rendering surfaces and the
//! activity whose orientation may be locked. The controller never touches any
//! of these directly; it only talks through the traits below, which keeps the
//! state machine testable against the in-memory [`headless::HeadlessHost`].
//!
//! Host-to-controller signals (navigation attempts, page loads, clicks,
//! visibility, layout passes, rotation) are delivered by calling the matching
//! `ViewStateController::on_*` method from the host's UI thread.

pub mod headless;

use crate::capabilities::{ViewLayer, WindowFlags};
use crate::geometry::Rect;
use crate::metrics::{LayoutSnapshot, MetricsTicket};
use crate::orientation::{
    current_screen_orientation, ActivityDeclaration, DeviceOrientation, Rotation,
    ScreenOrientation,
};
use crate::router::UrlAction;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

/// Which of the two rendering surfaces an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// The surface the ad creative is rendered into.
    Primary,
    /// The secondary surface that only exists while a two-part expand is showing.
    TwoPart,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Primary => f.write_str("primary"),
            SurfaceKind::TwoPart => f.write_str("two-part"),
        }
    }
}

/// The container a surface is parented into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// The inline slot the ad occupies before any resize or expand.
    Default,
    /// The closeable overlay attached to the root view.
    Overlay,
}

/// Frame of the closeable overlay, relative to the root view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayFrame {
    /// Covers the whole root view (expanded).
    Fill,
    /// Sits at the given rect (resized).
    At(Rect),
}

/// Handle for a rotation-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotationSubscription {
    pub id: u64,
}

/// One-shot lifecycle callbacks delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdEvent {
    /// The primary creative finished loading.
    Loaded,
    /// The creative reported that it could not load.
    FailedToLoad,
    Expanded,
    Closed,
    /// `to_original` is true when leaving `RESIZED` back to `DEFAULT`.
    Resized { to_original: bool },
    /// The user clicked through to a URL.
    Opened,
    /// A surface's rendering process died; nothing more can be delivered to it.
    RenderProcessGone(SurfaceKind),
}

/// A script-capable view that renders a creative.
pub trait RenderingSurface {
    fn load_html(&mut self, html: &str);

    fn load_url(&mut self, url: &str);

    /// Runs `script` in the creative's context. Fire-and-forget.
    fn evaluate_script(&mut self, script: &str);

    fn set_paused(&mut self, paused: bool);

    /// Releases the surface. No further calls are made afterwards.
    fn destroy(&mut self);
}

/// The host's view and measurement system.
pub trait ViewHost {
    /// Creates a new rendering surface for `kind`.
    fn create_surface(&mut self, kind: SurfaceKind) -> anyhow::Result<Box<dyn RenderingSurface>>;

    /// Pixels per dip.
    fn density(&self) -> f32;

    /// Parents the surface into `container`, filling it.
    fn attach_surface(&mut self, kind: SurfaceKind, container: Container);

    /// Removes the surface from whatever container holds it.
    fn detach_surface(&mut self, kind: SurfaceKind);

    fn set_default_container_visible(&mut self, visible: bool);

    /// Adds the closeable overlay to the root view, or moves it if already shown.
    fn show_overlay(&mut self, frame: OverlayFrame);

    fn remove_overlay(&mut self);

    /// Asks for `ticket` to be reported via `on_layout_pass` after the next
    /// layout pass. Must not call back synchronously.
    fn request_layout_pass(&mut self, ticket: MetricsTicket);

    /// Measures the tree, taking `current` as the surface whose position is
    /// the current ad rect. `None` when the surface is not in the tree.
    fn measure(&self, current: SurfaceKind) -> Option<LayoutSnapshot>;

    /// Compositing layers from the surface up to the root.
    fn layer_chain(&self, kind: SurfaceKind) -> Vec<ViewLayer>;

    fn watch_rotation(&mut self) -> RotationSubscription;

    fn unwatch_rotation(&mut self, subscription: RotationSubscription);
}

/// The activity hosting the ad, whose orientation can be locked.
pub trait HostActivity {
    fn requested_orientation(&self) -> ScreenOrientation;

    fn set_requested_orientation(&mut self, orientation: ScreenOrientation);

    /// The activity's declared orientation constraints, if obtainable.
    fn declaration(&self) -> Option<ActivityDeclaration>;

    fn device_orientation(&self) -> DeviceOrientation;

    fn rotation(&self) -> Rotation;

    fn window_flags(&self) -> WindowFlags;

    /// The concrete orientation currently on screen.
    fn current_orientation(&self) -> ScreenOrientation {
        current_screen_orientation(self.device_orientation(), self.rotation())
    }
}

/// Receives lifecycle callbacks.
pub trait AdListener {
    fn on_ad_event(&mut self, event: AdEvent);
}

/// Performs platform navigation for URLs the creative opens.
pub trait UrlRouter {
    fn route(&mut self, action: UrlAction, user_clicked: bool);
}

/// Everything a controller is constructed with.
pub struct HostHandles {
    pub view: Box<dyn ViewHost>,
    /// Optional, and possibly outlived by the controller.
    pub activity: Option<Weak<RefCell<dyn HostActivity>>>,
    pub listener: Box<dyn AdListener>,
    pub router: Box<dyn UrlRouter>,
}
