// src/controller/mod.rs

//! The view-state controller.
//!
//! `ViewStateController` owns the primary bridge, the lazily created two-part
//! bridge and the [`ViewStateMachine`]. Host signals enter through the `on_*`
//! methods and `handle_navigation`; each is routed to the bridge of the
//! surface it concerns, with the machine standing in as that bridge's
//! listener. Once the bridge call returns, the controller applies whatever
//! [`ControllerAction`]s the machine queued, in order.
//!
//! Splitting it this way keeps every bridge borrow disjoint from the machine
//! borrow, so neither side ever needs a back-reference to the other.

pub mod action;
pub mod machine;
pub mod resize;
pub mod state;

pub use action::{Audience, ControllerAction};
pub use machine::ViewStateMachine;
pub use state::{PlacementType, ViewState};

use crate::bridge::{BridgeEvent, BridgeListener, CommandBridge};
use crate::config::Config;
use crate::error::CommandError;
use crate::host::{Container, HostHandles, RotationSubscription, SurfaceKind};
use crate::metrics::{FollowUp, MetricsTicket, MetricsWaiter, ScreenMetrics};
use crate::orientation::{MraidOrientation, OrientationCoordinator, Rotation};
use anyhow::Context;
use log::{debug, info, trace, warn};

/// Binds the machine to one bridge for the duration of a bridge call.
struct Dispatch<'a> {
    machine: &'a mut ViewStateMachine,
    origin: SurfaceKind,
}

impl BridgeListener for Dispatch<'_> {
    fn on_bridge_event(&mut self, event: BridgeEvent) -> Result<(), CommandError> {
        self.machine.handle_event(self.origin, event)
    }
}

pub struct ViewStateController {
    config: Config,
    bridge: CommandBridge,
    two_part_bridge: Option<CommandBridge>,
    machine: ViewStateMachine,
    waiter: MetricsWaiter,
    rotation_subscription: Option<RotationSubscription>,
    destroyed: bool,
}

impl ViewStateController {
    pub fn new(config: Config, placement: PlacementType, handles: HostHandles) -> Self {
        let HostHandles {
            view,
            activity,
            listener,
            router,
        } = handles;

        let bridge = CommandBridge::new(
            SurfaceKind::Primary,
            placement,
            config.bridge.clone(),
            config.limits,
        );
        let mut machine = ViewStateMachine::new(
            placement,
            view,
            listener,
            router,
            OrientationCoordinator::new(activity),
            config.bridge.clone(),
            config.close_region,
        );
        let rotation_subscription = Some(machine.watch_rotation());
        info!("ViewStateController: created for {} placement", placement);

        ViewStateController {
            config,
            bridge,
            two_part_bridge: None,
            machine,
            waiter: MetricsWaiter::new(),
            rotation_subscription,
            destroyed: false,
        }
    }

    /// Creates the primary surface, places it in the default container and
    /// loads the creative into it.
    pub fn load_content(&mut self, html: &str) -> anyhow::Result<()> {
        if self.destroyed {
            anyhow::bail!("Cannot load content into a destroyed controller");
        }
        let surface = self
            .machine
            .view_mut()
            .create_surface(SurfaceKind::Primary)
            .context("Failed to create the primary rendering surface")?;
        self.bridge.attach(surface);
        self.machine
            .view_mut()
            .attach_surface(SurfaceKind::Primary, Container::Default);
        self.bridge.set_content_html(html);
        Ok(())
    }

    // --- Host signals ---

    /// Navigation interception for the `kind` surface. Returns true when the
    /// navigation was consumed.
    pub fn handle_navigation(&mut self, kind: SurfaceKind, url: &str) -> bool {
        self.with_bridge(kind, |bridge, listener| {
            bridge.handle_navigation_attempt(url, listener)
        })
        .unwrap_or(false)
    }

    pub fn on_page_finished(&mut self, kind: SurfaceKind) {
        self.with_bridge(kind, |bridge, listener| bridge.handle_page_finished(listener));
    }

    pub fn on_user_click(&mut self, kind: SurfaceKind) {
        self.with_bridge(kind, |bridge, _| bridge.mark_clicked());
    }

    pub fn on_visibility_changed(&mut self, kind: SurfaceKind, visible: bool) {
        self.with_bridge(kind, |bridge, listener| {
            bridge.handle_visibility_changed(visible, listener)
        });
    }

    pub fn on_render_process_gone(&mut self, kind: SurfaceKind) {
        self.with_bridge(kind, |bridge, listener| {
            bridge.handle_render_process_gone(listener)
        });
    }

    /// The host finished the layout pass it was asked for under `ticket`.
    pub fn on_layout_pass(&mut self, ticket: MetricsTicket) {
        let Some(request) = self.waiter.complete(ticket) else {
            return;
        };
        if self.destroyed {
            return;
        }

        match self.machine.measure(request.surface) {
            Some(snapshot) => {
                self.machine.update_metrics(&snapshot);
                let metrics = self.machine.metrics();
                self.bridge.notify_screen_metrics(metrics);
                if let Some(two_part) = self.two_part_bridge.as_mut() {
                    if two_part.is_attached() {
                        two_part.notify_screen_metrics(metrics);
                    }
                }
            }
            None => warn!(
                "ViewStateController: {} surface not in the view tree, metrics unchanged",
                request.surface
            ),
        }

        for follow_up in request.follow_ups {
            match follow_up {
                FollowUp::AnnounceReady(kind) => self.announce_ready(kind),
            }
        }
    }

    /// Display rotation changed. Only geometry is refreshed.
    pub fn on_rotation_changed(&mut self, rotation: Rotation) {
        if self.destroyed {
            return;
        }
        if self.machine.orientation_mut().rotation_changed(rotation) {
            debug!("ViewStateController: rotation now {}", rotation.degrees());
            self.request_metrics(None);
        }
    }

    pub fn pause(&mut self, is_finishing: bool) {
        debug!("ViewStateController: pause (finishing: {})", is_finishing);
        self.machine.set_paused(true);
        self.set_surfaces_paused(true);
    }

    pub fn resume(&mut self) {
        debug!("ViewStateController: resume");
        self.machine.set_paused(false);
        self.set_surfaces_paused(false);
    }

    /// Releases both surfaces, cancels pending metrics, drops the rotation
    /// subscription and restores any orientation lock. Repeated calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            trace!("ViewStateController: already destroyed");
            return;
        }
        info!("ViewStateController: destroying");
        self.destroyed = true;

        self.waiter.cancel();
        if !self.machine.is_paused() {
            self.pause(true);
        }
        self.machine.release_views();
        self.bridge.detach();
        if let Some(mut two_part) = self.two_part_bridge.take() {
            two_part.detach();
        }
        if let Some(subscription) = self.rotation_subscription.take() {
            self.machine.unwatch_rotation(subscription);
        }
        self.machine.orientation_mut().unapply();
    }

    // --- Accessors ---

    pub fn view_state(&self) -> ViewState {
        self.machine.view_state()
    }

    pub fn placement_type(&self) -> PlacementType {
        self.machine.placement()
    }

    /// `(allowOrientationChange, forceOrientation)`.
    pub fn orientation_properties(&self) -> (bool, MraidOrientation) {
        self.machine.orientation().properties()
    }

    pub fn screen_metrics(&self) -> &ScreenMetrics {
        self.machine.metrics()
    }

    pub fn has_two_part(&self) -> bool {
        self.two_part_bridge.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- Internals ---

    fn with_bridge<R>(
        &mut self,
        kind: SurfaceKind,
        f: impl FnOnce(&mut CommandBridge, &mut dyn BridgeListener) -> R,
    ) -> Option<R> {
        let Self {
            bridge,
            two_part_bridge,
            machine,
            ..
        } = self;
        let target = match kind {
            SurfaceKind::Primary => Some(bridge),
            SurfaceKind::TwoPart => two_part_bridge.as_mut(),
        };
        let Some(target) = target else {
            debug!("ViewStateController: no {} bridge, dropping signal", kind);
            return None;
        };

        let mut dispatch = Dispatch {
            machine,
            origin: kind,
        };
        let result = f(target, &mut dispatch);
        self.dispatch_actions();
        Some(result)
    }

    fn dispatch_actions(&mut self) {
        for action in self.machine.take_actions() {
            trace!("ViewStateController: applying {:?}", action);
            match action {
                ControllerAction::AttachTwoPart { surface, url } => {
                    let mut two_part = CommandBridge::new(
                        SurfaceKind::TwoPart,
                        self.machine.placement(),
                        self.config.bridge.clone(),
                        self.config.limits,
                    );
                    two_part.attach(surface);
                    two_part.set_content_url(&url);
                    if let Some(mut previous) = self.two_part_bridge.replace(two_part) {
                        warn!("ViewStateController: replacing a live two-part bridge");
                        previous.detach();
                    }
                }
                ControllerAction::DetachTwoPart => {
                    if let Some(mut two_part) = self.two_part_bridge.take() {
                        two_part.detach();
                    }
                }
                ControllerAction::PublishViewState(state) => {
                    self.bridge.notify_view_state(state);
                    if let Some(two_part) = self.loaded_two_part() {
                        two_part.notify_view_state(state);
                    }
                }
                ControllerAction::PublishViewability { audience, viewable } => {
                    if audience != Audience::TwoPart {
                        self.bridge.notify_viewability(viewable);
                    }
                    if audience != Audience::Primary {
                        if let Some(two_part) = self.two_part_bridge.as_mut() {
                            two_part.notify_viewability(viewable);
                        }
                    }
                }
                ControllerAction::Notify(event) => self.machine.notify_host(event),
                ControllerAction::Route {
                    action,
                    user_clicked,
                } => self.machine.route(action, user_clicked),
                ControllerAction::RefreshMetrics(follow_up) => self.request_metrics(follow_up),
            }
        }
    }

    fn loaded_two_part(&mut self) -> Option<&mut CommandBridge> {
        self.two_part_bridge
            .as_mut()
            .filter(|two_part| two_part.is_loaded())
    }

    /// Schedules a metrics pass against the surface currently on top.
    fn request_metrics(&mut self, follow_up: Option<FollowUp>) {
        if self.destroyed {
            return;
        }
        let surface = if self.two_part_bridge.is_some() {
            SurfaceKind::TwoPart
        } else {
            SurfaceKind::Primary
        };
        let ticket = self.waiter.request(surface, follow_up);
        self.machine.request_layout_pass(ticket);
    }

    fn announce_ready(&mut self, kind: SurfaceKind) {
        let supports = self.machine.supports(kind);
        let placement = self.machine.placement();
        match kind {
            SurfaceKind::Primary => {
                let bridge = &mut self.bridge;
                bridge.notify_supports(&supports);
                bridge.notify_placement_type(placement);
                let visible = bridge.is_visible();
                bridge.notify_viewability(visible);
                bridge.notify_ready();
            }
            SurfaceKind::TwoPart => {
                let view_state = self.machine.view_state();
                let Some(bridge) = self.two_part_bridge.as_mut() else {
                    debug!("ViewStateController: two-part bridge gone before ready");
                    return;
                };
                bridge.notify_supports(&supports);
                bridge.notify_placement_type(placement);
                bridge.notify_view_state(view_state);
                let visible = bridge.is_visible();
                bridge.notify_viewability(visible);
                bridge.notify_ready();
            }
        }
        info!("ViewStateController: {} creative is ready", kind);
    }

    fn set_surfaces_paused(&mut self, paused: bool) {
        self.bridge.set_paused(paused);
        if let Some(two_part) = self.two_part_bridge.as_mut() {
            two_part.set_paused(paused);
        }
    }
}

impl Drop for ViewStateController {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests;
