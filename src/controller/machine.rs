// src/controller/machine.rs

//! The view-state machine: presentation state, placement and the command
//! handlers that move the ad between containers.

use super::action::{Audience, ControllerAction};
use super::resize::resolve_resize_rect;
use super::{PlacementType, ViewState};
use crate::bridge::{BridgeEvent, ResizeRequest};
use crate::capabilities::{NativeCapabilityProbe, Supports};
use crate::config::{BridgeConfig, CloseRegionConfig};
use crate::error::CommandError;
use crate::host::{
    AdEvent, AdListener, Container, OverlayFrame, RotationSubscription, SurfaceKind, UrlRouter,
    ViewHost,
};
use crate::metrics::{FollowUp, LayoutSnapshot, MetricsTicket, ScreenMetrics};
use crate::orientation::{MraidOrientation, OrientationCoordinator};
use crate::router::UrlAction;
use log::{debug, info, trace};
use std::mem;

/// The host callback owed for a `previous` to `next` transition, if any.
pub fn lifecycle_event(previous: ViewState, next: ViewState) -> Option<AdEvent> {
    use ViewState::*;
    match (previous, next) {
        (_, Expanded) => Some(AdEvent::Expanded),
        (Expanded, Default) => Some(AdEvent::Closed),
        (_, Hidden) => Some(AdEvent::Closed),
        (Resized, Default) => Some(AdEvent::Resized { to_original: true }),
        (_, Resized) => Some(AdEvent::Resized { to_original: false }),
        _ => None,
    }
}

pub struct ViewStateMachine {
    placement: PlacementType,
    view_state: ViewState,
    view: Box<dyn ViewHost>,
    listener: Box<dyn AdListener>,
    router: Box<dyn UrlRouter>,
    bridge_config: BridgeConfig,
    close_region: CloseRegionConfig,
    orientation: OrientationCoordinator,
    metrics: ScreenMetrics,
    two_part: bool,
    paused: bool,
    actions: Vec<ControllerAction>,
}

impl ViewStateMachine {
    pub fn new(
        placement: PlacementType,
        view: Box<dyn ViewHost>,
        listener: Box<dyn AdListener>,
        router: Box<dyn UrlRouter>,
        orientation: OrientationCoordinator,
        bridge_config: BridgeConfig,
        close_region: CloseRegionConfig,
    ) -> Self {
        let metrics = ScreenMetrics::new(view.density());
        ViewStateMachine {
            placement,
            view_state: ViewState::Loading,
            view,
            listener,
            router,
            bridge_config,
            close_region,
            orientation,
            metrics,
            two_part: false,
            paused: false,
            actions: Vec::new(),
        }
    }

    pub fn placement(&self) -> PlacementType {
        self.placement
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn has_two_part(&self) -> bool {
        self.two_part
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn metrics(&self) -> &ScreenMetrics {
        &self.metrics
    }

    pub fn orientation(&self) -> &OrientationCoordinator {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut OrientationCoordinator {
        &mut self.orientation
    }

    /// Drains the actions queued since the last call, in order.
    pub fn take_actions(&mut self) -> Vec<ControllerAction> {
        mem::take(&mut self.actions)
    }

    // --- Host access for the controller ---

    pub fn view_mut(&mut self) -> &mut dyn ViewHost {
        self.view.as_mut()
    }

    pub fn notify_host(&mut self, event: AdEvent) {
        debug!("ViewStateMachine: host event {:?}", event);
        self.listener.on_ad_event(event);
    }

    pub fn route(&mut self, action: UrlAction, user_clicked: bool) {
        self.router.route(action, user_clicked);
    }

    pub fn request_layout_pass(&mut self, ticket: MetricsTicket) {
        self.view.request_layout_pass(ticket);
    }

    pub fn measure(&self, surface: SurfaceKind) -> Option<LayoutSnapshot> {
        self.view.measure(surface)
    }

    pub fn update_metrics(&mut self, snapshot: &LayoutSnapshot) {
        self.metrics.update(snapshot);
    }

    pub fn supports(&self, surface: SurfaceKind) -> Supports {
        let handle = self.orientation.activity();
        let activity = handle.as_ref().map(|activity| activity.borrow());
        NativeCapabilityProbe::supports(self.view.as_ref(), activity.as_deref(), Some(surface))
    }

    pub fn watch_rotation(&mut self) -> RotationSubscription {
        self.view.watch_rotation()
    }

    pub fn unwatch_rotation(&mut self, subscription: RotationSubscription) {
        self.view.unwatch_rotation(subscription);
    }

    /// Pulls every surface out of the view tree, overlay included.
    pub fn release_views(&mut self) {
        self.view.remove_overlay();
        self.view.detach_surface(SurfaceKind::Primary);
        if mem::take(&mut self.two_part) {
            self.view.detach_surface(SurfaceKind::TwoPart);
        }
    }

    // --- Event handling ---

    /// Applies one bridge event that arrived from the `origin` surface.
    pub fn handle_event(
        &mut self,
        origin: SurfaceKind,
        event: BridgeEvent,
    ) -> Result<(), CommandError> {
        match event {
            BridgeEvent::PageLoaded => {
                self.handle_page_loaded(origin);
                Ok(())
            }
            BridgeEvent::PageFailed => {
                self.actions.push(ControllerAction::Notify(AdEvent::FailedToLoad));
                Ok(())
            }
            BridgeEvent::RenderLost => {
                self.actions
                    .push(ControllerAction::Notify(AdEvent::RenderProcessGone(origin)));
                Ok(())
            }
            BridgeEvent::VisibilityChanged(viewable) => {
                self.handle_visibility_changed(origin, viewable);
                Ok(())
            }
            BridgeEvent::Resize(request) => self.handle_resize(&request),
            BridgeEvent::Expand { url } => self.handle_expand(url),
            BridgeEvent::Close => {
                self.handle_close();
                Ok(())
            }
            BridgeEvent::SetOrientation {
                allow_orientation_change,
                force_orientation,
            } => self.handle_set_orientation(allow_orientation_change, force_orientation),
            BridgeEvent::Open { url, user_clicked } => {
                self.handle_open(&url, user_clicked);
                Ok(())
            }
        }
    }

    fn set_view_state(&mut self, next: ViewState, follow_up: Option<FollowUp>) {
        let previous = self.view_state;
        info!("ViewStateMachine: {} -> {}", previous, next);
        self.view_state = next;

        self.actions.push(ControllerAction::PublishViewState(next));
        if let Some(event) = lifecycle_event(previous, next) {
            self.actions.push(ControllerAction::Notify(event));
        }
        self.actions.push(ControllerAction::RefreshMetrics(follow_up));
    }

    fn handle_page_loaded(&mut self, origin: SurfaceKind) {
        match origin {
            SurfaceKind::Primary => {
                if self.view_state != ViewState::Loading {
                    trace!("ViewStateMachine: primary load outside LOADING ignored");
                    return;
                }
                self.set_view_state(
                    ViewState::Default,
                    Some(FollowUp::AnnounceReady(SurfaceKind::Primary)),
                );
                self.actions.push(ControllerAction::Notify(AdEvent::Loaded));
            }
            SurfaceKind::TwoPart => {
                self.actions.push(ControllerAction::RefreshMetrics(Some(
                    FollowUp::AnnounceReady(SurfaceKind::TwoPart),
                )));
            }
        }
    }

    fn handle_visibility_changed(&mut self, origin: SurfaceKind, viewable: bool) {
        let audience = match origin {
            // Covered by the two-part creative; its own signal is what counts.
            SurfaceKind::Primary if self.two_part => return,
            SurfaceKind::Primary => Audience::Primary,
            SurfaceKind::TwoPart => Audience::Both,
        };
        self.actions
            .push(ControllerAction::PublishViewability { audience, viewable });
    }

    fn handle_close(&mut self) {
        match self.view_state {
            ViewState::Loading | ViewState::Hidden => {
                trace!("ViewStateMachine: close ignored in {}", self.view_state);
                return;
            }
            _ => {}
        }

        if self.view_state == ViewState::Expanded || self.placement == PlacementType::Interstitial
        {
            self.orientation.unapply();
        }

        match self.view_state {
            ViewState::Resized | ViewState::Expanded => {
                if mem::take(&mut self.two_part) {
                    self.view.detach_surface(SurfaceKind::TwoPart);
                    self.actions.push(ControllerAction::DetachTwoPart);
                } else {
                    self.view.detach_surface(SurfaceKind::Primary);
                    self.view
                        .attach_surface(SurfaceKind::Primary, Container::Default);
                }
                self.view.set_default_container_visible(true);
                self.view.remove_overlay();
                self.set_view_state(ViewState::Default, None);
            }
            ViewState::Default => {
                self.view.set_default_container_visible(false);
                self.set_view_state(ViewState::Hidden, None);
            }
            ViewState::Loading | ViewState::Hidden => {}
        }
    }

    fn handle_resize(&mut self, request: &ResizeRequest) -> Result<(), CommandError> {
        match self.view_state {
            ViewState::Loading | ViewState::Hidden => {
                trace!("ViewStateMachine: resize ignored in {}", self.view_state);
                return Ok(());
            }
            ViewState::Expanded => {
                return Err(CommandError::IllegalState(
                    "Not allowed to resize from an already expanded ad",
                ))
            }
            ViewState::Default | ViewState::Resized => {}
        }
        if self.placement == PlacementType::Interstitial {
            return Err(CommandError::IllegalState(
                "Not allowed to resize from an interstitial ad",
            ));
        }

        let rect = resolve_resize_rect(request, &self.metrics, &self.close_region)?;
        debug!("ViewStateMachine: resizing to {:?}", rect);

        if self.view_state == ViewState::Default {
            self.view.detach_surface(SurfaceKind::Primary);
            self.view.set_default_container_visible(false);
            self.view
                .attach_surface(SurfaceKind::Primary, Container::Overlay);
        }
        self.view.show_overlay(OverlayFrame::At(rect));
        self.set_view_state(ViewState::Resized, None);
        Ok(())
    }

    fn handle_expand(&mut self, url: Option<String>) -> Result<(), CommandError> {
        if self.placement == PlacementType::Interstitial {
            trace!("ViewStateMachine: expand ignored for interstitial");
            return Ok(());
        }
        if !matches!(self.view_state, ViewState::Default | ViewState::Resized) {
            trace!("ViewStateMachine: expand ignored in {}", self.view_state);
            return Ok(());
        }

        self.orientation.apply()?;

        let two_part = match url {
            Some(url) => match self.view.create_surface(SurfaceKind::TwoPart) {
                Ok(surface) => Some((surface, url)),
                Err(err) => {
                    self.orientation.unapply();
                    return Err(CommandError::host(err));
                }
            },
            None => None,
        };
        let is_two_part = two_part.is_some();

        match self.view_state {
            ViewState::Default if is_two_part => {
                self.view
                    .attach_surface(SurfaceKind::TwoPart, Container::Overlay);
            }
            ViewState::Default => {
                self.view.detach_surface(SurfaceKind::Primary);
                self.view.set_default_container_visible(false);
                self.view
                    .attach_surface(SurfaceKind::Primary, Container::Overlay);
            }
            ViewState::Resized if is_two_part => {
                self.view.detach_surface(SurfaceKind::Primary);
                self.view
                    .attach_surface(SurfaceKind::Primary, Container::Default);
                self.view.set_default_container_visible(false);
                self.view
                    .attach_surface(SurfaceKind::TwoPart, Container::Overlay);
            }
            _ => {}
        }
        self.view.show_overlay(OverlayFrame::Fill);

        if let Some((surface, url)) = two_part {
            self.two_part = true;
            self.actions
                .push(ControllerAction::AttachTwoPart { surface, url });
        }
        self.set_view_state(ViewState::Expanded, None);
        Ok(())
    }

    fn handle_set_orientation(
        &mut self,
        allow_orientation_change: bool,
        force_orientation: MraidOrientation,
    ) -> Result<(), CommandError> {
        self.orientation
            .set_properties(allow_orientation_change, force_orientation)?;

        let applies_now = self.view_state == ViewState::Expanded
            || (self.placement == PlacementType::Interstitial && !self.paused);
        if applies_now {
            self.orientation.apply()?;
        }
        Ok(())
    }

    fn handle_open(&mut self, url: &str, user_clicked: bool) {
        let action = UrlAction::classify(url, &self.bridge_config);
        self.actions.push(ControllerAction::Notify(AdEvent::Opened));
        self.actions.push(ControllerAction::Route {
            action,
            user_clicked,
        });
    }
}
