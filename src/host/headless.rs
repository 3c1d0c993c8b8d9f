// src/host/headless.rs

//! An in-memory host that records everything the controller does to it.
//!
//! `HeadlessHost` plays every collaborator role at once: view tree, listener
//! and URL router. Its activity half is handed out separately through
//! [`HeadlessHost::new_activity`] so callers can drop it to simulate the host
//! activity going away. All handles share one [`HeadlessState`], which tests
//! and the replay binary inspect afterwards.
//!
//! Geometry is derived from [`HeadlessConfig`]: a surface in the default
//! container sits at the default ad rect, one in the overlay sits at the
//! overlay frame (or fills the root).

use super::{
    AdEvent, AdListener, Container, HostActivity, HostHandles, OverlayFrame, RenderingSurface,
    RotationSubscription, SurfaceKind, UrlRouter, ViewHost,
};
use crate::capabilities::{LayerType, ViewLayer, WindowFlags};
use crate::config::HeadlessConfig;
use crate::metrics::{LayoutSnapshot, MetricsTicket};
use crate::orientation::{ActivityDeclaration, DeviceOrientation, Rotation, ScreenOrientation};
use crate::router::UrlAction;
use log::{debug, trace};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::mem;
use std::rc::Rc;

/// Number of views between a surface and the root in the simulated tree.
const SIMULATED_VIEW_DEPTH: usize = 3;

/// What happened to one rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceRecord {
    pub kind: Option<SurfaceKind>,
    /// HTML documents and URLs loaded, in order.
    pub loads: Vec<String>,
    pub scripts: Vec<String>,
    pub paused: bool,
    pub destroyed: bool,
}

#[derive(Debug)]
pub struct HeadlessState {
    config: HeadlessConfig,
    surfaces: Vec<SurfaceRecord>,
    slots: BTreeMap<SurfaceKind, Container>,
    default_container_visible: bool,
    overlay: Option<OverlayFrame>,
    layout_tickets: Vec<MetricsTicket>,
    events: Vec<AdEvent>,
    routed: Vec<(UrlAction, bool)>,
    requested_orientation: ScreenOrientation,
    rotation: Rotation,
    next_subscription: u64,
    rotation_watch: Option<RotationSubscription>,
    fail_surface_creation: bool,
    journal: Vec<String>,
}

impl HeadlessState {
    fn new(config: HeadlessConfig) -> Self {
        HeadlessState {
            requested_orientation: config.activity.screen_orientation,
            rotation: config.rotation,
            config,
            surfaces: Vec::new(),
            slots: BTreeMap::new(),
            default_container_visible: true,
            overlay: None,
            layout_tickets: Vec::new(),
            events: Vec::new(),
            routed: Vec::new(),
            next_subscription: 0,
            rotation_watch: None,
            fail_surface_creation: false,
            journal: Vec::new(),
        }
    }

    fn latest(&self, kind: SurfaceKind) -> Option<&SurfaceRecord> {
        self.surfaces
            .iter()
            .rev()
            .find(|record| record.kind == Some(kind))
    }
}

/// The simulated view tree, listener and router.
#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    pub fn new(config: HeadlessConfig) -> Self {
        HeadlessHost {
            state: Rc::new(RefCell::new(HeadlessState::new(config))),
        }
    }

    /// A host activity backed by this host's state.
    pub fn new_activity(&self) -> Rc<RefCell<dyn HostActivity>> {
        Rc::new(RefCell::new(HeadlessActivity {
            state: self.state.clone(),
        }))
    }

    /// Collaborator handles for a controller. Only a weak reference to
    /// `activity` is kept; the caller decides how long it lives.
    pub fn handles(&self, activity: Option<&Rc<RefCell<dyn HostActivity>>>) -> HostHandles {
        HostHandles {
            view: Box::new(self.clone()),
            activity: activity.map(Rc::downgrade),
            listener: Box::new(self.clone()),
            router: Box::new(self.clone()),
        }
    }

    // --- Inspection ---

    /// Scripts evaluated in the most recently created surface of `kind`.
    pub fn scripts_for(&self, kind: SurfaceKind) -> Vec<String> {
        self.state
            .borrow()
            .latest(kind)
            .map(|record| record.scripts.clone())
            .unwrap_or_default()
    }

    pub fn surface(&self, kind: SurfaceKind) -> Option<SurfaceRecord> {
        self.state.borrow().latest(kind).cloned()
    }

    /// Every surface ever created, in creation order.
    pub fn surfaces(&self) -> Vec<SurfaceRecord> {
        self.state.borrow().surfaces.clone()
    }

    pub fn live_surfaces(&self) -> Vec<SurfaceKind> {
        self.state
            .borrow()
            .surfaces
            .iter()
            .filter(|record| !record.destroyed)
            .filter_map(|record| record.kind)
            .collect()
    }

    pub fn events(&self) -> Vec<AdEvent> {
        self.state.borrow().events.clone()
    }

    pub fn routed(&self) -> Vec<(UrlAction, bool)> {
        self.state.borrow().routed.clone()
    }

    /// Layout passes requested since the last call, oldest first.
    pub fn take_layout_tickets(&self) -> Vec<MetricsTicket> {
        mem::take(&mut self.state.borrow_mut().layout_tickets)
    }

    pub fn slot(&self, kind: SurfaceKind) -> Option<Container> {
        self.state.borrow().slots.get(&kind).copied()
    }

    pub fn overlay(&self) -> Option<OverlayFrame> {
        self.state.borrow().overlay
    }

    pub fn default_container_visible(&self) -> bool {
        self.state.borrow().default_container_visible
    }

    pub fn requested_orientation(&self) -> ScreenOrientation {
        self.state.borrow().requested_orientation
    }

    pub fn watching_rotation(&self) -> bool {
        self.state.borrow().rotation_watch.is_some()
    }

    pub fn set_rotation(&self, rotation: Rotation) {
        self.state.borrow_mut().rotation = rotation;
    }

    /// Makes the next `create_surface` calls fail.
    pub fn set_fail_surface_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_surface_creation = fail;
    }

    /// Human-readable log of scripts, events and routed URLs since the last call.
    pub fn take_journal(&self) -> Vec<String> {
        mem::take(&mut self.state.borrow_mut().journal)
    }
}

struct HeadlessSurface {
    index: usize,
    kind: SurfaceKind,
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurface {
    fn record(&self, f: impl FnOnce(&mut SurfaceRecord)) {
        if let Some(record) = self.state.borrow_mut().surfaces.get_mut(self.index) {
            f(record);
        }
    }
}

impl RenderingSurface for HeadlessSurface {
    fn load_html(&mut self, html: &str) {
        self.record(|record| record.loads.push(html.to_string()));
    }

    fn load_url(&mut self, url: &str) {
        self.record(|record| record.loads.push(url.to_string()));
    }

    fn evaluate_script(&mut self, script: &str) {
        self.record(|record| record.scripts.push(script.to_string()));
        self.state
            .borrow_mut()
            .journal
            .push(format!("script[{}] {}", self.kind, script));
    }

    fn set_paused(&mut self, paused: bool) {
        self.record(|record| record.paused = paused);
    }

    fn destroy(&mut self) {
        trace!("HeadlessSurface: {} surface destroyed", self.kind);
        self.record(|record| record.destroyed = true);
    }
}

impl ViewHost for HeadlessHost {
    fn create_surface(&mut self, kind: SurfaceKind) -> anyhow::Result<Box<dyn RenderingSurface>> {
        let mut state = self.state.borrow_mut();
        if state.fail_surface_creation {
            anyhow::bail!("Headless host refused to create a {} surface", kind);
        }
        state.surfaces.push(SurfaceRecord {
            kind: Some(kind),
            ..Default::default()
        });
        let index = state.surfaces.len() - 1;
        debug!("HeadlessHost: created {} surface #{}", kind, index);
        Ok(Box::new(HeadlessSurface {
            index,
            kind,
            state: self.state.clone(),
        }))
    }

    fn density(&self) -> f32 {
        self.state.borrow().config.density
    }

    fn attach_surface(&mut self, kind: SurfaceKind, container: Container) {
        self.state.borrow_mut().slots.insert(kind, container);
    }

    fn detach_surface(&mut self, kind: SurfaceKind) {
        self.state.borrow_mut().slots.remove(&kind);
    }

    fn set_default_container_visible(&mut self, visible: bool) {
        self.state.borrow_mut().default_container_visible = visible;
    }

    fn show_overlay(&mut self, frame: OverlayFrame) {
        self.state.borrow_mut().overlay = Some(frame);
    }

    fn remove_overlay(&mut self) {
        self.state.borrow_mut().overlay = None;
    }

    fn request_layout_pass(&mut self, ticket: MetricsTicket) {
        self.state.borrow_mut().layout_tickets.push(ticket);
    }

    fn measure(&self, current: SurfaceKind) -> Option<LayoutSnapshot> {
        let state = self.state.borrow();
        let config = &state.config;
        let current_ad = match state.slots.get(&current)? {
            Container::Default => config.default_ad,
            Container::Overlay => match state.overlay? {
                OverlayFrame::Fill => config.root,
                OverlayFrame::At(rect) => rect.translated(config.root.left, config.root.top),
            },
        };
        Some(LayoutSnapshot {
            screen_width_px: config.screen_width_px,
            screen_height_px: config.screen_height_px,
            root_view: config.root,
            default_ad: config.default_ad,
            current_ad,
        })
    }

    fn layer_chain(&self, kind: SurfaceKind) -> Vec<ViewLayer> {
        let state = self.state.borrow();
        if !state.slots.contains_key(&kind) {
            return Vec::new();
        }
        let layer = if state.config.views_accelerated {
            ViewLayer::accelerated()
        } else {
            ViewLayer {
                hardware_accelerated: false,
                layer_type: LayerType::Software,
            }
        };
        vec![layer; SIMULATED_VIEW_DEPTH]
    }

    fn watch_rotation(&mut self) -> RotationSubscription {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let subscription = RotationSubscription {
            id: state.next_subscription,
        };
        state.rotation_watch = Some(subscription);
        subscription
    }

    fn unwatch_rotation(&mut self, subscription: RotationSubscription) {
        let mut state = self.state.borrow_mut();
        if state.rotation_watch == Some(subscription) {
            state.rotation_watch = None;
        }
    }
}

impl AdListener for HeadlessHost {
    fn on_ad_event(&mut self, event: AdEvent) {
        let mut state = self.state.borrow_mut();
        state.events.push(event);
        state.journal.push(format!("event {:?}", event));
    }
}

impl UrlRouter for HeadlessHost {
    fn route(&mut self, action: UrlAction, user_clicked: bool) {
        let mut state = self.state.borrow_mut();
        state
            .journal
            .push(format!("route {:?} clicked={}", action, user_clicked));
        state.routed.push((action, user_clicked));
    }
}

/// The activity half of the headless host.
pub struct HeadlessActivity {
    state: Rc<RefCell<HeadlessState>>,
}

impl HostActivity for HeadlessActivity {
    fn requested_orientation(&self) -> ScreenOrientation {
        self.state.borrow().requested_orientation
    }

    fn set_requested_orientation(&mut self, orientation: ScreenOrientation) {
        debug!("HeadlessActivity: requested orientation {:?}", orientation);
        self.state.borrow_mut().requested_orientation = orientation;
    }

    fn declaration(&self) -> Option<ActivityDeclaration> {
        Some(self.state.borrow().config.activity)
    }

    fn device_orientation(&self) -> DeviceOrientation {
        self.state.borrow().config.device_orientation
    }

    fn rotation(&self) -> Rotation {
        self.state.borrow().rotation
    }

    fn window_flags(&self) -> WindowFlags {
        self.state.borrow().config.window_flags
    }
}
