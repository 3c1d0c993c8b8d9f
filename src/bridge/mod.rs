// src/bridge/mod.rs

//! The command bridge between a creative and its host.
//!
//! A `CommandBridge` is bound to one rendering surface. It intercepts the
//! surface's navigation attempts, turns command-scheme URLs into typed
//! [`BridgeEvent`]s for its listener, and pushes one-way notifications back
//! into the creative's script context.
//!
//! No command failure escapes `handle_navigation_attempt`: every error is
//! converted into an error notification, and every command is followed by
//! exactly one native-call-complete notification.

pub mod command;
pub mod params;
pub mod script;

pub use command::{Command, MraidCommand, ResizeRequest};
pub use params::Params;

use crate::capabilities::Supports;
use crate::config::{BridgeConfig, LimitsConfig};
use crate::controller::{PlacementType, ViewState};
use crate::error::{CommandError, ParseError};
use crate::host::{RenderingSurface, SurfaceKind};
use crate::metrics::ScreenMetrics;
use crate::orientation::MraidOrientation;
use log::{debug, info, trace, warn};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Everything a bridge reports to its listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The surface finished loading its content for the first time.
    PageLoaded,
    /// The creative reported that it failed to load.
    PageFailed,
    /// The surface's rendering process died and the surface was released.
    RenderLost,
    VisibilityChanged(bool),
    Resize(ResizeRequest),
    Expand { url: Option<String> },
    Close,
    SetOrientation {
        allow_orientation_change: bool,
        force_orientation: MraidOrientation,
    },
    Open { url: String, user_clicked: bool },
}

/// Receives a bridge's events. Command events may be rejected with an error,
/// which the bridge reports back to the creative.
pub trait BridgeListener {
    fn on_bridge_event(&mut self, event: BridgeEvent) -> Result<(), CommandError>;
}

/// Protocol endpoint for one rendering surface.
pub struct CommandBridge {
    kind: SurfaceKind,
    placement: PlacementType,
    config: BridgeConfig,
    limits: LimitsConfig,
    surface: Option<Box<dyn RenderingSurface>>,
    ever_attached: bool,
    has_loaded: bool,
    clicked: bool,
    visible: bool,
}

impl CommandBridge {
    pub fn new(
        kind: SurfaceKind,
        placement: PlacementType,
        config: BridgeConfig,
        limits: LimitsConfig,
    ) -> Self {
        CommandBridge {
            kind,
            placement,
            config,
            limits,
            surface: None,
            ever_attached: false,
            has_loaded: false,
            clicked: false,
            visible: true,
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Binds the bridge to its surface. A bridge binds at most once; a
    /// second surface is released immediately.
    pub fn attach(&mut self, mut surface: Box<dyn RenderingSurface>) {
        if self.ever_attached {
            warn!(
                "CommandBridge[{}]: already bound to a surface, releasing the new one",
                self.kind
            );
            surface.destroy();
            return;
        }
        debug!("CommandBridge[{}]: attached", self.kind);
        self.ever_attached = true;
        self.surface = Some(surface);
    }

    /// Releases the surface, if any.
    pub fn detach(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            debug!("CommandBridge[{}]: detaching and releasing surface", self.kind);
            surface.destroy();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Whether the surface has completed its first page load.
    pub fn is_loaded(&self) -> bool {
        self.has_loaded
    }

    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    /// Records a user gesture on the surface. Sticky for the bridge's lifetime.
    pub fn mark_clicked(&mut self) {
        if !self.clicked {
            trace!("CommandBridge[{}]: user click observed", self.kind);
        }
        self.clicked = true;
    }

    /// Last visibility the host reported for this bridge's own surface.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_content_html(&mut self, html: &str) {
        match self.surface.as_mut() {
            Some(surface) => surface.load_html(html),
            None => warn!("CommandBridge[{}]: no surface to load HTML into", self.kind),
        }
    }

    pub fn set_content_url(&mut self, url: &str) {
        match self.surface.as_mut() {
            Some(surface) => surface.load_url(url),
            None => warn!("CommandBridge[{}]: no surface to load {} into", self.kind, url),
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_paused(paused);
        }
    }

    // --- Host signals ---

    /// Reports the first completed page load. Later loads are ignored.
    pub fn handle_page_finished(&mut self, listener: &mut dyn BridgeListener) {
        if self.has_loaded {
            trace!("CommandBridge[{}]: ignoring repeated page load", self.kind);
            return;
        }
        self.has_loaded = true;
        info!("CommandBridge[{}]: page loaded", self.kind);
        self.emit(BridgeEvent::PageLoaded, listener);
    }

    pub fn handle_visibility_changed(&mut self, visible: bool, listener: &mut dyn BridgeListener) {
        self.visible = visible;
        self.emit(BridgeEvent::VisibilityChanged(visible), listener);
    }

    /// The surface cannot be used any more; it is dropped before the listener hears of it.
    pub fn handle_render_process_gone(&mut self, listener: &mut dyn BridgeListener) {
        warn!("CommandBridge[{}]: render process gone", self.kind);
        self.detach();
        self.emit(BridgeEvent::RenderLost, listener);
    }

    /// Returns true when the navigation was consumed by the bridge, false
    /// when the surface should proceed with it as an ordinary navigation.
    pub fn handle_navigation_attempt(
        &mut self,
        raw: &str,
        listener: &mut dyn BridgeListener,
    ) -> bool {
        trace!("CommandBridge[{}]: navigation attempt to '{}'", self.kind, raw);
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(_) => {
                let err = CommandError::from(ParseError::InvalidUrl(raw.to_string()));
                self.notify_error(MraidCommand::Unspecified, &err);
                return true;
            }
        };

        if url.scheme() == self.config.page_scheme {
            if url.host_str() == Some(self.config.fail_load_host.as_str())
                && self.placement == PlacementType::Inline
            {
                self.emit(BridgeEvent::PageFailed, listener);
            }
            return true;
        }

        let url = if self.clicked && url.scheme() != self.config.command_scheme {
            let rewritten = format!(
                "{}://{}?url={}",
                self.config.command_scheme,
                MraidCommand::Open,
                byte_serialize(raw.as_bytes()).collect::<String>()
            );
            debug!(
                "CommandBridge[{}]: rewriting clicked navigation as '{}'",
                self.kind, rewritten
            );
            match Url::parse(&rewritten) {
                Ok(url) => url,
                Err(_) => {
                    let err = CommandError::from(ParseError::InvalidUrl(rewritten));
                    self.notify_error(MraidCommand::Open, &err);
                    return true;
                }
            }
        } else {
            url
        };

        if url.scheme() != self.config.command_scheme {
            return false;
        }

        let kind = match Command::from_url(&url) {
            Ok(command) => {
                if let Err(err) = self.run_command(&command, listener) {
                    self.notify_error(command.kind, &err);
                }
                command.kind
            }
            Err((kind, err)) => {
                self.notify_error(kind, &err.into());
                kind
            }
        };
        // Completion echoes the name the creative issued, even when unknown.
        let issued = url
            .host_str()
            .filter(|host| !host.is_empty())
            .unwrap_or(kind.as_protocol());
        self.notify_native_call_complete(issued);
        true
    }

    fn run_command(
        &mut self,
        command: &Command,
        listener: &mut dyn BridgeListener,
    ) -> Result<(), CommandError> {
        if command.kind.requires_click(self.placement) && !self.clicked {
            return Err(CommandError::RequiresClick);
        }
        if self.surface.is_none() {
            return Err(CommandError::NoSurface);
        }
        let event = command.to_event(&self.limits, self.clicked)?;
        debug!("CommandBridge[{}]: running {:?}", self.kind, event);
        listener.on_bridge_event(event)
    }

    fn emit(&mut self, event: BridgeEvent, listener: &mut dyn BridgeListener) {
        trace!("CommandBridge[{}]: emitting {:?}", self.kind, event);
        if let Err(err) = listener.on_bridge_event(event) {
            warn!("CommandBridge[{}]: listener rejected host signal: {}", self.kind, err);
        }
    }

    // --- Notifications to the creative ---

    fn inject(&mut self, script: String) {
        match self.surface.as_mut() {
            Some(surface) => {
                trace!("CommandBridge[{}]: injecting {}", self.kind, script);
                surface.evaluate_script(&script);
            }
            None => debug!(
                "CommandBridge[{}]: no surface, dropping {}",
                self.kind, script
            ),
        }
    }

    pub fn notify_error(&mut self, command: MraidCommand, err: &CommandError) {
        warn!("CommandBridge[{}]: {} failed: {}", self.kind, command, err);
        self.inject(script::error(command.as_protocol(), &err.to_string()));
    }

    pub fn notify_native_call_complete(&mut self, command: &str) {
        self.inject(script::native_call_complete(command));
    }

    pub fn notify_ready(&mut self) {
        self.inject(script::ready());
    }

    pub fn notify_view_state(&mut self, state: ViewState) {
        self.inject(script::view_state(state));
    }

    pub fn notify_placement_type(&mut self, placement: PlacementType) {
        self.inject(script::placement_type(placement));
    }

    pub fn notify_viewability(&mut self, viewable: bool) {
        self.inject(script::viewable(viewable));
    }

    pub fn notify_supports(&mut self, supports: &Supports) {
        self.inject(script::supports(supports));
    }

    pub fn notify_screen_metrics(&mut self, metrics: &ScreenMetrics) {
        self.inject(script::screen_metrics(metrics));
    }
}

#[cfg(test)]
mod tests;
