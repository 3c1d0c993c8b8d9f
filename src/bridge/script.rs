// src/bridge/script.rs

//! Builders for the one-way notifications pushed into the creative.
//!
//! Each function returns the exact script text handed to
//! `RenderingSurface::evaluate_script`. String arguments are emitted as JSON
//! string literals so creative-controlled text cannot break out of the call.

use crate::capabilities::Supports;
use crate::controller::{PlacementType, ViewState};
use crate::geometry::Rect;
use crate::metrics::ScreenMetrics;
use serde_json::Value;

fn quoted(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

pub fn ready() -> String {
    "mraidbridge.notifyReadyEvent();".to_string()
}

pub fn error(command: &str, message: &str) -> String {
    format!(
        "window.mraidbridge.notifyErrorEvent({}, {})",
        quoted(command),
        quoted(message)
    )
}

pub fn native_call_complete(command: &str) -> String {
    format!("window.mraidbridge.nativeCallComplete({})", quoted(command))
}

pub fn view_state(state: ViewState) -> String {
    format!("mraidbridge.setState({})", quoted(state.as_protocol()))
}

pub fn placement_type(placement: PlacementType) -> String {
    format!(
        "mraidbridge.setPlacementType({})",
        quoted(placement.as_protocol())
    )
}

pub fn viewable(viewable: bool) -> String {
    format!("mraidbridge.setIsViewable({})", viewable)
}

pub fn supports(supports: &Supports) -> String {
    format!(
        "mraidbridge.setSupports({},{},{},{},{})",
        supports.sms,
        supports.telephone,
        supports.calendar,
        supports.store_picture,
        supports.inline_video
    )
}

fn position(rect: Rect) -> String {
    format!(
        "{},{},{},{}",
        rect.left,
        rect.top,
        rect.width(),
        rect.height()
    )
}

/// Screen, max, current and default geometry in dips, followed by the
/// size-change event for the current ad size.
pub fn screen_metrics(metrics: &ScreenMetrics) -> String {
    let screen = metrics.screen_rect_dips();
    let max = metrics.root_view_rect_dips();
    let current = metrics.current_ad_rect_dips();
    let default = metrics.default_ad_rect_dips();
    format!(
        "mraidbridge.setScreenSize({},{});mraidbridge.setMaxSize({},{});\
         mraidbridge.setCurrentPosition({});mraidbridge.setDefaultPosition({});\
         mraidbridge.notifySizeChangeEvent({},{})",
        screen.width(),
        screen.height(),
        max.width(),
        max.height(),
        position(current),
        position(default),
        current.width(),
        current.height()
    )
}
