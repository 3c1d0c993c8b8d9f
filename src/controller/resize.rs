// src/controller/resize.rs

//! Resolution of a resize request into an overlay rect.

use crate::bridge::ResizeRequest;
use crate::config::CloseRegionConfig;
use crate::error::GeometryError;
use crate::geometry::{close_region, dips_to_px, Rect};
use crate::metrics::ScreenMetrics;
use log::trace;

/// Computes the root-relative pixel rect for `request`.
///
/// The rect starts at the default ad position plus the requested offset.
/// Without `allow_offscreen` it must fit inside the root view and is shifted
/// back inside it if needed. In every case the close region must lie inside
/// both the root view and the rect itself. Nothing is mutated here, so a
/// rejected request leaves the presentation untouched.
pub fn resolve_resize_rect(
    request: &ResizeRequest,
    metrics: &ScreenMetrics,
    close: &CloseRegionConfig,
) -> Result<Rect, GeometryError> {
    let density = metrics.density();
    let root = metrics.root_view_rect();
    let default_ad = metrics.default_ad_rect();

    let mut rect = Rect::from_xywh(
        default_ad.left + dips_to_px(request.offset_x, density),
        default_ad.top + dips_to_px(request.offset_y, density),
        dips_to_px(request.width, density),
        dips_to_px(request.height, density),
    );

    if !request.allow_offscreen {
        if rect.width() > root.width() || rect.height() > root.height() {
            let max = metrics.root_view_rect_dips();
            return Err(GeometryError::ExceedsMaxSize {
                request: *request,
                max_width: max.width(),
                max_height: max.height(),
            });
        }
        let left = rect.left.min(root.right - rect.width()).max(root.left);
        let top = rect.top.min(root.bottom - rect.height()).max(root.top);
        rect.offset_to(left, top);
    }

    let close_rect = close_region(&rect, dips_to_px(close.size_dips, density), close.position);
    trace!("resolve_resize_rect: rect {:?}, close region {:?}", rect, close_rect);

    if !root.contains(&close_rect) {
        let max = metrics.root_view_rect_dips();
        return Err(GeometryError::CloseRegionOffscreen {
            request: *request,
            max_width: max.width(),
            max_height: max.height(),
        });
    }
    if !rect.contains(&close_rect) {
        return Err(GeometryError::CloseRegionOutsideAd { request: *request });
    }
    Ok(rect)
}
