// src/controller/tests.rs

use super::machine::lifecycle_event;
use super::resize::resolve_resize_rect;
use super::*;
use crate::bridge::ResizeRequest;
use crate::config::CloseRegionConfig;
use crate::error::GeometryError;
use crate::geometry::{close_region, dips_to_px, ClosePosition, Rect};
use crate::host::AdEvent;
use crate::metrics::{LayoutSnapshot, ScreenMetrics};

fn metrics(density: f32, root: Rect, default_ad: Rect) -> ScreenMetrics {
    let mut metrics = ScreenMetrics::new(density);
    metrics.update(&LayoutSnapshot {
        screen_width_px: root.right,
        screen_height_px: root.bottom,
        root_view: root,
        default_ad,
        current_ad: default_ad,
    });
    metrics
}

fn request(width: i32, height: i32, offset_x: i32, offset_y: i32, allow_offscreen: bool) -> ResizeRequest {
    ResizeRequest {
        width,
        height,
        offset_x,
        offset_y,
        allow_offscreen,
    }
}

#[test_log::test]
fn lifecycle_callbacks_follow_transitions() {
    use ViewState::*;
    assert_eq!(lifecycle_event(Loading, Default), None);
    assert_eq!(lifecycle_event(Default, Expanded), Some(AdEvent::Expanded));
    assert_eq!(lifecycle_event(Resized, Expanded), Some(AdEvent::Expanded));
    assert_eq!(lifecycle_event(Expanded, Default), Some(AdEvent::Closed));
    assert_eq!(lifecycle_event(Default, Hidden), Some(AdEvent::Closed));
    assert_eq!(
        lifecycle_event(Resized, Default),
        Some(AdEvent::Resized { to_original: true })
    );
    assert_eq!(
        lifecycle_event(Default, Resized),
        Some(AdEvent::Resized { to_original: false })
    );
    assert_eq!(
        lifecycle_event(Resized, Resized),
        Some(AdEvent::Resized { to_original: false })
    );
}

#[test_log::test]
fn full_root_resize_fits_and_oversize_fails() {
    let metrics = metrics(1.0, Rect::new(0, 0, 100, 100), Rect::new(0, 0, 100, 50));
    let close = CloseRegionConfig::default();

    assert_eq!(
        resolve_resize_rect(&request(100, 100, 0, 0, true), &metrics, &close),
        Ok(Rect::new(0, 0, 100, 100))
    );
    assert!(matches!(
        resolve_resize_rect(&request(150, 150, 0, 0, true), &metrics, &close),
        Err(GeometryError::CloseRegionOffscreen { .. })
    ));
}

#[test_log::test]
fn close_region_taller_than_ad_is_rejected() {
    let metrics = metrics(1.0, Rect::new(0, 0, 100, 100), Rect::new(0, 0, 100, 50));
    let close = CloseRegionConfig::default();

    let err = resolve_resize_rect(&request(100, 49, 25, 25, false), &metrics, &close)
        .expect_err("49 dips cannot hold a 50 dip close region");
    assert_eq!(
        err,
        GeometryError::CloseRegionOutsideAd {
            request: request(100, 49, 25, 25, false)
        }
    );
    assert_eq!(
        err.to_string(),
        "resizeProperties specified a size (100, 49) and offset (25, 25) that doesn't allow the close region to appear within the resized ad"
    );
}

#[test_log::test]
fn onscreen_resize_is_clamped_into_root() {
    let metrics = metrics(1.0, Rect::new(0, 0, 320, 480), Rect::new(0, 400, 320, 450));
    let close = CloseRegionConfig::default();

    assert_eq!(
        resolve_resize_rect(&request(300, 200, 100, 0, false), &metrics, &close),
        Ok(Rect::new(20, 280, 320, 480))
    );
    assert!(matches!(
        resolve_resize_rect(&request(400, 200, 0, 0, false), &metrics, &close),
        Err(GeometryError::ExceedsMaxSize {
            max_width: 320,
            max_height: 480,
            ..
        })
    ));
}

#[test_log::test]
fn offscreen_resize_keeps_requested_position() {
    let metrics = metrics(1.0, Rect::new(0, 0, 320, 480), Rect::new(0, 0, 320, 50));
    let close = CloseRegionConfig {
        size_dips: 50,
        position: ClosePosition::TopLeft,
    };

    assert_eq!(
        resolve_resize_rect(&request(400, 100, 0, 10, true), &metrics, &close),
        Ok(Rect::new(0, 10, 400, 110))
    );
    assert!(matches!(
        resolve_resize_rect(&request(400, 100, -10, 10, true), &metrics, &close),
        Err(GeometryError::CloseRegionOffscreen { .. })
    ));
}

#[test_log::test]
fn resize_converts_dips_with_density() {
    let metrics = metrics(2.0, Rect::new(0, 0, 720, 1280), Rect::new(0, 100, 720, 200));
    let close = CloseRegionConfig::default();

    assert_eq!(
        resolve_resize_rect(&request(300, 100, 10, 20, true), &metrics, &close),
        Ok(Rect::new(20, 140, 620, 340))
    );
}

#[test_log::test]
fn accepted_resizes_keep_the_close_region_on_screen_and_inside_the_ad() {
    let mut accepted = 0;
    for density in [1.0_f32, 1.5, 2.75] {
        let scale = |rect: Rect| {
            Rect::new(
                dips_to_px(rect.left, density),
                dips_to_px(rect.top, density),
                dips_to_px(rect.right, density),
                dips_to_px(rect.bottom, density),
            )
        };
        let root = scale(Rect::new(0, 0, 320, 480));
        let metrics = metrics(density, root, scale(Rect::new(0, 100, 320, 150)));

        for position in [ClosePosition::TopRight, ClosePosition::Center, ClosePosition::BottomLeft] {
            let close = CloseRegionConfig {
                size_dips: 50,
                position,
            };
            let close_px = dips_to_px(close.size_dips, density);

            for width in (0..=400).step_by(50) {
                for height in (0..=400).step_by(50) {
                    for offset_x in (-180..=420).step_by(60) {
                        for offset_y in (-180..=420).step_by(60) {
                            for allow_offscreen in [true, false] {
                                let request =
                                    request(width, height, offset_x, offset_y, allow_offscreen);
                                let Ok(rect) = resolve_resize_rect(&request, &metrics, &close)
                                else {
                                    continue;
                                };
                                accepted += 1;

                                let region = close_region(&rect, close_px, position);
                                assert!(root.contains(&region), "{} at {}", request, density);
                                assert!(rect.contains(&region), "{} at {}", request, density);
                                if !allow_offscreen {
                                    assert!(root.contains(&rect), "{} at {}", request, density);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    assert!(accepted > 0);
}
