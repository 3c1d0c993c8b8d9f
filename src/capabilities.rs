// src/capabilities.rs

//! Environment capability queries used to compose the `supports` notification.

use crate::host::{HostActivity, SurfaceKind, ViewHost};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flags set on the host window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WindowFlags: u32 {
        const HARDWARE_ACCELERATED = 1 << 0;
        const FULLSCREEN           = 1 << 1;
        const KEEP_SCREEN_ON       = 1 << 2;
    }
}

/// How a view in the surface's ancestry is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[default]
    None,
    Software,
    Hardware,
}

/// One view on the path from a surface up to the root of the host's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLayer {
    pub hardware_accelerated: bool,
    pub layer_type: LayerType,
}

impl ViewLayer {
    pub fn accelerated() -> Self {
        ViewLayer {
            hardware_accelerated: true,
            layer_type: LayerType::None,
        }
    }
}

/// Feature flags reported to the creative. Only inline video is still live;
/// the other four were retired from the protocol and are always `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Supports {
    pub sms: bool,
    pub telephone: bool,
    pub calendar: bool,
    pub store_picture: bool,
    pub inline_video: bool,
}

impl Supports {
    pub fn with_inline_video(inline_video: bool) -> Self {
        Supports {
            inline_video,
            ..Supports::default()
        }
    }
}

/// Stateless, host-backed capability answers.
pub struct NativeCapabilityProbe;

impl NativeCapabilityProbe {
    /// Inline video needs every view from the surface up to the root to be
    /// hardware accelerated without a software layer, and the window itself
    /// to be hardware accelerated.
    pub fn inline_video_supported(
        view: &dyn ViewHost,
        activity: Option<&dyn HostActivity>,
        surface: Option<SurfaceKind>,
    ) -> bool {
        let (Some(activity), Some(surface)) = (activity, surface) else {
            return false;
        };

        let chain = view.layer_chain(surface);
        if chain.is_empty() {
            return false;
        }
        let chain_accelerated = chain
            .iter()
            .all(|layer| layer.hardware_accelerated && layer.layer_type != LayerType::Software);

        chain_accelerated
            && activity
                .window_flags()
                .contains(WindowFlags::HARDWARE_ACCELERATED)
    }

    pub fn supports(
        view: &dyn ViewHost,
        activity: Option<&dyn HostActivity>,
        surface: Option<SurfaceKind>,
    ) -> Supports {
        Supports::with_inline_video(Self::inline_video_supported(view, activity, surface))
    }
}
