// src/config.rs

//! Configuration for the bridge, the controller and the headless host.
//!
//! Every section deserializes with `#[serde(default)]`, so a config file only
//! needs to name the values it overrides. The defaults carry the protocol's
//! own constants (scheme names, close-region size, parameter ranges).

use crate::capabilities::WindowFlags;
use crate::controller::PlacementType;
use crate::geometry::{ClosePosition, Dips, Rect};
use crate::orientation::{ActivityDeclaration, ConfigChanges, DeviceOrientation, Rotation};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// URL schemes the bridge reserves.
    pub bridge: BridgeConfig,
    /// Close-affordance geometry.
    pub close_region: CloseRegionConfig,
    /// Accepted ranges for numeric command parameters.
    pub limits: LimitsConfig,
    /// Logging defaults for the binary.
    pub logging: LoggingConfig,
    /// The simulated host used by `mraid-replay` and the tests.
    pub headless: HeadlessConfig,
}

impl Config {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse configuration JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        Self::from_json_str(&text)
    }
}

// --- Bridge Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Scheme that carries commands from the creative (`mraid://close`).
    pub command_scheme: String,
    /// Scheme for page-level signals. Navigations on it are always consumed.
    pub page_scheme: String,
    /// Host on the page-level scheme that reports a failed load.
    pub fail_load_host: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            command_scheme: "mraid".to_string(),
            page_scheme: "mopub".to_string(),
            fail_load_host: "failLoad".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Scheme of deep links that must open in the platform browser.
    pub fn native_browser_scheme(&self) -> String {
        format!("{}nativebrowser", self.page_scheme)
    }

    /// Scheme of share-intent links.
    pub fn share_scheme(&self) -> String {
        format!("{}share", self.page_scheme)
    }
}

// --- Close Region Configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseRegionConfig {
    /// Edge length of the square close region.
    pub size_dips: Dips,
    /// Gravity of the close region inside a resized ad.
    pub position: ClosePosition,
}

impl Default for CloseRegionConfig {
    fn default() -> Self {
        CloseRegionConfig {
            size_dips: 50,
            position: ClosePosition::TopRight,
        }
    }
}

// --- Limits Configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upper bound for `width`/`height`; the lower bound is zero.
    pub max_size: i64,
    /// Bound for `offsetX`/`offsetY`, applied symmetrically.
    pub max_offset: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_size: 100_000,
            max_offset: 100_000,
        }
    }
}

// --- Logging Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            default_filter: "info".to_string(),
        }
    }
}

// --- Headless Host Configuration ---

/// Geometry and platform traits of the simulated host.
///
/// Rects are in window pixels; the root rect need not start at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    pub placement: PlacementType,
    pub density: f32,
    pub screen_width_px: i32,
    pub screen_height_px: i32,
    pub root: Rect,
    pub default_ad: Rect,
    pub activity: ActivityDeclaration,
    pub device_orientation: DeviceOrientation,
    pub rotation: Rotation,
    pub window_flags: WindowFlags,
    /// Whether every view between a surface and the root is accelerated.
    pub views_accelerated: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        HeadlessConfig {
            placement: PlacementType::Inline,
            density: 1.0,
            screen_width_px: 320,
            screen_height_px: 480,
            root: Rect::new(0, 0, 320, 480),
            default_ad: Rect::new(0, 0, 320, 50),
            activity: ActivityDeclaration {
                screen_orientation: Default::default(),
                config_changes: ConfigChanges::ORIENTATION | ConfigChanges::SCREEN_SIZE,
            },
            device_orientation: DeviceOrientation::Portrait,
            rotation: Rotation::Deg0,
            window_flags: WindowFlags::HARDWARE_ACCELERATED,
            views_accelerated: true,
        }
    }
}
