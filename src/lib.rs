//! Rich-media ad bridge and view-state controller.
//!
//! A creative running inside a script-capable rendering surface talks to the
//! host through `mraid://` navigations. The [`bridge`] turns those into typed
//! events, the [`controller`] applies them to the ad's on-screen presentation,
//! and the [`host`] traits are the only way either of them reaches the
//! platform.

pub mod bridge;
pub mod capabilities;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod metrics;
pub mod orientation;
pub mod replay;
pub mod router;

pub use bridge::{BridgeEvent, BridgeListener, CommandBridge, MraidCommand};
pub use config::Config;
pub use controller::{PlacementType, ViewState, ViewStateController};
pub use error::{CommandError, GeometryError, OrientationError, ParseError};
pub use host::{AdEvent, HostHandles, SurfaceKind};
