// src/orientation.rs

//! Orientation negotiation between the creative and the host activity.
//!
//! The creative asks for an orientation through `setOrientationProperties`.
//! Whether that request may be honoured depends on what the host declares
//! about itself: an activity that pins its orientation can only be "forced"
//! into that same orientation, and an unpinned one must survive orientation
//! and screen-size reconfiguration without being torn down.
//!
//! The coordinator remembers the host's requested orientation from before the
//! first lock so every exit path can put it back exactly once.

use crate::error::{OrientationError, ParseError};
use crate::host::HostActivity;
use bitflags::bitflags;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Orientation values understood by the creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MraidOrientation {
    Portrait,
    Landscape,
    #[default]
    None,
}

impl MraidOrientation {
    pub fn from_protocol(text: &str) -> Result<Self, ParseError> {
        match text {
            "portrait" => Ok(MraidOrientation::Portrait),
            "landscape" => Ok(MraidOrientation::Landscape),
            "none" => Ok(MraidOrientation::None),
            other => Err(ParseError::InvalidOrientation(other.to_string())),
        }
    }

    pub fn as_protocol(&self) -> &'static str {
        match self {
            MraidOrientation::Portrait => "portrait",
            MraidOrientation::Landscape => "landscape",
            MraidOrientation::None => "none",
        }
    }

    /// The host-level orientation this value locks to.
    pub fn screen_orientation(&self) -> ScreenOrientation {
        match self {
            MraidOrientation::Portrait => ScreenOrientation::Portrait,
            MraidOrientation::Landscape => ScreenOrientation::Landscape,
            MraidOrientation::None => ScreenOrientation::Unspecified,
        }
    }
}

impl fmt::Display for MraidOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}

/// Host-level requested/declared orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenOrientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

/// The device's coarse orientation, as the host's configuration reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    Landscape,
    Undefined,
}

/// Physical display rotation relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "180")]
    Deg180,
    #[serde(rename = "270")]
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

bitflags! {
    /// Reconfiguration categories the host survives without being torn down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ConfigChanges: u32 {
        const ORIENTATION     = 1 << 0;
        const SCREEN_SIZE     = 1 << 1;
        const KEYBOARD_HIDDEN = 1 << 2;
        const SCREEN_LAYOUT   = 1 << 3;
    }
}

/// What the host activity declares about itself (its manifest entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityDeclaration {
    pub screen_orientation: ScreenOrientation,
    pub config_changes: ConfigChanges,
}

/// Maps the coarse device orientation and the display rotation onto the
/// concrete orientation the host currently shows.
pub fn current_screen_orientation(
    device: DeviceOrientation,
    rotation: Rotation,
) -> ScreenOrientation {
    match device {
        DeviceOrientation::Portrait => match rotation {
            Rotation::Deg90 | Rotation::Deg180 => ScreenOrientation::ReversePortrait,
            _ => ScreenOrientation::Portrait,
        },
        DeviceOrientation::Landscape => match rotation {
            Rotation::Deg180 | Rotation::Deg270 => ScreenOrientation::ReverseLandscape,
            _ => ScreenOrientation::Landscape,
        },
        DeviceOrientation::Undefined => ScreenOrientation::Unspecified,
    }
}

/// Tracks orientation properties and the lock applied to the host.
pub struct OrientationCoordinator {
    activity: Option<Weak<RefCell<dyn HostActivity>>>,
    allow_orientation_change: bool,
    force_orientation: MraidOrientation,
    original_orientation: Option<ScreenOrientation>,
    last_rotation: Option<Rotation>,
}

impl OrientationCoordinator {
    pub fn new(activity: Option<Weak<RefCell<dyn HostActivity>>>) -> Self {
        OrientationCoordinator {
            activity,
            allow_orientation_change: true,
            force_orientation: MraidOrientation::None,
            original_orientation: None,
            last_rotation: None,
        }
    }

    /// Upgrades the host handle. Absent or dropped handles yield `None`.
    pub fn activity(&self) -> Option<Rc<RefCell<dyn HostActivity>>> {
        self.activity.as_ref().and_then(Weak::upgrade)
    }

    /// Current `(allowOrientationChange, forceOrientation)` pair.
    pub fn properties(&self) -> (bool, MraidOrientation) {
        (self.allow_orientation_change, self.force_orientation)
    }

    /// Whether a lock is currently applied to the host.
    pub fn is_locked(&self) -> bool {
        self.original_orientation.is_some()
    }

    /// Stores new orientation properties. A disallowed forced orientation
    /// leaves the previous properties untouched.
    pub fn set_properties(
        &mut self,
        allow_orientation_change: bool,
        force_orientation: MraidOrientation,
    ) -> Result<(), OrientationError> {
        if !self.is_force_allowed(force_orientation) {
            warn!(
                "OrientationCoordinator: rejecting forced orientation {}",
                force_orientation
            );
            return Err(OrientationError::ForceDisallowed(force_orientation));
        }
        self.allow_orientation_change = allow_orientation_change;
        self.force_orientation = force_orientation;
        debug!(
            "OrientationCoordinator: properties now allow={} force={}",
            allow_orientation_change, force_orientation
        );
        Ok(())
    }

    /// Applies the stored properties to the host.
    pub fn apply(&mut self) -> Result<(), OrientationError> {
        match self.force_orientation {
            MraidOrientation::None if self.allow_orientation_change => {
                self.unapply();
                Ok(())
            }
            MraidOrientation::None => {
                // Best effort: pin whatever the host is showing right now.
                let activity = self.activity().ok_or(OrientationError::NoActivity)?;
                let current = activity.borrow().current_orientation();
                self.lock(current)
            }
            forced => self.lock(forced.screen_orientation()),
        }
    }

    /// Restores the host's orientation from before the first lock. Calls
    /// without an intervening lock are no-ops.
    pub fn unapply(&mut self) {
        let Some(original) = self.original_orientation.take() else {
            trace!("OrientationCoordinator: unapply with no lock held");
            return;
        };
        match self.activity() {
            Some(activity) => {
                debug!("OrientationCoordinator: restoring {:?}", original);
                activity.borrow_mut().set_requested_orientation(original);
            }
            None => warn!("OrientationCoordinator: host activity gone, cannot restore orientation"),
        }
    }

    /// `None` is always allowed. A concrete orientation needs either a host
    /// pinned to that same orientation, or an unpinned host that survives
    /// both orientation and screen-size reconfiguration.
    pub fn is_force_allowed(&self, orientation: MraidOrientation) -> bool {
        if orientation == MraidOrientation::None {
            return true;
        }
        let Some(activity) = self.activity() else {
            return false;
        };
        let Some(declaration) = activity.borrow().declaration() else {
            return false;
        };

        if declaration.screen_orientation != ScreenOrientation::Unspecified {
            return declaration.screen_orientation == orientation.screen_orientation();
        }
        declaration
            .config_changes
            .contains(ConfigChanges::ORIENTATION | ConfigChanges::SCREEN_SIZE)
    }

    /// Records a rotation signal. Returns true when it differs from the last
    /// one seen, meaning geometry should be re-measured.
    pub fn rotation_changed(&mut self, rotation: Rotation) -> bool {
        if self.last_rotation == Some(rotation) {
            return false;
        }
        self.last_rotation = Some(rotation);
        true
    }

    fn lock(&mut self, target: ScreenOrientation) -> Result<(), OrientationError> {
        let allowed = self.is_force_allowed(self.force_orientation);
        let activity = match self.activity() {
            Some(activity) if allowed => activity,
            _ => return Err(OrientationError::LockUnsupported(self.force_orientation)),
        };
        let mut activity = activity.borrow_mut();
        if self.original_orientation.is_none() {
            self.original_orientation = Some(activity.requested_orientation());
        }
        debug!("OrientationCoordinator: locking host to {:?}", target);
        activity.set_requested_orientation(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
