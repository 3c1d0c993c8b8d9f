// src/controller/state.rs

//! Presentation state and placement type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the ad is placed in the host. Fixed for a controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementType {
    #[default]
    Inline,
    Interstitial,
}

impl PlacementType {
    pub fn as_protocol(&self) -> &'static str {
        match self {
            PlacementType::Inline => "inline",
            PlacementType::Interstitial => "interstitial",
        }
    }
}

impl fmt::Display for PlacementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}

/// The ad's presentation state, as published to the creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Loading,
    Default,
    Resized,
    Expanded,
    Hidden,
}

impl ViewState {
    pub fn as_protocol(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Default => "default",
            ViewState::Resized => "resized",
            ViewState::Expanded => "expanded",
            ViewState::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}
