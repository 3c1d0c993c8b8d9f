// src/bridge/command.rs

//! Commands the creative can issue, and the typed payloads they decode into.

use super::params::Params;
use super::BridgeEvent;
use crate::config::LimitsConfig;
use crate::controller::PlacementType;
use crate::error::{CommandError, ParseError};
use std::fmt;
use url::Url;

/// Command names recognised on the command scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MraidCommand {
    Close,
    Expand,
    Open,
    Resize,
    SetOrientationProperties,
    // Retired from the protocol; always fail.
    PlayVideo,
    StorePicture,
    CreateCalendarEvent,
    /// Anything else.
    Unspecified,
}

impl MraidCommand {
    pub fn from_protocol(name: &str) -> Self {
        match name {
            "close" => MraidCommand::Close,
            "expand" => MraidCommand::Expand,
            "open" => MraidCommand::Open,
            "resize" => MraidCommand::Resize,
            "setOrientationProperties" => MraidCommand::SetOrientationProperties,
            "playVideo" => MraidCommand::PlayVideo,
            "storePicture" => MraidCommand::StorePicture,
            "createCalendarEvent" => MraidCommand::CreateCalendarEvent,
            _ => MraidCommand::Unspecified,
        }
    }

    pub fn as_protocol(&self) -> &'static str {
        match self {
            MraidCommand::Close => "close",
            MraidCommand::Expand => "expand",
            MraidCommand::Open => "open",
            MraidCommand::Resize => "resize",
            MraidCommand::SetOrientationProperties => "setOrientationProperties",
            MraidCommand::PlayVideo => "playVideo",
            MraidCommand::StorePicture => "storePicture",
            MraidCommand::CreateCalendarEvent => "createCalendarEvent",
            MraidCommand::Unspecified => "unspecified",
        }
    }

    /// Commands that may only run after the user has touched the surface.
    pub fn requires_click(&self, placement: PlacementType) -> bool {
        match self {
            MraidCommand::PlayVideo => placement == PlacementType::Inline,
            MraidCommand::Open | MraidCommand::CreateCalendarEvent | MraidCommand::StorePicture => {
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for MraidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}

/// A resize request, in dips, as the creative sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: i32,
    pub height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub allow_offscreen: bool,
}

impl fmt::Display for ResizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size ({}, {}) and offset ({}, {})",
            self.width, self.height, self.offset_x, self.offset_y
        )
    }
}

/// A parsed command URL: the command kind and its raw parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: MraidCommand,
    pub params: Params,
}

impl Command {
    /// Splits a command-scheme URL into its command name (the host) and its
    /// parameters (the query string).
    pub fn from_url(url: &Url) -> Result<Command, (MraidCommand, ParseError)> {
        let kind = MraidCommand::from_protocol(url.host_str().unwrap_or_default());
        if url.cannot_be_a_base() {
            return Err((kind, ParseError::NotHierarchical(url.to_string())));
        }
        Ok(Command {
            kind,
            params: Params::from_url(url),
        })
    }

    /// Validates the parameters and produces the event the listener acts on.
    pub fn to_event(&self, limits: &LimitsConfig, user_clicked: bool) -> Result<BridgeEvent, CommandError> {
        let params = &self.params;
        let event = match self.kind {
            MraidCommand::Close => BridgeEvent::Close,
            MraidCommand::Resize => BridgeEvent::Resize(ResizeRequest {
                width: params.int_in_range("width", 0, limits.max_size)?,
                height: params.int_in_range("height", 0, limits.max_size)?,
                offset_x: params.int_in_range("offsetX", -limits.max_offset, limits.max_offset)?,
                offset_y: params.int_in_range("offsetY", -limits.max_offset, limits.max_offset)?,
                allow_offscreen: params.boolean_or("allowOffscreen", true)?,
            }),
            MraidCommand::Expand => BridgeEvent::Expand {
                url: params.optional_url("url")?,
            },
            MraidCommand::Open => BridgeEvent::Open {
                url: params.url("url")?,
                user_clicked,
            },
            MraidCommand::SetOrientationProperties => BridgeEvent::SetOrientation {
                allow_orientation_change: params.boolean("allowOrientationChange")?,
                force_orientation: params.orientation("forceOrientation")?,
            },
            MraidCommand::PlayVideo
            | MraidCommand::StorePicture
            | MraidCommand::CreateCalendarEvent => return Err(CommandError::Unsupported),
            MraidCommand::Unspecified => return Err(CommandError::Unspecified),
        };
        Ok(event)
    }
}
