// src/error.rs

//! Error taxonomy for the bridge and the view-state controller.
//!
//! Every command-level error ends up as text pushed back into the creative via
//! `notifyErrorEvent`, so the `Display` output of each variant is part of the
//! creative-facing contract.

use crate::bridge::ResizeRequest;
use crate::orientation::MraidOrientation;
use thiserror::Error;

/// Malformed command URLs and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Mraid command sent an invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Mraid command sent a non-hierarchical URL: {0}")]
    NotHierarchical(String),
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid numeric parameter: {0}")]
    InvalidNumber(String),
    #[error("Integer parameter out of range: {0}")]
    OutOfRange(i64),
    #[error("Invalid boolean parameter: {0}")]
    InvalidBoolean(String),
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),
    #[error("Invalid URL parameter: {0}")]
    InvalidUrlParameter(String),
}

/// A resize rect that violates the containment rules.
///
/// Sizes are reported in dips, the unit the creative asked in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error(
        "resizeProperties specified a {request} that doesn't allow the ad to appear within the max allowed size ({max_width}, {max_height})"
    )]
    ExceedsMaxSize {
        request: ResizeRequest,
        max_width: i32,
        max_height: i32,
    },
    #[error(
        "resizeProperties specified a {request} that doesn't allow the close region to appear within the max allowed size ({max_width}, {max_height})"
    )]
    CloseRegionOffscreen {
        request: ResizeRequest,
        max_width: i32,
        max_height: i32,
    },
    #[error(
        "resizeProperties specified a {request} that doesn't allow the close region to appear within the resized ad"
    )]
    CloseRegionOutsideAd { request: ResizeRequest },
}

/// Orientation lock failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrientationError {
    #[error("Unable to set MRAID expand orientation to 'none'; no host activity is available")]
    NoActivity,
    #[error("Attempted to lock orientation to unsupported value: {0}")]
    LockUnsupported(MraidOrientation),
    #[error("Unable to force orientation to {0}")]
    ForceDisallowed(MraidOrientation),
}

/// Any failure of a single command. Never escapes the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Orientation(#[from] OrientationError),
    #[error("Cannot execute this command unless the user clicks")]
    RequiresClick,
    #[error("The current surface is being destroyed")]
    NoSurface,
    #[error("{0}")]
    IllegalState(&'static str),
    #[error("Unsupported MRAID Javascript command")]
    Unsupported,
    #[error("Unspecified MRAID Javascript command")]
    Unspecified,
    #[error("Host failed to service the command: {0}")]
    Host(String),
}

impl CommandError {
    /// Wraps a host-side failure, keeping the full context chain in the message.
    pub fn host(err: anyhow::Error) -> Self {
        CommandError::Host(format!("{:#}", err))
    }
}
