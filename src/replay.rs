// src/replay.rs

//! Line-oriented replay of host signals against a headless controller.
//!
//! Each input line is one directive:
//!
//! ```text
//! nav <surface> <url>         navigation attempt; prints consumed/passthrough
//! loaded <surface>            page finished loading
//! click <surface>             user gesture on the surface
//! visible <surface> <bool>    visibility change
//! gone <surface>              render process died
//! layout                      run every pending layout pass
//! rotate <0|90|180|270>       display rotation changed
//! pause [finishing]
//! resume
//! destroy
//! state                       prints view state, placement and orientation
//! quit
//! ```
//!
//! `<surface>` is `primary` or `two-part`. Blank lines and lines starting with
//! `#` are skipped by the caller.

use crate::config::Config;
use crate::controller::ViewStateController;
use crate::host::headless::HeadlessHost;
use crate::host::{HostActivity, SurfaceKind};
use crate::orientation::Rotation;
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("empty directive")]
    Empty,
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
    #[error("'{directive}' is missing its {argument} argument")]
    MissingArgument {
        directive: &'static str,
        argument: &'static str,
    },
    #[error("unknown surface '{0}', expected 'primary' or 'two-part'")]
    UnknownSurface(String),
    #[error("invalid boolean '{0}'")]
    InvalidBoolean(String),
    #[error("invalid rotation '{0}', expected 0, 90, 180 or 270")]
    InvalidRotation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Navigate { surface: SurfaceKind, url: String },
    Loaded(SurfaceKind),
    Click(SurfaceKind),
    Visible { surface: SurfaceKind, visible: bool },
    RenderGone(SurfaceKind),
    Layout,
    Rotate(Rotation),
    Pause { finishing: bool },
    Resume,
    Destroy,
    State,
    Quit,
}

fn parse_surface(text: Option<&str>, directive: &'static str) -> Result<SurfaceKind, ReplayError> {
    match text {
        Some("primary") => Ok(SurfaceKind::Primary),
        Some("two-part") => Ok(SurfaceKind::TwoPart),
        Some(other) => Err(ReplayError::UnknownSurface(other.to_string())),
        None => Err(ReplayError::MissingArgument {
            directive,
            argument: "surface",
        }),
    }
}

impl FromStr for Directive {
    type Err = ReplayError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ReplayError::Empty);
        };

        let directive = match name {
            "nav" => {
                let surface = parse_surface(words.next(), "nav")?;
                let url = words.next().ok_or(ReplayError::MissingArgument {
                    directive: "nav",
                    argument: "url",
                })?;
                Directive::Navigate {
                    surface,
                    url: url.to_string(),
                }
            }
            "loaded" => Directive::Loaded(parse_surface(words.next(), "loaded")?),
            "click" => Directive::Click(parse_surface(words.next(), "click")?),
            "gone" => Directive::RenderGone(parse_surface(words.next(), "gone")?),
            "visible" => {
                let surface = parse_surface(words.next(), "visible")?;
                let visible = match words.next() {
                    Some("true") => true,
                    Some("false") => false,
                    Some(other) => return Err(ReplayError::InvalidBoolean(other.to_string())),
                    None => {
                        return Err(ReplayError::MissingArgument {
                            directive: "visible",
                            argument: "visibility",
                        })
                    }
                };
                Directive::Visible { surface, visible }
            }
            "layout" => Directive::Layout,
            "rotate" => {
                let degrees = words.next().ok_or(ReplayError::MissingArgument {
                    directive: "rotate",
                    argument: "degrees",
                })?;
                let rotation = degrees
                    .parse::<u16>()
                    .ok()
                    .and_then(Rotation::from_degrees)
                    .ok_or_else(|| ReplayError::InvalidRotation(degrees.to_string()))?;
                Directive::Rotate(rotation)
            }
            "pause" => Directive::Pause {
                finishing: words.next() == Some("finishing"),
            },
            "resume" => Directive::Resume,
            "destroy" => Directive::Destroy,
            "state" => Directive::State,
            "quit" => Directive::Quit,
            other => return Err(ReplayError::UnknownDirective(other.to_string())),
        };
        Ok(directive)
    }
}

/// A controller wired to a fresh headless host.
pub struct ReplaySession {
    // Dropped first, so its teardown still sees a live activity.
    controller: ViewStateController,
    host: HeadlessHost,
    _activity: Rc<RefCell<dyn HostActivity>>,
}

impl ReplaySession {
    /// Builds the host from `config.headless` and loads `html` as the creative.
    pub fn start(config: Config, html: &str) -> anyhow::Result<Self> {
        let host = HeadlessHost::new(config.headless.clone());
        let activity = host.new_activity();
        let placement = config.headless.placement;
        let mut controller =
            ViewStateController::new(config, placement, host.handles(Some(&activity)));
        controller.load_content(html)?;
        Ok(ReplaySession {
            controller,
            host,
            _activity: activity,
        })
    }

    pub fn controller(&self) -> &ViewStateController {
        &self.controller
    }

    pub fn host(&self) -> &HeadlessHost {
        &self.host
    }

    /// Applies one directive and returns the lines it produced: everything
    /// pushed to the host during the directive, then the directive's own result.
    pub fn apply(&mut self, directive: &Directive) -> Vec<String> {
        let mut result = None;
        match directive {
            Directive::Navigate { surface, url } => {
                let consumed = self.controller.handle_navigation(*surface, url);
                result = Some(if consumed { "consumed" } else { "passthrough" }.to_string());
            }
            Directive::Loaded(surface) => self.controller.on_page_finished(*surface),
            Directive::Click(surface) => self.controller.on_user_click(*surface),
            Directive::Visible { surface, visible } => {
                self.controller.on_visibility_changed(*surface, *visible)
            }
            Directive::RenderGone(surface) => self.controller.on_render_process_gone(*surface),
            Directive::Layout => {
                for ticket in self.host.take_layout_tickets() {
                    self.controller.on_layout_pass(ticket);
                }
            }
            Directive::Rotate(rotation) => {
                self.host.set_rotation(*rotation);
                self.controller.on_rotation_changed(*rotation);
            }
            Directive::Pause { finishing } => self.controller.pause(*finishing),
            Directive::Resume => self.controller.resume(),
            Directive::Destroy => self.controller.destroy(),
            Directive::State => {
                let (allow, force) = self.controller.orientation_properties();
                result = Some(format!(
                    "state {} placement={} two-part={} orientation=({}, {})",
                    self.controller.view_state(),
                    self.controller.placement_type(),
                    self.controller.has_two_part(),
                    allow,
                    force
                ));
            }
            Directive::Quit => {}
        }

        let mut lines = self.host.take_journal();
        lines.extend(result);
        lines
    }
}
