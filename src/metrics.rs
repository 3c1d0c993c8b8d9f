// src/metrics.rs

//! Screen geometry snapshots and the cancellable wait that produces them.
//!
//! Geometry is only valid after the host has run a layout pass, which happens
//! after the current event-loop turn. The controller therefore never measures
//! inline: it asks the `MetricsWaiter` for a ticket, hands the ticket to the
//! host, and measures when the host reports that ticket's layout pass.
//!
//! Only the most recent ticket is live. Requesting again cancels the
//! outstanding one, so a stale measurement can never overwrite a fresher one.

use crate::geometry::Rect;
use crate::host::SurfaceKind;
use log::{debug, trace};

/// Identifies one metrics request.
pub type MetricsTicket = u64;

/// Raw geometry reported by the host after a layout pass, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSnapshot {
    pub screen_width_px: i32,
    pub screen_height_px: i32,
    pub root_view: Rect,
    pub default_ad: Rect,
    pub current_ad: Rect,
}

/// Geometry of the ad's presentation in pixels and dips.
///
/// All rects are relative to the root view's top-left corner; the screen rect
/// starts at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenMetrics {
    density: f32,
    measured: bool,
    screen: Rect,
    screen_dips: Rect,
    root_view: Rect,
    root_view_dips: Rect,
    default_ad: Rect,
    default_ad_dips: Rect,
    current_ad: Rect,
    current_ad_dips: Rect,
}

impl ScreenMetrics {
    pub fn new(density: f32) -> Self {
        ScreenMetrics {
            density,
            measured: false,
            screen: Rect::default(),
            screen_dips: Rect::default(),
            root_view: Rect::default(),
            root_view_dips: Rect::default(),
            default_ad: Rect::default(),
            default_ad_dips: Rect::default(),
            current_ad: Rect::default(),
            current_ad_dips: Rect::default(),
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Whether at least one layout pass has been folded in.
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Folds a host snapshot in, re-expressing every rect relative to the root view.
    pub fn update(&mut self, snapshot: &LayoutSnapshot) {
        let (dx, dy) = (-snapshot.root_view.left, -snapshot.root_view.top);

        self.screen = Rect::from_xywh(0, 0, snapshot.screen_width_px, snapshot.screen_height_px);
        self.root_view = snapshot.root_view.translated(dx, dy);
        self.default_ad = snapshot.default_ad.translated(dx, dy);
        self.current_ad = snapshot.current_ad.translated(dx, dy);

        self.screen_dips = self.screen.to_dips(self.density);
        self.root_view_dips = self.root_view.to_dips(self.density);
        self.default_ad_dips = self.default_ad.to_dips(self.density);
        self.current_ad_dips = self.current_ad.to_dips(self.density);
        self.measured = true;

        trace!("ScreenMetrics: updated to {:?}", self);
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen
    }

    pub fn screen_rect_dips(&self) -> Rect {
        self.screen_dips
    }

    pub fn root_view_rect(&self) -> Rect {
        self.root_view
    }

    pub fn root_view_rect_dips(&self) -> Rect {
        self.root_view_dips
    }

    pub fn default_ad_rect(&self) -> Rect {
        self.default_ad
    }

    pub fn default_ad_rect_dips(&self) -> Rect {
        self.default_ad_dips
    }

    pub fn current_ad_rect(&self) -> Rect {
        self.current_ad
    }

    pub fn current_ad_rect_dips(&self) -> Rect {
        self.current_ad_dips
    }
}

/// Work to run once a metrics request completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Publish supports, placement, viewability and `ready` to the given bridge.
    AnnounceReady(SurfaceKind),
}

/// An outstanding metrics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRequest {
    pub ticket: MetricsTicket,
    /// The surface whose position becomes the current ad rect.
    pub surface: SurfaceKind,
    pub follow_ups: Vec<FollowUp>,
}

/// Hands out tickets and keeps at most one of them live.
#[derive(Debug, Default)]
pub struct MetricsWaiter {
    next_ticket: MetricsTicket,
    pending: Option<MetricsRequest>,
}

impl MetricsWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, cancelling any outstanding one.
    ///
    /// Follow-ups of a cancelled request carry over, since they announce
    /// one-shot protocol events that must not be lost.
    pub fn request(&mut self, surface: SurfaceKind, follow_up: Option<FollowUp>) -> MetricsTicket {
        let mut follow_ups = match self.pending.take() {
            Some(cancelled) => {
                debug!("MetricsWaiter: superseding ticket {}", cancelled.ticket);
                cancelled.follow_ups
            }
            None => Vec::new(),
        };
        if let Some(follow_up) = follow_up {
            if !follow_ups.contains(&follow_up) {
                follow_ups.push(follow_up);
            }
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(MetricsRequest {
            ticket,
            surface,
            follow_ups,
        });
        trace!("MetricsWaiter: ticket {} now pending for {:?}", ticket, surface);
        ticket
    }

    /// Drops the outstanding request, follow-ups included.
    pub fn cancel(&mut self) -> Option<MetricsRequest> {
        let cancelled = self.pending.take();
        if let Some(request) = &cancelled {
            debug!("MetricsWaiter: cancelled ticket {}", request.ticket);
        }
        cancelled
    }

    /// Claims the request for `ticket`. Stale tickets yield `None`.
    pub fn complete(&mut self, ticket: MetricsTicket) -> Option<MetricsRequest> {
        match &self.pending {
            Some(request) if request.ticket == ticket => self.pending.take(),
            _ => {
                trace!("MetricsWaiter: ignoring stale ticket {}", ticket);
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
