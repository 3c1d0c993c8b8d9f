//! Test harness wiring a controller to the headless host.
//!
//! Keeps the controller, the host and the host activity together so tests can
//! drive host signals and inspect what the host saw.

use mraid_bridge::config::{Config, HeadlessConfig};
use mraid_bridge::controller::{PlacementType, ViewState, ViewStateController};
use mraid_bridge::geometry::Rect;
use mraid_bridge::host::headless::HeadlessHost;
use mraid_bridge::host::{HostActivity, SurfaceKind};
use std::cell::RefCell;
use std::rc::Rc;

pub const CREATIVE: &str = "<html><body>creative</body></html>";

pub struct Harness {
    // Dropped first, so teardown still reaches the activity.
    pub controller: ViewStateController,
    pub host: HeadlessHost,
    pub activity: Option<Rc<RefCell<dyn HostActivity>>>,
}

impl Harness {
    /// A controller with content loaded, still in `LOADING`.
    pub fn with_config(config: Config, with_activity: bool) -> Self {
        let host = HeadlessHost::new(config.headless.clone());
        let activity = with_activity.then(|| host.new_activity());
        let placement = config.headless.placement;
        let mut controller =
            ViewStateController::new(config, placement, host.handles(activity.as_ref()));
        controller
            .load_content(CREATIVE)
            .expect("headless host creates surfaces");
        Harness {
            controller,
            host,
            activity,
        }
    }

    /// A loaded controller in `DEFAULT` with its first metrics pass done.
    pub fn ready(config: Config) -> Self {
        let mut harness = Self::with_config(config, true);
        harness.controller.on_page_finished(SurfaceKind::Primary);
        harness.run_layout();
        assert_eq!(harness.controller.view_state(), ViewState::Default);
        harness
    }

    pub fn inline() -> Self {
        Self::ready(Config::default())
    }

    pub fn interstitial() -> Self {
        Self::ready(config_for(PlacementType::Interstitial))
    }

    /// A 100x100 root with a 100x50 default ad at the origin, density 1.
    pub fn small_root() -> Self {
        let mut config = Config::default();
        config.headless = HeadlessConfig {
            screen_width_px: 100,
            screen_height_px: 100,
            root: Rect::new(0, 0, 100, 100),
            default_ad: Rect::new(0, 0, 100, 50),
            ..HeadlessConfig::default()
        };
        Self::ready(config)
    }

    /// Runs every pending layout pass.
    pub fn run_layout(&mut self) {
        for ticket in self.host.take_layout_tickets() {
            self.controller.on_layout_pass(ticket);
        }
    }

    pub fn nav(&mut self, url: &str) -> bool {
        self.controller.handle_navigation(SurfaceKind::Primary, url)
    }

    pub fn primary_scripts(&self) -> Vec<String> {
        self.host.scripts_for(SurfaceKind::Primary)
    }

    pub fn two_part_scripts(&self) -> Vec<String> {
        self.host.scripts_for(SurfaceKind::TwoPart)
    }

    /// Error notifications the primary creative has received.
    pub fn primary_errors(&self) -> Vec<String> {
        self.primary_scripts()
            .into_iter()
            .filter(|script| script.contains("notifyErrorEvent"))
            .collect()
    }
}

pub fn config_for(placement: PlacementType) -> Config {
    let mut config = Config::default();
    config.headless.placement = placement;
    config
}
