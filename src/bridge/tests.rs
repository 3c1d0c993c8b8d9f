// src/bridge/tests.rs

use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct SurfaceLog {
    scripts: Vec<String>,
    html: Vec<String>,
    paused: Option<bool>,
    destroyed: usize,
}

struct RecordingSurface(Rc<RefCell<SurfaceLog>>);

impl RenderingSurface for RecordingSurface {
    fn load_html(&mut self, html: &str) {
        self.0.borrow_mut().html.push(html.to_string());
    }

    fn load_url(&mut self, url: &str) {
        self.0.borrow_mut().html.push(url.to_string());
    }

    fn evaluate_script(&mut self, script: &str) {
        self.0.borrow_mut().scripts.push(script.to_string());
    }

    fn set_paused(&mut self, paused: bool) {
        self.0.borrow_mut().paused = Some(paused);
    }

    fn destroy(&mut self) {
        self.0.borrow_mut().destroyed += 1;
    }
}

#[derive(Default)]
struct RecordingListener {
    events: Vec<BridgeEvent>,
    reject_with: Option<CommandError>,
}

impl BridgeListener for RecordingListener {
    fn on_bridge_event(&mut self, event: BridgeEvent) -> Result<(), CommandError> {
        self.events.push(event);
        match &self.reject_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn attached_bridge(placement: PlacementType) -> (CommandBridge, Rc<RefCell<SurfaceLog>>) {
    let log = Rc::new(RefCell::new(SurfaceLog::default()));
    let mut bridge = CommandBridge::new(
        SurfaceKind::Primary,
        placement,
        BridgeConfig::default(),
        LimitsConfig::default(),
    );
    bridge.attach(Box::new(RecordingSurface(log.clone())));
    (bridge, log)
}

fn scripts(log: &Rc<RefCell<SurfaceLog>>) -> Vec<String> {
    log.borrow().scripts.clone()
}

#[test_log::test]
fn malformed_number_reports_one_error_and_one_completion() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    assert!(bridge.handle_navigation_attempt("mraid://resize?width=abc", &mut listener));

    assert!(listener.events.is_empty());
    assert_eq!(
        scripts(&log),
        vec![
            r#"window.mraidbridge.notifyErrorEvent("resize", "Invalid numeric parameter: abc")"#
                .to_string(),
            r#"window.mraidbridge.nativeCallComplete("resize")"#.to_string(),
        ]
    );
}

#[test_log::test]
fn navigation_before_click_passes_through() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    let consumed =
        bridge.handle_navigation_attempt("https://example.com/landing?x=1&y=2", &mut listener);

    assert!(!consumed);
    assert!(listener.events.is_empty());
    assert!(scripts(&log).is_empty());
}

#[test_log::test]
fn navigation_after_click_becomes_open_with_original_url() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();
    bridge.mark_clicked();

    let consumed =
        bridge.handle_navigation_attempt("https://example.com/landing?x=1&y=2", &mut listener);

    assert!(consumed);
    assert_eq!(
        listener.events,
        vec![BridgeEvent::Open {
            url: "https://example.com/landing?x=1&y=2".to_string(),
            user_clicked: true,
        }]
    );
    assert_eq!(
        scripts(&log),
        vec![r#"window.mraidbridge.nativeCallComplete("open")"#.to_string()]
    );
}

#[test_log::test]
fn open_requires_click() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    assert!(bridge.handle_navigation_attempt(
        "mraid://open?url=https%3A%2F%2Fexample.com",
        &mut listener
    ));

    assert!(listener.events.is_empty());
    let scripts = scripts(&log);
    assert_eq!(scripts.len(), 2);
    assert!(scripts[0].contains("Cannot execute this command unless the user clicks"));
    assert!(scripts[1].contains("nativeCallComplete(\"open\")"));
}

#[test_log::test]
fn play_video_click_gate_depends_on_placement() {
    assert!(MraidCommand::PlayVideo.requires_click(PlacementType::Inline));
    assert!(!MraidCommand::PlayVideo.requires_click(PlacementType::Interstitial));
    assert!(MraidCommand::StorePicture.requires_click(PlacementType::Interstitial));
    assert!(!MraidCommand::Close.requires_click(PlacementType::Inline));
}

#[test_log::test]
fn retired_and_unknown_commands_always_fail() {
    let (mut bridge, log) = attached_bridge(PlacementType::Interstitial);
    let mut listener = RecordingListener::default();
    bridge.mark_clicked();

    for url in [
        "mraid://playVideo?uri=x",
        "mraid://storePicture?uri=x",
        "mraid://createCalendarEvent",
    ] {
        assert!(bridge.handle_navigation_attempt(url, &mut listener));
    }
    assert!(bridge.handle_navigation_attempt("mraid://useCustomClose", &mut listener));

    assert!(listener.events.is_empty());
    let scripts = scripts(&log);
    assert_eq!(scripts.len(), 8);
    assert!(scripts[0].contains("Unsupported MRAID Javascript command"));
    assert!(scripts[6].contains(r#"notifyErrorEvent("unspecified", "Unspecified MRAID Javascript command")"#));
    assert!(scripts[1].contains(r#"nativeCallComplete("playVideo")"#));
    assert!(scripts[7].contains(r#"nativeCallComplete("useCustomClose")"#));
}

#[test_log::test]
fn resize_parameters_are_range_checked() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    bridge.handle_navigation_attempt(
        "mraid://resize?width=100001&height=50&offsetX=0&offsetY=0",
        &mut listener,
    );
    assert!(listener.events.is_empty());
    assert!(scripts(&log)[0].contains("Integer parameter out of range: 100001"));

    bridge.handle_navigation_attempt(
        "mraid://resize?width=320&height=50&offsetX=-100000&offsetY=0",
        &mut listener,
    );
    assert_eq!(
        listener.events,
        vec![BridgeEvent::Resize(ResizeRequest {
            width: 320,
            height: 50,
            offset_x: -100_000,
            offset_y: 0,
            allow_offscreen: true,
        })]
    );
}

#[test_log::test]
fn resize_dimensions_must_be_plain_integers() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    for (width, shown) in [("1.5", "1.5"), ("1e2", "1e2"), ("%2050%20", " 50 ")] {
        log.borrow_mut().scripts.clear();
        let url = format!("mraid://resize?width={}&height=60&offsetX=0&offsetY=0", width);
        assert!(bridge.handle_navigation_attempt(&url, &mut listener));

        let scripts = scripts(&log);
        assert_eq!(scripts.len(), 2, "width={}", width);
        assert!(scripts[0].contains(&format!("Invalid numeric parameter: {}", shown)));
        assert_eq!(
            scripts[1],
            r#"window.mraidbridge.nativeCallComplete("resize")"#
        );
    }
    assert!(listener.events.is_empty());
}

#[test_log::test]
fn missing_and_malformed_parameters() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    bridge.handle_navigation_attempt(
        "mraid://setOrientationProperties?allowOrientationChange=true",
        &mut listener,
    );
    bridge.handle_navigation_attempt(
        "mraid://setOrientationProperties?allowOrientationChange=yes&forceOrientation=none",
        &mut listener,
    );
    bridge.handle_navigation_attempt(
        "mraid://setOrientationProperties?allowOrientationChange=false&forceOrientation=sideways",
        &mut listener,
    );

    assert!(listener.events.is_empty());
    let scripts = scripts(&log);
    assert!(scripts[0].contains("Missing required parameter: forceOrientation"));
    assert!(scripts[2].contains("Invalid boolean parameter: yes"));
    assert!(scripts[4].contains("Invalid orientation: sideways"));
}

#[test_log::test]
fn invalid_url_is_consumed_with_an_error() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    assert!(bridge.handle_navigation_attempt("not a url", &mut listener));

    let scripts = scripts(&log);
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("Mraid command sent an invalid URL: not a url"));
}

#[test_log::test]
fn non_hierarchical_command_url_is_rejected() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    assert!(bridge.handle_navigation_attempt("mraid:close", &mut listener));

    assert!(listener.events.is_empty());
    assert!(scripts(&log)[0].contains("non-hierarchical URL"));
}

#[test_log::test]
fn page_scheme_is_always_consumed() {
    let (mut inline, _) = attached_bridge(PlacementType::Inline);
    let (mut interstitial, _) = attached_bridge(PlacementType::Interstitial);
    let mut listener = RecordingListener::default();

    assert!(inline.handle_navigation_attempt("mopub://failLoad", &mut listener));
    assert_eq!(listener.events, vec![BridgeEvent::PageFailed]);

    assert!(interstitial.handle_navigation_attempt("mopub://failLoad", &mut listener));
    assert!(inline.handle_navigation_attempt("mopub://finishLoad", &mut listener));
    assert_eq!(listener.events, vec![BridgeEvent::PageFailed]);
}

#[test_log::test]
fn listener_rejection_is_reported_to_creative() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener {
        reject_with: Some(CommandError::IllegalState(
            "Not allowed to resize from an already expanded ad",
        )),
        ..Default::default()
    };

    assert!(bridge.handle_navigation_attempt(
        "mraid://resize?width=10&height=10&offsetX=0&offsetY=0",
        &mut listener
    ));

    assert_eq!(listener.events.len(), 1);
    assert_eq!(
        scripts(&log),
        vec![
            r#"window.mraidbridge.notifyErrorEvent("resize", "Not allowed to resize from an already expanded ad")"#
                .to_string(),
            r#"window.mraidbridge.nativeCallComplete("resize")"#.to_string(),
        ]
    );
}

#[test_log::test]
fn commands_without_surface_are_not_dispatched() {
    let mut bridge = CommandBridge::new(
        SurfaceKind::TwoPart,
        PlacementType::Inline,
        BridgeConfig::default(),
        LimitsConfig::default(),
    );
    let mut listener = RecordingListener::default();

    assert!(bridge.handle_navigation_attempt("mraid://close", &mut listener));
    assert!(listener.events.is_empty());
}

#[test_log::test]
fn second_attach_releases_incoming_surface() {
    let (mut bridge, first) = attached_bridge(PlacementType::Inline);
    let second = Rc::new(RefCell::new(SurfaceLog::default()));
    bridge.attach(Box::new(RecordingSurface(second.clone())));

    assert_eq!(second.borrow().destroyed, 1);
    assert_eq!(first.borrow().destroyed, 0);

    bridge.set_content_html("<html></html>");
    assert_eq!(first.borrow().html, vec!["<html></html>".to_string()]);
    assert!(second.borrow().html.is_empty());
}

#[test_log::test]
fn page_load_is_reported_once() {
    let (mut bridge, _) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    bridge.handle_page_finished(&mut listener);
    bridge.handle_page_finished(&mut listener);

    assert!(bridge.is_loaded());
    assert_eq!(listener.events, vec![BridgeEvent::PageLoaded]);
}

#[test_log::test]
fn render_process_loss_detaches_before_reporting() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);
    let mut listener = RecordingListener::default();

    bridge.handle_render_process_gone(&mut listener);

    assert!(!bridge.is_attached());
    assert_eq!(log.borrow().destroyed, 1);
    assert_eq!(listener.events, vec![BridgeEvent::RenderLost]);

    bridge.notify_ready();
    assert!(scripts(&log).is_empty());
}

#[test_log::test]
fn notifications_render_protocol_calls() {
    let (mut bridge, log) = attached_bridge(PlacementType::Inline);

    bridge.notify_view_state(ViewState::Expanded);
    bridge.notify_placement_type(PlacementType::Interstitial);
    bridge.notify_viewability(false);
    bridge.notify_supports(&Supports::with_inline_video(true));
    bridge.notify_ready();
    bridge.set_paused(true);

    assert_eq!(
        scripts(&log),
        vec![
            r#"mraidbridge.setState("expanded")"#.to_string(),
            r#"mraidbridge.setPlacementType("interstitial")"#.to_string(),
            "mraidbridge.setIsViewable(false)".to_string(),
            "mraidbridge.setSupports(false,false,false,false,true)".to_string(),
            "mraidbridge.notifyReadyEvent();".to_string(),
        ]
    );
    assert_eq!(log.borrow().paused, Some(true));
}
