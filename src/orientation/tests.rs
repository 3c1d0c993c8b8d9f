// src/orientation/tests.rs

use super::*;
use crate::capabilities::WindowFlags;

struct FakeActivity {
    requested: ScreenOrientation,
    declaration: Option<ActivityDeclaration>,
    device: DeviceOrientation,
    rotation: Rotation,
    set_calls: Vec<ScreenOrientation>,
}

impl FakeActivity {
    fn declaring(screen_orientation: ScreenOrientation, config_changes: ConfigChanges) -> Self {
        FakeActivity {
            requested: ScreenOrientation::Unspecified,
            declaration: Some(ActivityDeclaration {
                screen_orientation,
                config_changes,
            }),
            device: DeviceOrientation::Portrait,
            rotation: Rotation::Deg0,
            set_calls: Vec::new(),
        }
    }

    fn flexible() -> Self {
        Self::declaring(
            ScreenOrientation::Unspecified,
            ConfigChanges::ORIENTATION | ConfigChanges::SCREEN_SIZE,
        )
    }
}

impl HostActivity for FakeActivity {
    fn requested_orientation(&self) -> ScreenOrientation {
        self.requested
    }

    fn set_requested_orientation(&mut self, orientation: ScreenOrientation) {
        self.requested = orientation;
        self.set_calls.push(orientation);
    }

    fn declaration(&self) -> Option<ActivityDeclaration> {
        self.declaration
    }

    fn device_orientation(&self) -> DeviceOrientation {
        self.device
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn window_flags(&self) -> WindowFlags {
        WindowFlags::HARDWARE_ACCELERATED
    }
}

fn coordinator_for(activity: &Rc<RefCell<FakeActivity>>) -> OrientationCoordinator {
    let as_dyn: Rc<RefCell<dyn HostActivity>> = activity.clone();
    OrientationCoordinator::new(Some(Rc::downgrade(&as_dyn)))
}

#[test_log::test]
fn none_is_always_allowed() {
    let coordinator = OrientationCoordinator::new(None);
    assert!(coordinator.is_force_allowed(MraidOrientation::None));
    assert!(!coordinator.is_force_allowed(MraidOrientation::Portrait));
}

#[test_log::test]
fn unpinned_host_needs_both_reconfiguration_categories() {
    let only_orientation = Rc::new(RefCell::new(FakeActivity::declaring(
        ScreenOrientation::Unspecified,
        ConfigChanges::ORIENTATION,
    )));
    let coordinator = coordinator_for(&only_orientation);
    assert!(!coordinator.is_force_allowed(MraidOrientation::Landscape));

    let flexible = Rc::new(RefCell::new(FakeActivity::flexible()));
    let coordinator = coordinator_for(&flexible);
    assert!(coordinator.is_force_allowed(MraidOrientation::Landscape));
    assert!(coordinator.is_force_allowed(MraidOrientation::Portrait));
}

#[test_log::test]
fn pinned_host_only_allows_its_own_orientation() {
    let pinned = Rc::new(RefCell::new(FakeActivity::declaring(
        ScreenOrientation::Portrait,
        ConfigChanges::ORIENTATION | ConfigChanges::SCREEN_SIZE,
    )));
    let coordinator = coordinator_for(&pinned);
    assert!(coordinator.is_force_allowed(MraidOrientation::Portrait));
    assert!(!coordinator.is_force_allowed(MraidOrientation::Landscape));
}

#[test_log::test]
fn undeclared_host_disallows_concrete_orientations() {
    let mut fake = FakeActivity::flexible();
    fake.declaration = None;
    let activity = Rc::new(RefCell::new(fake));
    let coordinator = coordinator_for(&activity);
    assert!(!coordinator.is_force_allowed(MraidOrientation::Portrait));
}

#[test_log::test]
fn rejected_properties_leave_previous_values() {
    let pinned = Rc::new(RefCell::new(FakeActivity::declaring(
        ScreenOrientation::Portrait,
        ConfigChanges::empty(),
    )));
    let mut coordinator = coordinator_for(&pinned);

    let err = coordinator
        .set_properties(false, MraidOrientation::Landscape)
        .expect_err("landscape must be rejected");
    assert_eq!(
        err,
        OrientationError::ForceDisallowed(MraidOrientation::Landscape)
    );
    assert_eq!(coordinator.properties(), (true, MraidOrientation::None));
}

#[test_log::test]
fn apply_then_unapply_restores_original_once() {
    let activity = Rc::new(RefCell::new(FakeActivity::flexible()));
    activity.borrow_mut().requested = ScreenOrientation::ReversePortrait;
    let mut coordinator = coordinator_for(&activity);

    coordinator
        .set_properties(true, MraidOrientation::Landscape)
        .expect("allowed");
    coordinator.apply().expect("lock");
    coordinator.apply().expect("relock");
    assert!(coordinator.is_locked());
    assert_eq!(
        activity.borrow().requested,
        ScreenOrientation::Landscape
    );

    coordinator.unapply();
    assert_eq!(
        activity.borrow().requested,
        ScreenOrientation::ReversePortrait
    );
    let calls_after_restore = activity.borrow().set_calls.len();

    coordinator.unapply();
    assert_eq!(activity.borrow().set_calls.len(), calls_after_restore);
    assert!(!coordinator.is_locked());
}

#[test_log::test]
fn none_with_changes_allowed_clears_lock() {
    let activity = Rc::new(RefCell::new(FakeActivity::flexible()));
    let mut coordinator = coordinator_for(&activity);

    coordinator
        .set_properties(true, MraidOrientation::Portrait)
        .expect("allowed");
    coordinator.apply().expect("lock");
    assert_eq!(activity.borrow().requested, ScreenOrientation::Portrait);

    coordinator
        .set_properties(true, MraidOrientation::None)
        .expect("none allowed");
    coordinator.apply().expect("unlock");
    assert_eq!(activity.borrow().requested, ScreenOrientation::Unspecified);
    assert!(!coordinator.is_locked());
}

#[test_log::test]
fn none_without_changes_pins_current_rotation() {
    let activity = Rc::new(RefCell::new(FakeActivity::flexible()));
    {
        let mut fake = activity.borrow_mut();
        fake.device = DeviceOrientation::Landscape;
        fake.rotation = Rotation::Deg270;
    }
    let mut coordinator = coordinator_for(&activity);

    coordinator
        .set_properties(false, MraidOrientation::None)
        .expect("none allowed");
    coordinator.apply().expect("pin current");
    assert_eq!(
        activity.borrow().requested,
        ScreenOrientation::ReverseLandscape
    );
}

#[test_log::test]
fn none_without_changes_needs_an_activity() {
    let mut coordinator = OrientationCoordinator::new(None);
    coordinator
        .set_properties(false, MraidOrientation::None)
        .expect("none allowed");
    assert_eq!(coordinator.apply(), Err(OrientationError::NoActivity));
}

#[test_log::test]
fn dropped_activity_fails_lock() {
    let activity = Rc::new(RefCell::new(FakeActivity::flexible()));
    let mut coordinator = coordinator_for(&activity);
    coordinator
        .set_properties(true, MraidOrientation::Landscape)
        .expect("allowed");
    drop(activity);

    assert_eq!(
        coordinator.apply(),
        Err(OrientationError::LockUnsupported(MraidOrientation::Landscape))
    );
}

#[test_log::test]
fn rotation_changes_are_deduplicated() {
    let mut coordinator = OrientationCoordinator::new(None);
    assert!(coordinator.rotation_changed(Rotation::Deg0));
    assert!(!coordinator.rotation_changed(Rotation::Deg0));
    assert!(coordinator.rotation_changed(Rotation::Deg90));
}

#[test_log::test]
fn protocol_strings_round_trip_through_parser() {
    assert_eq!(
        MraidOrientation::from_protocol("landscape"),
        Ok(MraidOrientation::Landscape)
    );
    assert_eq!(
        MraidOrientation::from_protocol("sideways"),
        Err(ParseError::InvalidOrientation("sideways".to_string()))
    );
}

#[test_log::test]
fn reverse_orientations_follow_rotation() {
    assert_eq!(
        current_screen_orientation(DeviceOrientation::Portrait, Rotation::Deg180),
        ScreenOrientation::ReversePortrait
    );
    assert_eq!(
        current_screen_orientation(DeviceOrientation::Landscape, Rotation::Deg90),
        ScreenOrientation::Landscape
    );
    assert_eq!(
        current_screen_orientation(DeviceOrientation::Undefined, Rotation::Deg0),
        ScreenOrientation::Unspecified
    );
}
