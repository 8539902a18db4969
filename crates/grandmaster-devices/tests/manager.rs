use grandmaster_core::{MemorySink, SharedSink};
use grandmaster_devices::sim::{sim_pair, SimHandle, SimLink};
use grandmaster_devices::{
    BoardCommand, Button, ButtonHandlers, DeviceConfig, DeviceError, DeviceManager,
    GantryPosition, LedPalette,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn config() -> DeviceConfig {
    DeviceConfig {
        warmup_ms: 0,
        wait_timeout_ms: Some(200),
        ..DeviceConfig::default()
    }
}

fn manager_with(
    config: &DeviceConfig,
    handlers: ButtonHandlers,
) -> (DeviceManager<SimLink>, SimHandle, Arc<MemorySink>) {
    let (gantry, board, handle) = sim_pair();
    let sink = Arc::new(MemorySink::new());
    let shared: SharedSink = sink.clone();
    let manager = DeviceManager::with_links(gantry, board, config, handlers, shared);
    (manager, handle, sink)
}

fn ready_manager() -> (DeviceManager<SimLink>, SimHandle) {
    let (mut manager, handle, _) = manager_with(&config(), ButtonHandlers::new());
    manager.poll().expect("poll");
    assert!(manager.is_ready());
    handle.clear_writes();
    (manager, handle)
}

#[test]
fn move_gantry_sends_packed_position() {
    let (mut manager, handle) = ready_manager();
    manager.move_gantry(3, 5, true).expect("move");
    assert_eq!(handle.gantry_writes(), vec![70]);
    assert_eq!(manager.state().gantry, GantryPosition::new(3, 5));
}

#[test]
fn graveyard_is_reachable_but_not_beyond() {
    let (mut manager, handle) = ready_manager();
    manager.move_gantry(9, 0, true).expect("graveyard");
    assert_eq!(handle.gantry(), GantryPosition::new(9, 0));
    assert!(matches!(
        manager.move_gantry(10, 0, true),
        Err(DeviceError::InvalidPosition { file: 10, rank: 0 })
    ));
    assert_eq!(handle.gantry_writes(), vec![0xA1]);
}

#[test]
fn electromagnet_on_then_off() {
    let (mut manager, handle) = ready_manager();
    manager.set_electromagnet(true, true).expect("on");
    assert!(manager.state().electromagnet);
    manager.set_electromagnet(false, true).expect("off");
    assert!(!manager.state().electromagnet);
    assert_eq!(handle.board_writes(), vec![0b110, 0b010]);
}

#[test]
fn commands_before_ready_are_rejected() {
    let slow = DeviceConfig {
        warmup_ms: 60_000,
        ..config()
    };
    let (mut manager, handle, _) = manager_with(&slow, ButtonHandlers::new());
    manager.poll().expect("poll");
    assert!(!manager.is_ready());
    assert!(matches!(
        manager.move_gantry(1, 1, false),
        Err(DeviceError::NotReady)
    ));
    assert!(matches!(
        manager.set_electromagnet(true, false),
        Err(DeviceError::NotReady)
    ));
    assert!(matches!(
        manager.set_button_light(Button::Start, true, None),
        Err(DeviceError::NotReady)
    ));
    assert!(matches!(
        manager.set_led_palette(LedPalette::Ready),
        Err(DeviceError::NotReady)
    ));
    assert!(handle.gantry_writes().is_empty());
    assert!(handle.board_writes().is_empty());
}

#[test]
fn ready_needs_both_controllers_and_fires_once() {
    let (mut manager, handle, sink) = manager_with(&config(), ButtonHandlers::new());
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    manager.set_ready_callback(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    handle.set_silent(true);
    manager.poll().expect("poll");
    assert!(!manager.is_ready());

    handle.set_silent(false);
    for _ in 0..3 {
        manager.poll().expect("poll");
    }
    assert!(manager.is_ready());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(sink.contains("Devices ready"));
}

#[test]
fn buttons_dispatch_on_press_edge_only() {
    let presses = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&presses);
    let handlers = ButtonHandlers::new()
        .with(Button::Player, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("handlers");
    let (mut manager, handle, _) = manager_with(&config(), handlers);
    manager.poll().expect("poll");

    handle.press(Button::Player);
    manager.poll().expect("poll");
    assert_eq!(presses.load(Ordering::SeqCst), 1);
    assert!(!manager.state().pressed(Button::Player));

    // Idle status bytes never re-trigger.
    manager.poll().expect("poll");
    assert_eq!(presses.load(Ordering::SeqCst), 1);

    handle.press(Button::Player);
    handle.press(Button::Computer);
    manager.poll().expect("poll");
    assert_eq!(presses.load(Ordering::SeqCst), 2);
}

#[test]
fn blocking_wait_times_out_when_nothing_moves() {
    let (mut manager, handle) = ready_manager();
    handle.set_frozen(true);
    match manager.move_gantry(4, 4, true) {
        Err(DeviceError::WaitTimeout { what, .. }) => assert_eq!(what, "gantry move"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(matches!(
        manager.set_electromagnet(true, true),
        Err(DeviceError::WaitTimeout { .. })
    ));
    // Non-blocking commands return right away.
    manager.move_gantry(4, 4, false).expect("fire and forget");
}

#[test]
fn button_light_with_others() {
    let (mut manager, handle) = ready_manager();
    manager
        .set_button_light(Button::Start, true, Some(false))
        .expect("lights");
    let writes = handle.board_writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(
        writes[0],
        BoardCommand::ButtonLight {
            button: Button::Start,
            enabled: true
        }
        .encode()
    );
    assert!(handle.light(Button::Start));
    for b in [Button::Fun, Button::Computer, Button::Player] {
        assert!(!handle.light(b));
    }

    handle.clear_writes();
    manager
        .set_button_light(Button::Fun, true, None)
        .expect("one light");
    assert_eq!(handle.board_writes().len(), 1);
}

#[test]
fn write_failure_surfaces_as_io_error() {
    let (mut manager, handle) = ready_manager();
    handle.fail_next_writes(1);
    assert!(matches!(
        manager.set_led_palette(LedPalette::Fail),
        Err(DeviceError::Io(_))
    ));
    manager.set_led_palette(LedPalette::Ready).expect("recovers");
    assert_eq!(handle.palette(), Some(LedPalette::Ready));
}
