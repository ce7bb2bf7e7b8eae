//! Integration Tests für den Command Arbiter
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen die Mocks aus
//! `ambilight_tests`.

use ambilight_core::{
    ArbiterError, ArbiterOutcome, Capabilities, CommandArbiter, CommandEvent, LightState,
    MemoryStateStore, StateStore, StoreError,
};
use ambilight_tests::{FailingStore, MockLedWriter, Published, RecordingPublisher};
use rgb::RGB8;

type TestArbiter = CommandArbiter<MemoryStateStore, MockLedWriter, RecordingPublisher>;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

fn arbiter_with(state: LightState) -> TestArbiter {
    CommandArbiter::new(
        MemoryStateStore::with_state(state),
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    )
}

fn stored(arbiter: &TestArbiter) -> LightState {
    arbiter.store().clone().read().unwrap().unwrap()
}

fn state(on: bool, r: u8, g: u8, b: u8) -> LightState {
    LightState { on, r, g, b }
}

// ============================================================================
// Tests: SetRgb
// ============================================================================

#[test]
fn test_set_rgb_applies_color_and_switches_on() {
    let mut arbiter = arbiter_with(state(false, 1, 1, 1));

    let outcome = arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 10, g: 20, b: 30 }));

    assert_eq!(outcome, Ok(ArbiterOutcome::Applied));
    assert_eq!(stored(&arbiter), state(true, 10, 20, 30));
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 10, g: 20, b: 30 }));
}

#[test]
fn test_set_rgb_black_switches_off_and_keeps_color() {
    let mut arbiter = arbiter_with(state(true, 10, 20, 30));

    arbiter.handle(CommandEvent::SetRgb(BLACK)).unwrap();

    assert_eq!(stored(&arbiter), state(false, 10, 20, 30));
    assert_eq!(arbiter.led().last_color, Some(BLACK));
}

#[test]
fn test_set_rgb_is_idempotent() {
    let mut arbiter = arbiter_with(LightState::default());
    let color = RGB8 { r: 5, g: 6, b: 7 };

    arbiter.handle(CommandEvent::SetRgb(color)).unwrap();
    let first_state = stored(&arbiter);
    let first_render = arbiter.led().last_color;
    let first_publish = arbiter.publisher_mut().take();

    arbiter.handle(CommandEvent::SetRgb(color)).unwrap();

    assert_eq!(stored(&arbiter), first_state);
    assert_eq!(arbiter.led().last_color, first_render);
    assert_eq!(arbiter.publisher_mut().take(), first_publish);
    assert_eq!(arbiter.led().write_count, 2);
}

// ============================================================================
// Tests: SetOn
// ============================================================================

#[test]
fn test_set_on_false_renders_black_and_keeps_color() {
    let mut arbiter = arbiter_with(state(true, 100, 0, 50));

    arbiter.handle(CommandEvent::SetOn(false)).unwrap();

    assert_eq!(stored(&arbiter), state(false, 100, 0, 50));
    assert_eq!(arbiter.led().last_color, Some(BLACK));
    assert_eq!(arbiter.publisher().messages, vec![Published::On(false)]);
}

#[test]
fn test_set_on_true_restores_last_color() {
    let mut arbiter = arbiter_with(state(false, 100, 0, 50));

    arbiter.handle(CommandEvent::SetOn(true)).unwrap();

    assert_eq!(stored(&arbiter), state(true, 100, 0, 50));
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 100, g: 0, b: 50 }));
}

#[test]
fn test_set_on_does_not_consume_suppression() {
    let mut arbiter = arbiter_with(LightState::default());

    arbiter.handle(CommandEvent::Startup).unwrap();
    arbiter.handle(CommandEvent::SetOn(false)).unwrap();

    assert!(arbiter.is_suppressing());
}

// ============================================================================
// Tests: Startup / Unterdrückung
// ============================================================================

#[test]
fn test_startup_suppresses_exactly_one_color_command() {
    let before = state(true, 1, 2, 3);
    let mut arbiter = arbiter_with(before);
    let color = RGB8 { r: 10, g: 20, b: 30 };

    assert_eq!(arbiter.handle(CommandEvent::Startup), Ok(ArbiterOutcome::Armed));
    assert!(arbiter.is_suppressing());
    // Startup alleine rendert und published nichts
    assert_eq!(arbiter.led().write_count, 0);
    assert!(arbiter.publisher().messages.is_empty());

    // Erstes Farbkommando: verworfen, alter Zustand wird neu ausgegeben
    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(color)),
        Ok(ArbiterOutcome::Suppressed)
    );
    assert!(!arbiter.is_suppressing());
    assert_eq!(stored(&arbiter), before);
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 1, g: 2, b: 3 }));
    assert_eq!(
        arbiter.publisher_mut().take(),
        vec![Published::On(true), Published::Rgb(RGB8 { r: 1, g: 2, b: 3 })]
    );

    // Zweites Farbkommando: wird übernommen
    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(color)),
        Ok(ArbiterOutcome::Applied)
    );
    assert_eq!(stored(&arbiter), state(true, 10, 20, 30));
}

#[test]
fn test_repeated_startup_arms_only_once() {
    let mut arbiter = arbiter_with(LightState::default());

    arbiter.handle(CommandEvent::Startup).unwrap();
    arbiter.handle(CommandEvent::Startup).unwrap();

    let color = RGB8 { r: 9, g: 9, b: 9 };
    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(color)),
        Ok(ArbiterOutcome::Suppressed)
    );
    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(color)),
        Ok(ArbiterOutcome::Applied)
    );
}

#[test]
fn test_suppressed_black_does_not_switch_off() {
    let mut arbiter = arbiter_with(state(true, 1, 2, 3));

    arbiter.handle(CommandEvent::Startup).unwrap();
    arbiter.handle(CommandEvent::SetRgb(BLACK)).unwrap();

    assert_eq!(stored(&arbiter), state(true, 1, 2, 3));
}

#[test]
fn test_color_temperature_consumes_suppression() {
    let mut arbiter = arbiter_with(state(true, 1, 2, 3));

    arbiter.handle(CommandEvent::Startup).unwrap();
    assert_eq!(
        arbiter.handle(CommandEvent::SetColorTemperature(153)),
        Ok(ArbiterOutcome::Suppressed)
    );
    assert_eq!(stored(&arbiter), state(true, 1, 2, 3));
    assert!(!arbiter.is_suppressing());
}

#[test]
fn test_plain_rgb_variant_republishes_on_startup() {
    let mut arbiter = CommandArbiter::new(
        MemoryStateStore::with_state(state(true, 4, 5, 6)),
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities {
            supports_color_temperature: false,
        },
    );

    assert_eq!(arbiter.handle(CommandEvent::Startup), Ok(ArbiterOutcome::Armed));

    assert!(arbiter.is_suppressing());
    assert_eq!(arbiter.led().write_count, 0);
    assert_eq!(
        arbiter.publisher().messages,
        vec![Published::On(true), Published::Rgb(RGB8 { r: 4, g: 5, b: 6 })]
    );
}

// ============================================================================
// Tests: SetColorTemperature
// ============================================================================

#[test]
fn test_color_temperature_applies_like_rgb() {
    let mut arbiter = arbiter_with(state(false, 0, 0, 1));

    // 153 mired → 6535K → (255, 254, 250)
    assert_eq!(
        arbiter.handle(CommandEvent::SetColorTemperature(153)),
        Ok(ArbiterOutcome::Applied)
    );

    assert_eq!(stored(&arbiter), state(true, 255, 254, 250));
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 255, g: 254, b: 250 }));
}

#[test]
fn test_zero_mired_is_rejected_without_side_effects() {
    let before = state(true, 1, 2, 3);
    let mut arbiter = arbiter_with(before);
    arbiter.handle(CommandEvent::Startup).unwrap();

    assert_eq!(
        arbiter.handle(CommandEvent::SetColorTemperature(0)),
        Err(ArbiterError::InvalidCommand)
    );

    assert_eq!(stored(&arbiter), before);
    assert!(arbiter.is_suppressing());
    assert_eq!(arbiter.led().write_count, 0);
    assert!(arbiter.publisher().messages.is_empty());
}

#[test]
fn test_color_temperature_unsupported_is_dropped() {
    let before = state(true, 1, 2, 3);
    let mut arbiter = CommandArbiter::new(
        MemoryStateStore::with_state(before),
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities {
            supports_color_temperature: false,
        },
    );

    assert_eq!(
        arbiter.handle(CommandEvent::SetColorTemperature(250)),
        Ok(ArbiterOutcome::Unsupported)
    );
    assert_eq!(stored(&arbiter), before);
    assert_eq!(arbiter.led().write_count, 0);
    assert!(arbiter.publisher().messages.is_empty());
}

// ============================================================================
// Tests: Publish-Vertrag
// ============================================================================

#[test]
fn test_publish_when_on_sends_on_then_rgb() {
    let mut arbiter = arbiter_with(LightState::default());

    arbiter
        .handle(CommandEvent::SetRgb(RGB8 { r: 7, g: 8, b: 9 }))
        .unwrap();

    assert_eq!(
        arbiter.publisher().messages,
        vec![Published::On(true), Published::Rgb(RGB8 { r: 7, g: 8, b: 9 })]
    );
}

#[test]
fn test_publish_when_off_sends_only_off() {
    let mut arbiter = arbiter_with(LightState::default());

    arbiter.handle(CommandEvent::SetRgb(BLACK)).unwrap();

    assert_eq!(arbiter.publisher().messages, vec![Published::On(false)]);
}

#[test]
fn test_publish_current_does_not_render() {
    let mut arbiter = arbiter_with(state(false, 3, 3, 3));

    assert_eq!(arbiter.publish_current(), Ok(state(false, 3, 3, 3)));

    assert_eq!(arbiter.led().write_count, 0);
    assert_eq!(arbiter.publisher().messages, vec![Published::On(false)]);
}

// ============================================================================
// Tests: Boot / Fehlerfälle
// ============================================================================

#[test]
fn test_restore_creates_and_renders_default() {
    let mut arbiter = CommandArbiter::new(
        MemoryStateStore::new(),
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    );

    assert_eq!(arbiter.restore(), Ok(LightState::default()));

    assert_eq!(stored(&arbiter), LightState::default());
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 255, g: 255, b: 255 }));
    assert!(arbiter.publisher().messages.is_empty());
}

#[test]
fn test_render_failure_still_persists_and_publishes() {
    let mut arbiter = arbiter_with(LightState::default());
    arbiter.led_mut().fail_next_write = true;

    let outcome = arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 1, g: 0, b: 0 }));

    assert_eq!(outcome, Ok(ArbiterOutcome::Applied));
    assert_eq!(stored(&arbiter), state(true, 1, 0, 0));
    assert_eq!(arbiter.publisher().messages.len(), 2);
}

#[test]
fn test_store_read_failure_has_no_side_effects() {
    let mut store = FailingStore::with_state(LightState::default());
    store.fail_read = true;
    let mut arbiter = CommandArbiter::new(
        store,
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    );
    arbiter.handle(CommandEvent::Startup).unwrap();

    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 1, g: 2, b: 3 })),
        Err(ArbiterError::Store(StoreError::Driver))
    );

    assert!(arbiter.is_suppressing());
    assert_eq!(arbiter.led().write_count, 0);
    assert!(arbiter.publisher().messages.is_empty());
}

#[test]
fn test_store_save_failure_skips_publish() {
    let mut store = FailingStore::with_state(LightState::default());
    store.fail_save = true;
    let mut arbiter = CommandArbiter::new(
        store,
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    );

    assert_eq!(
        arbiter.handle(CommandEvent::SetOn(false)),
        Err(ArbiterError::Store(StoreError::Driver))
    );
    assert!(arbiter.publisher().messages.is_empty());
}

#[test]
fn test_save_failure_after_startup_keeps_led_and_flag() {
    let mut store = FailingStore::with_state(state(true, 1, 2, 3));
    store.fail_save = true;
    let mut arbiter = CommandArbiter::new(
        store,
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    );
    arbiter.handle(CommandEvent::Startup).unwrap();

    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 9, g: 9, b: 9 })),
        Err(ArbiterError::Store(StoreError::Driver))
    );

    // Nichts sichtbar geändert, Flag noch scharf
    assert!(arbiter.is_suppressing());
    assert_eq!(arbiter.led().write_count, 0);
    assert!(arbiter.publisher().messages.is_empty());

    // Flash wieder verfügbar: der nächste Farbbefehl wird ignoriert
    arbiter.store_mut().fail_save = false;
    assert_eq!(
        arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 200, g: 0, b: 0 })),
        Ok(ArbiterOutcome::Suppressed)
    );
    assert!(!arbiter.is_suppressing());
    assert_eq!(arbiter.led().last_color, Some(RGB8 { r: 1, g: 2, b: 3 }));
    assert_eq!(arbiter.store().inner.clone().read(), Ok(Some(state(true, 1, 2, 3))));
}

#[test]
fn test_save_failure_leaves_strip_untouched() {
    let mut store = FailingStore::with_state(state(true, 1, 2, 3));
    store.fail_save = true;
    let mut arbiter = CommandArbiter::new(
        store,
        MockLedWriter::new(),
        RecordingPublisher::new(),
        Capabilities::default(),
    );

    assert!(arbiter.handle(CommandEvent::SetRgb(RGB8 { r: 200, g: 0, b: 0 })).is_err());

    assert_eq!(arbiter.led().last_color, None);
    assert_eq!(arbiter.store().inner.clone().read(), Ok(Some(state(true, 1, 2, 3))));
}

#[test]
fn test_very_warm_color_temperature_clamps_to_1000k() {
    let mut arbiter = arbiter_with(LightState::default());

    // 70000 mired → 14K → geklemmt auf 1000K
    assert_eq!(
        arbiter.handle(CommandEvent::SetColorTemperature(70_000)),
        Ok(ArbiterOutcome::Applied)
    );
    assert_eq!(stored(&arbiter), state(true, 255, 67, 0));
}
