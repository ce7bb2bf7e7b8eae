//! Integration Tests für das Topic-Routing

use ambilight_core::{CommandEvent, ParseError, Topics};
use rgb::RGB8;

const TOPICS: Topics<'static> = Topics {
    set_on: "rpi-0-w/tv-ambilight/setOn",
    set_rgb: "rpi-0-w/tv-ambilight/setRGB",
    set_color_temperature: "rpi-0-w/tv-ambilight/setColorTemperature",
    startup: "rpi-0-w/tv-ambilight/startup",
    get_on: "rpi-0-w/tv-ambilight/getOn",
    get_rgb: "rpi-0-w/tv-ambilight/getRGB",
};

#[test]
fn test_decode_set_on() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setOn", b"true"),
        Ok(Some(CommandEvent::SetOn(true)))
    );
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setOn", b"TRUE"),
        Ok(Some(CommandEvent::SetOn(false)))
    );
}

#[test]
fn test_decode_set_on_binary_payload_is_off() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setOn", &[0xFF, 0xFE]),
        Ok(Some(CommandEvent::SetOn(false)))
    );
}

#[test]
fn test_decode_set_rgb() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setRGB", b"10,20,30"),
        Ok(Some(CommandEvent::SetRgb(RGB8 { r: 10, g: 20, b: 30 })))
    );
}

#[test]
fn test_decode_set_rgb_malformed() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setRGB", b"10,20"),
        Err(ParseError::FieldCount)
    );
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setRGB", &[0xFF, 0xFE]),
        Err(ParseError::Utf8)
    );
}

#[test]
fn test_decode_color_temperature() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setColorTemperature", b"153"),
        Ok(Some(CommandEvent::SetColorTemperature(153)))
    );
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setColorTemperature", b"0"),
        Err(ParseError::ZeroMired)
    );
}

#[test]
fn test_decode_color_temperature_above_u16() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/setColorTemperature", b"70000"),
        Ok(Some(CommandEvent::SetColorTemperature(70_000)))
    );
}

#[test]
fn test_decode_startup_ignores_payload() {
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/startup", &[0xFF]),
        Ok(Some(CommandEvent::Startup))
    );
    assert_eq!(
        TOPICS.decode("rpi-0-w/tv-ambilight/startup", b""),
        Ok(Some(CommandEvent::Startup))
    );
}

#[test]
fn test_decode_unknown_topic() {
    assert_eq!(TOPICS.decode("rpi-0-w/tv-ambilight/getRGB", b"1,2,3"), Ok(None));
    assert_eq!(TOPICS.decode("other/topic", b"true"), Ok(None));
}

#[test]
fn test_subscriptions_cover_all_inbound_topics() {
    let subscriptions = TOPICS.subscriptions();
    assert!(subscriptions.contains(&TOPICS.set_on));
    assert!(subscriptions.contains(&TOPICS.set_rgb));
    assert!(subscriptions.contains(&TOPICS.set_color_temperature));
    assert!(subscriptions.contains(&TOPICS.startup));
}
