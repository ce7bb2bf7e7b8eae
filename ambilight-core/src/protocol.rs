//! MQTT Payload-Protokoll
//!
//! Eingehende Payloads sind reiner Text:
//! - `SetOn`: `"true"` / `"false"` (alles außer exakt `"true"` heißt aus)
//! - `SetRGB`: `"r,g,b"` mit drei Dezimalzahlen 0-255
//! - `SetColorTemperature`: eine positive Dezimalzahl (Mired)
//! - `Startup`: Payload wird ignoriert
//!
//! Ausgehend: `GetOn` (`"true"`/`"false"`) und `GetRGB` (`"r,g,b"`).

use core::fmt::{self, Write};

use heapless::String;
use rgb::RGB8;

use crate::types::CommandEvent;

/// Payload für "eingeschaltet"
pub const ON_PAYLOAD: &str = "true";

/// Payload für "ausgeschaltet"
pub const OFF_PAYLOAD: &str = "false";

/// Maximale Länge eines RGB-Payloads: "255,255,255"
pub const RGB_PAYLOAD_LEN: usize = 11;

/// Fehler beim Dekodieren eines Payloads
///
/// Ein fehlerhafter Payload verwirft nur dieses eine Event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Payload ist kein gültiges UTF-8
    Utf8,
    /// Falsche Anzahl an Komponenten (RGB braucht genau drei)
    FieldCount,
    /// Komponente ist keine Zahl oder außerhalb des Wertebereichs
    InvalidNumber,
    /// Farbtemperatur von 0 Mired
    ZeroMired,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Utf8 => write!(f, "payload is not valid UTF-8"),
            ParseError::FieldCount => write!(f, "expected exactly three color components"),
            ParseError::InvalidNumber => write!(f, "component is not a number in range"),
            ParseError::ZeroMired => write!(f, "color temperature of 0 mired"),
        }
    }
}

/// Topic-Namen der Bridge
///
/// Die Namen sind Konfiguration, nicht Protokoll. Die Firmware setzt sie
/// zur Build-Zeit aus `.env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topics<'a> {
    pub set_on: &'a str,
    pub set_rgb: &'a str,
    pub set_color_temperature: &'a str,
    pub startup: &'a str,
    pub get_on: &'a str,
    pub get_rgb: &'a str,
}

impl<'a> Topics<'a> {
    /// Alle Topics, die abonniert werden müssen
    pub fn subscriptions(&self) -> [&'a str; 4] {
        [
            self.set_rgb,
            self.set_on,
            self.set_color_temperature,
            self.startup,
        ]
    }

    /// Dekodiert eine eingehende Nachricht in ein `CommandEvent`
    ///
    /// Gibt `Ok(None)` zurück wenn das Topic kein Eingangs-Topic ist.
    pub fn decode(&self, topic: &str, payload: &[u8]) -> Result<Option<CommandEvent>, ParseError> {
        // Startup: nur das Eintreffen zählt, Payload egal
        if topic == self.startup {
            return Ok(Some(CommandEvent::Startup));
        }

        let event = if topic == self.set_on {
            // Alles außer exakt "true" ist aus, auch ungültiges UTF-8
            CommandEvent::SetOn(payload == ON_PAYLOAD.as_bytes())
        } else if topic == self.set_rgb {
            CommandEvent::SetRgb(parse_rgb(as_text(payload)?)?)
        } else if topic == self.set_color_temperature {
            CommandEvent::SetColorTemperature(parse_mired(as_text(payload)?)?)
        } else {
            return Ok(None);
        };

        Ok(Some(event))
    }
}

fn as_text(payload: &[u8]) -> Result<&str, ParseError> {
    core::str::from_utf8(payload).map_err(|_| ParseError::Utf8)
}

/// Dekodiert einen `SetOn` Payload
///
/// Nur exakt `"true"` (kleingeschrieben) schaltet ein.
pub fn parse_on(payload: &str) -> bool {
    payload == ON_PAYLOAD
}

/// Dekodiert einen `SetRGB` Payload der Form `"r,g,b"`
///
/// ```
/// # use rgb::RGB8;
/// # use ambilight_core::protocol::parse_rgb;
/// assert_eq!(parse_rgb("10,20,30"), Ok(RGB8 { r: 10, g: 20, b: 30 }));
/// assert!(parse_rgb("10,20").is_err());
/// ```
pub fn parse_rgb(payload: &str) -> Result<RGB8, ParseError> {
    let mut parts = payload.split(',');

    let r = parse_component(parts.next())?;
    let g = parse_component(parts.next())?;
    let b = parse_component(parts.next())?;

    if parts.next().is_some() {
        return Err(ParseError::FieldCount);
    }

    Ok(RGB8 { r, g, b })
}

fn parse_component(part: Option<&str>) -> Result<u8, ParseError> {
    part.ok_or(ParseError::FieldCount)?
        .trim()
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidNumber)
}

/// Dekodiert einen `SetColorTemperature` Payload (Mired)
pub fn parse_mired(payload: &str) -> Result<u32, ParseError> {
    let mired = payload
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber)?;

    if mired == 0 {
        return Err(ParseError::ZeroMired);
    }

    Ok(mired)
}

/// Payload für `GetOn`
pub fn format_on(on: bool) -> &'static str {
    if on { ON_PAYLOAD } else { OFF_PAYLOAD }
}

/// Payload für `GetRGB`: `"r,g,b"`
pub fn format_rgb(color: RGB8) -> String<RGB_PAYLOAD_LEN> {
    let mut payload = String::new();
    // Passt immer: 3x max. 3 Ziffern + 2 Kommas
    let _ = write!(payload, "{},{},{}", color.r, color.g, color.b);
    payload
}

#[cfg(feature = "defmt")]
impl defmt::Format for ParseError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ParseError::Utf8 => defmt::write!(fmt, "invalid UTF-8"),
            ParseError::FieldCount => defmt::write!(fmt, "wrong field count"),
            ParseError::InvalidNumber => defmt::write!(fmt, "invalid number"),
            ParseError::ZeroMired => defmt::write!(fmt, "zero mired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_on_exact_match_only() {
        assert!(parse_on("true"));
        assert!(!parse_on("false"));
        assert!(!parse_on("True"));
        assert!(!parse_on("1"));
        assert!(!parse_on(""));
    }

    #[test]
    fn test_parse_rgb_valid() {
        assert_eq!(parse_rgb("255,128,0"), Ok(RGB8 { r: 255, g: 128, b: 0 }));
        assert_eq!(parse_rgb(" 1, 2 ,3\n"), Ok(RGB8 { r: 1, g: 2, b: 3 }));
    }

    #[test]
    fn test_parse_rgb_wrong_field_count() {
        assert_eq!(parse_rgb("1,2"), Err(ParseError::FieldCount));
        assert_eq!(parse_rgb("1,2,3,4"), Err(ParseError::FieldCount));
    }

    #[test]
    fn test_parse_rgb_invalid_numbers() {
        assert_eq!(parse_rgb("a,b,c"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_rgb("256,0,0"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_rgb("-1,0,0"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_rgb(""), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_parse_mired() {
        assert_eq!(parse_mired("153"), Ok(153));
        assert_eq!(parse_mired("0"), Err(ParseError::ZeroMired));
        assert_eq!(parse_mired("warm"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_mired("-153"), Err(ParseError::InvalidNumber));
        // Größer als u16, bleibt gültig (wird auf 1000K geklemmt)
        assert_eq!(parse_mired("70000"), Ok(70_000));
    }

    #[test]
    fn test_format_rgb() {
        assert_eq!(format_rgb(RGB8 { r: 255, g: 255, b: 255 }).as_str(), "255,255,255");
        assert_eq!(format_rgb(RGB8 { r: 0, g: 7, b: 42 }).as_str(), "0,7,42");
    }

    #[test]
    fn test_format_on() {
        assert_eq!(format_on(true), "true");
        assert_eq!(format_on(false), "false");
    }
}
