//! Core Types für die LED-Bridge
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;
use serde::{Deserialize, Serialize};

/// Schwarz: wird gerendert solange die Leiste aus ist
pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Persistierter Zustand der LED-Leiste
///
/// Wird als flaches Key-Value-Dokument gespeichert:
/// `{"on":true,"r":255,"g":255,"b":255}`
///
/// Die Farbwerte beschreiben immer die "zuletzt bekannte Farbe".
/// Ist `on == false`, bleiben sie erhalten und werden beim
/// nächsten Einschalten wiederhergestellt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LightState {
    /// Default-Zustand wenn noch nichts gespeichert wurde: Weiß, eingeschaltet
    fn default() -> Self {
        Self {
            on: true,
            r: 255,
            g: 255,
            b: 255,
        }
    }
}

impl LightState {
    /// Gespeicherte Farbe (unabhängig vom An/Aus-Zustand)
    pub fn color(&self) -> RGB8 {
        RGB8 {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Farbe die tatsächlich auf die Leiste geschrieben wird
    ///
    /// Aus → immer (0,0,0), egal was gespeichert ist.
    pub fn rendered_color(&self) -> RGB8 {
        if self.on { self.color() } else { BLACK }
    }

    /// Übernimmt eine Farbe nach der "alles Null heißt aus"-Regel
    ///
    /// - (0,0,0): nur `on` wird false, r/g/b bleiben erhalten
    /// - sonst: einschalten und Farbe übernehmen
    pub fn apply_color(&mut self, color: RGB8) {
        if color == BLACK {
            self.on = false;
        } else {
            self.on = true;
            self.r = color.r;
            self.g = color.g;
            self.b = color.b;
        }
    }
}

/// Eingehendes Kommando (ein MQTT-Nachricht → ein Event)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEvent {
    /// Ein-/Ausschalten, Farbe bleibt unverändert
    SetOn(bool),
    /// Absolute RGB-Farbe
    SetRgb(RGB8),
    /// Farbtemperatur in Mired
    SetColorTemperature(u32),
    /// Gegenstelle hat sich (neu) verbunden
    Startup,
}

/// Fähigkeiten des Arbiters
///
/// Vereinheitlicht die frühere reine RGB-Variante und die Variante
/// mit Farbtemperatur-Support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_color_temperature: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            supports_color_temperature: true,
        }
    }
}

/// Ergebnis der Verarbeitung eines Events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterOutcome {
    /// Neuer Zustand übernommen
    Applied,
    /// Farbkommando nach Startup verworfen, alter Zustand neu ausgegeben
    Suppressed,
    /// Startup empfangen, Unterdrückung scharf geschaltet
    Armed,
    /// Kommando wird von den konfigurierten Fähigkeiten nicht unterstützt
    Unsupported,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for LightState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "LightState {{ on: {}, rgb: ({}, {}, {}) }}",
            self.on,
            self.r,
            self.g,
            self.b
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CommandEvent::SetOn(on) => defmt::write!(fmt, "SetOn({})", on),
            CommandEvent::SetRgb(color) => {
                defmt::write!(fmt, "SetRgb({}, {}, {})", color.r, color.g, color.b)
            }
            CommandEvent::SetColorTemperature(mired) => {
                defmt::write!(fmt, "SetColorTemperature({} mired)", mired)
            }
            CommandEvent::Startup => defmt::write!(fmt, "Startup"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ArbiterOutcome {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ArbiterOutcome::Applied => defmt::write!(fmt, "Applied"),
            ArbiterOutcome::Suppressed => defmt::write!(fmt, "Suppressed"),
            ArbiterOutcome::Armed => defmt::write!(fmt, "Armed"),
            ArbiterOutcome::Unsupported => defmt::write!(fmt, "Unsupported"),
        }
    }
}
