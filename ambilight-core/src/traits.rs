//! Hardware Abstraction Traits
//!
//! Diese Traits definieren die Schnittstellen zur LED-Leiste und zum
//! MQTT-Transport ohne konkrete Implementierung.

use rgb::RGB8;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    WriteFailed,
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf eine RGB LED-Leiste (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtStripWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter {
    /// Setzt alle Pixel der Leiste auf eine Farbe und übernimmt den Frame
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn fill(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Trait für ausgehende Status-Nachrichten
///
/// Fire-and-forget: keine Zustellbestätigung. Die Firmware reicht die
/// Nachrichten über einen Channel an den MQTT-Task weiter.
pub trait StatePublisher {
    /// Sendet den An/Aus-Zustand (`GetOn`)
    fn publish_on(&mut self, on: bool);

    /// Sendet die aktuelle Farbe (`GetRGB`)
    fn publish_rgb(&mut self, color: RGB8);
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LedError::WriteFailed => defmt::write!(fmt, "LED write failed"),
        }
    }
}
