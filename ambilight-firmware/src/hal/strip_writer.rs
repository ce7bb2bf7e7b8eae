// SmartLED Strip Writer (RenderSink)
//
// Schreibt eine Farbe auf alle LEDs der Leiste über das RMT Peripheral.
// Trait und Mock liegen in ambilight-core bzw. ambilight-tests.

use esp_hal::Blocking;
use esp_hal::rmt::{PulseCode, Rmt};
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::config::LED_COUNT;
use ambilight_core::{LedError, SmartLedWriter};

/// Buffer-Größe für die ganze Leiste (LEDs * 3 Farben * 8 Bits + 1 Reset)
pub const LED_BUFFER_SIZE: usize = LED_COUNT * 24 + 1;

/// RMT Buffer-Typ (erstellt mit smart_led_buffer!(LED_COUNT) Macro)
pub type StripBuffer = [PulseCode; LED_BUFFER_SIZE];

/// Real Hardware Strip Writer
///
/// Nutzt ESP32 RMT Peripheral um WS2812 LEDs anzusteuern.
///
/// Hinweis: Der Buffer muss 'static sein, daher wird er im Task erstellt
/// und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtStripWriter<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
}

impl<'a> RmtStripWriter<'a> {
    /// Erstellt einen neuen RmtStripWriter
    ///
    /// # Parameter
    /// - `gpio18`: GPIO18 Peripheral für die Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten
    pub fn new(
        gpio18: esp_hal::peripherals::GPIO18<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut StripBuffer,
    ) -> Result<Self, LedError> {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .map_err(|_| LedError::WriteFailed)?;

        let led = SmartLedsAdapter::new(rmt.channel0, gpio18, buffer);

        Ok(Self { led })
    }
}

impl<'a> SmartLedWriter for RmtStripWriter<'a> {
    /// Solid-Color-Wipe: jede LED bekommt dieselbe Farbe, dann Latch
    fn fill(&mut self, color: RGB8) -> Result<(), LedError> {
        self.led
            .write(core::iter::repeat_n(color, LED_COUNT))
            .map_err(|_| LedError::WriteFailed)
    }
}
