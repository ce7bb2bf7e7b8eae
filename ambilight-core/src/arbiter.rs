//! Command Arbiter - Herzstück der Bridge
//!
//! Nimmt genau ein `CommandEvent` entgegen, entscheidet über den neuen
//! Zustand und treibt LED-Leiste, Persistenz und Publisher an:
//!
//! ```text
//! Event → load() → Regeln anwenden → save() → fill() → publish
//! ```
//!
//! Der Arbiter wird von genau einem Task besessen. Zustand und
//! Unterdrückungs-Flag werden nie verschränkt verarbeitet.

use core::fmt;

use crate::color::{kelvin_to_rgb, mired_to_kelvin};
use crate::store::{StateStore, StoreError};
use crate::traits::{SmartLedWriter, StatePublisher};
use crate::types::{ArbiterOutcome, Capabilities, CommandEvent, LightState};
use rgb::RGB8;

/// Fehler-Typ des Arbiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterError {
    /// Persistenz nicht verfügbar: Aufrufer entscheidet über Degradierung
    Store(StoreError),
    /// Kommando mit ungültigem Inhalt (z.B. 0 Mired)
    InvalidCommand,
}

impl From<StoreError> for ArbiterError {
    fn from(e: StoreError) -> Self {
        ArbiterError::Store(e)
    }
}

impl fmt::Display for ArbiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArbiterError::Store(e) => write!(f, "state store: {e}"),
            ArbiterError::InvalidCommand => write!(f, "invalid command"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ArbiterError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ArbiterError::Store(e) => defmt::write!(fmt, "state store: {}", e),
            ArbiterError::InvalidCommand => defmt::write!(fmt, "invalid command"),
        }
    }
}

/// Command Arbiter
///
/// # Trait-basierte Abstraktion
/// - `S: StateStore`: Flash, Datei oder RAM
/// - `L: SmartLedWriter`: echte Leiste (RMT) oder Mock
/// - `P: StatePublisher`: MQTT-Channel oder Mock
pub struct CommandArbiter<S, L, P> {
    store: S,
    led: L,
    publisher: P,
    capabilities: Capabilities,
    /// "Nächstes Farbkommando ignorieren" (nach Startup gesetzt)
    suppress_next_color: bool,
}

impl<S, L, P> CommandArbiter<S, L, P>
where
    S: StateStore,
    L: SmartLedWriter,
    P: StatePublisher,
{
    pub fn new(store: S, led: L, publisher: P, capabilities: Capabilities) -> Self {
        Self {
            store,
            led,
            publisher,
            capabilities,
            suppress_next_color: false,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Ist die Unterdrückung des nächsten Farbkommandos scharf?
    pub fn is_suppressing(&self) -> bool {
        self.suppress_next_color
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn led_mut(&mut self) -> &mut L {
        &mut self.led
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Boot: gespeicherten Zustand laden und auf die Leiste schreiben
    pub fn restore(&mut self) -> Result<LightState, ArbiterError> {
        let state = self.store.load()?;
        info!("Arbiter: restoring {}", state);
        self.render(&state);
        Ok(state)
    }

    /// (Re)Connect: aktuellen Zustand publishen, ohne ihn zu ändern
    pub fn publish_current(&mut self) -> Result<LightState, ArbiterError> {
        let state = self.store.load()?;
        self.publish(&state);
        Ok(state)
    }

    /// Verarbeitet ein einzelnes Event
    ///
    /// Bei einem Fehler bleiben Zustand und Flag unverändert und es wird
    /// weder gerendert noch gepublished.
    pub fn handle(&mut self, event: CommandEvent) -> Result<ArbiterOutcome, ArbiterError> {
        debug!("Arbiter: handling {}", event);

        match event {
            CommandEvent::Startup => {
                // Reine RGB-Variante: sofort den aktuellen Zustand zurückmelden
                if !self.capabilities.supports_color_temperature {
                    self.publish_current()?;
                }
                self.suppress_next_color = true;
                info!("Arbiter: startup received, next color command will be ignored");
                Ok(ArbiterOutcome::Armed)
            }
            CommandEvent::SetOn(on) => {
                let mut state = self.store.load()?;
                state.on = on;
                self.commit(&state)?;
                Ok(ArbiterOutcome::Applied)
            }
            CommandEvent::SetRgb(color) => self.handle_color(color),
            CommandEvent::SetColorTemperature(mired) => {
                if !self.capabilities.supports_color_temperature {
                    warn!("Arbiter: color temperature not supported, dropping command");
                    return Ok(ArbiterOutcome::Unsupported);
                }
                let kelvin = mired_to_kelvin(mired).ok_or(ArbiterError::InvalidCommand)?;
                let color = kelvin_to_rgb(kelvin);
                debug!(
                    "Arbiter: {} mired = {}K -> ({}, {}, {})",
                    mired, kelvin, color.r, color.g, color.b
                );
                self.handle_color(color)
            }
        }
    }

    /// Gemeinsamer Pfad für RGB und Farbtemperatur
    ///
    /// Das Flag wird erst nach erfolgreichem Speichern verbraucht.
    fn handle_color(&mut self, color: RGB8) -> Result<ArbiterOutcome, ArbiterError> {
        let mut state = self.store.load()?;

        let outcome = if self.suppress_next_color {
            ArbiterOutcome::Suppressed
        } else {
            state.apply_color(color);
            ArbiterOutcome::Applied
        };

        self.commit(&state)?;

        if outcome == ArbiterOutcome::Suppressed {
            self.suppress_next_color = false;
            info!("Arbiter: color command ignored after startup");
        }
        Ok(outcome)
    }

    /// Speichern, rendern, publishen - in dieser Reihenfolge
    ///
    /// Schlägt das Speichern fehl, bleibt die Leiste unverändert.
    fn commit(&mut self, state: &LightState) -> Result<(), ArbiterError> {
        self.store.save(state)?;
        self.render(state);
        self.publish(state);
        Ok(())
    }

    fn render(&mut self, state: &LightState) {
        // Hardware-Fehler nur loggen, Session läuft weiter
        if let Err(e) = self.led.fill(state.rendered_color()) {
            error!("Arbiter: failed to write LED strip: {}", e);
        }
    }

    /// Aus: nur "false". An: "true" und danach die Farbe.
    fn publish(&mut self, state: &LightState) {
        if state.on {
            self.publisher.publish_on(true);
            self.publisher.publish_rgb(state.color());
        } else {
            self.publisher.publish_on(false);
        }
    }
}
