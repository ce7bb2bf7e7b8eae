// Strip Task - Command Arbiter + LED-Leiste über RMT Peripheral
use ambilight_core::{
    ArbiterOutcome, FlashStateStore, LedError, LightState, MemoryStateStore, SmartLedWriter,
    StateStore, StoreError,
};
use defmt::{debug, error, info, warn};
use rgb::RGB8;
use esp_hal_smartled::smart_led_buffer;
use esp_storage::FlashStorage;

use crate::config::{CAPABILITIES, LED_COUNT, RMT_CLOCK_MHZ, STATE_FLASH_OFFSET};
use crate::hal::RmtStripWriter;
use crate::{ChannelPublisher, CommandArbiter, Inbound, InboundReceiver, OutboundSender};

/// StateStore der Firmware
///
/// Normalerweise Flash. Ist der Flash beim Boot nicht lesbar,
/// läuft die Bridge im Memory-only Modus weiter statt abzustürzen.
pub enum BridgeStore {
    Flash(FlashStateStore<FlashStorage<'static>>),
    Memory(MemoryStateStore),
}

impl BridgeStore {
    /// Öffnet den Flash-Store und fällt bei Fehlern auf RAM zurück
    pub fn open(flash: FlashStorage<'static>) -> Self {
        let mut store = FlashStateStore::new(flash, STATE_FLASH_OFFSET);
        match store.load() {
            Ok(state) => {
                info!("Store: loaded {} from flash", state);
                BridgeStore::Flash(store)
            }
            Err(e) => {
                error!("Store: flash unavailable ({}), running memory-only", e);
                BridgeStore::Memory(MemoryStateStore::new())
            }
        }
    }
}

impl StateStore for BridgeStore {
    fn read(&mut self) -> Result<Option<LightState>, StoreError> {
        match self {
            BridgeStore::Flash(store) => store.read(),
            BridgeStore::Memory(store) => store.read(),
        }
    }

    fn save(&mut self, state: &LightState) -> Result<(), StoreError> {
        match self {
            BridgeStore::Flash(store) => store.save(state),
            BridgeStore::Memory(store) => store.save(state),
        }
    }
}

/// LED-Ausgang der Firmware
///
/// Schlägt die RMT-Initialisierung fehl, läuft die Bridge ohne Leiste
/// weiter: Kommandos werden trotzdem gespeichert und gepublished.
pub enum BridgeStrip<'a> {
    Rmt(RmtStripWriter<'a>),
    Detached,
}

impl SmartLedWriter for BridgeStrip<'_> {
    fn fill(&mut self, color: RGB8) -> Result<(), LedError> {
        match self {
            BridgeStrip::Rmt(strip) => strip.fill(color),
            BridgeStrip::Detached => {
                debug!("Strip: no strip attached, skipping ({}, {}, {})", color.r, color.g, color.b);
                Ok(())
            }
        }
    }
}

/// Arbiter Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Verarbeitet die Eingänge strikt nacheinander:
/// - `Inbound::Command`: Event an den Arbiter (render, persist, publish)
/// - `Inbound::Connected`: aktuellen Zustand publishen
///
/// Fehler werden geloggt, die Schleife läuft immer weiter.
///
/// # Parameter
/// - `arbiter`: Arbiter mit Store, Strip Writer und Publisher
/// - `inbound`: Channel Receiver für Eingänge vom MQTT Task
pub async fn arbiter_logic<S, L>(
    mut arbiter: CommandArbiter<S, L, ChannelPublisher>,
    inbound: InboundReceiver,
) -> !
where
    S: StateStore,
    L: SmartLedWriter,
{
    // Wipe on init: gespeicherten Zustand sofort anzeigen
    if let Err(e) = arbiter.restore() {
        error!("Strip: failed to restore state: {}", e);
    }

    loop {
        match inbound.receive().await {
            Inbound::Command(event) => match arbiter.handle(event) {
                Ok(ArbiterOutcome::Applied) => info!("Strip: applied {}", event),
                Ok(ArbiterOutcome::Suppressed) => {
                    info!("Strip: {} ignored after startup", event)
                }
                Ok(ArbiterOutcome::Armed) => info!("Strip: startup, ignoring next color"),
                Ok(ArbiterOutcome::Unsupported) => warn!("Strip: {} not supported", event),
                Err(e) => error!("Strip: dropping {}: {}", event, e),
            },
            Inbound::Connected => {
                if let Err(e) = arbiter.publish_current() {
                    error!("Strip: failed to publish current state: {}", e);
                }
            }
        }
    }
}

/// Strip Task - Embassy Task für parallele Ausführung
///
/// Übernimmt Hardware-Initialisierung (RMT, Flash) und ruft dann
/// die testbare `arbiter_logic()` Funktion auf.
///
/// # Parameter
/// - `gpio18`: GPIO18 Peripheral für die Datenleitung
/// - `rmt_peripheral`: RMT Peripheral für präzises Timing
/// - `flash`: Flash-Treiber für den persistierten Zustand
/// - `inbound`: Channel Receiver für Kommandos vom MQTT Task
/// - `outbound`: Channel Sender für Status-Nachrichten an den MQTT Task
#[embassy_executor::task]
pub async fn strip_task(
    gpio18: esp_hal::peripherals::GPIO18<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    flash: FlashStorage<'static>,
    inbound: InboundReceiver,
    outbound: OutboundSender,
) {
    // Buffer für SmartLED Daten erstellen (ganze Leiste)
    // Macro allokiert Speicher im richtigen Format für RMT
    let mut rmt_buffer = smart_led_buffer!(LED_COUNT);

    let led = match RmtStripWriter::new(gpio18, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => BridgeStrip::Rmt(led),
        Err(e) => {
            error!("Strip: RMT init failed ({}), running without strip", e);
            BridgeStrip::Detached
        }
    };

    let store = BridgeStore::open(flash);
    let arbiter = CommandArbiter::new(store, led, ChannelPublisher::new(outbound), CAPABILITIES);

    arbiter_logic(arbiter, inbound).await
}
