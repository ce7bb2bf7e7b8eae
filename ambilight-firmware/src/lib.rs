// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von ambilight-core
pub use ambilight_core::{
    ArbiterOutcome, CommandArbiter, CommandEvent, LightState, SmartLedWriter, StatePublisher,
};

// RGB Farb-Typ (direkt von rgb crate)
use rgb::RGB8;

// Embassy Channel-Typen
use defmt::warn;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::config::{INBOUND_QUEUE_SIZE, OUTBOUND_QUEUE_SIZE};

// ============================================================================
// Nachrichten zwischen MQTT-Task und Arbiter-Task
// ============================================================================

/// Eingang des Arbiters (MQTT → Arbiter)
#[derive(Clone, Copy, defmt::Format)]
pub enum Inbound {
    /// Dekodiertes Kommando aus einem Eingangs-Topic
    Command(CommandEvent),
    /// MQTT-Session (neu) verbunden: aktuellen Zustand publishen
    Connected,
}

/// Ausgehende Status-Nachricht (Arbiter → MQTT)
#[derive(Clone, Copy, defmt::Format)]
pub enum Outbound {
    /// `GetOn`
    On(bool),
    /// `GetRGB`
    Rgb(RgbPayload),
}

/// RGB8 mit defmt::Format (rgb crate hat kein defmt-Feature)
#[derive(Clone, Copy, defmt::Format)]
pub struct RgbPayload {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<RGB8> for RgbPayload {
    fn from(color: RGB8) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

impl From<RgbPayload> for RGB8 {
    fn from(payload: RgbPayload) -> Self {
        RGB8 {
            r: payload.r,
            g: payload.g,
            b: payload.b,
        }
    }
}

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Sender<'static, NoopRawMutex, Inbound, 4>
// Nutze:  InboundSender

/// Channel für Kommandos (MQTT Task → Strip Task)
pub type InboundChannel = Channel<NoopRawMutex, Inbound, INBOUND_QUEUE_SIZE>;

/// Sender für Kommandos (MQTT Task sendet)
pub type InboundSender = Sender<'static, NoopRawMutex, Inbound, INBOUND_QUEUE_SIZE>;

/// Receiver für Kommandos (Strip Task empfängt)
pub type InboundReceiver = Receiver<'static, NoopRawMutex, Inbound, INBOUND_QUEUE_SIZE>;

/// Channel für Status-Nachrichten (Strip Task → MQTT Task)
pub type OutboundChannel = Channel<NoopRawMutex, Outbound, OUTBOUND_QUEUE_SIZE>;

/// Sender für Status-Nachrichten
pub type OutboundSender = Sender<'static, NoopRawMutex, Outbound, OUTBOUND_QUEUE_SIZE>;

/// Receiver für Status-Nachrichten
pub type OutboundReceiver = Receiver<'static, NoopRawMutex, Outbound, OUTBOUND_QUEUE_SIZE>;

// ============================================================================
// StatePublisher über Channel
// ============================================================================

/// Reicht Status-Nachrichten des Arbiters an den MQTT-Task weiter
///
/// Fire-and-forget: ist der Channel voll (z.B. Broker getrennt),
/// wird die Nachricht verworfen. Nach dem Reconnect wird der
/// aktuelle Zustand ohnehin neu gepublished.
pub struct ChannelPublisher {
    sender: OutboundSender,
}

impl ChannelPublisher {
    pub fn new(sender: OutboundSender) -> Self {
        Self { sender }
    }

    fn send(&self, message: Outbound) {
        if self.sender.try_send(message).is_err() {
            warn!("Publisher: outbound queue full, dropping {}", message);
        }
    }
}

impl StatePublisher for ChannelPublisher {
    fn publish_on(&mut self, on: bool) {
        self.send(Outbound::On(on));
    }

    fn publish_rgb(&mut self, color: RGB8) {
        self.send(Outbound::Rgb(color.into()));
    }
}
