//! Ambilight Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, den Command Arbiter und Pure Functions.
//! Mit Feature `std` kommt ein Datei-basierter StateStore dazu.

#![cfg_attr(not(feature = "std"), no_std)]

// Muss vor allen anderen Modulen stehen (Logging-Makros)
#[macro_use]
mod fmt;

pub mod arbiter;
pub mod color;
pub mod protocol;
pub mod store;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use arbiter::{ArbiterError, CommandArbiter};
pub use color::{kelvin_to_rgb, mired_to_kelvin};
pub use protocol::{ParseError, Topics};
#[cfg(feature = "std")]
pub use store::FileStateStore;
pub use store::{FlashStateStore, MemoryStateStore, StateStore, StoreError};
pub use traits::{LedError, SmartLedWriter, StatePublisher};
pub use types::{ArbiterOutcome, Capabilities, CommandEvent, LightState};

// RGB Farb-Typ für Aufrufer ohne eigene rgb-Dependency
pub use rgb::RGB8;
