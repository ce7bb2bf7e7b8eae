// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul kapselt Hardware-Zugriffe hinter den Traits aus
// ambilight-core (SmartLedWriter, StateStore).

pub mod strip_writer;

pub use strip_writer::{LED_BUFFER_SIZE, RmtStripWriter, StripBuffer};
