//! Mock-Implementierungen für die Host-Tests
//!
//! Die Tests laufen auf dem Host (x86_64) und ersetzen LED-Leiste,
//! MQTT-Publisher und Flash durch In-Memory Mocks.

use ambilight_core::{
    LedError, LightState, MemoryStateStore, SmartLedWriter, StatePublisher, StateStore,
    StoreError,
};
use embedded_storage::nor_flash::{ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash};
use rgb::RGB8;

// ============================================================================
// Mock LED Writer
// ============================================================================

#[derive(Default)]
pub struct MockLedWriter {
    pub last_color: Option<RGB8>,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockLedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SmartLedWriter for MockLedWriter {
    fn fill(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.last_color = Some(color);
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Recording Publisher
// ============================================================================

/// Eine ausgehende Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    On(bool),
    Rgb(RGB8),
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Vec<Published>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gibt alle bisher gesendeten Nachrichten zurück und leert die Liste
    pub fn take(&mut self) -> Vec<Published> {
        std::mem::take(&mut self.messages)
    }
}

impl StatePublisher for RecordingPublisher {
    fn publish_on(&mut self, on: bool) {
        self.messages.push(Published::On(on));
    }

    fn publish_rgb(&mut self, color: RGB8) {
        self.messages.push(Published::Rgb(color));
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// StateStore der auf Kommando fehlschlägt
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStateStore,
    pub fail_read: bool,
    pub fail_save: bool,
}

impl FailingStore {
    pub fn with_state(state: LightState) -> Self {
        Self {
            inner: MemoryStateStore::with_state(state),
            ..Self::default()
        }
    }
}

impl StateStore for FailingStore {
    fn read(&mut self) -> Result<Option<LightState>, StoreError> {
        if self.fail_read {
            return Err(StoreError::Driver);
        }
        self.inner.read()
    }

    fn save(&mut self, state: &LightState) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Driver);
        }
        self.inner.save(state)
    }
}

// ============================================================================
// Mock NOR-Flash
// ============================================================================

pub const MOCK_SECTOR_SIZE: usize = 4096;

/// NOR-Flash im RAM (gelöscht = 0xFF)
pub struct MockFlash {
    pub data: Vec<u8>,
    pub erase_count: usize,
    /// Nächster Write schreibt nur so viele Bytes und schlägt dann fehl
    pub tear_next_write: Option<usize>,
}

impl MockFlash {
    pub fn new(sectors: usize) -> Self {
        Self {
            data: vec![0xFF; sectors * MOCK_SECTOR_SIZE],
            erase_count: 0,
            tear_next_write: None,
        }
    }

    fn check_range(&self, offset: u32, len: usize) -> Result<(), NorFlashErrorKind> {
        if offset as usize + len > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        Ok(())
    }
}

impl ErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_range(offset, bytes.len())?;
        let start = offset as usize;
        bytes.copy_from_slice(&self.data[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for MockFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = MOCK_SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from as usize % MOCK_SECTOR_SIZE != 0 || to as usize % MOCK_SECTOR_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        self.check_range(from, (to - from) as usize)?;
        self.data[from as usize..to as usize].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if offset as usize % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        self.check_range(offset, bytes.len())?;
        let start = offset as usize;

        if let Some(limit) = self.tear_next_write.take() {
            let limit = limit.min(bytes.len());
            self.data[start..start + limit].copy_from_slice(&bytes[..limit]);
            return Err(NorFlashErrorKind::Other);
        }

        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}
