//! Persistenz des LightState
//!
//! Es gibt genau einen Datensatz. Er wird immer komplett ersetzt, nie
//! teilweise aktualisiert. Format: flaches JSON-Dokument
//! `{"on":true,"r":255,"g":255,"b":255}`.

use core::fmt;

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};

use crate::types::LightState;

/// Maximale Länge des JSON-Dokuments in Bytes
///
/// `{"on":false,"r":255,"g":255,"b":255}` sind 36 Bytes.
pub const MAX_DOCUMENT_LEN: usize = 64;

/// Fehler-Typ für Persistenz-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Speicher-Treiber (Flash) meldet einen Fehler
    Driver,
    /// Gespeicherter Datensatz ist nicht lesbar
    Corrupt,
    /// Serialisierung fehlgeschlagen
    Encode,
    /// Dateisystem-Fehler (nur mit Feature `std`)
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Driver => write!(f, "storage driver error"),
            StoreError::Corrupt => write!(f, "persisted state is corrupt"),
            StoreError::Encode => write!(f, "state could not be encoded"),
            #[cfg(feature = "std")]
            StoreError::Io(kind) => write!(f, "state file I/O error: {kind}"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StoreError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StoreError::Driver => defmt::write!(fmt, "storage driver error"),
            StoreError::Corrupt => defmt::write!(fmt, "persisted state is corrupt"),
            StoreError::Encode => defmt::write!(fmt, "state could not be encoded"),
            #[cfg(feature = "std")]
            StoreError::Io(_) => defmt::write!(fmt, "state file I/O error"),
        }
    }
}

/// Trait für den Zugriff auf den persistierten Zustand
///
/// # Implementierungen
/// - **Production:** `FlashStateStore` (NOR-Flash, zwei Slots)
/// - **Host:** `FileStateStore` (JSON-Datei, Feature `std`)
/// - **Fallback/Testing:** `MemoryStateStore`
pub trait StateStore {
    /// Liest den gespeicherten Datensatz, `None` wenn es noch keinen gibt
    fn read(&mut self) -> Result<Option<LightState>, StoreError>;

    /// Ersetzt den gespeicherten Datensatz komplett
    ///
    /// Ein halb geschriebener Datensatz darf für `read()` nie sichtbar sein.
    fn save(&mut self, state: &LightState) -> Result<(), StoreError>;

    /// Liest den Zustand, legt beim ersten Mal den Default-Datensatz an
    fn load(&mut self) -> Result<LightState, StoreError> {
        match self.read()? {
            Some(state) => Ok(state),
            None => {
                let state = LightState::default();
                self.save(&state)?;
                Ok(state)
            }
        }
    }
}

/// Serialisiert den Zustand als JSON in `buffer`, gibt die Länge zurück
pub fn encode_state(state: &LightState, buffer: &mut [u8]) -> Result<usize, StoreError> {
    serde_json_core::to_slice(state, buffer).map_err(|_| StoreError::Encode)
}

/// Liest einen Zustand aus einem JSON-Dokument
pub fn decode_state(document: &[u8]) -> Result<LightState, StoreError> {
    serde_json_core::from_slice::<LightState>(document)
        .map(|(state, _)| state)
        .map_err(|_| StoreError::Corrupt)
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Zustand nur im RAM
///
/// Fallback wenn der Flash nicht nutzbar ist (Memory-only Betrieb),
/// außerdem für Tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    state: Option<LightState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LightState) -> Self {
        Self { state: Some(state) }
    }
}

impl StateStore for MemoryStateStore {
    fn read(&mut self) -> Result<Option<LightState>, StoreError> {
        Ok(self.state)
    }

    fn save(&mut self, state: &LightState) -> Result<(), StoreError> {
        self.state = Some(*state);
        Ok(())
    }
}

// ============================================================================
// Flash Store (zwei Slots, A/B)
// ============================================================================

/// Magic am Anfang jedes gültigen Slots
const RECORD_MAGIC: u16 = 0xA1B7;

/// Header: Magic (u16) + Sequenznummer (u32) + Dokument-Länge (u16)
const HEADER_SIZE: usize = 8;

/// Größe eines Datensatzes auf dem Flash (Header + Dokument, gepolstert)
///
/// Vielfaches aller üblichen WRITE_SIZE/READ_SIZE Werte.
pub const RECORD_SIZE: usize = 128;

/// Persistenz auf NOR-Flash mit zwei abwechselnd beschriebenen Slots
///
/// Jeder Slot belegt einen Erase-Sektor ab `base`. Geschrieben wird immer
/// in den Slot, der NICHT den neuesten Datensatz hält. Der alte Datensatz
/// bleibt gültig bis der neue komplett ist; ein abgebrochener Schreibvorgang
/// fällt beim Lesen durch Magic- oder JSON-Prüfung durch.
pub struct FlashStateStore<F: NorFlash> {
    flash: F,
    base: u32,
    /// Neuester gültiger Slot (Index, Sequenznummer), nach erstem Scan gecached
    latest: Option<(u32, u32)>,
    scanned: bool,
}

impl<F: NorFlash> FlashStateStore<F> {
    /// Erstellt einen Store ab Offset `base` (muss sektor-aligned sein)
    ///
    /// Belegt zwei Erase-Sektoren: `base` und `base + F::ERASE_SIZE`.
    pub fn new(flash: F, base: u32) -> Self {
        Self {
            flash,
            base,
            latest: None,
            scanned: false,
        }
    }

    /// Gibt den Flash-Treiber zurück
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn slot_offset(&self, slot: u32) -> u32 {
        self.base + slot * F::ERASE_SIZE as u32
    }

    /// Liest einen Slot, `None` wenn leer oder ungültig
    fn read_slot(&mut self, slot: u32) -> Result<Option<(u32, LightState)>, StoreError> {
        let mut record = [0u8; RECORD_SIZE];
        let offset = self.slot_offset(slot);
        self.flash
            .read(offset, &mut record)
            .map_err(|_| StoreError::Driver)?;

        let magic = u16::from_le_bytes([record[0], record[1]]);
        if magic != RECORD_MAGIC {
            return Ok(None);
        }

        let sequence = u32::from_le_bytes([record[2], record[3], record[4], record[5]]);
        let len = usize::from(u16::from_le_bytes([record[6], record[7]]));
        if len == 0 || len > RECORD_SIZE - HEADER_SIZE {
            warn!("Store: slot {} has invalid length {}", slot, len);
            return Ok(None);
        }

        match decode_state(&record[HEADER_SIZE..HEADER_SIZE + len]) {
            Ok(state) => Ok(Some((sequence, state))),
            Err(_) => {
                warn!("Store: slot {} holds a torn record, ignoring", slot);
                Ok(None)
            }
        }
    }
}

/// `a` ist neuer als `b` (mit Überlauf der Sequenznummer)
fn is_newer(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) > 0
}

impl<F: NorFlash> StateStore for FlashStateStore<F> {
    fn read(&mut self) -> Result<Option<LightState>, StoreError> {
        let slot_a = self.read_slot(0)?;
        let slot_b = self.read_slot(1)?;
        self.scanned = true;

        let newest = match (slot_a, slot_b) {
            (Some((seq_a, a)), Some((seq_b, b))) => {
                if is_newer(seq_b, seq_a) {
                    Some((1, seq_b, b))
                } else {
                    Some((0, seq_a, a))
                }
            }
            (Some((seq_a, a)), None) => Some((0, seq_a, a)),
            (None, Some((seq_b, b))) => Some((1, seq_b, b)),
            (None, None) => None,
        };

        self.latest = newest.map(|(slot, seq, _)| (slot, seq));
        Ok(newest.map(|(_, _, state)| state))
    }

    fn save(&mut self, state: &LightState) -> Result<(), StoreError> {
        if !self.scanned {
            self.read()?;
        }

        let (target, sequence) = match self.latest {
            Some((slot, seq)) => (1 - slot, seq.wrapping_add(1)),
            None => (0, 0),
        };

        let mut record = [0xFFu8; RECORD_SIZE];
        let len = encode_state(state, &mut record[HEADER_SIZE..])?;
        record[0..2].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        record[2..6].copy_from_slice(&sequence.to_le_bytes());
        record[6..8].copy_from_slice(&(len as u16).to_le_bytes());

        let offset = self.slot_offset(target);
        self.flash
            .erase(offset, offset + F::ERASE_SIZE as u32)
            .map_err(|_| StoreError::Driver)?;
        self.flash
            .write(offset, &record)
            .map_err(|_| StoreError::Driver)?;

        self.latest = Some((target, sequence));
        Ok(())
    }
}

// ============================================================================
// File Store (nur mit std)
// ============================================================================

#[cfg(feature = "std")]
pub use file::FileStateStore;

#[cfg(feature = "std")]
mod file {
    use std::fs::File;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};

    use super::{MAX_DOCUMENT_LEN, StateStore, StoreError, decode_state, encode_state};
    use crate::types::LightState;

    /// Zustand als JSON-Datei (kompatibel zu `state.json` der Pi-Version)
    ///
    /// Schreibt atomar: erst `<datei>.tmp`, dann Rename.
    #[derive(Debug, Clone)]
    pub struct FileStateStore {
        path: PathBuf,
    }

    impl FileStateStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl StateStore for FileStateStore {
        fn read(&mut self) -> Result<Option<LightState>, StoreError> {
            match std::fs::read(&self.path) {
                Ok(contents) => decode_state(&contents).map(Some),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::Io(e.kind())),
            }
        }

        fn save(&mut self, state: &LightState) -> Result<(), StoreError> {
            let mut buffer = [0u8; MAX_DOCUMENT_LEN];
            let len = encode_state(state, &mut buffer)?;
            let document = &buffer[..len];

            let tmp = self.path.with_extension("json.tmp");
            write_synced(&tmp, document).map_err(|e| StoreError::Io(e.kind()))?;
            if let Err(e) = std::fs::rename(&tmp, &self.path) {
                let _ = std::fs::remove_file(&tmp);
                return Err(StoreError::Io(e.kind()));
            }
            Ok(())
        }
    }

    /// Inhalt muss auf dem Datenträger liegen bevor umbenannt wird
    fn write_synced(path: &Path, document: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(document)?;
        file.sync_all()
    }
}
