use chrono::{Local, Utc};
use log::{info, trace, warn};

use super::csv_export;
use super::error::{QuizError, Result};
use super::history_store::HistoryStore;
use crate::model::{EntryInputs, HistoryEntry};

pub const EMPTY_HISTORY_MESSAGE: &str = "Aún no hay respuestas registradas";

/// es-ES `toLocaleString` with two-digit fields.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Newest-first log of answered questions, written through to its store after
/// every mutation.
pub struct HistoryLedger {
    store: Box<dyn HistoryStore>,
    entries: Vec<HistoryEntry>,
    last_id: u64,
    limit: Option<usize>,
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HistoryLedger {{entries: {}, last_id: {}, limit: {:?}}}",
            self.entries.len(),
            self.last_id,
            self.limit
        )
    }
}

impl HistoryLedger {
    /// Opens the ledger, failing if the stored history cannot be read or parsed.
    pub fn open(store: Box<dyn HistoryStore>) -> Result<Self> {
        let mut ledger = Self::empty(store);
        ledger.load()?;
        Ok(ledger)
    }

    /// Like [`HistoryLedger::open`], but starts empty when the stored history is
    /// unusable. The failure is handed back so the caller can report it; the
    /// stored data is left alone until the next mutation.
    pub fn open_or_empty(store: Box<dyn HistoryStore>) -> (Self, Option<QuizError>) {
        let mut ledger = Self::empty(store);
        let loaded = ledger.load().map(|entries| entries.len());
        match loaded {
            Ok(_) => (ledger, None),
            Err(err) => {
                warn!(target: "ledger", "Starting with empty history: {}", err);
                ledger.entries.clear();
                (ledger, Some(err))
            }
        }
    }

    fn empty(store: Box<dyn HistoryStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            last_id: 0,
            limit: None,
        }
    }

    /// Caps the ledger length; the oldest entries are dropped first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self.enforce_limit();
        self
    }

    pub fn load(&mut self) -> Result<&[HistoryEntry]> {
        self.entries = match self.store.load()? {
            None => Vec::new(),
            Some(contents) => serde_json::from_slice(&contents)?,
        };
        self.last_id = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        info!(target: "ledger", "Loaded {} history entries", self.entries.len());
        Ok(&self.entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stamps, prepends and persists a new entry. On a persistence failure the
    /// entry is kept in memory and the error is returned.
    pub fn record(&mut self, inputs: EntryInputs) -> Result<HistoryEntry> {
        let entry = self.stamp(inputs)?;
        self.insert(entry.clone())?;
        Ok(entry)
    }

    /// Assigns id and timestamp without touching the ledger.
    pub fn stamp(&mut self, inputs: EntryInputs) -> Result<HistoryEntry> {
        Ok(HistoryEntry::new(
            self.next_id()?,
            Local::now().format(TIMESTAMP_FORMAT).to_string(),
            inputs.question_text,
            inputs.user_answer,
            inputs.correct_answer,
            inputs.level,
        ))
    }

    pub fn insert(&mut self, entry: HistoryEntry) -> Result<()> {
        trace!(target: "ledger", "Recording {:?}", entry);
        self.entries.insert(0, entry);
        self.enforce_limit();
        self.persist()
    }

    /// Returns whether anything was cleared; nothing happens without confirmation.
    pub fn clear(&mut self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            trace!(target: "ledger", "Clear not confirmed");
            return Ok(false);
        }
        self.entries.clear();
        self.persist()?;
        info!(target: "ledger", "History cleared");
        Ok(true)
    }

    pub fn export_csv(&self) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(QuizError::EmptyExport);
        }
        let contents = csv_export::render(&self.entries)?;
        info!(target: "ledger", "Exported {} entries", self.entries.len());
        Ok(contents)
    }

    fn persist(&mut self) -> Result<()> {
        let contents = serde_json::to_vec(&self.entries)?;
        if let Err(err) = self.store.save(&contents) {
            warn!(target: "ledger", "History not saved: {}", err);
            return Err(err.into());
        }
        Ok(())
    }

    /// Millisecond clock, bumped when two entries land in the same millisecond.
    fn next_id(&mut self) -> Result<u64> {
        let bumped = self
            .last_id
            .checked_add(1)
            .ok_or(QuizError::IdsExhausted {
                last_id: self.last_id,
            })?;
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(bumped);
        Ok(self.last_id)
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            self.entries.truncate(limit);
        }
    }
}
