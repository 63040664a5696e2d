use minehint_core::{
    ExperienceDocument, ExperienceRecord, MergePolicy, MoveCounts, Offset, Pattern, Stats,
};

use crate::{ExperienceStorage, StoreError};

/// Learned experience owned by one advisor, backed by durable storage.
///
/// The in-memory record is the source of truth for the session. Storage is
/// read once on load and merged into on every [`persist`](Self::persist);
/// failures on either path are logged and otherwise ignored.
#[derive(Debug)]
pub struct ExperienceStore<S> {
    storage: S,
    record: ExperienceRecord,
    merge_policy: MergePolicy,
}

impl<S: ExperienceStorage> ExperienceStore<S> {
    /// A store that ignores whatever the storage already holds until the next save.
    pub fn empty(storage: S) -> Self {
        Self {
            storage,
            record: ExperienceRecord::new(),
            merge_policy: MergePolicy::default(),
        }
    }

    /// Loads the stored experience, starting empty when it is missing or unreadable.
    pub fn load(storage: S) -> Self {
        let mut store = Self::empty(storage);
        match read_record(&store.storage) {
            Ok(Some(record)) => {
                log::info!(
                    "Loaded experience: {} patterns, {}",
                    record.pattern_count(),
                    record.stats()
                );
                store.record = record;
            }
            Ok(None) => log::info!("No saved experience in {:?}, starting fresh", store.storage),
            Err(err) => log::warn!("Ignoring saved experience, starting fresh: {err}"),
        }
        store
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn experience(&self) -> &ExperienceRecord {
        &self.record
    }

    pub fn lookup(&self, pattern: &Pattern) -> Option<&MoveCounts> {
        self.record.lookup(pattern)
    }

    /// Counts one more success for `offset` under `pattern`. Not saved until [`persist`](Self::persist).
    pub fn record(&mut self, pattern: Pattern, offset: Offset) -> u32 {
        self.record.record(pattern, offset)
    }

    pub fn note_success(&mut self) {
        self.record.note_success();
    }

    pub fn note_failure(&mut self) {
        self.record.note_failure();
    }

    pub fn stats(&self) -> Stats {
        self.record.stats()
    }

    /// Saves, logging instead of failing. Returns whether the save went through.
    pub fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(err) => {
                log::error!("Could not save experience to {:?}: {err}", self.storage);
                false
            }
        }
    }

    /// Merges the in-memory record into what storage currently holds and writes the result.
    ///
    /// Stored data that cannot be decoded is replaced; a storage read error aborts the save.
    pub fn try_persist(&self) -> Result<(), StoreError> {
        let mut merged = match read_record(&self.storage) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(StoreError::Io(err)) => return Err(StoreError::Io(err)),
            Err(err) => {
                log::warn!("Replacing unreadable saved experience: {err}");
                ExperienceRecord::new()
            }
        };
        self.record.merge_into(&mut merged, self.merge_policy);

        let json = serde_json::to_string_pretty(&merged.to_document())?;
        self.storage.write(&json)?;
        log::debug!(
            "Saved experience: {} patterns, {}",
            merged.pattern_count(),
            merged.stats()
        );
        Ok(())
    }
}

fn read_record(storage: &impl ExperienceStorage) -> Result<Option<ExperienceRecord>, StoreError> {
    let Some(contents) = storage.read()? else {
        return Ok(None);
    };
    let document: ExperienceDocument = serde_json::from_str(&contents)?;
    Ok(Some(ExperienceRecord::from_document(document)?))
}
