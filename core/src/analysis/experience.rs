use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

/// Success count per relative move, ordered by offset.
pub type MoveCounts = BTreeMap<Offset, u32>;

/// Current version of [`ExperienceDocument`].
pub const SCHEMA_VERSION: u32 = 1;

/// Outcome tallies kept next to the learned patterns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub success_count: u64,
    pub failure_count: u64,
}

impl Stats {
    pub const fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Share of successful moves in percent, `None` before the first report.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.success_count as f64 / total as f64 * 100.0),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.success_rate() {
            None => f.write_str("No data"),
            Some(rate) => write!(
                f,
                "Successful moves: {}, Failed: {}, Success rate: {:.1}%",
                self.success_count, self.failure_count, rate
            ),
        }
    }
}

/// How in-memory counts combine with counts already stored when saving.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// The saving session's value replaces the stored one for every key it knows.
    #[default]
    Overwrite,
    /// The larger of the two values is kept.
    Max,
}

impl MergePolicy {
    pub fn combine<T: Ord>(self, stored: T, fresh: T) -> T {
        match self {
            Self::Overwrite => fresh,
            Self::Max => stored.max(fresh),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unsupported experience schema version {0}")]
    UnsupportedVersion(u32),
    #[error("pattern #{index} has {len} tokens, expected 1 to 8")]
    PatternLength { index: usize, len: usize },
    #[error("pattern #{0} is listed more than once")]
    DuplicatePattern(usize),
    #[error("pattern #{index} has move ({dr}, {dc}) outside the neighborhood")]
    OffsetOutOfRange { index: usize, dr: i8, dc: i8 },
    #[error("pattern #{index} lists move ({dr}, {dc}) more than once")]
    DuplicateMove { index: usize, dr: i8, dc: i8 },
}

/// Persisted form of an [`ExperienceRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperienceDocument {
    pub version: u32,
    pub success_count: u64,
    pub failure_count: u64,
    pub experience: Vec<PatternEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternEntry {
    pub pattern: Pattern,
    pub moves: Vec<MoveEntry>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveEntry {
    pub dr: i8,
    pub dc: i8,
    pub count: u32,
}

/// Learned pattern statistics: for each neighborhood pattern, how often a
/// move at each relative offset turned out safe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExperienceRecord {
    patterns: HashMap<Pattern, MoveCounts>,
    stats: Stats,
}

impl ExperienceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, pattern: &Pattern) -> Option<&MoveCounts> {
        self.patterns.get(pattern)
    }

    pub fn count(&self, pattern: &Pattern, offset: Offset) -> u32 {
        self.lookup(pattern)
            .and_then(|moves| moves.get(&offset))
            .copied()
            .unwrap_or(0)
    }

    /// Bumps the count for `(pattern, offset)` and returns the new value.
    ///
    /// A cell without neighbors yields an empty pattern, which carries nothing
    /// to learn; it is ignored and the count stays 0.
    pub fn record(&mut self, pattern: Pattern, offset: Offset) -> u32 {
        if pattern.is_empty() {
            return 0;
        }
        let count = self
            .patterns
            .entry(pattern)
            .or_default()
            .entry(offset)
            .or_default();
        *count = count.saturating_add(1);
        *count
    }

    pub fn note_success(&mut self) {
        self.stats.success_count += 1;
    }

    pub fn note_failure(&mut self) {
        self.stats.failure_count += 1;
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &MoveCounts)> {
        self.patterns.iter()
    }

    /// Folds this record into `stored` key by key. Keys only `stored` knows
    /// are left untouched; zero counts are not carried over.
    pub fn merge_into(&self, stored: &mut ExperienceRecord, policy: MergePolicy) {
        for (pattern, moves) in &self.patterns {
            for (&offset, &count) in moves.iter().filter(|&(_, &count)| count > 0) {
                let slot = stored
                    .patterns
                    .entry(pattern.clone())
                    .or_default()
                    .entry(offset)
                    .or_default();
                *slot = policy.combine(*slot, count);
            }
        }

        stored.stats = Stats {
            success_count: policy.combine(stored.stats.success_count, self.stats.success_count),
            failure_count: policy.combine(stored.stats.failure_count, self.stats.failure_count),
        };
    }

    /// Serializable form, sorted so repeated saves produce identical files.
    pub fn to_document(&self) -> ExperienceDocument {
        let mut experience: Vec<PatternEntry> = self
            .patterns
            .iter()
            .map(|(pattern, moves)| PatternEntry {
                pattern: pattern.clone(),
                moves: moves
                    .iter()
                    .filter(|&(_, &count)| count > 0)
                    .map(|(&(dr, dc), &count)| MoveEntry { dr, dc, count })
                    .collect(),
            })
            .filter(|entry| !entry.pattern.is_empty() && !entry.moves.is_empty())
            .collect();
        experience.sort_unstable_by(|a, b| a.pattern.cmp(&b.pattern));

        ExperienceDocument {
            version: SCHEMA_VERSION,
            success_count: self.stats.success_count,
            failure_count: self.stats.failure_count,
            experience,
        }
    }

    /// Rebuilds a record, rejecting the whole document on the first malformed entry.
    pub fn from_document(document: ExperienceDocument) -> core::result::Result<Self, SchemaError> {
        if document.version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion(document.version));
        }

        let mut patterns = HashMap::with_capacity(document.experience.len());
        for (index, entry) in document.experience.into_iter().enumerate() {
            let len = entry.pattern.len();
            if !(1..=Pattern::MAX_LEN).contains(&len) {
                return Err(SchemaError::PatternLength { index, len });
            }

            let mut moves = MoveCounts::new();
            let mut seen = HashSet::new();
            for MoveEntry { dr, dc, count } in entry.moves {
                if !(-1..=1).contains(&dr) || !(-1..=1).contains(&dc) {
                    return Err(SchemaError::OffsetOutOfRange { index, dr, dc });
                }
                if !seen.insert((dr, dc)) {
                    return Err(SchemaError::DuplicateMove { index, dr, dc });
                }
                if count > 0 {
                    moves.insert((dr, dc), count);
                }
            }

            if patterns.insert(entry.pattern, moves).is_some() {
                return Err(SchemaError::DuplicatePattern(index));
            }
        }

        Ok(Self {
            patterns,
            stats: Stats {
                success_count: document.success_count,
                failure_count: document.failure_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn pattern(tokens: &[Token]) -> Pattern {
        tokens.iter().copied().collect()
    }

    #[test]
    fn record_increments_counts() {
        let mut record = ExperienceRecord::new();
        let key = pattern(&[Count(1), Unknown, Flag]);

        assert_eq!(record.record(key.clone(), (0, 0)), 1);
        assert_eq!(record.record(key.clone(), (0, 0)), 2);
        record.record(key.clone(), (1, -1));

        assert_eq!(record.count(&key, (0, 0)), 2);
        assert_eq!(record.count(&key, (1, -1)), 1);
        assert_eq!(record.count(&key, (-1, -1)), 0);
        assert_eq!(record.lookup(&pattern(&[Unknown])), None);
    }

    #[test]
    fn empty_pattern_is_not_learned() {
        let mut record = ExperienceRecord::new();

        assert_eq!(record.record(Pattern::default(), (0, 0)), 0);
        assert!(record.is_empty());

        record.record(pattern(&[Count(1), Unknown, Unknown]), (0, 0));
        let restored = ExperienceRecord::from_document(record.to_document()).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn stats_display() {
        assert_eq!(Stats::default().to_string(), "No data");

        let stats = Stats {
            success_count: 2,
            failure_count: 1,
        };
        assert_eq!(
            stats.to_string(),
            "Successful moves: 2, Failed: 1, Success rate: 66.7%"
        );
    }

    #[test]
    fn overwrite_merge_keeps_foreign_keys_and_replaces_shared_ones() {
        let shared = pattern(&[Count(1), Unknown, Unknown]);
        let foreign = pattern(&[Flag, Count(2), Unknown]);

        let mut stored = ExperienceRecord::new();
        for _ in 0..5 {
            stored.record(shared.clone(), (0, 0));
        }
        stored.record(foreign.clone(), (0, 0));

        let mut fresh = ExperienceRecord::new();
        fresh.record(shared.clone(), (0, 0));
        fresh.note_success();

        fresh.merge_into(&mut stored, MergePolicy::Overwrite);

        assert_eq!(stored.count(&shared, (0, 0)), 1);
        assert_eq!(stored.count(&foreign, (0, 0)), 1);
        assert_eq!(stored.stats().success_count, 1);
    }

    #[test]
    fn max_merge_keeps_larger_count() {
        let shared = pattern(&[Count(1), Unknown, Unknown]);

        let mut stored = ExperienceRecord::new();
        for _ in 0..5 {
            stored.record(shared.clone(), (0, 0));
        }
        let mut fresh = ExperienceRecord::new();
        fresh.record(shared.clone(), (0, 0));
        fresh.record(shared.clone(), (0, 1));

        fresh.merge_into(&mut stored, MergePolicy::Max);

        assert_eq!(stored.count(&shared, (0, 0)), 5);
        assert_eq!(stored.count(&shared, (0, 1)), 1);
    }

    #[test]
    fn document_round_trip_preserves_counts() {
        let mut record = ExperienceRecord::new();
        record.record(pattern(&[Count(0), Unknown, Unknown]), (0, 0));
        record.record(pattern(&[Mine, Flag, Unknown, Count(8), Unknown]), (1, 1));
        record.note_success();
        record.note_failure();

        let restored = ExperienceRecord::from_document(record.to_document()).unwrap();

        assert_eq!(restored, record);
    }

    #[test]
    fn document_rejects_malformed_entries() {
        let entry = |pattern, moves| PatternEntry { pattern, moves };
        let doc = |experience| ExperienceDocument {
            version: SCHEMA_VERSION,
            success_count: 0,
            failure_count: 0,
            experience,
        };
        let ok_pattern = pattern(&[Unknown, Unknown, Unknown]);
        let one = MoveEntry {
            dr: 0,
            dc: 0,
            count: 1,
        };

        let wrong_version = ExperienceDocument {
            version: 7,
            ..doc(vec![])
        };
        assert_eq!(
            ExperienceRecord::from_document(wrong_version),
            Err(SchemaError::UnsupportedVersion(7))
        );

        let empty_pattern = doc(vec![entry(Pattern::default(), vec![one])]);
        assert_eq!(
            ExperienceRecord::from_document(empty_pattern),
            Err(SchemaError::PatternLength { index: 0, len: 0 })
        );

        let far = MoveEntry { dr: 2, ..one };
        let far_move = doc(vec![entry(ok_pattern.clone(), vec![far])]);
        assert_eq!(
            ExperienceRecord::from_document(far_move),
            Err(SchemaError::OffsetOutOfRange {
                index: 0,
                dr: 2,
                dc: 0
            })
        );

        let twice = doc(vec![
            entry(ok_pattern.clone(), vec![one]),
            entry(ok_pattern.clone(), vec![one]),
        ]);
        assert_eq!(
            ExperienceRecord::from_document(twice),
            Err(SchemaError::DuplicatePattern(1))
        );
    }

    #[test]
    fn document_json_layout() {
        let mut record = ExperienceRecord::new();
        record.record(pattern(&[Count(1), Unknown, Flag]), (0, 0));
        record.note_success();

        let json = serde_json::to_value(record.to_document()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "success_count": 1,
                "failure_count": 0,
                "experience": [
                    { "pattern": ["1", "U", "F"], "moves": [{ "dr": 0, "dc": 0, "count": 1 }] }
                ]
            })
        );
    }
}
