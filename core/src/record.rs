use alloc::{
    format,
    string::{String, ToString},
};

use crate::*;

/// String key-value storage that outlives a session, e.g. the browser's local storage.
pub trait RecordStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Storage slot holding the best time of a tier, `None` for custom boards.
pub const fn record_key(difficulty: Difficulty) -> Option<&'static str> {
    match difficulty {
        Difficulty::Easy => Some("record_easy"),
        Difficulty::Medium => Some("record_medium"),
        Difficulty::Hard => Some("record_hard"),
        Difficulty::Custom => None,
    }
}

/// Renders milliseconds as `M:SS`.
pub fn format_time(millis: Millis) -> String {
    let secs = millis / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Renders a best time, or a dash when there is none yet.
pub fn format_record(record: Option<Millis>) -> String {
    record.map_or_else(|| "—".to_string(), format_time)
}

/// What happened to the record slot after a win.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Custom board, nothing is tracked.
    Untracked,
    NewRecord(Millis),
    Kept(Millis),
}

/// Best times of the named tiers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Records {
    easy: Option<Millis>,
    medium: Option<Millis>,
    hard: Option<Millis>,
}

impl Records {
    /// Reads every tier slot; values that don't parse are treated as missing.
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> Self {
        let mut records = Self::default();
        for tier in Difficulty::TIERS {
            let Some(key) = record_key(tier) else {
                continue;
            };
            let Some(raw) = store.get(key) else {
                continue;
            };
            match raw.trim().parse::<Millis>() {
                Ok(millis) => records.set(tier, millis),
                Err(err) => log::warn!("ignoring stored {}: {:?} ({})", key, raw, err),
            }
        }
        records
    }

    pub fn get(&self, difficulty: Difficulty) -> Option<Millis> {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Custom => None,
        }
    }

    fn set(&mut self, difficulty: Difficulty, millis: Millis) {
        let slot = match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
            Difficulty::Custom => return,
        };
        *slot = Some(millis);
    }

    /// Compares a winning time against the tier's best and persists it when strictly better.
    pub fn evaluate<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        difficulty: Difficulty,
        elapsed: Millis,
    ) -> RecordOutcome {
        let Some(key) = record_key(difficulty) else {
            return RecordOutcome::Untracked;
        };

        match self.get(difficulty) {
            Some(best) if elapsed >= best => RecordOutcome::Kept(best),
            previous => {
                log::debug!(
                    "new {} record: {} ms (previous: {:?})",
                    difficulty,
                    elapsed,
                    previous
                );
                self.set(difficulty, elapsed);
                store.set(key, &elapsed.to_string());
                RecordOutcome::NewRecord(elapsed)
            }
        }
    }
}
