use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::{InstrumentMode, TargetRecord};

/// Tracks stats over decoded records.
///
/// # Example
/// ```
/// use designation::{Summary, TargetDesignationFile};
///
/// fn show(file: &TargetDesignationFile) {
///     let summary = Summary::from_records(&file.records);
///     println!("{} records over {} ms", summary.count, summary.duration_ms);
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
    /// Milliseconds between the first and last scheduled times
    pub duration_ms: i64,
    pub calibration: usize,
    pub priority: usize,
    pub modes: BTreeMap<InstrumentMode, usize>,

    #[serde(skip)]
    targets: BTreeSet<String>,
}

impl Summary {
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TargetRecord>,
    {
        let mut summary = Summary::default();
        for record in records {
            summary.add(record);
        }
        summary
    }

    pub fn add(&mut self, record: &TargetRecord) {
        self.count += 1;
        let t = record.scheduled_time;
        self.first_time = Some(self.first_time.map_or(t, |cur| cur.min(t)));
        self.last_time = Some(self.last_time.map_or(t, |cur| cur.max(t)));
        if let (Some(first), Some(last)) = (self.first_time, self.last_time) {
            self.duration_ms = (last - first).num_milliseconds();
        }
        if record.flags.is_calibration() {
            self.calibration += 1;
        }
        if record.flags.is_priority() {
            self.priority += 1;
        }
        *self.modes.entry(record.instrument_mode).or_default() += 1;
        if !record.target_id.is_empty() {
            self.targets.insert(record.target_id.clone());
        }
    }

    /// Number of distinct non-empty target identifiers.
    #[must_use]
    pub fn distinct_targets(&self) -> usize {
        self.targets.len()
    }
}
