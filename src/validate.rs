//! Cross-record and whole-file invariants.
use chrono::{DateTime, Utc};

use crate::decoder::DecodeOptions;
use crate::error::{Field, Violation};
use crate::format::FormatVersion;
use crate::header::Header;
use crate::record::TargetRecord;

/// Incremental checker fed one record at a time in file order.
///
/// Checks never stop early. Every violation found is collected and returned by
/// [IntegrityValidator::finish].
#[derive(Debug)]
pub struct IntegrityValidator {
    version: FormatVersion,
    declared: usize,
    require_records: bool,
    session: Option<(DateTime<Utc>, DateTime<Utc>)>,
    expected_sequence: u64,
    previous_time: Option<DateTime<Utc>>,
    violations: Vec<Violation>,
}

impl IntegrityValidator {
    #[must_use]
    pub fn new(header: &Header, options: &DecodeOptions) -> Self {
        let mut violations = Vec::default();
        let mut session = None;
        if options.check_session_window {
            if header.session_end < header.session_start {
                violations.push(Violation::SessionWindowInverted);
            } else {
                session = Some((header.session_start, header.session_end));
            }
        }
        IntegrityValidator {
            version: header.format_version,
            declared: header.declared_record_count as usize,
            require_records: options.require_records,
            session,
            expected_sequence: 0,
            previous_time: None,
            violations,
        }
    }

    fn check_range(&mut self, field: Field, index: usize, value: f64) {
        let ok = match field {
            Field::RightAscensionDeg | Field::RollAngleDeg => (0.0..360.0).contains(&value),
            Field::DeclinationDeg => (-90.0..=90.0).contains(&value),
        };
        if !ok {
            self.violations.push(Violation::ValueOutOfRange {
                field,
                record_index: index,
                value,
            });
        }
    }

    /// Check the record at 0-based position `index`.
    pub fn check(&mut self, index: usize, record: &TargetRecord) {
        self.check_range(Field::RightAscensionDeg, index, record.right_ascension_deg);
        self.check_range(Field::DeclinationDeg, index, record.declination_deg);
        self.check_range(Field::RollAngleDeg, index, record.roll_angle_deg);

        let found = u64::from(record.sequence_number);
        if found != self.expected_sequence {
            self.violations.push(Violation::SequenceGap {
                expected_index: self.expected_sequence,
                found_index: found,
            });
        }
        // Resync so a single gap is reported once
        self.expected_sequence = found + 1;

        if let Some(previous) = self.previous_time {
            if record.scheduled_time < previous {
                self.violations
                    .push(Violation::TimeOrderingViolation { record_index: index });
            }
        }
        self.previous_time = Some(record.scheduled_time);

        if let Some((start, end)) = self.session {
            if record.scheduled_time < start || record.scheduled_time > end {
                self.violations
                    .push(Violation::OutsideSession { record_index: index });
            }
        }

        let bits = record.flags.0 & self.version.undefined_flag_mask();
        if bits != 0 {
            self.violations.push(Violation::UndefinedFlags {
                record_index: index,
                bits,
            });
        }
    }

    /// Apply the whole-file checks given the number of records the file actually
    /// contains and return everything found.
    #[must_use]
    pub fn finish(mut self, actual: usize) -> Vec<Violation> {
        if actual != self.declared {
            self.violations.push(Violation::RecordCountMismatch {
                declared: self.declared,
                actual,
            });
        }
        if self.require_records && actual == 0 {
            self.violations.push(Violation::NoRecords);
        }
        self.violations
    }
}
