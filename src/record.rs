use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::checksum::Integrity;
use crate::cursor::ByteCursor;
use crate::error::StructuralError;
use crate::format::{AngleEncoding, FormatVersion, Layout};

type Result<T> = std::result::Result<T, StructuralError>;

/// Instrument/operational mode a pointing is executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum InstrumentMode {
    /// Inertial pointing at the target
    Pointing,
    /// All-sky survey scanning
    Survey,
    /// Raster scan around the target
    Scan,
    Calibration,
    Standby,
}

/// Record-level attribute bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordFlags(pub u8);

impl RecordFlags {
    pub const CALIBRATION: u8 = 1 << 0;
    pub const PRIORITY: u8 = 1 << 1;
    pub const REPEAT: u8 = 1 << 2;
    pub const SUN_CONSTRAINED: u8 = 1 << 3;
    pub const DITHER: u8 = 1 << 4;
    pub const FOLLOW_UP: u8 = 1 << 5;
    pub const TARGET_OF_OPPORTUNITY: u8 = 1 << 6;
    pub const ENGINEERING: u8 = 1 << 7;

    #[must_use]
    pub fn contains(&self, bits: u8) -> bool {
        self.0 & bits == bits
    }

    #[must_use]
    pub fn is_calibration(&self) -> bool {
        self.contains(Self::CALIBRATION)
    }

    #[must_use]
    pub fn is_priority(&self) -> bool {
        self.contains(Self::PRIORITY)
    }
}

/// A single scheduled pointing command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    pub sequence_number: u32,
    pub scheduled_time: DateTime<Utc>,
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
    pub roll_angle_deg: f64,
    pub target_id: String,
    pub instrument_mode: InstrumentMode,
    pub flags: RecordFlags,
    pub record_checksum: u32,
}

/// Bytes allowed in a target identifier, other than the NUL padding.
fn is_target_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b' ' | b'_' | b'-' | b'+' | b'.')
}

/// Decode a NUL padded identifier. Content must come first and only NULs may
/// follow it.
fn decode_target_id(raw: &[u8]) -> Option<String> {
    let len = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    let (content, padding) = raw.split_at(len);
    if !content.iter().copied().all(is_target_id_byte) || padding.iter().any(|b| *b != 0) {
        return None;
    }
    // charset is ASCII, so this cannot fail
    String::from_utf8(content.to_vec()).ok()
}

fn read_angle(cursor: &mut ByteCursor, layout: &Layout, signed: bool) -> Result<f64> {
    Ok(match layout.angles {
        AngleEncoding::Float64 => cursor.read_f64()?,
        AngleEncoding::Fixed32 { per_degree } if signed => {
            f64::from(cursor.read_i32()?) / per_degree
        }
        AngleEncoding::Fixed32 { per_degree } => f64::from(cursor.read_u32()?) / per_degree,
    })
}

/// Fields in on-disk order, before being assembled into a record.
struct Fields<'a> {
    sequence_number: u32,
    scheduled_time: DateTime<Utc>,
    right_ascension_deg: f64,
    declination_deg: f64,
    roll_angle_deg: f64,
    target_id: (usize, &'a [u8]),
    mode: (usize, u8),
    flags: u8,
}

impl TargetRecord {
    /// Decode the record at the cursor position.
    ///
    /// `index` is the record's 0-based position in the file and is only used to
    /// report errors. The checksum is verified before any field is interpreted, so
    /// any corruption inside the record is reported as
    /// [StructuralError::RecordChecksumMismatch] for that index.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput], [StructuralError::RecordChecksumMismatch],
    /// [StructuralError::UnknownInstrumentMode], [StructuralError::InvalidTargetId] or
    /// [StructuralError::InvalidTimestamp].
    pub fn decode(
        cursor: &mut ByteCursor,
        version: FormatVersion,
        index: usize,
    ) -> Result<TargetRecord> {
        let layout = version.layout();
        let (mut fields, record_checksum) = split_verified(cursor, layout, index)?;

        let raw = match version {
            FormatVersion::V1 => decode_v1(&mut fields, layout)?,
            FormatVersion::V2 => decode_v2(&mut fields, layout)?,
        };

        let (mode_offset, code) = raw.mode;
        let Some(instrument_mode) = version.instrument_mode(code) else {
            return Err(StructuralError::UnknownInstrumentMode {
                record_index: index,
                offset: mode_offset,
                code,
            });
        };
        let (id_offset, id) = raw.target_id;
        let Some(target_id) = decode_target_id(id) else {
            return Err(StructuralError::InvalidTargetId {
                record_index: index,
                offset: id_offset,
            });
        };

        trace!(index, sequence_number = raw.sequence_number, "decoded record");

        Ok(TargetRecord {
            sequence_number: raw.sequence_number,
            scheduled_time: raw.scheduled_time,
            right_ascension_deg: raw.right_ascension_deg,
            declination_deg: raw.declination_deg,
            roll_angle_deg: raw.roll_angle_deg,
            target_id,
            instrument_mode,
            flags: RecordFlags(raw.flags),
            record_checksum,
        })
    }

    /// Advance past one record after verifying its checksum, without interpreting
    /// any of its fields.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] or [StructuralError::RecordChecksumMismatch].
    pub fn skip_verified(
        cursor: &mut ByteCursor,
        version: FormatVersion,
        index: usize,
    ) -> Result<()> {
        split_verified(cursor, version.layout(), index).map(|_| ())
    }
}

/// Split one record off the cursor and verify its trailing checksum. Returns a
/// cursor over the record's fields and the stored checksum.
fn split_verified<'a>(
    cursor: &mut ByteCursor<'a>,
    layout: &Layout,
    index: usize,
) -> Result<(ByteCursor<'a>, u32)> {
    let offset = cursor.position();
    let mut rec = cursor.split(layout.record_len)?;
    let fields = rec.clone();

    let covered = &rec.as_slice()[..layout.record_len - 4];
    rec.skip(covered.len())?;
    let stored = rec.read_u32()?;
    if let Integrity::Mismatch { expected, actual } = layout.checksum.verify(covered, stored) {
        return Err(StructuralError::RecordChecksumMismatch {
            record_index: index,
            offset,
            expected,
            actual,
        });
    }
    Ok((fields, stored))
}

// seq u32, mode u8, flags u8, reserved u16, time, ra f64, dec f64, roll f64, id[16]
fn decode_v1<'a>(cursor: &mut ByteCursor<'a>, layout: &Layout) -> Result<Fields<'a>> {
    let sequence_number = cursor.read_u32()?;
    let mode = (cursor.position(), cursor.read_u8()?);
    let flags = cursor.read_u8()?;
    cursor.skip(2)?;
    let scheduled_time = layout.time.decode(cursor)?;
    let right_ascension_deg = read_angle(cursor, layout, false)?;
    let declination_deg = read_angle(cursor, layout, true)?;
    let roll_angle_deg = read_angle(cursor, layout, false)?;
    let target_id = (cursor.position(), cursor.read_bytes(layout.target_id_len)?);
    Ok(Fields {
        sequence_number,
        scheduled_time,
        right_ascension_deg,
        declination_deg,
        roll_angle_deg,
        target_id,
        mode,
        flags,
    })
}

// seq u32, time, ra u32, dec i32, roll u32, mode u8, flags u8, id[10]
fn decode_v2<'a>(cursor: &mut ByteCursor<'a>, layout: &Layout) -> Result<Fields<'a>> {
    let sequence_number = cursor.read_u32()?;
    let scheduled_time = layout.time.decode(cursor)?;
    let right_ascension_deg = read_angle(cursor, layout, false)?;
    let declination_deg = read_angle(cursor, layout, true)?;
    let roll_angle_deg = read_angle(cursor, layout, false)?;
    let mode = (cursor.position(), cursor.read_u8()?);
    let flags = cursor.read_u8()?;
    let target_id = (cursor.position(), cursor.read_bytes(layout.target_id_len)?);
    Ok(Fields {
        sequence_number,
        scheduled_time,
        right_ascension_deg,
        declination_deg,
        roll_angle_deg,
        target_id,
        mode,
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"T001\0\0\0\0", Some("T001"); "padded")]
    #[test_case(b"SRC J1745-29", Some("SRC J1745-29"); "full width")]
    #[test_case(b"\0\0\0\0", Some(""); "empty")]
    #[test_case(b"T0\001", None; "content after padding")]
    #[test_case(b"T0\x7f1", None; "control byte")]
    #[test_case(b"\xd0\x9c\0\0", None; "non ascii")]
    fn target_id(raw: &[u8], expected: Option<&str>) {
        assert_eq!(decode_target_id(raw).as_deref(), expected);
    }

    #[test]
    fn flags() {
        let flags = RecordFlags(RecordFlags::CALIBRATION | RecordFlags::DITHER);
        assert!(flags.is_calibration());
        assert!(!flags.is_priority());
        assert!(flags.contains(RecordFlags::DITHER));
    }
}
