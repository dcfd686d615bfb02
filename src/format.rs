//! Supported format versions and their fixed layouts.
//!
//! The set of versions is closed. Each version maps to exactly one [Layout] and
//! nothing about a file is inferred beyond its version tag.
use serde::Serialize;

use crate::checksum::Checksum;
use crate::cursor::ByteOrder;
use crate::record::InstrumentMode;
use crate::timecode::TimeEncoding;

/// Width of the whole-file checksum at the end of every file.
pub const TRAILER_LEN: usize = 4;
/// Width of the version tag at the start of every file. Always big-endian.
pub const TAG_LEN: usize = 4;

/// How angles are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleEncoding {
    /// IEEE-754 binary64 degrees
    Float64,
    /// 32-bit integer count of `1 / per_degree` degree units. Declination is
    /// signed, the others unsigned.
    Fixed32 { per_degree: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatVersion {
    /// Legacy layout: little-endian, SYSTEMTIME times, f64 angles.
    V1,
    /// Compact layout: big-endian, epoch milliseconds, fixed-point angles.
    V2,
}

/// Fixed per-version constants.
#[derive(Debug)]
pub struct Layout {
    pub tag: u32,
    pub byte_order: ByteOrder,
    pub checksum: Checksum,
    pub time: TimeEncoding,
    pub angles: AngleEncoding,
    pub header_len: usize,
    pub record_len: usize,
    pub target_id_len: usize,
    /// Number of low flag bits with a defined meaning
    pub flag_bits: u32,
    /// Known instrument mode codes
    pub modes: &'static [(u8, InstrumentMode)],
}

static V1_MODES: [(u8, InstrumentMode); 3] = [
    (0, InstrumentMode::Pointing),
    (1, InstrumentMode::Survey),
    (2, InstrumentMode::Scan),
];

static V2_MODES: [(u8, InstrumentMode); 5] = [
    (0x00, InstrumentMode::Pointing),
    (0x01, InstrumentMode::Survey),
    (0x02, InstrumentMode::Scan),
    (0x10, InstrumentMode::Calibration),
    (0x20, InstrumentMode::Standby),
];

static V1: Layout = Layout {
    tag: 0x5444_4601,
    byte_order: ByteOrder::Little,
    checksum: Checksum::Crc32IsoHdlc,
    time: TimeEncoding::SystemTime,
    angles: AngleEncoding::Float64,
    header_len: 80,
    record_len: 68,
    target_id_len: 16,
    flag_bits: 4,
    modes: &V1_MODES,
};

static V2: Layout = Layout {
    tag: 0x5444_4602,
    byte_order: ByteOrder::Big,
    checksum: Checksum::Crc32Iscsi,
    time: TimeEncoding::UnixMillis,
    angles: AngleEncoding::Fixed32 { per_degree: 1e7 },
    header_len: 52,
    record_len: 40,
    target_id_len: 10,
    flag_bits: 8,
    modes: &V2_MODES,
};

impl FormatVersion {
    pub const ALL: [FormatVersion; 2] = [FormatVersion::V1, FormatVersion::V2];

    /// Look up the version for a raw tag, or `None` if the tag is not supported.
    #[must_use]
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.layout().tag == tag)
    }

    #[must_use]
    pub fn layout(&self) -> &'static Layout {
        match self {
            Self::V1 => &V1,
            Self::V2 => &V2,
        }
    }

    #[must_use]
    pub fn tag(&self) -> u32 {
        self.layout().tag
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.layout().byte_order
    }

    /// Instrument mode for an on-disk code, `None` if the code is not in this
    /// version's table.
    #[must_use]
    pub fn instrument_mode(&self, code: u8) -> Option<InstrumentMode> {
        self.layout()
            .modes
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, mode)| *mode)
    }

    /// Flag bits this version does not define.
    #[must_use]
    pub fn undefined_flag_mask(&self) -> u8 {
        match self.layout().flag_bits {
            bits if bits >= 8 => 0,
            bits => !((1u8 << bits) - 1),
        }
    }
}

impl Layout {
    /// Number of bytes required for `count` records plus the trailer, or `None` on
    /// overflow.
    #[must_use]
    pub fn body_len(&self, count: usize) -> Option<usize> {
        count
            .checked_mul(self.record_len)
            .and_then(|n| n.checked_add(TRAILER_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for version in FormatVersion::ALL {
            assert_eq!(FormatVersion::from_tag(version.tag()), Some(version));
        }
        assert_eq!(FormatVersion::from_tag(0x5444_4603), None);
        assert_eq!(FormatVersion::from_tag(0), None);
    }

    #[test]
    fn mode_tables_are_per_version() {
        assert_eq!(
            FormatVersion::V1.instrument_mode(2),
            Some(InstrumentMode::Scan)
        );
        assert_eq!(FormatVersion::V1.instrument_mode(0x10), None);
        assert_eq!(
            FormatVersion::V2.instrument_mode(0x10),
            Some(InstrumentMode::Calibration)
        );
        assert_eq!(FormatVersion::V2.instrument_mode(3), None);
    }

    #[test]
    fn undefined_flag_masks() {
        assert_eq!(FormatVersion::V1.undefined_flag_mask(), 0xf0);
        assert_eq!(FormatVersion::V2.undefined_flag_mask(), 0);
    }

    #[test]
    fn body_len_overflow() {
        let layout = FormatVersion::V1.layout();
        assert_eq!(layout.body_len(2), Some(2 * 68 + TRAILER_LEN));
        assert_eq!(layout.body_len(usize::MAX), None);
    }
}
