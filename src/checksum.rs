//! Integrity checksums used by the supported format versions.
use crc::{Crc, CRC_32_ISCSI, CRC_32_ISO_HDLC};
use serde::Serialize;

static ISO_HDLC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
static ISCSI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Checksum algorithm, fixed per format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Checksum {
    /// CRC-32 as used by zip/ethernet
    Crc32IsoHdlc,
    /// CRC-32C (Castagnoli)
    Crc32Iscsi,
}

/// Outcome of comparing a stored checksum with one computed over the covered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    Ok,
    Mismatch { expected: u32, actual: u32 },
}

impl Checksum {
    #[must_use]
    pub fn compute(&self, dat: &[u8]) -> u32 {
        match self {
            Self::Crc32IsoHdlc => ISO_HDLC.checksum(dat),
            Self::Crc32Iscsi => ISCSI.checksum(dat),
        }
    }

    /// Compare `stored` against the checksum of `dat`.
    #[must_use]
    pub fn verify(&self, dat: &[u8], stored: u32) -> Integrity {
        let actual = self.compute(dat);
        if actual == stored {
            Integrity::Ok
        } else {
            Integrity::Mismatch {
                expected: stored,
                actual,
            }
        }
    }
}
