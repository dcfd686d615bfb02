use serde::Serialize;
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::checksum::Integrity;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::{DecodeError, Result, StructuralError};
use crate::format::TRAILER_LEN;
use crate::header::Header;
use crate::record::TargetRecord;
use crate::validate::IntegrityValidator;

/// A fully decoded and validated target designation file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetDesignationFile {
    pub header: Header,
    /// Records in file order, which is also the intended execution order
    pub records: Vec<TargetRecord>,
}

/// Data-quality checks that may be relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct DecodeOptions {
    /// Reject files that contain no records.
    #[builder(default = true)]
    pub require_records: bool,
    /// Require every record to be scheduled within the header's session window.
    /// Off unless requested.
    #[builder(default = false)]
    pub check_session_window: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Decodes target designation files.
///
/// A decoder holds no state between calls and may be shared freely across threads.
///
/// # Example
/// ```
/// use designation::{DecodeError, DecodeOptions, Decoder, StructuralError};
///
/// let decoder = Decoder::new(DecodeOptions::builder().require_records(false).build());
/// let err = decoder.decode(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
/// assert_eq!(
///     err,
///     DecodeError::Structural(StructuralError::UnsupportedFormatVersion { found: 0xdeadbeef })
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Decoder { options }
    }

    #[must_use]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a complete file held in memory.
    ///
    /// The header is decoded first, then exactly the declared number of records,
    /// then the trailing whole-file checksum. Whole records found beyond the
    /// declared count must pass their record checksum and are only counted for
    /// [crate::Violation::RecordCountMismatch]; their fields are not interpreted.
    /// The first structural error ends the decode. Data-quality violations are
    /// collected across the whole file and returned together. A file is only
    /// returned when there are no errors of either kind.
    ///
    /// # Errors
    /// [DecodeError::Structural] for the first structural error encountered, or
    /// [DecodeError::Invalid] with every data-quality violation found.
    pub fn decode(&self, bytes: &[u8]) -> Result<TargetDesignationFile> {
        let mut cursor = ByteCursor::new(bytes, ByteOrder::Big);
        let header = Header::parse(&mut cursor)?;
        let version = header.format_version;
        let layout = version.layout();

        let declared = header.declared_record_count as usize;
        let mut validator = IntegrityValidator::new(&header, &self.options);
        let mut records = Vec::with_capacity(declared);
        for index in 0..declared {
            let record = TargetRecord::decode(&mut cursor, version, index)?;
            validator.check(index, &record);
            records.push(record);
        }

        // Header parsing guarantees at least the trailer remains
        let surplus_offset = cursor.position();
        let surplus_len = cursor.remaining().saturating_sub(TRAILER_LEN);
        if surplus_len % layout.record_len != 0 {
            return Err(StructuralError::TrailingBytes {
                offset: surplus_offset,
                len: surplus_len,
            }
            .into());
        }
        let surplus = surplus_len / layout.record_len;
        if surplus > 0 {
            debug!(surplus, "records beyond the declared count");
        }
        for index in declared..declared + surplus {
            TargetRecord::skip_verified(&mut cursor, version, index)?;
        }

        let covered = &bytes[..cursor.position()];
        let stored = cursor.read_u32()?;
        if let Integrity::Mismatch { expected, actual } = layout.checksum.verify(covered, stored) {
            return Err(StructuralError::FileChecksumMismatch { expected, actual }.into());
        }

        let violations = validator.finish(declared + surplus);
        if !violations.is_empty() {
            return Err(DecodeError::Invalid(violations));
        }

        Ok(TargetDesignationFile { header, records })
    }
}

/// Decode `bytes` with the default [DecodeOptions].
///
/// # Errors
/// See [Decoder::decode].
pub fn decode(bytes: &[u8]) -> Result<TargetDesignationFile> {
    Decoder::default().decode(bytes)
}
