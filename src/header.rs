use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::checksum::Integrity;
use crate::cursor::{ByteCursor, ByteOrder};
use crate::error::StructuralError;
use crate::format::{FormatVersion, TAG_LEN};

/// File header common to all versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub format_version: FormatVersion,
    pub byte_order: ByteOrder,
    pub declared_record_count: u32,
    /// Time the file was produced. Source metadata only.
    pub creation_time: DateTime<Utc>,
    /// Ground station the session is planned for
    pub station_id: u32,
    pub spacecraft_id: u32,
    pub session_id: u64,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub header_checksum: u32,
}

impl Header {
    /// Decode the header at the cursor position, which should be the start of the
    /// file.
    ///
    /// The version tag is checked first and the header checksum is verified before
    /// any other field is interpreted. On success the cursor is positioned at the
    /// first record and the remaining bytes are known to be enough for the declared
    /// records and the trailer.
    ///
    /// # Errors
    /// [StructuralError::UnsupportedFormatVersion] for an unknown tag,
    /// [StructuralError::HeaderChecksumMismatch] if the header is corrupt,
    /// [StructuralError::InvalidTimestamp] for undecodable times, and
    /// [StructuralError::TruncatedInput] if the header or the declared records do
    /// not fit in the input.
    pub fn parse(cursor: &mut ByteCursor) -> Result<Header, StructuralError> {
        let tag = u32::from_be_bytes(cursor.peek_array::<TAG_LEN>()?);
        let Some(version) = FormatVersion::from_tag(tag) else {
            return Err(StructuralError::UnsupportedFormatVersion { found: tag });
        };
        let layout = version.layout();
        cursor.set_byte_order(layout.byte_order);

        let mut hdr = cursor.split(layout.header_len)?;
        let mut fields = hdr.clone();
        let covered = &hdr.as_slice()[..layout.header_len - 4];
        hdr.skip(covered.len())?;
        let header_checksum = hdr.read_u32()?;
        if let Integrity::Mismatch { expected, actual } =
            layout.checksum.verify(covered, header_checksum)
        {
            return Err(StructuralError::HeaderChecksumMismatch { expected, actual });
        }

        fields.skip(TAG_LEN)?;
        let declared_record_count = fields.read_u32()?;
        let station_id = fields.read_u32()?;
        let spacecraft_id = fields.read_u32()?;
        let session_id = fields.read_u64()?;
        let creation_time = layout.time.decode(&mut fields)?;
        let session_start = layout.time.decode(&mut fields)?;
        let session_end = layout.time.decode(&mut fields)?;

        let needed = usize::try_from(declared_record_count)
            .ok()
            .and_then(|count| layout.body_len(count))
            .unwrap_or(usize::MAX);
        if cursor.remaining() < needed {
            return Err(StructuralError::TruncatedInput {
                offset: cursor.position(),
                needed,
                available: cursor.remaining(),
            });
        }

        debug!(
            ?version,
            declared_record_count, station_id, spacecraft_id, session_id, "decoded header"
        );

        Ok(Header {
            format_version: version,
            byte_order: layout.byte_order,
            declared_record_count,
            creation_time,
            station_id,
            spacecraft_id,
            session_id,
            session_start,
            session_end,
            header_checksum,
        })
    }
}
