//! On-disk time encodings.
use chrono::{DateTime, NaiveDate, Utc};

use crate::cursor::ByteCursor;
use crate::error::StructuralError;

/// Time encoding, fixed per format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEncoding {
    /// Windows `SYSTEMTIME`: eight u16 fields, year, month, day-of-week, day,
    /// hour, minute, second, millisecond. Day-of-week is not checked.
    SystemTime,
    /// Signed 64-bit milliseconds since 1970-01-01T00:00:00Z.
    UnixMillis,
}

impl TimeEncoding {
    /// Number of bytes the encoding occupies.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::SystemTime => 16,
            Self::UnixMillis => 8,
        }
    }

    /// Read a timestamp at the cursor position.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] if there are not enough bytes, or
    /// [StructuralError::InvalidTimestamp] if the bytes do not name a valid UTC time.
    pub fn decode(&self, cursor: &mut ByteCursor) -> Result<DateTime<Utc>, StructuralError> {
        let offset = cursor.position();
        let invalid = StructuralError::InvalidTimestamp { offset };
        match self {
            Self::SystemTime => {
                let mut sub = cursor.split(self.len())?;
                let mut fields = [0u16; 8];
                for field in &mut fields {
                    *field = sub.read_u16()?;
                }
                let [year, month, _dow, day, hour, minute, second, millis] = fields;
                NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                    .and_then(|date| {
                        date.and_hms_milli_opt(
                            u32::from(hour),
                            u32::from(minute),
                            u32::from(second),
                            u32::from(millis),
                        )
                    })
                    .map(|naive| naive.and_utc())
                    .ok_or(invalid)
            }
            Self::UnixMillis => {
                let millis = cursor.read_i64()?;
                DateTime::from_timestamp_millis(millis).ok_or(invalid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteOrder;

    fn systemtime(fields: [u16; 8]) -> Vec<u8> {
        fields.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    #[test]
    fn systemtime_decodes() {
        let dat = systemtime([2022, 9, 6, 3, 21, 0, 34, 250]);
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Little);
        let ts = TimeEncoding::SystemTime.decode(&mut cursor).unwrap();

        assert_eq!(ts.to_rfc3339(), "2022-09-03T21:00:34.250+00:00");
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn systemtime_rejects_invalid_date() {
        let dat = systemtime([2022, 13, 0, 1, 0, 0, 0, 0]);
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Little);
        let err = TimeEncoding::SystemTime.decode(&mut cursor).unwrap_err();

        assert_eq!(err, StructuralError::InvalidTimestamp { offset: 0 });
    }

    #[test]
    fn systemtime_rejects_invalid_millis() {
        let dat = systemtime([2022, 1, 0, 1, 0, 0, 0, 1000]);
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Little);
        assert!(TimeEncoding::SystemTime.decode(&mut cursor).is_err());
    }

    #[test]
    fn unix_millis_decodes() {
        let dat = 1_662_238_834_250i64.to_be_bytes();
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Big);
        let ts = TimeEncoding::UnixMillis.decode(&mut cursor).unwrap();

        assert_eq!(ts.timestamp_millis(), 1_662_238_834_250);
    }

    #[test]
    fn unix_millis_rejects_out_of_range() {
        let dat = i64::MAX.to_be_bytes();
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Big);
        let err = TimeEncoding::UnixMillis.decode(&mut cursor).unwrap_err();

        assert_eq!(err, StructuralError::InvalidTimestamp { offset: 0 });
    }

    #[test]
    fn truncated_time() {
        let dat = [0u8; 10];
        let mut cursor = ByteCursor::new(&dat, ByteOrder::Little);
        let err = TimeEncoding::SystemTime.decode(&mut cursor).unwrap_err();

        assert!(matches!(err, StructuralError::TruncatedInput { .. }));
        assert_eq!(cursor.position(), 0);
    }
}
