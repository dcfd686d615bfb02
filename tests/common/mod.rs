//! Fixture writer for target designation files.
#![allow(dead_code)]

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use designation::{AngleEncoding, ByteOrder, FormatVersion, TimeEncoding};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordSpec {
    pub sequence_number: u32,
    pub scheduled_time: DateTime<Utc>,
    pub ra: f64,
    pub dec: f64,
    pub roll: f64,
    pub target_id: Vec<u8>,
    pub mode_code: u8,
    pub flags: u8,
}

/// A valid record scheduled `minutes` after [t0].
pub fn record(seq: u32, minutes: i64) -> RecordSpec {
    RecordSpec {
        sequence_number: seq,
        scheduled_time: t0() + Duration::minutes(minutes),
        ra: 10.5,
        dec: -20.0,
        roll: 0.0,
        target_id: b"T001".to_vec(),
        mode_code: 0,
        flags: 0,
    }
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    pub version: FormatVersion,
    /// Defaults to the number of records
    pub declared: Option<u32>,
    pub station_id: u32,
    pub spacecraft_id: u32,
    pub session_id: u64,
    pub creation_time: DateTime<Utc>,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub records: Vec<RecordSpec>,
    /// Raw bytes written between the records and the trailer
    pub extra: Vec<u8>,
}

impl FileSpec {
    pub fn new(version: FormatVersion) -> Self {
        FileSpec {
            version,
            declared: None,
            station_id: 12512,
            spacecraft_id: 720,
            session_id: 409_031_907,
            creation_time: t0() - Duration::days(1),
            session_start: t0(),
            session_end: t0() + Duration::hours(1),
            records: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// File with `count` valid records one minute apart.
    pub fn with_records(version: FormatVersion, count: u32) -> Self {
        let mut fixture = Self::new(version);
        fixture.records = (0..count).map(|i| record(i, i64::from(i))).collect();
        fixture
    }

    pub fn record(mut self, record: RecordSpec) -> Self {
        self.records.push(record);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let layout = self.version.layout();
        let mut w = Writer::new(self.version);

        w.buf.extend(layout.tag.to_be_bytes());
        w.u32(
            self.declared
                .unwrap_or(u32::try_from(self.records.len()).unwrap()),
        );
        w.u32(self.station_id);
        w.u32(self.spacecraft_id);
        w.u64(self.session_id);
        w.time(self.creation_time);
        w.time(self.session_start);
        w.time(self.session_end);
        w.buf.resize(layout.header_len - 4, 0);
        w.checksum_from(0);

        for rec in &self.records {
            let start = w.buf.len();
            match self.version {
                FormatVersion::V1 => {
                    w.u32(rec.sequence_number);
                    w.buf.push(rec.mode_code);
                    w.buf.push(rec.flags);
                    w.buf.extend([0, 0]);
                    w.time(rec.scheduled_time);
                    w.angle(rec.ra, false);
                    w.angle(rec.dec, true);
                    w.angle(rec.roll, false);
                    w.target_id(&rec.target_id);
                }
                FormatVersion::V2 => {
                    w.u32(rec.sequence_number);
                    w.time(rec.scheduled_time);
                    w.angle(rec.ra, false);
                    w.angle(rec.dec, true);
                    w.angle(rec.roll, false);
                    w.buf.push(rec.mode_code);
                    w.buf.push(rec.flags);
                    w.target_id(&rec.target_id);
                }
            }
            assert_eq!(w.buf.len() - start, layout.record_len - 4);
            w.checksum_from(start);
        }

        w.buf.extend(&self.extra);
        w.checksum_from(0);
        w.buf
    }
}

/// Offset of record `index` in an encoded file.
pub fn record_offset(version: FormatVersion, index: usize) -> usize {
    let layout = version.layout();
    layout.header_len + index * layout.record_len
}

/// Recompute every checksum after the caller modified bytes in place. Records are
/// assumed to follow the header directly with no extra bytes.
pub fn reseal(version: FormatVersion, buf: &mut [u8]) {
    let layout = version.layout();
    let seal = |buf: &mut [u8], start: usize, end: usize| {
        let sum = layout.checksum.compute(&buf[start..end]);
        buf[end..end + 4].copy_from_slice(&u32_bytes(version.byte_order(), sum));
    };
    seal(buf, 0, layout.header_len - 4);
    let mut offset = layout.header_len;
    while offset + layout.record_len <= buf.len() - 4 {
        seal(buf, offset, offset + layout.record_len - 4);
        offset += layout.record_len;
    }
    let end = buf.len() - 4;
    seal(buf, 0, end);
}

fn u32_bytes(order: ByteOrder, v: u32) -> [u8; 4] {
    match order {
        ByteOrder::Little => v.to_le_bytes(),
        ByteOrder::Big => v.to_be_bytes(),
    }
}

struct Writer {
    version: FormatVersion,
    buf: Vec<u8>,
}

impl Writer {
    fn new(version: FormatVersion) -> Self {
        Writer {
            version,
            buf: Vec::new(),
        }
    }

    fn order(&self) -> ByteOrder {
        self.version.byte_order()
    }

    fn u16(&mut self, v: u16) {
        let b = match self.order() {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };
        self.buf.extend(b);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend(u32_bytes(self.order(), v));
    }

    fn u64(&mut self, v: u64) {
        let b = match self.order() {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };
        self.buf.extend(b);
    }

    fn time(&mut self, t: DateTime<Utc>) {
        match self.version.layout().time {
            TimeEncoding::SystemTime => {
                for v in [
                    t.year() as u16,
                    t.month() as u16,
                    t.weekday().num_days_from_sunday() as u16,
                    t.day() as u16,
                    t.hour() as u16,
                    t.minute() as u16,
                    t.second() as u16,
                    t.timestamp_subsec_millis() as u16,
                ] {
                    self.u16(v);
                }
            }
            TimeEncoding::UnixMillis => self.u64(t.timestamp_millis() as u64),
        }
    }

    fn angle(&mut self, deg: f64, signed: bool) {
        match self.version.layout().angles {
            AngleEncoding::Float64 => self.u64(deg.to_bits()),
            AngleEncoding::Fixed32 { per_degree } if signed => {
                self.u32((deg * per_degree).round() as i32 as u32);
            }
            AngleEncoding::Fixed32 { per_degree } => self.u32((deg * per_degree).round() as u32),
        }
    }

    fn target_id(&mut self, id: &[u8]) {
        let len = self.version.layout().target_id_len;
        let mut raw = id.to_vec();
        raw.resize(len, 0);
        self.buf.extend(raw);
    }

    /// Append the checksum of everything from `start` to the current end.
    fn checksum_from(&mut self, start: usize) {
        let sum = self.version.layout().checksum.compute(&self.buf[start..]);
        self.u32(sum);
    }
}
