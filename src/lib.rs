#![doc = include_str!("../README.md")]

mod catalog;
mod checksum;
mod cursor;
mod decoder;
mod error;
mod format;
mod header;
mod record;
mod summary;
mod timecode;
mod validate;

pub use catalog::{Catalog, Spacecraft, Station};
pub use checksum::{Checksum, Integrity};
pub use cursor::{ByteCursor, ByteOrder};
pub use decoder::{decode, DecodeOptions, Decoder, TargetDesignationFile};
pub use error::{DecodeError, Field, Result, StructuralError, Violation};
pub use format::{AngleEncoding, FormatVersion, Layout, TAG_LEN, TRAILER_LEN};
pub use header::Header;
pub use record::{InstrumentMode, RecordFlags, TargetRecord};
pub use summary::Summary;
pub use timecode::TimeEncoding;
pub use validate::IntegrityValidator;
