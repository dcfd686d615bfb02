use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

type Result<T> = std::result::Result<T, StructuralError>;

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Bounds-checked sequential reader over an in-memory buffer.
///
/// Every read either consumes exactly the requested width or fails with
/// [StructuralError::TruncatedInput] and leaves the position where it was.
/// Positions are absolute within the original buffer, including for cursors
/// produced by [ByteCursor::split].
///
/// # Example
/// ```
/// use designation::{ByteCursor, ByteOrder};
///
/// let dat: &[u8] = &[0x01, 0x02, 0x03];
/// let mut cursor = ByteCursor::new(dat, ByteOrder::Big);
/// assert_eq!(cursor.read_u16().unwrap(), 0x0102);
/// assert_eq!(cursor.remaining(), 1);
/// assert!(cursor.read_u16().is_err());
/// assert_eq!(cursor.position(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
    order: ByteOrder,
}

macro_rules! read_int {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_array::<{ std::mem::size_of::<$ty>() }>()?;
            Ok(match self.order {
                ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                ByteOrder::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        ByteCursor {
            buf,
            pos: 0,
            base: 0,
            order,
        }
    }

    /// Absolute offset of the next byte to be read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(StructuralError::TruncatedInput {
                offset: self.position(),
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Return the next `len` bytes without consuming them.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `len` bytes remain.
    pub fn peek(&self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        Ok(&self.buf[self.pos..self.pos + len])
    }

    /// Consume the next `len` bytes.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `N` bytes remain.
    pub fn peek_array<const N: usize>(&self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.peek(N)?);
        Ok(arr)
    }

    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let arr = self.peek_array::<N>()?;
        self.pos += N;
        Ok(arr)
    }

    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Consume the next `len` bytes and return a cursor over just those bytes,
    /// sharing this cursor's byte order and reporting absolute offsets.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than `len` bytes remain.
    pub fn split(&mut self, len: usize) -> Result<ByteCursor<'a>> {
        let base = self.position();
        let buf = self.read_bytes(len)?;
        Ok(ByteCursor {
            buf,
            pos: 0,
            base,
            order: self.order,
        })
    }

    /// The full buffer this cursor reads from, regardless of position.
    #[must_use]
    pub fn as_slice(&self) -> &'a [u8] {
        self.buf
    }

    /// # Errors
    /// [StructuralError::TruncatedInput] if no bytes remain.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    read_int!(read_u16, u16);
    read_int!(read_i16, i16);
    read_int!(read_u32, u32);
    read_int!(read_i32, i32);
    read_int!(read_u64, u64);
    read_int!(read_i64, i64);

    /// Read an IEEE-754 binary64 value.
    ///
    /// # Errors
    /// [StructuralError::TruncatedInput] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_u64().map(f64::from_bits)
    }
}
