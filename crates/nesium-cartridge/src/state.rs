//! Chunked save-state stream.
//!
//! A stream is a sequence of chunks, each `fourcc: u32 LE`,
//! `length: u32 LE` and `length` payload bytes. Chunks nest: a payload may
//! itself be a sequence of chunks mixed with plain fields. Because every
//! length is known up front a reader can skip a chunk it does not
//! understand without parsing it.
//!
//! ```
//! use nesium_cartridge::state::{Loader, Saver, Tag};
//!
//! let mut saver = Saver::new();
//! saver.begin(Tag::Reg).write8(0x12).write16(0x3456).end();
//! let bytes = saver.into_bytes();
//!
//! let mut loader = Loader::new(&bytes);
//! assert_eq!(loader.begin().unwrap(), Some(Tag::Reg.fourcc()));
//! assert_eq!(loader.read8().unwrap(), 0x12);
//! loader.end().unwrap();
//! assert_eq!(loader.begin().unwrap(), None);
//! ```

mod rle;
pub mod tag;

pub use tag::{Tag, fourcc};

use crate::error::Error;

const CHUNK_HEADER_LEN: usize = 8;

/// Compression method byte preceding a compressed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(u8)]
enum Method {
    Raw = 0,
    Rle = 1,
}

/// Writes a chunk stream. Scopes left open are closed by
/// [`Saver::into_bytes`].
#[derive(Debug, Default)]
pub struct Saver {
    buf: Vec<u8>,
    scopes: Vec<usize>,
}

impl Saver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a nested chunk.
    pub fn begin(&mut self, tag: Tag) -> &mut Self {
        self.begin_raw(tag.fourcc())
    }

    /// Opens a nested chunk with a tag outside [`Tag`].
    pub fn begin_raw(&mut self, fourcc: u32) -> &mut Self {
        self.buf.extend_from_slice(&fourcc.to_le_bytes());
        self.scopes.push(self.buf.len());
        self.buf.extend_from_slice(&0u32.to_le_bytes());
        self
    }

    /// Closes the innermost chunk and patches its length.
    pub fn end(&mut self) -> &mut Self {
        if let Some(at) = self.scopes.pop() {
            let len = self.buf.len() - at - 4;
            let len = u32::try_from(len).unwrap_or(u32::MAX);
            self.buf[at..at + 4].copy_from_slice(&len.to_le_bytes());
        }
        self
    }

    pub fn write8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn write16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write8(u8::from(value))
    }

    pub fn write(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Writes `data` run-length coded, or raw when that is not smaller.
    ///
    /// Layout: `method u8`, `raw length u32`, `payload length u32`, payload.
    pub fn compress(&mut self, data: &[u8]) -> &mut Self {
        let packed = rle::encode(data);
        let (method, payload) = if packed.len() < data.len() {
            (Method::Rle, packed.as_slice())
        } else {
            (Method::Raw, data)
        };
        self.write8(method as u8)
            .write32(data.len() as u32)
            .write32(payload.len() as u32)
            .write(payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        while !self.scopes.is_empty() {
            self.end();
        }
        self.buf
    }
}

/// Reads a chunk stream produced by [`Saver`].
#[derive(Debug)]
pub struct Loader<'a> {
    data: &'a [u8],
    pos: usize,
    /// End offsets of the open chunks, innermost last.
    scopes: Vec<usize>,
}

impl<'a> Loader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            scopes: Vec::new(),
        }
    }

    #[inline]
    fn limit(&self) -> usize {
        self.scopes.last().copied().unwrap_or(self.data.len())
    }

    /// Enters the next sibling chunk and returns its tag, or `None` when the
    /// current scope has no chunks left.
    pub fn begin(&mut self) -> Result<Option<u32>, Error> {
        let limit = self.limit();
        if self.pos >= limit {
            return Ok(None);
        }
        if limit - self.pos < CHUNK_HEADER_LEN {
            return Err(Error::CorruptSaveState("truncated chunk header"));
        }
        let fourcc = self.take_u32()?;
        let len = self.take_u32()? as usize;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= limit)
            .ok_or(Error::CorruptSaveState("chunk length exceeds its parent"))?;
        self.scopes.push(end);
        Ok(Some(fourcc))
    }

    /// Enters the next chunk, requiring it to carry `tag`.
    pub fn expect(&mut self, tag: Tag) -> Result<(), Error> {
        match self.begin()? {
            Some(found) if found == tag.fourcc() => Ok(()),
            _ => Err(Error::CorruptSaveState("required chunk missing")),
        }
    }

    /// Leaves the innermost chunk, skipping whatever was not read.
    pub fn end(&mut self) -> Result<(), Error> {
        let end = self
            .scopes
            .pop()
            .ok_or(Error::CorruptSaveState("chunk end without begin"))?;
        self.pos = end;
        Ok(())
    }

    /// Bytes left in the current scope.
    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < n {
            return Err(Error::CorruptSaveState("read past end of chunk"));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_u32(&mut self) -> Result<u32, Error> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read16(&mut self) -> Result<u16, Error> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read32(&mut self) -> Result<u32, Error> {
        self.take_u32()
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read8()? != 0)
    }

    pub fn read(&mut self, out: &mut [u8]) -> Result<(), Error> {
        out.copy_from_slice(self.take(out.len())?);
        Ok(())
    }

    /// Reads a block written by [`Saver::compress`]; its raw length must
    /// equal `out.len()`.
    pub fn uncompress(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let method = Method::from_repr(self.read8()?)
            .ok_or(Error::CorruptSaveState("unknown compression method"))?;
        let raw_len = self.read32()? as usize;
        if raw_len != out.len() {
            return Err(Error::CorruptSaveState("compressed block size mismatch"));
        }
        let payload_len = self.read32()? as usize;
        let payload = self.take(payload_len)?;
        match method {
            Method::Raw if payload.len() == out.len() => {
                out.copy_from_slice(payload);
                Ok(())
            }
            Method::Raw => Err(Error::CorruptSaveState("raw block size mismatch")),
            Method::Rle => rle::decode(payload, out),
        }
    }
}
