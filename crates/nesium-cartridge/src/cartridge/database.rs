//! CRC32-keyed cartridge database.
//!
//! Headers lie; the database does not. Entries are keyed by the CRC32 of
//! PRG + CHR and override whatever the header claims about the board,
//! mirroring, battery and console variant.
//!
//! A database is built once, either from entries or from the compact binary
//! blob produced by [`RomDatabase::to_blob`], and is then only read.
//!
//! Blob layout (little-endian):
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 4    | magic `NDB\0`                           |
//! | 4      | 4    | record count                            |
//! | 8      | 16·n | records                                 |
//!
//! Record: `crc u32`, `mapper u16`, `prg KiB u16`, `chr KiB u16`,
//! `wrk KiB u16`, `system u8`, `mirroring u8`, `flags u8`, `attribute u8`.

use bitflags::bitflags;
use strum::FromRepr;

use crate::{cartridge::header::Mirroring, error::Error};

const BLOB_MAGIC: &[u8; 4] = b"NDB\0";
const RECORD_LEN: usize = 16;

/// Console variant a cartridge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr)]
#[repr(u8)]
pub enum System {
    #[default]
    Ntsc,
    Pal,
    /// Vs. UniSystem arcade.
    Vs,
    /// PlayChoice-10 arcade.
    Pc10,
    Dendy,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u8 {
        const BATTERY    = 0b0000_0001;
        const TRAINER    = 0b0000_0010;
        const BAD_DUMP   = 0b0000_0100;
        const HACKED     = 0b0000_1000;
        const TRANSLATED = 0b0001_0000;
        const UNLICENSED = 0b0010_0000;
        const BOOTLEG    = 0b0100_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseEntry {
    /// CRC32 of PRG ROM followed by CHR ROM.
    pub crc: u32,
    pub mapper: u16,
    pub prg_size: usize,
    pub chr_size: usize,
    /// Work RAM size; 0 keeps the header's value.
    pub wrk_size: usize,
    pub system: System,
    pub mirroring: Mirroring,
    pub flags: EntryFlags,
    /// Board disambiguation byte handed to the board constructor.
    pub attribute: u8,
}

impl DatabaseEntry {
    #[inline]
    pub fn battery(&self) -> bool {
        self.flags.contains(EntryFlags::BATTERY)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let kib = |bytes: usize| u16::try_from(bytes / 1024).unwrap_or(u16::MAX);
        out.extend_from_slice(&self.crc.to_le_bytes());
        out.extend_from_slice(&self.mapper.to_le_bytes());
        out.extend_from_slice(&kib(self.prg_size).to_le_bytes());
        out.extend_from_slice(&kib(self.chr_size).to_le_bytes());
        out.extend_from_slice(&kib(self.wrk_size).to_le_bytes());
        out.push(self.system as u8);
        out.push(self.mirroring as u8);
        out.push(self.flags.bits());
        out.push(self.attribute);
    }

    fn decode(record: &[u8]) -> Result<Self, Error> {
        let u16_at = |at: usize| u16::from_le_bytes([record[at], record[at + 1]]);
        let crc = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        Ok(Self {
            crc,
            mapper: u16_at(4),
            prg_size: u16_at(6) as usize * 1024,
            chr_size: u16_at(8) as usize * 1024,
            wrk_size: u16_at(10) as usize * 1024,
            system: System::from_repr(record[12])
                .ok_or(Error::InvalidDatabase("unknown system"))?,
            mirroring: Mirroring::from_repr(record[13])
                .ok_or(Error::InvalidDatabase("unknown mirroring"))?,
            flags: EntryFlags::from_bits(record[14])
                .ok_or(Error::InvalidDatabase("unknown entry flags"))?,
            attribute: record[15],
        })
    }
}

/// Immutable CRC32 lookup table.
#[derive(Debug, Clone, Default)]
pub struct RomDatabase {
    entries: Box<[DatabaseEntry]>,
}

impl RomDatabase {
    /// Builds a database; entries are sorted and duplicate CRCs keep the
    /// first occurrence.
    pub fn new(entries: impl IntoIterator<Item = DatabaseEntry>) -> Self {
        let mut entries: Vec<DatabaseEntry> = entries.into_iter().collect();
        entries.sort_by_key(|entry| entry.crc);
        entries.dedup_by_key(|entry| entry.crc);
        Self {
            entries: entries.into_boxed_slice(),
        }
    }

    /// Binary search by CRC32.
    pub fn find(&self, crc: u32) -> Option<&DatabaseEntry> {
        self.entries
            .binary_search_by_key(&crc, |entry| entry.crc)
            .ok()
            .map(|index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatabaseEntry> {
        self.entries.iter()
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self, Error> {
        if blob.len() < 8 || &blob[..4] != BLOB_MAGIC {
            return Err(Error::InvalidDatabase("missing NDB signature"));
        }
        let count = u32::from_le_bytes([blob[4], blob[5], blob[6], blob[7]]) as usize;
        let records = &blob[8..];
        if count.checked_mul(RECORD_LEN) != Some(records.len()) {
            return Err(Error::InvalidDatabase("record count does not match size"));
        }
        let entries = records
            .chunks_exact(RECORD_LEN)
            .map(DatabaseEntry::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn to_blob(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.entries.len() * RECORD_LEN);
        out.extend_from_slice(BLOB_MAGIC);
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in self.entries.iter() {
            entry.encode(&mut out);
        }
        out
    }
}

impl FromIterator<DatabaseEntry> for RomDatabase {
    fn from_iter<I: IntoIterator<Item = DatabaseEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}
