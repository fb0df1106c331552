//! Banked views over the cartridge's backing buffers.
//!
//! Every board sees its ROM and RAM through a handful of [`Banks`]: PRG at
//! `$8000`, CHR at `$0000`, nametables at `$2000` and work RAM at `$6000`.
//! A `Banks` splits its address span into fixed *unit* pages; a swap of a
//! larger window simply retargets several consecutive pages.
//!
//! Bank numbers are never rejected. The selected bank is masked by the
//! number of banks the source holds, rounded down to a power of two, which
//! is what a board with missing address lines does:
//!
//! ```text
//! count  = source.len / size            (rounded down to 2^n, at least 1)
//! offset = ((bank & (count - 1)) * size) % source.len
//! ```
//!
//! A source smaller than the window repeats itself through the window.

use crate::{
    error::Error,
    state::{Loader, Saver},
};

pub const SIZE_1K: usize = 0x0400;
pub const SIZE_2K: usize = 0x0800;
pub const SIZE_4K: usize = 0x1000;
pub const SIZE_8K: usize = 0x2000;
pub const SIZE_16K: usize = 0x4000;
pub const SIZE_32K: usize = 0x8000;

/// Bank number that always resolves to the last bank of a source.
pub const LAST: u32 = !0;

/// Identifies one backing buffer of a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SourceId {
    /// PRG ROM.
    Prg,
    /// CHR ROM, or CHR RAM on boards without CHR ROM.
    Chr,
    /// Extra CHR RAM on boards carrying both ROM and RAM.
    ChrRam,
    /// Work RAM at `$6000-$7FFF`.
    Wrk,
    /// The console's 2 KiB nametable RAM.
    Ciram,
    /// Extra nametable RAM for four-screen boards.
    Vram,
}

impl SourceId {
    pub const COUNT: usize = 6;

    pub const ALL: [SourceId; Self::COUNT] = [
        SourceId::Prg,
        SourceId::Chr,
        SourceId::ChrRam,
        SourceId::Wrk,
        SourceId::Ciram,
        SourceId::Vram,
    ];
}

/// A raw backing buffer.
#[derive(Debug, Clone, Default)]
pub struct Source {
    data: Box<[u8]>,
    writable: bool,
}

impl Source {
    pub fn new(data: Box<[u8]>, writable: bool) -> Self {
        Self { data, writable }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn wrapped(&self, index: usize) -> usize {
        if index < self.data.len() {
            index
        } else {
            index % self.data.len()
        }
    }
}

/// Arena holding every backing buffer of one mapper, addressed by
/// [`SourceId`].
#[derive(Debug, Clone, Default)]
pub struct Sources {
    slots: [Source; SourceId::COUNT],
}

impl Sources {
    pub fn insert(&mut self, id: SourceId, source: Source) {
        self.slots[id as usize] = source;
    }

    #[inline]
    pub fn get(&self, id: SourceId) -> &Source {
        &self.slots[id as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SourceId) -> &mut Source {
        &mut self.slots[id as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Page {
    /// Index into [`Banks::bindings`].
    binding: u8,
    /// Byte offset of this page inside its source.
    offset: usize,
    /// Bank number as requested, before masking, in units of `size`.
    bank: u32,
    /// Size of the window this page was swapped in with.
    size: u32,
    /// Position of this page inside that window.
    sub: u8,
    readable: bool,
    writable: bool,
}

/// One address region split into swappable unit pages.
#[derive(Debug, Clone)]
pub struct Banks {
    base: u16,
    unit: usize,
    pages: Box<[Page]>,
    bindings: Box<[(SourceId, usize)]>,
}

impl Banks {
    /// Creates `span / unit` pages starting at `base`. The first binding is
    /// the default source; every page starts linearly mapped onto it.
    pub fn new(base: u16, span: usize, unit: usize, bindings: &[(SourceId, usize)]) -> Self {
        debug_assert!(unit.is_power_of_two() && span % unit == 0 && !bindings.is_empty());
        let default_len = bindings.first().map_or(0, |&(_, len)| len);
        let pages = (0..span / unit)
            .map(|i| Page {
                binding: 0,
                offset: masked_offset(i as u32, unit, default_len),
                bank: i as u32,
                size: unit as u32,
                sub: 0,
                readable: true,
                writable: true,
            })
            .collect();
        Self {
            base,
            unit,
            pages,
            bindings: bindings.into(),
        }
    }

    #[inline]
    pub fn unit(&self) -> usize {
        self.unit
    }

    #[inline]
    fn page_index(&self, addr: u16) -> usize {
        (addr.wrapping_sub(self.base) as usize / self.unit) % self.pages.len()
    }

    /// Selects `bank` for the window of `size` bytes starting at `addr`,
    /// reading from the default source.
    pub fn swap_bank(&mut self, size: usize, addr: u16, bank: u32) {
        self.select(0, size, addr, bank);
    }

    /// Selects consecutive windows of `size` bytes starting at `addr`.
    pub fn swap_banks(&mut self, size: usize, addr: u16, banks: &[u32]) {
        let mut addr = addr;
        for &bank in banks {
            self.select(0, size, addr, bank);
            addr = addr.wrapping_add(size as u16);
        }
    }

    /// Like [`Banks::swap_bank`] but reads from another bound source.
    /// Unbound sources are ignored.
    pub fn swap_bank_from(&mut self, source: SourceId, size: usize, addr: u16, bank: u32) {
        match self.bindings.iter().position(|&(id, _)| id == source) {
            Some(binding) => self.select(binding, size, addr, bank),
            None => tracing::debug!("{source:?} is not bound at {:#06x}", self.base),
        }
    }

    fn select(&mut self, binding: usize, size: usize, addr: u16, bank: u32) {
        let size = size.max(self.unit);
        let len = self.bindings[binding].1;
        let offset = masked_offset(bank, size, len);
        let first = self.page_index(addr);
        let span = size / self.unit;
        let unit = self.unit;
        for (sub, page) in self.pages.iter_mut().skip(first).take(span).enumerate() {
            page.binding = binding as u8;
            page.offset = offset + sub * unit;
            page.bank = bank;
            page.size = size as u32;
            page.sub = sub as u8;
        }
    }

    /// Returns the bank last requested for the window of `size` bytes at
    /// `addr`, before masking.
    pub fn get_bank(&self, size: usize, addr: u16) -> u32 {
        let page = &self.pages[self.page_index(addr)];
        if page.size as usize == size {
            return page.bank;
        }
        let start = u64::from(page.bank) * u64::from(page.size) + page.sub as u64 * self.unit as u64;
        (start / size.max(1) as u64) as u32
    }

    /// Returns the source the page covering `addr` reads from.
    pub fn source_at(&self, addr: u16) -> SourceId {
        let page = &self.pages[self.page_index(addr)];
        self.bindings[page.binding as usize].0
    }

    /// Gates reads and writes for `size` bytes starting at `addr`.
    pub fn set_access(&mut self, size: usize, addr: u16, readable: bool, writable: bool) {
        let first = self.page_index(addr);
        let span = (size / self.unit).max(1);
        for page in self.pages.iter_mut().skip(first).take(span) {
            page.readable = readable;
            page.writable = writable;
        }
    }

    /// Reads through the page covering `addr`. `None` means nothing drives
    /// the bus (read-disabled page or an empty source).
    #[inline]
    pub fn read(&self, sources: &Sources, addr: u16) -> Option<u8> {
        let page = &self.pages[self.page_index(addr)];
        if !page.readable {
            return None;
        }
        let source = sources.get(self.bindings[page.binding as usize].0);
        if source.is_empty() {
            return None;
        }
        let index = source.wrapped(page.offset + (addr as usize & (self.unit - 1)));
        Some(source.data[index])
    }

    /// Writes through the page covering `addr` when both the page and its
    /// source accept writes. Returns whether the byte was stored.
    #[inline]
    pub fn write(&self, sources: &mut Sources, addr: u16, data: u8) -> bool {
        let page = &self.pages[self.page_index(addr)];
        if !page.writable {
            return false;
        }
        let source = sources.get_mut(self.bindings[page.binding as usize].0);
        if !source.writable || source.is_empty() {
            return false;
        }
        let index = source.wrapped(page.offset + (addr as usize & (self.unit - 1)));
        source.data[index] = data;
        true
    }

    pub fn save(&self, saver: &mut Saver) {
        saver.write16(self.pages.len() as u16);
        for page in self.pages.iter() {
            saver
                .write8(page.binding)
                .write32(page.bank)
                .write32(page.size)
                .write8(page.sub)
                .write8(u8::from(page.readable) | u8::from(page.writable) << 1);
        }
    }

    pub fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        let count = loader.read16()? as usize;
        if count != self.pages.len() {
            return Err(Error::CorruptSaveState("bank page count mismatch"));
        }
        let mut pages = self.pages.clone();
        for page in pages.iter_mut() {
            let binding = loader.read8()?;
            let bank = loader.read32()?;
            let size = loader.read32()?;
            let sub = loader.read8()?;
            let access = loader.read8()?;

            let Some(&(_, len)) = self.bindings.get(binding as usize) else {
                return Err(Error::CorruptSaveState("bank binding out of range"));
            };
            let size_ok = (size as usize).is_power_of_two() && size as usize >= self.unit;
            if !size_ok || sub as usize >= size as usize / self.unit {
                return Err(Error::CorruptSaveState("bank window size invalid"));
            }

            *page = Page {
                binding,
                offset: masked_offset(bank, size as usize, len) + sub as usize * self.unit,
                bank,
                size,
                sub,
                readable: access & 1 != 0,
                writable: access & 2 != 0,
            };
        }
        self.pages = pages;
        Ok(())
    }
}

/// Byte offset of `bank` in a source of `len` bytes split in `size` windows.
pub fn masked_offset(bank: u32, size: usize, len: usize) -> usize {
    if len == 0 || size == 0 {
        return 0;
    }
    let count = (len / size).max(1);
    let count = 1usize << (usize::BITS - 1 - count.leading_zeros());
    ((bank as usize & (count - 1)) * size) % len
}
