//! Everything a board manipulates besides its own registers.
//!
//! | Set   | Base    | Span   | Unit  | Bindings (first is default)      |
//! |-------|---------|--------|-------|----------------------------------|
//! | `prg` | `$8000` | 32 KiB | 8 KiB | PRG ROM, work RAM                |
//! | `chr` | `$0000` | 8 KiB  | 1 KiB | CHR, CHR RAM, CIRAM              |
//! | `nmt` | `$2000` | 4 KiB  | 1 KiB | CIRAM, CHR, VRAM                 |
//! | `wrk` | `$6000` | 8 KiB  | 8 KiB | work RAM, PRG ROM                |

use tracing::warn;

use crate::{
    banks::{Banks, SIZE_1K, SIZE_4K, SIZE_8K, SIZE_32K, SourceId, Sources},
    bus::OpenBus,
    cartridge::{header::Mirroring, mapper::ports::PpuPort},
    error::Error,
    memory::ppu as ppu_mem,
    state::{Loader, Saver, Tag},
};

#[derive(Debug, Clone)]
pub struct Hardware {
    pub prg: Banks,
    pub chr: Banks,
    pub nmt: Banks,
    pub wrk: Banks,
    pub sources: Sources,
    /// IRQ line driven by the board.
    pub irq: bool,
    pub open_bus: OpenBus,
    pub ppu: Box<dyn PpuPort>,
    cycles: u64,
    crc: u32,
    attribute: u8,
    submapper: u8,
    header_mirroring: Mirroring,
    mirroring: Mirroring,
}

impl Hardware {
    pub(crate) fn new(
        sources: Sources,
        ppu: Box<dyn PpuPort>,
        crc: u32,
        attribute: u8,
        submapper: u8,
        mirroring: Mirroring,
    ) -> Self {
        let len = |id| sources.get(id).len();
        let prg = Banks::new(
            0x8000,
            SIZE_32K,
            SIZE_8K,
            &[
                (SourceId::Prg, len(SourceId::Prg)),
                (SourceId::Wrk, len(SourceId::Wrk)),
            ],
        );
        let chr = Banks::new(
            0x0000,
            SIZE_8K,
            SIZE_1K,
            &[
                (SourceId::Chr, len(SourceId::Chr)),
                (SourceId::ChrRam, len(SourceId::ChrRam)),
                (SourceId::Ciram, len(SourceId::Ciram)),
            ],
        );
        let nmt = Banks::new(
            ppu_mem::NAMETABLE_START,
            SIZE_4K,
            SIZE_1K,
            &[
                (SourceId::Ciram, len(SourceId::Ciram)),
                (SourceId::Chr, len(SourceId::Chr)),
                (SourceId::Vram, len(SourceId::Vram)),
            ],
        );
        let wrk = Banks::new(
            0x6000,
            SIZE_8K,
            SIZE_8K,
            &[
                (SourceId::Wrk, len(SourceId::Wrk)),
                (SourceId::Prg, len(SourceId::Prg)),
            ],
        );

        let mut hw = Self {
            prg,
            chr,
            nmt,
            wrk,
            sources,
            irq: false,
            open_bus: OpenBus::new(),
            ppu,
            cycles: 0,
            crc,
            attribute,
            submapper,
            header_mirroring: mirroring,
            mirroring,
        };
        hw.apply_mirroring(mirroring);
        hw
    }

    /// CPU cycles clocked since power-on.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub(crate) fn tick(&mut self) {
        self.cycles = self.cycles.wrapping_add(1);
        self.open_bus.step();
    }

    /// CRC32 of PRG + CHR.
    #[inline]
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Database disambiguation byte.
    #[inline]
    pub fn attribute(&self) -> u8 {
        self.attribute
    }

    #[inline]
    pub fn submapper(&self) -> u8 {
        self.submapper
    }

    #[inline]
    pub fn header_mirroring(&self) -> Mirroring {
        self.header_mirroring
    }

    #[inline]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn has_wrk(&self) -> bool {
        !self.sources.get(SourceId::Wrk).is_empty()
    }

    pub fn source_len(&self, id: SourceId) -> usize {
        self.sources.get(id).len()
    }

    /// Source holding writable pattern memory, if any.
    pub fn chr_ram_source(&self) -> Option<SourceId> {
        [SourceId::Chr, SourceId::ChrRam].into_iter().find(|&id| {
            let source = self.sources.get(id);
            source.writable() && !source.is_empty()
        })
    }

    // Bank switching ------------------------------------------------------

    #[inline]
    pub fn swap_prg(&mut self, size: usize, addr: u16, bank: u32) {
        self.prg.swap_bank(size, addr, bank);
    }

    pub fn swap_prgs(&mut self, size: usize, addr: u16, banks: &[u32]) {
        self.prg.swap_banks(size, addr, banks);
    }

    /// Maps a work RAM bank into the PRG region.
    pub fn swap_prg_wrk(&mut self, size: usize, addr: u16, bank: u32) {
        self.prg.swap_bank_from(SourceId::Wrk, size, addr, bank);
    }

    pub fn swap_chr(&mut self, size: usize, addr: u16, bank: u32) {
        self.ppu.update();
        self.chr.swap_bank(size, addr, bank);
    }

    pub fn swap_chrs(&mut self, size: usize, addr: u16, banks: &[u32]) {
        self.ppu.update();
        self.chr.swap_banks(size, addr, banks);
    }

    pub fn swap_chr_from(&mut self, source: SourceId, size: usize, addr: u16, bank: u32) {
        self.ppu.update();
        self.chr.swap_bank_from(source, size, addr, bank);
    }

    /// Points nametable `slot` (0-3) at a 1 KiB page of `source`.
    pub fn swap_nmt(&mut self, slot: u16, source: SourceId, bank: u32) {
        self.ppu.update();
        let addr = ppu_mem::NAMETABLE_START + (slot & 3) * SIZE_1K as u16;
        self.nmt.swap_bank_from(source, SIZE_1K, addr, bank);
    }

    /// Selects `bank` of work RAM at `$6000`.
    pub fn swap_wrk(&mut self, bank: u32) {
        self.wrk.swap_bank(SIZE_8K, 0x6000, bank);
    }

    /// Maps 8 KiB of PRG ROM at `$6000`.
    pub fn swap_wrk_prg(&mut self, bank: u32) {
        self.wrk.swap_bank_from(SourceId::Prg, SIZE_8K, 0x6000, bank);
    }

    pub fn set_wrk_access(&mut self, readable: bool, writable: bool) {
        self.wrk.set_access(SIZE_8K, 0x6000, readable, writable);
    }

    /// Gates reads and writes of nametable `slot` (0-3).
    pub fn set_nmt_access(&mut self, slot: u16, readable: bool, writable: bool) {
        self.ppu.update();
        let addr = ppu_mem::NAMETABLE_START + (slot & 3) * SIZE_1K as u16;
        self.nmt.set_access(SIZE_1K, addr, readable, writable);
    }

    pub fn set_chr_access(&mut self, readable: bool, writable: bool) {
        self.ppu.update();
        self.chr.set_access(SIZE_8K, 0x0000, readable, writable);
    }

    /// Value a discrete board actually latches when the CPU writes `data`
    /// while the ROM drives the bus with the byte at `addr`.
    #[inline]
    pub fn bus_conflict(&self, addr: u16, data: u8) -> u8 {
        data & self.peek_prg(addr)
    }

    // Mirroring -----------------------------------------------------------

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.ppu.update();
        self.apply_mirroring(mirroring);
    }

    fn apply_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        let pages = mirroring.pages();
        for (slot, &page) in pages.iter().enumerate() {
            let addr = ppu_mem::NAMETABLE_START + (slot * SIZE_1K) as u16;
            let source = if mirroring == Mirroring::FourScreen && slot >= 2 {
                SourceId::Vram
            } else {
                SourceId::Ciram
            };
            self.nmt.swap_bank_from(source, SIZE_1K, addr, page);
        }
    }

    /// Bit 0: 0 horizontal, 1 vertical.
    pub fn set_mirroring_hv(&mut self, data: u8) {
        self.set_mirroring(if data & 1 == 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        });
    }

    /// Bit 0: 0 vertical, 1 horizontal.
    pub fn set_mirroring_vh(&mut self, data: u8) {
        self.set_mirroring(if data & 1 == 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        });
    }

    /// Bits 0-1: vertical, horizontal, single lower, single upper.
    pub fn set_mirroring_vh01(&mut self, data: u8) {
        self.set_mirroring(match data & 3 {
            0 => Mirroring::Vertical,
            1 => Mirroring::Horizontal,
            2 => Mirroring::SingleScreenLower,
            _ => Mirroring::SingleScreenUpper,
        });
    }

    /// Bits 0-1: horizontal, vertical, single lower, single upper.
    pub fn set_mirroring_hv01(&mut self, data: u8) {
        self.set_mirroring(match data & 3 {
            0 => Mirroring::Horizontal,
            1 => Mirroring::Vertical,
            2 => Mirroring::SingleScreenLower,
            _ => Mirroring::SingleScreenUpper,
        });
    }

    /// Single screen from one bit: 0 lower, 1 upper.
    pub fn set_mirroring_single(&mut self, upper: bool) {
        self.set_mirroring(if upper {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        });
    }

    // Memory access -------------------------------------------------------

    #[inline]
    pub fn peek_prg(&self, addr: u16) -> u8 {
        self.prg
            .read(&self.sources, addr)
            .unwrap_or_else(|| self.open_bus.sample())
    }

    /// Stores into the PRG region; only lands where work RAM is mapped.
    #[inline]
    pub fn poke_prg(&mut self, addr: u16, data: u8) {
        self.prg.write(&mut self.sources, addr, data);
    }

    #[inline]
    pub fn peek_wrk(&self, addr: u16) -> u8 {
        self.wrk
            .read(&self.sources, addr)
            .unwrap_or_else(|| self.open_bus.sample())
    }

    #[inline]
    pub fn poke_wrk(&mut self, addr: u16, data: u8) {
        self.wrk.write(&mut self.sources, addr, data);
    }

    /// Unreadable pattern memory returns the low address byte, which is
    /// what the PPU's multiplexed bus leaves behind.
    #[inline]
    pub fn peek_chr(&self, addr: u16) -> u8 {
        self.chr.read(&self.sources, addr).unwrap_or(addr as u8)
    }

    #[inline]
    pub fn poke_chr(&mut self, addr: u16, data: u8) {
        self.chr.write(&mut self.sources, addr, data);
    }

    #[inline]
    pub fn peek_nmt(&self, addr: u16) -> u8 {
        self.nmt.read(&self.sources, addr).unwrap_or(addr as u8)
    }

    #[inline]
    pub fn poke_nmt(&mut self, addr: u16, data: u8) {
        self.nmt.write(&mut self.sources, addr, data);
    }

    pub(crate) fn peek_ppu(&self, addr: u16) -> u8 {
        if addr < ppu_mem::NAMETABLE_START {
            self.peek_chr(addr)
        } else {
            self.peek_nmt(addr)
        }
    }

    pub(crate) fn poke_ppu(&mut self, addr: u16, data: u8) {
        if addr < ppu_mem::NAMETABLE_START {
            self.poke_chr(addr, data);
        } else {
            self.poke_nmt(addr, data);
        }
    }

    // Save states ---------------------------------------------------------

    pub(crate) fn save(&self, saver: &mut Saver) {
        for (tag, banks) in [
            (Tag::Prg, &self.prg),
            (Tag::Chr, &self.chr),
            (Tag::Nmt, &self.nmt),
            (Tag::Wrk, &self.wrk),
        ] {
            saver.begin(tag);
            banks.save(saver);
            if tag == Tag::Nmt {
                saver.write8(self.mirroring as u8);
            }
            saver.end();
        }

        for (tag, source) in self.ram_chunks() {
            let source = self.sources.get(source);
            if !source.is_empty() {
                saver.begin(tag).compress(source.as_slice()).end();
            }
        }

        saver.begin(Tag::Irq).write_bool(self.irq).end();
    }

    fn ram_chunks(&self) -> impl Iterator<Item = (Tag, SourceId)> + use<> {
        let chr = self.chr_ram_source();
        [
            chr.map(|id| (Tag::ChrRam, id)),
            Some((Tag::WrkRam, SourceId::Wrk)),
            Some((Tag::Ciram, SourceId::Ciram)),
            Some((Tag::Vram, SourceId::Vram)),
        ]
        .into_iter()
        .flatten()
    }

    /// Restores the chunk `tag` the loader is positioned in. Returns `false`
    /// for tags that do not belong to the hardware.
    pub(crate) fn load_chunk(&mut self, tag: Tag, loader: &mut Loader<'_>) -> Result<bool, Error> {
        match tag {
            Tag::Prg => self.prg.load(loader)?,
            Tag::Chr => self.chr.load(loader)?,
            Tag::Nmt => {
                self.nmt.load(loader)?;
                self.mirroring = Mirroring::from_repr(loader.read8()?)
                    .ok_or(Error::CorruptSaveState("unknown mirroring"))?;
            }
            Tag::Wrk => self.wrk.load(loader)?,
            Tag::ChrRam | Tag::WrkRam | Tag::Ciram | Tag::Vram => {
                let Some((_, id)) = self.ram_chunks().find(|&(t, _)| t == tag) else {
                    return Err(Error::CorruptSaveState("ram chunk for absent memory"));
                };
                let source = self.sources.get_mut(id);
                if source.is_empty() {
                    warn!("ignoring {} chunk for empty {id:?}", Tag::display(tag.fourcc()));
                } else {
                    loader.uncompress(source.as_mut_slice())?;
                }
            }
            Tag::Irq => self.irq = loader.read_bool()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{banks::Source, cartridge::mapper::ports::Detached};

    fn hardware(mirroring: Mirroring) -> Hardware {
        hardware_with(mirroring, Sources::default())
    }

    fn hardware_with(mirroring: Mirroring, mut sources: Sources) -> Hardware {
        let prg: Vec<u8> = (0..64 * 1024).map(|i| (i / SIZE_8K) as u8).collect();
        sources.insert(SourceId::Prg, Source::new(prg.into(), false));
        sources.insert(SourceId::Chr, Source::new(vec![0; SIZE_8K].into(), true));
        sources.insert(SourceId::Ciram, Source::new(vec![0; 0x800].into(), true));
        sources.insert(SourceId::Vram, Source::new(vec![0; 0x800].into(), true));
        Hardware::new(sources, Box::new(Detached), 0, 0, 0, mirroring)
    }

    #[test]
    fn mirroring_helpers_follow_their_bit_order() {
        let mut hw = hardware(Mirroring::Horizontal);
        hw.set_mirroring_hv(1);
        assert_eq!(hw.mirroring(), Mirroring::Vertical);
        hw.set_mirroring_vh(1);
        assert_eq!(hw.mirroring(), Mirroring::Horizontal);
        hw.set_mirroring_vh01(2);
        assert_eq!(hw.mirroring(), Mirroring::SingleScreenLower);
        hw.set_mirroring_hv01(0);
        assert_eq!(hw.mirroring(), Mirroring::Horizontal);
        hw.set_mirroring_hv01(3);
        assert_eq!(hw.mirroring(), Mirroring::SingleScreenUpper);
    }

    #[test]
    fn nametables_follow_mirroring() {
        let mut hw = hardware(Mirroring::Vertical);
        hw.poke_nmt(0x2000, 0x11);
        hw.poke_nmt(0x2400, 0x22);
        assert_eq!(hw.peek_nmt(0x2800), 0x11);
        assert_eq!(hw.peek_nmt(0x2C00), 0x22);

        hw.set_mirroring(Mirroring::Horizontal);
        assert_eq!(hw.peek_nmt(0x2400), 0x11);
        assert_eq!(hw.peek_nmt(0x2800), 0x22);
        // $3000-$3EFF mirrors $2000-$2EFF.
        assert_eq!(hw.peek_nmt(0x3000), 0x11);
    }

    #[test]
    fn four_screen_uses_cartridge_vram() {
        let mut hw = hardware(Mirroring::FourScreen);
        for (i, addr) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
            hw.poke_nmt(addr, i as u8 + 1);
        }
        for (i, addr) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
            assert_eq!(hw.peek_nmt(addr), i as u8 + 1);
        }
    }

    #[test]
    fn bus_conflict_ands_with_rom() {
        let mut hw = hardware(Mirroring::Horizontal);
        hw.swap_prg(SIZE_8K, 0x8000, 5);
        assert_eq!(hw.bus_conflict(0x8000, 0xFF), 5);
        assert_eq!(hw.bus_conflict(0x8000, 0x01), 1);
    }

    #[test]
    fn missing_wrk_reads_open_bus() {
        let mut hw = hardware(Mirroring::Horizontal);
        hw.open_bus.latch(0x6E);
        assert!(!hw.has_wrk());
        assert_eq!(hw.peek_wrk(0x6000), 0x6E);

        let mut sources = Sources::default();
        sources.insert(SourceId::Wrk, Source::new(vec![0; SIZE_8K].into(), true));
        let mut hw = hardware_with(Mirroring::Horizontal, sources);
        hw.poke_wrk(0x6010, 0x99);
        assert_eq!(hw.peek_wrk(0x6010), 0x99);
    }

    #[test]
    fn work_ram_maps_into_prg_region() {
        let mut sources = Sources::default();
        sources.insert(SourceId::Wrk, Source::new(vec![0; 2 * SIZE_8K].into(), true));
        let mut hw = hardware_with(Mirroring::Horizontal, sources);
        hw.poke_prg(0xA000, 0x77);
        assert_eq!(hw.peek_prg(0xA000), 1);

        hw.swap_prg_wrk(SIZE_8K, 0xA000, 1);
        hw.poke_prg(0xA000, 0x77);
        assert_eq!(hw.peek_prg(0xA000), 0x77);
        hw.swap_wrk(1);
        assert_eq!(hw.peek_wrk(0x6000), 0x77);
    }
}
