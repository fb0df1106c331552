//! MMC5 (5, ExROM).
//!
//! | Address         | Register                                              |
//! |-----------------|-------------------------------------------------------|
//! | `$5100`         | PRG mode: 32K, 16K+16K, 16K+8K+8K, 4×8K               |
//! | `$5101`         | CHR mode: 8K, 4K, 2K, 1K                              |
//! | `$5102/$5103`   | Work RAM write keys (`%10`, `%01` to unlock)          |
//! | `$5104`         | ExRAM mode                                            |
//! | `$5105`         | Nametable sources, two bits per slot                  |
//! | `$5106/$5107`   | Fill tile and fill attribute                          |
//! | `$5113`         | Work RAM bank at `$6000`                              |
//! | `$5114-$5117`   | PRG banks; bit 7 clear maps work RAM (not `$5117`)    |
//! | `$5120-$5127`   | CHR set A (sprites)                                   |
//! | `$5128-$512B`   | CHR set B (background)                                |
//! | `$5130`         | CHR bank bits 8-9                                     |
//! | `$5200-$5202`   | Vertical split control, scroll, bank                  |
//! | `$5203`         | IRQ scanline                                          |
//! | `$5204`         | IRQ enable (write); pending, in-frame (read, acks)    |
//! | `$5205/$5206`   | 8×8 multiplier operands; product low/high on read     |
//! | `$5C00-$5FFF`   | ExRAM                                                 |
//!
//! Scanlines are found the way the chip finds them: three reads in a row
//! from one nametable address end a line, and a PPU that stops reading for
//! three CPU cycles has left the frame.
//!
//! Cartridge VRAM holds three 1 KiB pages: ExRAM, the fill page rewritten
//! from `$5106/$5107`, and a page of zeros that ExRAM nametables show while
//! ExRAM is in a RAM mode. Split rendering and extended attributes need
//! per-tile PPU context and are only latched. Audio is not produced.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_2K, SIZE_4K, SIZE_8K, SIZE_16K, SIZE_32K, SourceId},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

/// Work RAM when the image does not document a size.
const DEFAULT_WRK_SIZE: usize = 0x10000;

const EXRAM_PAGE: u32 = 0;
const FILL_PAGE: u32 = 1;
const ZERO_PAGE: u32 = 2;

const ATTRIBUTE_OFFSET: usize = 0x3C0;
/// CPU cycles without a PPU read after which rendering is over.
const IDLE_LIMIT: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper5 {
    prg_mode: u8,
    chr_mode: u8,
    wrk_keys: [u8; 2],
    exram_mode: u8,
    nmt_select: u8,
    fill_tile: u8,
    fill_attr: u8,
    wrk_bank: u8,
    /// `$5114-$5117`.
    prg: [u8; 4],
    chr_a: [u8; 8],
    chr_b: [u8; 4],
    chr_high: u8,
    /// Set B was written last.
    chr_b_last: bool,
    split: [u8; 3],
    irq_target: u8,
    irq_enabled: bool,
    irq_pending: bool,
    in_frame: bool,
    scanline: u8,
    last_nt_addr: u16,
    nt_repeats: u8,
    idle_cycles: u8,
    multiplicand: u8,
    multiplier: u8,
}

impl Default for Mapper5 {
    fn default() -> Self {
        Self {
            prg_mode: 3,
            chr_mode: 3,
            wrk_keys: [0; 2],
            exram_mode: 0,
            nmt_select: 0,
            fill_tile: 0,
            fill_attr: 0,
            wrk_bank: 0,
            prg: [0xFF; 4],
            chr_a: [0; 8],
            chr_b: [0; 4],
            chr_high: 0,
            chr_b_last: false,
            split: [0; 3],
            irq_target: 0,
            irq_enabled: false,
            irq_pending: false,
            in_frame: false,
            scanline: 0,
            last_nt_addr: 0,
            nt_repeats: 0,
            idle_cycles: 0,
            multiplicand: 0xFF,
            multiplier: 0xFF,
        }
    }
}

impl Mapper5 {
    pub fn new(ctx: &mut Context) -> Self {
        if ctx.wrk_auto {
            ctx.wrk_size = DEFAULT_WRK_SIZE;
            if ctx.wrk_backed > 0 {
                ctx.wrk_backed = DEFAULT_WRK_SIZE;
            }
        }
        ctx.nmt_ram = SIZE_4K;
        Self::default()
    }

    fn wrk_writable(&self) -> bool {
        self.wrk_keys[0] & 0x03 == 0x02 && self.wrk_keys[1] & 0x03 == 0x01
    }

    /// Maps `reg` into a switchable window: ROM with bit 7 set, work RAM
    /// otherwise.
    fn swap_window(hw: &mut Hardware, size: usize, addr: u16, reg: u8) {
        let units = (size / SIZE_8K) as u32;
        if reg & 0x80 != 0 {
            hw.swap_prg(size, addr, u32::from(reg & 0x7F) / units);
        } else {
            hw.swap_prg_wrk(size, addr, u32::from(reg & 0x0F) / units);
        }
    }

    fn update_prg(&self, hw: &mut Hardware) {
        hw.swap_wrk(u32::from(self.wrk_bank & 0x0F));
        hw.set_wrk_access(true, self.wrk_writable());

        let last = u32::from(self.prg[3] & 0x7F);
        match self.prg_mode & 0x03 {
            0 => hw.swap_prg(SIZE_32K, 0x8000, last >> 2),
            1 => {
                Self::swap_window(hw, SIZE_16K, 0x8000, self.prg[1]);
                hw.swap_prg(SIZE_16K, 0xC000, last >> 1);
            }
            2 => {
                Self::swap_window(hw, SIZE_16K, 0x8000, self.prg[1]);
                Self::swap_window(hw, SIZE_8K, 0xC000, self.prg[2]);
                hw.swap_prg(SIZE_8K, 0xE000, last);
            }
            _ => {
                Self::swap_window(hw, SIZE_8K, 0x8000, self.prg[0]);
                Self::swap_window(hw, SIZE_8K, 0xA000, self.prg[1]);
                Self::swap_window(hw, SIZE_8K, 0xC000, self.prg[2]);
                hw.swap_prg(SIZE_8K, 0xE000, last);
            }
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let high = u32::from(self.chr_high & 0x03) << 8;
        // Set B repeats its four registers over both pattern tables.
        let regs: [u8; 8] = if self.chr_b_last {
            let b = self.chr_b;
            [b[0], b[1], b[2], b[3], b[0], b[1], b[2], b[3]]
        } else {
            self.chr_a
        };
        let r = regs.map(|reg| high | u32::from(reg));
        match self.chr_mode & 0x03 {
            0 => hw.swap_chr(SIZE_8K, 0x0000, r[7]),
            1 => hw.swap_chrs(SIZE_4K, 0x0000, &[r[3], r[7]]),
            2 => hw.swap_chrs(SIZE_2K, 0x0000, &[r[1], r[3], r[5], r[7]]),
            _ => hw.swap_chrs(SIZE_1K, 0x0000, &r),
        }
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        for slot in 0..4u16 {
            let (source, page, writable) = match self.nmt_select >> (slot * 2) & 0x03 {
                page @ (0 | 1) => (SourceId::Ciram, u32::from(page), true),
                2 if self.exram_mode < 2 => (SourceId::Vram, EXRAM_PAGE, true),
                2 => (SourceId::Vram, ZERO_PAGE, false),
                _ => (SourceId::Vram, FILL_PAGE, false),
            };
            hw.swap_nmt(slot, source, page);
            hw.set_nmt_access(slot, true, writable);
        }
    }

    fn refill(&self, hw: &mut Hardware) {
        hw.ppu.update();
        let vram = hw.sources.get_mut(SourceId::Vram).as_mut_slice();
        let Some(fill) = vram.get_mut(SIZE_1K..SIZE_2K) else {
            return;
        };
        let (tiles, attributes) = fill.split_at_mut(ATTRIBUTE_OFFSET);
        tiles.fill(self.fill_tile);
        attributes.fill((self.fill_attr & 0x03) * 0x55);
    }

    fn update_irq(&self, hw: &mut Hardware) {
        hw.irq = self.irq_enabled && self.irq_pending;
    }

    fn end_of_scanline(&mut self, hw: &mut Hardware) {
        if self.in_frame {
            self.scanline = self.scanline.wrapping_add(1);
            if self.scanline == self.irq_target {
                self.irq_pending = true;
            }
        } else {
            self.in_frame = true;
            self.scanline = 0;
            self.irq_pending = false;
        }
        self.update_irq(hw);
    }

    fn exram_index(addr: u16) -> usize {
        usize::from(addr) & (SIZE_1K - 1)
    }

    fn peek_exram(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        if board.exram_mode < 2 {
            return hw.open_bus.sample();
        }
        hw.sources.get(SourceId::Vram).as_slice()[Self::exram_index(addr)]
    }

    fn poke_exram(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let data = match board.exram_mode {
            3 => return,
            // Nametable modes only take writes while the PPU renders.
            0 | 1 if !board.in_frame => 0,
            _ => data,
        };
        hw.ppu.update();
        hw.sources.get_mut(SourceId::Vram).as_mut_slice()[Self::exram_index(addr)] = data;
    }

    fn peek_status(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        let product = u16::from(board.multiplicand) * u16::from(board.multiplier);
        match addr {
            0x5204 => {
                let status = u8::from(board.irq_pending) << 7 | u8::from(board.in_frame) << 6;
                board.irq_pending = false;
                board.update_irq(hw);
                status
            }
            0x5205 => product as u8,
            0x5206 => (product >> 8) as u8,
            _ => hw.open_bus.sample(),
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr {
            0x5100 => {
                board.prg_mode = data & 0x03;
                board.update_prg(hw);
            }
            0x5101 => {
                board.chr_mode = data & 0x03;
                board.update_chr(hw);
            }
            0x5102 | 0x5103 => {
                board.wrk_keys[usize::from(addr & 1)] = data;
                board.update_prg(hw);
            }
            0x5104 => {
                board.exram_mode = data & 0x03;
                board.update_nmt(hw);
            }
            0x5105 => {
                board.nmt_select = data;
                board.update_nmt(hw);
            }
            0x5106 => {
                board.fill_tile = data;
                board.refill(hw);
            }
            0x5107 => {
                board.fill_attr = data & 0x03;
                board.refill(hw);
            }
            0x5113 => {
                board.wrk_bank = data;
                board.update_prg(hw);
            }
            0x5114..=0x5117 => {
                board.prg[usize::from(addr - 0x5114)] = data;
                board.update_prg(hw);
            }
            0x5120..=0x5127 => {
                board.chr_a[usize::from(addr - 0x5120)] = data;
                board.chr_b_last = false;
                board.update_chr(hw);
            }
            0x5128..=0x512B => {
                board.chr_b[usize::from(addr - 0x5128)] = data;
                board.chr_b_last = true;
                board.update_chr(hw);
            }
            0x5130 => {
                board.chr_high = data & 0x03;
                board.update_chr(hw);
            }
            0x5200..=0x5202 => board.split[usize::from(addr - 0x5200)] = data,
            0x5203 => board.irq_target = data,
            0x5204 => {
                board.irq_enabled = data & 0x80 != 0;
                board.update_irq(hw);
            }
            0x5205 => board.multiplicand = data,
            0x5206 => board.multiplier = data,
            _ => {}
        }
    }

    /// Stores into work RAM banked into `$8000-$DFFF`; ROM windows ignore
    /// the write.
    fn poke_prg_ram(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if board.wrk_writable() {
            hw.poke_prg(addr, data);
        }
    }
}

impl Board for Mapper5 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update_prg(hw);
        self.update_chr(hw);
        self.update_nmt(hw);
        self.refill(hw);
        self.update_irq(hw);

        bus.map_poke(0x5100, 0x5206, Poke::Board(Self::poke_register));
        bus.map_peek(0x5204, 0x5206, Peek::Board(Self::peek_status));
        bus.map(0x5C00, 0x5FFF, Peek::Board(Self::peek_exram), Poke::Board(Self::poke_exram));
        bus.map_poke(0x8000, 0xDFFF, Poke::Board(Self::poke_prg_ram));
    }

    fn clock(&mut self, _hw: &mut Hardware) {
        if !self.in_frame {
            return;
        }
        self.idle_cycles += 1;
        if self.idle_cycles >= IDLE_LIMIT {
            self.in_frame = false;
            self.nt_repeats = 0;
            self.last_nt_addr = 0;
        }
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        self.idle_cycles = 0;
        let nametable = (0x2000..0x3000).contains(&addr);
        if nametable && addr == self.last_nt_addr {
            self.nt_repeats += 1;
            if self.nt_repeats == 2 {
                self.end_of_scanline(hw);
            }
        } else {
            self.nt_repeats = 0;
        }
        self.last_nt_addr = addr;
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.prg_mode)
            .write8(self.chr_mode)
            .write(&self.wrk_keys)
            .write8(self.exram_mode)
            .write8(self.nmt_select)
            .write8(self.fill_tile)
            .write8(self.fill_attr)
            .write8(self.wrk_bank)
            .write(&self.prg)
            .write(&self.chr_a)
            .write(&self.chr_b)
            .write8(self.chr_high)
            .write_bool(self.chr_b_last)
            .write(&self.split)
            .write8(self.irq_target)
            .write_bool(self.irq_enabled)
            .write_bool(self.irq_pending)
            .write_bool(self.in_frame)
            .write8(self.scanline)
            .write16(self.last_nt_addr)
            .write8(self.nt_repeats)
            .write8(self.idle_cycles)
            .write8(self.multiplicand)
            .write8(self.multiplier);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.prg_mode = loader.read8()? & 0x03;
        self.chr_mode = loader.read8()? & 0x03;
        loader.read(&mut self.wrk_keys)?;
        self.exram_mode = loader.read8()? & 0x03;
        self.nmt_select = loader.read8()?;
        self.fill_tile = loader.read8()?;
        self.fill_attr = loader.read8()? & 0x03;
        self.wrk_bank = loader.read8()?;
        loader.read(&mut self.prg)?;
        loader.read(&mut self.chr_a)?;
        loader.read(&mut self.chr_b)?;
        self.chr_high = loader.read8()? & 0x03;
        self.chr_b_last = loader.read_bool()?;
        loader.read(&mut self.split)?;
        self.irq_target = loader.read8()?;
        self.irq_enabled = loader.read_bool()?;
        self.irq_pending = loader.read_bool()?;
        self.in_frame = loader.read_bool()?;
        self.scanline = loader.read8()?;
        self.last_nt_addr = loader.read16()?;
        self.nt_repeats = loader.read8()?.min(2);
        self.idle_cycles = loader.read8()?.min(IDLE_LIMIT);
        self.multiplicand = loader.read8()?;
        self.multiplier = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("MMC5")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    fn mmc5() -> Box<dyn crate::cartridge::mapper::Mapper> {
        mapper(context(5, 256, 256))
    }

    /// Feeds the PPU the three identical nametable reads that end a line.
    fn scanline(mapper: &mut dyn crate::cartridge::mapper::Mapper) {
        for _ in 0..3 {
            mapper.ppu_read(0x2000);
        }
        mapper.ppu_read(0x0000);
    }

    #[test]
    fn power_on_maps_last_bank_everywhere() {
        let mut mapper = mmc5();
        for addr in [0x8000, 0xA000, 0xC000, 0xE000] {
            assert_eq!(prg_bank(mapper.as_mut(), addr), 31);
        }
    }

    #[test]
    fn prg_modes() {
        let mut mapper = mmc5();
        mapper.cpu_write(0x5114, 0x84);
        mapper.cpu_write(0x5115, 0x85);
        mapper.cpu_write(0x5116, 0x86);
        mapper.cpu_write(0x5117, 0x87);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 7);

        mapper.cpu_write(0x5100, 1);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 7);

        mapper.cpu_write(0x5100, 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 7);
    }

    #[test]
    fn work_ram_needs_both_keys() {
        let mut mapper = mmc5();
        mapper.cpu_write(0x6000, 0x11);
        assert_eq!(mapper.cpu_read(0x6000), 0);

        mapper.cpu_write(0x5102, 0x02);
        mapper.cpu_write(0x5103, 0x01);
        mapper.cpu_write(0x5113, 3);
        mapper.cpu_write(0x6000, 0x11);
        // The same RAM bank banked into $8000.
        mapper.cpu_write(0x5114, 0x03);
        assert_eq!(mapper.cpu_read(0x8000), 0x11);
        mapper.cpu_write(0x8001, 0x22);
        assert_eq!(mapper.cpu_read(0x6001), 0x22);
        // ROM windows ignore writes.
        mapper.cpu_write(0xA000, 0x33);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 31);
    }

    #[test]
    fn chr_modes_and_sets() {
        let mut mapper = mmc5();
        for (i, addr) in (0x5120..=0x5127).enumerate() {
            mapper.cpu_write(addr, 10 + i as u8);
        }
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 10);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 17);

        mapper.cpu_write(0x5101, 1);
        // 4 KiB bank 13 starts at 1 KiB bank 52.
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 52);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 68);

        mapper.cpu_write(0x5101, 3);
        mapper.cpu_write(0x512B, 40);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0C00), 40);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 40);
    }

    #[test]
    fn fill_mode_and_exram_nametables() {
        let mut mapper = mmc5();
        mapper.cpu_write(0x5106, 0x42);
        mapper.cpu_write(0x5107, 0x02);
        // Slot 0 fill, slot 1 ExRAM, slots 2-3 CIRAM.
        mapper.cpu_write(0x5105, 0b0100_1011);
        assert_eq!(mapper.ppu_read(0x2000), 0x42);
        assert_eq!(mapper.ppu_read(0x23C0), 0xAA);
        mapper.ppu_write(0x2000, 0x99);
        assert_eq!(mapper.ppu_read(0x2000), 0x42);

        mapper.cpu_write(0x5104, 2);
        mapper.cpu_write(0x5C05, 0x77);
        assert_eq!(mapper.cpu_read(0x5C05), 0x77);
        // RAM modes hide ExRAM from the PPU.
        assert_eq!(mapper.ppu_read(0x2405), 0);
        mapper.cpu_write(0x5104, 1);
        assert_eq!(mapper.ppu_read(0x2405), 0x77);
    }

    #[test]
    fn multiplier() {
        let mut mapper = mmc5();
        assert_eq!(mapper.cpu_read(0x5205), 0x01);
        assert_eq!(mapper.cpu_read(0x5206), 0xFE);
        mapper.cpu_write(0x5205, 200);
        mapper.cpu_write(0x5206, 3);
        assert_eq!(mapper.cpu_read(0x5205), 0x58);
        assert_eq!(mapper.cpu_read(0x5206), 0x02);
    }

    #[test]
    fn scanline_irq() {
        let mut mapper = mmc5();
        mapper.cpu_write(0x5203, 2);
        mapper.cpu_write(0x5204, 0x80);

        scanline(mapper.as_mut());
        assert_eq!(mapper.cpu_read(0x5204) & 0x40, 0x40);
        scanline(mapper.as_mut());
        assert!(!mapper.irq_pending());
        scanline(mapper.as_mut());
        assert!(mapper.irq_pending());

        assert_eq!(mapper.cpu_read(0x5204), 0xC0);
        assert!(!mapper.irq_pending());

        // The PPU going quiet ends the frame.
        for _ in 0..3 {
            mapper.clock_cpu();
        }
        assert_eq!(mapper.cpu_read(0x5204), 0x00);
    }
}
