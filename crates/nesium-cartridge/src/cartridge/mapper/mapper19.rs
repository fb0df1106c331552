//! Namco 129/163 (19).
//!
//! | Address         | Register                                               |
//! |-----------------|--------------------------------------------------------|
//! | `$4800-$4FFF`   | Internal RAM data port                                 |
//! | `$5000-$57FF`   | IRQ counter bits 0-7                                   |
//! | `$5800-$5FFF`   | IRQ counter bits 8-14, bit 7 enable                    |
//! | `$8000-$BFFF`   | CHR 1 KiB banks 0-7 (`$E0+` may select CIRAM)          |
//! | `$C000-$DFFF`   | Nametables 0-3 (`$E0+` selects CIRAM, else CHR ROM)    |
//! | `$E000`         | PRG `$8000`                                            |
//! | `$E800`         | PRG `$A000`; bits 6/7 keep CHR ROM in each half        |
//! | `$F000`         | PRG `$C000`                                            |
//! | `$F800`         | Work RAM write enable, internal RAM address             |
//!
//! The IRQ counter counts up once per CPU cycle and stops at `$7FFF`,
//! where it asserts the IRQ. Expansion audio is not produced.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K, SourceId},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

const INTERNAL_RAM_SIZE: usize = 0x80;
const IRQ_COUNTER_MAX: u16 = 0x7FFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper19 {
    chr: [u8; 8],
    nmt: [u8; 4],
    prg: [u8; 3],
    /// Bits 6-7 of `$E800`.
    chr_ram_disable: u8,
    irq_counter: u16,
    irq_enabled: bool,
    ram: [u8; INTERNAL_RAM_SIZE],
    /// Bits 0-6 address, bit 7 auto-increment.
    ram_addr: u8,
}

impl Default for Mapper19 {
    fn default() -> Self {
        Self {
            chr: [0; 8],
            nmt: [0xE0, 0xE1, 0xE0, 0xE1],
            prg: [0; 3],
            chr_ram_disable: 0,
            irq_counter: 0,
            irq_enabled: false,
            ram: [0; INTERNAL_RAM_SIZE],
            ram_addr: 0,
        }
    }
}

impl Mapper19 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_chr(&self, hw: &mut Hardware) {
        for (slot, &value) in self.chr.iter().enumerate() {
            let addr = (slot * SIZE_1K) as u16;
            let keep_rom = self.chr_ram_disable & (0x40 << (slot / 4)) != 0;
            if value >= 0xE0 && !keep_rom {
                hw.swap_chr_from(SourceId::Ciram, SIZE_1K, addr, u32::from(value & 1));
            } else {
                hw.swap_chr(SIZE_1K, addr, u32::from(value));
            }
        }
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        for (slot, &value) in self.nmt.iter().enumerate() {
            if value >= 0xE0 {
                hw.swap_nmt(slot as u16, SourceId::Ciram, u32::from(value & 1));
            } else {
                hw.swap_nmt(slot as u16, SourceId::Chr, u32::from(value));
            }
        }
    }

    fn update_prg(&self, hw: &mut Hardware) {
        let [a, b, c] = self.prg.map(|bank| u32::from(bank & 0x3F));
        hw.swap_prgs(SIZE_8K, 0x8000, &[a, b, c, LAST]);
    }

    fn advance_ram_addr(&mut self) {
        if self.ram_addr & 0x80 != 0 {
            self.ram_addr = 0x80 | (self.ram_addr.wrapping_add(1) & 0x7F);
        }
    }

    fn peek_ram(board: &mut Self, _hw: &mut Hardware, _addr: u16) -> u8 {
        let value = board.ram[usize::from(board.ram_addr & 0x7F)];
        board.advance_ram_addr();
        value
    }

    fn poke_ram(board: &mut Self, _hw: &mut Hardware, _addr: u16, data: u8) {
        board.ram[usize::from(board.ram_addr & 0x7F)] = data;
        board.advance_ram_addr();
    }

    fn peek_irq(board: &mut Self, _hw: &mut Hardware, addr: u16) -> u8 {
        if addr < 0x5800 {
            board.irq_counter as u8
        } else {
            (board.irq_counter >> 8) as u8 & 0x7F | u8::from(board.irq_enabled) << 7
        }
    }

    fn poke_irq(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if addr < 0x5800 {
            board.irq_counter = (board.irq_counter & 0x7F00) | u16::from(data);
        } else {
            board.irq_counter = (board.irq_counter & 0x00FF) | u16::from(data & 0x7F) << 8;
            board.irq_enabled = data & 0x80 != 0;
        }
        hw.irq = false;
    }

    fn poke_chr(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.chr[usize::from((addr - 0x8000) >> 11)] = data;
        board.update_chr(hw);
    }

    fn poke_nmt(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.nmt[usize::from((addr - 0xC000) >> 11)] = data;
        board.update_nmt(hw);
    }

    fn poke_prg(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF800 {
            0xE000 => board.prg[0] = data,
            0xE800 => {
                board.prg[1] = data;
                board.chr_ram_disable = data & 0xC0;
                board.update_chr(hw);
            }
            0xF000 => board.prg[2] = data,
            _ => {
                hw.set_wrk_access(true, data & 0xF0 == 0x40);
                board.ram_addr = data;
            }
        }
        board.update_prg(hw);
    }
}

impl Board for Mapper19 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update_chr(hw);
        self.update_nmt(hw);
        self.update_prg(hw);

        bus.map(0x4800, 0x4FFF, Peek::Board(Self::peek_ram), Poke::Board(Self::poke_ram));
        bus.map(0x5000, 0x5FFF, Peek::Board(Self::peek_irq), Poke::Board(Self::poke_irq));
        bus.map_poke(0x8000, 0xBFFF, Poke::Board(Self::poke_chr));
        bus.map_poke(0xC000, 0xDFFF, Poke::Board(Self::poke_nmt));
        bus.map_poke(0xE000, 0xFFFF, Poke::Board(Self::poke_prg));
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled || self.irq_counter >= IRQ_COUNTER_MAX {
            return;
        }
        self.irq_counter += 1;
        if self.irq_counter == IRQ_COUNTER_MAX {
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write(&self.chr)
            .write(&self.nmt)
            .write(&self.prg)
            .write8(self.chr_ram_disable)
            .write16(self.irq_counter)
            .write_bool(self.irq_enabled)
            .write(&self.ram)
            .write8(self.ram_addr);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.chr)?;
        loader.read(&mut self.nmt)?;
        loader.read(&mut self.prg)?;
        self.chr_ram_disable = loader.read8()?;
        self.irq_counter = loader.read16()? & IRQ_COUNTER_MAX;
        self.irq_enabled = loader.read_bool()?;
        loader.read(&mut self.ram)?;
        self.ram_addr = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Namco 163")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn prg_and_chr_banks() {
        let mut mapper = mapper(context(19, 256, 256));
        mapper.cpu_write(0xE000, 4);
        mapper.cpu_write(0xF000, 9);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 9);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 31);
        mapper.cpu_write(0x9800, 0x21);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0C00), 0x21);
    }

    #[test]
    fn high_chr_values_select_ciram_unless_disabled() {
        let mut mapper = mapper(context(19, 256, 256));
        mapper.ppu_write(0x2400, 0x77);
        mapper.cpu_write(0x8000, 0xE1);
        assert_eq!(mapper.ppu_read(0x0000), 0x77);
        mapper.cpu_write(0xE800, 0x40);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0xE1);
    }

    #[test]
    fn nametables_can_map_chr_rom() {
        let mut mapper = mapper(context(19, 256, 256));
        mapper.cpu_write(0xC800, 0x12);
        assert_eq!(mapper.ppu_read(0x2400), 0x12);
    }

    #[test]
    fn counter_is_readable_and_stops_at_max() {
        let mut mapper = mapper(context(19, 256, 256));
        mapper.cpu_write(0x5000, 0xFD);
        mapper.cpu_write(0x5800, 0xFF);
        assert_eq!(mapper.cpu_read(0x5000), 0xFD);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        mapper.clock_cpu();
        assert_eq!(mapper.cpu_read(0x5000), 0xFF);
        assert_eq!(mapper.cpu_read(0x5800), 0xFF);
    }

    #[test]
    fn internal_ram_auto_increments() {
        let mut mapper = mapper(context(19, 256, 256));
        mapper.cpu_write(0xF800, 0x80);
        mapper.cpu_write(0x4800, 0x11);
        mapper.cpu_write(0x4800, 0x22);
        mapper.cpu_write(0xF800, 0x81);
        assert_eq!(mapper.cpu_read(0x4800), 0x22);
    }
}
