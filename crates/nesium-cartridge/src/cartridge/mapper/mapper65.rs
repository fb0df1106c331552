//! Irem H-3001 (65).
//!
//! | Address         | Register                                         |
//! |-----------------|--------------------------------------------------|
//! | `$8000`         | PRG `$8000`                                      |
//! | `$9001`         | Bit 7 mirroring (1 horizontal)                   |
//! | `$9003`         | Bit 7 IRQ enable, acknowledges                   |
//! | `$9004`         | Reload counter from latch, acknowledges          |
//! | `$9005/$9006`   | IRQ latch high/low                               |
//! | `$A000`         | PRG `$A000`                                      |
//! | `$B000-$B007`   | CHR 1 KiB banks                                  |
//! | `$C000`         | PRG `$C000`                                      |
//!
//! The 16-bit counter decrements every CPU cycle and fires once on
//! reaching zero.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper65 {
    irq_enabled: bool,
    irq_counter: u16,
    irq_latch: u16,
}

impl Mapper65 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr {
            0x8000 => hw.swap_prg(SIZE_8K, 0x8000, u32::from(data)),
            0x9001 => hw.set_mirroring_vh(data >> 7),
            0x9003 => {
                board.irq_enabled = data & 0x80 != 0;
                hw.irq = false;
            }
            0x9004 => {
                board.irq_counter = board.irq_latch;
                hw.irq = false;
            }
            0x9005 => board.irq_latch = (board.irq_latch & 0x00FF) | u16::from(data) << 8,
            0x9006 => board.irq_latch = (board.irq_latch & 0xFF00) | u16::from(data),
            0xA000 => hw.swap_prg(SIZE_8K, 0xA000, u32::from(data)),
            0xB000..=0xB007 => hw.swap_chr(SIZE_1K, (addr & 7) * SIZE_1K as u16, u32::from(data)),
            0xC000 => hw.swap_prg(SIZE_8K, 0xC000, u32::from(data)),
            _ => {}
        }
    }
}

impl Board for Mapper65 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prgs(SIZE_8K, 0x8000, &[0, 1, LAST - 1, LAST]);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled || self.irq_counter == 0 {
            return;
        }
        self.irq_counter -= 1;
        if self.irq_counter == 0 {
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write_bool(self.irq_enabled)
            .write16(self.irq_counter)
            .write16(self.irq_latch);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_enabled = loader.read_bool()?;
        self.irq_counter = loader.read16()?;
        self.irq_latch = loader.read16()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Irem H-3001")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn registers() {
        let mut mapper = mapper(context(65, 256, 256));
        mapper.cpu_write(0xA000, 11);
        mapper.cpu_write(0xB007, 0x66);
        mapper.cpu_write(0x9001, 0x80);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 11);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 0x66);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn counter_fires_once() {
        let mut mapper = mapper(context(65, 256, 256));
        mapper.cpu_write(0x9006, 2);
        mapper.cpu_write(0x9005, 0);
        mapper.cpu_write(0x9004, 0);
        mapper.cpu_write(0x9003, 0x80);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        mapper.cpu_write(0x9003, 0x80);
        for _ in 0..10 {
            mapper.clock_cpu();
        }
        assert!(!mapper.irq_pending());
    }
}
