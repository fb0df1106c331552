//! Bandai FCG / LZ93D50 (16, 159).
//!
//! Registers repeat every 16 bytes. FCG-1/2 boards decode them at
//! `$6000-$7FFF`, LZ93D50 boards at `$8000-$FFFF`; plain iNES images do not
//! say which, so both ranges are decoded.
//!
//! | Offset | Register                                               |
//! |--------|--------------------------------------------------------|
//! | `0-7`  | 1 KiB CHR banks                                        |
//! | `8`    | 16 KiB PRG bank at `$8000`                             |
//! | `9`    | Mirroring (vertical, horizontal, lower, upper)         |
//! | `A`    | IRQ enable; LZ93D50 copies the latch into the counter  |
//! | `B/C`  | IRQ latch low/high                                     |
//! | `D`    | Serial EEPROM control (not emulated)                   |
//!
//! The 16-bit counter decrements every CPU cycle while enabled and raises
//! the IRQ when it reaches zero.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper16 {
    irq_enabled: bool,
    irq_counter: u16,
    irq_latch: u16,
}

impl Mapper16 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0x0F {
            reg @ 0x0..=0x7 => hw.swap_chr(SIZE_1K, reg * SIZE_1K as u16, u32::from(data)),
            0x8 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F)),
            0x9 => hw.set_mirroring_vh01(data),
            0xA => {
                board.irq_enabled = data & 1 != 0;
                board.irq_counter = board.irq_latch;
                hw.irq = false;
            }
            0xB => board.irq_latch = (board.irq_latch & 0xFF00) | u16::from(data),
            0xC => board.irq_latch = (board.irq_latch & 0x00FF) | u16::from(data) << 8,
            _ => {}
        }
    }
}

impl Board for Mapper16 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        hw.irq = false;
        bus.map_poke(
            cpu_mem::PRG_RAM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        if self.irq_counter == 0 {
            hw.irq = true;
        }
        self.irq_counter = self.irq_counter.wrapping_sub(1);
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
        Cow::Borrowed("Bandai FCG")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn banks_decode_in_both_ranges() {
        let mut mapper = mapper(context(16, 256, 256));
        mapper.cpu_write(0x6008, 3);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 6);
        mapper.cpu_write(0x8003, 77);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0C00), 77);
        mapper.cpu_write(0xFFF8, 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
    }

    #[test]
    fn counter_fires_after_latch_cycles() {
        let mut mapper = mapper(context(16, 256, 256));
        mapper.cpu_write(0x800B, 3);
        mapper.cpu_write(0x800C, 0);
        mapper.cpu_write(0x800A, 1);
        for _ in 0..3 {
            mapper.clock_cpu();
            assert!(!mapper.irq_pending());
        }
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        mapper.cpu_write(0x800A, 0);
        assert!(!mapper.irq_pending());
    }
}
