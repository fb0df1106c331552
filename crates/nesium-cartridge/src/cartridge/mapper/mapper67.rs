//! Sunsoft-3 (67).
//!
//! | Address  | Register                                              |
//! |----------|-------------------------------------------------------|
//! | `$8800`  | CHR 2 KiB `$0000`                                     |
//! | `$9800`  | CHR 2 KiB `$0800`                                     |
//! | `$A800`  | CHR 2 KiB `$1000`                                     |
//! | `$B800`  | CHR 2 KiB `$1800`                                     |
//! | `$C800`  | IRQ counter, high byte then low byte                  |
//! | `$D800`  | Bit 4 IRQ enable; acknowledges, resets the byte toggle |
//! | `$E800`  | Mirroring (vertical, horizontal, lower, upper)        |
//! | `$F800`  | PRG 16 KiB `$8000`                                    |
//!
//! The counter decrements every CPU cycle; on underflow it asserts the IRQ
//! and stops itself.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_2K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper67 {
    irq_counter: u16,
    irq_enabled: bool,
    low_byte_next: bool,
}

impl Mapper67 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF800 {
            reg @ (0x8800 | 0x9800 | 0xA800 | 0xB800) => {
                let slot = (reg >> 12) - 0x8;
                hw.swap_chr(SIZE_2K, slot * SIZE_2K as u16, u32::from(data));
            }
            0xC800 => {
                board.irq_counter = if board.low_byte_next {
                    (board.irq_counter & 0xFF00) | u16::from(data)
                } else {
                    (board.irq_counter & 0x00FF) | u16::from(data) << 8
                };
                board.low_byte_next = !board.low_byte_next;
            }
            0xD800 => {
                board.irq_enabled = data & 0x10 != 0;
                board.low_byte_next = false;
                hw.irq = false;
            }
            0xE800 => hw.set_mirroring_vh01(data),
            0xF800 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data)),
            _ => {}
        }
    }
}

impl Board for Mapper67 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        hw.irq = false;
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        self.irq_counter = self.irq_counter.wrapping_sub(1);
        if self.irq_counter == 0xFFFF {
            self.irq_enabled = false;
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write16(self.irq_counter)
            .write_bool(self.irq_enabled)
            .write_bool(self.low_byte_next);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_counter = loader.read16()?;
        self.irq_enabled = loader.read_bool()?;
        self.low_byte_next = loader.read_bool()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Sunsoft-3")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn banks_and_mirroring() {
        let mut mapper = mapper(context(67, 256, 256));
        mapper.cpu_write(0xF800, 3);
        mapper.cpu_write(0xA800, 0x21);
        mapper.cpu_write(0xE800, 2);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1400), 0x43);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
    }

    #[test]
    fn counter_underflow_stops_itself() {
        let mut mapper = mapper(context(67, 256, 256));
        mapper.cpu_write(0xC800, 0x00);
        mapper.cpu_write(0xC800, 0x01);
        mapper.cpu_write(0xD800, 0x10);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        mapper.cpu_write(0xD800, 0x00);
        for _ in 0..4 {
            mapper.clock_cpu();
        }
        assert!(!mapper.irq_pending());
    }
}
