//! Konami VRC3 (73).
//!
//! | Address         | Register                                          |
//! |-----------------|---------------------------------------------------|
//! | `$8000-$BFFF`   | IRQ latch, one nibble per 4 KiB (low to high)     |
//! | `$C000`         | Bit 0 enable on ack, 1 enable, 2 8-bit mode       |
//! | `$D000`         | IRQ acknowledge                                   |
//! | `$F000`         | PRG 16 KiB `$8000`                                |
//!
//! The counter counts up every CPU cycle. In 8-bit mode only the low byte
//! counts and reloads; otherwise all 16 bits do.

use std::borrow::Cow;

use crate::{
    banks::SIZE_16K,
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper73 {
    irq_latch: u16,
    irq_counter: u16,
    irq_control: u8,
}

impl Mapper73 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF000 {
            reg @ 0x8000..=0xB000 => {
                let shift = ((reg >> 12) - 0x8) * 4;
                board.irq_latch =
                    (board.irq_latch & !(0x0F << shift)) | u16::from(data & 0x0F) << shift;
            }
            0xC000 => {
                board.irq_control = data & 0x07;
                if data & 0x02 != 0 {
                    board.irq_counter = board.irq_latch;
                }
                hw.irq = false;
            }
            0xD000 => {
                let enable_on_ack = board.irq_control & 0x01;
                board.irq_control = (board.irq_control & !0x02) | enable_on_ack << 1;
                hw.irq = false;
            }
            0xF000 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F)),
            _ => {}
        }
    }
}

impl Board for Mapper73 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
        hw.irq = false;
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if self.irq_control & 0x02 == 0 {
            return;
        }
        if self.irq_control & 0x04 != 0 {
            let low = self.irq_counter as u8;
            if low == 0xFF {
                self.irq_counter = (self.irq_counter & 0xFF00) | (self.irq_latch & 0x00FF);
                hw.irq = true;
            } else {
                self.irq_counter = (self.irq_counter & 0xFF00) | u16::from(low + 1);
            }
        } else if self.irq_counter == 0xFFFF {
            self.irq_counter = self.irq_latch;
            hw.irq = true;
        } else {
            self.irq_counter += 1;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write16(self.irq_latch)
            .write16(self.irq_counter)
            .write8(self.irq_control);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_latch = loader.read16()?;
        self.irq_counter = loader.read16()?;
        self.irq_control = loader.read8()? & 0x07;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("VRC3")
    }
}
