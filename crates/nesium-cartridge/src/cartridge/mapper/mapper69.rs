//! Sunsoft FME-7 / 5A / 5B (69).
//!
//! `$8000-$9FFF` selects a command, `$A000-$BFFF` writes its parameter.
//!
//! | Command | Parameter                                                   |
//! |---------|-------------------------------------------------------------|
//! | `0-7`   | CHR 1 KiB banks                                             |
//! | `8`     | `$6000`: bits 0-5 bank, bit 6 RAM (else ROM), bit 7 RAM enable |
//! | `9-B`   | PRG 8 KiB at `$8000`, `$A000`, `$C000`                      |
//! | `C`     | Mirroring (vertical, horizontal, lower, upper)              |
//! | `D`     | IRQ control: bit 0 IRQ enable, bit 7 counter enable; acks   |
//! | `E/F`   | Counter low/high                                            |
//!
//! The 5B sound registers at `$C000-$FFFF` are not emulated.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_8K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper69 {
    command: u8,
    wrk: u8,
    irq_control: u8,
    irq_counter: u16,
}

impl Mapper69 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_wrk(&self, hw: &mut Hardware) {
        let bank = u32::from(self.wrk & 0x3F);
        if self.wrk & 0x40 == 0 {
            hw.swap_wrk_prg(bank);
            hw.set_wrk_access(true, false);
        } else {
            let enabled = self.wrk & 0x80 != 0;
            hw.swap_wrk(bank);
            hw.set_wrk_access(enabled, enabled);
        }
    }

    fn poke_command(board: &mut Self, _hw: &mut Hardware, _addr: u16, data: u8) {
        board.command = data & 0x0F;
    }

    fn poke_parameter(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        match board.command {
            cmd @ 0x0..=0x7 => hw.swap_chr(SIZE_1K, u16::from(cmd) * SIZE_1K as u16, u32::from(data)),
            0x8 => {
                board.wrk = data;
                board.update_wrk(hw);
            }
            cmd @ 0x9..=0xB => {
                let addr = 0x8000 + u16::from(cmd - 0x9) * SIZE_8K as u16;
                hw.swap_prg(SIZE_8K, addr, u32::from(data & 0x3F));
            }
            0xC => hw.set_mirroring_vh01(data),
            0xD => {
                board.irq_control = data & 0x81;
                hw.irq = false;
            }
            0xE => board.irq_counter = (board.irq_counter & 0xFF00) | u16::from(data),
            _ => board.irq_counter = (board.irq_counter & 0x00FF) | u16::from(data) << 8,
        }
    }
}

impl Board for Mapper69 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update_wrk(hw);
        bus.map(
            cpu_mem::PRG_RAM_START,
            cpu_mem::PRG_RAM_END,
            Peek::Wrk,
            Poke::Wrk,
        );
        bus.map_poke(0x8000, 0x9FFF, Poke::Board(Self::poke_command));
        bus.map_poke(0xA000, 0xBFFF, Poke::Board(Self::poke_parameter));
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if self.irq_control & 0x80 == 0 {
            return;
        }
        self.irq_counter = self.irq_counter.wrapping_sub(1);
        if self.irq_counter == 0xFFFF && self.irq_control & 0x01 != 0 {
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.command)
            .write8(self.wrk)
            .write8(self.irq_control)
            .write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.command = loader.read8()? & 0x0F;
        self.wrk = loader.read8()?;
        self.irq_control = loader.read8()?;
        self.irq_counter = loader.read16()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Sunsoft FME-7")
    }
}
