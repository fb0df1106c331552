//! Kaiser KS202 / UNL-KS7032 (142).
//!
//! | Address         | Register                                            |
//! |-----------------|-----------------------------------------------------|
//! | `$8000-$BFFF`   | IRQ reload, one nibble per 4 KiB (low to high)      |
//! | `$C000`         | Bits 0-1: IRQ enable; enabling reloads the counter  |
//! | `$D000`         | IRQ acknowledge                                     |
//! | `$E000`         | Bank select: 1 `$8000`, 2 `$A000`, 3 `$C000`, 4 `$6000` |
//! | `$F000`         | 8 KiB PRG bank for the selected window              |
//!
//! `$E000-$FFFF` holds the last bank. The IRQ counter counts up once per
//! CPU cycle from the reload value and fires on reaching `$FFFF`.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_8K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

/// Select values with no window behind them.
const NO_WINDOW: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper142 {
    select: u8,
    prg: [u8; 4],
    irq_enabled: bool,
    irq_reload: u16,
    irq_counter: u16,
}

impl Mapper142 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let r = self.prg.map(u32::from);
        hw.swap_wrk_prg(r[3]);
        hw.swap_prgs(SIZE_8K, 0x8000, &[r[0], r[1], r[2], LAST]);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF000 {
            reg @ 0x8000..=0xB000 => {
                let shift = ((reg >> 12) - 0x8) * 4;
                board.irq_reload =
                    (board.irq_reload & !(0x0F << shift)) | u16::from(data & 0x0F) << shift;
            }
            0xC000 => {
                hw.irq = false;
                board.irq_enabled = data & 0x03 != 0;
                if board.irq_enabled {
                    board.irq_counter = board.irq_reload;
                }
            }
            0xD000 => hw.irq = false,
            0xE000 => {
                board.select = match data & 0x07 {
                    select @ 1..=4 => select,
                    _ => NO_WINDOW,
                };
            }
            0xF000 if board.select != NO_WINDOW => {
                board.prg[usize::from(board.select - 1)] = data & 0x0F;
                board.update(hw);
            }
            _ => {}
        }
    }
}

impl Board for Mapper142 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update(hw);
        hw.set_wrk_access(true, false);
        bus.map_peek(cpu_mem::PRG_RAM_START, cpu_mem::PRG_RAM_END, Peek::Wrk);
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
        self.irq_counter = self.irq_counter.wrapping_add(1);
        if self.irq_counter == 0xFFFF {
            hw.irq = true;
            self.irq_counter = self.irq_reload;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.select)
            .write(&self.prg)
            .write8(u8::from(self.irq_enabled))
            .write16(self.irq_reload)
            .write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.select = loader.read8()?;
        if self.select > 4 {
            self.select = NO_WINDOW;
        }
        loader.read(&mut self.prg)?;
        self.irq_enabled = loader.read8()? != 0;
        self.irq_reload = loader.read16()?;
        self.irq_counter = loader.read16()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Kaiser KS7032")
    }
}
