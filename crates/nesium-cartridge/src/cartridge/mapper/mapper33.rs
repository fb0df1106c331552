//! Taito TC0190 (33) and TC0690 (48).
//!
//! | Address  | Register                                                  |
//! |----------|-----------------------------------------------------------|
//! | `$8000`  | PRG `$8000`; on TC0190 bit 6 is mirroring (1 horizontal)  |
//! | `$8001`  | PRG `$A000`                                               |
//! | `$8002/3`| CHR 2 KiB at `$0000`, `$0800`                             |
//! | `$A000-3`| CHR 1 KiB at `$1000-$1C00`                                |
//! | `$C000-3`| TC0690: IRQ latch, reload, enable, disable                |
//! | `$E000`  | TC0690: bit 6 mirroring                                   |
//!
//! The TC0690 scanline counter behaves like the MMC3 one, but the latch
//! is written inverted.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_2K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::{
        a12_watcher::{A12StateChange, A12Watcher},
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper33 {
    tc0690: bool,
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    a12: A12Watcher,
}

impl Mapper33 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            tc0690: ctx.id == 48,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            a12: A12Watcher::new(),
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE003 {
            0x8000 => {
                hw.swap_prg(SIZE_8K, 0x8000, u32::from(data & 0x3F));
                if !board.tc0690 {
                    hw.set_mirroring_vh(data >> 6);
                }
            }
            0x8001 => hw.swap_prg(SIZE_8K, 0xA000, u32::from(data & 0x3F)),
            reg @ (0x8002 | 0x8003) => {
                hw.swap_chr(SIZE_2K, (reg - 0x8002) * SIZE_2K as u16, u32::from(data));
            }
            reg @ 0xA000..=0xA003 => {
                hw.swap_chr(SIZE_1K, 0x1000 + (reg & 3) * SIZE_1K as u16, u32::from(data));
            }
            0xC000 if board.tc0690 => board.irq_latch = data ^ 0xFF,
            0xC001 if board.tc0690 => {
                board.irq_counter = 0;
                board.irq_reload = true;
            }
            0xC002 if board.tc0690 => board.irq_enabled = true,
            0xC003 if board.tc0690 => {
                board.irq_enabled = false;
                hw.irq = false;
            }
            0xE000 if board.tc0690 => hw.set_mirroring_vh(data >> 6),
            _ => {}
        }
    }

    fn clock_counter(&mut self, hw: &mut Hardware) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            hw.irq = true;
        }
    }
}

impl Board for Mapper33 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.irq_latch = 0;
            self.irq_counter = 0;
            self.irq_reload = false;
            self.irq_enabled = false;
        }
        self.a12.reset();
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        if !self.tc0690 || addr >= ppu_mem::NAMETABLE_START {
            return;
        }
        if self.a12.update(addr, hw.cycles()) == A12StateChange::Rise {
            self.clock_counter(hw);
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.irq_latch)
            .write8(self.irq_counter)
            .write8(u8::from(self.irq_reload) | u8::from(self.irq_enabled) << 1);
        self.a12.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_latch = loader.read8()?;
        self.irq_counter = loader.read8()?;
        let flags = loader.read8()?;
        self.irq_reload = flags & 1 != 0;
        self.irq_enabled = flags & 2 != 0;
        self.a12.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.tc0690 { "Taito TC0690" } else { "Taito TC0190" })
    }
}
