//! Tengen RAMBO-1 (64).
//!
//! An MMC3 relative with sixteen bank registers, a full 1 KiB CHR mode and
//! an IRQ counter that can also run from CPU cycles.
//!
//! | Address        | Register                                              |
//! |----------------|-------------------------------------------------------|
//! | `$8000` even   | Bits 0-3 target, 5 1 KiB CHR mode, 6 PRG mode, 7 A12 inversion |
//! | `$8001` odd    | Bank data                                             |
//! | `$A000` even   | Mirroring (0 vertical)                                |
//! | `$C000` even   | IRQ latch                                             |
//! | `$C001` odd    | Bit 0 counter source (1 CPU/4), forces reload         |
//! | `$E000` even   | IRQ disable + acknowledge                             |
//! | `$E001` odd    | IRQ enable                                            |

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::{
        a12_watcher::{A12StateChange, A12Watcher},
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    state::{Loader, Saver},
};

const CPU_PRESCALER: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper64 {
    bank_select: u8,
    banks: [u8; 16],
    irq_latch: u8,
    irq_counter: u16,
    irq_reload: bool,
    irq_enabled: bool,
    cpu_mode: bool,
    prescaler: u8,
    a12: A12Watcher,
}

impl Default for Mapper64 {
    fn default() -> Self {
        Self {
            bank_select: 0,
            banks: [0, 2, 4, 5, 6, 7, 0, 1, 1, 3, 0, 0, 0, 0, 0, 2],
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            cpu_mode: false,
            prescaler: 0,
            a12: A12Watcher::new(),
        }
    }
}

impl Mapper64 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_prg(&self, hw: &mut Hardware) {
        let r = |i: usize| u32::from(self.banks[i]);
        if self.bank_select & 0x40 == 0 {
            hw.swap_prgs(SIZE_8K, 0x8000, &[r(6), r(7), r(15), LAST]);
        } else {
            hw.swap_prgs(SIZE_8K, 0x8000, &[r(15), r(6), r(7), LAST]);
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let r = |i: usize| u32::from(self.banks[i]);
        let low = if self.bank_select & 0x20 != 0 {
            [r(0), r(8), r(1), r(9)]
        } else {
            [r(0) & !1, r(0) | 1, r(1) & !1, r(1) | 1]
        };
        let high = [r(2), r(3), r(4), r(5)];
        let (first, second) = if self.bank_select & 0x80 != 0 {
            (high, low)
        } else {
            (low, high)
        };
        hw.swap_chrs(SIZE_1K, 0x0000, &first);
        hw.swap_chrs(SIZE_1K, 0x1000, &second);
    }

    fn clock_counter(&mut self, hw: &mut Hardware) {
        let latch = u16::from(self.irq_latch);
        if self.irq_reload {
            self.irq_counter = if latch <= 1 { latch + 1 } else { latch + 2 };
            self.irq_reload = false;
        } else if self.irq_counter == 0 {
            self.irq_counter = latch + 1;
        }
        self.irq_counter -= 1;
        if self.irq_counter == 0 && self.irq_enabled {
            hw.irq = true;
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE001 {
            0x8000 => {
                board.bank_select = data;
                board.update_prg(hw);
                board.update_chr(hw);
            }
            0x8001 => {
                let index = usize::from(board.bank_select & 0x0F);
                board.banks[index] = data;
                board.update_prg(hw);
                board.update_chr(hw);
            }
            0xA000 => hw.set_mirroring_vh(data),
            0xC000 => board.irq_latch = data,
            0xC001 => {
                board.cpu_mode = data & 1 != 0;
                board.prescaler = 0;
                board.irq_reload = true;
            }
            0xE000 => {
                board.irq_enabled = false;
                hw.irq = false;
            }
            0xE001 => board.irq_enabled = true,
            _ => {}
        }
    }
}

impl Board for Mapper64 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.a12.reset();
        self.update_prg(hw);
        self.update_chr(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.cpu_mode {
            return;
        }
        self.prescaler += 1;
        if self.prescaler == CPU_PRESCALER {
            self.prescaler = 0;
            self.clock_counter(hw);
        }
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        if self.cpu_mode || addr >= ppu_mem::NAMETABLE_START {
            return;
        }
        if self.a12.update(addr, hw.cycles()) == A12StateChange::Rise {
            self.clock_counter(hw);
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.bank_select)
            .write(&self.banks)
            .write8(self.irq_latch)
            .write16(self.irq_counter)
            .write8(
                u8::from(self.irq_reload)
                    | u8::from(self.irq_enabled) << 1
                    | u8::from(self.cpu_mode) << 2,
            )
            .write8(self.prescaler);
        self.a12.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.bank_select = loader.read8()?;
        loader.read(&mut self.banks)?;
        self.irq_latch = loader.read8()?;
        self.irq_counter = loader.read16()?;
        if self.irq_counter > 0x101 {
            return Err(Error::CorruptSaveState("rambo-1 counter out of range"));
        }
        let flags = loader.read8()?;
        self.irq_reload = flags & 1 != 0;
        self.irq_enabled = flags & 2 != 0;
        self.cpu_mode = flags & 4 != 0;
        self.prescaler = loader.read8()? % CPU_PRESCALER;
        self.a12.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("RAMBO-1")
    }
}
