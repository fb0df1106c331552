//! Konami VRC6 (24 = VRC6a, 26 = VRC6b with A0/A1 swapped).
//!
//! | Address         | Register                                              |
//! |-----------------|-------------------------------------------------------|
//! | `$8000-$8003`   | 16 KiB PRG at `$8000`                                 |
//! | `$B003`         | Bits 0-1 CHR layout, 2-3 mirroring, 7 work RAM enable |
//! | `$C000-$C003`   | 8 KiB PRG at `$C000`                                  |
//! | `$D000-$E003`   | CHR registers R0-R7                                   |
//! | `$F000-$F002`   | IRQ latch, control, acknowledge                       |
//!
//! The pulse and sawtooth channels at `$9000-$B002` are not emulated.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_2K, SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware, VrcIrq},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper24 {
    swapped: bool,
    banking: u8,
    chr: [u8; 8],
    irq: VrcIrq,
}

impl Mapper24 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            swapped: ctx.id == 26,
            banking: 0,
            chr: [0; 8],
            irq: VrcIrq::default(),
        }
    }

    fn decode(&self, addr: u16) -> u16 {
        let low = if self.swapped {
            (addr & 1) << 1 | (addr >> 1 & 1)
        } else {
            addr & 3
        };
        (addr & 0xF000) | low
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let r = self.chr.map(u32::from);
        match self.banking & 0x03 {
            0 => hw.swap_chrs(SIZE_1K, 0x0000, &r),
            1 => hw.swap_chrs(SIZE_2K, 0x0000, &[r[0], r[1], r[2], r[3]]),
            _ => {
                hw.swap_chrs(SIZE_1K, 0x0000, &[r[0], r[1], r[2], r[3]]);
                hw.swap_chrs(SIZE_2K, 0x1000, &[r[4], r[5]]);
            }
        }
    }

    fn update_banking(&self, hw: &mut Hardware) {
        self.update_chr(hw);
        hw.set_mirroring_vh01(self.banking >> 2);
        let wrk = self.banking & 0x80 != 0;
        hw.set_wrk_access(wrk, wrk);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match board.decode(addr) {
            0x8000..=0x8003 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F)),
            0xB003 => {
                board.banking = data;
                board.update_banking(hw);
            }
            0xC000..=0xC003 => hw.swap_prg(SIZE_8K, 0xC000, u32::from(data & 0x1F)),
            reg @ (0xD000..=0xD003 | 0xE000..=0xE003) => {
                let index = usize::from((reg >> 12) - 0xD) * 4 + usize::from(reg & 3);
                board.chr[index] = data;
                board.update_chr(hw);
            }
            0xF000 => board.irq.write_latch(data),
            0xF001 => board.irq.write_control(hw, data),
            0xF002 => board.irq.acknowledge(hw),
            _ => {}
        }
    }
}

impl Board for Mapper24 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.banking = 0;
            self.chr = [0; 8];
            self.irq.reset();
            hw.swap_prgs(SIZE_8K, 0x8000, &[0, 1, LAST - 1, LAST]);
        }
        self.update_banking(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        self.irq.clock(hw);
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.banking).write(&self.chr);
        self.irq.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.banking = loader.read8()?;
        loader.read(&mut self.chr)?;
        self.irq.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.swapped { "VRC6b" } else { "VRC6a" })
    }
}
