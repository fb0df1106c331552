//! Jaleco JF-17 (72) and JF-19 (92).
//!
//! A write with bit 7 set latches a 16 KiB PRG bank from bits 0-3; bit 6
//! latches an 8 KiB CHR bank. JF-17 switches `$8000` and fixes the last
//! bank at `$C000`; JF-19 fixes the first bank at `$8000` and switches
//! `$C000`.
//!
//! Bus conflicts are applied for NES 2.0 submapper 2 only.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper72 {
    switch_high: bool,
    bus_conflicts: bool,
}

impl Mapper72 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            switch_high: ctx.id == 92,
            bus_conflicts: ctx.submapper == 2,
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let data = if board.bus_conflicts { hw.bus_conflict(addr, data) } else { data };
        let bank = u32::from(data & 0x0F);
        if data & 0x80 != 0 {
            let window = if board.switch_high { 0xC000 } else { 0x8000 };
            hw.swap_prg(SIZE_16K, window, bank);
        }
        if data & 0x40 != 0 {
            hw.swap_chr(SIZE_8K, 0x0000, bank);
        }
    }
}

impl Board for Mapper72 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard && self.switch_high {
            hw.swap_prgs(SIZE_16K, 0x8000, &[0, 0]);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.switch_high { "Jaleco JF-19" } else { "Jaleco JF-17" })
    }
}
