//! Color Dreams (11) and the AGCI 50282 clone (144).
//!
//! One latch at `$8000-$FFFF`: bits 0-1 select 32 KiB PRG, bits 4-7 an
//! 8 KiB CHR bank. The 144 board ignores `$8000` and only the ROM's bit 0
//! takes part in the bus conflict.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper11 {
    agci: bool,
}

impl Mapper11 {
    pub fn new(ctx: &mut Context) -> Self {
        Self { agci: ctx.id == 144 }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let data = if board.agci {
            data & (hw.peek_prg(addr) | 0x01)
        } else {
            data
        };
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(data & 0x03));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data >> 4));
    }
}

impl Board for Mapper11 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        let first = if self.agci { 0x8001 } else { cpu_mem::PRG_ROM_START };
        bus.map_poke(first, cpu_mem::CPU_ADDR_END, Poke::Board(Self::poke_latch));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.agci { "AGCI 50282" } else { "Color Dreams" })
    }
}
