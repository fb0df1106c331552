//! Sunsoft-2 in its two board wirings.
//!
//! ```text
//! 89: D~[CPPP MCCC]                 93: D~[.PPP ...E]
//!        |||| ++++- CHR 8 KiB              |||     +- CHR RAM enable
//!        |||| +---- single screen          +++------- PRG 16 KiB at $8000
//!        |+++------ PRG 16 KiB at $8000
//!        +--------- CHR 8 KiB bit 3
//! ```

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper89 {
    chr_rom: bool,
}

impl Mapper89 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            chr_rom: ctx.id == 89,
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 4 & 0x07));
        if board.chr_rom {
            hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x07 | data >> 4 & 0x08));
            hw.set_mirroring_single(data & 0x08 != 0);
        } else {
            let enabled = data & 0x01 != 0;
            hw.set_chr_access(enabled, enabled);
        }
    }
}

impl Board for Mapper89 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.chr_rom { "Sunsoft-2 (89)" } else { "Sunsoft-2 (93)" })
    }
}
