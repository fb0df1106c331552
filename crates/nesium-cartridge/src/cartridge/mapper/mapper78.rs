//! Mapper 78: Jaleco JF-16 (Uchuusen: Cosmo Carrier) and Irem 74HC161/32
//! (Holy Diver).
//!
//! ```text
//! D~[CCCC MPPP]
//!    |||| |+++- 16 KiB PRG at $8000
//!    |||| +---- JF-16: single screen (0 lower, 1 upper)
//!    ||||       Irem:  0 horizontal, 1 vertical
//!    ++++------ 8 KiB CHR
//! ```
//!
//! Plain iNES images cannot tell the boards apart; Holy Diver is matched by
//! CRC, a non-zero database attribute or NES 2.0 submapper 3.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, HOLY_DIVER, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper78 {
    irem: bool,
}

impl Mapper78 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            irem: ctx.crc == HOLY_DIVER || ctx.attribute != 0 || ctx.submapper == 3,
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x07));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data >> 4));
        if board.irem {
            hw.set_mirroring_hv(data >> 3);
        } else {
            hw.set_mirroring_single(data & 0x08 != 0);
        }
    }
}

impl Board for Mapper78 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.irem { "Irem 74HC161/32" } else { "Jaleco JF-16" })
    }
}
