//! Single-latch 32 KiB PRG boards without bus conflicts.
//!
//! | Id  | Board                 | PRG 32 KiB  | CHR 8 KiB | Mirroring            |
//! |-----|-----------------------|-------------|-----------|----------------------|
//! | 107 | Magic Dragon          | `data >> 1` | `data`    | fixed                |
//! | 177 | Hengge Dianzi         | bits 0-4    | RAM       | bit 5 (0 vertical)   |
//! | 39  | Subor Study & Game 32-in-1 | `data` | RAM       | fixed                |
//! | 241 | BxROM-like (no conflicts) | `data`  | RAM       | fixed                |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper107 {
    id: u16,
}

impl Mapper107 {
    pub fn new(ctx: &mut Context) -> Self {
        Self { id: ctx.id }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        match board.id {
            107 => {
                hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 1));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data));
            }
            177 => {
                hw.swap_prg(SIZE_32K, 0x8000, u32::from(data & 0x1F));
                hw.set_mirroring_vh(data >> 5);
            }
            _ => hw.swap_prg(SIZE_32K, 0x8000, u32::from(data)),
        }
    }
}

impl Board for Mapper107 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.id {
            39 => "Study & Game 32-in-1",
            107 => "Magic Dragon",
            177 => "Hengge Dianzi",
            _ => "BxROM (no conflicts)",
        })
    }
}
