//! Sachen discrete latches.
//!
//! | Id  | Board             | Latch                  | PRG 32 KiB | CHR 8 KiB |
//! |-----|-------------------|------------------------|------------|-----------|
//! | 133 | SA-72008          | `$4100` (A8, A14)      | bit 2      | bits 0-1  |
//! | 145 | SA-72007          | `$4100` (A8, A14)      | fixed      | bit 7     |
//! | 148 | SA-0037           | `$8000-$FFFF`, conflicts | bit 3    | bits 0-2  |
//! | 149 | SA-0036           | `$8000-$FFFF`          | fixed      | bit 7     |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper133 {
    id: u16,
}

impl Mapper133 {
    pub fn new(ctx: &mut Context) -> Self {
        Self { id: ctx.id }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match board.id {
            133 => {
                hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 2 & 0x01));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x03));
            }
            148 => {
                let data = hw.bus_conflict(addr, data);
                hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 3 & 0x01));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x07));
            }
            _ => hw.swap_chr(SIZE_8K, 0x0000, u32::from(data >> 7)),
        }
    }
}

impl Board for Mapper133 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        match self.id {
            133 | 145 => bus.map_poke_masked(
                cpu_mem::EXPANSION_START,
                cpu_mem::EXPANSION_END,
                0x4100,
                0x4100,
                Poke::Board(Self::poke_latch),
            ),
            _ => bus.map_poke(
                cpu_mem::PRG_ROM_START,
                cpu_mem::CPU_ADDR_END,
                Poke::Board(Self::poke_latch),
            ),
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.id {
            133 => "Sachen SA-72008",
            145 => "Sachen SA-72007",
            148 => "Sachen SA-0037",
            _ => "Sachen SA-0036",
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn expansion_latch_needs_a8() {
        let mut mapper = mapper(context(133, 64, 32));
        mapper.cpu_write(0x4200, 0x07);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0);
        mapper.cpu_write(0x4300, 0x07);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 24);
    }

    #[test]
    fn sa0037_has_bus_conflicts() {
        // Power-on maps 32 KiB bank 0, so $E000 reads as 8 KiB bank 3.
        let mut mapper = mapper(context(148, 128, 64));
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 3);
        mapper.cpu_write(0xE000, 0xFF);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 24);
        // ROM at $C000 holds 2, masking off everything else.
        mapper.cpu_write(0xC000, 0x0F);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 16);
        mapper.cpu_write(0x8000, 0xFF);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0);
    }

    #[test]
    fn chr_from_bit_7() {
        let mut sa0036 = mapper(context(149, 32, 16));
        sa0036.cpu_write(0x8000, 0x80);
        assert_eq!(chr_bank(sa0036.as_mut(), 0x0000), 8);
        let mut sa72007 = mapper(context(145, 32, 16));
        sa72007.cpu_write(0x4100, 0x80);
        assert_eq!(chr_bank(sa72007.as_mut(), 0x0000), 8);
    }
}
