//! AVE NINA-03/06 (79, 146) and Sachen/Hacker multicarts (113).
//!
//! The latch answers where `(addr & $E100) == $4100`, i.e. `$4100-$41FF`,
//! `$4300-$43FF`, ... up to `$5FFF`.
//!
//! | Mapper   | PRG 32 KiB            | CHR 8 KiB                    | Mirroring          |
//! |----------|-----------------------|------------------------------|--------------------|
//! | 79, 146  | bit 3                 | bits 0-2                     | fixed              |
//! | 113      | bits 3-5              | bits 0-2, bit 6 as bit 3     | bit 7 (1 vertical) |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper79 {
    multicart: bool,
}

impl Mapper79 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            multicart: ctx.id == 113,
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        if board.multicart {
            hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 3 & 0x07));
            hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x07 | data >> 3 & 0x08));
            hw.set_mirroring_hv(data >> 7);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 3 & 0x01));
            hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x07));
        }
    }
}

impl Board for Mapper79 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        bus.map_poke_masked(
            cpu_mem::EXPANSION_START,
            cpu_mem::EXPANSION_END,
            0xE100,
            0x4100,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.multicart { "Sachen/Hacker multicart" } else { "NINA-03/06" })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn latch_only_on_matching_addresses() {
        let mut mapper = mapper(context(79, 64, 64));
        mapper.cpu_write(0x4000 | 0x0200, 0x0D);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        mapper.cpu_write(0x4100, 0x0D);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 40);
        mapper.cpu_write(0x5F00 | 0x0100, 0x00);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
    }

    #[test]
    fn mapper_113_bits() {
        let mut mapper = mapper(context(113, 256, 128));
        mapper.cpu_write(0x4100, 0x80 | 0x40 | 0x18 | 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 12);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 80);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }
}
