//! Bandai 74161/32 boards (70, 152).
//!
//! `$8000-$FFFF`: bits 4-6 select the 16 KiB PRG bank at `$8000` (the
//! upper window stays on the last bank), bits 0-3 an 8 KiB CHR bank.
//! Mapper 152 adds single-screen select on bit 7.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper70 {
    one_screen: bool,
}

impl Mapper70 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            one_screen: ctx.id == 152,
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 4 & 0x07));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x0F));
        if board.one_screen {
            hw.set_mirroring_single(data & 0x80 != 0);
        }
    }
}

impl Board for Mapper70 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Bandai 74161")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn latch_and_single_screen() {
        let mut mapper = mapper(context(152, 128, 128));
        mapper.cpu_write(0x8000, 0xA5);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 40);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenUpper);
    }
}
