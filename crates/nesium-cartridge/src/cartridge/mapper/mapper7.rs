//! Mapper 7 (AxROM).
//!
//! `$8000-$FFFF`: bits 0-2 select a 32 KiB PRG bank, bit 4 picks the
//! single-screen nametable. AMROM (submapper 2) has bus conflicts.

use std::borrow::Cow;

use crate::{
    banks::SIZE_32K,
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper7 {
    bus_conflicts: bool,
}

impl Mapper7 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            bus_conflicts: ctx.submapper == 2,
        }
    }

    fn poke_bank(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let data = if board.bus_conflicts {
            hw.bus_conflict(addr, data)
        } else {
            data
        };
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(data & 0x0F));
        hw.set_mirroring_single(data & 0x10 != 0);
    }
}

impl Board for Mapper7 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
            hw.set_mirroring_single(false);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_bank),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("AxROM")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn selects_32k_bank_and_screen() {
        let mut mapper = mapper(context(7, 256, 0));
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 3);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);

        mapper.cpu_write(0x8000, 0x12);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 11);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenUpper);
    }
}
