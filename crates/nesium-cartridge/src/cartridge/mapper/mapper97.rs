//! Irem TAM-S1 (97, Kaiketsu Yanchamaru): the last 16 KiB bank is fixed at
//! `$8000` and the switchable one sits at `$C000`.
//!
//! ```text
//! D~[M..P PPPP]
//!    |  +-++++- 16 KiB PRG at $C000
//!    +--------- 0 horizontal, 1 vertical
//! ```

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper97;

impl Mapper97 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self
    }

    fn poke_latch(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0xC000, u32::from(data & 0x1F));
        hw.set_mirroring_hv(data >> 7);
    }
}

impl Board for Mapper97 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prgs(SIZE_16K, 0x8000, &[LAST, 0]);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Irem TAM-S1")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn fixed_bank_at_8000() {
        let mut mapper = mapper(context(97, 256, 8));
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 30);
        mapper.cpu_write(0x8000, 0x83);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 30);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }
}
