//! Sealie Computing RET-CUFROM (29).
//!
//! One latch at `$8000-$FFFF`: `...pppcc`, a 16 KiB PRG bank for `$8000`
//! and one of four 8 KiB CHR RAM pages. `$C000` holds the last bank.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Default)]
pub struct Mapper29;

impl Mapper29 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.chr_ram = ctx.chr_ram.max(SIZE_32K);
        Self
    }

    fn poke_latch(_board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 2 & 0x07));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x03));
    }
}

impl Board for Mapper29 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("RET-CUFROM")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn latch_selects_prg_and_chr_ram_page() {
        let mut mapper = mapper(context(29, 128, 0));
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);

        mapper.ppu_write(0x0010, 0x3C);
        mapper.cpu_write(0x8000, 0x0E);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 7);
        assert_eq!(mapper.ppu_read(0x0010), 0);

        mapper.cpu_write(0xFFFF, 0x0C);
        assert_eq!(mapper.ppu_read(0x0010), 0x3C);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
    }
}
