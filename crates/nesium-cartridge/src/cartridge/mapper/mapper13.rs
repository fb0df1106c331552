//! Mapper 13 (CPROM).
//!
//! 16 KiB of CHR RAM: `$0000-$0FFF` is fixed to the first 4 KiB, the
//! upper pattern table selects any of the four pages with bits 0-1 of a
//! write to `$8000-$FFFF`.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_4K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Default)]
pub struct Mapper13;

impl Mapper13 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.chr_ram = ctx.chr_ram.max(SIZE_16K);
        Self
    }

    fn poke_chr(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_chr(SIZE_4K, 0x1000, u32::from(data & 0x03));
    }
}

impl Board for Mapper13 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_chrs(SIZE_4K, 0x0000, &[0, 0]);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_chr),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("CPROM")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn upper_table_pages_through_chr_ram() {
        let mut mapper = mapper(context(13, 32, 0));
        mapper.cpu_write(0x8000, 2);
        mapper.ppu_write(0x1000, 0xAB);
        mapper.cpu_write(0x8000, 0);
        assert_eq!(mapper.ppu_read(0x1000), 0x00);
        mapper.ppu_write(0x0000, 0xCD);
        assert_eq!(mapper.ppu_read(0x1000), 0xCD);
        mapper.cpu_write(0x8000, 2);
        assert_eq!(mapper.ppu_read(0x1000), 0xAB);
    }
}
