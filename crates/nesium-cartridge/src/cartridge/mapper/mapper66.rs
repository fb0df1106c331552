//! GxROM (66) and Jaleco JF-11/JF-14 (140).
//!
//! Both boards latch a single byte: bits 4-5 select a 32 KiB PRG bank and
//! bits 0-3 an 8 KiB CHR bank. GxROM decodes `$8000-$FFFF`, the Jaleco
//! boards `$6000-$7FFF` and therefore carry no work RAM.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper66 {
    jaleco: bool,
}

impl Mapper66 {
    pub fn new(ctx: &mut Context) -> Self {
        let jaleco = ctx.id == 140;
        if jaleco {
            ctx.drop_auto_wrk();
        }
        Self { jaleco }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        let (prg, chr) = if board.jaleco {
            (data >> 4 & 0x03, data & 0x0F)
        } else {
            (data >> 4 & 0x03, data & 0x03)
        };
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(prg));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(chr));
    }
}

impl Board for Mapper66 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        if self.jaleco {
            bus.map_poke(
                cpu_mem::PRG_RAM_START,
                cpu_mem::PRG_RAM_END,
                Poke::Board(Self::poke_latch),
            );
        } else {
            bus.map_poke(
                cpu_mem::PRG_ROM_START,
                cpu_mem::CPU_ADDR_END,
                Poke::Board(Self::poke_latch),
            );
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.jaleco { "Jaleco JF-11/14" } else { "GxROM" })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn gxrom_latch() {
        let mut mapper = mapper(context(66, 128, 32));
        mapper.cpu_write(0x8000, 0x21);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 8);
    }

    #[test]
    fn jaleco_latch_lives_at_6000() {
        let mut mapper = mapper(context(140, 128, 128));
        assert!(mapper.prg_ram().is_none());
        mapper.cpu_write(0x8000, 0x1F);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        mapper.cpu_write(0x6000, 0x1F);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 120);
    }
}
