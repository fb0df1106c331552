//! Caltron 6-in-1 (41).
//!
//! The outer register is written by address alone at `$6000-$67FF`:
//!
//! ```text
//! A~[0110 0... ..mc pPPP]
//!                ||   +++- 32 KiB PRG bank
//!                ||+------ inner CHR register enable
//!                ++------- m: mirroring (1 horizontal), c+p: CHR outer bits
//! ```
//!
//! The inner register at `$8000-$FFFF` sets the low two CHR bits, but only
//! while bit 2 of the outer register is set. It suffers bus conflicts.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper41 {
    outer: u16,
    inner: u8,
}

impl Mapper41 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    #[inline]
    fn inner_enabled(&self) -> bool {
        self.outer & 0x04 != 0
    }

    fn update(&self, hw: &mut Hardware) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(self.outer & 0x07));
        let chr = (self.outer >> 1 & 0x0C) as u8 | (self.inner & 0x03);
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(chr));
        hw.set_mirroring_vh((self.outer >> 5) as u8);
    }

    fn poke_outer(board: &mut Self, hw: &mut Hardware, addr: u16, _data: u8) {
        board.outer = addr & 0x3F;
        board.update(hw);
    }

    fn poke_inner(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if board.inner_enabled() {
            board.inner = hw.bus_conflict(addr, data) & 0x03;
            board.update(hw);
        }
    }
}

impl Board for Mapper41 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        *self = Self::default();
        self.update(hw);
        bus.map_poke(0x6000, 0x67FF, Poke::Board(Self::poke_outer));
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_inner),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.outer as u8).write8(self.inner);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.outer = u16::from(loader.read8()? & 0x3F);
        self.inner = loader.read8()? & 0x03;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Caltron 6-in-1")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn inner_register_needs_outer_enable() {
        let mut mapper = mapper(context(41, 256, 128));
        mapper.cpu_write(0x6000 | 0x20 | 0x18 | 0x03, 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 12);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 96);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);

        mapper.cpu_write(0x8000, 0xFF);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 96);

        mapper.cpu_write(0x6000 | 0x18 | 0x04 | 0x03, 0);
        mapper.cpu_write(0xA000, 0xFF);
        // ROM at $A000 drives $1D; the conflict leaves inner = 1.
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 104);
    }
}
