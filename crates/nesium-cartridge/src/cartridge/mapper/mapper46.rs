//! Rumble Station 15-in-1 (46).
//!
//! | Address         | Bits        | Meaning                          |
//! |-----------------|-------------|----------------------------------|
//! | `$6000-$7FFF`   | `CCCC PPPP` | Outer CHR / outer 32 KiB PRG     |
//! | `$8000-$FFFF`   | `.ccc ...p` | Inner CHR / inner PRG bit        |
//!
//! The 32 KiB PRG bank is `PPPPp`, the 8 KiB CHR bank `CCCCccc`.

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
pub struct Mapper46 {
    outer: u8,
    inner: u8,
}

impl Mapper46 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let prg = (self.outer & 0x0F) << 1 | (self.inner & 0x01);
        let chr = (self.outer >> 4) << 3 | (self.inner >> 4 & 0x07);
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(prg));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(chr));
    }

    fn poke_outer(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.outer = data;
        board.update(hw);
    }

    fn poke_inner(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.inner = data;
        board.update(hw);
    }
}

impl Board for Mapper46 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        *self = Self::default();
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_RAM_START,
            cpu_mem::PRG_RAM_END,
            Poke::Board(Self::poke_outer),
        );
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_inner),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.outer).write8(self.inner);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.outer = loader.read8()?;
        self.inner = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Rumble Station")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn outer_and_inner_combine() {
        let mut mapper = mapper(context(46, 256, 256));
        mapper.cpu_write(0x6000, 0x21);
        mapper.cpu_write(0x8000, 0x31);
        // PRG 32 KiB bank 3, CHR 8 KiB bank 19.
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 12);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 152);
    }
}
