//! Mapper 58 (GK-192 multicarts). Writes latch the address:
//!
//! ```text
//! A~[1... .... mOCC CPPP]
//!              |||| |+++- PRG bank (16 KiB, or 32 KiB using bits 1-2)
//!              ||++-+---- 8 KiB CHR bank
//!              |+-------- 1: 16 KiB PRG mode, 0: 32 KiB
//!              +--------- mirroring (0 vertical, 1 horizontal)
//! ```

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper58 {
    latch: u8,
}

impl Mapper58 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let prg = u32::from(self.latch & 0x07);
        if self.latch & 0x40 != 0 {
            hw.swap_prgs(SIZE_16K, 0x8000, &[prg, prg]);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, prg >> 1);
        }
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(self.latch >> 3 & 0x07));
        hw.set_mirroring_vh(self.latch >> 7);
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, _data: u8) {
        board.latch = addr as u8;
        board.update(hw);
    }
}

impl Board for Mapper58 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        *self = Self::default();
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.latch);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.latch = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("GK-192")
    }
}
