//! Mapper 61 (20-in-1 multicarts).
//!
//! ```text
//! A~[1... .... M.Os PPPP]   D~[.... CCCC]
//!              | || ++++- 32 KiB PRG bank, or 16 KiB bank PPPPs
//!              | |+------ 1: 16 KiB mode
//!              +-+------- M: mirroring (1 horizontal)
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
pub struct Mapper61 {
    addr: u8,
    chr: u8,
}

impl Mapper61 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let bank = u32::from(self.addr & 0x0F);
        if self.addr & 0x10 != 0 {
            let half = bank << 1 | u32::from(self.addr >> 5 & 1);
            hw.swap_prgs(SIZE_16K, 0x8000, &[half, half]);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, bank);
        }
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(self.chr & 0x0F));
        hw.set_mirroring_vh(self.addr >> 7);
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.addr = addr as u8;
        board.chr = data;
        board.update(hw);
    }
}

impl Board for Mapper61 {
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
        saver.write8(self.addr).write8(self.chr);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.addr = loader.read8()?;
        self.chr = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("20-in-1")
    }
}
