//! Camerica BF9096 (232, Quattro multicarts).
//!
//! `$8000-$BFFF` selects a 64 KiB block with bits 3-4, `$C000-$FFFF` a
//! 16 KiB bank inside it. The last bank of the block stays at `$C000`.
//! Submapper 1 (Aladdin Deck Enhancer) has the two block bits swapped.

use std::borrow::Cow;

use crate::{
    banks::SIZE_16K,
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper232 {
    aladdin: bool,
    block: u8,
    bank: u8,
}

impl Mapper232 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            aladdin: ctx.submapper == 1,
            block: 0,
            bank: 0,
        }
    }

    fn update(&self, hw: &mut Hardware) {
        let base = u32::from(self.block) << 2;
        hw.swap_prgs(SIZE_16K, 0x8000, &[base | u32::from(self.bank), base | 3]);
    }

    fn poke_block(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.block = if board.aladdin {
            (data >> 4 & 0x01) | (data >> 2 & 0x02)
        } else {
            data >> 3 & 0x03
        };
        board.update(hw);
    }

    fn poke_bank(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.bank = data & 0x03;
        board.update(hw);
    }
}

impl Board for Mapper232 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.block = 0;
            self.bank = 0;
        }
        self.update(hw);
        bus.map_poke(cpu_mem::PRG_ROM_START, 0xBFFF, Poke::Board(Self::poke_block));
        bus.map_poke(0xC000, cpu_mem::CPU_ADDR_END, Poke::Board(Self::poke_bank));
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.block).write8(self.bank);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.block = loader.read8()? & 0x03;
        self.bank = loader.read8()? & 0x03;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Camerica BF9096")
    }
}
