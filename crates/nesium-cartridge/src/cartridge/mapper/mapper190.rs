//! Zemina Magic Kid GooGoo (190).
//!
//! | Address         | Register                                   |
//! |-----------------|--------------------------------------------|
//! | `$8000-$9FFF`   | 16 KiB PRG at `$8000`, banks 0-7           |
//! | `$A000-$BFFF`   | 2 KiB CHR, window from address bits 0-1    |
//! | `$C000-$DFFF`   | 16 KiB PRG at `$8000`, banks 8-15          |
//!
//! `$C000-$FFFF` always shows the first 16 KiB bank.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_2K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
};

#[derive(Debug, Clone, Default)]
pub struct Mapper190;

impl Mapper190 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self
    }

    fn poke_register(_board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE000 {
            0x8000 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x07)),
            0xC000 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x07 | 0x08)),
            0xA000 => {
                let window = (addr & 0x03) * SIZE_2K as u16;
                hw.swap_chr(SIZE_2K, window, u32::from(data));
            }
            _ => {}
        }
    }
}

impl Board for Mapper190 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prgs(SIZE_16K, 0x8000, &[0, 0]);
            hw.set_mirroring_vh(0);
        }
        bus.map_poke(0x8000, 0xDFFF, Poke::Board(Self::poke_register));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Zemina")
    }
}
