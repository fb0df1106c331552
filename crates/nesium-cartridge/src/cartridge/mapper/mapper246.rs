//! Fong Shen Bang G0151-1 (246).
//!
//! | Address         | Register                                   |
//! |-----------------|--------------------------------------------|
//! | `$6000-$6003`   | 8 KiB PRG at `$8000`, `$A000`, `$C000`, `$E000` |
//! | `$6004-$6007`   | 2 KiB CHR at `$0000-$1800`                 |
//! | `$6800-$6FFF`   | 2 KiB battery RAM                          |
//!
//! `$E000` powers on with the last bank.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_2K, SIZE_8K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
};

const RAM_SIZE: usize = 2 * 1024;

#[derive(Debug, Clone, Default)]
pub struct Mapper246;

impl Mapper246 {
    pub fn new(ctx: &mut Context) -> Self {
        if ctx.wrk_auto {
            ctx.wrk_size = RAM_SIZE;
        }
        Self
    }

    fn poke_register(_board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let reg = addr & 0x03;
        if addr & 0x04 == 0 {
            hw.swap_prg(SIZE_8K, 0x8000 + reg * SIZE_8K as u16, u32::from(data & 0x3F));
        } else {
            hw.swap_chr(SIZE_2K, reg * SIZE_2K as u16, u32::from(data));
        }
    }
}

impl Board for Mapper246 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prgs(SIZE_8K, 0x8000, &[0, 0, 0, LAST]);
        }
        bus.map(0x6000, 0x67FF, Peek::OpenBus, Poke::Nop);
        bus.map(0x7000, 0x7FFF, Peek::OpenBus, Poke::Nop);
        bus.map_poke(0x6000, 0x6007, Poke::Board(Self::poke_register));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("G0151-1")
    }
}
