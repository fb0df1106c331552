//! Whirlwind Manu LH32 (125), the Monty on the Run FDS conversion.
//!
//! A write anywhere in `$6000-$7FFF` selects the 8 KiB PRG bank shown there.
//! `$8000`, `$A000` and `$E000` hold banks 12, 13 and 15; `$C000-$DFFF` is
//! 8 KiB of work RAM.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_8K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Default)]
pub struct Mapper125;

impl Mapper125 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.wrk_size = ctx.wrk_size.max(SIZE_8K);
        Self
    }

    fn poke_bank(_board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_wrk_prg(u32::from(data & 0x0F));
    }

    fn poke_ram(_board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        hw.poke_prg(addr, data);
    }
}

impl Board for Mapper125 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_wrk_prg(0);
            hw.swap_prgs(SIZE_8K, 0x8000, &[12, 13]);
            hw.swap_prg(SIZE_8K, 0xE000, LAST);
        }
        hw.swap_prg_wrk(SIZE_8K, 0xC000, 0);
        hw.set_wrk_access(true, false);
        bus.map(
            cpu_mem::PRG_RAM_START,
            cpu_mem::PRG_RAM_END,
            Peek::Wrk,
            Poke::Board(Self::poke_bank),
        );
        bus.map_poke(0xC000, 0xDFFF, Poke::Board(Self::poke_ram));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("LH32")
    }
}
