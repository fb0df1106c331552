//! Bit Corp. UNL-PCI556 (38): one latch at `$7000-$7FFF`, bits 0-1 select
//! 32 KiB of PRG, bits 2-3 select 8 KiB of CHR.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper38;

impl Mapper38 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self
    }

    fn poke_latch(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(data & 0x03));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data >> 2 & 0x03));
    }
}

impl Board for Mapper38 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        bus.map_poke(0x7000, 0x7FFF, Poke::Board(Self::poke_latch));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("PCI556")
    }
}
