//! Camerica BF9093/BF9097 (71).
//!
//! `$C000-$FFFF` selects the 16 KiB bank at `$8000`. The Fire Hawk board
//! (submapper 1) also decodes `$8000-$9FFF`, where bit 4 selects the
//! single-screen nametable.

use std::borrow::Cow;

use crate::{
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper71 {
    fire_hawk: bool,
}

impl Mapper71 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            fire_hawk: ctx.submapper == 1,
        }
    }

    fn poke_screen(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.set_mirroring_single(data & 0x10 != 0);
    }
}

impl Board for Mapper71 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        if self.fire_hawk {
            bus.map_poke(0x8000, 0x9FFF, Poke::Board(Self::poke_screen));
        }
        bus.map_poke(0xC000, cpu_mem::CPU_ADDR_END, Poke::Prg16k(0x8000));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Camerica BF909x")
    }
}
