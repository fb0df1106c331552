//! NTDEC TC-112 (193).
//!
//! | Address | Register                                             |
//! |---------|------------------------------------------------------|
//! | `$6000` | 4 KiB CHR at `$0000`, starting at 2 KiB bank `v >> 1` |
//! | `$6001` | 2 KiB CHR at `$1000` (`v >> 1`)                      |
//! | `$6002` | 2 KiB CHR at `$1800` (`v >> 1`)                      |
//! | `$6003` | 8 KiB PRG at `$8000`                                 |
//! | `$6004` | Bit 0 horizontal mirroring                           |
//!
//! `$A000-$FFFF` shows the last three 8 KiB banks.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_2K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Default)]
pub struct Mapper193;

impl Mapper193 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self
    }

    fn poke_register(_board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let bank = u32::from(data >> 1);
        match addr & 0x0007 {
            0 => hw.swap_chrs(SIZE_2K, 0x0000, &[bank, bank + 1]),
            1 => hw.swap_chr(SIZE_2K, 0x1000, bank),
            2 => hw.swap_chr(SIZE_2K, 0x1800, bank),
            3 => hw.swap_prg(SIZE_8K, 0x8000, u32::from(data)),
            4 => hw.set_mirroring_vh(data),
            _ => {}
        }
    }
}

impl Board for Mapper193 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prgs(SIZE_8K, 0x8000, &[0, LAST - 2, LAST - 1, LAST]);
        }
        bus.map_poke(
            cpu_mem::PRG_RAM_START,
            cpu_mem::PRG_RAM_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("NTDEC TC-112")
    }
}
