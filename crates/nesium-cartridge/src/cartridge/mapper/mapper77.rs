//! Irem 74HC161/32 with CHR ROM and RAM (77, Napoleon Senki).
//!
//! One latch: bits 0-3 select 32 KiB of PRG, bits 4-7 a 2 KiB CHR ROM bank
//! at `$0000`. The rest of the pattern space is fixed CHR RAM.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_2K, SIZE_8K, SIZE_32K, SourceId},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper77;

impl Mapper77 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.chr_ram = ctx.chr_ram.max(SIZE_8K);
        Self
    }

    fn poke_latch(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(data & 0x0F));
        hw.swap_chr(SIZE_2K, 0x0000, u32::from(data >> 4));
    }
}

impl Board for Mapper77 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
            for bank in 1..4u16 {
                hw.swap_chr_from(SourceId::ChrRam, SIZE_2K, bank * SIZE_2K as u16, u32::from(bank));
            }
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Irem 74HC161/32 (CHR RAM)")
    }
}
