//! UxROM and its discrete relatives.
//!
//! | Id  | Board        | Switchable window | Value                  |
//! |-----|--------------|-------------------|------------------------|
//! | 2   | UNROM/UOROM  | `$8000-$BFFF`     | `data`                 |
//! | 94  | UN1ROM       | `$8000-$BFFF`     | `(data >> 2) & 7`      |
//! | 180 | UNROM (74HC08) | `$C000-$FFFF`   | `data`, `$8000` fixed 0 |
//!
//! NES 2.0 submapper 2 of id 2 ANDs the written value with the ROM byte
//! (bus conflicts).

use std::borrow::Cow;

use crate::{
    banks::SIZE_16K,
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Uxrom { bus_conflicts: bool },
    Un1rom,
    FixedFirst,
}

#[derive(Debug, Clone)]
pub struct Mapper2 {
    variant: Variant,
}

impl Mapper2 {
    pub fn new(ctx: &mut Context) -> Self {
        let variant = match ctx.id {
            94 => Variant::Un1rom,
            180 => Variant::FixedFirst,
            _ => Variant::Uxrom {
                bus_conflicts: ctx.submapper == 2,
            },
        };
        Self { variant }
    }

    fn poke_un1rom(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 2) & 0x07);
    }
}

impl Board for Mapper2 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        let (first, last) = (cpu_mem::PRG_ROM_START, cpu_mem::CPU_ADDR_END);
        match self.variant {
            Variant::Uxrom { bus_conflicts: true } => bus.map_poke(first, last, Poke::Prg16kBc(0x8000)),
            Variant::Uxrom { .. } => bus.map_poke(first, last, Poke::Prg16k(0x8000)),
            Variant::Un1rom => bus.map_poke(first, last, Poke::Board(Self::poke_un1rom)),
            Variant::FixedFirst => {
                if hard {
                    hw.swap_prgs(SIZE_16K, 0x8000, &[0, 0]);
                }
                bus.map_poke(first, last, Poke::Prg16k(0xC000));
            }
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Uxrom { .. } => "UxROM",
            Variant::Un1rom => "UN1ROM",
            Variant::FixedFirst => "UNROM (74HC08)",
        })
    }
}
