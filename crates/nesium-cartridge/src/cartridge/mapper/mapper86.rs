//! Latches in the work RAM window, without work RAM behind them.
//!
//! | Mapper | Board       | Range           | Effect                                        |
//! |--------|-------------|-----------------|-----------------------------------------------|
//! | 86     | Jaleco JF-13| `$6000-$6FFF`   | PRG 32 KiB bits 4-5, CHR 8 KiB bits 0-1 and 6 |
//! | 87     | Jaleco J87  | `$6000-$7FFF`   | CHR 8 KiB, bits 0 and 1 swapped               |
//! | 101    | Jaleco JF-10| `$6000-$7FFF`   | CHR 8 KiB, whole byte                         |
//! | 184    | Sunsoft-1   | `$6000-$7FFF`   | CHR 4 KiB low bits 0-2, high bits 4-6         |
//!
//! The `$7000-$7FFF` ADPCM port on JF-13 is ignored.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_4K, SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Jf13,
    J87,
    Jf10,
    Sunsoft1,
}

#[derive(Debug, Clone)]
pub struct Mapper86 {
    variant: Variant,
}

impl Mapper86 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        let variant = match ctx.id {
            86 => Variant::Jf13,
            87 => Variant::J87,
            101 => Variant::Jf10,
            _ => Variant::Sunsoft1,
        };
        Self { variant }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        match board.variant {
            Variant::Jf13 => {
                hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 4 & 0x03));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x03 | data >> 4 & 0x04));
            }
            Variant::J87 => {
                hw.swap_chr(SIZE_8K, 0x0000, u32::from((data & 0x01) << 1 | data >> 1 & 0x01));
            }
            Variant::Jf10 => hw.swap_chr(SIZE_8K, 0x0000, u32::from(data)),
            // The upper window always comes from the second half of CHR.
            Variant::Sunsoft1 => hw.swap_chrs(
                SIZE_4K,
                0x0000,
                &[u32::from(data & 0x07), u32::from(data >> 4 & 0x07 | 0x04)],
            ),
        }
    }
}

impl Board for Mapper86 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        let last = if self.variant == Variant::Jf13 {
            0x6FFF
        } else {
            cpu_mem::PRG_RAM_END
        };
        bus.map_poke(cpu_mem::PRG_RAM_START, last, Poke::Board(Self::poke_latch));
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Jf13 => "Jaleco JF-13",
            Variant::J87 => "Jaleco J87",
            Variant::Jf10 => "Jaleco JF-10",
            Variant::Sunsoft1 => "Sunsoft-1",
        })
    }
}
