//! Discrete boards that decode outside the plain `$8000` latch.
//!
//! - **240**: `$4020-$5FFF`, `[PPPP CCCC]` selects 32 KiB of PRG and 8 KiB
//!   of CHR.
//! - **244 (C&E Decathlon)**: the written value is ignored. The offset of the
//!   write into `$8065-$80A4` picks a PRG bank, into `$80A5-$80E4` a CHR
//!   bank, both through a fixed scrambling table.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

const PRG_LUT: [[u8; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [0, 2, 1, 3], [3, 1, 2, 0]];

const CHR_LUT: [[u8; 8]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [0, 2, 1, 3, 4, 6, 5, 7],
    [0, 1, 4, 5, 2, 3, 6, 7],
    [0, 4, 1, 5, 2, 6, 3, 7],
    [0, 4, 2, 6, 1, 5, 3, 7],
    [0, 2, 4, 6, 1, 3, 5, 7],
    [7, 6, 5, 4, 3, 2, 1, 0],
    [7, 6, 5, 4, 3, 2, 1, 0],
];

const PRG_PORT: u16 = 0x8065;
const CHR_PORT: u16 = 0x80A5;
const PORT_LEN: u16 = 0x40;

#[derive(Debug, Clone)]
pub struct Mapper240 {
    decathlon: bool,
}

impl Mapper240 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            decathlon: ctx.id == 244,
        }
    }

    fn poke_expansion(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(data >> 4));
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x0F));
    }

    fn poke_prg(_: &mut Self, hw: &mut Hardware, addr: u16, _data: u8) {
        let value = usize::from(addr - PRG_PORT);
        let bank = PRG_LUT[value & 0x03][value >> 4 & 0x03];
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(bank));
    }

    fn poke_chr(_: &mut Self, hw: &mut Hardware, addr: u16, _data: u8) {
        let value = usize::from(addr - CHR_PORT);
        let bank = CHR_LUT[value & 0x07][value >> 4 & 0x07];
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(bank));
    }
}

impl Board for Mapper240 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        if self.decathlon {
            bus.map_poke(PRG_PORT, PRG_PORT + PORT_LEN - 1, Poke::Board(Self::poke_prg));
            bus.map_poke(CHR_PORT, CHR_PORT + PORT_LEN - 1, Poke::Board(Self::poke_chr));
        } else {
            bus.map_poke(
                cpu_mem::CARTRIDGE_SPACE_BASE,
                cpu_mem::EXPANSION_END,
                Poke::Board(Self::poke_expansion),
            );
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.decathlon { "C&E Decathlon" } else { "C&E 240" })
    }
}

#[cfg(test)]
mod tests {
    use super::{CHR_PORT, PRG_PORT};
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn expansion_latch() {
        let mut mapper = mapper(context(240, 256, 128));
        mapper.cpu_write(0x8000, 0x35);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        mapper.cpu_write(0x5FFF, 0x35);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 12);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 40);
    }

    #[test]
    fn decathlon_scrambles_offsets() {
        let mut mapper = mapper(context(244, 128, 64));
        // Offset $11: row 1, column 1.
        mapper.cpu_write(PRG_PORT + 0x11, 0xFF);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
        // Offset $23: row 3, column 2.
        mapper.cpu_write(CHR_PORT + 0x23, 0x00);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 8);
        mapper.cpu_write(CHR_PORT + 0x06, 0x00);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 56);
    }
}
