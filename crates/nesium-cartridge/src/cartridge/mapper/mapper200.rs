//! Pirate multicarts that latch the write address (and sometimes the data)
//! on any write to `$8000-$FFFF`.
//!
//! | Id  | PRG                                                     | CHR 8 KiB        | Mirroring            |
//! |-----|---------------------------------------------------------|------------------|----------------------|
//! | 200 | 16 KiB x2 = A0-A2                                       | A0-A2            | A3 (0 vertical)      |
//! | 201 | 32 KiB = A0-A7                                          | A0-A7            | fixed                |
//! | 202 | 16 KiB x2 = A1-A3, 32 KiB when A0 and A3 are both set   | A1-A3            | A0 (0 vertical)      |
//! | 203 | 16 KiB x2 = D2-D7                                       | D0-D1            | fixed                |
//! | 212 | A14 set: 32 KiB = A1-A2, else 16 KiB x2 = A0-A2         | A0-A2            | A3 (0 vertical)      |
//! | 213 | 32 KiB = A1-A2                                          | A3-A5            | fixed                |
//! | 229 | A1-A4 clear: 32 KiB bank 0, else 16 KiB x2 = A0-A4      | A0-A7            | A5 (0 vertical)      |
//! | 231 | 16 KiB x2 = A1-A4 with A5 as bit 0                      | RAM              | A7 (0 vertical)      |
//! | 242 | 32 KiB = A3-A6                                          | RAM              | A1 (0 vertical)      |
//!
//! Mapper 212 also answers reads at `$6000-$7FFF` with bit 7 set when A4 is
//! clear, which the menus use to detect the cartridge.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper200 {
    id: u16,
}

impl Mapper200 {
    pub fn new(ctx: &mut Context) -> Self {
        if ctx.id == 212 {
            ctx.drop_auto_wrk();
        }
        Self { id: ctx.id }
    }

    fn prg16(hw: &mut Hardware, bank: u16) {
        let bank = u32::from(bank);
        hw.swap_prgs(SIZE_16K, 0x8000, &[bank, bank]);
    }

    fn prg32(hw: &mut Hardware, bank: u16) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(bank));
    }

    fn chr8(hw: &mut Hardware, bank: u16) {
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(bank));
    }

    fn latch(&self, hw: &mut Hardware, addr: u16, data: u8) {
        match self.id {
            200 => {
                Self::prg16(hw, addr & 0x07);
                Self::chr8(hw, addr & 0x07);
                hw.set_mirroring_vh((addr >> 3) as u8);
            }
            201 => {
                Self::prg32(hw, addr & 0xFF);
                Self::chr8(hw, addr & 0xFF);
            }
            202 => {
                let bank = addr >> 1 & 0x07;
                if addr & 0x09 == 0x09 {
                    Self::prg32(hw, bank >> 1);
                } else {
                    Self::prg16(hw, bank);
                }
                Self::chr8(hw, bank);
                hw.set_mirroring_vh(addr as u8);
            }
            203 => {
                Self::prg16(hw, u16::from(data >> 2));
                Self::chr8(hw, u16::from(data & 0x03));
            }
            212 => {
                if addr & 0x4000 != 0 {
                    Self::prg32(hw, addr >> 1 & 0x03);
                } else {
                    Self::prg16(hw, addr & 0x07);
                }
                Self::chr8(hw, addr & 0x07);
                hw.set_mirroring_vh((addr >> 3) as u8);
            }
            213 => {
                Self::prg32(hw, addr >> 1 & 0x03);
                Self::chr8(hw, addr >> 3 & 0x07);
            }
            229 => {
                if addr & 0x1E == 0 {
                    Self::prg32(hw, 0);
                } else {
                    Self::prg16(hw, addr & 0x1F);
                }
                Self::chr8(hw, addr & 0xFF);
                hw.set_mirroring_vh((addr >> 5) as u8);
            }
            231 => {
                Self::prg16(hw, addr & 0x1E | addr >> 5 & 0x01);
                hw.set_mirroring_vh((addr >> 7) as u8);
            }
            _ => {
                Self::prg32(hw, addr >> 3 & 0x0F);
                hw.set_mirroring_vh((addr >> 1) as u8);
            }
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.latch(hw, addr, data);
    }

    fn peek_detect(_: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        if addr & 0x10 == 0 {
            hw.open_bus.apply_masked(0x7F, 0x80)
        } else {
            hw.open_bus.sample()
        }
    }
}

impl Board for Mapper200 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.latch(hw, cpu_mem::PRG_ROM_START, 0);
        }
        if self.id == 212 {
            bus.map_peek(
                cpu_mem::PRG_RAM_START,
                cpu_mem::PRG_RAM_END,
                Peek::Board(Self::peek_detect),
            );
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("Multicart {}", self.id))
    }
}
