//! Konami VRC1 (75).
//!
//! | Address  | Register                                                |
//! |----------|---------------------------------------------------------|
//! | `$8000`  | PRG 8 KiB `$8000`                                       |
//! | `$9000`  | Bit 0 mirroring (0 vertical), bits 1/2 CHR bank bit 4   |
//! | `$A000`  | PRG 8 KiB `$A000`                                       |
//! | `$C000`  | PRG 8 KiB `$C000`                                       |
//! | `$E000`  | CHR 4 KiB `$0000`, low four bits                        |
//! | `$F000`  | CHR 4 KiB `$1000`, low four bits                        |

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_4K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::{
        header::Mirroring,
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper75 {
    chr: [u8; 2],
}

impl Mapper75 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_chr(&self, hw: &mut Hardware) {
        hw.swap_chrs(SIZE_4K, 0x0000, &self.chr.map(u32::from));
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF000 {
            0x8000 => hw.swap_prg(SIZE_8K, 0x8000, u32::from(data & 0x0F)),
            0x9000 => {
                if hw.header_mirroring() != Mirroring::FourScreen {
                    hw.set_mirroring_vh(data);
                }
                board.chr[0] = (board.chr[0] & 0x0F) | (data & 0x02) << 3;
                board.chr[1] = (board.chr[1] & 0x0F) | (data & 0x04) << 2;
                board.update_chr(hw);
            }
            0xA000 => hw.swap_prg(SIZE_8K, 0xA000, u32::from(data & 0x0F)),
            0xC000 => hw.swap_prg(SIZE_8K, 0xC000, u32::from(data & 0x0F)),
            reg @ (0xE000 | 0xF000) => {
                let index = usize::from(reg == 0xF000);
                board.chr[index] = (board.chr[index] & 0x10) | (data & 0x0F);
                board.update_chr(hw);
            }
            _ => {}
        }
    }
}

impl Board for Mapper75 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prgs(SIZE_8K, 0x8000, &[0, 1, 2, LAST]);
        }
        self.update_chr(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.chr);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.chr)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("VRC1")
    }
}
