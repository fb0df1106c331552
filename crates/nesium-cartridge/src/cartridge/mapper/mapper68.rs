//! Sunsoft-4 (68).
//!
//! | Address  | Register                                                   |
//! |----------|------------------------------------------------------------|
//! | `$8000-$B000` | CHR 2 KiB banks                                       |
//! | `$C000/$D000` | Nametable ROM pages (bit 7 forced on)                 |
//! | `$E000`  | Bits 0-1 mirroring, bit 4 nametables from CHR ROM          |
//! | `$F000`  | Bits 0-3 PRG 16 KiB `$8000`, bit 4 work RAM enable         |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_2K, SIZE_16K, SourceId},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper68 {
    nmt: [u8; 2],
    control: u8,
}

impl Mapper68 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        hw.set_mirroring_vh01(self.control);
        if self.control & 0x10 == 0 {
            return;
        }
        let [a, b] = self.nmt.map(|page| u32::from(page | 0x80));
        let pages = match self.control & 0x03 {
            0 => [a, b, a, b],
            1 => [a, a, b, b],
            2 => [a; 4],
            _ => [b; 4],
        };
        for (slot, page) in pages.into_iter().enumerate() {
            hw.swap_nmt(slot as u16, SourceId::Chr, page);
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF000 {
            reg @ 0x8000..=0xB000 => {
                let slot = (reg >> 12) - 0x8;
                hw.swap_chr(SIZE_2K, slot * SIZE_2K as u16, u32::from(data));
            }
            reg @ (0xC000 | 0xD000) => {
                board.nmt[usize::from((reg >> 12) - 0xC)] = data;
                board.update_nmt(hw);
            }
            0xE000 => {
                board.control = data;
                board.update_nmt(hw);
            }
            _ => {
                hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F));
                let wrk = data & 0x10 != 0;
                hw.set_wrk_access(wrk, wrk);
            }
        }
    }
}

impl Board for Mapper68 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.set_wrk_access(false, false);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.nmt).write8(self.control);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.nmt)?;
        self.control = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Sunsoft-4")
    }
}
