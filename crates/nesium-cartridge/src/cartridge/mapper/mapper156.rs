//! DAOU 306 (156), used by Metal Force and Buzz & Waldog.
//!
//! | Address         | Register                                          |
//! |-----------------|---------------------------------------------------|
//! | `$C000-$C003`   | CHR 1 KiB `$0000-$0C00`, low byte                 |
//! | `$C004-$C007`   | CHR 1 KiB `$0000-$0C00`, bit 8                    |
//! | `$C008-$C00B`   | CHR 1 KiB `$1000-$1C00`, low byte                 |
//! | `$C00C-$C00F`   | CHR 1 KiB `$1000-$1C00`, bit 8                    |
//! | `$C010`         | PRG 16 KiB `$8000`                                |
//! | `$C014`         | Mirroring: vertical, horizontal, single lower     |
//!
//! Mirroring is single-screen until `$C014` is written.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper156 {
    chr: [u16; 8],
}

impl Mapper156 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_chr(&self, hw: &mut Hardware) {
        hw.swap_chrs(SIZE_1K, 0x0000, &self.chr.map(u32::from));
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr {
            0xC000..=0xC00F => {
                let slot = usize::from((addr >> 1 & 0x04) | (addr & 0x03));
                let reg = &mut board.chr[slot];
                *reg = if addr & 0x04 == 0 {
                    (*reg & 0x100) | u16::from(data)
                } else {
                    (*reg & 0xFF) | u16::from(data & 0x01) << 8
                };
                board.update_chr(hw);
            }
            0xC010 => hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F)),
            0xC014 => match data & 0x03 {
                0 => hw.set_mirroring_vh(0),
                1 => hw.set_mirroring_vh(1),
                _ => hw.set_mirroring_single(false),
            },
            _ => {}
        }
    }
}

impl Board for Mapper156 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prgs(SIZE_16K, 0x8000, &[0, LAST]);
            hw.set_mirroring_single(false);
        }
        self.update_chr(hw);
        bus.map_poke(0xC000, 0xC014, Poke::Board(Self::poke_register));
    }

    fn save(&self, saver: &mut Saver) {
        for reg in self.chr {
            saver.write16(reg);
        }
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        for reg in self.chr.iter_mut() {
            *reg = loader.read16()? & 0x1FF;
        }
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("DAOU 306")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{
        header::Mirroring,
        mapper::{Context, test_support::*},
    };

    #[test]
    fn prg_and_mirroring() {
        let mut mapper = mapper(context(156, 256, 128));
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);

        mapper.cpu_write(0xC010, 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 10);
        mapper.cpu_write(0xC014, 1);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        mapper.cpu_write(0xC014, 0);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn chr_low_and_high_registers() {
        let mut mapper = mapper(context(156, 128, 128));
        mapper.cpu_write(0xC002, 0x21);
        mapper.cpu_write(0xC00B, 0x42);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0800), 0x21);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 0x42);
    }

    #[test]
    fn chr_bit_8_reaches_the_upper_256k() {
        // Each byte holds bit 8 of its 1 KiB bank number.
        let chr: Vec<u8> = (0..512 * 1024).map(|i| ((i / 1024) >> 8) as u8).collect();
        let prg: Vec<u8> = vec![0; 128 * 1024];
        let mut mapper = mapper(Context::new(156, prg.into(), chr.into()));
        mapper.cpu_write(0xC001, 0x10);
        assert_eq!(mapper.ppu_read(0x0400), 0);
        mapper.cpu_write(0xC005, 0x01);
        assert_eq!(mapper.ppu_read(0x0400), 1);
        mapper.cpu_write(0xC001, 0x11);
        assert_eq!(mapper.ppu_read(0x0400), 1);
    }
}
