//! AVE Maxi 15 multicart (234).
//!
//! Both registers live in the vector page and latch on reads as well as
//! writes, with the value the ROM puts on the bus:
//!
//! | Address         | Register                                             |
//! |-----------------|------------------------------------------------------|
//! | `$FF80-$FF9F`   | `nm..bbbb`: mirroring, mode, outer bank              |
//! | `$FFE8-$FFF7`   | `.ccc...p`: inner CHR and PRG bank                   |
//!
//! In CNROM mode the outer bank is the 32 KiB PRG bank and CHR takes two
//! inner bits. In NINA-03 mode the outer bank drops its low bit and PRG
//! and CHR take one and three inner bits.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper234 {
    outer: u8,
    inner: u8,
}

impl Mapper234 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn nina_mode(&self) -> bool {
        self.outer & 0x40 != 0
    }

    fn update(&self, hw: &mut Hardware) {
        let outer = u32::from(self.outer & 0x0F);
        let prg_inner = u32::from(self.inner & 0x01);
        let chr_inner = u32::from(self.inner >> 4 & 0x07);
        let (prg, chr) = if self.nina_mode() {
            let outer = outer >> 1;
            (outer << 1 | prg_inner, outer << 3 | chr_inner)
        } else {
            (outer, outer << 2 | (chr_inner & 0x03))
        };
        hw.swap_prg(SIZE_32K, 0x8000, prg);
        hw.swap_chr(SIZE_8K, 0x0000, chr);
        hw.set_mirroring_vh(self.outer >> 7);
    }

    fn latch(&mut self, hw: &mut Hardware, addr: u16, value: u8) {
        match addr {
            0xFF80..=0xFF9F => self.outer = value,
            0xFFE8..=0xFFF7 => self.inner = value,
            _ => return,
        }
        self.update(hw);
    }

    fn peek_register(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        let value = hw.peek_prg(addr);
        board.latch(hw, addr, value);
        value
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let value = hw.bus_conflict(addr, data);
        board.latch(hw, addr, value);
    }
}

impl Board for Mapper234 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update(hw);
        for (first, last) in [(0xFF80, 0xFF9F), (0xFFE8, 0xFFF7)] {
            bus.map(first, last, Peek::Board(Self::peek_register), Poke::Board(Self::poke_register));
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.outer).write8(self.inner);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.outer = loader.read8()?;
        self.inner = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Maxi 15")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{
        header::Mirroring,
        mapper::{Context, test_support::*},
    };

    /// PRG whose every byte is `fill`, so reads and bus conflicts see it.
    fn flat(fill: u8) -> Context {
        let chr: Vec<u8> = (0..128 * 1024).map(|i| (i / 1024) as u8).collect();
        Context::new(234, vec![fill; 512 * 1024].into(), chr.into())
    }

    #[test]
    fn reads_latch_the_rom_byte() {
        // CNROM mode, outer bank 3, vertical.
        let mut mapper = mapper(flat(0x03));
        mapper.cpu_read(0xFF80);
        mapper.cpu_read(0xFFE8);
        // Inner value 0x03: CHR bits 4-6 are zero.
        assert_eq!(mapper.ppu_read(0x0000), 96);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn writes_conflict_with_rom() {
        let mut mapper = mapper(flat(0xC3));
        // NINA mode from the ROM byte, outer 3 >> 1 = 1, horizontal.
        mapper.cpu_write(0xFF80, 0xFF);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        mapper.cpu_write(0xFFE8, 0x31);
        // inner & ROM = 0x01: PRG 1 << 1 | 1, CHR 1 << 3.
        assert_eq!(mapper.ppu_read(0x0000), 64);
    }

    #[test]
    fn other_vector_page_addresses_do_nothing() {
        let mut mapper = mapper(context(234, 512, 128));
        mapper.cpu_write(0xFFA0, 0x05);
        mapper.cpu_read(0xFFFC);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
    }
}
