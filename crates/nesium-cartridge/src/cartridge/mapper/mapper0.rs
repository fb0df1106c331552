//! Mapper 0 (NROM).
//!
//! No bank switching at all. 16 KiB PRG images appear twice at
//! `$8000-$FFFF`; the base reset maps `[0, last]`, which masking turns
//! into that mirror. CHR is a single 8 KiB ROM or RAM bank.
//!
//! # Reference
//! - [NROM on NESdev Wiki](https://www.nesdev.org/wiki/NROM)

use std::borrow::Cow;

use crate::{
    bus::Bus,
    cartridge::mapper::{Board, Context, Hardware},
};

#[derive(Debug, Clone, Default)]
pub struct Mapper0;

impl Mapper0 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self
    }
}

impl Board for Mapper0 {
    fn reset(&mut self, _hw: &mut Hardware, _bus: &mut Bus<Self>, _hard: bool) {}

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("NROM")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn nrom_128_mirrors_its_only_bank() {
        let mut mapper = mapper(context(0, 16, 8));
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 1);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 1);
    }

    #[test]
    fn rom_writes_are_ignored() {
        let mut mapper = mapper(context(0, 32, 8));
        mapper.cpu_write(0x8000, 0xFF);
        mapper.ppu_write(0x0000, 0xFF);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0);
    }

    #[test]
    fn chr_ram_is_writable_without_chr_rom() {
        let mut mapper = mapper(context(0, 32, 0));
        mapper.ppu_write(0x1234, 0x77);
        assert_eq!(mapper.ppu_read(0x1234), 0x77);
    }
}
