//! Mapper 62 (Super 700-in-1).
//!
//! ```text
//! A~[1.PP PPPP MOCC CCCC]   D~[.... ..cc]
//!      ++-++++ ||++-++++- CHR bank high bits (low two from data)
//!      |       |+-------- 1: 16 KiB mode (32 KiB drops the low bit)
//!      |       +--------- mirroring (1 horizontal)
//!      +----------------- PRG bank, bit 6 of the address is PRG bit 6
//! ```

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper62 {
    addr: u16,
    data: u8,
}

impl Mapper62 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let prg = u32::from((self.addr >> 8 & 0x3F) | (self.addr & 0x40));
        if self.addr & 0x20 != 0 {
            hw.swap_prgs(SIZE_16K, 0x8000, &[prg, prg]);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, prg >> 1);
        }
        let chr = u32::from(self.addr & 0x1F) << 2 | u32::from(self.data & 0x03);
        hw.swap_chr(SIZE_8K, 0x0000, chr);
        hw.set_mirroring_vh((self.addr >> 7) as u8);
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.addr = addr;
        board.data = data;
        board.update(hw);
    }
}

impl Board for Mapper62 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        *self = Self::default();
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write16(self.addr).write8(self.data);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.addr = loader.read16()?;
        self.data = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Super 700-in-1")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn address_and_data_form_banks() {
        let mut mapper = mapper(context(62, 256, 256));
        mapper.cpu_write(0x83A1, 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 48);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }
}
