//! Mapper 15 (K-1029/K-1030P multicart).
//!
//! A write to `$8000-$FFFF` selects the PRG layout from address bits 0-1
//! and the bank from the data byte (`spbbbbbb`: `p` = 16 KiB bank, `m`
//! mirroring, `s` 8 KiB half).
//!
//! | Mode | `$8000-$BFFF`  | `$C000-$FFFF`  |
//! |------|----------------|----------------|
//! | 0    | `p & !1`       | `(p & !1) \| 1`|
//! | 1    | `p`            | `p \| 7`       |
//! | 2    | 8 KiB `p*2+s` mirrored four times |
//! | 3    | `p`            | `p`            |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper15 {
    mode: u8,
    data: u8,
}

impl Mapper15 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let p = u32::from(self.data & 0x3F);
        let s = u32::from(self.data >> 7);
        match self.mode {
            0 => hw.swap_prgs(SIZE_16K, 0x8000, &[p & !1, (p & !1) | 1]),
            1 => hw.swap_prgs(SIZE_16K, 0x8000, &[p, p | 7]),
            2 => {
                let bank = p << 1 | s;
                hw.swap_prgs(SIZE_8K, 0x8000, &[bank; 4]);
            }
            _ => hw.swap_prgs(SIZE_16K, 0x8000, &[p, p]),
        }
        hw.set_mirroring_vh(self.data >> 6);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        board.mode = (addr & 0b11) as u8;
        board.data = data;
        board.update(hw);
    }
}

impl Board for Mapper15 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
        }
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.mode).write8(self.data);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.mode = loader.read8()? & 0b11;
        self.data = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("K-1029")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn modes_follow_address_bits() {
        let mut mapper = mapper(context(15, 1024, 0));

        mapper.cpu_write(0x8000, 0x05);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 10);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);

        mapper.cpu_write(0x8001, 0x41);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 2);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);

        mapper.cpu_write(0x8002, 0x83);
        for addr in [0x8000, 0xA000, 0xC000, 0xE000] {
            assert_eq!(prg_bank(mapper.as_mut(), addr), 7);
        }

        mapper.cpu_write(0x8003, 0x09);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 18);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 18);
    }
}
