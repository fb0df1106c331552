//! Irem G-101 (32).
//!
//! | Address         | Register                                           |
//! |-----------------|----------------------------------------------------|
//! | `$8000-$8FFF`   | PRG bank 0 (`$8000` or `$C000` per mode)           |
//! | `$9000-$9FFF`   | Bit 0 mirroring (0 vertical), bit 1 PRG mode       |
//! | `$A000-$AFFF`   | PRG bank 1 at `$A000`                              |
//! | `$B000-$B007`   | CHR 1 KiB banks                                    |
//!
//! Major League wires CIRAM A10 low and has no mode bit, so the `$9000`
//! register is ignored there.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::{
        header::Mirroring,
        mapper::{Board, Context, Hardware, MAJOR_LEAGUE},
    },
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper32 {
    major_league: bool,
    prg: [u8; 2],
    prg_mode: bool,
}

impl Mapper32 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            major_league: ctx.crc == MAJOR_LEAGUE || ctx.submapper == 1,
            prg: [0, 1],
            prg_mode: false,
        }
    }

    fn update_prg(&self, hw: &mut Hardware) {
        let [r0, r1] = self.prg.map(|bank| u32::from(bank & 0x1F));
        if self.prg_mode {
            hw.swap_prgs(SIZE_8K, 0x8000, &[LAST - 1, r1, r0, LAST]);
        } else {
            hw.swap_prgs(SIZE_8K, 0x8000, &[r0, r1, LAST - 1, LAST]);
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF000 {
            0x8000 => {
                board.prg[0] = data;
                board.update_prg(hw);
            }
            0x9000 if !board.major_league => {
                board.prg_mode = data & 0x02 != 0;
                hw.set_mirroring_vh(data);
                board.update_prg(hw);
            }
            0xA000 => {
                board.prg[1] = data;
                board.update_prg(hw);
            }
            0xB000 => hw.swap_chr(SIZE_1K, (addr & 0x07) * SIZE_1K as u16, u32::from(data)),
            _ => {}
        }
    }
}

impl Board for Mapper32 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.prg = [0, 1];
            self.prg_mode = false;
            if self.major_league {
                hw.set_mirroring(Mirroring::SingleScreenLower);
            }
        }
        self.update_prg(hw);
        bus.map_poke(0x8000, 0xBFFF, Poke::Board(Self::poke_register));
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.prg).write_bool(self.prg_mode);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.prg)?;
        self.prg_mode = loader.read_bool()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Irem G-101")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn prg_mode_swaps_first_and_third_window() {
        let mut mapper = mapper(context(32, 256, 256));
        mapper.cpu_write(0x8000, 7);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 7);
        mapper.cpu_write(0x9000, 0x03);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 30);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 7);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        mapper.cpu_write(0xB005, 0x44);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1400), 0x44);
    }

    #[test]
    fn major_league_ignores_mode_register() {
        let ctx = context(32, 128, 128).with_crc(crate::cartridge::mapper::MAJOR_LEAGUE);
        let mut mapper = mapper(ctx);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
        mapper.cpu_write(0x9000, 0x03);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
    }
}
