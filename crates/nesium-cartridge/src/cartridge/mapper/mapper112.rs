//! Asder / NTDEC (112).
//!
//! Namco 108-like bank registers behind a different decode: `$8000`
//! selects, `$A000` loads, `$E000` bit 0 picks horizontal mirroring.
//!
//! | Reg | Window                     |
//! |-----|----------------------------|
//! | 0   | 8 KiB PRG at `$8000`       |
//! | 1   | 8 KiB PRG at `$A000`       |
//! | 2-3 | 2 KiB CHR at `$0000/$0800` |
//! | 4-7 | 1 KiB CHR at `$1000-$1C00` |

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_2K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const POWER_ON_REGS: [u8; 8] = [0, 1, 0, 2, 4, 5, 6, 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper112 {
    select: u8,
    regs: [u8; 8],
}

impl Mapper112 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self {
            select: 0,
            regs: POWER_ON_REGS,
        }
    }

    fn update(&self, hw: &mut Hardware) {
        let r = self.regs.map(u32::from);
        hw.swap_prgs(SIZE_8K, 0x8000, &[r[0], r[1], LAST - 1, LAST]);
        hw.swap_chrs(SIZE_2K, 0x0000, &[r[2] >> 1, r[3] >> 1]);
        hw.swap_chrs(SIZE_1K, 0x1000, &[r[4], r[5], r[6], r[7]]);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE001 {
            0x8000 => board.select = data & 0x07,
            0xA000 => {
                board.regs[usize::from(board.select)] = data;
                board.update(hw);
            }
            0xE000 => hw.set_mirroring_vh(data),
            _ => {}
        }
    }
}

impl Board for Mapper112 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.select = 0;
            self.regs = POWER_ON_REGS;
        }
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.select).write(&self.regs);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.select = loader.read8()? & 0x07;
        loader.read(&mut self.regs)?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Asder")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn select_then_load() {
        let mut mapper = mapper(context(112, 128, 128));
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);

        mapper.cpu_write(0x8000, 1);
        mapper.cpu_write(0xA000, 9);
        mapper.cpu_write(0x8000, 3);
        mapper.cpu_write(0xA000, 0x14);
        mapper.cpu_write(0x8000, 6);
        mapper.cpu_write(0xA000, 0x33);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 9);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0800), 0x14);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0C00), 0x15);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1800), 0x33);

        // $8001 is not the data port on this board.
        mapper.cpu_write(0x8001, 0x02);
        mapper.cpu_write(0x8000, 0);
        mapper.cpu_write(0x8001, 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
    }

    #[test]
    fn mirroring_at_e000() {
        let mut mapper = mapper(context(112, 128, 128));
        mapper.cpu_write(0xE000, 1);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        mapper.cpu_write(0xE000, 0);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }
}
