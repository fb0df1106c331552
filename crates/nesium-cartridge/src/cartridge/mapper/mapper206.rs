//! Namco 108 (206, DxROM) and the NAMCOT boards built around it.
//!
//! The chip is an MMC3 without IRQ, PRG mode, CHR inversion or mirroring
//! control: `$8000` selects one of eight registers and `$8001` loads it.
//!
//! | Reg | Window                     |
//! |-----|----------------------------|
//! | R0  | 2 KiB CHR at `$0000`       |
//! | R1  | 2 KiB CHR at `$0800`       |
//! | R2-R5 | 1 KiB CHR at `$1000-$1C00` |
//! | R6  | 8 KiB PRG at `$8000`       |
//! | R7  | 8 KiB PRG at `$A000`       |
//!
//! `$C000-$FFFF` is fixed to the last 16 KiB. Board variants rewire the
//! CHR outputs:
//!
//! - **76 (NAMCOT-3446)**: R2-R5 select 2 KiB banks across the whole
//!   pattern space; R0/R1 are unused.
//! - **88 (NAMCOT-3443)**: R0/R1 reach the first 64 KiB of CHR and R2-R5
//!   the second.
//! - **95 (NAMCOT-3425)**: bit 5 of R0/R1 drives CIRAM A10 for the top and
//!   bottom nametable pairs.
//! - **154 (NAMCOT-3453)**: as 88, and bit 6 of every write picks a single
//!   screen.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_2K, SIZE_8K, SourceId},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Namco108,
    Namcot3446,
    Namcot3443,
    Namcot3425,
    Namcot3453,
}

#[derive(Debug, Clone)]
pub struct Mapper206 {
    variant: Variant,
    select: u8,
    regs: [u8; 8],
}

const POWER_ON_REGS: [u8; 8] = [0, 2, 4, 5, 6, 7, 0, 1];

impl Mapper206 {
    pub fn new(ctx: &mut Context) -> Self {
        let variant = match ctx.id {
            76 => Variant::Namcot3446,
            88 => Variant::Namcot3443,
            95 => Variant::Namcot3425,
            154 => Variant::Namcot3453,
            _ => Variant::Namco108,
        };
        Self {
            variant,
            select: 0,
            regs: POWER_ON_REGS,
        }
    }

    fn update(&self, hw: &mut Hardware) {
        let r = self.regs.map(u32::from);
        hw.swap_prgs(SIZE_8K, 0x8000, &[r[6] & 0x3F, r[7] & 0x3F, LAST - 1, LAST]);

        if self.variant == Variant::Namcot3446 {
            hw.swap_chrs(SIZE_2K, 0x0000, &[r[2], r[3], r[4], r[5]]);
            return;
        }

        let (low, high) = match self.variant {
            Variant::Namcot3443 | Variant::Namcot3453 => (0x3F, 0x40),
            _ => (0xFF, 0x00),
        };
        hw.swap_chrs(SIZE_2K, 0x0000, &[(r[0] & low) >> 1, (r[1] & low) >> 1]);
        hw.swap_chrs(
            SIZE_1K,
            0x1000,
            &[r[2] | high, r[3] | high, r[4] | high, r[5] | high],
        );

        if self.variant == Variant::Namcot3425 {
            for (slot, reg) in [r[0], r[0], r[1], r[1]].into_iter().enumerate() {
                hw.swap_nmt(slot as u16, SourceId::Ciram, reg >> 5 & 1);
            }
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if board.variant == Variant::Namcot3453 {
            hw.set_mirroring_single(data & 0x40 != 0);
        }
        if addr & 0xE000 != 0x8000 {
            return;
        }
        if addr & 1 == 0 {
            board.select = data & 0x07;
        } else {
            board.regs[usize::from(board.select)] = data;
            board.update(hw);
        }
    }
}

impl Board for Mapper206 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.select = 0;
            self.regs = POWER_ON_REGS;
            if self.variant == Variant::Namcot3453 {
                hw.set_mirroring_single(false);
            }
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
        loader.read(&mut self.regs)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Namco108 => "Namco 108",
            Variant::Namcot3446 => "NAMCOT-3446",
            Variant::Namcot3443 => "NAMCOT-3443",
            Variant::Namcot3425 => "NAMCOT-3425",
            Variant::Namcot3453 => "NAMCOT-3453",
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        cartridge::{header::Mirroring, mapper::test_support::*},
        state::{Loader, Saver, Tag},
    };

    #[test]
    fn registers_and_fixed_banks() {
        let mut mapper = mapper(context(206, 128, 64));
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 1);
        mapper.cpu_write(0x8000, 6);
        mapper.cpu_write(0x8001, 9);
        mapper.cpu_write(0x8000, 0);
        mapper.cpu_write(0x8001, 11);
        mapper.cpu_write(0x8000, 5);
        mapper.cpu_write(0x8001, 33);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 9);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 10);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0400), 11);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 33);
        // Writes above $9FFF do nothing.
        mapper.cpu_write(0xA001, 3);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 33);
    }

    #[test]
    fn namcot3446_uses_2k_banks() {
        let mut mapper = mapper(context(76, 128, 128));
        mapper.cpu_write(0x8000, 4);
        mapper.cpu_write(0x8001, 7);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 14);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1400), 15);
    }

    #[test]
    fn namcot3443_splits_chr_halves() {
        let mut mapper = mapper(context(88, 128, 128));
        mapper.cpu_write(0x8000, 2);
        mapper.cpu_write(0x8001, 3);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 67);
        mapper.cpu_write(0x8000, 0);
        mapper.cpu_write(0x8001, 0x48);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 8);
    }

    #[test]
    fn namcot3425_nametables_from_chr_regs() {
        let mut mapper = mapper(context(95, 128, 32));
        mapper.cpu_write(0x8000, 0);
        mapper.cpu_write(0x8001, 0x20);
        mapper.cpu_write(0x8000, 1);
        mapper.cpu_write(0x8001, 0x00);
        mapper.ppu_write(0x2000, 0xAA);
        mapper.ppu_write(0x2800, 0x55);
        assert_eq!(mapper.ppu_read(0x2400), 0xAA);
        assert_eq!(mapper.ppu_read(0x2C00), 0x55);
        assert_ne!(mapper.ppu_read(0x2800), 0xAA);
    }

    #[test]
    fn namcot3453_single_screen_from_any_write() {
        let mut mapper = mapper(context(154, 128, 128));
        mapper.cpu_write(0xE000, 0x40);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenUpper);
        mapper.cpu_write(0x8000, 0x00);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
    }

    #[test]
    fn out_of_range_select_in_state_is_masked() {
        let mut mapper = mapper(context(206, 128, 64));
        mapper.cpu_write(0x8000, 5);
        let mut saver = Saver::new();
        mapper.save_state(&mut saver);
        let mut state = saver.into_bytes();

        // The select byte opens the REG payload.
        let reg = Tag::Reg.fourcc().to_le_bytes();
        let at = state.windows(4).position(|w| w == reg).expect("REG chunk");
        assert_eq!(state[at + 8], 5);
        state[at + 8] = 200;

        mapper.load_state(&mut Loader::new(&state)).expect("state loads");
        mapper.cpu_write(0x8001, 3);
        // 200 & 7 selects R0, a 2 KiB CHR bank at $0000.
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 2);
    }
}
