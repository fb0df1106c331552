//! Mapper 1 (MMC1, SxROM).
//!
//! The CPU loads registers one bit at a time through a 5-bit shift
//! register; the fifth write commits the value to the register selected
//! by address bits 13-14. Writing a value with bit 7 set resets the shift
//! register and forces PRG mode 3.
//!
//! | Address       | Register | Bits                                           |
//! |---------------|----------|------------------------------------------------|
//! | `$8000-$9FFF` | control  | 0-1 mirroring, 2-3 PRG mode, 4 CHR mode         |
//! | `$A000-$BFFF` | CHR 0    | 4 KiB bank (or 8 KiB with bit 0 ignored)        |
//! | `$C000-$DFFF` | CHR 1    | 4 KiB bank at `$1000`                           |
//! | `$E000-$FFFF` | PRG      | 0-3 16 KiB bank, 4 work RAM disable             |
//!
//! SUROM/SXROM reuse CHR 0 bits as extra address lines: bit 4 selects the
//! 256 KiB PRG half on 512 KiB boards, bits 2-3 the 8 KiB work RAM page.
//!
//! Writes on consecutive CPU cycles (read-modify-write instructions) only
//! count once.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_4K, SIZE_8K, SIZE_16K, SourceId},
    bus::{Bus, Poke},
    cartridge::{
        header::Mirroring,
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const CONTROL_POWER_ON: u8 = 0x0C;
const SUROM_PRG_SIZE: usize = 512 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper1 {
    control: u8,
    chr0: u8,
    chr1: u8,
    prg: u8,
    shift: u8,
    shift_count: u8,
    last_write: Option<u64>,
}

impl Mapper1 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::power_on()
    }

    const fn power_on() -> Self {
        Self {
            control: CONTROL_POWER_ON,
            chr0: 0,
            chr1: 0,
            prg: 0,
            shift: 0,
            shift_count: 0,
            last_write: None,
        }
    }

    fn poke_serial(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let cycle = hw.cycles();
        let consecutive = board.last_write.is_some_and(|last| cycle == last.wrapping_add(1));
        board.last_write = Some(cycle);
        if consecutive {
            return;
        }

        if data & 0x80 != 0 {
            board.shift = 0;
            board.shift_count = 0;
            board.control |= CONTROL_POWER_ON;
            board.update(hw);
            return;
        }

        board.shift |= (data & 1) << board.shift_count;
        board.shift_count += 1;
        if board.shift_count < 5 {
            return;
        }

        let value = board.shift;
        board.shift = 0;
        board.shift_count = 0;
        match (addr >> 13) & 0b11 {
            0 => board.control = value,
            1 => board.chr0 = value,
            2 => board.chr1 = value,
            _ => board.prg = value,
        }
        board.update(hw);
    }

    fn update(&self, hw: &mut Hardware) {
        hw.set_mirroring(match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        });

        let outer = if hw.source_len(SourceId::Prg) >= SUROM_PRG_SIZE {
            u32::from(self.chr0 & 0x10)
        } else {
            0
        };
        let bank = u32::from(self.prg & 0x0F);
        match (self.control >> 2) & 0b11 {
            0 | 1 => {
                let base = outer | (bank & !1);
                hw.swap_prgs(SIZE_16K, 0x8000, &[base, base | 1]);
            }
            2 => hw.swap_prgs(SIZE_16K, 0x8000, &[outer, outer | bank]),
            _ => hw.swap_prgs(SIZE_16K, 0x8000, &[outer | bank, outer | 0x0F]),
        }

        if self.control & 0x10 == 0 {
            hw.swap_chr(SIZE_8K, 0x0000, u32::from(self.chr0 >> 1));
        } else {
            hw.swap_chrs(SIZE_4K, 0x0000, &[u32::from(self.chr0), u32::from(self.chr1)]);
        }

        if hw.source_len(SourceId::Wrk) > SIZE_8K {
            hw.swap_wrk(u32::from(self.chr0 >> 2 & 0b11));
        }
        let enabled = self.prg & 0x10 == 0;
        hw.set_wrk_access(enabled, enabled);
    }
}

impl Board for Mapper1 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::power_on();
        } else {
            self.shift = 0;
            self.shift_count = 0;
            self.control |= CONTROL_POWER_ON;
        }
        self.update(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_serial),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.control)
            .write8(self.chr0)
            .write8(self.chr1)
            .write8(self.prg)
            .write8(self.shift)
            .write8(self.shift_count);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.control = loader.read8()?;
        self.chr0 = loader.read8()?;
        self.chr1 = loader.read8()?;
        self.prg = loader.read8()?;
        self.shift = loader.read8()?;
        self.shift_count = loader.read8()?;
        if self.shift_count >= 5 {
            return Err(Error::CorruptSaveState("mmc1 shift count out of range"));
        }
        self.last_write = None;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("MMC1")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{
        header::Mirroring,
        mapper::{Mapper, test_support::*},
    };

    fn write_serial(mapper: &mut dyn Mapper, addr: u16, value: u8) {
        for i in 0..5 {
            mapper.clock_cpu();
            mapper.clock_cpu();
            mapper.cpu_write(addr, (value >> i) & 1);
        }
    }

    #[test]
    fn power_on_fixes_last_bank() {
        let mut mapper = mapper(context(1, 64, 0));
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
    }

    #[test]
    fn switches_prg_bank_in_mode3() {
        let mut mapper = mapper(context(1, 64, 0));
        write_serial(mapper.as_mut(), 0xE000, 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
    }

    #[test]
    fn control_sets_mirroring_and_32k_mode() {
        let mut mapper = mapper(context(1, 128, 0));
        write_serial(mapper.as_mut(), 0x8000, 0b0_00_10);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
        write_serial(mapper.as_mut(), 0xE000, 0x03);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 6);
    }

    #[test]
    fn consecutive_cycle_writes_count_once() {
        let mut mapper = mapper(context(1, 64, 0));
        mapper.clock_cpu();
        mapper.cpu_write(0xE000, 1);
        mapper.clock_cpu();
        mapper.cpu_write(0xE000, 1);
        for _ in 0..4 {
            mapper.clock_cpu();
            mapper.clock_cpu();
            mapper.cpu_write(0xE000, 0);
        }
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 2);
    }

    #[test]
    fn surom_outer_bank_follows_chr0_bit4() {
        let mut mapper = mapper(context(1, 512, 0));
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);
        write_serial(mapper.as_mut(), 0xA000, 0x10);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 32);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 62);
    }
}
