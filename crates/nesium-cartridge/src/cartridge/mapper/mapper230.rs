//! Multicarts whose reset button switches between two ROM halves.
//!
//! **230 (22-in-1)**: the first 128 KiB holds Contra as a UNROM game, the
//! rest is the menu and its games. Every soft reset flips between them.
//!
//! ```text
//! Contra:    D~[.... .PPP]   16 KiB at $8000, $C000 fixed to bank 7, vertical
//! Multicart: D~[.MOP PPPP]   bank = PPPPP + 8; O=1 16 KiB, O=0 32 KiB
//!                             M: 0 horizontal, 1 vertical
//! ```
//!
//! **233 (42-in-1)**: the reset button supplies PRG bit 5.
//!
//! ```text
//! D~[MMOP PPPP]   O=1 16 KiB, O=0 32 KiB
//!    ++---------- 0 single screen, 1 vertical, 2 horizontal, 3 single upper
//! ```

use std::borrow::Cow;

use tracing::debug;

use crate::{
    banks::{SIZE_16K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::{
        header::Mirroring,
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const CONTRA_LAST_BANK: u32 = 7;
const MENU_FIRST_BANK: u32 = 8;

#[derive(Debug, Clone)]
pub struct Mapper230 {
    reset_switch: bool,
    /// 230: Contra selected. 233: PRG bit 5 from the reset switch.
    mode: u8,
}

impl Mapper230 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            reset_switch: ctx.id == 233,
            mode: 0,
        }
    }

    fn contra(&self) -> bool {
        self.mode != 0
    }

    fn swap_prg(hw: &mut Hardware, bank: u32, mode_16k: bool) {
        if mode_16k {
            hw.swap_prgs(SIZE_16K, 0x8000, &[bank, bank]);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, bank >> 1);
        }
    }

    fn latch(&self, hw: &mut Hardware, data: u8) {
        let mode_16k = data & 0x20 != 0;
        if self.reset_switch {
            Self::swap_prg(hw, u32::from(data & 0x1F | self.mode), mode_16k);
            hw.set_mirroring(match data >> 6 {
                0 => Mirroring::SingleScreenLower,
                1 => Mirroring::Vertical,
                2 => Mirroring::Horizontal,
                _ => Mirroring::SingleScreenUpper,
            });
        } else if self.contra() {
            hw.swap_prgs(SIZE_16K, 0x8000, &[u32::from(data & 0x07), CONTRA_LAST_BANK]);
            hw.set_mirroring(Mirroring::Vertical);
        } else {
            Self::swap_prg(hw, u32::from(data & 0x1F) + MENU_FIRST_BANK, mode_16k);
            hw.set_mirroring_hv(data >> 6);
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.latch(hw, data);
    }
}

impl Board for Mapper230 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        self.mode = match (self.reset_switch, hard) {
            (false, true) => 1,
            (false, false) => self.mode ^ 1,
            (true, true) => 0,
            (true, false) => self.mode ^ 0x20,
        };
        debug!(mode = self.mode, "{} reset", self.name());
        self.latch(hw, 0);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.mode);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.mode = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.reset_switch { "42-in-1" } else { "22-in-1" })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ResetKind,
        cartridge::{header::Mirroring, mapper::test_support::*},
    };

    #[test]
    fn soft_reset_alternates_contra_and_menu() {
        let mut mapper = mapper(context(230, 1024, 0));
        mapper.cpu_write(0x8000, 0x03);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);

        mapper.reset(ResetKind::Soft);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 16);
        mapper.cpu_write(0x8000, 0x20 | 0x03);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 22);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 22);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);

        mapper.reset(ResetKind::Soft);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
        mapper.reset(ResetKind::PowerOn);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 14);
    }

    #[test]
    fn reset_switch_supplies_prg_bit_5() {
        let mut mapper = mapper(context(233, 1024, 0));
        mapper.cpu_write(0x8000, 0x40 | 0x20 | 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);

        mapper.reset(ResetKind::Soft);
        mapper.cpu_write(0x8000, 0xC0 | 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 68);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 70);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenUpper);
    }
}
