//! MMC2 (9, Punch-Out!!) and MMC4 (10, Fire Emblem).
//!
//! Each pattern table has two 4 KiB CHR banks and a latch choosing between
//! them. The PPU flips a latch by fetching tile `$FD` or `$FE`; the new
//! bank takes effect on the fetch after the trigger.
//!
//! | Address       | Register                                        |
//! |---------------|-------------------------------------------------|
//! | `$A000-$AFFF` | PRG bank (MMC2: 8 KiB, MMC4: 16 KiB at `$8000`) |
//! | `$B000-$BFFF` | CHR `$0000` when latch 0 = `$FD`                |
//! | `$C000-$CFFF` | CHR `$0000` when latch 0 = `$FE`                |
//! | `$D000-$DFFF` | CHR `$1000` when latch 1 = `$FD`                |
//! | `$E000-$EFFF` | CHR `$1000` when latch 1 = `$FE`                |
//! | `$F000-$FFFF` | Mirroring (0 vertical, 1 horizontal)            |

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_4K, SIZE_8K, SIZE_16K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper9 {
    mmc4: bool,
    /// `[latch0 $FD, latch0 $FE, latch1 $FD, latch1 $FE]`.
    chr: [u8; 4],
    /// `false` = `$FD`, `true` = `$FE`.
    latch: [bool; 2],
}

impl Mapper9 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            mmc4: ctx.id == 10,
            chr: [0; 4],
            latch: [false, false],
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let low = self.chr[usize::from(self.latch[0])];
        let high = self.chr[2 + usize::from(self.latch[1])];
        hw.swap_chrs(SIZE_4K, 0x0000, &[u32::from(low), u32::from(high)]);
    }

    fn poke_prg(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        if board.mmc4 {
            hw.swap_prg(SIZE_16K, 0x8000, u32::from(data & 0x0F));
        } else {
            hw.swap_prg(SIZE_8K, 0x8000, u32::from(data & 0x0F));
        }
    }

    fn poke_chr(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let index = usize::from((addr >> 12) - 0xB);
        board.chr[index] = data & 0x1F;
        board.update_chr(hw);
    }

    fn poke_mirroring(_: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        hw.set_mirroring_vh(data);
    }

    fn latch_for(&self, addr: u16) -> Option<(usize, bool)> {
        let table = usize::from(addr >> 12 & 1);
        let tile = addr & 0x0FF8;
        let exact = table == 0 && !self.mmc4;
        let hit = |base: u16| if exact { addr & 0x1FFF == base } else { tile == (base & 0x0FF8) };
        if hit(0x0FD8 | (table as u16) << 12) {
            Some((table, false))
        } else if hit(0x0FE8 | (table as u16) << 12) {
            Some((table, true))
        } else {
            None
        }
    }
}

impl Board for Mapper9 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.chr = [0; 4];
            self.latch = [false, false];
            if self.mmc4 {
                hw.swap_prgs(SIZE_16K, 0x8000, &[0, LAST]);
            } else {
                hw.swap_prgs(SIZE_8K, 0x8000, &[0, LAST - 2, LAST - 1, LAST]);
            }
        }
        self.update_chr(hw);

        bus.map_poke(0xA000, 0xAFFF, Poke::Board(Self::poke_prg));
        bus.map_poke(0xB000, 0xEFFF, Poke::Board(Self::poke_chr));
        bus.map_poke(0xF000, 0xFFFF, Poke::Board(Self::poke_mirroring));
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        if addr >= 0x2000 {
            return;
        }
        let Some((table, value)) = self.latch_for(addr) else {
            return;
        };
        if self.latch[table] != value {
            self.latch[table] = value;
            self.update_chr(hw);
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write(&self.chr)
            .write8(u8::from(self.latch[0]) | u8::from(self.latch[1]) << 1);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.chr)?;
        let latch = loader.read8()?;
        self.latch = [latch & 1 != 0, latch & 2 != 0];
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.mmc4 { "MMC4" } else { "MMC2" })
    }
}
