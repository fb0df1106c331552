//! Taito X1-005 (80, 207) and X1-017 (82).
//!
//! Both chips decode registers in `$7EF0-$7EFF` and carry their own
//! battery-backed RAM instead of a standard 8 KiB work RAM chip.
//!
//! X1-005:
//!
//! | Address        | Register                                        |
//! |----------------|-------------------------------------------------|
//! | `$7EF0/$7EF1`  | CHR 2 KiB at `$0000`, `$0800`                   |
//! | `$7EF2-$7EF5`  | CHR 1 KiB at `$1000-$1C00`                      |
//! | `$7EF6/$7EF7`  | Mirroring (0 horizontal)                        |
//! | `$7EF8/$7EF9`  | Internal RAM enable (`$A3`)                     |
//! | `$7EFA-$7EFF`  | PRG 8 KiB `$8000`, `$A000`, `$C000` (pairs)     |
//! | `$7F00-$7FFF`  | 128 bytes of internal RAM, mirrored             |
//!
//! On 207 the mirroring registers are unused: bit 7 of `$7EF0` and `$7EF1`
//! picks the CIRAM page for the top and bottom nametable pairs.
//!
//! X1-017 swaps the CHR halves with `$7EF6` bit 1, has three RAM enables
//! (`$CA`, `$69`, `$84`) over 5 KiB at `$6000-$73FF`, and takes PRG numbers
//! shifted left by two.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_2K, SIZE_8K, SourceId},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

const X1_005_RAM: usize = 0x80;
const X1_017_RAM: usize = 0x1400;
const X1_005_UNLOCK: u8 = 0xA3;
const X1_017_UNLOCK: [u8; 3] = [0xCA, 0x69, 0x84];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chip {
    X1005,
    X1017,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapper80 {
    chip: Chip,
    /// 207: nametables follow the 2 KiB CHR registers.
    chr_mirroring: bool,
    chr: [u8; 6],
    /// X1-017 CHR layout and mirroring control.
    control: u8,
    ram_enable: [u8; 3],
    ram: Box<[u8]>,
}

impl Mapper80 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        let chip = if ctx.id == 82 { Chip::X1017 } else { Chip::X1005 };
        let ram_len = match chip {
            Chip::X1005 => X1_005_RAM,
            Chip::X1017 => X1_017_RAM,
        };
        Self {
            chip,
            chr_mirroring: ctx.id == 207,
            chr: [0; 6],
            control: 0,
            ram_enable: [0; 3],
            ram: vec![0; ram_len].into_boxed_slice(),
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let r = self.chr.map(u32::from);
        let (two_k, one_k) = if self.chip == Chip::X1017 && self.control & 0x02 != 0 {
            (0x1000, 0x0000)
        } else {
            (0x0000, 0x1000)
        };
        let big = if self.chr_mirroring {
            [r[0] & 0x7F, r[1] & 0x7F]
        } else {
            [r[0], r[1]]
        };
        // 2 KiB registers hold 1 KiB bank numbers with the low bit ignored.
        hw.swap_chrs(SIZE_2K, two_k, &[big[0] >> 1, big[1] >> 1]);
        hw.swap_chrs(SIZE_1K, one_k, &[r[2], r[3], r[4], r[5]]);
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        for slot in 0..4u16 {
            let page = u32::from(self.chr[usize::from(slot >> 1)] >> 7);
            hw.swap_nmt(slot, SourceId::Ciram, page);
        }
    }

    /// Index into internal RAM for a CPU address, if the window there is
    /// unlocked.
    fn ram_index(&self, addr: u16) -> Option<usize> {
        match self.chip {
            Chip::X1005 => {
                (addr >= 0x7F00 && self.ram_enable[0] == X1_005_UNLOCK)
                    .then(|| usize::from(addr) & (X1_005_RAM - 1))
            }
            Chip::X1017 => {
                let offset = usize::from(addr.checked_sub(0x6000)?);
                let window = match offset {
                    0x0000..=0x07FF => 0,
                    0x0800..=0x0FFF => 1,
                    0x1000..=0x13FF => 2,
                    _ => return None,
                };
                (self.ram_enable[window] == X1_017_UNLOCK[window]).then_some(offset)
            }
        }
    }

    fn peek_ram(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        match board.ram_index(addr) {
            Some(index) => board.ram[index],
            None => hw.open_bus.sample(),
        }
    }

    fn poke_ram(board: &mut Self, _hw: &mut Hardware, addr: u16, data: u8) {
        if let Some(index) = board.ram_index(addr) {
            board.ram[index] = data;
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match (board.chip, addr) {
            (_, 0x7EF0..=0x7EF5) => {
                board.chr[usize::from(addr - 0x7EF0)] = data;
                board.update_chr(hw);
                if board.chr_mirroring && addr <= 0x7EF1 {
                    board.update_nmt(hw);
                }
            }
            (Chip::X1005, 0x7EF6 | 0x7EF7) if !board.chr_mirroring => hw.set_mirroring_hv(data),
            (Chip::X1005, 0x7EF8 | 0x7EF9) => board.ram_enable[0] = data,
            (Chip::X1005, 0x7EFA..=0x7EFF) => {
                let window = 0x8000 + ((addr - 0x7EFA) >> 1) * SIZE_8K as u16;
                hw.swap_prg(SIZE_8K, window, u32::from(data));
            }
            (Chip::X1017, 0x7EF6) => {
                board.control = data;
                hw.set_mirroring_hv(data);
                board.update_chr(hw);
            }
            (Chip::X1017, 0x7EF7..=0x7EF9) => board.ram_enable[usize::from(addr - 0x7EF7)] = data,
            (Chip::X1017, 0x7EFA..=0x7EFC) => {
                let window = 0x8000 + (addr - 0x7EFA) * SIZE_8K as u16;
                hw.swap_prg(SIZE_8K, window, u32::from(data >> 2));
            }
            _ => {}
        }
    }
}

impl Board for Mapper80 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.chr = [0; 6];
            self.control = 0;
            self.ram_enable = [0; 3];
        }
        self.update_chr(hw);
        if self.chr_mirroring {
            self.update_nmt(hw);
        }
        match self.chip {
            Chip::X1005 => {
                bus.map(0x7F00, 0x7FFF, Peek::Board(Self::peek_ram), Poke::Board(Self::poke_ram));
            }
            Chip::X1017 => {
                bus.map(0x6000, 0x73FF, Peek::Board(Self::peek_ram), Poke::Board(Self::poke_ram));
            }
        }
        bus.map_poke(0x7EF0, 0x7EFF, Poke::Board(Self::poke_register));
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write(&self.chr)
            .write8(self.control)
            .write(&self.ram_enable)
            .write(&self.ram);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.chr)?;
        self.control = loader.read8()?;
        loader.read(&mut self.ram_enable)?;
        loader.read(&mut self.ram)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.chip {
            Chip::X1005 if self.chr_mirroring => "Taito X1-005 (207)",
            Chip::X1005 => "Taito X1-005",
            Chip::X1017 => "Taito X1-017",
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn x1005_banks_and_mirroring() {
        let mut mapper = mapper(context(80, 128, 128));
        mapper.cpu_write(0x7EFA, 5);
        mapper.cpu_write(0x7EFD, 6);
        mapper.cpu_write(0x7EF0, 9);
        mapper.cpu_write(0x7EF5, 33);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 15);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 8);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0400), 9);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1C00), 33);
        mapper.cpu_write(0x7EF6, 1);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn x1005_ram_needs_unlock() {
        let mut mapper = mapper(context(80, 128, 128));
        mapper.cpu_write(0x7F10, 0x42);
        mapper.cpu_write(0x7EF8, 0xA3);
        assert_ne!(mapper.cpu_read(0x7F10), 0x42);
        mapper.cpu_write(0x7F10, 0x42);
        assert_eq!(mapper.cpu_read(0x7F90), 0x42);
    }

    #[test]
    fn x1017_inverts_chr_and_shifts_prg() {
        let mut mapper = mapper(context(82, 128, 128));
        mapper.cpu_write(0x7EFA, 3 << 2);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 3);
        mapper.cpu_write(0x7EF0, 4);
        mapper.cpu_write(0x7EF2, 20);
        mapper.cpu_write(0x7EF6, 0x02);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 4);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 20);

        mapper.cpu_write(0x7EF8, 0x69);
        mapper.cpu_write(0x6800, 0x11);
        mapper.cpu_write(0x6000, 0x22);
        assert_eq!(mapper.cpu_read(0x6800), 0x11);
        assert_ne!(mapper.cpu_read(0x6000), 0x22);
    }

    #[test]
    fn board_207_mirrors_from_chr_registers() {
        let mut mapper = mapper(context(207, 128, 128));
        mapper.cpu_write(0x7EF0, 0x80 | 0x0A);
        mapper.cpu_write(0x7EF1, 0x04);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0x0A);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0800), 0x04);

        mapper.ppu_write(0x2000, 0x11);
        mapper.ppu_write(0x2800, 0x22);
        assert_eq!(mapper.ppu_read(0x2400), 0x11);
        assert_eq!(mapper.ppu_read(0x2C00), 0x22);

        // $7EF6 does not touch the nametables here.
        mapper.cpu_write(0x7EF6, 0);
        assert_eq!(mapper.ppu_read(0x2400), 0x11);
    }
}
