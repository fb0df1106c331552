//! Konami VRC2 and VRC4 (21, 22, 23, 25).
//!
//! The four iNES numbers differ in which CPU address lines reach the
//! chip's A0/A1 inputs:
//!
//! | Mapper | A0 from       | A1 from       | Chip                     |
//! |--------|---------------|---------------|--------------------------|
//! | 21     | A1 or A6      | A2 or A7      | VRC4a/c                  |
//! | 22     | A1            | A0            | VRC2a (CHR bank >> 1)    |
//! | 23     | A0 or A2      | A1 or A3      | VRC4e/f (VRC2b: sub 3)   |
//! | 25     | A1 or A3      | A0 or A2      | VRC4b/d (VRC2c: sub 3)   |
//!
//! After decoding, registers sit at `$x000-$x003`:
//!
//! | Address         | Register                                            |
//! |-----------------|-----------------------------------------------------|
//! | `$8000`         | PRG bank 0                                          |
//! | `$9000`         | Mirroring (VRC2: 1 bit, VRC4: 2 bits)               |
//! | `$9002`         | VRC4: bit 1 PRG swap mode                           |
//! | `$A000`         | PRG bank 1 at `$A000`                               |
//! | `$B000-$E003`   | CHR 1 KiB banks, written as low/high nibble pairs   |
//! | `$F000-$F003`   | VRC4 IRQ: latch low/high, control, acknowledge      |

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware, VrcIrq},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chip {
    Vrc2,
    Vrc4,
}

#[derive(Debug, Clone)]
pub struct Mapper21 {
    chip: Chip,
    a0_mask: u16,
    a1_mask: u16,
    chr_shift: u8,
    prg: [u8; 2],
    chr: [u16; 8],
    prg_mode: bool,
    irq: VrcIrq,
}

impl Mapper21 {
    pub fn new(ctx: &mut Context) -> Self {
        let (a0_mask, a1_mask) = match ctx.id {
            21 => (0x02 | 0x40, 0x04 | 0x80),
            22 => (0x02, 0x01),
            23 => (0x01 | 0x04, 0x02 | 0x08),
            _ => (0x02 | 0x08, 0x01 | 0x04),
        };
        let chip = match (ctx.id, ctx.submapper) {
            (22, _) | (23 | 25, 3) => Chip::Vrc2,
            _ => Chip::Vrc4,
        };
        Self {
            chip,
            a0_mask,
            a1_mask,
            chr_shift: u8::from(ctx.id == 22),
            prg: [0; 2],
            chr: [0; 8],
            prg_mode: false,
            irq: VrcIrq::default(),
        }
    }

    /// Folds the board wiring down to `$x000-$x003`.
    fn decode(&self, addr: u16) -> u16 {
        let a0 = u16::from(addr & self.a0_mask != 0);
        let a1 = u16::from(addr & self.a1_mask != 0);
        (addr & 0xF000) | a1 << 1 | a0
    }

    fn update_prg(&self, hw: &mut Hardware) {
        let (r0, r1) = (u32::from(self.prg[0]), u32::from(self.prg[1]));
        if self.prg_mode {
            hw.swap_prgs(SIZE_8K, 0x8000, &[LAST - 1, r1, r0, LAST]);
        } else {
            hw.swap_prgs(SIZE_8K, 0x8000, &[r0, r1, LAST - 1, LAST]);
        }
    }

    fn update_chr(&self, hw: &mut Hardware, index: usize) {
        let bank = u32::from(self.chr[index] >> self.chr_shift);
        hw.swap_chr(SIZE_1K, (index * SIZE_1K) as u16, bank);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let reg = board.decode(addr);
        match (reg, board.chip) {
            (0x8000..=0x8003, _) => {
                board.prg[0] = data & 0x1F;
                board.update_prg(hw);
            }
            (0x9000..=0x9003, Chip::Vrc2) => hw.set_mirroring_vh(data),
            (0x9000 | 0x9001, Chip::Vrc4) => hw.set_mirroring_vh01(data),
            (0x9002, Chip::Vrc4) => {
                board.prg_mode = data & 0x02 != 0;
                board.update_prg(hw);
            }
            (0xA000..=0xA003, _) => {
                board.prg[1] = data & 0x1F;
                board.update_prg(hw);
            }
            (0xB000..=0xEFFF, _) => {
                let index = usize::from((reg >> 12) - 0xB) * 2 + usize::from(reg >> 1 & 1);
                let value = &mut board.chr[index];
                if reg & 1 == 0 {
                    *value = (*value & 0x1F0) | u16::from(data & 0x0F);
                } else {
                    *value = (*value & 0x00F) | u16::from(data & 0x1F) << 4;
                }
                board.update_chr(hw, index);
            }
            (0xF000, Chip::Vrc4) => board.irq.write_latch_low(data),
            (0xF001, Chip::Vrc4) => board.irq.write_latch_high(data),
            (0xF002, Chip::Vrc4) => board.irq.write_control(hw, data),
            (0xF003, Chip::Vrc4) => board.irq.acknowledge(hw),
            _ => {}
        }
    }
}

impl Board for Mapper21 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.prg = [0; 2];
            self.chr = [0; 8];
            self.prg_mode = false;
            self.irq.reset();
        }
        self.update_prg(hw);
        for index in 0..self.chr.len() {
            self.update_chr(hw, index);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if self.chip == Chip::Vrc4 {
            self.irq.clock(hw);
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.prg).write_bool(self.prg_mode);
        for &bank in &self.chr {
            saver.write16(bank);
        }
        self.irq.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.prg)?;
        self.prg_mode = loader.read_bool()?;
        for bank in &mut self.chr {
            *bank = loader.read16()? & 0x1FF;
        }
        self.irq.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.chip {
            Chip::Vrc2 => "VRC2",
            Chip::Vrc4 => "VRC4",
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn vrc4_prg_swap_mode() {
        let mut mapper = mapper(context(21, 256, 256));
        mapper.cpu_write(0x8000, 3);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 3);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);
        // $9004 is $9002 on VRC4a.
        mapper.cpu_write(0x9004, 0x02);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 30);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 3);
    }

    #[test]
    fn chr_nibbles_follow_board_wiring() {
        let mut mapper = mapper(context(25, 256, 256));
        // VRC4b: $B002 is the high nibble of bank 0, $B001 the low nibble of bank 1.
        mapper.cpu_write(0xB000, 0x05);
        mapper.cpu_write(0xB002, 0x03);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 0x35);
        mapper.cpu_write(0xB001, 0x07);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0400), 0x07);
    }

    #[test]
    fn vrc2a_drops_low_chr_bit() {
        let mut mapper = mapper(context(22, 256, 256));
        mapper.cpu_write(0xC000, 0x06);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0800), 3);
        mapper.cpu_write(0x9000, 1);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn vrc4_irq_in_cycle_mode() {
        let mut mapper = mapper(context(23, 256, 256));
        mapper.cpu_write(0xF000, 0x0E);
        mapper.cpu_write(0xF001, 0x0F);
        mapper.cpu_write(0xF002, 0x06);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        mapper.cpu_write(0xF003, 0);
        assert!(!mapper.irq_pending());
    }
}
