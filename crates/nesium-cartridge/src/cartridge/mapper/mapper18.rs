//! Jaleco SS88006 (18).
//!
//! Every bank register is written as two nibbles at adjacent addresses.
//!
//! | Address         | Register                                       |
//! |-----------------|------------------------------------------------|
//! | `$8000-$8003`   | PRG `$8000`, PRG `$A000` (low, high nibble)     |
//! | `$9000-$9001`   | PRG `$C000`                                     |
//! | `$9002`         | Work RAM: bit 0 enable, bit 1 write enable      |
//! | `$A000-$D003`   | CHR 1 KiB banks 0-7                             |
//! | `$E000-$E003`   | IRQ reload value, nibbles 0-3                   |
//! | `$F000`         | IRQ acknowledge + counter reload                |
//! | `$F001`         | IRQ control: bit 0 enable, bits 1-3 width       |
//! | `$F002`         | Mirroring (horizontal, vertical, lower, upper)  |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper18 {
    prg: [u8; 3],
    chr: [u8; 8],
    irq_reload: u16,
    irq_counter: u16,
    irq_control: u8,
}

fn set_nibble(value: u8, high: bool, data: u8) -> u8 {
    if high {
        (value & 0x0F) | (data & 0x0F) << 4
    } else {
        (value & 0xF0) | (data & 0x0F)
    }
}

impl Mapper18 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn counter_mask(&self) -> u16 {
        match self.irq_control {
            c if c & 0x08 != 0 => 0x000F,
            c if c & 0x04 != 0 => 0x00FF,
            c if c & 0x02 != 0 => 0x0FFF,
            _ => 0xFFFF,
        }
    }

    fn poke_prg(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let high = addr & 1 != 0;
        match addr & 0xF003 {
            0x8000 | 0x8001 => {
                board.prg[0] = set_nibble(board.prg[0], high, data);
                hw.swap_prg(SIZE_8K, 0x8000, u32::from(board.prg[0]));
            }
            0x8002 | 0x8003 => {
                board.prg[1] = set_nibble(board.prg[1], high, data);
                hw.swap_prg(SIZE_8K, 0xA000, u32::from(board.prg[1]));
            }
            0x9000 | 0x9001 => {
                board.prg[2] = set_nibble(board.prg[2], high, data);
                hw.swap_prg(SIZE_8K, 0xC000, u32::from(board.prg[2]));
            }
            0x9002 => hw.set_wrk_access(data & 1 != 0, data & 0b11 == 0b11),
            _ => {}
        }
    }

    fn poke_chr(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let index = usize::from((addr >> 12) - 0xA) * 2 + usize::from(addr >> 1 & 1);
        board.chr[index] = set_nibble(board.chr[index], addr & 1 != 0, data);
        hw.swap_chr(SIZE_1K, (index * SIZE_1K) as u16, u32::from(board.chr[index]));
    }

    fn poke_irq(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF003 {
            reg @ 0xE000..=0xE003 => {
                let shift = (reg & 3) * 4;
                board.irq_reload = (board.irq_reload & !(0x0F << shift)) | u16::from(data & 0x0F) << shift;
            }
            0xF000 => {
                board.irq_counter = board.irq_reload;
                hw.irq = false;
            }
            0xF001 => {
                board.irq_control = data & 0x0F;
                hw.irq = false;
            }
            0xF002 => hw.set_mirroring_hv01(data),
            _ => {}
        }
    }
}

impl Board for Mapper18 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.set_wrk_access(false, false);
        }
        bus.map_poke(0x8000, 0x9FFF, Poke::Board(Self::poke_prg));
        bus.map_poke(0xA000, 0xDFFF, Poke::Board(Self::poke_chr));
        bus.map_poke(0xE000, 0xFFFF, Poke::Board(Self::poke_irq));
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if self.irq_control & 1 == 0 {
            return;
        }
        let mask = self.counter_mask();
        let counter = (self.irq_counter & mask).wrapping_sub(1) & mask;
        self.irq_counter = (self.irq_counter & !mask) | counter;
        if counter == 0 {
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write(&self.prg)
            .write(&self.chr)
            .write16(self.irq_reload)
            .write16(self.irq_counter)
            .write8(self.irq_control);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.prg)?;
        loader.read(&mut self.chr)?;
        self.irq_reload = loader.read16()?;
        self.irq_counter = loader.read16()?;
        self.irq_control = loader.read8()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Jaleco SS88006")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn nibble_registers() {
        let mut mapper = mapper(context(18, 256, 256));
        mapper.cpu_write(0x8000, 0x5);
        mapper.cpu_write(0x8001, 0x1);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0x15);
        mapper.cpu_write(0xB002, 0xA);
        mapper.cpu_write(0xB003, 0x3);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0C00), 0x3A);
    }

    #[test]
    fn four_bit_counter_wraps_quickly() {
        let mut mapper = mapper(context(18, 256, 256));
        mapper.cpu_write(0xE000, 0x2);
        mapper.cpu_write(0xF000, 0);
        mapper.cpu_write(0xF001, 0x09);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
    }

    #[test]
    fn work_ram_needs_both_enable_bits_to_write() {
        let mut mapper = mapper(context(18, 256, 256));
        mapper.cpu_write(0x9002, 0x01);
        mapper.cpu_write(0x6000, 0x42);
        assert_eq!(mapper.cpu_read(0x6000), 0x00);
        mapper.cpu_write(0x9002, 0x03);
        mapper.cpu_write(0x6000, 0x42);
        assert_eq!(mapper.cpu_read(0x6000), 0x42);
    }
}
