//! TXC 01-22000-400 (36), used by Strike Wolf and Policeman.
//!
//! | Address (mask)     | Register                                         |
//! |--------------------|--------------------------------------------------|
//! | `$4100` (`$E103`)  | Update the output latch from staging or +1       |
//! | `$4101` (`$E103`)  | Bit 4: invert staging when copying               |
//! | `$4102` (`$E103`)  | Bits 4-5: staging value                          |
//! | `$4103` (`$E103`)  | Bit 4: increment mode                            |
//! | `$4200` (`$E200`)  | 8 KiB CHR bank                                   |
//! | `$4100` read       | Output latch in bits 4-5                         |
//! | `$8000-$FFFF`      | Copy the output latch to the 32 KiB PRG bank     |

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper36 {
    invert: bool,
    increment: bool,
    staging: u8,
    output: u8,
}

impl Mapper36 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn peek_latch(board: &mut Self, hw: &mut Hardware, _addr: u16) -> u8 {
        hw.open_bus.apply_masked(!0x30, board.output << 4)
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            hw.swap_prg(SIZE_32K, 0x8000, u32::from(board.output));
            return;
        }
        if addr & 0xE200 == 0x4200 {
            hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x0F));
            return;
        }
        match addr & 0xE103 {
            0x4100 => {
                board.output = if board.increment {
                    board.output.wrapping_add(1) & 0x03
                } else if board.invert {
                    !board.staging & 0x03
                } else {
                    board.staging
                };
            }
            0x4101 => board.invert = data & 0x10 != 0,
            0x4102 => board.staging = data >> 4 & 0x03,
            0x4103 => board.increment = data & 0x10 != 0,
            _ => {}
        }
    }
}

impl Board for Mapper36 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        bus.map_poke(
            cpu_mem::EXPANSION_START,
            cpu_mem::EXPANSION_END,
            Poke::Board(Self::poke_register),
        );
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
        bus.map_peek_masked(
            cpu_mem::EXPANSION_START,
            cpu_mem::EXPANSION_END,
            0xE100,
            0x4100,
            Peek::Board(Self::peek_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(u8::from(self.invert))
            .write8(u8::from(self.increment))
            .write8(self.staging)
            .write8(self.output);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.invert = loader.read8()? != 0;
        self.increment = loader.read8()? != 0;
        self.staging = loader.read8()? & 0x03;
        self.output = loader.read8()? & 0x03;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("TXC 01-22000-400")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn staged_value_reaches_prg_on_rom_write() {
        let mut mapper = mapper(context(36, 128, 128));
        mapper.cpu_write(0x4102, 0x20);
        mapper.cpu_write(0x4100, 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
        assert_eq!(mapper.cpu_read(0x4100) & 0x30, 0x20);
        mapper.cpu_write(0x8000, 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);

        // Inverted copy.
        mapper.cpu_write(0x4101, 0x10);
        mapper.cpu_write(0x4100, 0);
        mapper.cpu_write(0xFFFF, 0);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
    }

    #[test]
    fn increment_mode_counts() {
        let mut mapper = mapper(context(36, 128, 128));
        mapper.cpu_write(0x4103, 0x10);
        mapper.cpu_write(0x4100, 0);
        mapper.cpu_write(0x4100, 0);
        assert_eq!(mapper.cpu_read(0x4100) & 0x30, 0x20);
        for _ in 0..2 {
            mapper.cpu_write(0x4100, 0);
        }
        assert_eq!(mapper.cpu_read(0x4100) & 0x30, 0x00);
    }

    #[test]
    fn chr_register() {
        let mut mapper = mapper(context(36, 128, 128));
        mapper.cpu_write(0x4200, 0x0B);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 88);
    }
}
