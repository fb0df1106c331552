//! FDS conversion boards (42): Ai Senshi Nicol, Bio Miracle Bokutte Upa.
//!
//! | Address (mask `$E003`) | Register                                  |
//! |------------------------|-------------------------------------------|
//! | `$8000`                | 8 KiB CHR ROM bank                        |
//! | `$E000`                | 8 KiB PRG bank at `$6000`                 |
//! | `$E001`                | Bit 3: horizontal mirroring               |
//! | `$E002`                | Bit 1: IRQ enable; clearing resets it     |
//!
//! `$8000-$FFFF` shows the last 32 KiB. The IRQ counter is 15 bits wide,
//! counts CPU cycles while enabled, and holds the line while it is at or
//! above `$6000`.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_8K, SIZE_32K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const IRQ_COUNTER_MASK: u16 = 0x7FFF;
const IRQ_THRESHOLD: u16 = 0x6000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper42 {
    irq_enabled: bool,
    irq_counter: u16,
}

impl Mapper42 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE003 {
            0x8000 => {
                if hw.chr_ram_source().is_none() {
                    hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x0F));
                }
            }
            0xE000 => hw.swap_wrk_prg(u32::from(data & 0x0F)),
            0xE001 => hw.set_mirroring_vh(data >> 3),
            0xE002 => {
                board.irq_enabled = data & 0x02 != 0;
                if !board.irq_enabled {
                    board.irq_counter = 0;
                    hw.irq = false;
                }
            }
            _ => {}
        }
    }
}

impl Board for Mapper42 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prg(SIZE_32K, 0x8000, LAST);
            hw.swap_wrk_prg(0);
        }
        hw.set_wrk_access(true, false);
        bus.map_peek(cpu_mem::PRG_RAM_START, cpu_mem::PRG_RAM_END, Peek::Wrk);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        self.irq_counter = (self.irq_counter + 1) & IRQ_COUNTER_MASK;
        hw.irq = self.irq_counter >= IRQ_THRESHOLD;
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(u8::from(self.irq_enabled)).write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_enabled = loader.read8()? != 0;
        self.irq_counter = loader.read16()? & IRQ_COUNTER_MASK;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("FDS conversion (42)")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{header::Mirroring, mapper::test_support::*};

    #[test]
    fn banks_and_mirroring() {
        let mut mapper = mapper(context(42, 128, 128));
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 12);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 15);

        mapper.cpu_write(0xE000, 9);
        mapper.cpu_write(0x8000, 3);
        mapper.cpu_write(0xE001, 0x08);
        assert_eq!(prg_bank(mapper.as_mut(), 0x6000), 9);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 24);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn irq_holds_above_threshold_until_disabled() {
        let mut mapper = mapper(context(42, 128, 128));
        mapper.cpu_write(0xE002, 0x02);
        for _ in 0..0x5FFF {
            mapper.clock_cpu();
        }
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        // Wrapping past $7FFF drops the line again.
        for _ in 0..0x2000 {
            mapper.clock_cpu();
        }
        assert!(!mapper.irq_pending());

        mapper.cpu_write(0xE002, 0x00);
        mapper.clock_cpu();
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn chr_ram_board_ignores_chr_writes() {
        let mut mapper = mapper(context(42, 128, 0));
        mapper.ppu_write(0x0000, 0x5A);
        mapper.cpu_write(0x8000, 3);
        assert_eq!(mapper.ppu_read(0x0000), 0x5A);
    }
}
