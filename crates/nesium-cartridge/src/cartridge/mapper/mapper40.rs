//! NTDEC 2722 (40), the Super Mario Bros. 2 (J) conversion board.
//!
//! | Address         | Register                                  |
//! |-----------------|-------------------------------------------|
//! | `$8000-$9FFF`   | Stop the IRQ timer, acknowledge           |
//! | `$A000-$BFFF`   | Start the IRQ timer                       |
//! | `$E000-$FFFF`   | 8 KiB PRG bank at `$C000`                 |
//!
//! `$6000`, `$8000`, `$A000` and `$E000` show fixed banks 6, 4, 5 and 7.
//! The timer fires once, 4096 CPU cycles after it is started.

use std::borrow::Cow;

use crate::{
    banks::SIZE_8K,
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const IRQ_DELAY: u16 = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper40 {
    irq_counter: u16,
}

impl Mapper40 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xE000 {
            0x8000 => {
                board.irq_counter = 0;
                hw.irq = false;
            }
            0xA000 => board.irq_counter = IRQ_DELAY,
            0xE000 => hw.swap_prg(SIZE_8K, 0xC000, u32::from(data)),
            _ => {}
        }
    }
}

impl Board for Mapper40 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prgs(SIZE_8K, 0x8000, &[4, 5, 0, 7]);
        }
        hw.swap_wrk_prg(6);
        hw.set_wrk_access(true, false);
        bus.map_peek(cpu_mem::PRG_RAM_START, cpu_mem::PRG_RAM_END, Peek::Wrk);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if self.irq_counter == 0 {
            return;
        }
        self.irq_counter -= 1;
        if self.irq_counter == 0 {
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_counter = loader.read16()?.min(IRQ_DELAY);
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("NTDEC 2722")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn fixed_banks_and_switchable_c000() {
        let mut mapper = mapper(context(40, 64, 8));
        assert_eq!(prg_bank(mapper.as_mut(), 0x6000), 6);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 7);
        assert!(mapper.prg_ram().is_none());

        mapper.cpu_write(0xE000, 2);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 2);
        // ROM at $6000 ignores writes.
        mapper.cpu_write(0x6000, 0xAA);
        assert_eq!(prg_bank(mapper.as_mut(), 0x6000), 6);
    }

    #[test]
    fn timer_fires_after_4096_cycles() {
        let mut mapper = mapper(context(40, 64, 8));
        mapper.cpu_write(0xA000, 0);
        for _ in 0..4095 {
            mapper.clock_cpu();
        }
        assert!(!mapper.irq_pending());
        mapper.clock_cpu();
        assert!(mapper.irq_pending());
        for _ in 0..8192 {
            mapper.clock_cpu();
        }
        assert!(mapper.irq_pending());

        mapper.cpu_write(0x8000, 0);
        assert!(!mapper.irq_pending());
    }
}
