//! N-32 conversion of Super Mario Bros. 2 (J), PCB 761214 (50).
//!
//! Registers sit in `$4020-$5FFF` and decode with mask `$4120`:
//!
//! | Address | Register                                              |
//! |---------|-------------------------------------------------------|
//! | `$4020` | `....hllm`: 8 KiB PRG bank `hmll` at `$C000`          |
//! | `$4120` | Bit 0: IRQ enable; clearing resets and acknowledges   |
//!
//! `$6000`, `$8000`, `$A000` and `$E000` hold banks 15, 8, 9 and 11. The IRQ
//! fires once, 4096 CPU cycles after it is enabled.

use std::borrow::Cow;

use crate::{
    banks::SIZE_8K,
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

const IRQ_DELAY: u16 = 0x1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper50 {
    irq_enabled: bool,
    irq_counter: u16,
}

impl Mapper50 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self::default()
    }

    /// Undoes the board's address-line wiring: `....hllm` becomes `hmll`.
    fn prg_bank(data: u8) -> u32 {
        u32::from((data & 0x08) | (data & 0x01) << 2 | (data >> 1 & 0x03))
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0x4120 {
            0x4020 => hw.swap_prg(SIZE_8K, 0xC000, Self::prg_bank(data)),
            0x4120 => {
                board.irq_enabled = data & 0x01 != 0;
                if !board.irq_enabled {
                    board.irq_counter = 0;
                    hw.irq = false;
                }
            }
            _ => {}
        }
    }
}

impl Board for Mapper50 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::default();
            hw.swap_prgs(SIZE_8K, 0x8000, &[8, 9, 0, 11]);
        }
        hw.swap_wrk_prg(15);
        hw.set_wrk_access(true, false);
        bus.map_peek(cpu_mem::PRG_RAM_START, cpu_mem::PRG_RAM_END, Peek::Wrk);
        bus.map_poke(
            cpu_mem::CARTRIDGE_SPACE_BASE,
            cpu_mem::EXPANSION_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        self.irq_counter += 1;
        if self.irq_counter >= IRQ_DELAY {
            hw.irq = true;
            self.irq_enabled = false;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(u8::from(self.irq_enabled)).write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.irq_enabled = loader.read8()? != 0;
        self.irq_counter = loader.read16()?.min(IRQ_DELAY);
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("N-32 (761214)")
    }
}
