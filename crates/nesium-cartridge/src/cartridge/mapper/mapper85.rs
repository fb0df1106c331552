//! Konami VRC7 (85).
//!
//! The register select line is A4 on VRC7a (Lagrange Point) and A3 on
//! VRC7b (Tiny Toon Adventures 2); both are honoured so either board
//! decodes without a submapper.
//!
//! | Address          | Register                                        |
//! |------------------|-------------------------------------------------|
//! | `$8000`          | PRG 8 KiB at `$8000`                            |
//! | `$8010`          | PRG 8 KiB at `$A000`                            |
//! | `$9000`          | PRG 8 KiB at `$C000`                            |
//! | `$A000-$D010`    | CHR 1 KiB R0-R7                                 |
//! | `$E000`          | Bits 0-1 mirroring, bit 7 work RAM enable       |
//! | `$E010`          | IRQ latch                                       |
//! | `$F000`          | IRQ control                                     |
//! | `$F010`          | IRQ acknowledge                                 |
//!
//! The FM synthesiser at `$9010/$9030` is out of scope.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_1K, SIZE_8K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware, VrcIrq},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default)]
pub struct Mapper85 {
    control: u8,
    irq: VrcIrq,
}

impl Mapper85 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update_control(&self, hw: &mut Hardware) {
        hw.set_mirroring_vh01(self.control);
        let wrk = self.control & 0x80 != 0;
        hw.set_wrk_access(wrk, wrk);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let high = addr & 0x18 != 0;
        match (addr & 0xF000, high) {
            (0x8000, false) => hw.swap_prg(SIZE_8K, 0x8000, u32::from(data & 0x3F)),
            (0x8000, true) => hw.swap_prg(SIZE_8K, 0xA000, u32::from(data & 0x3F)),
            (0x9000, false) => hw.swap_prg(SIZE_8K, 0xC000, u32::from(data & 0x3F)),
            (reg @ 0xA000..=0xD000, high) => {
                let index = ((reg >> 12) - 0xA) * 2 + u16::from(high);
                hw.swap_chr(SIZE_1K, index * SIZE_1K as u16, u32::from(data));
            }
            (0xE000, false) => {
                board.control = data;
                board.update_control(hw);
            }
            (0xE000, true) => board.irq.write_latch(data),
            (0xF000, false) => board.irq.write_control(hw, data),
            (0xF000, true) => board.irq.acknowledge(hw),
            _ => {}
        }
    }
}

impl Board for Mapper85 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.control = 0;
            self.irq.reset();
        }
        self.update_control(hw);
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        self.irq.clock(hw);
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.control);
        self.irq.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.control = loader.read8()?;
        self.irq.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("VRC7")
    }
}
