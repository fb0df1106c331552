//! Large pirate multicarts: 225 (ET-4310 / K-1010, "52 Games", "64-in-1")
//! and 226 (76-in-1 / 42-in-1).
//!
//! Mapper 225 latches the write address:
//!
//! ```text
//! A~[.HMO PPPP PPCC CCCC]
//!     |||| |||| ||++-++++- CHR 8 KiB (H is bit 6)
//!     |||+-++++-++-------- PRG (H is bit 6)
//!     ||+----------------- 1: 16 KiB mode, 0: 32 KiB (PRG >> 1)
//!     |+------------------ 0 vertical, 1 horizontal
//!     +------------------- outer 2 MiB half
//! ```
//!
//! It also carries four nibbles of RAM at `$5800-$5FFF`.
//!
//! Mapper 226 latches data into two registers picked by A0:
//!
//! ```text
//! $8000: [PMOP PPPP]   $8001: [.... ...H]
//!         |||+-++++- PRG bits 0-4       +- PRG bit 6
//!         ||+------- 1: 16 KiB mode
//!         |+-------- 0 horizontal, 1 vertical
//!         +--------- PRG bit 5
//! ```

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper225 {
    address_latch: bool,
    regs: [u8; 2],
    ram: [u8; 4],
}

impl Mapper225 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            address_latch: ctx.id == 225,
            regs: [0; 2],
            ram: [0; 4],
        }
    }

    fn swap_prg(hw: &mut Hardware, bank: u32, mode_16k: bool) {
        if mode_16k {
            hw.swap_prgs(SIZE_16K, 0x8000, &[bank, bank]);
        } else {
            hw.swap_prg(SIZE_32K, 0x8000, bank >> 1);
        }
    }

    fn latch_address(hw: &mut Hardware, addr: u16) {
        let high = addr >> 8 & 0x40;
        let prg = addr >> 6 & 0x3F | high;
        Self::swap_prg(hw, u32::from(prg), addr & 0x1000 != 0);
        hw.swap_chr(SIZE_8K, 0x0000, u32::from(addr & 0x3F | high));
        hw.set_mirroring_vh((addr >> 13) as u8);
    }

    fn update_regs(&self, hw: &mut Hardware) {
        let [r0, r1] = self.regs;
        let prg = r0 & 0x1F | (r0 & 0x80) >> 2 | (r1 & 0x01) << 6;
        Self::swap_prg(hw, u32::from(prg), r0 & 0x20 != 0);
        hw.set_mirroring_hv(r0 >> 6);
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if board.address_latch {
            Self::latch_address(hw, addr);
        } else {
            board.regs[usize::from(addr & 1)] = data;
            board.update_regs(hw);
        }
    }

    fn peek_ram(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        hw.open_bus.apply_masked(0xF0, board.ram[usize::from(addr & 3)])
    }

    fn poke_ram(board: &mut Self, _hw: &mut Hardware, addr: u16, data: u8) {
        board.ram[usize::from(addr & 3)] = data & 0x0F;
    }
}

impl Board for Mapper225 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.regs = [0; 2];
            self.ram = [0; 4];
        }
        if self.address_latch {
            if hard {
                Self::latch_address(hw, cpu_mem::PRG_ROM_START);
            }
            bus.map(0x5800, cpu_mem::EXPANSION_END, Peek::Board(Self::peek_ram), Poke::Board(Self::poke_ram));
        } else {
            self.update_regs(hw);
        }
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.regs).write(&self.ram);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.regs)?;
        loader.read(&mut self.ram)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.address_latch { "ET-4310" } else { "76-in-1" })
    }
}
