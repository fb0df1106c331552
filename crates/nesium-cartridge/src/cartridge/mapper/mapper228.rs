//! Mapper 228 – Active Enterprises (Action 52 / Cheetahmen II).
//!
//! Any write to `$8000-$FFFF` latches both address and data:
//!
//! ```text
//! A~[..MH HPPP PPO. CCCC]   D~[.... ..cc]
//!      ||| |||| ||  ++++-------------++- CHR 8 KiB = CCCCcc
//!      ||| |||| |+---------------------- 1: 16 KiB mode, 0: 32 KiB
//!      ||+-++++-+----------------------- PRG 16 KiB bank within the chip
//!      |++------------------------------ PRG chip (chip 3 reads as chip 2)
//!      +-------------------------------- 0 vertical, 1 horizontal
//! ```
//!
//! `$4020-$5FFF` holds four nibbles of RAM, mirrored.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default)]
pub struct Mapper228 {
    ram: [u8; 4],
}

impl Mapper228 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn latch(hw: &mut Hardware, addr: u16, data: u8) {
        // Only three 512 KiB chips exist.
        let mut page = u32::from(addr >> 7 & 0x3F);
        if page & 0x30 == 0x30 {
            page -= 0x10;
        }
        let bit5 = u32::from(addr >> 5 & 1);
        let bit6 = u32::from(addr >> 6 & 1);
        let low = (page << 1) + (bit6 & bit5);
        hw.swap_prgs(SIZE_16K, 0x8000, &[low, low + (bit5 ^ 1)]);

        let chr = u32::from(data & 0x03) | u32::from(addr & 0x0F) << 2;
        hw.swap_chr(SIZE_8K, 0x0000, chr);
        hw.set_mirroring_vh((addr >> 13) as u8);
    }

    fn poke_latch(_: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        Self::latch(hw, addr, data);
    }

    fn peek_ram(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        hw.open_bus.apply_masked(0xF0, board.ram[usize::from(addr & 3)])
    }

    fn poke_ram(board: &mut Self, _hw: &mut Hardware, addr: u16, data: u8) {
        board.ram[usize::from(addr & 3)] = data & 0x0F;
    }
}

impl Board for Mapper228 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        // The menu comes back on every reset.
        self.ram = [0; 4];
        Self::latch(hw, cpu_mem::PRG_ROM_START, 0);
        bus.map(
            cpu_mem::CARTRIDGE_SPACE_BASE,
            cpu_mem::EXPANSION_END,
            Peek::Board(Self::peek_ram),
            Poke::Board(Self::poke_ram),
        );
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_latch),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.ram);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.ram)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Action 52 / Cheetahmen II")
    }
}
