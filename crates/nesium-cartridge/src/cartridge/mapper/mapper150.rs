//! Sachen 74LS374N boards: SA-015/SA-630 (150) and SA-020A (243).
//!
//! `$4100` (mask `$C101`) selects one of eight 3-bit registers, `$4101`
//! writes it and reads it back in the low three bits.
//!
//! | Reg | 150                  | 243                  |
//! |-----|----------------------|----------------------|
//! | 2   | -                    | CHR bit 0            |
//! | 4   | CHR bit 2            | CHR bit 1            |
//! | 5   | 32 KiB PRG bank      | 32 KiB PRG bank      |
//! | 6   | CHR bits 0-1         | CHR bits 2-3         |
//! | 7   | Mirroring, bits 1-2  | Mirroring, bits 1-2  |
//!
//! Mirroring values: 0 uses the lower page except for the last nametable,
//! then horizontal, vertical and single upper.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_8K, SIZE_32K, SourceId},
    bus::{Bus, Peek, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Sa015,
    Sa020a,
}

#[derive(Debug, Clone)]
pub struct Mapper150 {
    variant: Variant,
    select: u8,
    regs: [u8; 8],
}

impl Mapper150 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        Self {
            variant: if ctx.id == 243 { Variant::Sa020a } else { Variant::Sa015 },
            select: 0,
            regs: [0; 8],
        }
    }

    fn chr_bank(&self) -> u32 {
        let r = self.regs.map(u32::from);
        match self.variant {
            Variant::Sa015 => (r[4] & 1) << 2 | (r[6] & 3),
            Variant::Sa020a => (r[2] & 1) | (r[4] & 1) << 1 | (r[6] & 3) << 2,
        }
    }

    fn update(&self, hw: &mut Hardware) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(self.regs[5] & 0x03));
        hw.swap_chr(SIZE_8K, 0x0000, self.chr_bank());
        match self.regs[7] >> 1 & 0x03 {
            0 => {
                for (slot, page) in [0, 0, 0, 1].into_iter().enumerate() {
                    hw.swap_nmt(slot as u16, SourceId::Ciram, page);
                }
            }
            1 => hw.set_mirroring_vh(1),
            2 => hw.set_mirroring_vh(0),
            _ => hw.set_mirroring_single(true),
        }
    }

    fn peek_register(board: &mut Self, hw: &mut Hardware, _addr: u16) -> u8 {
        hw.open_bus
            .apply_masked(!0x07, board.regs[usize::from(board.select)])
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let value = data & 0x07;
        if addr & 1 == 0 {
            board.select = value;
        } else {
            board.regs[usize::from(board.select)] = value;
            board.update(hw);
        }
    }
}

impl Board for Mapper150 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.select = 0;
            self.regs = [0; 8];
        }
        self.update(hw);
        bus.map_poke_masked(
            cpu_mem::EXPANSION_START,
            cpu_mem::PRG_RAM_END,
            0xC100,
            0x4100,
            Poke::Board(Self::poke_register),
        );
        bus.map_peek_masked(
            cpu_mem::EXPANSION_START,
            cpu_mem::EXPANSION_END,
            0xC101,
            0x4101,
            Peek::Board(Self::peek_register),
        );
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.select).write(&self.regs);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.select = loader.read8()? & 0x07;
        loader.read(&mut self.regs)?;
        for reg in self.regs.iter_mut() {
            *reg &= 0x07;
        }
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Sa015 => "Sachen SA-015",
            Variant::Sa020a => "Sachen SA-020A",
        })
    }
}
