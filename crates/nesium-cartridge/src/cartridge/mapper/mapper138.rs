//! Sachen 8259 A/B/C (141, 138, 139).
//!
//! `$4100` (mask `$C101`) selects a register and `$4101` writes it:
//!
//! | Reg | Meaning                                                  |
//! |-----|----------------------------------------------------------|
//! | 0-3 | Inner CHR bank for the 2 KiB windows at `$0000-$1800`    |
//! | 4   | Outer CHR bank                                           |
//! | 5   | 32 KiB PRG bank                                          |
//! | 7   | `.....mms`: mirroring and simple mode                    |
//!
//! The boards differ in how the 2 KiB CHR bank is wired from the registers:
//! 8259B uses `outer:inner` as is, 8259A shifts it left once and 8259C twice,
//! filling the freed low bits from the window number. In simple mode every
//! window uses register 0 and mirroring is vertical.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_2K, SIZE_32K, SourceId},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    A,
    B,
    C,
}

impl Variant {
    fn shift(self) -> u32 {
        match self {
            Variant::A => 1,
            Variant::B => 0,
            Variant::C => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mapper138 {
    variant: Variant,
    select: u8,
    regs: [u8; 8],
}

impl Mapper138 {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.drop_auto_wrk();
        let variant = match ctx.id {
            141 => Variant::A,
            139 => Variant::C,
            _ => Variant::B,
        };
        Self {
            variant,
            select: 0,
            regs: [0; 8],
        }
    }

    fn simple(&self) -> bool {
        self.regs[7] & 1 != 0
    }

    fn update(&self, hw: &mut Hardware) {
        hw.swap_prg(SIZE_32K, 0x8000, u32::from(self.regs[5] & 0x07));

        let shift = self.variant.shift();
        let low_mask = (1u32 << shift) - 1;
        let outer = u32::from(self.regs[4] & 0x07) << 3;
        let banks: [u32; 4] = std::array::from_fn(|window| {
            let inner = if self.simple() { self.regs[0] } else { self.regs[window] };
            (outer | u32::from(inner & 0x07)) << shift | (window as u32 & low_mask)
        });
        hw.swap_chrs(SIZE_2K, 0x0000, &banks);

        let mirroring = if self.simple() { 0 } else { self.regs[7] >> 1 & 0x03 };
        match mirroring {
            0 => hw.set_mirroring_vh(0),
            1 => hw.set_mirroring_vh(1),
            2 => {
                for (slot, page) in [0, 1, 1, 1].into_iter().enumerate() {
                    hw.swap_nmt(slot as u16, SourceId::Ciram, page);
                }
            }
            _ => hw.set_mirroring_single(false),
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if addr & 1 == 0 {
            board.select = data & 0x07;
        } else {
            board.regs[usize::from(board.select)] = data;
            board.update(hw);
        }
    }
}

impl Board for Mapper138 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.select = 0;
            self.regs = [0; 8];
        }
        self.update(hw);
        bus.map_poke_masked(0x4100, 0x7FFF, 0xC100, 0x4100, Poke::Board(Self::poke_register));
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.select).write(&self.regs);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.select = loader.read8()? & 0x07;
        loader.read(&mut self.regs)?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::A => "Sachen 8259A",
            Variant::B => "Sachen 8259B",
            Variant::C => "Sachen 8259C",
        })
    }
}
