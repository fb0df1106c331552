//! Front Fareast copier boards (6, 8, 17).
//!
//! | Address         | Register                                           |
//! |-----------------|----------------------------------------------------|
//! | `$42FE`         | Bit 4 single screen A/B; bit 7 clear is alt mode (6) |
//! | `$42FF`         | Bit 4 vertical/horizontal mirroring                |
//! | `$4501`         | IRQ disable, acknowledges                          |
//! | `$4502/$4503`   | IRQ counter low/high; high enables, both acknowledge |
//! | `$4504-$4507`   | 8 KiB PRG banks (17)                               |
//! | `$4510-$4517`   | 1 KiB CHR banks (17)                               |
//! | `$8000-$FFFF`   | Combined PRG/CHR latch (6, 8)                      |
//!
//! The IRQ counter climbs once per CPU cycle and fires once on wrapping
//! past `$FFFF`, which also stops it.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K, SIZE_16K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    /// F4xxx: 16 KiB PRG and 8 KiB CHR through one latch.
    Ffe6,
    /// F3xxx: wider PRG field.
    Ffe8,
    /// F8xxx: separate 8 KiB PRG and 1 KiB CHR registers.
    Ffe17,
}

#[derive(Debug, Clone)]
pub struct Mapper6 {
    variant: Variant,
    chr_ram: bool,
    alt_mode: bool,
    irq_enabled: bool,
    irq_counter: u16,
}

impl Mapper6 {
    pub fn new(ctx: &mut Context) -> Self {
        let variant = match ctx.id {
            8 => Variant::Ffe8,
            17 => Variant::Ffe17,
            _ => Variant::Ffe6,
        };
        let chr_ram = ctx.chr.is_empty();
        if chr_ram {
            ctx.chr_ram = ctx.chr_ram.max(SIZE_32K);
        }
        Self {
            variant,
            chr_ram,
            alt_mode: true,
            irq_enabled: false,
            irq_counter: 0,
        }
    }

    fn poke_control(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        match addr {
            0x42FE => {
                if board.variant == Variant::Ffe6 {
                    board.alt_mode = data & 0x80 == 0;
                }
                hw.set_mirroring_single(data & 0x10 != 0);
            }
            0x42FF => hw.set_mirroring_vh(data >> 4),
            0x4501 => {
                board.irq_enabled = false;
                hw.irq = false;
            }
            0x4502 => {
                board.irq_counter = board.irq_counter & 0xFF00 | u16::from(data);
                hw.irq = false;
            }
            0x4503 => {
                board.irq_counter = board.irq_counter & 0x00FF | u16::from(data) << 8;
                board.irq_enabled = true;
                hw.irq = false;
            }
            0x4504..=0x4507 if board.variant == Variant::Ffe17 => {
                hw.swap_prg(SIZE_8K, 0x8000 + (addr & 3) * SIZE_8K as u16, u32::from(data));
            }
            0x4510..=0x4517 if board.variant == Variant::Ffe17 => {
                hw.swap_chr(SIZE_1K, (addr & 7) * SIZE_1K as u16, u32::from(data));
            }
            _ => {}
        }
    }

    fn poke_latch(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        match board.variant {
            Variant::Ffe6 if board.chr_ram || board.alt_mode => {
                hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 2));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x03));
            }
            Variant::Ffe6 => hw.swap_chr(SIZE_8K, 0x0000, u32::from(data)),
            Variant::Ffe8 => {
                hw.swap_prg(SIZE_16K, 0x8000, u32::from(data >> 3));
                hw.swap_chr(SIZE_8K, 0x0000, u32::from(data & 0x07));
            }
            Variant::Ffe17 => {}
        }
    }
}

impl Board for Mapper6 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.alt_mode = true;
            self.irq_enabled = false;
            self.irq_counter = 0;
            match self.variant {
                Variant::Ffe17 => hw.swap_prg(SIZE_32K, 0x8000, LAST),
                _ => hw.swap_prgs(SIZE_16K, 0x8000, &[0, LAST]),
            }
        }
        bus.map_poke(0x42FE, 0x42FF, Poke::Board(Self::poke_control));
        bus.map_poke(0x4501, 0x4503, Poke::Board(Self::poke_control));
        if self.variant == Variant::Ffe17 {
            bus.map_poke(0x4504, 0x4507, Poke::Board(Self::poke_control));
            bus.map_poke(0x4510, 0x4517, Poke::Board(Self::poke_control));
        } else {
            bus.map_poke(
                cpu_mem::PRG_ROM_START,
                cpu_mem::CPU_ADDR_END,
                Poke::Board(Self::poke_latch),
            );
        }
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        self.irq_counter = self.irq_counter.wrapping_add(1);
        if self.irq_counter == 0 {
            self.irq_enabled = false;
            hw.irq = true;
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write_bool(self.alt_mode)
            .write_bool(self.irq_enabled)
            .write16(self.irq_counter);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.alt_mode = loader.read_bool()?;
        self.irq_enabled = loader.read_bool()?;
        self.irq_counter = loader.read16()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Ffe6 => "FFE F4xxx",
            Variant::Ffe8 => "FFE F3xxx",
            Variant::Ffe17 => "FFE F8xxx",
        })
    }
}
