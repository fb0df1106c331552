//! J.Y. Company ASIC (90, 209, 211).
//!
//! | Address         | Register                                             |
//! |-----------------|------------------------------------------------------|
//! | `$5800/$5801`   | 8×8 multiplier operands; product low/high on read    |
//! | `$8000-$8003`   | PRG banks                                            |
//! | `$9000-$9007`   | CHR banks, low byte                                  |
//! | `$A000-$A007`   | CHR banks, high byte                                 |
//! | `$B000-$B003`   | Nametable banks, low byte                            |
//! | `$B004-$B007`   | Nametable banks, high byte                           |
//! | `$C000`         | Bit 0 enables the IRQ; clear acknowledges            |
//! | `$C001`         | IRQ mode `dd...pss`: direction, prescaler, source    |
//! | `$C002/$C003`   | IRQ disable (acknowledges) / enable                  |
//! | `$C004/$C005`   | Prescaler / counter, XORed with `$C006`              |
//! | `$D000`         | Mode `xnnccppp`: ROM at `$6000`, nametables, CHR, PRG |
//! | `$D001`         | Mirroring (V, H, single A, single B)                 |
//! | `$D002`         | Bit 7 is the CIRAM select value for ROM nametables   |
//!
//! PRG mode bit 2 frees the last window; mode 3 reads the PRG registers
//! with their low seven bits reversed. Board 90 ignores the nametable
//! registers, 209 enables them through `$D000` and 211 always uses them.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_2K, SIZE_4K, SIZE_8K, SIZE_16K, SIZE_32K, SourceId},
    bus::{Bus, Peek, Poke},
    cartridge::{
        a12_watcher::{A12StateChange, A12Watcher},
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    /// Nametable registers are not wired.
    Jy90,
    /// ROM nametables follow `$D000` bit 5.
    Jy209,
    /// ROM nametables are always on.
    Jy211,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IrqSource {
    CpuCycle,
    PpuA12,
    PpuRead,
    CpuWrite,
}

impl IrqSource {
    fn from_mode(mode: u8) -> Self {
        match mode & 0x03 {
            0 => Self::CpuCycle,
            1 => Self::PpuA12,
            2 => Self::PpuRead,
            _ => Self::CpuWrite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mapper90 {
    variant: Variant,
    prg: [u8; 4],
    chr: [u16; 8],
    nmt: [u16; 4],
    mode: u8,
    mirroring: u8,
    ciram_select: bool,
    irq_enabled: bool,
    irq_mode: u8,
    irq_prescaler: u8,
    irq_counter: u8,
    irq_xor: u8,
    multiplicand: u8,
    multiplier: u8,
    a12: A12Watcher,
}

impl Mapper90 {
    pub fn new(ctx: &mut Context) -> Self {
        Self::power_on(match ctx.id {
            209 => Variant::Jy209,
            211 => Variant::Jy211,
            _ => Variant::Jy90,
        })
    }

    fn power_on(variant: Variant) -> Self {
        Self {
            variant,
            prg: [0, 1, 2, 3],
            chr: [0, 1, 2, 3, 4, 5, 6, 7],
            nmt: [0; 4],
            mode: 0,
            mirroring: 0,
            ciram_select: false,
            irq_enabled: false,
            irq_mode: 0,
            irq_prescaler: 0,
            irq_counter: 0,
            irq_xor: 0,
            multiplicand: 0,
            multiplier: 0,
            a12: A12Watcher::new(),
        }
    }

    /// PRG register `index` as the current mode reads it.
    fn prg_reg(&self, index: usize) -> u32 {
        let reg = self.prg[index];
        let reg = if self.mode & 0x03 == 3 { reverse7(reg) } else { reg & 0x7F };
        u32::from(reg)
    }

    fn update_prg(&self, hw: &mut Hardware) {
        let last_free = self.mode & 0x04 != 0;
        let r3 = self.prg_reg(3);
        match self.mode & 0x03 {
            0 => hw.swap_prg(SIZE_32K, 0x8000, if last_free { r3 } else { LAST }),
            1 => {
                hw.swap_prg(SIZE_16K, 0x8000, self.prg_reg(1));
                hw.swap_prg(SIZE_16K, 0xC000, if last_free { r3 } else { LAST });
            }
            _ => {
                hw.swap_prgs(SIZE_8K, 0x8000, &[self.prg_reg(0), self.prg_reg(1), self.prg_reg(2)]);
                hw.swap_prg(SIZE_8K, 0xE000, if last_free { r3 } else { LAST });
            }
        }

        if self.mode & 0x80 != 0 {
            let bank = match self.mode & 0x03 {
                0 => r3 << 2 | 3,
                1 => r3 << 1 | 1,
                _ => r3,
            };
            hw.swap_wrk_prg(bank);
            hw.set_wrk_access(true, false);
        } else if hw.has_wrk() {
            hw.swap_wrk(0);
            hw.set_wrk_access(true, true);
        } else {
            hw.set_wrk_access(false, false);
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let chr = |index: usize| u32::from(self.chr[index]);
        match self.mode >> 3 & 0x03 {
            0 => hw.swap_chr(SIZE_8K, 0x0000, chr(0)),
            1 => hw.swap_chrs(SIZE_4K, 0x0000, &[chr(0), chr(4)]),
            2 => hw.swap_chrs(SIZE_2K, 0x0000, &[chr(0), chr(2), chr(4), chr(6)]),
            _ => {
                let banks: [u32; 8] = std::array::from_fn(chr);
                hw.swap_chrs(SIZE_1K, 0x0000, &banks);
            }
        }
    }

    fn rom_nametables(&self) -> bool {
        match self.variant {
            Variant::Jy90 => false,
            Variant::Jy209 => self.mode & 0x20 != 0,
            Variant::Jy211 => true,
        }
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        if !self.rom_nametables() {
            hw.set_mirroring_vh01(self.mirroring);
            return;
        }
        let every_slot_rom = self.mode & 0x40 != 0;
        for (slot, &reg) in self.nmt.iter().enumerate() {
            let to_ciram = !every_slot_rom && (reg & 0x80 != 0) == self.ciram_select;
            if to_ciram {
                hw.swap_nmt(slot as u16, SourceId::Ciram, u32::from(reg & 1));
            } else {
                hw.swap_nmt(slot as u16, SourceId::Chr, u32::from(reg));
            }
        }
    }

    fn update_all(&self, hw: &mut Hardware) {
        self.update_prg(hw);
        self.update_chr(hw);
        self.update_nmt(hw);
    }

    fn peek_multiplier(board: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        let product = u16::from(board.multiplicand) * u16::from(board.multiplier);
        match addr & 0xF803 {
            0x5800 => product as u8,
            0x5801 => (product >> 8) as u8,
            _ => hw.open_bus.sample(),
        }
    }

    fn poke_multiplier(board: &mut Self, _hw: &mut Hardware, addr: u16, data: u8) {
        match addr & 0xF803 {
            0x5800 => board.multiplicand = data,
            0x5801 => board.multiplier = data,
            _ => {}
        }
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        if IrqSource::from_mode(board.irq_mode) == IrqSource::CpuWrite {
            board.tick(hw);
        }
        match addr & 0xF007 {
            0x8000..=0x8003 => {
                board.prg[usize::from(addr & 3)] = data;
                board.update_prg(hw);
            }
            0x9000..=0x9007 => {
                let reg = &mut board.chr[usize::from(addr & 7)];
                *reg = *reg & 0xFF00 | u16::from(data);
                board.update_chr(hw);
            }
            0xA000..=0xA007 => {
                let reg = &mut board.chr[usize::from(addr & 7)];
                *reg = *reg & 0x00FF | u16::from(data) << 8;
                board.update_chr(hw);
            }
            0xB000..=0xB003 => {
                let reg = &mut board.nmt[usize::from(addr & 3)];
                *reg = *reg & 0xFF00 | u16::from(data);
                board.update_nmt(hw);
            }
            0xB004..=0xB007 => {
                let reg = &mut board.nmt[usize::from(addr & 3)];
                *reg = *reg & 0x00FF | u16::from(data) << 8;
                board.update_nmt(hw);
            }
            0xC000 => {
                board.irq_enabled = data & 1 != 0;
                if !board.irq_enabled {
                    hw.irq = false;
                }
            }
            0xC001 => board.irq_mode = data,
            0xC002 => {
                board.irq_enabled = false;
                hw.irq = false;
            }
            0xC003 => board.irq_enabled = true,
            0xC004 => board.irq_prescaler = data ^ board.irq_xor,
            0xC005 => board.irq_counter = data ^ board.irq_xor,
            0xC006 => board.irq_xor = data,
            0xD000 => {
                board.mode = data;
                board.update_all(hw);
            }
            0xD001 => {
                board.mirroring = data & 0x03;
                board.update_nmt(hw);
            }
            0xD002 => {
                board.ciram_select = data & 0x80 != 0;
                board.update_nmt(hw);
            }
            _ => {}
        }
    }

    /// One prescaler step in the configured direction; the counter steps
    /// when the prescaler wraps and raises the IRQ when it wraps in turn.
    fn tick(&mut self, hw: &mut Hardware) {
        if !self.irq_enabled {
            return;
        }
        let mask = if self.irq_mode & 0x04 != 0 { 0x07 } else { 0xFF };
        let up = match self.irq_mode >> 6 {
            1 => true,
            2 => false,
            _ => return,
        };
        let prescaler = self.irq_prescaler;
        self.irq_prescaler = if up { prescaler.wrapping_add(1) } else { prescaler.wrapping_sub(1) };
        let wrapped = if up { prescaler & mask == mask } else { prescaler & mask == 0 };
        if !wrapped {
            return;
        }
        let counter = self.irq_counter;
        self.irq_counter = if up { counter.wrapping_add(1) } else { counter.wrapping_sub(1) };
        if (up && counter == 0xFF) || (!up && counter == 0x00) {
            hw.irq = true;
        }
    }
}

fn reverse7(value: u8) -> u8 {
    value.reverse_bits() >> 1
}

impl Board for Mapper90 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            *self = Self::power_on(self.variant);
        }
        self.update_all(hw);

        bus.map(
            cpu_mem::PRG_RAM_START,
            cpu_mem::PRG_RAM_END,
            Peek::Wrk,
            Poke::Wrk,
        );
        bus.map_peek_masked(0x5800, 0x5FFF, 0xF802, 0x5800, Peek::Board(Self::peek_multiplier));
        bus.map_poke_masked(0x5800, 0x5FFF, 0xF802, 0x5800, Poke::Board(Self::poke_multiplier));
        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
    }

    fn clock(&mut self, hw: &mut Hardware) {
        if IrqSource::from_mode(self.irq_mode) == IrqSource::CpuCycle {
            self.tick(hw);
        }
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        match IrqSource::from_mode(self.irq_mode) {
            IrqSource::PpuRead => self.tick(hw),
            IrqSource::PpuA12 if addr < ppu_mem::NAMETABLE_START => {
                if self.a12.update(addr, hw.cycles()) == A12StateChange::Rise {
                    self.tick(hw);
                }
            }
            _ => {}
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write(&self.prg);
        for reg in self.chr.iter().chain(&self.nmt) {
            saver.write16(*reg);
        }
        saver
            .write8(self.mode)
            .write8(self.mirroring)
            .write_bool(self.ciram_select)
            .write_bool(self.irq_enabled)
            .write8(self.irq_mode)
            .write8(self.irq_prescaler)
            .write8(self.irq_counter)
            .write8(self.irq_xor)
            .write8(self.multiplicand)
            .write8(self.multiplier);
        self.a12.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.read(&mut self.prg)?;
        for reg in self.chr.iter_mut().chain(&mut self.nmt) {
            *reg = loader.read16()?;
        }
        self.mode = loader.read8()?;
        self.mirroring = loader.read8()? & 0x03;
        self.ciram_select = loader.read_bool()?;
        self.irq_enabled = loader.read_bool()?;
        self.irq_mode = loader.read8()?;
        self.irq_prescaler = loader.read8()?;
        self.irq_counter = loader.read8()?;
        self.irq_xor = loader.read8()?;
        self.multiplicand = loader.read8()?;
        self.multiplier = loader.read8()?;
        self.a12.load(loader)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Jy90 => "J.Y. Company (90)",
            Variant::Jy209 => "J.Y. Company (209)",
            Variant::Jy211 => "J.Y. Company (211)",
        })
    }
}
