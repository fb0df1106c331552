//! Mapper 4 (MMC3) and its board variants.
//!
//! | Area | Address range     | Behaviour                                        |
//! |------|-------------------|--------------------------------------------------|
//! | CPU  | `$6000-$7FFF`     | Work RAM with enable/write-protect (`$A001`)     |
//! | CPU  | `$8000/$8001`     | Bank select / bank data                          |
//! | CPU  | `$A000/$A001`     | Mirroring / work RAM protect                     |
//! | CPU  | `$C000/$C001`     | IRQ latch / IRQ reload                           |
//! | CPU  | `$E000/$E001`     | IRQ disable+acknowledge / IRQ enable             |
//! | PPU  | `$0000-$1FFF`     | 2×2 KiB + 4×1 KiB CHR banks, A12 inversion       |
//!
//! Variants sharing the register file:
//! - **118 (TxSROM)**: bit 7 of each CHR bank drives CIRAM A10 instead of
//!   the mirroring register.
//! - **119 (TQROM)**: bit 6 of each CHR bank selects 8 KiB of CHR RAM.
//! - **189**: writes to `$4120-$7FFF` select one 32 KiB PRG bank; the MMC3
//!   PRG registers are ignored.
//!
//! The scanline counter clocks on filtered rising edges of PPU A12. Rises
//! during vblank (when the attached PPU reports its scanline) are ignored.

use std::borrow::Cow;

use crate::{
    banks::{LAST, SIZE_1K, SIZE_8K, SIZE_32K, SourceId},
    bus::{Bus, Poke},
    cartridge::{
        a12_watcher::{A12StateChange, A12Watcher},
        header::Mirroring,
        mapper::{Board, Context, Hardware},
    },
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    state::{Loader, Saver},
};

const VBLANK_SCANLINES: std::ops::RangeInclusive<u16> = 240..=260;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mmc3CpuRegister {
    BankSelect,
    BankData,
    Mirroring,
    PrgRamProtect,
    IrqLatch,
    IrqReload,
    IrqDisable,
    IrqEnable,
}

impl Mmc3CpuRegister {
    fn from_addr(addr: u16) -> Self {
        use Mmc3CpuRegister::*;

        let odd = addr & 1 != 0;
        match (addr & 0xE000, odd) {
            (0x8000, false) => BankSelect,
            (0x8000, true) => BankData,
            (0xA000, false) => Mirroring,
            (0xA000, true) => PrgRamProtect,
            (0xC000, false) => IrqLatch,
            (0xC000, true) => IrqReload,
            (_, false) => IrqDisable,
            (_, true) => IrqEnable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Mmc3,
    Txsrom,
    Tqrom,
    PrgOverride,
}

/// Register file and scanline counter of the MMC3.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mmc3 {
    /// `$8000`: bits 0-2 target register, bit 6 PRG mode, bit 7 CHR A12
    /// inversion.
    bank_select: u8,
    banks: [u8; 8],
    mirroring: u8,
    prg_ram: u8,
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    a12: A12Watcher,
}

impl Default for Mmc3 {
    fn default() -> Self {
        Self {
            bank_select: 0,
            banks: [0, 2, 4, 5, 6, 7, 0, 1],
            mirroring: 0,
            prg_ram: 0,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            a12: A12Watcher::new(),
        }
    }
}

impl Mmc3 {
    #[inline]
    fn chr_inverted(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    /// 8 KiB PRG banks for `$8000`, `$A000`, `$C000`, `$E000`.
    fn prg_layout(&self) -> [u32; 4] {
        let (r6, r7) = (u32::from(self.banks[6]), u32::from(self.banks[7]));
        if self.bank_select & 0x40 == 0 {
            [r6, r7, LAST - 1, LAST]
        } else {
            [LAST - 1, r7, r6, LAST]
        }
    }

    /// 1 KiB CHR bank values for the eight pattern slots.
    fn chr_layout(&self) -> [u32; 8] {
        let r = self.banks.map(u32::from);
        let two_k = [r[0] & !1, r[0] | 1, r[1] & !1, r[1] | 1];
        let one_k = [r[2], r[3], r[4], r[5]];
        if self.chr_inverted() {
            [one_k[0], one_k[1], one_k[2], one_k[3], two_k[0], two_k[1], two_k[2], two_k[3]]
        } else {
            [two_k[0], two_k[1], two_k[2], two_k[3], one_k[0], one_k[1], one_k[2], one_k[3]]
        }
    }

    fn clock_counter(&mut self, hw: &mut Hardware) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            hw.irq = true;
        }
    }

    fn observe(&mut self, hw: &mut Hardware, addr: u16) {
        if addr >= ppu_mem::NAMETABLE_START {
            return;
        }
        if self.a12.update(addr, hw.cycles()) != A12StateChange::Rise {
            return;
        }
        if hw.ppu.scanline().is_some_and(|line| VBLANK_SCANLINES.contains(&line)) {
            return;
        }
        self.clock_counter(hw);
    }

    fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.bank_select)
            .write(&self.banks)
            .write8(self.mirroring)
            .write8(self.prg_ram)
            .write8(self.irq_latch)
            .write8(self.irq_counter)
            .write8(u8::from(self.irq_reload) | u8::from(self.irq_enabled) << 1);
        self.a12.save(saver);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.bank_select = loader.read8()?;
        loader.read(&mut self.banks)?;
        self.mirroring = loader.read8()?;
        self.prg_ram = loader.read8()?;
        self.irq_latch = loader.read8()?;
        self.irq_counter = loader.read8()?;
        let flags = loader.read8()?;
        self.irq_reload = flags & 1 != 0;
        self.irq_enabled = flags & 2 != 0;
        self.a12.load(loader)
    }
}

#[derive(Debug, Clone)]
pub struct Mapper4 {
    variant: Variant,
    mmc3: Mmc3,
    /// 32 KiB bank latched by mapper 189.
    outer: u8,
}

impl Mapper4 {
    pub fn new(ctx: &mut Context) -> Self {
        let variant = match ctx.id {
            118 => Variant::Txsrom,
            119 => Variant::Tqrom,
            189 => Variant::PrgOverride,
            _ => Variant::Mmc3,
        };
        match variant {
            Variant::Tqrom => ctx.chr_ram = ctx.chr_ram.max(SIZE_8K),
            Variant::PrgOverride => ctx.drop_auto_wrk(),
            _ => {}
        }
        Self {
            variant,
            mmc3: Mmc3::default(),
            outer: 0,
        }
    }

    fn update_prg(&self, hw: &mut Hardware) {
        if self.variant == Variant::PrgOverride {
            hw.swap_prg(SIZE_32K, 0x8000, u32::from(self.outer));
        } else {
            hw.swap_prgs(SIZE_8K, 0x8000, &self.mmc3.prg_layout());
        }
    }

    fn update_chr(&self, hw: &mut Hardware) {
        let layout = self.mmc3.chr_layout();
        for (slot, &bank) in layout.iter().enumerate() {
            let addr = (slot * SIZE_1K) as u16;
            if self.variant == Variant::Tqrom && bank & 0x40 != 0 {
                hw.swap_chr_from(SourceId::ChrRam, SIZE_1K, addr, bank & 0x07);
            } else {
                hw.swap_chr(SIZE_1K, addr, bank);
            }
        }
        if self.variant == Variant::Txsrom {
            self.update_nmt(hw);
        }
    }

    fn update_nmt(&self, hw: &mut Hardware) {
        let layout = self.mmc3.chr_layout();
        let pages = if self.mmc3.chr_inverted() {
            [layout[0], layout[1], layout[2], layout[3]]
        } else {
            [layout[0], layout[0], layout[2], layout[2]]
        };
        for (slot, page) in pages.into_iter().enumerate() {
            hw.swap_nmt(slot as u16, SourceId::Ciram, page >> 7);
        }
    }

    fn update_mirroring(&self, hw: &mut Hardware) {
        if self.variant == Variant::Txsrom {
            self.update_nmt(hw);
        } else if hw.header_mirroring() != Mirroring::FourScreen {
            hw.set_mirroring_vh(self.mmc3.mirroring);
        }
    }

    fn update_wrk(&self, hw: &mut Hardware) {
        let enabled = self.mmc3.prg_ram & 0x80 != 0;
        let writable = enabled && self.mmc3.prg_ram & 0x40 == 0;
        hw.set_wrk_access(enabled, writable);
    }

    fn poke_register(board: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        let mmc3 = &mut board.mmc3;
        match Mmc3CpuRegister::from_addr(addr) {
            Mmc3CpuRegister::BankSelect => {
                mmc3.bank_select = data;
                board.update_prg(hw);
                board.update_chr(hw);
            }
            Mmc3CpuRegister::BankData => {
                let index = usize::from(mmc3.bank_select & 0x07);
                mmc3.banks[index] = data;
                if index >= 6 {
                    board.update_prg(hw);
                } else {
                    board.update_chr(hw);
                }
            }
            Mmc3CpuRegister::Mirroring => {
                mmc3.mirroring = data;
                board.update_mirroring(hw);
            }
            Mmc3CpuRegister::PrgRamProtect => {
                mmc3.prg_ram = data;
                board.update_wrk(hw);
            }
            Mmc3CpuRegister::IrqLatch => mmc3.irq_latch = data,
            Mmc3CpuRegister::IrqReload => {
                mmc3.irq_counter = 0;
                mmc3.irq_reload = true;
            }
            Mmc3CpuRegister::IrqDisable => {
                mmc3.irq_enabled = false;
                hw.irq = false;
            }
            Mmc3CpuRegister::IrqEnable => mmc3.irq_enabled = true,
        }
    }

    fn poke_outer(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.outer = (data | data >> 4) & 0x07;
        board.update_prg(hw);
    }
}

impl Board for Mapper4 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            self.mmc3 = Mmc3::default();
            self.outer = 0;
        }
        self.mmc3.a12.reset();
        self.update_prg(hw);
        self.update_chr(hw);
        self.update_mirroring(hw);
        self.update_wrk(hw);

        bus.map_poke(
            cpu_mem::PRG_ROM_START,
            cpu_mem::CPU_ADDR_END,
            Poke::Board(Self::poke_register),
        );
        if self.variant == Variant::PrgOverride {
            bus.map_poke(0x4120, cpu_mem::PRG_RAM_END, Poke::Board(Self::poke_outer));
        }
    }

    fn save(&self, saver: &mut Saver) {
        self.mmc3.save(saver);
        saver.write8(self.outer);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.mmc3.load(loader)?;
        self.outer = loader.read8()?;
        Ok(())
    }

    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        self.mmc3.observe(hw, addr);
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self.variant {
            Variant::Mmc3 => "MMC3",
            Variant::Txsrom => "TxSROM",
            Variant::Tqrom => "TQROM",
            Variant::PrgOverride => "MMC3 (PRG override)",
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::{
        header::Mirroring,
        mapper::{Mapper, test_support::*},
    };

    fn select(mapper: &mut dyn Mapper, register: u8, value: u8) {
        mapper.cpu_write(0x8000, register);
        mapper.cpu_write(0x8001, value);
    }

    /// One scanline worth of pattern fetches: A12 low, then high.
    fn scanline(mapper: &mut dyn Mapper) {
        for _ in 0..8 {
            mapper.clock_cpu();
            mapper.ppu_read(0x0000);
        }
        for _ in 0..4 {
            mapper.clock_cpu();
            mapper.ppu_read(0x1000);
        }
    }

    #[test]
    fn prg_modes_swap_fixed_window() {
        let mut mapper = mapper(context(4, 256, 256));
        select(mapper.as_mut(), 6, 5);
        select(mapper.as_mut(), 7, 9);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0xA000), 9);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 30);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 31);

        mapper.cpu_write(0x8000, 0x40);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 30);
        assert_eq!(prg_bank(mapper.as_mut(), 0xC000), 5);
    }

    #[test]
    fn chr_inversion_swaps_halves() {
        let mut mapper = mapper(context(4, 256, 256));
        select(mapper.as_mut(), 0, 9);
        select(mapper.as_mut(), 2, 40);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 8);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0400), 9);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 40);

        mapper.cpu_write(0x8000, 0x80);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 40);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 8);
    }

    #[test]
    fn mirroring_register() {
        let mut mapper = mapper(context(4, 256, 256));
        mapper.cpu_write(0xA000, 0);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
        mapper.cpu_write(0xA000, 1);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn work_ram_protect() {
        let mut mapper = mapper(context(4, 256, 256));
        mapper.cpu_write(0xA001, 0x80);
        mapper.cpu_write(0x6000, 0x55);
        assert_eq!(mapper.cpu_read(0x6000), 0x55);
        mapper.cpu_write(0xA001, 0xC0);
        mapper.cpu_write(0x6000, 0x66);
        assert_eq!(mapper.cpu_read(0x6000), 0x55);
    }

    #[test]
    fn scanline_counter_raises_irq() {
        let mut mapper = mapper(context(4, 256, 256));
        mapper.cpu_write(0xC000, 2);
        mapper.cpu_write(0xC001, 0);
        mapper.cpu_write(0xE001, 0);

        scanline(mapper.as_mut()); // reload to 2
        assert!(!mapper.irq_pending());
        scanline(mapper.as_mut()); // 1
        assert!(!mapper.irq_pending());
        scanline(mapper.as_mut()); // 0
        assert!(mapper.irq_pending());

        mapper.cpu_write(0xE000, 0);
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn tqrom_routes_bit6_to_chr_ram() {
        let mut mapper = mapper(context(119, 128, 64));
        select(mapper.as_mut(), 2, 0x41);
        mapper.ppu_write(0x1000, 0x99);
        assert_eq!(mapper.ppu_read(0x1000), 0x99);
        select(mapper.as_mut(), 2, 0x01);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 1);
    }

    #[test]
    fn txsrom_nametables_follow_chr_bit7() {
        let mut mapper = mapper(context(118, 128, 128));
        select(mapper.as_mut(), 0, 0x80);
        select(mapper.as_mut(), 1, 0x00);
        mapper.ppu_write(0x2000, 0x12);
        mapper.ppu_write(0x2800, 0x34);
        assert_eq!(mapper.ppu_read(0x2400), 0x12);
        assert_eq!(mapper.ppu_read(0x2C00), 0x34);
        select(mapper.as_mut(), 1, 0x80);
        assert_eq!(mapper.ppu_read(0x2800), 0x12);
    }

    #[test]
    fn mapper_189_outer_bank() {
        let mut mapper = mapper(context(189, 128, 128));
        mapper.cpu_write(0x4120, 0x20);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 8);
        assert_eq!(prg_bank(mapper.as_mut(), 0xE000), 11);
    }
}
