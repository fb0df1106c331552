//! CNROM (3) and the copy-protected CNROM boards (185).
//!
//! Writes anywhere in `$8000-$FFFF` select an 8 KiB CHR bank. Mapper 185
//! instead wires the latch to the CHR chip enable: pattern reads return
//! garbage unless the right value was written, which games check at boot.

use std::borrow::Cow;

use crate::{
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    memory::cpu as cpu_mem,
    state::{Loader, Saver},
};

#[derive(Debug, Clone)]
pub struct Mapper3 {
    protected: bool,
    bus_conflicts: bool,
    chr_enabled: bool,
}

impl Mapper3 {
    pub fn new(ctx: &mut Context) -> Self {
        Self {
            protected: ctx.id == 185,
            bus_conflicts: ctx.submapper == 2,
            chr_enabled: true,
        }
    }

    fn poke_protect(board: &mut Self, hw: &mut Hardware, _addr: u16, data: u8) {
        board.chr_enabled = data & 0x0F != 0 && data != 0x13;
        hw.set_chr_access(board.chr_enabled, false);
    }
}

impl Board for Mapper3 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        let (first, last) = (cpu_mem::PRG_ROM_START, cpu_mem::CPU_ADDR_END);
        if self.protected {
            if hard {
                self.chr_enabled = true;
            }
            hw.set_chr_access(self.chr_enabled, false);
            bus.map_poke(first, last, Poke::Board(Self::poke_protect));
        } else if self.bus_conflicts {
            bus.map_poke(first, last, Poke::Chr8kBc);
        } else {
            bus.map_poke(first, last, Poke::Chr8k);
        }
    }

    fn save(&self, saver: &mut Saver) {
        saver.write_bool(self.chr_enabled);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.chr_enabled = loader.read_bool()?;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.protected { "CNROM (protected)" } else { "CNROM" })
    }
}
