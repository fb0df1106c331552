//! Mapper 34: BNROM and NINA-001 share the id.
//!
//! | Board    | Register        | Effect                          |
//! |----------|-----------------|---------------------------------|
//! | BNROM    | `$8000-$FFFF`   | 32 KiB PRG bank (bus conflicts) |
//! | NINA-001 | `$7FFD`         | 32 KiB PRG bank                 |
//! | NINA-001 | `$7FFE`         | 4 KiB CHR at `$0000`            |
//! | NINA-001 | `$7FFF`         | 4 KiB CHR at `$1000`            |
//!
//! The boards are told apart by NES 2.0 submapper (1 NINA, 2 BNROM) or,
//! failing that, by the presence of more than 8 KiB of CHR ROM.

use std::borrow::Cow;

use crate::{
    banks::{SIZE_4K, SIZE_8K, SIZE_32K},
    bus::{Bus, Poke},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone)]
pub struct Mapper34 {
    nina: bool,
}

impl Mapper34 {
    pub fn new(ctx: &mut Context) -> Self {
        let nina = match ctx.submapper {
            1 => true,
            2 => false,
            _ => ctx.chr.len() > SIZE_8K,
        };
        Self { nina }
    }

    fn poke_nina(_: &mut Self, hw: &mut Hardware, addr: u16, data: u8) {
        hw.poke_wrk(addr, data);
        let bank = u32::from(data);
        match addr {
            0x7FFD => hw.swap_prg(SIZE_32K, 0x8000, bank),
            0x7FFE => hw.swap_chr(SIZE_4K, 0x0000, bank),
            _ => hw.swap_chr(SIZE_4K, 0x1000, bank),
        }
    }
}

impl Board for Mapper34 {
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool) {
        if hard {
            hw.swap_prg(SIZE_32K, 0x8000, 0);
        }
        if self.nina {
            bus.map_poke(0x7FFD, 0x7FFF, Poke::Board(Self::poke_nina));
        } else {
            bus.map_poke(cpu_mem::PRG_ROM_START, cpu_mem::CPU_ADDR_END, Poke::Prg32kBc);
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(if self.nina { "NINA-001" } else { "BNROM" })
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn nina_registers_sit_below_8000() {
        let mut mapper = mapper(context(34, 128, 64));
        mapper.cpu_write(0x7FFD, 1);
        mapper.cpu_write(0x7FFE, 3);
        mapper.cpu_write(0x7FFF, 5);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 4);
        assert_eq!(chr_bank(mapper.as_mut(), 0x0000), 12);
        assert_eq!(chr_bank(mapper.as_mut(), 0x1000), 20);
        assert_eq!(mapper.cpu_read(0x7FFF), 5);
    }

    #[test]
    fn bnrom_latches_through_bus_conflict() {
        let mut mapper = mapper(context(34, 128, 0));
        // First bank reads as 0 everywhere, so the latch stays at 0.
        mapper.cpu_write(0x8000, 3);
        assert_eq!(prg_bank(mapper.as_mut(), 0x8000), 0);
    }
}
