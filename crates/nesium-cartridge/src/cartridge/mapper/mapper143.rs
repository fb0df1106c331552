//! Sachen TCA01 (143): NROM with a copy-protection port. Reads where
//! `(addr & $E100) == $4100` return the inverted low six address bits; the
//! top two bits float.

use std::borrow::Cow;

use crate::{
    bus::{Bus, Peek},
    cartridge::mapper::{Board, Context, Hardware},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper143;

impl Mapper143 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self
    }

    fn peek_protection(_: &mut Self, hw: &mut Hardware, addr: u16) -> u8 {
        hw.open_bus.apply_masked(0xC0, !addr as u8 & 0x3F)
    }
}

impl Board for Mapper143 {
    fn reset(&mut self, _hw: &mut Hardware, bus: &mut Bus<Self>, _hard: bool) {
        bus.map_peek_masked(
            cpu_mem::EXPANSION_START,
            cpu_mem::EXPANSION_END,
            0xE100,
            0x4100,
            Peek::Board(Self::peek_protection),
        );
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Sachen TCA01")
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::test_support::*;

    #[test]
    fn protection_port_inverts_address() {
        let mut mapper = mapper(context(143, 32, 8));
        mapper.cpu_write(0x4020, 0x00);
        assert_eq!(mapper.cpu_read(0x4100) & 0x3F, 0x3F);
        assert_eq!(mapper.cpu_read(0x4115) & 0x3F, 0x2A);
        mapper.cpu_write(0x4020, 0xC0);
        assert_eq!(mapper.cpu_read(0x5F01), 0xC0 | 0x3E);
    }
}
