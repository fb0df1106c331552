//! Address constants for the cartridge-facing parts of the memory map.

/// CPU address space as seen by the cartridge connector.
pub mod cpu {
    /// First address the cartridge can decode (`$4020`).
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// Expansion area used by pirate and Sachen boards for registers.
    pub const EXPANSION_START: u16 = 0x4100;
    pub const EXPANSION_END: u16 = 0x5FFF;
    /// PRG RAM window start address (`$6000`).
    pub const PRG_RAM_START: u16 = 0x6000;
    /// PRG RAM window end address (`$7FFF`).
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// PRG ROM window start address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Last addressable CPU byte (`$FFFF`).
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// PPU address space as seen by the cartridge connector.
pub mod ppu {
    /// Pattern tables (`$0000-$1FFF`).
    pub const PATTERN_TABLE_START: u16 = 0x0000;
    pub const PATTERN_TABLE_END: u16 = 0x1FFF;
    /// Nametables and their mirror (`$2000-$3EFF`).
    pub const NAMETABLE_START: u16 = 0x2000;
    pub const NAMETABLE_END: u16 = 0x3EFF;
    /// The PPU only decodes 14 address lines.
    pub const ADDR_MASK: u16 = 0x3FFF;
    /// Bytes in one nametable page.
    pub const NAMETABLE_SIZE: usize = 0x0400;
    /// Console CIRAM: two nametable pages.
    pub const CIRAM_SIZE: usize = 0x0800;
}
