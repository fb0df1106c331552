use strum::FromRepr;

/// Packs a four character code into the little-endian `u32` stored on the
/// wire.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// Every chunk tag the cartridge layer emits.
///
/// Tags are scoped: the same tag may appear under different parents (a
/// board's `IRQ` sub-chunk lives inside its `REG` chunk, the mapper's IRQ
/// line directly under `MPR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u32)]
pub enum Tag {
    /// Outer chunk of one mapper.
    Mapper = fourcc(b"MPR\0"),
    /// Board id the state was produced by.
    Id = fourcc(b"ID\0\0"),
    /// Board registers.
    Reg = fourcc(b"REG\0"),
    /// IRQ line or a board's IRQ counter.
    Irq = fourcc(b"IRQ\0"),
    /// Window selections per region.
    Prg = fourcc(b"PRG\0"),
    Chr = fourcc(b"CHR\0"),
    Nmt = fourcc(b"NMT\0"),
    Wrk = fourcc(b"WRK\0"),
    /// RAM contents.
    ChrRam = fourcc(b"CRM\0"),
    WrkRam = fourcc(b"WRM\0"),
    Ciram = fourcc(b"CIR\0"),
    Vram = fourcc(b"VRM\0"),
    /// Board-internal RAM (Namco 163 sound RAM, Taito X1 RAM, ...).
    Ram = fourcc(b"RAM\0"),
    /// PPU-fetch latches (MMC2/MMC4).
    Latch = fourcc(b"LAT\0"),
}

impl Tag {
    #[inline]
    pub const fn fourcc(self) -> u32 {
        self as u32
    }

    /// Printable form of a raw tag, for logs.
    pub fn display(fourcc: u32) -> String {
        fourcc
            .to_le_bytes()
            .iter()
            .filter(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
            .collect()
    }
}
