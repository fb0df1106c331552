use strum::FromRepr;

/// Nametable arrangement seen by the PPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr)]
#[repr(u8)]
pub enum Mirroring {
    /// `$2000`/`$2400` share one table, `$2800`/`$2C00` the other.
    #[default]
    Horizontal,
    /// `$2000`/`$2800` share one table, `$2400`/`$2C00` the other.
    Vertical,
    /// Cartridge supplies the extra 2 KiB for four distinct tables.
    FourScreen,
    /// All four tables show the first CIRAM page.
    SingleScreenLower,
    /// All four tables show the second CIRAM page.
    SingleScreenUpper,
}

impl Mirroring {
    /// CIRAM page backing each of the four nametable slots.
    pub(crate) const fn pages(self) -> [u32; 4] {
        match self {
            Self::Horizontal => [0, 0, 1, 1],
            Self::Vertical => [0, 1, 0, 1],
            Self::SingleScreenLower => [0, 0, 0, 0],
            Self::SingleScreenUpper => [1, 1, 1, 1],
            // Slots 2 and 3 come from cartridge VRAM.
            Self::FourScreen => [0, 1, 0, 1],
        }
    }
}
