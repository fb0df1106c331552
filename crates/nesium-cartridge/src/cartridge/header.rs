//! iNES / NES 2.0 header parsing.
//!
//! The first 16 bytes of every `.nes` image describe how much PRG/CHR data
//! follows, which board is required and a few compatibility flags. Both the
//! original iNES layout and the extended NES 2.0 flavour are understood.
//!
//! Many old dumps carry a damaged iNES header: ripper signatures such as
//! `DiskDude!` written over bytes 7-15, or garbage in the reserved bytes
//! 12-15. Such headers are still parsed but flagged [`Header::dirty`] so
//! identification can distrust the mapper high nibble.
//!
//! | Byte | iNES                          | NES 2.0                          |
//! |------|-------------------------------|----------------------------------|
//! | 4    | PRG ROM in 16 KiB units       | PRG ROM LSB                      |
//! | 5    | CHR ROM in 8 KiB units        | CHR ROM LSB                      |
//! | 6    | mirroring, battery, trainer, mapper D0..D3 | same                |
//! | 7    | Vs/PC10, format, mapper D4..D7 | same                            |
//! | 8    | PRG RAM in 8 KiB units        | mapper D8..D11, submapper        |
//! | 9    | TV system                     | PRG/CHR ROM MSB                  |
//! | 10   | unused                        | PRG RAM/NVRAM shift counts       |
//! | 11   | unused                        | CHR RAM/NVRAM shift counts       |
//! | 12   | unused                        | CPU/PPU timing                   |

mod mirroring;

pub use mirroring::Mirroring;

use bitflags::bitflags;

use crate::{cartridge::database::System, error::Error};

const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed header in bytes.
pub const NES_HEADER_LEN: usize = 16;

/// Size of the optional trainer block between header and PRG data.
pub const TRAINER_LEN: usize = 512;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const MIRRORING        = 0b0000_0001;
        const BATTERY          = 0b0000_0010;
        const TRAINER          = 0b0000_0100;
        const FOUR_SCREEN      = 0b0000_1000;
        const MAPPER_LOW_MASK  = 0b1111_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const VS_UNISYSTEM     = 0b0000_0001;
        const PLAYCHOICE_10    = 0b0000_0010;
        const NES2_DETECTION   = 0b0000_1100;
        const MAPPER_HIGH_MASK = 0b1111_0000;
    }
}

/// Header flavour encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomFormat {
    INes,
    Nes20,
    /// Pre-standard headers; parsed like iNES and always dirty.
    Archaic,
}

impl RomFormat {
    fn from_flags7(flags7: Flags7) -> Self {
        match (flags7.bits() >> 2) & 0b11 {
            0b10 => Self::Nes20,
            0b00 => Self::INes,
            _ => Self::Archaic,
        }
    }
}

/// Video timing hints embedded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TvSystem {
    Ntsc,
    Pal,
    /// Region free.
    Dual,
    Dendy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub format: RomFormat,
    /// Board id as stored, including a possibly garbage high nibble.
    pub mapper: u16,
    /// NES 2.0 submapper. Always 0 for iNES files.
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub trainer: bool,
    pub prg_rom_size: usize,
    pub chr_rom_size: usize,
    /// Volatile PRG RAM. 0 in an iNES file means unspecified.
    pub prg_ram_size: usize,
    pub prg_nvram_size: usize,
    pub chr_ram_size: usize,
    pub chr_nvram_size: usize,
    pub vs_unisystem: bool,
    pub playchoice_10: bool,
    pub tv_system: TvSystem,
    /// Header shows signs of tampering; mapper D4..D7 is unreliable.
    pub dirty: bool,
}

impl Header {
    /// Parses the first [`NES_HEADER_LEN`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let Some(bytes) = bytes.get(..NES_HEADER_LEN) else {
            return Err(Error::InvalidHeader("file shorter than the 16-byte header"));
        };
        if &bytes[0..4] != NES_MAGIC {
            return Err(Error::InvalidHeader("missing NES<EOF> signature"));
        }

        let flags6 = Flags6::from_bits_truncate(bytes[6]);
        let flags7 = Flags7::from_bits_truncate(bytes[7]);

        let header = match RomFormat::from_flags7(flags7) {
            RomFormat::Nes20 => Self::parse_nes20(bytes, flags6, flags7),
            format => Self::parse_ines(bytes, flags6, flags7, format),
        };
        if header.prg_rom_size == 0 {
            return Err(Error::InvalidHeader("header declares no PRG ROM"));
        }
        Ok(header)
    }

    fn parse_ines(bytes: &[u8], flags6: Flags6, flags7: Flags7, format: RomFormat) -> Self {
        let dirty = format == RomFormat::Archaic || is_dirty(bytes);
        // A ripper signature in bytes 7-15 says nothing about RAM or timing.
        let (byte8, byte9) = if dirty { (0, 0) } else { (bytes[8], bytes[9]) };
        let prg_rom_units = bytes[4] as usize;
        let chr_rom_units = bytes[5] as usize;
        let prg_ram_units = byte8 as usize;
        let tv_system = if byte9 & 0b1 == 0 {
            TvSystem::Ntsc
        } else {
            TvSystem::Pal
        };
        let battery = flags6.contains(Flags6::BATTERY);

        Self {
            format,
            mapper: combine_mapper(flags6, flags7, 0),
            submapper: 0,
            mirroring: resolve_mirroring(flags6),
            battery,
            trainer: flags6.contains(Flags6::TRAINER),
            prg_rom_size: prg_rom_units * 16 * 1024,
            chr_rom_size: chr_rom_units * 8 * 1024,
            prg_ram_size: prg_ram_units * 8 * 1024,
            prg_nvram_size: if battery {
                prg_ram_units.max(1) * 8 * 1024
            } else {
                0
            },
            chr_ram_size: if chr_rom_units == 0 { 8 * 1024 } else { 0 },
            chr_nvram_size: 0,
            vs_unisystem: flags7.contains(Flags7::VS_UNISYSTEM),
            playchoice_10: flags7.contains(Flags7::PLAYCHOICE_10),
            tv_system,
            dirty,
        }
    }

    fn parse_nes20(bytes: &[u8], flags6: Flags6, flags7: Flags7) -> Self {
        let prg_msb = bytes[9] & 0x0F;
        let chr_msb = (bytes[9] >> 4) & 0x0F;
        let prg_rom_size = decode_nes2_rom_size(bytes[4], prg_msb, 16 * 1024);
        let chr_rom_size = decode_nes2_rom_size(bytes[5], chr_msb, 8 * 1024);

        let prg_ram_size = decode_nes2_ram_size(bytes[10] & 0x0F);
        let prg_nvram_size = decode_nes2_ram_size(bytes[10] >> 4);
        let chr_ram_size = decode_nes2_ram_size(bytes[11] & 0x0F);
        let chr_nvram_size = decode_nes2_ram_size(bytes[11] >> 4);

        let console_type = flags7.bits() & 0b11;
        let tv_system = match bytes[12] & 0b11 {
            0b00 => TvSystem::Ntsc,
            0b01 => TvSystem::Pal,
            0b10 => TvSystem::Dual,
            _ => TvSystem::Dendy,
        };

        Self {
            format: RomFormat::Nes20,
            mapper: combine_mapper(flags6, flags7, bytes[8] & 0x0F),
            submapper: bytes[8] >> 4,
            mirroring: resolve_mirroring(flags6),
            battery: prg_nvram_size != 0
                || chr_nvram_size != 0
                || flags6.contains(Flags6::BATTERY),
            trainer: flags6.contains(Flags6::TRAINER),
            prg_rom_size,
            chr_rom_size,
            prg_ram_size,
            prg_nvram_size,
            chr_ram_size,
            chr_nvram_size,
            vs_unisystem: console_type == 1,
            playchoice_10: console_type == 2,
            tv_system,
            dirty: false,
        }
    }

    /// Console variant the header describes.
    pub fn system(&self) -> System {
        if self.vs_unisystem {
            System::Vs
        } else if self.playchoice_10 {
            System::Pc10
        } else {
            match self.tv_system {
                TvSystem::Pal => System::Pal,
                TvSystem::Dendy => System::Dendy,
                TvSystem::Ntsc | TvSystem::Dual => System::Ntsc,
            }
        }
    }

    /// Total work RAM the header asks for, volatile and battery backed.
    pub fn wrk_size(&self) -> usize {
        match self.format {
            RomFormat::Nes20 => self.prg_ram_size + self.prg_nvram_size,
            _ => self.prg_ram_size.max(self.prg_nvram_size),
        }
    }

    /// Whether the work RAM size was left for the board to decide.
    pub fn wrk_unspecified(&self) -> bool {
        self.format != RomFormat::Nes20 && self.wrk_size() == 0
    }
}

/// Reserved bytes 12-15 must be zero in a clean iNES header, and bytes 7-15
/// must not read as a ripper's ASCII signature.
fn is_dirty(bytes: &[u8]) -> bool {
    bytes[12..16].iter().any(|&b| b != 0)
        || bytes[7..16].iter().all(|&b| (0x20..=0x7E).contains(&b))
}

fn resolve_mirroring(flags6: Flags6) -> Mirroring {
    if flags6.contains(Flags6::FOUR_SCREEN) {
        Mirroring::FourScreen
    } else if flags6.contains(Flags6::MIRRORING) {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    }
}

fn combine_mapper(flags6: Flags6, flags7: Flags7, upper: u8) -> u16 {
    let lower = (flags6.bits() >> 4) as u16;
    let middle = (flags7.bits() & 0xF0) as u16;
    lower | middle | (upper as u16) << 8
}

fn decode_nes2_rom_size(lower: u8, upper_nibble: u8, unit: usize) -> usize {
    if upper_nibble != 0x0F {
        (((upper_nibble as usize) << 8) | lower as usize).saturating_mul(unit)
    } else {
        let exponent = ((lower >> 2) as u32).min(usize::BITS - 1);
        let multiplier = ((lower & 0b11) as usize) * 2 + 1;
        (1usize << exponent).saturating_mul(multiplier)
    }
}

fn decode_nes2_ram_size(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64usize << shift.min(0x0F) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines(bytes6: u8, bytes7: u8) -> [u8; NES_HEADER_LEN] {
        let mut header = [0u8; NES_HEADER_LEN];
        header[..4].copy_from_slice(NES_MAGIC);
        header[4] = 2;
        header[5] = 1;
        header[6] = bytes6;
        header[7] = bytes7;
        header
    }

    #[test]
    fn parses_plain_nrom_header() {
        let header = Header::parse(&ines(0, 0)).expect("header parses");

        assert_eq!(header.format, RomFormat::INes);
        assert_eq!(header.mapper, 0);
        assert_eq!(header.mirroring, Mirroring::Horizontal);
        assert_eq!(header.prg_rom_size, 32 * 1024);
        assert_eq!(header.chr_rom_size, 8 * 1024);
        assert!(!header.battery);
        assert!(!header.trainer);
        assert!(!header.dirty);
        assert_eq!(header.prg_ram_size, 0);
        assert_eq!(header.system(), System::Ntsc);
    }

    #[test]
    fn combines_mapper_nibbles_and_flags() {
        let header = Header::parse(&ines(0b0100_1011, 0b0001_0000)).expect("header parses");
        assert_eq!(header.mapper, 0x14);
        assert_eq!(header.mirroring, Mirroring::FourScreen);
        assert!(header.battery);
    }

    #[test]
    fn rejects_invalid_magic_and_short_input() {
        let mut bytes = ines(0, 0);
        bytes[..4].copy_from_slice(b"NOPE");
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidHeader(_))));
        assert!(matches!(Header::parse(&bytes[..10]), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn rejects_zero_prg() {
        let mut bytes = ines(0, 0);
        bytes[4] = 0;
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn ripper_signature_marks_header_dirty() {
        let mut bytes = ines(0x40, 0);
        bytes[7..16].copy_from_slice(b"DiskDude!");
        let header = Header::parse(&bytes).expect("header parses");
        assert!(header.dirty);
        // 'D' lands in the mapper high nibble.
        assert_eq!(header.mapper & 0x0F, 4);
        assert_eq!(header.mapper, 0x44);
        assert_eq!(header.prg_ram_size, 0);
        assert_eq!(header.system(), System::Ntsc);
    }

    #[test]
    fn reserved_bytes_mark_header_dirty() {
        let mut bytes = ines(0x10, 0x00);
        bytes[13] = 0x5A;
        assert!(Header::parse(&bytes).expect("header parses").dirty);
    }

    #[test]
    fn parses_nes2_header() {
        let header_bytes = [
            b'N',
            b'E',
            b'S',
            0x1A,
            2,           // PRG LSB
            1,           // CHR LSB
            0b0000_0010, // battery
            0b0000_1000, // NES 2.0
            0b0011_0001, // mapper D8..D11 = 1, submapper = 3
            0b0001_0000, // CHR MSB = 1
            0b0010_0010, // PRG RAM = 256 B, PRG NVRAM = 256 B
            0b0100_0011, // CHR RAM = 512 B, CHR NVRAM = 1 KiB
            0b0000_0011, // Dendy
            0,
            0,
            0,
        ];

        let header = Header::parse(&header_bytes).expect("header parses");

        assert_eq!(header.format, RomFormat::Nes20);
        assert_eq!(header.mapper, 0x100);
        assert_eq!(header.submapper, 3);
        assert_eq!(header.chr_rom_size, (1 + (1 << 8)) * 8 * 1024);
        assert_eq!(header.wrk_size(), 512);
        assert_eq!(header.chr_nvram_size, 1024);
        assert!(header.battery);
        assert!(!header.dirty);
        assert_eq!(header.system(), System::Dendy);
    }

    #[test]
    fn parses_nes2_exponent_encoded_rom_size() {
        let mut bytes = ines(0, 0b0000_1000);
        bytes[4] = 0b0011_1001; // 2^14 * 3
        bytes[5] = 0;
        bytes[9] = 0x0F;
        let header = Header::parse(&bytes).expect("header parses");
        assert_eq!(header.prg_rom_size, 3 * 16 * 1024);
        assert_eq!(header.chr_rom_size, 0);
    }

    #[test]
    fn archaic_header_is_parsed_as_dirty_ines() {
        let header = Header::parse(&ines(0x20, 0b0000_0100)).expect("header parses");
        assert_eq!(header.format, RomFormat::Archaic);
        assert!(header.dirty);
        assert_eq!(header.mapper & 0x0F, 2);
    }
}
