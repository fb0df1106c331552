//! Resolves what a ROM image really is before a board is built.
//!
//! The header is the first opinion, the database the final one. A database
//! entry only applies when its PRG and CHR sizes match the image. A dirty
//! header that the database does not know loses its mapper high nibble.

use tracing::{debug, warn};

use crate::{
    cartridge::{
        database::{RomDatabase, System},
        header::{Header, Mirroring},
    },
    config::{LoadOptions, region::Region},
    error::Error,
};

/// Where the final identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySource {
    Header,
    Database,
}

/// Resolved cartridge metadata handed to the board factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub mapper: u16,
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub system: System,
    pub region: Region,
    pub prg_size: usize,
    pub chr_size: usize,
    pub wrk_size: usize,
    /// Work RAM size is a default the board may override.
    pub wrk_auto: bool,
    /// CRC32 of PRG followed by CHR.
    pub crc: u32,
    pub attribute: u8,
    pub source: IdentitySource,
}

/// CRC32 over PRG ROM followed by CHR ROM.
pub fn crc32(prg: &[u8], chr: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(prg);
    hasher.update(chr);
    hasher.finalize()
}

pub fn identify(
    header: &Header,
    prg: &[u8],
    chr: &[u8],
    database: Option<&RomDatabase>,
    options: &LoadOptions,
) -> Result<Identity, Error> {
    if prg.is_empty() {
        return Err(Error::InvalidHeader("image carries no PRG ROM"));
    }

    let crc = crc32(prg, chr);
    let mut identity = Identity {
        mapper: header.mapper,
        submapper: header.submapper,
        mirroring: header.mirroring,
        battery: header.battery,
        system: header.system(),
        region: Region::Ntsc,
        prg_size: prg.len(),
        chr_size: chr.len(),
        wrk_size: header.wrk_size(),
        wrk_auto: false,
        crc,
        attribute: 0,
        source: IdentitySource::Header,
    };

    let entry = database
        .filter(|_| options.use_database)
        .and_then(|db| db.find(crc))
        .filter(|entry| {
            let fits = entry.prg_size == prg.len() && entry.chr_size == chr.len();
            if !fits {
                warn!(
                    "database entry for crc {crc:#010x} describes {}+{} bytes, image has {}+{}; using header",
                    entry.prg_size,
                    entry.chr_size,
                    prg.len(),
                    chr.len()
                );
            }
            fits
        });

    match entry {
        Some(entry) => {
            debug!(
                "database hit for crc {crc:#010x}: mapper {} ({:?}, {:?})",
                entry.mapper, entry.mirroring, entry.system
            );
            if !header.dirty && (entry.mapper != header.mapper || entry.mirroring != header.mirroring)
            {
                warn!(
                    "header disagrees with database for crc {crc:#010x}: mapper {} vs {}, {:?} vs {:?}",
                    header.mapper, entry.mapper, header.mirroring, entry.mirroring
                );
            }
            identity.mapper = entry.mapper;
            identity.mirroring = entry.mirroring;
            identity.battery = entry.battery();
            identity.system = entry.system;
            identity.attribute = entry.attribute;
            if entry.wrk_size != 0 {
                identity.wrk_size = entry.wrk_size;
            }
            identity.source = IdentitySource::Database;
        }
        None => {
            debug!("no database entry for crc {crc:#010x}");
            if header.dirty && !options.trust_dirty_header {
                debug!(
                    "dirty header, dropping mapper high nibble ({} -> {})",
                    header.mapper,
                    header.mapper & 0x0F
                );
                identity.mapper = header.mapper & 0x0F;
            }
        }
    }

    if identity.wrk_size == 0 && header.wrk_unspecified() {
        identity.wrk_size = options.default_wrk_size;
        identity.wrk_auto = true;
    }
    identity.region = Region::resolve(options.region, identity.system);
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{
        database::{DatabaseEntry, EntryFlags},
        header::NES_HEADER_LEN,
    };

    fn header(bytes6: u8, bytes7: u8, tail: &[u8]) -> Header {
        let mut bytes = [0u8; NES_HEADER_LEN];
        bytes[..4].copy_from_slice(b"NES\x1A");
        bytes[4] = 1;
        bytes[6] = bytes6;
        bytes[7] = bytes7;
        bytes[16 - tail.len()..].copy_from_slice(tail);
        Header::parse(&bytes).expect("header parses")
    }

    #[test]
    fn crc_covers_prg_then_chr() {
        assert_eq!(crc32(b"123456789", &[]), 0xCBF4_3926);
        assert_eq!(crc32(b"1234", b"56789"), 0xCBF4_3926);
    }

    #[test]
    fn dirty_header_without_database_keeps_low_nibble() {
        let header = header(0x40, 0, b"DiskDude!");
        let prg = [0u8; 16 * 1024];
        let identity = identify(&header, &prg, &[], None, &LoadOptions::default())
            .expect("identifies");
        assert_eq!(identity.mapper, 4);
        assert_eq!(identity.source, IdentitySource::Header);

        let trusting = LoadOptions::default().with_dirty_header_trust(true);
        let identity = identify(&header, &prg, &[], None, &trusting).expect("identifies");
        assert_eq!(identity.mapper, 0x44);
    }

    #[test]
    fn database_overrides_header() {
        let header = header(0x10, 0, &[]);
        let prg = [0x5Au8; 16 * 1024];
        let crc = crc32(&prg, &[]);
        let db = RomDatabase::new([DatabaseEntry {
            crc,
            mapper: 2,
            prg_size: prg.len(),
            chr_size: 0,
            wrk_size: 0,
            system: System::Pal,
            mirroring: Mirroring::Vertical,
            flags: EntryFlags::BATTERY,
            attribute: 0,
        }]);

        let identity = identify(&header, &prg, &[], Some(&db), &LoadOptions::default())
            .expect("identifies");
        assert_eq!(identity.mapper, 2);
        assert_eq!(identity.mirroring, Mirroring::Vertical);
        assert!(identity.battery);
        assert_eq!(identity.region, Region::Pal);
        assert_eq!(identity.wrk_size, LoadOptions::default().default_wrk_size);
        assert!(identity.wrk_auto);
        assert_eq!(identity.source, IdentitySource::Database);

        let off = LoadOptions::default().with_database(false);
        let identity = identify(&header, &prg, &[], Some(&db), &off).expect("identifies");
        assert_eq!(identity.mapper, 1);
    }

    #[test]
    fn empty_prg_is_rejected() {
        let header = header(0, 0, &[]);
        assert!(matches!(
            identify(&header, &[], &[], None, &LoadOptions::default()),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn database_entry_with_other_sizes_is_ignored() {
        let header = header(0x10, 0, &[]);
        let prg = [0x5Au8; 16 * 1024];
        let chr = [0xA5u8; 8 * 1024];
        let crc = crc32(&prg, &chr);
        let entry = |prg_size, chr_size| DatabaseEntry {
            crc,
            mapper: 2,
            prg_size,
            chr_size,
            wrk_size: 0,
            system: System::Pal,
            mirroring: Mirroring::Vertical,
            flags: EntryFlags::empty(),
            attribute: 0,
        };

        for (prg_size, chr_size) in [(32 * 1024, chr.len()), (prg.len(), 0)] {
            let db = RomDatabase::new([entry(prg_size, chr_size)]);
            let identity = identify(&header, &prg, &chr, Some(&db), &LoadOptions::default())
                .expect("identifies");
            assert_eq!(identity.source, IdentitySource::Header);
            assert_eq!(identity.mapper, 1);
            assert_eq!(identity.mirroring, Mirroring::Horizontal);
            assert_eq!(identity.region, Region::Ntsc);
        }

        let db = RomDatabase::new([entry(prg.len(), chr.len())]);
        let identity = identify(&header, &prg, &chr, Some(&db), &LoadOptions::default())
            .expect("identifies");
        assert_eq!(identity.source, IdentitySource::Database);
        assert_eq!(identity.mapper, 2);
    }

    #[test]
    fn mismatched_entry_for_dirty_header_still_drops_high_nibble() {
        let header = header(0x40, 0, b"DiskDude!");
        let prg = [0u8; 16 * 1024];
        let crc = crc32(&prg, &[]);
        let db = RomDatabase::new([DatabaseEntry {
            crc,
            mapper: 66,
            prg_size: 64 * 1024,
            chr_size: 0,
            wrk_size: 0,
            system: System::Ntsc,
            mirroring: Mirroring::Vertical,
            flags: EntryFlags::empty(),
            attribute: 0,
        }]);
        let identity = identify(&header, &prg, &[], Some(&db), &LoadOptions::default())
            .expect("identifies");
        assert_eq!(identity.mapper, 4);
        assert_eq!(identity.source, IdentitySource::Header);
    }
}
