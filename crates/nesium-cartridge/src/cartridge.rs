use std::{fs, path::Path};

use tracing::debug;

use crate::{
    cartridge::{
        database::RomDatabase,
        header::{Header, Mirroring, NES_HEADER_LEN, RomFormat, TRAINER_LEN},
        identify::{Identity, identify},
        mapper::{Context, Mapper, PpuPort, Provider, create_with},
    },
    config::{LoadOptions, region::Region},
    error::Error,
    reset_kind::ResetKind,
    state::{Loader, Saver},
};

mod a12_watcher;
pub mod database;
pub mod header;
pub mod identify;
pub mod mapper;

/// A loaded cartridge: parsed header, resolved identity and the board.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    identity: Identity,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn new(header: Header, identity: Identity, mapper: Box<dyn Mapper>) -> Self {
        Self {
            header,
            identity,
            mapper,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn region(&self) -> Region {
        self.identity.region
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    pub fn cpu_read(&mut self, addr: u16) -> u8 {
        self.mapper.cpu_read(addr)
    }

    pub fn cpu_write(&mut self, addr: u16, data: u8) {
        self.mapper.cpu_write(addr, data);
    }

    pub fn ppu_read(&mut self, addr: u16) -> u8 {
        self.mapper.ppu_read(addr)
    }

    pub fn ppu_write(&mut self, addr: u16, data: u8) {
        self.mapper.ppu_write(addr, data);
    }

    pub fn clock_cpu(&mut self) {
        self.mapper.clock_cpu();
    }

    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    pub fn reset(&mut self, kind: ResetKind) {
        self.mapper.reset(kind);
    }

    /// Battery-backed RAM worth persisting, if any.
    pub fn save_ram(&self) -> Option<&[u8]> {
        self.mapper.save_ram()
    }

    /// Restores battery RAM read from disk. Extra bytes are ignored.
    pub fn load_save_ram(&mut self, data: &[u8]) {
        if let Some(wrk) = self.mapper.prg_ram_mut() {
            let len = wrk.len().min(data.len());
            wrk[..len].copy_from_slice(&data[..len]);
        }
    }

    /// Serializes the whole board state into a chunk stream.
    pub fn save_state(&self) -> Vec<u8> {
        let mut saver = Saver::new();
        self.mapper.save_state(&mut saver);
        saver.into_bytes()
    }

    /// Restores a stream produced by [`Cartridge::save_state`]. On error
    /// the cartridge keeps its current state.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let mut loader = Loader::new(data);
        self.mapper.load_state(&mut loader)
    }
}

/// Everything outside the ROM image that influences loading.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    pub options: LoadOptions,
    pub database: Option<&'a RomDatabase>,
    /// Consulted for ids the built-in catalogue lacks.
    pub provider: Option<&'a dyn Provider>,
    /// PPU the board notifies before bank switches.
    pub ppu: Option<Box<dyn PpuPort>>,
}

impl<'a> Environment<'a> {
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_database(mut self, database: &'a RomDatabase) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_provider(mut self, provider: &'a dyn Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_ppu(mut self, ppu: Box<dyn PpuPort>) -> Self {
        self.ppu = Some(ppu);
        self
    }
}

/// Load a cartridge from an in-memory image with default options and no
/// database.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge, Error> {
    load_cartridge_with(bytes, Environment::default())
}

/// Load a cartridge, consulting the database and provider in `env`.
pub fn load_cartridge_with(bytes: &[u8], env: Environment<'_>) -> Result<Cartridge, Error> {
    let header = Header::parse(bytes)?;
    let sections = slice_sections(bytes, &header)?;
    let identity = identify(&header, sections.prg, sections.chr, env.database, &env.options)?;
    debug!(
        "identified mapper {}.{} from {:?}, prg {} KiB, chr {} KiB, wrk {} KiB",
        identity.mapper,
        identity.submapper,
        identity.source,
        identity.prg_size / 1024,
        identity.chr_size / 1024,
        identity.wrk_size / 1024,
    );

    let mut ctx = Context::new(identity.mapper, to_boxed(sections.prg)?, to_boxed(sections.chr)?)
        .with_mirroring(identity.mirroring)
        .with_attribute(identity.attribute)
        .with_crc(identity.crc);
    ctx.submapper = identity.submapper;
    ctx.wrk_size = identity.wrk_size;
    ctx.wrk_auto = identity.wrk_auto;
    ctx.wrk_backed = backed_wrk(&header, &identity);
    ctx.chr_ram = header.chr_ram_size + header.chr_nvram_size;
    ctx.trainer = sections.trainer.map(to_boxed).transpose()?;
    if let Some(ppu) = env.ppu {
        ctx = ctx.with_ppu(ppu);
    }

    let mapper = create_with(ctx, env.provider)?;
    Ok(Cartridge::new(header, identity, mapper))
}

/// Load a cartridge directly from disk.
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge, Error>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

struct Sections<'a> {
    trainer: Option<&'a [u8]>,
    prg: &'a [u8],
    chr: &'a [u8],
}

fn slice_sections<'a>(bytes: &'a [u8], header: &Header) -> Result<Sections<'a>, Error> {
    let mut cursor = NES_HEADER_LEN;
    let trainer = if header.trainer {
        Some(section(bytes, &mut cursor, TRAINER_LEN, "trainer")?)
    } else {
        None
    };
    let prg = section(bytes, &mut cursor, header.prg_rom_size, "PRG ROM")?;
    let chr = section(bytes, &mut cursor, header.chr_rom_size, "CHR ROM")?;
    Ok(Sections { trainer, prg, chr })
}

fn section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], Error> {
    let too_short = || Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    };
    let end = cursor.checked_add(len).ok_or_else(too_short)?;
    let slice = bytes.get(*cursor..end).ok_or_else(too_short)?;
    *cursor = end;
    Ok(slice)
}

fn to_boxed(bytes: &[u8]) -> Result<Box<[u8]>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())
        .map_err(|_| Error::OutOfMemory { bytes: bytes.len() })?;
    buf.extend_from_slice(bytes);
    Ok(buf.into_boxed_slice())
}

/// Battery-backed share of the work RAM. NES 2.0 states it; iNES only says
/// whether a battery exists, in which case all of it is kept.
fn backed_wrk(header: &Header, identity: &Identity) -> usize {
    if !identity.battery {
        return 0;
    }
    match header.format {
        RomFormat::Nes20 if header.prg_nvram_size > 0 => header.prg_nvram_size,
        _ => identity.wrk_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::cpu as cpu_mem;

    fn base_header(prg_banks: u8, chr_banks: u8, flags6: u8) -> [u8; NES_HEADER_LEN] {
        [
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ]
    }

    #[test]
    fn loads_basic_nrom_cartridge() {
        let mut rom = base_header(1, 1, 0).to_vec();
        rom.extend(vec![0xAA; 16 * 1024]);
        rom.extend(vec![0x55; 8 * 1024]);

        let mut cartridge = load_cartridge(&rom).expect("parse cartridge");

        assert_eq!(cartridge.header().prg_rom_size, 16 * 1024);
        assert_eq!(cartridge.header().chr_rom_size, 8 * 1024);
        assert_eq!(cartridge.cpu_read(cpu_mem::PRG_ROM_START), 0xAA);
        assert_eq!(cartridge.cpu_read(0xC000), 0xAA);
        assert_eq!(cartridge.ppu_read(0x0000), 0x55);
        assert_eq!(cartridge.mapper().mapper_id(), 0);
    }

    #[test]
    fn trainer_is_copied_to_7000() {
        let mut rom = base_header(1, 0, 0b0000_0100).to_vec();
        rom.extend(vec![0xFE; TRAINER_LEN]);
        rom.extend(vec![0xAA; 16 * 1024]);

        let mut cartridge = load_cartridge(&rom).expect("parse cartridge");

        assert!(cartridge.header().trainer);
        assert_eq!(cartridge.cpu_read(0x7000), 0xFE);
        assert_eq!(cartridge.cpu_read(0x71FF), 0xFE);
        assert_eq!(cartridge.cpu_read(cpu_mem::PRG_ROM_START), 0xAA);
    }

    #[test]
    fn errors_when_prg_section_missing() {
        let mut rom = base_header(1, 0, 0).to_vec();
        rom.extend(vec![0xAA; 1024]);

        let err = load_cartridge(&rom).expect_err("should fail");
        assert!(matches!(
            err,
            Error::SectionTooShort {
                section: "PRG ROM",
                expected: 0x4000,
                actual: 1024,
            }
        ));
    }

    #[test]
    fn chr_ram_when_no_chr_rom() {
        let mut rom = base_header(2, 0, 0x21).to_vec();
        rom.extend(vec![0x00; 32 * 1024]);

        let mut cartridge = load_cartridge(&rom).expect("parse cartridge");
        assert_eq!(cartridge.mapper().mapper_id(), 2);
        assert_eq!(cartridge.mirroring(), Mirroring::Vertical);
        cartridge.ppu_write(0x1234, 0x77);
        assert_eq!(cartridge.ppu_read(0x1234), 0x77);
    }

    #[test]
    fn battery_ram_round_trips() {
        let mut rom = base_header(1, 1, 0b0000_0010).to_vec();
        rom.extend(vec![0x00; 24 * 1024]);

        let mut cartridge = load_cartridge(&rom).expect("parse cartridge");
        cartridge.cpu_write(0x6010, 0x42);
        let saved = cartridge.save_ram().expect("battery").to_vec();
        assert_eq!(saved.len(), 8 * 1024);
        assert_eq!(saved[0x10], 0x42);

        let mut fresh = load_cartridge(&rom).expect("parse cartridge");
        fresh.load_save_ram(&saved);
        assert_eq!(fresh.cpu_read(0x6010), 0x42);
    }

    #[test]
    fn state_round_trip_through_cartridge() {
        let mut rom = base_header(8, 0, 0x20).to_vec();
        rom.extend((0..128 * 1024).map(|i| (i / 0x4000) as u8));

        let mut cartridge = load_cartridge(&rom).expect("parse cartridge");
        cartridge.cpu_write(0x8000, 5);
        let snapshot = cartridge.save_state();
        cartridge.cpu_write(0x8000, 1);
        assert_eq!(cartridge.cpu_read(0x8000), 1);

        cartridge.load_state(&snapshot).expect("state loads");
        assert_eq!(cartridge.cpu_read(0x8000), 5);
        assert!(cartridge.load_state(&snapshot[..snapshot.len() - 1]).is_err());
        assert_eq!(cartridge.cpu_read(0x8000), 5);
    }
}
