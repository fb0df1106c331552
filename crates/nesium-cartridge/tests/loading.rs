mod common;

use std::fs;

use anyhow::Result;
use common::RomBuilder;
use nesium_cartridge::{
    Context, Environment, Error, LoadOptions, Mapper, Mirroring, Region, ResetKind, RomDatabase,
    cartridge::{
        database::{DatabaseEntry, EntryFlags, System},
        identify::{IdentitySource, crc32},
        mapper::{Provider, create},
    },
    load_cartridge, load_cartridge_from_file, load_cartridge_with,
};

fn split(rom: &[u8]) -> (&[u8], &[u8]) {
    let prg_len = usize::from(rom[4]) * 16 * 1024;
    rom[16..].split_at(prg_len)
}

#[test]
fn nes2_header_drives_identity() -> Result<()> {
    let rom = RomBuilder::new(4, 128, 128).four_screen().nes2(0, 7, 0).build();
    let cartridge = load_cartridge(&rom)?;

    let identity = cartridge.identity();
    assert_eq!(identity.mapper, 4);
    assert_eq!(identity.mirroring, Mirroring::FourScreen);
    assert_eq!(identity.wrk_size, 8 * 1024);
    assert!(!identity.wrk_auto);
    assert_eq!(identity.source, IdentitySource::Header);
    assert_eq!(cartridge.mirroring(), Mirroring::FourScreen);
    assert_eq!(cartridge.mapper().name(), "MMC3");
    Ok(())
}

#[test]
fn nes2_battery_size_comes_from_nvram_shift() -> Result<()> {
    // 8 KiB volatile, 2 KiB battery backed.
    let rom = RomBuilder::new(0, 32, 8).nes2(0, 7, 5).build();
    let mut cartridge = load_cartridge(&rom)?;

    assert_eq!(cartridge.identity().wrk_size, 10 * 1024);
    cartridge.cpu_write(0x6000, 0x5A);
    let save = cartridge.save_ram().expect("battery ram");
    assert_eq!(save.len(), 2 * 1024);
    assert_eq!(save[0], 0x5A);
    Ok(())
}

#[test]
fn dirty_header_drops_mapper_high_nibble() -> Result<()> {
    let rom = RomBuilder::new(1, 128, 0).signed(b"DiskDude!").build();

    let cartridge = load_cartridge(&rom)?;
    assert!(cartridge.header().dirty);
    assert_eq!(cartridge.header().mapper, 0x41);
    assert_eq!(cartridge.mapper().mapper_id(), 1);

    let trusting = Environment::default()
        .with_options(LoadOptions::default().with_dirty_header_trust(true));
    let cartridge = load_cartridge_with(&rom, trusting)?;
    assert_eq!(cartridge.mapper().mapper_id(), 0x41);
    Ok(())
}

#[test]
fn database_overrides_dirty_header() -> Result<()> {
    let rom = RomBuilder::new(1, 128, 128).signed(b"DiskDude!").build();
    let (prg, chr) = split(&rom);
    let database = RomDatabase::new([DatabaseEntry {
        crc: crc32(prg, chr),
        mapper: 4,
        prg_size: prg.len(),
        chr_size: chr.len(),
        wrk_size: 8 * 1024,
        system: System::Pal,
        mirroring: Mirroring::Vertical,
        flags: EntryFlags::BATTERY,
        attribute: 0,
    }]);

    let mut cartridge =
        load_cartridge_with(&rom, Environment::default().with_database(&database))?;
    assert_eq!(cartridge.identity().source, IdentitySource::Database);
    assert_eq!(cartridge.mapper().mapper_id(), 4);
    assert_eq!(cartridge.mirroring(), Mirroring::Vertical);
    assert_eq!(cartridge.region(), Region::Pal);

    // MMC3 boots with work RAM disabled.
    cartridge.cpu_write(0xA001, 0x80);
    cartridge.cpu_write(0x6000, 0x99);
    assert_eq!(cartridge.save_ram().map(|ram| ram[0]), Some(0x99));

    let ignored = Environment::default()
        .with_database(&database)
        .with_options(LoadOptions::default().with_database(false));
    let cartridge = load_cartridge_with(&rom, ignored)?;
    assert_eq!(cartridge.identity().source, IdentitySource::Header);
    assert_eq!(cartridge.mapper().mapper_id(), 1);
    Ok(())
}

#[test]
fn region_override_wins() -> Result<()> {
    let rom = RomBuilder::new(0, 32, 8).build();
    let env = Environment::default().with_options(LoadOptions::default().with_region(Region::Dendy));
    let cartridge = load_cartridge_with(&rom, env)?;
    assert_eq!(cartridge.region(), Region::Dendy);
    Ok(())
}

#[test]
fn unknown_board_is_unsupported() {
    let rom = RomBuilder::new(4000, 32, 8).nes2(0, 0, 0).build();
    let err = load_cartridge(&rom).expect_err("no such board");
    assert!(matches!(err, Error::UnsupportedMapper { id: 4000 }));

    let ctx = Context::new(9999, vec![0; 0x8000].into(), Box::default());
    assert!(matches!(
        create(ctx),
        Err(Error::UnsupportedMapper { id: 9999 })
    ));
}

/// Serves unknown ids with an NROM board.
#[derive(Debug)]
struct NromFallback;

impl Provider for NromFallback {
    fn get_mapper(&self, mut ctx: Context) -> Option<Box<dyn Mapper>> {
        ctx.id = 0;
        create(ctx).ok()
    }
}

#[test]
fn provider_serves_unknown_ids() -> Result<()> {
    let rom = RomBuilder::new(4000, 32, 8).nes2(0, 0, 0).build();
    let env = Environment::default().with_provider(&NromFallback);
    let mut cartridge = load_cartridge_with(&rom, env)?;
    assert_eq!(cartridge.identity().mapper, 4000);
    assert_eq!(cartridge.mapper().mapper_id(), 0);
    assert_eq!(cartridge.cpu_read(0xE000), 3);
    Ok(())
}

#[test]
fn truncated_images_are_rejected() {
    let rom = RomBuilder::new(0, 32, 8).build();
    let err = load_cartridge(&rom[..rom.len() - 1]).expect_err("chr cut short");
    assert!(matches!(
        err,
        Error::SectionTooShort {
            section: "CHR ROM",
            expected: 0x2000,
            actual: 0x1FFF,
        }
    ));

    assert!(matches!(
        load_cartridge(&rom[..10]),
        Err(Error::InvalidHeader(_))
    ));
    assert!(matches!(
        load_cartridge(b"UNIF\0\0\0\0\0\0\0\0\0\0\0\0"),
        Err(Error::InvalidHeader(_))
    ));
}

#[test]
fn loads_from_file() -> Result<()> {
    let rom = RomBuilder::new(2, 128, 0).vertical().build();
    let path = std::env::temp_dir().join(format!("nesium-cartridge-{}.nes", std::process::id()));
    fs::write(&path, &rom)?;

    let loaded = load_cartridge_from_file(&path);
    fs::remove_file(&path)?;
    let mut cartridge = loaded?;
    assert_eq!(cartridge.mapper().mapper_id(), 2);
    assert_eq!(cartridge.cpu_read(0xC000), 14);

    let missing = load_cartridge_from_file(path.with_extension("missing"));
    assert!(matches!(missing, Err(Error::Io(_))));
    Ok(())
}

#[test]
fn reset_multicart_cycles_games() -> Result<()> {
    let rom = RomBuilder::new(60, 64, 32).build();
    let mut cartridge = load_cartridge(&rom)?;

    let mut games = Vec::new();
    for _ in 0..5 {
        games.push((cartridge.cpu_read(0x8000), cartridge.ppu_read(0x0000)));
        cartridge.reset(ResetKind::Soft);
    }
    assert_eq!(games, [(0, 0), (2, 8), (4, 16), (6, 24), (0, 0)]);

    cartridge.reset(ResetKind::Soft);
    cartridge.reset(ResetKind::PowerOn);
    assert_eq!(cartridge.cpu_read(0xC000), 0);
    Ok(())
}

#[test]
fn catalogue_builds_boards_by_name() -> Result<()> {
    let boards = [
        (5, "MMC5"),
        (6, "FFE F4xxx"),
        (8, "FFE F3xxx"),
        (17, "FFE F8xxx"),
        (90, "J.Y. Company (90)"),
        (209, "J.Y. Company (209)"),
        (211, "J.Y. Company (211)"),
        (141, "Sachen 8259A"),
        (39, "Study & Game 32-in-1"),
        (142, "Kaiser KS7032"),
        (207, "Taito X1-005 (207)"),
        (234, "Maxi 15"),
        (243, "Sachen SA-020A"),
    ];
    for (id, name) in boards {
        let rom = RomBuilder::new(id, 128, 128).build();
        let cartridge = load_cartridge(&rom)?;
        assert_eq!(cartridge.mapper().mapper_id(), id);
        assert_eq!(cartridge.mapper().name(), name);
    }
    Ok(())
}

#[test]
fn mmc5_boots_into_the_last_bank_with_64k_work_ram() -> Result<()> {
    // No documented work RAM size, so the board picks its own.
    let rom = RomBuilder::new(5, 256, 128).build();
    let mut cartridge = load_cartridge(&rom)?;
    assert_eq!(cartridge.cpu_read(0x8000), 31);
    assert_eq!(cartridge.mapper().prg_ram().map(<[u8]>::len), Some(64 * 1024));
    Ok(())
}
