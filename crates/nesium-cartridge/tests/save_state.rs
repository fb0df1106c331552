mod common;

use anyhow::{Result, ensure};
use common::RomBuilder;
use nesium_cartridge::{
    Context, Error, Mapper, ResetKind,
    cartridge::mapper::{create, implemented_ids},
    load_cartridge,
    state::{Loader, Saver, Tag, fourcc},
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, Copy)]
enum Op {
    Write(u16, u8),
    Clock(u16),
    PpuRead(u16),
}

fn board(id: u16) -> Box<dyn Mapper> {
    let prg: Vec<u8> = (0..512 * 1024).map(|i| (i / 0x2000) as u8).collect();
    let chr: Vec<u8> = (0..256 * 1024).map(|i| (i / 0x400) as u8).collect();
    create(Context::new(id, prg.into(), chr.into()))
        .unwrap_or_else(|err| panic!("mapper {id} failed to build: {err}"))
}

fn apply(mapper: &mut dyn Mapper, ops: &[Op]) {
    for &op in ops {
        match op {
            Op::Write(addr, data) => mapper.cpu_write(addr, data),
            Op::Clock(cycles) => (0..cycles).for_each(|_| mapper.clock_cpu()),
            Op::PpuRead(addr) => {
                mapper.ppu_read(addr);
            }
        }
    }
}

fn random_ops<R: Rng>(rng: &mut R, len: usize) -> Vec<Op> {
    (0..len)
        .map(|_| match rng.random_range(0..10) {
            0 => Op::Clock(rng.random_range(1..400)),
            1 => Op::PpuRead(rng.random_range(0..0x3000)),
            _ => Op::Write(rng.random_range(0x4020..=0xFFFF), rng.random()),
        })
        .collect()
}

/// Everything a CPU or PPU could observe without clocking the board.
/// PRG is read first so the open bus latch agrees before unmapped reads.
#[derive(Debug, PartialEq, Eq)]
struct Observation {
    irq: bool,
    mirroring: String,
    prg: Vec<u8>,
    wrk: Vec<u8>,
    ppu: Vec<u8>,
}

fn observe(mapper: &mut dyn Mapper) -> Observation {
    let irq = mapper.irq_pending();
    let mirroring = format!("{:?}", mapper.mirroring());
    let prg = (0x8000..=0xFFFFu32)
        .step_by(0x400)
        .map(|addr| mapper.cpu_read(addr as u16))
        .collect();
    let wrk = (0x6000..0x8000u16)
        .step_by(0x200)
        .map(|addr| mapper.cpu_read(addr))
        .collect();
    let ppu = (0x0000..0x3000u16)
        .step_by(0x100)
        .map(|addr| mapper.ppu_read(addr))
        .collect();
    Observation {
        irq,
        mirroring,
        prg,
        wrk,
        ppu,
    }
}

/// Saves after `before`, diverges with `after`, restores and compares with
/// a clone taken at save time.
fn check_round_trip(id: u16, before: &[Op], after: &[Op]) -> Result<()> {
    let mut mapper = board(id);
    apply(mapper.as_mut(), before);

    let mut saver = Saver::new();
    mapper.save_state(&mut saver);
    let snapshot = saver.into_bytes();
    let mut expected = mapper.clone();

    apply(mapper.as_mut(), after);
    mapper.load_state(&mut Loader::new(&snapshot))?;

    let actual = observe(mapper.as_mut());
    let wanted = observe(expected.as_mut());
    ensure!(actual == wanted, "mapper {id} diverged after load: {actual:?} != {wanted:?}");
    Ok(())
}

#[test]
fn every_board_restores_its_state() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x4E45_5300);
    for &id in implemented_ids() {
        for _ in 0..4 {
            let before = random_ops(&mut rng, 48);
            let after = random_ops(&mut rng, 48);
            check_round_trip(id, &before, &after)?;
        }
    }
    Ok(())
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0x4020u16..=0xFFFF, any::<u8>()).prop_map(|(addr, data)| Op::Write(addr, data)),
        1 => (1u16..400).prop_map(Op::Clock),
        1 => (0u16..0x3000).prop_map(Op::PpuRead),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn restored_board_matches_snapshot(
        index in 0..implemented_ids().len(),
        before in prop::collection::vec(op_strategy(), 0..64),
        after in prop::collection::vec(op_strategy(), 1..64),
    ) {
        let id = implemented_ids()[index];
        let result = check_round_trip(id, &before, &after);
        prop_assert!(result.is_ok(), "{:?}", result);
    }
}

#[test]
fn truncated_state_leaves_board_untouched() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for &id in implemented_ids() {
        let mut mapper = board(id);
        let mut saver = Saver::new();
        mapper.save_state(&mut saver);
        let snapshot = saver.into_bytes();

        apply(mapper.as_mut(), &random_ops(&mut rng, 32));
        let mut expected = mapper.clone();

        for cut in [snapshot.len() - 1, snapshot.len() / 2, 12, 3] {
            let err = mapper.load_state(&mut Loader::new(&snapshot[..cut]));
            ensure!(
                matches!(err, Err(Error::CorruptSaveState(_))),
                "mapper {id} accepted a state cut at {cut}"
            );
        }
        ensure!(
            observe(mapper.as_mut()) == observe(expected.as_mut()),
            "mapper {id} changed on a failed load"
        );
    }
    Ok(())
}

#[test]
fn unknown_chunks_are_skipped() -> Result<()> {
    let mut mapper = board(4);
    mapper.cpu_write(0x8000, 0x06);
    mapper.cpu_write(0x8001, 0x09);
    let mut saver = Saver::new();
    mapper.save_state(&mut saver);
    let snapshot = saver.into_bytes();

    // Re-wrap the board chunks with a foreign chunk in front.
    let inner = &snapshot[8..];
    let mut saver = Saver::new();
    saver
        .begin(Tag::Mapper)
        .begin_raw(fourcc(b"XTRA"))
        .write(&[0xDE, 0xAD, 0xBE, 0xEF])
        .end()
        .write(inner)
        .end();
    let extended = saver.into_bytes();

    let mut fresh = board(4);
    fresh.load_state(&mut Loader::new(&extended))?;
    assert_eq!(fresh.cpu_read(0x8000), 9);
    Ok(())
}

/// Splits the payload of the outer mapper chunk into its raw sub-chunks.
fn sub_chunks(snapshot: &[u8]) -> Vec<(u32, &[u8])> {
    let mut chunks = Vec::new();
    let mut rest = &snapshot[8..];
    while !rest.is_empty() {
        let fourcc = u32::from_le_bytes(rest[..4].try_into().unwrap());
        let len = u32::from_le_bytes(rest[4..8].try_into().unwrap()) as usize;
        chunks.push((fourcc, &rest[..8 + len]));
        rest = &rest[8 + len..];
    }
    chunks
}

#[test]
fn state_missing_a_chunk_is_rejected() -> Result<()> {
    let mut mapper = board(4);
    mapper.cpu_write(0x8000, 0x06);
    mapper.cpu_write(0x8001, 0x09);
    let mut saver = Saver::new();
    mapper.save_state(&mut saver);
    let snapshot = saver.into_bytes();
    let chunks = sub_chunks(&snapshot);

    for tag in [Tag::Id, Tag::Prg, Tag::Chr, Tag::Nmt, Tag::Wrk, Tag::Irq, Tag::Reg] {
        let mut saver = Saver::new();
        saver.begin(Tag::Mapper);
        for &(fourcc, bytes) in &chunks {
            if fourcc != tag.fourcc() {
                saver.write(bytes);
            }
        }
        saver.end();
        let stripped = saver.into_bytes();
        ensure!(stripped.len() < snapshot.len(), "no {tag:?} chunk in the state");

        let mut fresh = board(4);
        let err = fresh.load_state(&mut Loader::new(&stripped));
        ensure!(
            matches!(err, Err(Error::CorruptSaveState(_))),
            "state without {tag:?} was accepted"
        );
        // The failed load leaves power-on banks in place.
        ensure!(fresh.cpu_read(0x8000) == 0, "state without {tag:?} leaked into the board");
    }
    Ok(())
}

#[test]
fn state_of_another_board_is_rejected() {
    let mut saver = Saver::new();
    board(1).save_state(&mut saver);
    let snapshot = saver.into_bytes();

    let mut mmc3 = board(4);
    let err = mmc3.load_state(&mut Loader::new(&snapshot)).unwrap_err();
    assert!(matches!(err, Error::CorruptSaveState(_)));
}

#[test]
fn work_ram_survives_through_cartridge() -> Result<()> {
    let rom = RomBuilder::new(1, 128, 0).battery().build();
    let mut cartridge = load_cartridge(&rom)?;
    for (i, addr) in (0x6000..0x6100u16).enumerate() {
        cartridge.cpu_write(addr, i as u8);
    }
    let snapshot = cartridge.save_state();
    // Zero-filled work RAM compresses well.
    assert!(snapshot.len() < 4 * 1024);

    cartridge.reset(ResetKind::PowerOn);
    cartridge.cpu_write(0x6010, 0xFF);
    cartridge.load_state(&snapshot)?;
    assert_eq!(cartridge.cpu_read(0x6010), 0x10);
    assert_eq!(cartridge.cpu_read(0x60FF), 0xFF);
    Ok(())
}
