//! Board abstraction and the factory that builds boards.
//!
//! A board is a small state machine: CPU writes land in its registers and
//! it answers by switching bank windows and nametables on the shared
//! [`Hardware`]. Boards never see the CPU directly. During reset they
//! install read/write bindings into their [`Bus`]; everything afterwards is
//! dispatch through that table.
//!
//! [`Mapped`] glues one board to its hardware and bus and exposes the
//! object-safe [`Mapper`] interface the rest of the emulator talks to.
//!
//! | Layer      | Owns                                   | Persisted as        |
//! |------------|----------------------------------------|---------------------|
//! | `Mapped`   | board id, `Hardware`, `Bus`            | `MPR { ID .. }`     |
//! | `Hardware` | bank sets, RAM sources, IRQ, mirroring | `PRG CHR NMT WRK ..`|
//! | board      | its registers                          | `REG { .. }`        |

use std::{borrow::Cow, fmt::Debug};

use dyn_clone::DynClone;
use tracing::{debug, warn};

use crate::{
    banks::{LAST, SIZE_8K, SIZE_16K, Source, SourceId, Sources},
    bus::{Bus, Peek, Poke},
    cartridge::{header::Mirroring, identify::crc32},
    config::DEFAULT_WRK_SIZE,
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    reset_kind::ResetKind,
    state::{Loader, Saver, Tag},
};

mod hardware;
mod ports;
mod provider;
mod vrc_irq;

pub mod mapper0;
pub mod mapper1;
pub mod mapper107;
pub mod mapper11;
pub mod mapper112;
pub mod mapper125;
pub mod mapper13;
pub mod mapper133;
pub mod mapper138;
pub mod mapper142;
pub mod mapper143;
pub mod mapper15;
pub mod mapper150;
pub mod mapper156;
pub mod mapper16;
pub mod mapper18;
pub mod mapper19;
pub mod mapper190;
pub mod mapper193;
pub mod mapper2;
pub mod mapper200;
pub mod mapper206;
pub mod mapper21;
pub mod mapper225;
pub mod mapper228;
pub mod mapper230;
pub mod mapper232;
pub mod mapper234;
pub mod mapper24;
pub mod mapper240;
pub mod mapper246;
pub mod mapper29;
pub mod mapper3;
pub mod mapper32;
pub mod mapper33;
pub mod mapper34;
pub mod mapper36;
pub mod mapper38;
pub mod mapper4;
pub mod mapper40;
pub mod mapper41;
pub mod mapper42;
pub mod mapper46;
pub mod mapper5;
pub mod mapper50;
pub mod mapper58;
pub mod mapper6;
pub mod mapper60;
pub mod mapper61;
pub mod mapper62;
pub mod mapper64;
pub mod mapper65;
pub mod mapper66;
pub mod mapper67;
pub mod mapper68;
pub mod mapper69;
pub mod mapper7;
pub mod mapper70;
pub mod mapper71;
pub mod mapper72;
pub mod mapper73;
pub mod mapper75;
pub mod mapper77;
pub mod mapper78;
pub mod mapper79;
pub mod mapper80;
pub mod mapper85;
pub mod mapper86;
pub mod mapper89;
pub mod mapper9;
pub mod mapper90;
pub mod mapper97;

pub use hardware::Hardware;
pub use ports::{Detached, PpuPort};
pub use provider::Provider;
pub(crate) use vrc_irq::VrcIrq;

/// CRC32 of Holy Diver, whose 74HC161 board wires mirroring like the Irem
/// variant of mapper 78.
pub const HOLY_DIVER: u32 = 0xBA51_AC6F;
/// CRC32 of Major League, an Irem G-101 game hardwired to single-screen.
pub const MAJOR_LEAGUE: u32 = 0x243A_8735;

/// Object-safe interface of a constructed board.
pub trait Mapper: DynClone + Debug + Send {
    /// Power cycle (`PowerOn`) or reset button (`Soft`).
    fn reset(&mut self, kind: ResetKind);

    /// CPU read of `$4020-$FFFF`; latches the result onto the open bus.
    fn cpu_read(&mut self, addr: u16) -> u8;

    fn cpu_write(&mut self, addr: u16, data: u8);

    /// PPU read of `$0000-$3EFF`. Pattern fetches also reach the board's
    /// fetch hook (A12 counters, MMC2 latches).
    fn ppu_read(&mut self, addr: u16) -> u8;

    fn ppu_write(&mut self, addr: u16, data: u8);

    /// Advances board timers by one CPU cycle.
    fn clock_cpu(&mut self);

    fn irq_pending(&self) -> bool;

    fn mirroring(&self) -> Mirroring;

    fn save_state(&self, saver: &mut Saver);

    /// Restores state written by [`Mapper::save_state`]. On error the
    /// mapper is left exactly as it was.
    fn load_state(&mut self, loader: &mut Loader<'_>) -> Result<(), Error>;

    fn mapper_id(&self) -> u16;

    fn name(&self) -> Cow<'static, str>;

    /// Work RAM at `$6000-$7FFF`, if the board has any.
    fn prg_ram(&self) -> Option<&[u8]>;

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]>;

    /// Battery-backed part of the work RAM.
    fn save_ram(&self) -> Option<&[u8]>;
}

dyn_clone::clone_trait_object!(Mapper);

/// Register logic of one board family.
pub trait Board: Clone + Debug + Send + 'static {
    /// Installs bindings and, on `hard` resets, the power-on register
    /// state. The bus has already been cleared and carries the default
    /// work RAM and PRG read bindings.
    fn reset(&mut self, hw: &mut Hardware, bus: &mut Bus<Self>, hard: bool);

    /// Writes the board's registers into the open `REG` chunk.
    fn save(&self, saver: &mut Saver) {
        let _ = saver;
    }

    /// Reads back what [`Board::save`] wrote.
    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        let _ = loader;
        Ok(())
    }

    /// Called once per CPU cycle.
    fn clock(&mut self, hw: &mut Hardware) {
        let _ = hw;
    }

    /// Called after every PPU read, with the address already masked to 14
    /// bits.
    fn ppu_fetch(&mut self, hw: &mut Hardware, addr: u16) {
        let _ = (hw, addr);
    }

    fn name(&self) -> Cow<'static, str>;
}

/// Construction parameters of a board.
///
/// The loader fills it from the identified ROM; a board constructor may
/// adjust `chr_ram`, `wrk_size` and `wrk_auto` before the backing buffers
/// are allocated.
#[derive(Debug)]
pub struct Context {
    pub id: u16,
    pub submapper: u8,
    /// CRC32 of PRG + CHR, for exact-match board variants.
    pub crc: u32,
    /// Database disambiguation byte.
    pub attribute: u8,
    pub prg: Box<[u8]>,
    /// CHR ROM; empty when the cartridge only carries CHR RAM.
    pub chr: Box<[u8]>,
    pub mirroring: Mirroring,
    pub wrk_size: usize,
    /// Battery-backed part of `wrk_size`.
    pub wrk_backed: usize,
    /// `wrk_size` is a default rather than a documented size; boards
    /// without work RAM drop it.
    pub wrk_auto: bool,
    /// CHR RAM in bytes. When CHR ROM is absent at least 8 KiB is
    /// allocated regardless.
    pub chr_ram: usize,
    /// Board-owned nametable RAM in bytes, on top of the four-screen VRAM
    /// a header may ask for.
    pub nmt_ram: usize,
    /// 512-byte trainer copied to `$7000`.
    pub trainer: Option<Box<[u8]>>,
    pub ppu: Box<dyn PpuPort>,
}

impl Context {
    /// A context with default work RAM, horizontal mirroring and no PPU.
    pub fn new(id: u16, prg: Box<[u8]>, chr: Box<[u8]>) -> Self {
        Self {
            id,
            submapper: 0,
            crc: crc32(&prg, &chr),
            attribute: 0,
            prg,
            chr,
            mirroring: Mirroring::Horizontal,
            wrk_size: DEFAULT_WRK_SIZE,
            wrk_backed: 0,
            wrk_auto: true,
            chr_ram: 0,
            nmt_ram: 0,
            trainer: None,
            ppu: Box::new(Detached),
        }
    }

    pub fn with_mirroring(mut self, mirroring: Mirroring) -> Self {
        self.mirroring = mirroring;
        self
    }

    pub fn with_attribute(mut self, attribute: u8) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_crc(mut self, crc: u32) -> Self {
        self.crc = crc;
        self
    }

    pub fn with_ppu(mut self, ppu: Box<dyn PpuPort>) -> Self {
        self.ppu = ppu;
        self
    }

    /// Drops default work RAM; documented sizes stay.
    pub(crate) fn drop_auto_wrk(&mut self) {
        if self.wrk_auto {
            self.wrk_size = 0;
            self.wrk_backed = 0;
        }
    }
}

/// Allocates a zero-filled buffer without aborting on exhaustion.
pub(crate) fn allocate(len: usize) -> Result<Box<[u8]>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf.into_boxed_slice())
}

fn build_sources(ctx: &mut Context) -> Result<Sources, Error> {
    let mut sources = Sources::default();

    let prg = std::mem::take(&mut ctx.prg);
    sources.insert(SourceId::Prg, Source::new(prg, false));

    let chr = std::mem::take(&mut ctx.chr);
    if chr.is_empty() {
        let len = ctx.chr_ram.max(SIZE_8K);
        sources.insert(SourceId::Chr, Source::new(allocate(len)?, true));
    } else {
        sources.insert(SourceId::Chr, Source::new(chr, false));
        if ctx.chr_ram > 0 {
            sources.insert(SourceId::ChrRam, Source::new(allocate(ctx.chr_ram)?, true));
        }
    }

    if ctx.wrk_size > 0 {
        let mut wrk = allocate(ctx.wrk_size)?;
        if let Some(trainer) = ctx.trainer.as_deref() {
            let at = 0x1000;
            if let Some(dst) = wrk.get_mut(at..at + trainer.len()) {
                dst.copy_from_slice(trainer);
            }
        }
        sources.insert(SourceId::Wrk, Source::new(wrk, true));
    }

    sources.insert(
        SourceId::Ciram,
        Source::new(allocate(ppu_mem::CIRAM_SIZE)?, true),
    );
    let four_screen = if ctx.mirroring == Mirroring::FourScreen {
        ppu_mem::CIRAM_SIZE
    } else {
        0
    };
    let vram = ctx.nmt_ram.max(four_screen);
    if vram > 0 {
        sources.insert(SourceId::Vram, Source::new(allocate(vram)?, true));
    }
    Ok(sources)
}

/// A board bound to its hardware and bus.
#[derive(Debug, Clone)]
pub struct Mapped<B: Board> {
    id: u16,
    wrk_backed: usize,
    board: B,
    hw: Hardware,
    bus: Bus<B>,
}

/// Chunks every mapper state carries; a stream without one of them would
/// leave part of the board at its pre-load value.
const REQUIRED_CHUNKS: [Tag; 7] = [
    Tag::Id,
    Tag::Prg,
    Tag::Chr,
    Tag::Nmt,
    Tag::Wrk,
    Tag::Irq,
    Tag::Reg,
];

impl<B: Board> Mapped<B> {
    /// Allocates the backing buffers described by `ctx`. The result is not
    /// reset yet.
    pub fn new(mut ctx: Context, board: B) -> Result<Self, Error> {
        let sources = build_sources(&mut ctx)?;
        let Context {
            id,
            submapper,
            crc,
            attribute,
            mirroring,
            wrk_size,
            wrk_backed,
            ppu,
            ..
        } = ctx;
        let hw = Hardware::new(sources, ppu, crc, attribute, submapper, mirroring);
        Ok(Self {
            id,
            wrk_backed: wrk_backed.min(wrk_size),
            board,
            hw,
            bus: Bus::new(),
        })
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hw
    }

    fn load_into(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        loader.expect(Tag::Mapper)?;
        let mut seen = [false; REQUIRED_CHUNKS.len()];
        while let Some(fourcc) = loader.begin()? {
            let tag = Tag::from_repr(fourcc);
            match tag {
                Some(Tag::Id) => {
                    if loader.read16()? != self.id {
                        return Err(Error::CorruptSaveState("state belongs to another board"));
                    }
                }
                Some(Tag::Reg) => self.board.load(loader)?,
                Some(tag) if self.hw.load_chunk(tag, loader)? => {}
                _ => warn!(
                    "skipping unknown chunk {} in mapper {} state",
                    Tag::display(fourcc),
                    self.id
                ),
            }
            if let Some(slot) = REQUIRED_CHUNKS.iter().position(|&t| Some(t) == tag) {
                seen[slot] = true;
            }
            loader.end()?;
        }
        loader.end()?;
        if let Some(slot) = seen.iter().position(|&found| !found) {
            warn!(
                "mapper {} state lacks a {} chunk",
                self.id,
                Tag::display(REQUIRED_CHUNKS[slot].fourcc())
            );
            return Err(Error::CorruptSaveState("mapper state is missing a chunk"));
        }
        Ok(())
    }
}

impl<B: Board> Mapper for Mapped<B> {
    fn reset(&mut self, kind: ResetKind) {
        let hard = kind.is_hard();
        let Self { board, hw, bus, .. } = self;

        bus.clear();
        if hw.has_wrk() {
            bus.map(cpu_mem::PRG_RAM_START, cpu_mem::PRG_RAM_END, Peek::Wrk, Poke::Wrk);
        }
        bus.map_peek(cpu_mem::PRG_ROM_START, cpu_mem::CPU_ADDR_END, Peek::Prg);

        if hard {
            hw.swap_prgs(SIZE_16K, 0x8000, &[0, LAST]);
            hw.swap_chr(SIZE_8K, 0x0000, 0);
            hw.swap_wrk(0);
            hw.set_wrk_access(true, true);
            hw.set_chr_access(true, true);
            hw.set_mirroring(hw.header_mirroring());
            hw.open_bus.reset();
        }
        hw.irq = false;
        board.reset(hw, bus, hard);
        debug!("{} reset ({kind:?})", board.name());
    }

    fn cpu_read(&mut self, addr: u16) -> u8 {
        let value = self.bus.peek(addr).apply(&mut self.board, &mut self.hw, addr);
        self.hw.open_bus.latch(value);
        value
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        self.hw.open_bus.latch(data);
        self.bus
            .poke(addr)
            .apply(&mut self.board, &mut self.hw, addr, data);
    }

    fn ppu_read(&mut self, addr: u16) -> u8 {
        let addr = addr & ppu_mem::ADDR_MASK;
        let value = self.hw.peek_ppu(addr);
        self.board.ppu_fetch(&mut self.hw, addr);
        value
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        self.hw.poke_ppu(addr & ppu_mem::ADDR_MASK, data);
    }

    fn clock_cpu(&mut self) {
        self.hw.tick();
        self.board.clock(&mut self.hw);
    }

    fn irq_pending(&self) -> bool {
        self.hw.irq
    }

    fn mirroring(&self) -> Mirroring {
        self.hw.mirroring()
    }

    fn save_state(&self, saver: &mut Saver) {
        saver.begin(Tag::Mapper);
        saver.begin(Tag::Id).write16(self.id).end();
        self.hw.save(saver);
        saver.begin(Tag::Reg);
        self.board.save(saver);
        saver.end();
        saver.end();
    }

    fn load_state(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        let mut next = self.clone();
        next.load_into(loader)?;
        std::mem::swap(&mut next.hw.ppu, &mut self.hw.ppu);
        *self = next;
        Ok(())
    }

    fn mapper_id(&self) -> u16 {
        self.id
    }

    fn name(&self) -> Cow<'static, str> {
        self.board.name()
    }

    fn prg_ram(&self) -> Option<&[u8]> {
        let wrk = self.hw.sources.get(SourceId::Wrk);
        (!wrk.is_empty()).then(|| wrk.as_slice())
    }

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        let wrk = self.hw.sources.get_mut(SourceId::Wrk);
        (!wrk.is_empty()).then(|| wrk.as_mut_slice())
    }

    fn save_ram(&self) -> Option<&[u8]> {
        let backed = self.wrk_backed;
        self.prg_ram()
            .filter(|_| backed > 0)
            .map(|wrk| &wrk[..backed.min(wrk.len())])
    }
}

/// Every board id [`create`] accepts, ascending.
pub const IMPLEMENTED: &[u16] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 16, 17, 18, 19, 21, 22, 23, 24, 25, 26, 29, 32,
    33, 34, 36, 38, 39, 40, 41, 42, 46, 48, 50, 58, 60, 61, 62, 64, 65, 66, 67, 68, 69, 70, 71, 72,
    73, 75, 76, 77, 78, 79, 80, 82, 85, 86, 87, 88, 89, 90, 92, 93, 94, 95, 97, 101, 107, 112, 113,
    118, 119, 125, 133, 138, 139, 140, 141, 142, 143, 144, 145, 146, 148, 149, 150, 152, 154, 156,
    159, 177, 180, 184, 185, 189, 190, 193, 200, 201, 202, 203, 206, 207, 209, 211, 212, 213, 225,
    226, 228, 229, 230, 231, 232, 233, 234, 240, 241, 242, 243, 244, 246,
];

pub fn implemented_ids() -> &'static [u16] {
    IMPLEMENTED
}

/// Builds and power-cycles the board for `ctx.id`.
pub fn create(ctx: Context) -> Result<Box<dyn Mapper>, Error> {
    create_with(ctx, None)
}

/// Like [`create`], asking `provider` for ids the catalogue lacks.
pub fn create_with(ctx: Context, provider: Option<&dyn Provider>) -> Result<Box<dyn Mapper>, Error> {
    use self::{
        mapper0::Mapper0, mapper1::Mapper1, mapper2::Mapper2, mapper3::Mapper3, mapper4::Mapper4,
        mapper5::Mapper5, mapper6::Mapper6, mapper7::Mapper7, mapper9::Mapper9, mapper11::Mapper11,
        mapper13::Mapper13, mapper15::Mapper15, mapper16::Mapper16, mapper18::Mapper18,
        mapper19::Mapper19, mapper21::Mapper21, mapper24::Mapper24, mapper29::Mapper29,
        mapper32::Mapper32, mapper33::Mapper33, mapper34::Mapper34, mapper36::Mapper36,
        mapper38::Mapper38, mapper40::Mapper40, mapper41::Mapper41, mapper42::Mapper42,
        mapper46::Mapper46, mapper50::Mapper50, mapper58::Mapper58, mapper60::Mapper60,
        mapper61::Mapper61, mapper62::Mapper62, mapper64::Mapper64, mapper65::Mapper65,
        mapper66::Mapper66, mapper67::Mapper67, mapper68::Mapper68, mapper69::Mapper69,
        mapper70::Mapper70, mapper71::Mapper71, mapper72::Mapper72, mapper73::Mapper73,
        mapper75::Mapper75, mapper77::Mapper77, mapper78::Mapper78, mapper79::Mapper79,
        mapper80::Mapper80, mapper85::Mapper85, mapper86::Mapper86, mapper89::Mapper89,
        mapper90::Mapper90, mapper97::Mapper97, mapper107::Mapper107, mapper112::Mapper112,
        mapper125::Mapper125, mapper133::Mapper133, mapper138::Mapper138, mapper142::Mapper142,
        mapper143::Mapper143, mapper150::Mapper150, mapper156::Mapper156, mapper190::Mapper190,
        mapper193::Mapper193, mapper200::Mapper200, mapper206::Mapper206, mapper225::Mapper225,
        mapper228::Mapper228, mapper230::Mapper230, mapper232::Mapper232, mapper234::Mapper234,
        mapper240::Mapper240, mapper246::Mapper246,
    };

    let id = ctx.id;
    debug!("building mapper {id} (crc {:#010x})", ctx.crc);
    match id {
        0 => build(ctx, Mapper0::new),
        1 => build(ctx, Mapper1::new),
        2 | 94 | 180 => build(ctx, Mapper2::new),
        3 | 185 => build(ctx, Mapper3::new),
        4 | 118 | 119 | 189 => build(ctx, Mapper4::new),
        5 => build(ctx, Mapper5::new),
        6 | 8 | 17 => build(ctx, Mapper6::new),
        7 => build(ctx, Mapper7::new),
        9 | 10 => build(ctx, Mapper9::new),
        11 | 144 => build(ctx, Mapper11::new),
        13 => build(ctx, Mapper13::new),
        15 => build(ctx, Mapper15::new),
        16 | 159 => build(ctx, Mapper16::new),
        18 => build(ctx, Mapper18::new),
        19 => build(ctx, Mapper19::new),
        21 | 22 | 23 | 25 => build(ctx, Mapper21::new),
        24 | 26 => build(ctx, Mapper24::new),
        29 => build(ctx, Mapper29::new),
        32 => build(ctx, Mapper32::new),
        33 | 48 => build(ctx, Mapper33::new),
        34 => build(ctx, Mapper34::new),
        36 => build(ctx, Mapper36::new),
        38 => build(ctx, Mapper38::new),
        40 => build(ctx, Mapper40::new),
        41 => build(ctx, Mapper41::new),
        42 => build(ctx, Mapper42::new),
        46 => build(ctx, Mapper46::new),
        50 => build(ctx, Mapper50::new),
        58 => build(ctx, Mapper58::new),
        60 => build(ctx, Mapper60::new),
        61 => build(ctx, Mapper61::new),
        62 => build(ctx, Mapper62::new),
        64 => build(ctx, Mapper64::new),
        65 => build(ctx, Mapper65::new),
        66 | 140 => build(ctx, Mapper66::new),
        67 => build(ctx, Mapper67::new),
        68 => build(ctx, Mapper68::new),
        69 => build(ctx, Mapper69::new),
        70 | 152 => build(ctx, Mapper70::new),
        71 => build(ctx, Mapper71::new),
        72 | 92 => build(ctx, Mapper72::new),
        73 => build(ctx, Mapper73::new),
        75 => build(ctx, Mapper75::new),
        77 => build(ctx, Mapper77::new),
        78 => build(ctx, Mapper78::new),
        79 | 113 | 146 => build(ctx, Mapper79::new),
        80 | 82 | 207 => build(ctx, Mapper80::new),
        85 => build(ctx, Mapper85::new),
        86 | 87 | 101 | 184 => build(ctx, Mapper86::new),
        89 | 93 => build(ctx, Mapper89::new),
        90 | 209 | 211 => build(ctx, Mapper90::new),
        97 => build(ctx, Mapper97::new),
        39 | 107 | 177 | 241 => build(ctx, Mapper107::new),
        112 => build(ctx, Mapper112::new),
        125 => build(ctx, Mapper125::new),
        133 | 145 | 148 | 149 => build(ctx, Mapper133::new),
        138 | 139 | 141 => build(ctx, Mapper138::new),
        143 => build(ctx, Mapper143::new),
        142 => build(ctx, Mapper142::new),
        150 | 243 => build(ctx, Mapper150::new),
        156 => build(ctx, Mapper156::new),
        190 => build(ctx, Mapper190::new),
        193 => build(ctx, Mapper193::new),
        200 | 201 | 202 | 203 | 212 | 213 | 229 | 231 | 242 => build(ctx, Mapper200::new),
        76 | 88 | 95 | 154 | 206 => build(ctx, Mapper206::new),
        225 | 226 => build(ctx, Mapper225::new),
        228 => build(ctx, Mapper228::new),
        230 | 233 => build(ctx, Mapper230::new),
        232 => build(ctx, Mapper232::new),
        234 => build(ctx, Mapper234::new),
        240 | 244 => build(ctx, Mapper240::new),
        246 => build(ctx, Mapper246::new),
        _ => match provider.and_then(|provider| provider.get_mapper(ctx)) {
            Some(mapper) => Ok(mapper),
            None => Err(Error::UnsupportedMapper { id }),
        },
    }
}

fn build<B: Board>(
    mut ctx: Context,
    new: impl FnOnce(&mut Context) -> B,
) -> Result<Box<dyn Mapper>, Error> {
    let board = new(&mut ctx);
    let mut mapped = Mapped::new(ctx, board)?;
    mapped.reset(ResetKind::PowerOn);
    debug!("mapper {} ready: {}", mapped.id, mapped.board.name());
    Ok(Box::new(mapped))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// PRG where every byte holds its 8 KiB bank index and CHR where every
    /// byte holds its 1 KiB bank index.
    pub fn context(id: u16, prg_kib: usize, chr_kib: usize) -> Context {
        let prg: Vec<u8> = (0..prg_kib * 1024).map(|i| (i / SIZE_8K) as u8).collect();
        let chr: Vec<u8> = (0..chr_kib * 1024).map(|i| (i / 1024) as u8).collect();
        Context::new(id, prg.into(), chr.into())
    }

    pub fn mapper(ctx: Context) -> Box<dyn Mapper> {
        create(ctx).expect("board builds")
    }

    /// 8 KiB PRG bank visible at `addr`.
    pub fn prg_bank(mapper: &mut dyn Mapper, addr: u16) -> u8 {
        mapper.cpu_read(addr)
    }

    /// 1 KiB CHR bank visible at `addr`.
    pub fn chr_bank(mapper: &mut dyn Mapper, addr: u16) -> u8 {
        mapper.ppu_read(addr)
    }
}
