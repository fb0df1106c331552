//! CPU-side dispatch table of one mapper.
//!
//! Every cartridge address (`$0000-$FFFF`, though the console only routes
//! `$4020` upward) resolves to one read binding ([`Peek`]) and one write
//! binding ([`Poke`]). Bindings are stored once and referenced from a flat
//! per-address index table, so dispatch is two array lookups and a match.
//!
//! Boards install their bindings during reset and never touch the table at
//! run time; anything that depends on register state is decided inside the
//! handler.
//!
//! ```text
//! addr ──► peek_index[addr] ──► peeks[i] ──► Prg / Wrk / Board(fn) / OpenBus
//! addr ──► poke_index[addr] ──► pokes[i] ──► Prg16k / NmtVh / Board(fn) / ...
//! ```

mod open_bus;

pub use open_bus::OpenBus;

use std::fmt;

use crate::{
    banks::{SIZE_1K, SIZE_2K, SIZE_4K, SIZE_8K, SIZE_16K, SIZE_32K},
    cartridge::mapper::Hardware,
};

const ADDRESS_SPACE: usize = 0x1_0000;

pub type PeekFn<B> = fn(&mut B, &mut Hardware, u16) -> u8;
pub type PokeFn<B> = fn(&mut B, &mut Hardware, u16, u8);

/// Read binding.
pub enum Peek<B> {
    /// Nothing drives the bus.
    OpenBus,
    /// PRG window at the address.
    Prg,
    /// Work RAM window at the address.
    Wrk,
    /// Board-specific handler.
    Board(PeekFn<B>),
}

/// Write binding. The `u16` operands name the window base address the
/// written value selects a bank for.
pub enum Poke<B> {
    Nop,
    /// Store into the work RAM window.
    Wrk,
    Prg8k(u16),
    Prg16k(u16),
    Prg32k,
    Chr1k(u16),
    Chr2k(u16),
    Chr4k(u16),
    Chr8k,
    /// The written value is ANDed with the ROM byte at the same address.
    Prg16kBc(u16),
    Prg32kBc,
    Chr8kBc,
    /// Mirroring from bit 0: horizontal/vertical.
    NmtHv,
    /// Mirroring from bit 0: vertical/horizontal.
    NmtVh,
    /// Mirroring from bits 0-1: vertical, horizontal, lower, upper.
    NmtVh01,
    /// Mirroring from bits 0-1: horizontal, vertical, lower, upper.
    NmtHv01,
    Board(PokeFn<B>),
}

impl<B> Clone for Peek<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Peek<B> {}

impl<B> Clone for Poke<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for Poke<B> {}

impl<B> fmt::Debug for Peek<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peek::OpenBus => f.write_str("OpenBus"),
            Peek::Prg => f.write_str("Prg"),
            Peek::Wrk => f.write_str("Wrk"),
            Peek::Board(_) => f.write_str("Board"),
        }
    }
}

impl<B> fmt::Debug for Poke<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Poke::Nop => f.write_str("Nop"),
            Poke::Wrk => f.write_str("Wrk"),
            Poke::Prg8k(addr) => write!(f, "Prg8k({addr:#06x})"),
            Poke::Prg16k(addr) => write!(f, "Prg16k({addr:#06x})"),
            Poke::Prg32k => f.write_str("Prg32k"),
            Poke::Chr1k(addr) => write!(f, "Chr1k({addr:#06x})"),
            Poke::Chr2k(addr) => write!(f, "Chr2k({addr:#06x})"),
            Poke::Chr4k(addr) => write!(f, "Chr4k({addr:#06x})"),
            Poke::Chr8k => f.write_str("Chr8k"),
            Poke::Prg16kBc(addr) => write!(f, "Prg16kBc({addr:#06x})"),
            Poke::Prg32kBc => f.write_str("Prg32kBc"),
            Poke::Chr8kBc => f.write_str("Chr8kBc"),
            Poke::NmtHv => f.write_str("NmtHv"),
            Poke::NmtVh => f.write_str("NmtVh"),
            Poke::NmtVh01 => f.write_str("NmtVh01"),
            Poke::NmtHv01 => f.write_str("NmtHv01"),
            Poke::Board(_) => f.write_str("Board"),
        }
    }
}

impl<B> Peek<B> {
    #[inline]
    pub fn apply(self, board: &mut B, hw: &mut Hardware, addr: u16) -> u8 {
        match self {
            Peek::OpenBus => hw.open_bus.sample(),
            Peek::Prg => hw.peek_prg(addr),
            Peek::Wrk => hw.peek_wrk(addr),
            Peek::Board(handler) => handler(board, hw, addr),
        }
    }
}

impl<B> Poke<B> {
    #[inline]
    pub fn apply(self, board: &mut B, hw: &mut Hardware, addr: u16, data: u8) {
        let bank = u32::from(data);
        match self {
            Poke::Nop => {}
            Poke::Wrk => hw.poke_wrk(addr, data),
            Poke::Prg8k(base) => hw.swap_prg(SIZE_8K, base, bank),
            Poke::Prg16k(base) => hw.swap_prg(SIZE_16K, base, bank),
            Poke::Prg32k => hw.swap_prg(SIZE_32K, 0x8000, bank),
            Poke::Chr1k(base) => hw.swap_chr(SIZE_1K, base, bank),
            Poke::Chr2k(base) => hw.swap_chr(SIZE_2K, base, bank),
            Poke::Chr4k(base) => hw.swap_chr(SIZE_4K, base, bank),
            Poke::Chr8k => hw.swap_chr(SIZE_8K, 0x0000, bank),
            Poke::Prg16kBc(base) => {
                let bank = u32::from(hw.bus_conflict(addr, data));
                hw.swap_prg(SIZE_16K, base, bank);
            }
            Poke::Prg32kBc => {
                let bank = u32::from(hw.bus_conflict(addr, data));
                hw.swap_prg(SIZE_32K, 0x8000, bank);
            }
            Poke::Chr8kBc => {
                let bank = u32::from(hw.bus_conflict(addr, data));
                hw.swap_chr(SIZE_8K, 0x0000, bank);
            }
            Poke::NmtHv => hw.set_mirroring_hv(data),
            Poke::NmtVh => hw.set_mirroring_vh(data),
            Poke::NmtVh01 => hw.set_mirroring_vh01(data),
            Poke::NmtHv01 => hw.set_mirroring_hv01(data),
            Poke::Board(handler) => handler(board, hw, addr, data),
        }
    }
}

/// Per-address read and write bindings.
pub struct Bus<B> {
    peek_index: Box<[u16]>,
    poke_index: Box<[u16]>,
    peeks: Vec<Peek<B>>,
    pokes: Vec<Poke<B>>,
}

impl<B> Clone for Bus<B> {
    fn clone(&self) -> Self {
        Self {
            peek_index: self.peek_index.clone(),
            poke_index: self.poke_index.clone(),
            peeks: self.peeks.clone(),
            pokes: self.pokes.clone(),
        }
    }
}

impl<B> fmt::Debug for Bus<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("peeks", &self.peeks)
            .field("pokes", &self.pokes)
            .finish_non_exhaustive()
    }
}

impl<B> Default for Bus<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Bus<B> {
    /// A bus where every read is open bus and every write is ignored.
    pub fn new() -> Self {
        Self {
            peek_index: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            poke_index: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            peeks: vec![Peek::OpenBus],
            pokes: vec![Poke::Nop],
        }
    }

    /// Drops every installed binding.
    pub fn clear(&mut self) {
        self.peek_index.fill(0);
        self.poke_index.fill(0);
        self.peeks.truncate(1);
        self.pokes.truncate(1);
    }

    /// Installs both bindings over `first..=last`.
    pub fn map(&mut self, first: u16, last: u16, peek: Peek<B>, poke: Poke<B>) {
        self.map_peek(first, last, peek);
        self.map_poke(first, last, poke);
    }

    pub fn map_peek(&mut self, first: u16, last: u16, peek: Peek<B>) {
        if let Some(index) = slot(&mut self.peeks, peek) {
            self.peek_index[first as usize..=last as usize].fill(index);
        }
    }

    pub fn map_poke(&mut self, first: u16, last: u16, poke: Poke<B>) {
        if let Some(index) = slot(&mut self.pokes, poke) {
            self.poke_index[first as usize..=last as usize].fill(index);
        }
    }

    /// Installs a write binding on every address in `first..=last` whose
    /// bits under `mask` equal `value`.
    pub fn map_poke_masked(&mut self, first: u16, last: u16, mask: u16, value: u16, poke: Poke<B>) {
        if let Some(index) = slot(&mut self.pokes, poke) {
            for addr in first..=last {
                if addr & mask == value {
                    self.poke_index[addr as usize] = index;
                }
            }
        }
    }

    /// Read counterpart of [`Bus::map_poke_masked`].
    pub fn map_peek_masked(&mut self, first: u16, last: u16, mask: u16, value: u16, peek: Peek<B>) {
        if let Some(index) = slot(&mut self.peeks, peek) {
            for addr in first..=last {
                if addr & mask == value {
                    self.peek_index[addr as usize] = index;
                }
            }
        }
    }

    #[inline]
    pub fn peek(&self, addr: u16) -> Peek<B> {
        self.peeks[self.peek_index[addr as usize] as usize]
    }

    #[inline]
    pub fn poke(&self, addr: u16) -> Poke<B> {
        self.pokes[self.poke_index[addr as usize] as usize]
    }
}

fn slot<T>(table: &mut Vec<T>, binding: T) -> Option<u16> {
    let index = u16::try_from(table.len()).ok()?;
    table.push(binding);
    Some(index)
}
