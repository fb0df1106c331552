//! A12 watcher for MMC3-style IRQ clocking.
//!
//! MMC3-family boards clock their scanline counter on rising edges of PPU
//! address line A12. Pattern fetches toggle A12 several times per scanline,
//! so the hardware only accepts a rise after A12 has been held low for a
//! short while. The watcher measures that low time on the CPU cycle
//! counter the mapper keeps.

use crate::{
    error::Error,
    state::{Loader, Saver},
};

/// CPU cycles A12 must stay low before a rise counts.
pub const MIN_LOW_CYCLES: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A12StateChange {
    None,
    /// A12 went high after a long enough low period.
    Rise,
    /// A12 went low.
    Fall,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct A12Watcher {
    /// Cycle A12 was first seen low; `None` while high.
    low_since: Option<u64>,
}

impl A12Watcher {
    pub const fn new() -> Self {
        Self { low_since: None }
    }

    pub fn reset(&mut self) {
        self.low_since = None;
    }

    /// Observes a pattern-table address at CPU cycle `cycle`.
    pub fn update(&mut self, addr: u16, cycle: u64) -> A12StateChange {
        let a12_high = addr & 0x1000 != 0;
        match (a12_high, self.low_since) {
            (false, None) => {
                self.low_since = Some(cycle);
                A12StateChange::Fall
            }
            (true, Some(since)) => {
                self.low_since = None;
                if cycle.wrapping_sub(since) >= MIN_LOW_CYCLES {
                    A12StateChange::Rise
                } else {
                    A12StateChange::None
                }
            }
            _ => A12StateChange::None,
        }
    }

    pub fn save(&self, saver: &mut Saver) {
        let since = self.low_since.unwrap_or(0);
        saver
            .write_bool(self.low_since.is_some())
            .write32(since as u32)
            .write32((since >> 32) as u32);
    }

    pub fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        let low = loader.read_bool()?;
        let since = u64::from(loader.read32()?) | u64::from(loader.read32()?) << 32;
        self.low_since = low.then_some(since);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rise_requires_minimum_low_time() {
        let mut w = A12Watcher::new();

        assert_eq!(w.update(0x1000, 0), A12StateChange::None);
        assert_eq!(w.update(0x0000, 10), A12StateChange::Fall);
        assert_eq!(w.update(0x0FF0, 11), A12StateChange::None);
        // Low for only one cycle.
        assert_eq!(w.update(0x1000, 11), A12StateChange::None);

        assert_eq!(w.update(0x0000, 20), A12StateChange::Fall);
        assert_eq!(w.update(0x1000, 20 + MIN_LOW_CYCLES), A12StateChange::Rise);
        assert_eq!(w.update(0x1008, 40), A12StateChange::None);
    }
}
