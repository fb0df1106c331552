//! Cartridge-side view of the CPU data bus when nothing drives it.
//!
//! Reads from unmapped cartridge space return the last byte seen on the
//! bus. Charged bits leak back to 0 after a while; each bit carries its own
//! decay deadline measured in CPU cycles.

/// CPU cycles before a driven `1` bit decays to `0` (about three NTSC
/// frames).
const DECAY_CYCLES: u64 = 90_000;

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct OpenBus {
    value: u8,
    decay_deadline: [u64; 8],
    tick: u64,
}

impl OpenBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances the decay clock by one CPU cycle.
    #[inline]
    pub fn step(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Current floating value with expired bits cleared.
    pub fn sample(&self) -> u8 {
        self.decay_deadline
            .iter()
            .enumerate()
            .fold(self.value, |value, (bit, &deadline)| {
                if deadline != 0 && self.tick >= deadline {
                    value & !(1 << bit)
                } else {
                    value
                }
            })
    }

    /// Latches a freshly driven byte.
    #[inline]
    pub fn latch(&mut self, value: u8) {
        self.set_masked(0xFF, value);
    }

    /// Drives only the bits selected by `mask`.
    pub fn set_masked(&mut self, mask: u8, value: u8) {
        let current = self.sample();
        let deadline = self.tick.wrapping_add(DECAY_CYCLES);
        for (bit, slot) in self.decay_deadline.iter_mut().enumerate() {
            if mask & (1 << bit) != 0 {
                *slot = deadline;
            }
        }
        self.value = (current & !mask) | (value & mask);
    }

    /// Combines a partially driven byte with floating bits: bits in `mask`
    /// come from the bus, the rest from `value`.
    pub fn apply_masked(&mut self, mask: u8, value: u8) -> u8 {
        self.set_masked(!mask, value);
        (value & !mask) | (self.sample() & mask)
    }
}
