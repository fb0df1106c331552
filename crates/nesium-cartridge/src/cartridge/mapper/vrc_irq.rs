//! IRQ counter shared by the Konami VRC4, VRC6 and VRC7.
//!
//! An 8-bit up counter reloads from the latch when it overflows past `$FF`
//! and raises the IRQ line. In scanline mode a prescaler divides CPU cycles
//! by 113⅔ (341 PPU dots, 3 per CPU cycle); in cycle mode every CPU cycle
//! clocks the counter.
//!
//! | Control bit | Meaning                                 |
//! |-------------|-----------------------------------------|
//! | 0 (`A`)     | enable value restored on acknowledge     |
//! | 1 (`E`)     | enable                                   |
//! | 2 (`M`)     | 1: cycle mode, 0: scanline mode          |

use crate::{
    cartridge::mapper::Hardware,
    error::Error,
    state::{Loader, Saver},
};

const PRESCALER_PERIOD: i16 = 341;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrcIrq {
    latch: u8,
    counter: u8,
    prescaler: i16,
    enabled: bool,
    enable_on_ack: bool,
    cycle_mode: bool,
}

impl Default for VrcIrq {
    fn default() -> Self {
        Self {
            latch: 0,
            counter: 0,
            prescaler: PRESCALER_PERIOD,
            enabled: false,
            enable_on_ack: false,
            cycle_mode: false,
        }
    }
}

impl VrcIrq {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn write_latch(&mut self, data: u8) {
        self.latch = data;
    }

    pub fn write_latch_low(&mut self, data: u8) {
        self.latch = (self.latch & 0xF0) | (data & 0x0F);
    }

    pub fn write_latch_high(&mut self, data: u8) {
        self.latch = (self.latch & 0x0F) | (data << 4);
    }

    pub fn write_control(&mut self, hw: &mut Hardware, data: u8) {
        self.enable_on_ack = data & 0b001 != 0;
        self.enabled = data & 0b010 != 0;
        self.cycle_mode = data & 0b100 != 0;
        if self.enabled {
            self.counter = self.latch;
            self.prescaler = PRESCALER_PERIOD;
        }
        hw.irq = false;
    }

    pub fn acknowledge(&mut self, hw: &mut Hardware) {
        self.enabled = self.enable_on_ack;
        hw.irq = false;
    }

    pub fn clock(&mut self, hw: &mut Hardware) {
        if !self.enabled {
            return;
        }
        if !self.cycle_mode {
            self.prescaler -= 3;
            if self.prescaler > 0 {
                return;
            }
            self.prescaler += PRESCALER_PERIOD;
        }
        if self.counter == 0xFF {
            self.counter = self.latch;
            hw.irq = true;
        } else {
            self.counter += 1;
        }
    }

    pub fn save(&self, saver: &mut Saver) {
        saver
            .write8(self.latch)
            .write8(self.counter)
            .write16(self.prescaler as u16)
            .write8(
                u8::from(self.enable_on_ack)
                    | u8::from(self.enabled) << 1
                    | u8::from(self.cycle_mode) << 2,
            );
    }

    pub fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.latch = loader.read8()?;
        self.counter = loader.read8()?;
        let prescaler = loader.read16()? as i16;
        if !(1..=PRESCALER_PERIOD).contains(&prescaler) {
            return Err(Error::CorruptSaveState("vrc prescaler out of range"));
        }
        self.prescaler = prescaler;
        let control = loader.read8()?;
        self.enable_on_ack = control & 0b001 != 0;
        self.enabled = control & 0b010 != 0;
        self.cycle_mode = control & 0b100 != 0;
        Ok(())
    }
}
