//! Reset-based 4-in-1 multicart (60).
//!
//! No registers: each soft reset advances to the next game, which maps
//! 16 KiB of PRG mirrored into both windows and the matching 8 KiB of CHR.
//! A hard reset returns to the first game.

use std::borrow::Cow;

use tracing::debug;

use crate::{
    banks::{SIZE_8K, SIZE_16K},
    bus::Bus,
    cartridge::mapper::{Board, Context, Hardware},
    error::Error,
    state::{Loader, Saver},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapper60 {
    game: u8,
}

impl Mapper60 {
    pub fn new(_ctx: &mut Context) -> Self {
        Self::default()
    }

    fn update(&self, hw: &mut Hardware) {
        let game = u32::from(self.game);
        hw.swap_prgs(SIZE_16K, 0x8000, &[game, game]);
        hw.swap_chr(SIZE_8K, 0x0000, game);
    }
}

impl Board for Mapper60 {
    fn reset(&mut self, hw: &mut Hardware, _bus: &mut Bus<Self>, hard: bool) {
        self.game = if hard { 0 } else { (self.game + 1) & 0x03 };
        debug!(game = self.game, "multicart game selected");
        self.update(hw);
    }

    fn save(&self, saver: &mut Saver) {
        saver.write8(self.game);
    }

    fn load(&mut self, loader: &mut Loader<'_>) -> Result<(), Error> {
        self.game = loader.read8()? & 0x03;
        Ok(())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Reset-based 4-in-1")
    }
}
