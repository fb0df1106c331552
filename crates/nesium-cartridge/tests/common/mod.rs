#![allow(dead_code)]

use ctor::ctor;
use nesium_cartridge::cartridge::header::NES_HEADER_LEN;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Builds iNES / NES 2.0 images in memory.
///
/// PRG bytes hold their 8 KiB bank index and CHR bytes their 1 KiB bank
/// index, so a single read tells which bank is mapped.
#[derive(Debug, Clone)]
pub struct RomBuilder {
    mapper: u16,
    submapper: u8,
    prg_kib: usize,
    chr_kib: usize,
    vertical: bool,
    four_screen: bool,
    battery: bool,
    trainer: Option<[u8; 512]>,
    nes2: bool,
    prg_ram_shift: u8,
    prg_nvram_shift: u8,
    tail: Option<[u8; 9]>,
}

impl RomBuilder {
    pub fn new(mapper: u16, prg_kib: usize, chr_kib: usize) -> Self {
        Self {
            mapper,
            submapper: 0,
            prg_kib,
            chr_kib,
            vertical: false,
            four_screen: false,
            battery: false,
            trainer: None,
            nes2: false,
            prg_ram_shift: 0,
            prg_nvram_shift: 0,
            tail: None,
        }
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }

    pub fn four_screen(mut self) -> Self {
        self.four_screen = true;
        self
    }

    pub fn battery(mut self) -> Self {
        self.battery = true;
        self
    }

    pub fn trainer(mut self, fill: u8) -> Self {
        self.trainer = Some([fill; 512]);
        self
    }

    /// Switches to a NES 2.0 header with the given submapper and RAM shifts
    /// (`64 << shift` bytes, 0 for none).
    pub fn nes2(mut self, submapper: u8, prg_ram_shift: u8, prg_nvram_shift: u8) -> Self {
        self.nes2 = true;
        self.submapper = submapper;
        self.prg_ram_shift = prg_ram_shift;
        self.prg_nvram_shift = prg_nvram_shift;
        self
    }

    /// Overwrites header bytes 7-15, as ripper tools used to.
    pub fn signed(mut self, signature: &[u8; 9]) -> Self {
        self.tail = Some(*signature);
        self
    }

    pub fn header(&self) -> [u8; NES_HEADER_LEN] {
        let mut header = [0u8; NES_HEADER_LEN];
        header[..4].copy_from_slice(b"NES\x1A");
        let prg_units = self.prg_kib / 16;
        let chr_units = self.chr_kib / 8;
        header[4] = prg_units as u8;
        header[5] = chr_units as u8;

        let mut flags6 = (self.mapper as u8 & 0x0F) << 4;
        if self.vertical {
            flags6 |= 0x01;
        }
        if self.battery {
            flags6 |= 0x02;
        }
        if self.trainer.is_some() {
            flags6 |= 0x04;
        }
        if self.four_screen {
            flags6 |= 0x08;
        }
        header[6] = flags6;
        header[7] = self.mapper as u8 & 0xF0;

        if self.nes2 {
            header[7] |= 0x08;
            header[8] = (self.mapper >> 8) as u8 & 0x0F | self.submapper << 4;
            header[9] = ((prg_units >> 8) as u8 & 0x0F) | ((chr_units >> 8) as u8 & 0x0F) << 4;
            header[10] = self.prg_ram_shift | self.prg_nvram_shift << 4;
        }
        if let Some(tail) = self.tail {
            header[7..].copy_from_slice(&tail);
        }
        header
    }

    pub fn build(&self) -> Vec<u8> {
        let mut rom = self.header().to_vec();
        if let Some(trainer) = &self.trainer {
            rom.extend_from_slice(trainer);
        }
        rom.extend((0..self.prg_kib * 1024).map(|i| (i / 0x2000) as u8));
        rom.extend((0..self.chr_kib * 1024).map(|i| (i / 0x400) as u8));
        rom
    }
}
