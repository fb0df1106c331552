//! Cartridge side of the NES: bank switching boards, the CPU bus dispatch
//! table they install into, ROM identification and save states.
//!
//! A typical front-end only needs [`load_cartridge`] (or
//! [`cartridge::load_cartridge_with`] when a [`RomDatabase`] is available) and
//! then forwards CPU/PPU accesses to the returned [`Cartridge`].
//!
//! ```no_run
//! use nesium_cartridge::{ResetKind, load_cartridge};
//!
//! let rom = std::fs::read("game.nes")?;
//! let mut cart = load_cartridge(&rom)?;
//! let reset_lo = cart.cpu_read(0xFFFC);
//! cart.reset(ResetKind::Soft);
//! let snapshot = cart.save_state();
//! cart.load_state(&snapshot)?;
//! # let _ = reset_lo;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod banks;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod error;
pub mod memory;
pub mod reset_kind;
pub mod state;

pub use cartridge::{
    Cartridge, Environment, load_cartridge, load_cartridge_from_file, load_cartridge_with,
    database::RomDatabase,
    header::{Header, Mirroring},
    mapper::{Context, Mapper, create},
};
pub use config::{LoadOptions, region::Region};
pub use error::Error;
pub use reset_kind::ResetKind;

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }
}
