use std::fmt::Debug;

use dyn_clone::DynClone;

/// What a board may ask of the PPU it is wired to.
///
/// Both methods have inert defaults so a cartridge can run without a PPU
/// attached (tests, ROM inspection tools).
pub trait PpuPort: DynClone + Debug + Send {
    /// Flushes pending rendering before a CHR or nametable switch becomes
    /// visible.
    fn update(&mut self) {}

    /// Scanline being rendered, `None` when unknown. Vblank lines are
    /// `241..=260`, the pre-render line `261`.
    fn scanline(&self) -> Option<u16> {
        None
    }
}

dyn_clone::clone_trait_object!(PpuPort);

/// Port used when no PPU is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached;

impl PpuPort for Detached {}
