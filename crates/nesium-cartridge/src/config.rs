//! Knobs that influence how a ROM image is identified and loaded.

pub mod region;

use self::region::Region;

/// Default work RAM size for boards that expose `$6000-$7FFF` but whose
/// header leaves the size unspecified.
pub const DEFAULT_WRK_SIZE: usize = 8 * 1024;

/// Options consumed by [`crate::cartridge::load_cartridge_with`].
///
/// Construct with [`LoadOptions::default`] and adjust with the builder-style
/// setters:
///
/// ```
/// use nesium_cartridge::{LoadOptions, Region};
///
/// let options = LoadOptions::default()
///     .with_database(false)
///     .with_region(Region::Pal);
/// assert!(!options.use_database);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Consult the ROM database when one is supplied.
    pub use_database: bool,
    /// Keep the mapper high nibble even when the header looks dirty.
    pub trust_dirty_header: bool,
    /// Region override; `Auto` follows the header or database.
    pub region: Region,
    /// Work RAM allocated when neither header nor database gives a size.
    pub default_wrk_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            use_database: true,
            trust_dirty_header: false,
            region: Region::Auto,
            default_wrk_size: DEFAULT_WRK_SIZE,
        }
    }
}

impl LoadOptions {
    pub fn with_database(mut self, enabled: bool) -> Self {
        self.use_database = enabled;
        self
    }

    pub fn with_dirty_header_trust(mut self, trust: bool) -> Self {
        self.trust_dirty_header = trust;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_default_wrk_size(mut self, bytes: usize) -> Self {
        self.default_wrk_size = bytes;
        self
    }
}
