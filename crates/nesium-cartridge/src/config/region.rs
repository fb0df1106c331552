use core::fmt;

use crate::cartridge::database::System;

/// Timing profile a cartridge runs under.
///
/// Derived from the user's choice and the system reported by the header or
/// the ROM database. Resolution never yields `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Follow the header / database.
    #[default]
    Auto,
    Ntsc,
    Pal,
    /// Famiclone hybrid timing.
    Dendy,
}

impl Region {
    /// A concrete region wins; `Auto` maps the system hint. Arcade systems
    /// (Vs. UniSystem, PlayChoice-10) are NTSC machines.
    pub fn resolve(config_region: Region, system: System) -> Region {
        match config_region {
            Region::Auto => match system {
                System::Pal => Region::Pal,
                System::Dendy => Region::Dendy,
                System::Ntsc | System::Vs | System::Pc10 => Region::Ntsc,
            },
            other => other,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Auto => "auto",
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
            Region::Dendy => "dendy",
        };
        f.write_str(s)
    }
}
