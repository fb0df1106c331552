/// Which reset line fired.
///
/// Boards use the distinction to keep registers that survive the console's
/// reset button (multicart menu counters, mode latches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    PowerOn, // cold boot / power cycle
    Soft,    // reset button
}

impl ResetKind {
    #[inline]
    pub fn is_hard(self) -> bool {
        self == ResetKind::PowerOn
    }
}
