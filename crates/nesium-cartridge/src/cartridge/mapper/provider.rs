use std::fmt::Debug;

use crate::cartridge::mapper::{Context, Mapper};

/// Source of boards the built-in catalogue does not implement.
///
/// A provider is consulted only for ids the catalogue does not know.
/// Returning `None` lets the factory fail with `UnsupportedMapper`.
///
/// # Example
/// ```
/// use nesium_cartridge::{
///     Context, Error,
///     cartridge::mapper::{Provider, create_with},
/// };
///
/// #[derive(Debug)]
/// struct Nothing;
///
/// impl Provider for Nothing {
///     fn get_mapper(&self, _ctx: Context) -> Option<Box<dyn nesium_cartridge::Mapper>> {
///         None
///     }
/// }
///
/// let ctx = Context::new(9999, vec![0; 0x8000].into(), Box::default());
/// let err = create_with(ctx, Some(&Nothing)).unwrap_err();
/// assert!(matches!(err, Error::UnsupportedMapper { id: 9999 }));
/// ```
pub trait Provider: Debug + Send + Sync {
    fn get_mapper(&self, ctx: Context) -> Option<Box<dyn Mapper>>;
}
