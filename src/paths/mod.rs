//! Watch roots: the directories named on the command line.
//!
//! Each argument is normalized into a [`WatchRoot`] holding both the
//! spelling the user typed and its canonical, slash-terminated form. The
//! [`WatchRegistry`] keeps the roots sorted by canonical form so an event
//! path can be mapped back to its deepest owning root with a binary search.

mod error;
mod normalize;
mod registry;

pub use error::RootError;
pub use normalize::{ResolutionPolicy, WatchRoot, normalize_all, normalize_with, terminate};
pub use registry::WatchRegistry;

/// Separator used by event paths and normalized roots.
pub const SEPARATOR: u8 = b'/';
