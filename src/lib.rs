//! Navigation label capitalization for static documentation sites.
//!
//! A [`Normalizer`] corrects label text against a [`TermDictionary`] of known
//! terms, a [`NavFixer`] applies it to the navigation elements of a page, and
//! a [`Reactor`] keeps re-applying it to a [`NavSurface`] while something
//! else keeps rewriting the pages.

pub mod config;
pub mod dictionary;
pub mod dom;
pub mod normalize;
pub mod reactor;
pub mod surface;
pub mod util;
pub mod watch;

pub use dictionary::{Term, TermDictionary};
pub use dom::NavFixer;
pub use normalize::{Normalizer, Precedence};
pub use reactor::{Reactor, ReactorStats, Trigger};
pub use surface::{NavSurface, SitePages};
