//! Package recipes.
//!
//! A recipe is the declarative description of one package: who it is
//! ([`PackageIdentity`]), which settings axes it varies over, its default
//! [`Options`](crate::options::Options), which build files to generate, which sources to snapshot and
//! which libraries it hands to consumers.
//!
//! Recipes are written in Lua (see [`lua`]) and validated into an immutable
//! [`Recipe`] before anything is built.

pub mod lua;
mod types;

pub use lua::{load_recipe, parse_recipe};
pub use types::*;
