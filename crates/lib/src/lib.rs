//! vispkg-lib: package descriptors for native CMake libraries
//!
//! This crate provides the pieces a package build is made of:
//! - `Recipe`: the declarative package description, loaded from Lua
//! - `Descriptor`: a recipe bound to settings and options, and its
//!   configure/build/package state machine
//! - `CMake`: the build tool the descriptor drives
//! - `export_sources`: snapshotting a source tree next to the recipe

pub mod cmake;
pub mod config;
pub mod consts;
pub mod descriptor;
pub mod exports;
pub mod generators;
pub mod layout;
pub mod lock;
pub mod options;
pub mod package;
pub mod paths;
pub mod process;
pub mod recipe;
pub mod settings;
pub mod util;
