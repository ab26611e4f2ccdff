//! Skill sync library: mirror a remote skills repository into a flat, attributed local layout.
//! Used by the `sync-skills` CLI.

pub mod attribution;
pub mod config;
pub mod fetch;
pub mod skills;
pub mod sync;
