//! formtree: tree data engine for form-builder tree pickers.
//!
//! The [`domain`] layer holds the pure engine (arena-backed forest, edits,
//! tri-state selection, search). [`application`] adds document I/O and an
//! editing session; [`cli`] exposes both as the `formtree` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
