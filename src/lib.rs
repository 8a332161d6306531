//! Core library for the sheet-concat command line application.
//!
//! The crate merges many spreadsheet tables into one, reconciling column
//! layouts that differ between inputs. Labels are compared through
//! [`normalize`], output schemas come from an alias [`mapping`] or a template
//! header ([`schema`]), each source is shaped by [`project`] and the pieces are
//! stitched together in order by [`concat`]. File access lives under [`io`]
//! and [`pipeline`] wires everything into a single run.

pub mod concat;
pub mod error;
pub mod io;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod schema;

pub use error::{Result, ToolError};
