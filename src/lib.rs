//! Core library for the cbs-tools command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the unit tests. The modules are
//! structured to keep responsibilities narrow and composable: spreadsheet IO
//! adapters live under [`io`], data representations inside [`model`],
//! sequence-code handling in [`codes`] and [`numerals`], the tree pipeline in
//! [`rows`], [`tree`], [`policy`], [`aggregate`], and [`emit`], and the
//! conversion orchestration under [`convert`].

pub mod aggregate;
pub mod codes;
pub mod convert;
pub mod emit;
pub mod error;
pub mod io;
pub mod model;
pub mod numerals;
pub mod policy;
pub mod rows;
pub mod tree;

pub use error::{ConvertError, Result, RowWarning};
