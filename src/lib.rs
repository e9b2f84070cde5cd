//! Run-state engine for branching visual novel scripts.
//!
//! A [`project::Project`] bundles the locale catalog, the parsed scripts and
//! the asset table. A [`runtime::Runtime`] drives one run over it, and
//! [`host::Host`] exposes that runtime as named commands for a presentation
//! layer living on the other side of a process boundary.

pub mod asset;
pub mod error;
pub mod format;
pub mod host;
pub mod locale;
pub mod parser;
pub mod project;
pub mod result;
pub mod runtime;
pub mod store;
