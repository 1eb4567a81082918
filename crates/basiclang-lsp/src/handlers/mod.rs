//! LSP request and notification handlers.
//!
//! Each handler converts protocol parameters to source coordinates, asks
//! [`Analysis`](crate::analysis::Analysis) and converts the answer back.

pub mod utils;

pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod references;
pub mod rename;
pub mod symbols;
