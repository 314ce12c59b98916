//! Core types for data transfer

mod journal;
mod keys;
mod records;
mod reference;

pub use journal::*;
pub use keys::*;
pub use records::*;
pub use reference::*;
