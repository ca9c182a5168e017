//! Wire types exchanged with the metadata backend.
//!
//! Field names follow the backend's JSON exactly; optional request fields
//! are omitted from the payload when unset.

pub mod common;
pub mod exam;
pub mod file;
pub mod score;
pub mod student;

pub use common::OneOrMany;
pub use exam::*;
pub use file::*;
pub use score::*;
pub use student::*;
