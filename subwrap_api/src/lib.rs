//! Shared subwrap data models consumed by the core library and its front ends.

pub mod diff;
pub mod log;
pub mod options;
pub mod revision;

pub use diff::*;
pub use log::*;
pub use options::*;
pub use revision::*;
