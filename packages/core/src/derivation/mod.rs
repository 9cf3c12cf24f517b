//! Derived Values Module
//!
//! Pure functions that turn raw node payloads into display values:
//! unit scaling, halving-schedule arithmetic and fee conversions.
//! Nothing here performs I/O.

pub mod fees;
pub mod payload;
pub mod supply;
pub mod units;


pub use payload::PayloadExt;
pub use units::NOT_AVAILABLE;
