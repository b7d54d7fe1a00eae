//! Foundation types shared by every engine module
//!
//! Math aliases and the 2D transform, slot-map handles, the two clocks and
//! logger setup.

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
