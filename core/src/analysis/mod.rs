//! Move-advisor analysis: neighborhood patterns, learned experience,
//! single-clue deduction and local risk scoring.

pub use deduction::*;
pub use experience::*;
pub use pattern::*;
pub use risk::*;
pub use snapshot::*;

mod deduction;
mod experience;
mod pattern;
mod risk;
mod snapshot;
