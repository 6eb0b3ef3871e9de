pub use basic::*;
pub use deduction::*;
pub use patterns::*;

mod basic;
mod deduction;
mod patterns;
