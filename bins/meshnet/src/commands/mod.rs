//! meshnet command implementations.

pub mod change;
pub mod clear;
pub mod list;
