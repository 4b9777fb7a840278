//! Command implementations for the tailfeed CLI

pub mod check;
pub mod tail;
