//! Command handlers

pub mod artifacts;
pub mod run;
