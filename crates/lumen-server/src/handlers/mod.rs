//! HTTP request handlers

pub mod insights;

pub use insights::*;
