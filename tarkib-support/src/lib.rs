//! # Tarkib Support
//!
//! Shared utilities for the Tarkib container crates.
//!
//! This crate provides:
//! - Rendering of resolution chains for error messages
//! - "Did you mean?" suggestions for unknown type names

pub mod rendering;
