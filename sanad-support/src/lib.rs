//! # Sanad Support
//!
//! Shared helpers for the Sanad DI crates: rendering of resolution
//! paths, display names and suggestions used in error messages.

pub mod rendering;
