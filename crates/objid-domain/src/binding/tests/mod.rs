//! Tests for the app binder.
//!
//! Organized by binding mode:
//! - Read-only lookup
//! - Single, mandatory
//! - Single, optional
//! - Multi, mandatory
//! - Multi, optional


#[cfg(test)]
mod binder_tests;
