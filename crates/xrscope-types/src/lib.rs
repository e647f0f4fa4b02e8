//! Foundation types for XRSCOPE.
//!
//! This crate contains the types shared by all XRSCOPE crates: the
//! runtime/extension data model, startup configuration, and error types.

pub mod config;
pub mod error;
pub mod model;
