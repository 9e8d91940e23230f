//! Silver layer transformation.
//!
//! This crate turns raw Source Table lines into typed, cleaned records:
//!
//! - **normalization**: value normalizer and typed field validators
//! - **validated**: the never-failing validator outcome
//! - **engine**: schema binding, structural gate and per-field dispatch

pub mod engine;
pub mod error;
pub mod normalization;
pub mod validated;

pub use engine::{LineOutcome, Rejection, SchemaTransform, TransformedLine, apply_rule};
pub use error::{Result, TransformError};
pub use validated::Validated;
