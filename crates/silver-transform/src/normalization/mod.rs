//! Normalization and typed validation of raw field values.
//!
//! - **text**: control character and quote stripping
//! - **numeric**: range, flag, sentinel, plain, strict and fixed-precision numbers
//! - **pair**: `A;B` composite decomposition
//! - **datetime**: multi-format timestamp parsing

pub mod datetime;
pub mod numeric;
pub mod pair;
pub mod text;

pub use datetime::{ACCEPTED_FORMATS, CANONICAL_FORMAT, normalize_timestamp, parse_timestamp};
pub use numeric::{
    binary_flag, fixed_precision, parse_f64, parse_truncated, plain_number, range_integer,
    sentinel_integer, strict_integer,
};
pub use pair::composite_pair;
pub use text::{normalize_display, normalize_value};
