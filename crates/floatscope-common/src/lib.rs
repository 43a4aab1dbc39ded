//! floatscope-common: Shared types, errors, and text helpers used across all Floatscope crates.

pub mod error;
pub mod profile;
pub mod describe;

// Re-export commonly used types
pub use error::{FloatscopeError, Result};
pub use profile::{DepthSample, FloatMetadata, FloatRecord, ProfileSummary};
pub use describe::{clean_value, describe_profile, format_date, format_location, parse_float_date};
