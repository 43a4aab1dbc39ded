//! floatscope-web: Web dashboard for ocean float data.
//! Provides:
//!   - Float location map
//!   - Temperature / salinity depth profile plots
//!   - Retrieval-augmented chat about the data
//!   - JSON API behind all of the above

pub mod router;
pub mod handlers;
pub mod state;
pub mod error;
pub mod charts;
