//! floatscope-store: the pre-built vector store a deployment ships with.
//!
//! A store directory holds four parallel files; entry *i* of each one
//! describes the same float profile:
//!   float_profiles.index: flat L2 embedding index (FAISS `IndexFlatL2` layout)
//!   descriptions.json   : text that was embedded
//!   metadata.json       : platform, project, position, date, …
//!   profiles.json       : depth / temperature / salinity series
//!
//! The dashboard only needs the [`FloatCatalog`]; retrieval needs the
//! full [`VectorStore`]. Nothing here mutates a loaded store. New stores
//! are produced offline with [`StoreBuilder`].

pub mod error;
pub mod flat_index;
pub mod catalog;
pub mod store;
pub mod builder;

pub use error::{StoreError, Result};
pub use flat_index::FlatIndex;
pub use catalog::{FloatCatalog, FloatEntry};
pub use store::{SearchHit, VectorStore};
pub use builder::{BuildSummary, StoreBuilder};

pub const INDEX_FILE: &str = "float_profiles.index";
pub const DESCRIPTIONS_FILE: &str = "descriptions.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const PROFILES_FILE: &str = "profiles.json";
