//! Topic index - scan a directory of topic folders and catalog their markdown documents
//!
//! A root directory holds one folder per topic, each containing markdown
//! documents. [`scan`] discovers the folders and [`load`] reads a single
//! document; a [`Catalog`] is the fully loaded result.

pub mod app;
pub mod core;
pub mod render;
pub mod watch;

pub use crate::core::catalog::{Catalog, HitLocation, SearchHit, SearchQuery};
pub use crate::core::document::{load, Heading, TopicDocument};
pub use crate::core::error::IndexError;
pub use crate::core::file_system::{scan, Folders, Scan, ScanOptions, TopicFolder};
