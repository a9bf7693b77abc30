//! Core functionality: scanning topic folders, loading documents, configuration

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod file_system;
