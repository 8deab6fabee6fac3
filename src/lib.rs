//! Inkwell: authors publish short posts, optionally into groups; readers
//! browse paginated feeds, comment and follow authors.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
