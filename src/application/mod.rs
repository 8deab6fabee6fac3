//! Application services layer.

pub mod authors;
pub mod comments;
pub mod error;
pub mod feed;
pub mod follow;
pub mod groups;
pub mod pagination;
pub mod posts;
pub mod repos;
