//! Application services layer.

pub mod archive;
pub mod copy;
pub mod editor;
pub mod error;
pub mod repos;
