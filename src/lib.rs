//! Page copy core: a TTL snapshot cache over the CMS key-value store and the
//! sanitization pipeline applied to rich-text sections before rendering.

pub mod application;
pub mod cache;
pub mod config;
pub mod infra;
pub mod sanitize;
