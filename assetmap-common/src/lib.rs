//! # assetmap Common Library
//!
//! Shared code for the assetmap service crates:
//! - Asset record model and edit patches
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod asset;
pub mod config;
pub mod error;

pub use asset::{AssetPatch, AssetRecord};
pub use error::{Error, Result};
