//! # Glyphwall Common
//!
//! Shared types, constants, and errors used across Glyphwall components.
//!
//! ## Modules
//! - `types` - Value types (Color, CountRange, CaptchaOptions, etc.)
//! - `error` - Common error type
//! - `constants` - Surface geometry and configuration defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::GlyphwallError;
pub use types::*;

/// Result alias used by the library crates.
pub type Result<T> = std::result::Result<T, GlyphwallError>;
