//! # Core Renderer Module
//!
//! Shared renderer-level configuration used by the renderer facade and the
//! applications that embed it.
//!
//! ## Organization
//!
//! - **Config**: renderer settings (pipeline, lighting, debug views)
//! - **Foundation**: re-exported low-level utilities (math, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{Config, ConfigError, RendererConfig};
