//! Configuration management for the classification service.
//!
//! This module provides configuration types, validation traits, and the ONNX
//! Runtime session options.

pub mod errors;
pub mod onnx;
pub mod service;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
pub use service::ServiceConfig;
