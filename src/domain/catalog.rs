//! Ordered class index to name mapping.

use crate::core::constants::DEFAULT_CLASS_NAMES;
use crate::core::{VisionError, VisionResult};
use serde::Serialize;

/// Immutable, ordered mapping from model output index to class name.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Creates a catalog whose index `i` maps to `names[i]`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `names` is empty or contains a blank
    /// name.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> VisionResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(VisionError::config_error("class catalog cannot be empty"));
        }
        if let Some(idx) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(VisionError::config_error(format!(
                "class name at index {idx} is empty"
            )));
        }
        Ok(Self { names })
    }

    /// The five sugarcane leaf disease classes the model was trained on.
    pub fn sugarcane() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns the name for `index`, if it exists.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Class names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterates `(index, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::sugarcane()
    }
}
