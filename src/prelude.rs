//! Convenience re-exports for common usage.
//!
//! This module provides a single import for the most commonly used items
//! from the fabrique crate.
//!
//! # Example
//!
//! ```
//! use fabrique::prelude::*;
//! use serde_json::json;
//!
//! let thing = Blueprint::new("thing");
//! thing.attr("name", "Thing 1");
//!
//! assert_eq!(thing.build_sync(json!({})).unwrap(), json!({"name": "Thing 1"}));
//! ```

// Error types
pub use crate::error::{FactoryError, FactoryResult};

// Attribute types
pub use crate::attribute::{AttrMap, Attribute, GeneratorFn, Sequence, SequenceFn};

// Attribute functions
pub use crate::attribute::generator;

// Blueprint types
pub use crate::blueprint::{Blueprint, Constructor};

// Hook types
pub use crate::hooks::{AfterCreate, HookChain};

// Registry handle and functions
pub use crate::registry::{
	Registry, attributes, blueprint_count, blueprint_names, build, build_as, build_batch,
	build_sync, build_sync_as, clear_blueprints, define, define_with, get, has_blueprint, register,
};
