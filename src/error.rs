//! Error types for the factory engine.
//!
//! This module defines the error types used throughout the fabrique crate.

use thiserror::Error;

/// Errors that can occur while declaring or building blueprints.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// Blueprint was not found in the registry.
	#[error("Blueprint not found: {0}")]
	NotFound(String),

	/// Overrides were not a JSON object (or null).
	#[error("Overrides must be a JSON object or null, got {0}")]
	InvalidOverrides(String),

	/// A blueprint with after-create hooks was built through the synchronous path.
	#[error("Blueprint '{0}' has after-create hooks and must be built asynchronously")]
	SyncBuildWithHooks(String),

	/// The blueprint's constructor rejected the resolved attributes.
	#[error("Constructor error: {0}")]
	Constructor(String),

	/// An after-create hook failed.
	#[error("Hook error: {0}")]
	Hook(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
