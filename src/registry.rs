//! Process-wide blueprint registry.
//!
//! Blueprints are usually declared once, at startup or in a test harness,
//! through [`define`] and later built by name from anywhere in the process.
//! Registration is explicit: nothing registers implicitly, looking up an
//! unknown name fails with [`FactoryError::NotFound`], and tests can wipe
//! state with [`clear_blueprints`].
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//!
//! fabrique::define("game")
//! 	.sequence("id")
//! 	.attr("name", "Chess");
//!
//! let object = fabrique::build_sync("game", json!({"name": "Go"})).unwrap();
//! assert_eq!(object, json!({"id": 1, "name": "Go"}));
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::attribute::AttrMap;
use crate::blueprint::Blueprint;
use crate::error::{FactoryError, FactoryResult};

/// Global blueprint registry, keyed by blueprint name.
static BLUEPRINTS: Lazy<RwLock<HashMap<String, Blueprint>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Declares and registers an empty blueprint, returning it for refinement.
///
/// The returned handle shares state with the registered entry, so fluent
/// declarations after `define` are visible to later lookups.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// fabrique::registry::define("widget").attr("name", "Widget 1");
///
/// let object = fabrique::registry::build_sync("widget", json!({})).unwrap();
/// assert_eq!(object, json!({"name": "Widget 1"}));
/// ```
pub fn define(name: impl Into<String>) -> Blueprint {
	register(Blueprint::new(name))
}

/// Declares and registers a blueprint with a constructor.
pub fn define_with<C>(name: impl Into<String>, constructor: C) -> Blueprint
where
	C: Fn(AttrMap) -> FactoryResult<Value> + Send + Sync + 'static,
{
	register(Blueprint::new_with(name, constructor))
}

/// Registers an already-built blueprint under its own name.
///
/// Registering a name twice replaces the previous blueprint and logs a
/// warning; in-flight handles to the replaced blueprint keep working.
pub fn register(blueprint: Blueprint) -> Blueprint {
	let name = blueprint.name().to_string();
	let previous = BLUEPRINTS.write().insert(name.clone(), blueprint.clone());
	if previous.is_some() {
		tracing::warn!("Blueprint '{}' was already registered; replacing it", name);
	}
	blueprint
}

/// Returns the blueprint registered under `name`, if any.
pub fn get(name: &str) -> Option<Blueprint> {
	BLUEPRINTS.read().get(name).cloned()
}

fn lookup(name: &str) -> FactoryResult<Blueprint> {
	get(name).ok_or_else(|| FactoryError::NotFound(name.to_string()))
}

/// Resolves the named blueprint's attributes with `overrides` applied.
///
/// # Errors
///
/// Returns [`FactoryError::NotFound`] for an unregistered name, or
/// [`FactoryError::InvalidOverrides`] for non-object overrides.
pub fn attributes(name: &str, overrides: Value) -> FactoryResult<AttrMap> {
	lookup(name)?.attributes(overrides)
}

/// Builds one object from the named blueprint.
///
/// # Errors
///
/// Returns [`FactoryError::NotFound`] for an unregistered name; otherwise
/// propagates the blueprint's build errors.
pub async fn build(name: &str, overrides: Value) -> FactoryResult<Value> {
	lookup(name)?.build(overrides).await
}

/// Builds one object from the named blueprint without entering async.
///
/// # Errors
///
/// As [`build`], plus [`FactoryError::SyncBuildWithHooks`] when the blueprint
/// has after-create hooks.
pub fn build_sync(name: &str, overrides: Value) -> FactoryResult<Value> {
	lookup(name)?.build_sync(overrides)
}

/// Builds one object from the named blueprint and deserializes it into `T`.
pub async fn build_as<T>(name: &str, overrides: Value) -> FactoryResult<T>
where
	T: DeserializeOwned,
{
	lookup(name)?.build_as(overrides).await
}

/// Synchronous form of [`build_as`].
pub fn build_sync_as<T>(name: &str, overrides: Value) -> FactoryResult<T>
where
	T: DeserializeOwned,
{
	lookup(name)?.build_sync_as(overrides)
}

/// Builds `count` objects from the named blueprint.
///
/// Each object gets its own copy of `overrides`; sequences advance once per
/// object, so a batch of users receives consecutive ids.
///
/// # Errors
///
/// Stops at the first failing build and returns its error.
pub async fn build_batch(name: &str, count: usize, overrides: Value) -> FactoryResult<Vec<Value>> {
	let blueprint = lookup(name)?;
	let mut objects = Vec::with_capacity(count);
	for _ in 0..count {
		objects.push(blueprint.build(overrides.clone()).await?);
	}
	Ok(objects)
}

/// Returns `true` if a blueprint is registered under `name`.
pub fn has_blueprint(name: &str) -> bool {
	BLUEPRINTS.read().contains_key(name)
}

/// Returns the names of all registered blueprints.
pub fn blueprint_names() -> Vec<String> {
	BLUEPRINTS.read().keys().cloned().collect()
}

/// Returns the number of registered blueprints.
pub fn blueprint_count() -> usize {
	BLUEPRINTS.read().len()
}

/// Removes every registered blueprint.
///
/// Standalone handles keep working; only name-based lookup is affected.
pub fn clear_blueprints() {
	let mut blueprints = BLUEPRINTS.write();
	let count = blueprints.len();
	blueprints.clear();
	tracing::debug!("Cleared {} registered blueprint(s)", count);
}

/// Handle over the process-wide registry.
///
/// All methods delegate to the free functions in this module; the struct
/// exists for callers that prefer passing a value around over naming the
/// module.
#[derive(Debug, Default)]
pub struct Registry;

impl Registry {
	/// Creates a registry handle.
	pub fn new() -> Self {
		Self
	}

	/// Returns the blueprint registered under `name`, if any.
	pub fn get(&self, name: &str) -> Option<Blueprint> {
		get(name)
	}

	/// Returns `true` if a blueprint is registered under `name`.
	pub fn has(&self, name: &str) -> bool {
		has_blueprint(name)
	}

	/// Returns the names of all registered blueprints.
	pub fn names(&self) -> Vec<String> {
		blueprint_names()
	}

	/// Returns the number of registered blueprints.
	pub fn len(&self) -> usize {
		blueprint_count()
	}

	/// Returns `true` if no blueprint is registered.
	pub fn is_empty(&self) -> bool {
		blueprint_count() == 0
	}

	/// Removes every registered blueprint.
	pub fn clear(&self) {
		clear_blueprints()
	}
}
