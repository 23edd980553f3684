//! Blueprint declaration and building.
//!
//! A [`Blueprint`] is a named recipe for one kind of object: a set of declared
//! attributes, an optional constructor, and an ordered list of after-create
//! hooks. Declaration methods are fluent and take `&self`, so a blueprint can
//! keep being refined after it has been registered or cloned.
//!
//! Building resolves every declared attribute in declaration order, overlays
//! the caller's overrides, hands the map to the constructor (if any), and
//! finally folds the object through the after-create hooks.
//!
//! # Example
//!
//! ```
//! use fabrique::blueprint::Blueprint;
//! use serde_json::{Value, json};
//!
//! let game = Blueprint::new("game");
//! game.sequence("id").attr("name", "Chess");
//!
//! let attrs = game.attributes(json!({"name": "Go"})).unwrap();
//! assert_eq!(Value::Object(attrs), json!({"id": 1, "name": "Go"}));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::attribute::{AttrMap, Attribute, GeneratorFn};
use crate::error::{FactoryError, FactoryResult};
use crate::hooks::{AfterCreate, HookChain};

/// Shared constructor closure turning a resolved attribute map into the final
/// object.
pub type Constructor = Arc<dyn Fn(AttrMap) -> FactoryResult<Value> + Send + Sync>;

struct BlueprintInner {
	name: String,
	constructor: Option<Constructor>,
	attrs: RwLock<IndexMap<String, Attribute>>,
	funcs: RwLock<HashMap<String, GeneratorFn>>,
	hooks: RwLock<Vec<AfterCreate>>,
}

/// Named recipe for building objects.
///
/// A `Blueprint` is a cheap-to-clone handle; clones share the same underlying
/// declarations, so a blueprint fetched from the registry sees later
/// refinements made through any other handle.
///
/// # Example
///
/// ```
/// use fabrique::blueprint::Blueprint;
/// use serde_json::json;
///
/// let user = Blueprint::new("user");
/// user.sequence("id")
/// 	.sequence_with("login", |i| json!(format!("user{i}")))
/// 	.attr("active", true);
///
/// # tokio_test::block_on(async {
/// let object = user.build(json!({})).await.unwrap();
/// assert_eq!(object, json!({"id": 1, "login": "user1", "active": true}));
/// # });
/// ```
#[derive(Clone)]
pub struct Blueprint {
	inner: Arc<BlueprintInner>,
}

impl Blueprint {
	/// Creates an empty blueprint without a constructor.
	///
	/// Built objects are plain JSON objects of the resolved attributes. The
	/// blueprint is not registered anywhere; see [`crate::registry::define`]
	/// for the registered form.
	pub fn new(name: impl Into<String>) -> Self {
		Self::from_parts(name.into(), None)
	}

	/// Creates an empty blueprint with a constructor.
	///
	/// The constructor receives the resolved attribute map and produces the
	/// final object, typically a serialized domain type. It runs once per
	/// build, before any after-create hook.
	pub fn new_with<C>(name: impl Into<String>, constructor: C) -> Self
	where
		C: Fn(AttrMap) -> FactoryResult<Value> + Send + Sync + 'static,
	{
		Self::from_parts(name.into(), Some(Arc::new(constructor)))
	}

	fn from_parts(name: String, constructor: Option<Constructor>) -> Self {
		Self {
			inner: Arc::new(BlueprintInner {
				name,
				constructor,
				attrs: RwLock::new(IndexMap::new()),
				funcs: RwLock::new(HashMap::new()),
				hooks: RwLock::new(Vec::new()),
			}),
		}
	}

	/// Returns the blueprint's name.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Declares an attribute from an explicit [`Attribute`] variant.
	///
	/// Redeclaring a name replaces the previous declaration but keeps its
	/// position in declaration order.
	pub fn declare(&self, name: impl Into<String>, attribute: Attribute) -> &Self {
		self.inner.attrs.write().insert(name.into(), attribute);
		self
	}

	/// Declares a literal attribute, cloned into every built object.
	pub fn attr(&self, name: impl Into<String>, value: impl Into<Value>) -> &Self {
		self.declare(name, Attribute::literal(value))
	}

	/// Declares a generator attribute, invoked once per build.
	pub fn attr_fn<F>(&self, name: impl Into<String>, f: F) -> &Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.declare(name, Attribute::generator(f))
	}

	/// Declares one literal attribute per key of a JSON object.
	///
	/// # Panics
	///
	/// Panics if `attrs` is not a JSON object; bulk declaration from anything
	/// else is a programming error.
	pub fn set_attrs(&self, attrs: Value) -> &Self {
		match attrs {
			Value::Object(map) => {
				let mut ours = self.inner.attrs.write();
				for (name, value) in map {
					ours.insert(name, Attribute::Literal(value));
				}
			}
			other => panic!("set_attrs expects a JSON object, got {}", value_kind(&other)),
		}
		self
	}

	/// Declares a numeric sequence attribute yielding `1, 2, 3, ...`.
	pub fn sequence(&self, name: impl Into<String>) -> &Self {
		self.declare(name, Attribute::sequence())
	}

	/// Declares a sequence attribute with a custom counter mapping.
	///
	/// # Example
	///
	/// ```
	/// use fabrique::blueprint::Blueprint;
	/// use serde_json::json;
	///
	/// let user = Blueprint::new("user");
	/// user.sequence_with("login", |i| json!(format!("user{i}")));
	///
	/// let attrs = user.attributes(json!(null)).unwrap();
	/// assert_eq!(attrs["login"], json!("user1"));
	/// ```
	pub fn sequence_with<F>(&self, name: impl Into<String>, map: F) -> &Self
	where
		F: Fn(u64) -> Value + Send + Sync + 'static,
	{
		self.declare(name, Attribute::sequence_with(map))
	}

	/// Attaches a named helper closure, stored verbatim.
	///
	/// Helpers do not participate in attribute resolution; they are returned
	/// uninvoked by [`Blueprint::functions`] and [`Blueprint::function`].
	pub fn func<F>(&self, name: impl Into<String>, f: F) -> &Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.inner.funcs.write().insert(name.into(), Arc::new(f));
		self
	}

	/// Attaches several helper closures at once.
	///
	/// # Example
	///
	/// ```
	/// use fabrique::attribute::generator;
	/// use fabrique::blueprint::Blueprint;
	/// use serde_json::json;
	///
	/// let factory = Blueprint::new("factory");
	/// factory.set_funcs([
	/// 	("fred".to_string(), generator(|| json!("x1"))),
	/// 	("wilma".to_string(), generator(|| json!("y3"))),
	/// ]);
	///
	/// let fred = factory.function("fred").unwrap();
	/// assert_eq!(fred(), json!("x1"));
	/// ```
	pub fn set_funcs<I, S>(&self, funcs: I) -> &Self
	where
		I: IntoIterator<Item = (S, GeneratorFn)>,
		S: Into<String>,
	{
		let mut ours = self.inner.funcs.write();
		for (name, f) in funcs {
			ours.insert(name.into(), f);
		}
		self
	}

	/// Returns all helper closures, uninvoked.
	pub fn functions(&self) -> HashMap<String, GeneratorFn> {
		self.inner.funcs.read().clone()
	}

	/// Returns the helper closure registered under `name`, if any.
	pub fn function(&self, name: &str) -> Option<GeneratorFn> {
		self.inner.funcs.read().get(name).cloned()
	}

	/// Registers an async after-create hook.
	///
	/// Hooks run in registration order after the object is constructed. Each
	/// hook receives the object produced so far and returns the object to
	/// pass along, so it may mutate or replace it; returning an error aborts
	/// the build.
	///
	/// Blueprints with hooks must be built through the async [`Blueprint::build`]
	/// path.
	pub fn after_create<F, Fut>(&self, hook: F) -> &Self
	where
		F: Fn(Value) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = FactoryResult<Value>> + Send + 'static,
	{
		let boxed: AfterCreate = Arc::new(move |object| Box::pin(hook(object)));
		self.inner.hooks.write().push(boxed);
		self
	}

	/// Copies another registered blueprint's declarations into this one.
	///
	/// Attributes and helpers are snapshotted at call time: literals are
	/// cloned, generator closures are shared, and sequences keep their mapping
	/// but restart from zero so this blueprint numbers its own objects. Parent
	/// hooks are appended to this blueprint's hooks. Same-named declarations
	/// already present are overwritten, so declare child-specific attributes
	/// after extending. Constructors are not inherited.
	///
	/// Extending a blueprint from itself is a no-op.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::NotFound`] if no blueprint named `parent` is
	/// registered.
	pub fn extend(&self, parent: &str) -> FactoryResult<&Self> {
		let parent = crate::registry::get(parent)
			.ok_or_else(|| FactoryError::NotFound(parent.to_string()))?;
		self.adopt(&parent);
		Ok(self)
	}

	fn adopt(&self, parent: &Blueprint) {
		if Arc::ptr_eq(&self.inner, &parent.inner) {
			return;
		}
		{
			let theirs = parent.inner.attrs.read();
			let mut ours = self.inner.attrs.write();
			for (name, attribute) in theirs.iter() {
				ours.insert(name.clone(), attribute.inherit());
			}
		}
		{
			let theirs = parent.inner.funcs.read();
			let mut ours = self.inner.funcs.write();
			for (name, f) in theirs.iter() {
				ours.insert(name.clone(), Arc::clone(f));
			}
		}
		let theirs = parent.inner.hooks.read();
		self.inner.hooks.write().extend(theirs.iter().cloned());
	}

	/// Resolves the declared attributes and overlays `overrides`.
	///
	/// Every declared attribute is resolved in declaration order, which means
	/// generators run and sequences advance even for attributes the caller
	/// overrides. Overrides then win by key presence, so explicit `false`,
	/// `0`, `""` and `null` all replace the declared value. Override keys with
	/// no declared counterpart are included as given, after the declared keys.
	///
	/// # Arguments
	///
	/// * `overrides` - A JSON object of per-call values, or `null` for none
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InvalidOverrides`] if `overrides` is any other
	/// kind of JSON value.
	pub fn attributes(&self, overrides: Value) -> FactoryResult<AttrMap> {
		let overrides = override_entries(overrides)?;
		let mut resolved = AttrMap::new();
		{
			let attrs = self.inner.attrs.read();
			for (name, attribute) in attrs.iter() {
				resolved.insert(name.clone(), attribute.resolve());
			}
		}
		for (name, value) in overrides {
			resolved.insert(name, value);
		}
		Ok(resolved)
	}

	fn instantiate(&self, overrides: Value) -> FactoryResult<Value> {
		let attrs = self.attributes(overrides)?;
		match &self.inner.constructor {
			Some(constructor) => constructor(attrs),
			None => Ok(Value::Object(attrs)),
		}
	}

	/// Builds one object, running the full pipeline.
	///
	/// Resolves attributes, applies overrides, runs the constructor, then
	/// folds the object through the after-create hooks in registration order.
	///
	/// # Errors
	///
	/// Propagates [`FactoryError::InvalidOverrides`], constructor errors, and
	/// the first hook error.
	///
	/// # Example
	///
	/// ```
	/// use fabrique::blueprint::Blueprint;
	/// use serde_json::json;
	///
	/// let thing = Blueprint::new("thing");
	/// thing.attr("name", "Thing 1").after_create(|mut object| async move {
	/// 	object["saved"] = json!(true);
	/// 	Ok(object)
	/// });
	///
	/// # tokio_test::block_on(async {
	/// let object = thing.build(json!({"name": "changed"})).await.unwrap();
	/// assert_eq!(object, json!({"name": "changed", "saved": true}));
	/// # });
	/// ```
	pub async fn build(&self, overrides: Value) -> FactoryResult<Value> {
		let object = self.instantiate(overrides)?;
		self.hook_chain().run(object).await
	}

	/// Builds one object without entering an async context.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SyncBuildWithHooks`] if any after-create hook
	/// is registered; hooks only run on the async path and are never silently
	/// skipped.
	pub fn build_sync(&self, overrides: Value) -> FactoryResult<Value> {
		if self.has_hooks() {
			return Err(FactoryError::SyncBuildWithHooks(self.inner.name.clone()));
		}
		self.instantiate(overrides)
	}

	/// Builds one object and deserializes it into `T`.
	///
	/// # Errors
	///
	/// Propagates build errors, and [`FactoryError::Json`] if the built object
	/// does not match `T`'s shape.
	pub async fn build_as<T>(&self, overrides: Value) -> FactoryResult<T>
	where
		T: DeserializeOwned,
	{
		let object = self.build(overrides).await?;
		Ok(serde_json::from_value(object)?)
	}

	/// Synchronous form of [`Blueprint::build_as`].
	///
	/// # Errors
	///
	/// Same as [`Blueprint::build_sync`], plus [`FactoryError::Json`] on a
	/// shape mismatch.
	pub fn build_sync_as<T>(&self, overrides: Value) -> FactoryResult<T>
	where
		T: DeserializeOwned,
	{
		let object = self.build_sync(overrides)?;
		Ok(serde_json::from_value(object)?)
	}

	/// Returns a fresh [`HookChain`] over a snapshot of the current hooks.
	///
	/// Every call starts a new chain; driving one chain does not affect
	/// another, and hooks registered later do not join a chain already taken.
	pub fn hook_chain(&self) -> HookChain {
		HookChain::new(self.inner.hooks.read().clone())
	}

	/// Returns `true` if any after-create hook is registered.
	pub fn has_hooks(&self) -> bool {
		!self.inner.hooks.read().is_empty()
	}

	/// Returns `true` if the blueprint was created with a constructor.
	pub fn has_constructor(&self) -> bool {
		self.inner.constructor.is_some()
	}

	/// Returns the declared attribute names in declaration order.
	pub fn attr_names(&self) -> Vec<String> {
		self.inner.attrs.read().keys().cloned().collect()
	}

	/// Restarts every sequence attribute so the next build counts from `1`.
	pub fn reset_sequences(&self) {
		for attribute in self.inner.attrs.read().values() {
			if let Attribute::Sequence(sequence) = attribute {
				sequence.reset();
			}
		}
	}
}

impl fmt::Debug for Blueprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Blueprint")
			.field("name", &self.inner.name)
			.field("attributes", &self.attr_names())
			.field("hooks", &self.inner.hooks.read().len())
			.finish()
	}
}

fn override_entries(overrides: Value) -> FactoryResult<AttrMap> {
	match overrides {
		Value::Null => Ok(AttrMap::new()),
		Value::Object(map) => Ok(map),
		other => Err(FactoryError::InvalidOverrides(value_kind(&other).to_string())),
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
