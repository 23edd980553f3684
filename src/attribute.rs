//! Attribute declarations and resolution.
//!
//! Every field of a blueprint is declared as an [`Attribute`]: a literal value,
//! a generator closure invoked on every build, or a sequence backed by a
//! monotonic counter. The variant is chosen explicitly at declaration time, so
//! a literal that happens to be callable-shaped can never be mistaken for a
//! generator.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// Resolved attribute map produced by a build.
///
/// Keys keep their declaration order (override-only keys follow, in override
/// order), which is why the `preserve_order` feature of `serde_json` is
/// enabled.
pub type AttrMap = serde_json::Map<String, Value>;

/// Shared closure that produces a fresh value on every invocation.
pub type GeneratorFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Shared closure that maps a sequence counter value to an attribute value.
pub type SequenceFn = Arc<dyn Fn(u64) -> Value + Send + Sync>;

/// Wraps a closure into a shared [`GeneratorFn`].
///
/// Convenience for bulk registration APIs that take already-shared closures.
///
/// # Example
///
/// ```
/// use fabrique::attribute::generator;
/// use serde_json::json;
///
/// let fred = generator(|| json!("x1"));
/// assert_eq!(fred(), json!("x1"));
/// ```
pub fn generator<F>(f: F) -> GeneratorFn
where
	F: Fn() -> Value + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Monotonic per-attribute counter paired with a mapping closure.
///
/// The counter starts at zero and is advanced before each use, so the first
/// resolved value is produced from `1`. Advancing is atomic; concurrent builds
/// each observe a distinct counter value.
///
/// # Examples
///
/// ```
/// use fabrique::attribute::Sequence;
/// use serde_json::json;
///
/// let sequence = Sequence::new();
/// assert_eq!(sequence.resolve(), json!(1));
/// assert_eq!(sequence.resolve(), json!(2));
/// ```
pub struct Sequence {
	counter: AtomicU64,
	map: SequenceFn,
}

impl Sequence {
	/// Creates a sequence whose values are the counter itself: `1, 2, 3, ...`.
	pub fn new() -> Self {
		Self::with_map(Value::from)
	}

	/// Creates a sequence that maps each counter value through `map`.
	///
	/// # Example
	///
	/// ```
	/// use fabrique::attribute::Sequence;
	/// use serde_json::json;
	///
	/// let logins = Sequence::with_map(|i| json!(format!("user{i}")));
	/// assert_eq!(logins.resolve(), json!("user1"));
	/// ```
	pub fn with_map<F>(map: F) -> Self
	where
		F: Fn(u64) -> Value + Send + Sync + 'static,
	{
		Self {
			counter: AtomicU64::new(0),
			map: Arc::new(map),
		}
	}

	/// Advances the counter and returns the new value.
	///
	/// The first call returns `1`.
	pub fn next(&self) -> u64 {
		self.counter.fetch_add(1, Ordering::SeqCst) + 1
	}

	/// Returns the most recently issued counter value, or `0` if the sequence
	/// has never been advanced.
	pub fn current(&self) -> u64 {
		self.counter.load(Ordering::SeqCst)
	}

	/// Resets the counter so the next value is produced from `1` again.
	pub fn reset(&self) {
		self.counter.store(0, Ordering::SeqCst);
	}

	/// Advances the counter and maps it to a value.
	pub fn resolve(&self) -> Value {
		(self.map)(self.next())
	}

	/// Returns a copy sharing this sequence's mapping but counting from zero.
	///
	/// Used when one blueprint inherits another: the child keeps the mapping
	/// while numbering its own objects independently.
	pub fn fresh(&self) -> Self {
		Self {
			counter: AtomicU64::new(0),
			map: Arc::clone(&self.map),
		}
	}
}

impl Default for Sequence {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sequence")
			.field("current", &self.current())
			.finish_non_exhaustive()
	}
}

/// A single declared attribute of a blueprint.
///
/// The variant records how the value is produced; nothing is inferred from the
/// value's shape at build time.
pub enum Attribute {
	/// Fixed value, cloned into every built object.
	Literal(Value),
	/// Closure invoked once per build; results are never cached.
	Generator(GeneratorFn),
	/// Counter-backed value advancing once per build.
	Sequence(Sequence),
}

impl Attribute {
	/// Declares a literal attribute.
	pub fn literal(value: impl Into<Value>) -> Self {
		Self::Literal(value.into())
	}

	/// Declares a generator attribute from a closure.
	pub fn generator<F>(f: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		Self::Generator(Arc::new(f))
	}

	/// Declares a plain numeric sequence attribute (`1, 2, 3, ...`).
	pub fn sequence() -> Self {
		Self::Sequence(Sequence::new())
	}

	/// Declares a sequence attribute with a custom counter mapping.
	pub fn sequence_with<F>(map: F) -> Self
	where
		F: Fn(u64) -> Value + Send + Sync + 'static,
	{
		Self::Sequence(Sequence::with_map(map))
	}

	/// Produces this attribute's value for one build.
	///
	/// Literals clone, generators are invoked, sequences advance. Side effects
	/// inside generator closures run on every call.
	pub fn resolve(&self) -> Value {
		match self {
			Self::Literal(value) => value.clone(),
			Self::Generator(f) => f(),
			Self::Sequence(sequence) => sequence.resolve(),
		}
	}

	/// Returns the copy of this attribute a child blueprint receives.
	///
	/// Literals are cloned and generator closures are shared, but sequences
	/// restart from zero so parent and child number independently.
	pub fn inherit(&self) -> Self {
		match self {
			Self::Literal(value) => Self::Literal(value.clone()),
			Self::Generator(f) => Self::Generator(Arc::clone(f)),
			Self::Sequence(sequence) => Self::Sequence(sequence.fresh()),
		}
	}
}

impl fmt::Debug for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
			Self::Generator(_) => f.write_str("Generator(..)"),
			Self::Sequence(sequence) => f.debug_tuple("Sequence").field(sequence).finish(),
		}
	}
}
