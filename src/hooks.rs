//! After-create hook chain.
//!
//! Hooks are async post-processing steps registered on a blueprint. They run
//! strictly in registration order: each hook receives the object produced so
//! far and returns the object to hand to the next hook, so a hook may mutate
//! or wholly replace it. A failing hook stops the chain and surfaces its
//! error; later hooks never run.
//!
//! [`HookChain`] is the driver for one build. It is a finite, single-pass
//! queue: every hook is delivered exactly one object exactly once, whether the
//! chain is consumed in one go with [`HookChain::run`] or advanced manually
//! with [`HookChain::step`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::FactoryResult;

/// Shared async hook invoked after an object is constructed.
///
/// The hook owns the object for the duration of its future and yields the
/// object to pass along, or an error to abort the build.
pub type AfterCreate = Arc<dyn Fn(Value) -> BoxFuture<'static, FactoryResult<Value>> + Send + Sync>;

/// Single-pass driver over a blueprint's after-create hooks.
///
/// A chain is created per build from a snapshot of the registered hooks;
/// hooks registered after the snapshot do not join an in-flight chain.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fabrique::hooks::{AfterCreate, HookChain};
/// use serde_json::json;
///
/// let stamp: AfterCreate = Arc::new(|mut object| {
/// 	Box::pin(async move {
/// 		object["saved"] = json!(true);
/// 		Ok(object)
/// 	})
/// });
///
/// # tokio_test::block_on(async {
/// let chain = HookChain::new([stamp]);
/// let object = chain.run(json!({"id": 1})).await.unwrap();
/// assert_eq!(object, json!({"id": 1, "saved": true}));
/// # });
/// ```
pub struct HookChain {
	remaining: VecDeque<AfterCreate>,
}

impl HookChain {
	/// Creates a chain that will deliver to `hooks` in iteration order.
	pub fn new(hooks: impl IntoIterator<Item = AfterCreate>) -> Self {
		Self {
			remaining: hooks.into_iter().collect(),
		}
	}

	/// Number of hooks that have not yet run.
	pub fn remaining(&self) -> usize {
		self.remaining.len()
	}

	/// Returns `true` once every hook has run.
	pub fn is_finished(&self) -> bool {
		self.remaining.is_empty()
	}

	/// Runs the next hook on `object` and returns the object it yields.
	///
	/// On an exhausted chain this is a passthrough: `object` comes back
	/// unchanged.
	///
	/// # Errors
	///
	/// Propagates the hook's error; the hook is still consumed, so retrying
	/// the step does not re-run it.
	pub async fn step(&mut self, object: Value) -> FactoryResult<Value> {
		match self.remaining.pop_front() {
			Some(hook) => hook(object).await,
			None => Ok(object),
		}
	}

	/// Drives the chain to completion, folding `object` through every hook.
	///
	/// # Errors
	///
	/// Returns the first hook error; later hooks are not run.
	pub async fn run(mut self, mut object: Value) -> FactoryResult<Value> {
		while !self.is_finished() {
			object = self.step(object).await?;
		}
		Ok(object)
	}
}

impl fmt::Debug for HookChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookChain")
			.field("remaining", &self.remaining.len())
			.finish()
	}
}
