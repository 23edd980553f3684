//! Blueprint-based object factories for building test fixtures.
//!
//! Test data is described once, as a named blueprint, and built many times:
//!
//! - **Literal attributes**: fixed values cloned into every built object
//! - **Generators**: closures invoked once per build, never cached
//! - **Sequences**: per-attribute counters for unique ids and logins
//! - **Overrides**: per-call values that win by key presence
//! - **After-create hooks**: ordered async post-processing of built objects
//!
//! # Quick Start
//!
//! Declare a blueprint once, then build objects from it by name:
//!
//! ```
//! use fabrique::prelude::*;
//! use serde_json::json;
//!
//! define("user")
//! 	.sequence("id")
//! 	.sequence_with("login", |i| json!(format!("user{i}")))
//! 	.attr("active", true);
//!
//! let first = build_sync("user", json!({})).unwrap();
//! assert_eq!(first, json!({"id": 1, "login": "user1", "active": true}));
//!
//! let second = build_sync("user", json!({"active": false})).unwrap();
//! assert_eq!(second, json!({"id": 2, "login": "user2", "active": false}));
//! ```
//!
//! After-create hooks make the build pipeline async:
//!
//! ```
//! use fabrique::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! define("post")
//! 	.sequence("id")
//! 	.attr("title", "untitled")
//! 	.after_create(|mut object| async move {
//! 		object["slug"] = json!(format!("post-{}", object["id"]));
//! 		Ok(object)
//! 	});
//!
//! let post = build("post", json!({"title": "Hello"})).await.unwrap();
//! assert_eq!(post["slug"], json!("post-1"));
//! # });
//! ```
//!
//! # Architecture
//!
//! - [`Blueprint`](blueprint::Blueprint) - Named recipe: attributes, constructor, hooks
//! - [`Attribute`](attribute::Attribute) - Explicit literal / generator / sequence variants
//! - [`Sequence`](attribute::Sequence) - Atomic per-attribute counter
//! - [`HookChain`](hooks::HookChain) - Single-pass driver over after-create hooks
//! - [`registry`] - Process-wide name-to-blueprint map
//! - [`FactoryError`](error::FactoryError) - Error surface for declarations and builds

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod attribute;
pub mod blueprint;
pub mod error;
pub mod hooks;
pub mod prelude;
pub mod registry;

// Re-export commonly used types at crate root
pub use attribute::{AttrMap, Attribute, GeneratorFn, Sequence, SequenceFn};
pub use blueprint::{Blueprint, Constructor};
pub use error::{FactoryError, FactoryResult};
pub use hooks::{AfterCreate, HookChain};
pub use registry::{
	Registry, attributes, blueprint_count, blueprint_names, build, build_as, build_batch,
	build_sync, build_sync_as, clear_blueprints, define, define_with, get, has_blueprint, register,
};
