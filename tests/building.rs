//! Blueprint Build Pipeline Tests
//!
//! This module exercises the full build pipeline on standalone blueprints:
//! attribute resolution, override merging, constructors, and after-create
//! hooks.
//!
//! # Test Categories
//!
//! - Attribute Resolution: literals, generators, declaration order
//! - Overrides: presence-based merging, extra keys, rejected shapes
//! - Sequences: numbering, independence, custom mappings
//! - Constructors: custom object shapes and typed deserialization
//! - Hooks: ordering, mutation, failure, sync rejection

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fabrique::prelude::*;
use parking_lot::Mutex;
use rstest::*;
use serde::Deserialize;
use serde_json::{Value, json};

// =============================================================================
// Fixtures
// =============================================================================

#[fixture]
fn user_blueprint() -> Blueprint {
	let user = Blueprint::new("user");
	user.sequence("id")
		.sequence_with("login", |i| json!(format!("user{i}")))
		.attr("active", true);
	user
}

// =============================================================================
// Attribute Resolution
// =============================================================================

#[rstest]
fn test_literal_attributes_build_plain_objects() {
	let thing = Blueprint::new("thing");
	thing.attr("name", "Thing 1");

	let object = thing.build_sync(json!({})).unwrap();

	assert_eq!(object, json!({"name": "Thing 1"}));
}

#[rstest]
fn test_generators_run_once_per_build() {
	let invocations = Arc::new(AtomicU64::new(0));
	let seen = Arc::clone(&invocations);
	let event = Blueprint::new("event");
	event.attr_fn("nonce", move || json!(seen.fetch_add(1, Ordering::SeqCst)));

	let first = event.build_sync(json!({})).unwrap();
	let second = event.build_sync(json!({})).unwrap();

	assert_eq!(first["nonce"], json!(0), "first build sees the first value");
	assert_eq!(second["nonce"], json!(1), "generator results are never cached");
	assert_eq!(invocations.load(Ordering::SeqCst), 2);
}

#[rstest]
fn test_built_objects_keep_declaration_order(user_blueprint: Blueprint) {
	let attrs = user_blueprint.attributes(json!({"note": "extra"})).unwrap();
	let keys: Vec<&String> = attrs.keys().collect();

	assert_eq!(keys, ["id", "login", "active", "note"]);
}

// =============================================================================
// Overrides
// =============================================================================

#[rstest]
fn test_overrides_replace_declared_values() {
	let thing = Blueprint::new("thing");
	thing.attr("name", "Thing 1");

	let object = thing.build_sync(json!({"name": "changed"})).unwrap();

	assert_eq!(object, json!({"name": "changed"}));
}

#[rstest]
#[case(json!(false), "explicit false wins")]
#[case(json!(0), "explicit zero wins")]
#[case(json!(""), "empty string wins")]
#[case(json!(null), "explicit null wins")]
fn test_overrides_win_by_key_presence(#[case] replacement: Value, #[case] desc: &str) {
	let flag = Blueprint::new("flag");
	flag.attr("value", "declared");

	let object = flag
		.build_sync(json!({"value": replacement.clone()}))
		.unwrap();

	assert_eq!(object["value"], replacement, "{desc}");
}

#[rstest]
fn test_unknown_override_keys_pass_through(user_blueprint: Blueprint) {
	let object = user_blueprint
		.build_sync(json!({"comment": "added at build"}))
		.unwrap();

	assert_eq!(object["comment"], json!("added at build"));
	assert_eq!(object["id"], json!(1), "declared attributes still resolve");
}

#[rstest]
fn test_null_overrides_mean_no_overrides(user_blueprint: Blueprint) {
	let object = user_blueprint.build_sync(json!(null)).unwrap();

	assert_eq!(object, json!({"id": 1, "login": "user1", "active": true}));
}

#[rstest]
fn test_scalar_overrides_are_rejected(user_blueprint: Blueprint) {
	let error = user_blueprint.build_sync(json!("not an object")).unwrap_err();

	assert!(matches!(error, FactoryError::InvalidOverrides(_)));
}

// =============================================================================
// Sequences
// =============================================================================

#[rstest]
fn test_sequences_number_consecutive_builds(user_blueprint: Blueprint) {
	let first = user_blueprint.build_sync(json!({})).unwrap();
	let second = user_blueprint.build_sync(json!({})).unwrap();
	let third = user_blueprint.build_sync(json!({})).unwrap();

	assert_eq!(first["id"], json!(1));
	assert_eq!(second["id"], json!(2));
	assert_eq!(third["id"], json!(3));
	assert_eq!(third["login"], json!("user3"));
}

#[rstest]
fn test_sequences_of_different_blueprints_are_independent() {
	let users = Blueprint::new("user");
	users.sequence("id");
	let posts = Blueprint::new("post");
	posts.sequence("id");

	// Interleaved builds must not share a counter.
	assert_eq!(users.build_sync(json!({})).unwrap()["id"], json!(1));
	assert_eq!(posts.build_sync(json!({})).unwrap()["id"], json!(1));
	assert_eq!(users.build_sync(json!({})).unwrap()["id"], json!(2));
	assert_eq!(posts.build_sync(json!({})).unwrap()["id"], json!(2));
}

#[rstest]
fn test_overriding_a_sequence_still_advances_it(user_blueprint: Blueprint) {
	let pinned = user_blueprint.build_sync(json!({"id": 500})).unwrap();
	let next = user_blueprint.build_sync(json!({})).unwrap();

	assert_eq!(pinned["id"], json!(500));
	assert_eq!(next["id"], json!(2), "the counter advanced under the override");
}

#[rstest]
fn test_reset_sequences_restarts_every_counter(user_blueprint: Blueprint) {
	user_blueprint.build_sync(json!({})).unwrap();
	user_blueprint.build_sync(json!({})).unwrap();

	user_blueprint.reset_sequences();
	let object = user_blueprint.build_sync(json!({})).unwrap();

	assert_eq!(object["id"], json!(1));
	assert_eq!(object["login"], json!("user1"));
}

// =============================================================================
// Constructors
// =============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct User {
	id: u64,
	login: String,
	active: bool,
}

#[rstest]
fn test_constructor_shapes_the_final_object() {
	let wrapped = Blueprint::new_with("wrapped", |attrs| {
		Ok(json!({"model": "thing", "fields": Value::Object(attrs)}))
	});
	wrapped.attr("name", "Thing 1");

	let object = wrapped.build_sync(json!({})).unwrap();

	assert_eq!(
		object,
		json!({"model": "thing", "fields": {"name": "Thing 1"}})
	);
}

#[rstest]
fn test_constructor_sees_overrides() {
	let titled = Blueprint::new_with("titled", |attrs| {
		let title = attrs["title"].as_str().unwrap_or("untitled").to_uppercase();
		Ok(json!({"title": title}))
	});
	titled.attr("title", "draft");

	let object = titled.build_sync(json!({"title": "final"})).unwrap();

	assert_eq!(object, json!({"title": "FINAL"}));
}

#[rstest]
#[tokio::test]
async fn test_constructor_failure_skips_hooks() {
	let ran = Arc::new(Mutex::new(Vec::new()));
	let seen = Arc::clone(&ran);
	let broken = Blueprint::new_with("broken", |_| {
		Err(FactoryError::Constructor("rejected".to_string()))
	});
	broken.after_create(move |object| {
		let seen = Arc::clone(&seen);
		async move {
			seen.lock().push("hook");
			Ok(object)
		}
	});

	let result = broken.build(json!({})).await;

	assert!(matches!(result, Err(FactoryError::Constructor(_))));
	assert!(ran.lock().is_empty(), "hooks must not run after a failed constructor");
}

#[rstest]
#[tokio::test]
async fn test_build_as_deserializes_into_domain_type(user_blueprint: Blueprint) {
	let user: User = user_blueprint.build_as(json!({"active": false})).await.unwrap();

	assert_eq!(
		user,
		User {
			id: 1,
			login: "user1".to_string(),
			active: false,
		}
	);
}

#[rstest]
fn test_build_sync_as_reports_shape_mismatches(user_blueprint: Blueprint) {
	let result: FactoryResult<User> = user_blueprint.build_sync_as(json!({"id": "not a number"}));

	assert!(matches!(result, Err(FactoryError::Json(_))));
}

// =============================================================================
// Hooks
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_hooks_run_in_registration_order() {
	let order = Arc::new(Mutex::new(Vec::new()));
	let thing = Blueprint::new("thing");
	for label in ["first", "second", "third"] {
		let order = Arc::clone(&order);
		thing.after_create(move |object| {
			let order = Arc::clone(&order);
			async move {
				order.lock().push(label);
				Ok(object)
			}
		});
	}

	thing.build(json!({})).await.unwrap();

	assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[rstest]
#[tokio::test]
async fn test_hooks_mutate_the_built_object() {
	let thing = Blueprint::new("thing");
	thing.attr("name", "Thing 1").after_create(|mut object| async move {
		object["foo"] = json!(3);
		Ok(object)
	});

	let object = thing.build(json!({})).await.unwrap();

	assert_eq!(object, json!({"name": "Thing 1", "foo": 3}));
}

#[rstest]
#[tokio::test]
async fn test_hook_may_replace_the_object() {
	let thing = Blueprint::new("thing");
	thing
		.attr("name", "Thing 1")
		.after_create(|object| async move { Ok(json!({"wrapped": object})) });

	let object = thing.build(json!({})).await.unwrap();

	assert_eq!(object, json!({"wrapped": {"name": "Thing 1"}}));
}

#[rstest]
#[tokio::test]
async fn test_failing_hook_aborts_later_hooks() {
	let order = Arc::new(Mutex::new(Vec::new()));
	let thing = Blueprint::new("thing");
	{
		let order = Arc::clone(&order);
		thing.after_create(move |object| {
			let order = Arc::clone(&order);
			async move {
				order.lock().push("before");
				Ok(object)
			}
		});
	}
	thing.after_create(|_| async move { Err(FactoryError::Hook("boom".to_string())) });
	{
		let order = Arc::clone(&order);
		thing.after_create(move |object| {
			let order = Arc::clone(&order);
			async move {
				order.lock().push("after");
				Ok(object)
			}
		});
	}

	let result = thing.build(json!({})).await;

	assert!(matches!(result, Err(FactoryError::Hook(_))));
	assert_eq!(*order.lock(), vec!["before"], "the chain stops at the failure");
}

#[rstest]
fn test_build_sync_refuses_hooked_blueprints() {
	let thing = Blueprint::new("thing");
	thing.after_create(|object| async move { Ok(object) });

	let error = thing.build_sync(json!({})).unwrap_err();

	assert!(matches!(error, FactoryError::SyncBuildWithHooks(name) if name == "thing"));
}

#[rstest]
#[tokio::test]
async fn test_hook_chain_can_be_stepped_manually() {
	let thing = Blueprint::new("thing");
	thing
		.after_create(|mut object| async move {
			object["step"] = json!(1);
			Ok(object)
		})
		.after_create(|mut object| async move {
			object["step"] = json!(2);
			Ok(object)
		});

	let mut chain = thing.hook_chain();
	assert_eq!(chain.remaining(), 2);

	let object = chain.step(json!({})).await.unwrap();
	assert_eq!(object["step"], json!(1));

	let object = chain.step(object).await.unwrap();
	assert_eq!(object["step"], json!(2));
	assert!(chain.is_finished());
}
