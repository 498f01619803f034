use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::schema::Conformance;
use crate::value::ValueType;

fn foo_bar() -> Schema {
	Schema::define("Foo", ["foo", "bar"]).unwrap()
}

fn counting_resolver(calls: &Arc<AtomicUsize>) -> impl Fn(&Record, &Attribute) -> std::result::Result<Value, ResolveFailure> + Send + Sync + 'static {
	let calls = calls.clone();
	move |_, attribute| {
		calls.fetch_add(1, Ordering::SeqCst);
		Ok(Value::from(format!("lazy {}", attribute.name())))
	}
}

#[test]
fn values_are_readable_via_get_and_fetch() {
	let record = Record::from_values(&foo_bar(), [("foo", "hi")]).unwrap();
	assert_eq!(record.fetch("foo").unwrap(), Value::from("hi"));
	assert_eq!(record.get("foo").unwrap(), Some(Value::from("hi")));
	assert!(record.attribute_loaded("foo"));
	assert!(!record.attribute_loaded("bar"));
}

#[test]
fn set_then_read() {
	let record = Record::new(&foo_bar());
	record.set("bar", "byez").unwrap();
	assert_eq!(record.fetch("bar").unwrap(), Value::from("byez"));
	record.set("bar", "bye").unwrap();
	assert_eq!(record.fetch("bar").unwrap(), Value::from("bye"));
}

#[test]
fn unloaded_without_resolver_is_none_for_get_and_partial_for_fetch() {
	let record = Record::new(&foo_bar());
	assert_eq!(record.get("foo").unwrap(), None);
	assert!(matches!(record.fetch("foo"), Err(RecordError::PartialData { .. })));
}

#[test]
fn unknown_attributes_are_rejected_everywhere() {
	let schema = foo_bar();
	assert!(matches!(
		Record::from_values(&schema, [("wtf", 123)]),
		Err(RecordError::UnknownAttribute { .. })
	));
	let record = Record::new(&schema);
	assert!(matches!(record.set("wtf", 123), Err(RecordError::UnknownAttribute { .. })));
	assert!(matches!(record.get("wtf"), Err(RecordError::UnknownAttribute { .. })));
	assert!(matches!(record.fetch("wtf"), Err(RecordError::UnknownAttribute { .. })));
	assert!(!record.attribute_loaded("wtf"));
}

#[test]
fn construction_is_all_or_nothing() {
	let err = Record::from_values(&foo_bar(), [("foo", 1), ("wtf", 2)]).unwrap_err();
	assert_eq!(err.attribute(), Some("wtf"));
	assert_eq!(err.to_string(), "no attribute 'wtf' in Foo");
}

#[test]
fn resolver_runs_once_per_attribute_and_sees_the_record() {
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = Arc::new(parking_lot::Mutex::new(None::<Record>));
	let record = {
		let calls = calls.clone();
		let seen = seen.clone();
		Record::lazy(&foo_bar(), move |record, attribute| {
			*seen.lock() = Some(record.clone());
			assert_eq!(attribute.name(), "foo", "unexpected call to resolver");
			assert_eq!(calls.fetch_add(1, Ordering::SeqCst), 0, "resolver called twice for foo");
			Ok(Value::Int(123))
		})
	};

	assert!(!record.attribute_loaded("foo"));
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
	assert!(record.attribute_loaded("foo"));
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert!(seen.lock().as_ref().is_some_and(|r| r.same_instance(&record)));
}

#[test]
fn resolver_is_not_called_for_preloaded_values() {
	let record = Record::with_resolver(&foo_bar(), [("foo", 123)], |_, _| {
		panic!("unexpected call to resolver");
	})
	.unwrap();
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
}

#[test]
fn resolver_may_read_other_attributes() {
	let record = Record::lazy(&foo_bar(), |record, attribute| match attribute.name() {
		"foo" => Ok(Value::Int(1)),
		_ => Ok(Value::Int(record.fetch("foo")?.as_int().unwrap_or(0) + 1)),
	});
	assert_eq!(record.fetch("bar").unwrap(), Value::Int(2));
	assert!(record.attribute_loaded("foo"));
}

#[test]
fn resolver_failure_is_surfaced_and_not_cached() {
	let record = Record::lazy(&foo_bar(), |_, _| Err("backing store unavailable".into()));
	let err = record.fetch("foo").unwrap_err();
	assert!(matches!(err, RecordError::Resolve { .. }));
	assert!(err.to_string().contains("backing store unavailable"));
	assert!(!record.attribute_loaded("foo"));
}

#[test]
fn write_during_resolution_keeps_result_out_of_store() {
	let record = Record::lazy(&foo_bar(), |record, _| {
		record.set("bar", 1)?;
		Ok(Value::from("stale"))
	});

	assert_eq!(record.fetch("foo").unwrap(), Value::from("stale"));
	assert!(!record.has_resolver());
	assert!(!record.attribute_loaded("foo"));
	assert_eq!(record.fetch("bar").unwrap(), Value::Int(1));
	assert!(matches!(record.fetch("foo"), Err(RecordError::PartialData { .. })));
}

#[rstest]
#[case::set(|r: &Record| r.set("foo", 1))]
#[case::merge_in_place(|r: &Record| r.merge_in_place([("foo", 1)]))]
#[case::merge(|r: &Record| r.merge([("foo", 1)]).map(drop))]
#[case::remove_resolver(|r: &Record| r.remove_resolver())]
fn mutation_discards_resolver(#[case] mutate: fn(&Record) -> Result<()>) {
	let calls = Arc::new(AtomicUsize::new(0));
	let record = Record::lazy(&foo_bar(), counting_resolver(&calls));
	assert!(record.has_resolver());

	mutate(&record).unwrap();
	let target = if record.has_resolver() {
		// merge leaves the receiver alone; the copy is the mutated record
		record.merge([("foo", 1)]).unwrap()
	} else {
		record
	};

	assert!(!target.has_resolver());
	assert!(matches!(target.fetch("bar"), Err(RecordError::PartialData { .. })));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn merge_returns_copy_and_leaves_receiver() {
	let record = Record::from_values(&foo_bar(), [("foo", 123), ("bar", 789)]).unwrap();
	let merged = record.merge([("bar", 456)]).unwrap();
	assert_eq!(record.fetch("bar").unwrap(), Value::Int(789));
	assert_eq!(merged.fetch("bar").unwrap(), Value::Int(456));
	assert_eq!(merged.fetch("foo").unwrap(), Value::Int(123));
	assert!(!merged.same_instance(&record));
}

#[test]
fn merge_with_another_record_takes_only_loaded_values() {
	let schema = foo_bar();
	let record = Record::from_values(&schema, [("foo", 123), ("bar", 789)]).unwrap();
	let other = Record::from_values(&schema, [("bar", 456)]).unwrap();
	let merged = record.merge(other.loaded_values()).unwrap();
	assert_eq!(merged.fetch("bar").unwrap(), Value::Int(456));
	assert_eq!(merged.fetch("foo").unwrap(), Value::Int(123));
}

#[test]
fn failed_merge_changes_nothing() {
	let calls = Arc::new(AtomicUsize::new(0));
	let record = Record::with_resolver(&foo_bar(), [("foo", 1)], counting_resolver(&calls)).unwrap();
	let before = record.loaded_values();

	let updates: Vec<(&str, Value)> = vec![("bar", Value::Int(2)), ("wtf", Value::Int(3))];
	assert!(matches!(record.merge(updates.clone()), Err(RecordError::UnknownAttribute { .. })));
	assert!(matches!(record.merge_in_place(updates), Err(RecordError::UnknownAttribute { .. })));

	assert_eq!(record.loaded_values(), before);
	assert!(record.has_resolver());
}

#[test]
fn loaded_values_is_a_copy() {
	let record = Record::from_values(&foo_bar(), [("foo", 123)]).unwrap();
	let mut values = record.loaded_values();
	values.insert("foo".into(), Value::Int(345));
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
	assert_eq!(record.loaded_attributes().iter().map(|a| a.name()).collect::<Vec<_>>(), vec!["foo"]);
}

#[test]
fn duplicate_has_independent_store() {
	let record = Record::from_values(&foo_bar(), [("foo", 123)]).unwrap();
	let copy = record.duplicate();
	assert!(!copy.same_instance(&record));

	copy.set("foo", 345).unwrap();
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
	record.set("foo", 678).unwrap();
	assert_eq!(copy.fetch("foo").unwrap(), Value::Int(345));
}

#[test]
fn duplicate_shares_resolver_but_caches_separately() {
	let calls = Arc::new(AtomicUsize::new(0));
	let record = Record::lazy(&foo_bar(), counting_resolver(&calls));
	let copy = record.duplicate();

	assert_eq!(record.fetch("foo").unwrap(), Value::from("lazy foo"));
	assert!(!copy.attribute_loaded("foo"));
	assert_eq!(copy.fetch("foo").unwrap(), Value::from("lazy foo"));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
#[case::set(|r: &Record| r.set("foo", 234))]
#[case::merge(|r: &Record| r.merge([("foo", 234)]).map(drop))]
#[case::merge_in_place(|r: &Record| r.merge_in_place([("foo", 234)]))]
#[case::remove_resolver(|r: &Record| r.remove_resolver())]
fn frozen_record_rejects_writes(#[case] mutate: fn(&Record) -> Result<()>) {
	let record = Record::from_values(&foo_bar(), [("foo", 123)]).unwrap();
	record.freeze();
	assert!(record.is_frozen());
	assert!(matches!(mutate(&record), Err(RecordError::Immutable { .. })));
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));
}

#[test]
fn frozen_record_refuses_to_resolve() {
	let calls = Arc::new(AtomicUsize::new(0));
	let record = Record::with_resolver(&foo_bar(), [("foo", 1)], counting_resolver(&calls)).unwrap();
	record.freeze();
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(1));
	assert!(matches!(record.fetch("bar"), Err(RecordError::Immutable { .. })));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert!(!record.duplicate().is_frozen());
}

#[test]
fn records_without_identity_compare_by_instance() {
	let schema = foo_bar();
	let a = Record::from_values(&schema, [("foo", 2)]).unwrap();
	let b = Record::from_values(&schema, [("foo", 2)]).unwrap();
	assert_eq!(a, a.clone());
	assert_ne!(a, b);
	assert_ne!(a, a.duplicate());
	assert_eq!(a.id(), None);
}

#[test]
fn identity_drives_equality_and_hash() {
	let schema = Schema::define_with_identity("Foo", ["foo", "bar"]).unwrap();
	let a = Record::from_values(&schema, [("id", 1), ("bar", 2)]).unwrap();
	let b = Record::from_values(&schema, [("id", 1), ("bar", 3)]).unwrap();

	assert_eq!(a.id(), Some(Value::Int(1)));
	assert_eq!(a.fetch("id").unwrap(), Value::Int(1));
	assert_eq!(a, b);
	assert_eq!(a, a.duplicate());
	assert!(!a.same_instance(&a.duplicate()));

	let set: HashSet<Record> = [a.clone()].into_iter().collect();
	assert!(set.contains(&a));
	assert!(set.contains(&b));
	assert!(set.contains(&a.duplicate()));
}

#[test]
fn identity_free_instances_are_equal_only_to_themselves() {
	let schema = Schema::define_with_identity("Foo", ["foo", "bar"]).unwrap();
	let a = Record::from_values(&schema, [("foo", 2)]).unwrap();
	let b = Record::from_values(&schema, [("foo", 2)]).unwrap();
	assert_eq!(a, a);
	assert_ne!(a, b);
	assert_ne!(a, a.duplicate());

	let null_id = Record::from_values(&schema, [("id", Value::Null)]).unwrap();
	assert_ne!(null_id, null_id.duplicate());
}

#[test]
fn identity_requires_same_concrete_type() {
	let base = Schema::define_with_identity("Base", ["foo"]).unwrap();
	let derived = base.extend("Derived").build();
	let a = Record::from_values(&base, [("id", 1)]).unwrap();
	let b = Record::from_values(&derived, [("id", 1)]).unwrap();
	assert_ne!(a, b);
}

#[test]
fn identity_never_triggers_resolution() {
	let schema = Schema::define_with_identity("Foo", ["foo"]).unwrap();
	let record = Record::lazy(&schema, |_, _| panic!("identity must not resolve"));
	assert_eq!(record.id(), None);
	assert_eq!(record, record.clone());
}

#[test]
fn aliased_identity_attribute() {
	let schema = Schema::builder("Foo").identity("foo").build();
	let a = Record::from_values(&schema, [("foo", 123)]).unwrap();
	assert_eq!(a, Record::from_values(&schema, [("foo", 123)]).unwrap());
	assert_eq!(a.id(), Some(Value::Int(123)));

	let record = Record::new(&schema);
	record.set_id(123).unwrap();
	assert_eq!(record.id(), Some(Value::Int(123)));
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));

	let plain = Record::new(&foo_bar());
	assert!(matches!(plain.set_id(1), Err(RecordError::UnknownAttribute { .. })));
}

fn typed_schema() -> Schema {
	Schema::builder("TestTypedClass")
		.typed("foo", ValueType::Int)
		.typed("bar", ValueType::List)
		.typed("baz", ValueType::Bool)
		.build()
}

#[test]
fn typed_values_are_checked_on_construction() {
	let schema = typed_schema();
	assert!(Record::from_values(&schema, [("foo", 123)]).is_ok());
	assert!(matches!(
		Record::from_values(&schema, [("foo", "abc")]),
		Err(RecordError::TypeMismatch { got: "string", .. })
	));

	let shallow = vec![Value::from("only"), Value::from("shallow")];
	assert!(Record::from_values(&schema, [("foo", Value::Int(123)), ("bar", Value::List(shallow))]).is_ok());
	assert!(Record::from_values(&schema, [("foo", Value::Int(123)), ("bar", Value::from("abc"))]).is_err());
}

#[test]
fn typed_values_are_checked_on_write() {
	let record = Record::new(&typed_schema());
	record.set("foo", 123).unwrap();
	record.set("bar", vec![Value::Int(123), Value::Bool(false)]).unwrap();
	record.set("baz", true).unwrap();

	let err = record.set("foo", "not an int").unwrap_err();
	assert_eq!(
		err.to_string(),
		"type mismatch for attribute 'foo' in TestTypedClass: expected int, got string"
	);
	assert!(record.set("bar", "not a list").is_err());
	assert!(record.set("baz", "not a bool").is_err());
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(123));

	assert!(matches!(
		record.merge_in_place([("baz", Value::Bool(false)), ("foo", Value::from("x"))]),
		Err(RecordError::TypeMismatch { .. })
	));
	assert_eq!(record.fetch("baz").unwrap(), Value::Bool(true));
}

#[test]
fn rejected_typed_write_keeps_resolver() {
	let record = Record::lazy(&typed_schema(), |_, _| Ok(Value::Int(7)));
	assert!(record.set("foo", "nope").is_err());
	assert!(record.has_resolver());
	assert_eq!(record.fetch("foo").unwrap(), Value::Int(7));
}

#[test]
fn lazily_resolved_values_are_checked_on_demand() {
	let record = Record::lazy(&typed_schema(), |_, _| Ok(Value::from("wrong")));
	assert!(matches!(record.check_attribute("foo"), Err(RecordError::PartialData { .. })));
	assert_eq!(record.fetch("foo").unwrap(), Value::from("wrong"));
	assert!(matches!(record.check_attribute("foo"), Err(RecordError::TypeMismatch { .. })));
	assert!(record.check_attributes().is_err());
}

#[test]
fn typed_identity_combination() {
	let schema = Schema::builder("TestTypedClassWithIdentity")
		.typed("id", ValueType::Int)
		.typed("foo", ValueType::Int)
		.identity("id")
		.build();
	let a = Record::from_values(&schema, [("id", 123)]).unwrap();
	assert_eq!(a, Record::from_values(&schema, [("id", 123)]).unwrap());
	assert!(a.check_attribute("id").is_ok());
	assert!(matches!(Record::new(&schema).set_id("not an int"), Err(RecordError::TypeMismatch { .. })));
}

#[test]
fn custom_predicate_contract() {
	let schema = Schema::builder("Positive")
		.typed("n", Conformance::predicate("positive int", |v| v.as_int().is_some_and(|i| i > 0)))
		.build();
	let record = Record::new(&schema);
	assert!(record.set("n", 3).is_ok());
	let err = record.set("n", -3).unwrap_err();
	assert!(err.to_string().contains("expected positive int"));
}

#[test]
fn display_marks_pending_resolution() {
	let schema = foo_bar();
	let record = Record::with_resolver(&schema, [("foo", "present")], |_, _| Ok("lazy".into())).unwrap();
	assert_eq!(record.to_string(), r#"#<Foo foo="present", ...>"#);
	assert_eq!(Record::lazy(&schema, |_, _| Ok(Value::Null)).to_string(), "#<Foo ...>");
	assert_eq!(Record::new(&schema).to_string(), "#<Foo>");
}

#[test]
fn display_survives_cycles() {
	let record = Record::new(&foo_bar());
	record.set("foo", Value::List(vec![Value::Record(record.clone())])).unwrap();
	assert_eq!(record.to_string(), "#<Foo foo=[#<Foo ...>]>");
	assert_eq!(format!("{:?}", record), "#<Foo foo=[#<Foo ...>]>");
	assert_eq!(
		record.fetch("foo").unwrap().to_string(),
		"[#<Foo foo=[#<Foo ...>]>]"
	);
}

#[test]
fn frozen_record_is_shareable_across_threads() {
	let record = Record::from_values(&foo_bar(), [("foo", 1), ("bar", 2)]).unwrap();
	record.freeze();
	let handles: Vec<_> = (0..4)
		.map(|_| {
			let record = record.clone();
			std::thread::spawn(move || record.fetch("bar").map(|v| v.as_int()))
		})
		.collect();
	for handle in handles {
		assert_eq!(handle.join().unwrap().unwrap(), Some(2));
	}
}

proptest! {
	#[test]
	fn resolver_invoked_at_most_once_per_attribute(reads in proptest::collection::vec(0usize..2, 0..32)) {
		let calls = Arc::new(AtomicUsize::new(0));
		let record = Record::lazy(&foo_bar(), counting_resolver(&calls));
		let names = ["foo", "bar"];
		for &i in &reads {
			prop_assert_eq!(record.fetch(names[i]).unwrap(), Value::from(format!("lazy {}", names[i])));
		}
		let distinct: HashSet<_> = reads.iter().collect();
		prop_assert_eq!(calls.load(Ordering::SeqCst), distinct.len());
	}
}
