//! End-to-end scenarios: generate an artifact, then run it.

#![allow(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]

mod common;

use pretty_assertions::assert_eq;

use ix_eval::{EvalError, Value};
use ix_gen::GeneratorConfig;
use ix_ir::{ErrorKind, MethodKind, TypeElement};

use common::{config, person, point, tagged, Fixture};

fn person_fixture() -> Fixture {
    let mut fixture = Fixture::new(person());
    fixture.host.bind("crm.Person", "greet", |receiver, args| {
        let name = receiver.field("name").unwrap_or(Value::Null);
        let greeting = match &args[0] {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        };
        let times = usize::try_from(args[1].as_int().unwrap_or(1)).unwrap_or(1);
        Ok(Value::Str(format!("{greeting} {name}").repeat(times)))
    });
    fixture
        .host
        .bind("crm.Person", "touch", |_, _| Ok(Value::Null));
    fixture
}

// ── Point ───────────────────────────────────────────────────────────

#[test]
fn point_construct_wither_and_read() {
    let fixture = Fixture::new(point());
    let point = fixture.introspection();

    let p = point
        .instantiate_with_args(vec![Value::Int(3), Value::Int(4)])
        .unwrap();
    assert_eq!(p.to_string(), "Point(x=3, y=4)");

    let x = point.property_index("x").unwrap();
    let y = point.property_index("y").unwrap();
    let moved = point.with_property(x, &p, Value::Int(9)).unwrap();
    assert_eq!(moved.to_string(), "Point(x=9, y=4)");
    assert!(!moved.same_instance(&p));
    assert_eq!(point.get(y, &moved).unwrap(), Value::Int(4));

    // The original is untouched.
    assert_eq!(point.get(x, &p).unwrap(), Value::Int(3));
}

#[test]
fn point_withers_share_one_constructor_call() {
    let fixture = Fixture::new(point());
    let artifact = &fixture.generated.artifact;
    let key = fixture.bean.primary_constructor.as_ref().unwrap().key();

    assert_eq!(artifact.constructor_call_sites(MethodKind::DispatchOne, &key), 1);
    assert_eq!(artifact.constructor_call_sites(MethodKind::Dispatch, &key), 1);
}

#[test]
fn point_wither_through_array_dispatch() {
    let fixture = Fixture::new(point());
    let point = fixture.introspection();
    let p = point
        .instantiate_with_args(vec![Value::Int(1), Value::Int(2)])
        .unwrap();

    let y_wither = point.properties()[1].wither.unwrap();
    let moved = point.dispatch(y_wither, p, vec![Value::Int(7)]).unwrap();
    assert_eq!(moved.to_string(), "Point(x=1, y=7)");
}

#[test]
fn point_cannot_be_set() {
    let fixture = Fixture::new(point());
    let point = fixture.introspection();
    let p = point
        .instantiate_with_args(vec![Value::Int(1), Value::Int(2)])
        .unwrap();

    let err = point.set(0, &p, Value::Int(5)).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnsupportedMutation));
}

#[test]
fn point_without_no_arg_constructor() {
    let fixture = Fixture::new(point());
    let point = fixture.introspection();

    assert_eq!(
        point.instantiate(),
        Err(EvalError::raised(
            ErrorKind::UnsupportedInstantiation,
            "No default constructor exists for type: geo.Point"
        ))
    );
    assert!(point.is_buildable());
    assert!(point.has_builder_support());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_instantiate_set_get() {
    let fixture = Fixture::new(config());
    let config = fixture.introspection();

    let c = config.instantiate().unwrap();
    let name = config.property_index("name").unwrap();
    assert_eq!(config.get(name, &c).unwrap(), Value::Null);

    config.set(name, &c, Value::str("prod")).unwrap();
    assert_eq!(config.get(name, &c).unwrap(), Value::str("prod"));
}

#[test]
fn config_setter_wither_returns_same_instance() {
    let fixture = Fixture::new(config());
    let config = fixture.introspection();
    let c = config.instantiate().unwrap();

    let same = config.with_property(0, &c, Value::str("dev")).unwrap();
    assert!(same.same_instance(&c));
    assert_eq!(c.field("name"), Some(Value::str("dev")));
}

#[test]
fn config_without_argument_constructor() {
    let fixture = Fixture::new(config());
    let config = fixture.introspection();

    assert!(config.instantiate_with_args(Vec::new()).is_ok());
    let err = config
        .instantiate_with_args(vec![Value::str("x")])
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnsupportedInstantiation));
}

// ── Person ──────────────────────────────────────────────────────────

#[test]
fn person_constructor_wither_copies_setter_state() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    let age = person.property_index("age").unwrap();
    let name = person.property_index("name").unwrap();
    person.set(age, &ada, Value::Int(36)).unwrap();

    let grace = person.with_property(name, &ada, Value::str("Grace")).unwrap();
    assert!(!grace.same_instance(&ada));
    assert_eq!(person.get(name, &grace).unwrap(), Value::str("Grace"));
    assert_eq!(person.get(age, &grace).unwrap(), Value::Int(36));
    assert_eq!(person.get(name, &ada).unwrap(), Value::str("Ada"));
}

#[test]
fn person_explicit_wither() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    let nickname = person.property_index("nickname").unwrap();

    let ace = person
        .with_property(nickname, &ada, Value::str("Ace"))
        .unwrap();
    assert_eq!(person.get(nickname, &ace).unwrap(), Value::str("Ace"));
    assert_eq!(person.get(nickname, &ada).unwrap(), Value::Null);
}

#[test]
fn person_unsupported_mutation_names_property() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    let id = person.property_index("id").unwrap();

    match person.with_property(id, &ada, Value::Int(5)) {
        Err(EvalError::Raised {
            kind: ErrorKind::UnsupportedMutation,
            message,
        }) => {
            assert!(message.contains("[id]"), "{message}");
            assert!(message.contains("crm.Person"), "{message}");
        }
        other => panic!("expected UnsupportedMutation, got {other:?}"),
    }
}

#[test]
fn person_method_invocation() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();

    let names: Vec<&str> = person.methods().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["withNickname", "greet", "touch"]);
    assert_eq!(person.method_index("secret"), None);

    let greet = person.method_index("greet").unwrap();
    assert_eq!(
        person
            .invoke_method(greet, &ada, vec![Value::str("Hi"), Value::Int(2)])
            .unwrap(),
        Value::str("Hi AdaHi Ada")
    );

    let touch = person.method_index("touch").unwrap();
    assert_eq!(
        person.invoke_method(touch, &ada, Vec::new()).unwrap(),
        Value::Null
    );
    assert_eq!(
        person.invoke_method(9, &ada, Vec::new()),
        Err(EvalError::UnknownMethodIndex(9))
    );
}

#[test]
fn person_wrong_argument_type() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    let greet = person.method_index("greet").unwrap();

    let err = person
        .invoke_method(greet, &ada, vec![Value::Int(1), Value::Int(2)])
        .unwrap_err();
    assert!(matches!(err, EvalError::ClassCast { .. }), "{err}");
}

#[test]
fn person_builder() {
    let fixture = person_fixture();
    let person = fixture.introspection();

    let built = person
        .builder()
        .with("age", Value::Int(41))
        .with("name", "Grace")
        .build()
        .unwrap();
    assert_eq!(built.field("name"), Some(Value::str("Grace")));
    assert_eq!(built.field("age"), Some(Value::Int(41)));

    let defaulted = person.builder().with("age", Value::Int(3)).build().unwrap();
    assert_eq!(defaulted.field("name"), Some(Value::Null));

    assert_eq!(
        person.builder().with("shoeSize", Value::Int(9)).build(),
        Err(EvalError::UnknownProperty("shoeSize".to_owned()))
    );
}

#[test]
fn builder_requires_support() {
    let mut marker = TypeElement::new("demo.Marker");
    marker.default_constructor = Some(common::constructor("demo.Marker", &[]));
    let fixture = Fixture::new(marker);
    let introspection = fixture.introspection();

    assert!(introspection.is_buildable());
    assert!(!introspection.has_builder_support());
    assert!(matches!(
        introspection.builder().build(),
        Err(EvalError::BuilderNotSupported(_))
    ));
}

#[test]
fn abstract_bean_is_not_buildable() {
    let mut shape = TypeElement::new("geo.Shape");
    shape.is_abstract = true;
    shape.default_constructor = Some(common::constructor("geo.Shape", &[]));
    let fixture = Fixture::new(shape);
    let introspection = fixture.introspection();

    assert!(!introspection.is_buildable());
    assert_eq!(
        introspection.instantiate().unwrap_err().kind(),
        Some(ErrorKind::UnsupportedInstantiation)
    );
}

// ── Round trips and completeness ────────────────────────────────────

#[test]
fn round_trip_clone() {
    let point_fixture = Fixture::new(point());
    let point = point_fixture.introspection();
    let p = point
        .instantiate_with_args(vec![Value::Int(3), Value::Int(4)])
        .unwrap();
    for index in 0..point.properties().len() {
        let current = point.get(index, &p).unwrap();
        let copy = point.with_property(index, &p, current).unwrap();
        assert_eq!(copy, p);
    }

    let person_fixture = person_fixture();
    let person = person_fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    person.set(1, &ada, Value::Int(36)).unwrap();
    for name in ["name", "age", "nickname"] {
        let index = person.property_index(name).unwrap();
        let current = person.get(index, &ada).unwrap();
        let copy = person.with_property(index, &ada, current).unwrap();
        assert_eq!(copy, ada, "round trip through {name}");
    }
}

#[test]
fn dispatch_completeness() {
    let fixture = person_fixture();
    let person = fixture.introspection();
    let ada = person.instantiate_with_args(vec![Value::str("Ada")]).unwrap();
    let count = i64::from(fixture.generated.artifact.dispatch_count);

    for index in 0..count {
        let result = person.dispatch_raw(index, ada.clone(), vec![Value::str("v"), Value::Int(1)]);
        if let Err(err) = result {
            assert_ne!(err.kind(), Some(ErrorKind::IndexOutOfRange), "index {index}");
        }
    }
    for index in [-1, count, count + 10] {
        let err = person
            .dispatch_raw(index, ada.clone(), Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::raised(
                ErrorKind::IndexOutOfRange,
                format!("Unknown dispatch index: {index}")
            )
        );
        let err = person
            .dispatch_one_raw(index, ada.clone(), Value::Null)
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::IndexOutOfRange));
    }
}

// ── Annotation indexes ──────────────────────────────────────────────

#[test]
fn annotation_index_lookups() {
    let config = GeneratorConfig::default().index_annotation("Tag", Some("value"));
    let fixture = Fixture::with_config(tagged(), &config);
    let tagged = fixture.introspection();

    assert_eq!(tagged.find_property_by_annotation("Tag", Some("x")).unwrap(), Some(0));
    assert_eq!(tagged.find_property_by_annotation("Tag", Some("y")).unwrap(), Some(1));
    assert_eq!(tagged.find_property_by_annotation("Tag", Some("z")).unwrap(), None);
    assert_eq!(tagged.find_property_by_annotation("Other", None).unwrap(), None);
    assert_eq!(
        tagged.properties_indexed_by_annotation("Tag").unwrap(),
        vec![0, 1]
    );
    assert_eq!(
        tagged.properties_indexed_by_annotation("Other").unwrap(),
        Vec::<usize>::new()
    );
}

#[test]
fn field_backed_properties() {
    let fixture = Fixture::new(tagged());
    let tagged = fixture.introspection();
    let t = tagged.instantiate().unwrap();

    tagged.set(2, &t, Value::str("c")).unwrap();
    assert_eq!(tagged.get(2, &t).unwrap(), Value::str("c"));
    assert_eq!(
        tagged.get(7, &t),
        Err(EvalError::UnknownPropertyIndex(7))
    );
}
