use pretty_assertions::assert_eq;

use ix_ir::{
    pretty_artifact, ConstructorKey, Expr, MethodKind, MutationStrategy, Stmt, Switch,
    TypeElement, TypeHierarchy, TypeName, TypeRef,
};

use crate::test_helpers::{
    config, constructor, generate_ok, generate_with, person, point, read_only_accessor, tag,
    tagged,
};
use crate::{GenError, GenWarning, GeneratorConfig};

use super::{artifact_name, EmitterState, IntrospectionEmitter};

fn dispatch_switch(artifact: &ix_ir::Artifact, kind: MethodKind) -> &Switch {
    match artifact.method(kind).map(|m| m.body.as_slice()) {
        Some([Stmt::Switch(switch)]) => switch,
        other => panic!("expected a switch in {}, got {other:?}", kind.name()),
    }
}

const POINT_GOLDEN: &str = r#"introspection geo.$Point$Introspection for geo.Point (targets: 4, buildable: true, builder: true)
  property[0] x: int read=0 write=- wither=2 mutation=constructor
  property[1] y: int read=1 write=- wither=3 mutation=constructor
  constructor(x: int, y: int)
  fn dispatchOne(index, bean, value) {
    switch index {
      0 => L0
      1 => L1
      2 => L2
      3 => L2
      L0:
        return (geo.Point) bean.geo.Point::x()
      L1:
        return (geo.Point) bean.geo.Point::y()
      L2:
        return new geo.Point<init>(int, int)((index == 2 ? (int) value : (geo.Point) bean.geo.Point::x()): int, (index == 3 ? (int) value : (geo.Point) bean.geo.Point::y()): int)
      default:
        raise IndexOutOfRange("Unknown dispatch index: " + index)
    }
  }
  fn dispatch(index, bean, args) {
    switch index {
      0 => L0
      1 => L1
      2 => L2
      3 => L2
      L0:
        return (geo.Point) bean.geo.Point::x()
      L1:
        return (geo.Point) bean.geo.Point::y()
      L2:
        return new geo.Point<init>(int, int)((index == 2 ? (int) args[0] : (geo.Point) bean.geo.Point::x()): int, (index == 3 ? (int) args[0] : (geo.Point) bean.geo.Point::y()): int)
      default:
        raise IndexOutOfRange("Unknown dispatch index: " + index)
    }
  }
  fn instantiate() {
    raise UnsupportedInstantiation("No default constructor exists for type: geo.Point")
  }
  fn instantiateWithArgs(args) {
    return new geo.Point<init>(int, int)((int) args[0], (int) args[1])
  }
  fn findIndexedProperty(annotation, value) {
    switch annotation {
      default:
    }
    return -1
  }
  fn getIndexedProperties(annotation) {
    switch annotation {
      default:
    }
    return int[0]
  }
"#;

#[test]
fn point_golden() {
    let generated = generate_ok(&point());
    assert_eq!(pretty_artifact(&generated.artifact), POINT_GOLDEN);
}

#[test]
fn generation_is_deterministic() {
    for bean in [point(), person(), config(), tagged()] {
        let first = pretty_artifact(&generate_ok(&bean).artifact);
        let second = pretty_artifact(&generate_ok(&bean).artifact);
        assert_eq!(first, second, "{}", bean.name);
    }
}

#[test]
fn copy_constructor_is_called_once_per_entry_point() {
    let artifact = generate_ok(&point()).artifact;
    let key = ConstructorKey(vec![TypeName::new("int"), TypeName::new("int")]);

    assert_eq!(artifact.constructor_call_sites(MethodKind::DispatchOne, &key), 1);
    assert_eq!(artifact.constructor_call_sites(MethodKind::Dispatch, &key), 1);

    let switch = dispatch_switch(&artifact, MethodKind::Dispatch);
    assert_eq!(switch.label_for(ix_ir::DispatchIndex::new(2)), switch.label_for(ix_ir::DispatchIndex::new(3)));
}

#[test]
fn person_registers_properties_then_methods() {
    let generated = generate_ok(&person());
    let artifact = &generated.artifact;

    assert!(generated.warnings.is_empty());
    assert_eq!(artifact.dispatch_count, 11);

    let methods: Vec<(&str, u32)> = artifact
        .data
        .methods
        .iter()
        .map(|m| (m.name.as_str(), m.dispatch.raw()))
        .collect();
    assert_eq!(methods, vec![("withNickname", 6), ("greet", 7), ("touch", 8)]);

    let fast: Vec<u32> = dispatch_switch(artifact, MethodKind::DispatchOne)
        .keys
        .iter()
        .map(|(k, _)| k.raw())
        .collect();
    assert_eq!(fast, vec![0, 1, 2, 3, 4, 5, 6, 8, 9, 10]);

    let mutations: Vec<MutationStrategy> =
        artifact.data.properties.iter().map(|p| p.mutation).collect();
    assert_eq!(
        mutations,
        vec![
            MutationStrategy::ConstructorArgument,
            MutationStrategy::Setter,
            MutationStrategy::WitherMethod,
            MutationStrategy::Unsupported,
        ]
    );
    let withers: Vec<Option<u32>> = artifact
        .data
        .properties
        .iter()
        .map(|p| p.wither.map(|i| i.raw()))
        .collect();
    assert_eq!(withers, vec![Some(9), None, Some(4), Some(10)]);
}

#[test]
fn capability_flags() {
    let point = generate_ok(&point()).artifact;
    assert!(point.flags.buildable);
    assert!(point.flags.builder_support);
    assert!(point.method(MethodKind::InstantiateWithArgs).is_some());

    let config = generate_ok(&config()).artifact;
    assert!(config.flags.buildable);
    assert!(config.flags.builder_support);
    assert!(config.method(MethodKind::InstantiateWithArgs).is_none());
    assert!(config.data.constructor_arguments.is_empty());
    assert!(matches!(
        config.method(MethodKind::Instantiate).unwrap().body.as_slice(),
        [Stmt::Return(Expr::New { .. })]
    ));

    let mut readonly = TypeElement::new("demo.Constant");
    readonly.properties = vec![read_only_accessor("demo.Constant", "value", TypeRef::int())];
    readonly.default_constructor = Some(constructor("demo.Constant", &[]));
    let readonly = generate_ok(&readonly).artifact;
    assert!(readonly.flags.buildable);
    assert!(!readonly.flags.builder_support);

    let mut abstract_point = point_bean_abstract();
    abstract_point.default_constructor = Some(constructor("geo.Point", &[]));
    let abstract_point = generate_ok(&abstract_point).artifact;
    assert!(!abstract_point.flags.buildable);
    assert!(!abstract_point.flags.builder_support);
    assert!(matches!(
        abstract_point.method(MethodKind::Instantiate).unwrap().body.as_slice(),
        [Stmt::Raise { .. }]
    ));
}

fn point_bean_abstract() -> TypeElement {
    let mut bean = point();
    bean.is_abstract = true;
    bean
}

#[test]
fn emission_is_one_shot() {
    let bean = config();
    let hierarchy = TypeHierarchy::from_classes([&bean]);
    let settings = GeneratorConfig::default();
    let mut emitter = IntrospectionEmitter::new(&bean, &hierarchy, &settings);
    emitter.register_properties().unwrap();
    assert_eq!(emitter.state(), EmitterState::Pending);

    assert!(emitter.emit().unwrap().is_some());
    assert_eq!(emitter.state(), EmitterState::Emitted);
    assert_eq!(emitter.emit(), Ok(None));
    assert_eq!(
        emitter.register_property(&bean.properties[0]),
        Err(GenError::AlreadyEmitted {
            bean: TypeName::new("app.Config")
        })
    );
    assert_eq!(
        emitter.index_property("Tag", "name", None),
        Err(GenError::AlreadyEmitted {
            bean: TypeName::new("app.Config")
        })
    );
}

#[test]
fn failed_emission_is_not_reported_as_emitted() {
    let bean = config();
    let hierarchy = TypeHierarchy::from_classes([&bean]);
    let settings = GeneratorConfig::default();
    let mut emitter = IntrospectionEmitter::new(&bean, &hierarchy, &settings);
    emitter.register_properties().unwrap();
    emitter.index_property("Tag", "missing", None).unwrap();

    assert!(matches!(
        emitter.emit(),
        Err(GenError::MissingIndexedProperty { ref property, .. }) if property == "missing"
    ));
    assert_eq!(emitter.state(), EmitterState::Failed);

    let failed = GenError::EmissionFailed {
        bean: TypeName::new("app.Config"),
    };
    assert_eq!(emitter.emit(), Err(failed.clone()));
    assert_eq!(emitter.state(), EmitterState::Failed);
    assert_eq!(emitter.register_property(&bean.properties[0]), Err(failed));
}

#[test]
fn excluded_and_hidden_methods_are_not_exposed() {
    let generated = generate_with(&person(), &GeneratorConfig::default().exclude_method("greet"));
    let names: Vec<&str> = generated
        .artifact
        .data
        .methods
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["withNickname", "touch"]);
}

#[test]
fn equal_annotation_payloads_are_stored_once() {
    let mut bean = tagged();
    bean.annotations = tag("x");
    let artifact = generate_ok(&bean).artifact;

    assert_eq!(artifact.data.annotations.len(), 2);
    assert_eq!(artifact.data.bean_annotation, artifact.data.properties[0].annotation);
    assert_ne!(
        artifact.data.properties[0].annotation,
        artifact.data.properties[1].annotation
    );
    assert_eq!(artifact.data.properties[2].annotation, None);
}

#[test]
fn configured_indexes_are_emitted() {
    let settings = GeneratorConfig::default().index_annotation("Tag", Some("value"));
    let artifact = generate_with(&tagged(), &settings).artifact;
    assert_eq!(artifact.data.int_arrays, vec![vec![0, 1]]);
}

#[test]
fn explicit_index_on_missing_property_fails() {
    let bean = tagged();
    let hierarchy = TypeHierarchy::from_classes([&bean]);
    let settings = GeneratorConfig::default();
    let mut emitter = IntrospectionEmitter::new(&bean, &hierarchy, &settings);
    emitter.register_properties().unwrap();
    emitter.index_property("Tag", "nope", Some("x")).unwrap();

    assert!(matches!(
        emitter.emit(),
        Err(GenError::MissingIndexedProperty { .. })
    ));
}

#[test]
fn mapping_warnings_reach_the_caller() {
    let mut bean = TypeElement::new("geo.Pair");
    bean.properties = vec![read_only_accessor("geo.Pair", "x", TypeRef::int())];
    bean.primary_constructor = Some(constructor(
        "geo.Pair",
        &[("x", TypeRef::int()), ("secret", TypeRef::int())],
    ));
    let generated = generate_ok(&bean);

    assert!(matches!(
        generated.warnings.as_slice(),
        [GenWarning::InvalidConstructorMapping { parameter, .. }] if parameter == "secret"
    ));
    assert_eq!(
        generated.artifact.data.properties[0].mutation,
        MutationStrategy::Unsupported
    );
}

#[test]
fn artifact_names() {
    assert_eq!(
        artifact_name(&TypeName::new("geo.Point")),
        TypeName::new("geo.$Point$Introspection")
    );
    assert_eq!(
        artifact_name(&TypeName::new("Point")),
        TypeName::new("$Point$Introspection")
    );
}
