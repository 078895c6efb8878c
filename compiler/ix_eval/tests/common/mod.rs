//! Bean fixtures and harness shared by the runtime integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use ix_eval::{ConventionHost, Introspection};
use ix_gen::{generate, GeneratedArtifact, GeneratorConfig};
use ix_ir::model::capitalize;
use ix_ir::{
    Annotation, AnnotationData, AnnotationValue, ConstructorElement, FieldElement, MemberRef,
    MethodElement, ParamElement, PropertyElement, TypeElement, TypeHierarchy, TypeName, TypeRef,
    Visibility,
};

// ── Member helpers ──────────────────────────────────────────────────

pub fn getter(owner: &str, name: &str, ty: TypeRef) -> MethodElement {
    MethodElement::new(TypeName::new(owner), name, Vec::new(), Some(ty))
}

pub fn setter(owner: &str, name: &str, ty: TypeRef) -> MethodElement {
    MethodElement::new(
        TypeName::new(owner),
        name,
        vec![ParamElement::new("value", ty)],
        None,
    )
}

/// Property read through `name()` with no writer.
pub fn read_only_accessor(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let mut property = PropertyElement::new(name, ty.clone());
    property.read = Some(MemberRef::Method(getter(owner, name, ty)));
    property
}

/// Property with `getName()`/`setName(..)` accessors.
pub fn bean_property(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let capitalized = capitalize(name);
    let mut property = PropertyElement::new(name, ty.clone());
    property.read = Some(MemberRef::Method(getter(
        owner,
        &format!("get{capitalized}"),
        ty.clone(),
    )));
    property.write = Some(MemberRef::Method(setter(
        owner,
        &format!("set{capitalized}"),
        ty,
    )));
    property
}

/// Property backed by a public mutable field.
pub fn field_property(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let field = FieldElement::new(TypeName::new(owner), name, ty.clone());
    let mut property = PropertyElement::new(name, ty);
    property.read = Some(MemberRef::Field(field.clone()));
    property.write = Some(MemberRef::Field(field));
    property
}

pub fn constructor(owner: &str, params: &[(&str, TypeRef)]) -> ConstructorElement {
    ConstructorElement::new(
        TypeName::new(owner),
        params
            .iter()
            .map(|(name, ty)| ParamElement::new(*name, ty.clone()))
            .collect(),
    )
}

pub fn tag(value: &str) -> AnnotationData {
    AnnotationData::new(vec![Annotation::with_value(
        "Tag",
        AnnotationValue::Str(value.to_owned()),
    )])
}

// ── Beans ───────────────────────────────────────────────────────────

/// `geo.Point(int x, int y)`, read through `x()` and `y()`.
pub fn point() -> TypeElement {
    let mut bean = TypeElement::new("geo.Point");
    bean.properties = vec![
        read_only_accessor("geo.Point", "x", TypeRef::int()),
        read_only_accessor("geo.Point", "y", TypeRef::int()),
    ];
    bean.primary_constructor = Some(constructor(
        "geo.Point",
        &[("x", TypeRef::int()), ("y", TypeRef::int())],
    ));
    bean
}

/// `app.Config` with a default constructor and a `name` bean property.
pub fn config() -> TypeElement {
    let mut bean = TypeElement::new("app.Config");
    bean.properties = vec![bean_property("app.Config", "name", TypeRef::string())];
    bean.default_constructor = Some(constructor("app.Config", &[]));
    bean
}

/// `demo.Tagged { a: @Tag("x"), b: @Tag("y"), c }`.
pub fn tagged() -> TypeElement {
    let owner = "demo.Tagged";
    let mut a = field_property(owner, "a", TypeRef::string());
    a.annotations = tag("x");
    let mut b = field_property(owner, "b", TypeRef::string());
    b.annotations = tag("y");
    let c = field_property(owner, "c", TypeRef::string());

    let mut bean = TypeElement::new(owner);
    bean.properties = vec![a, b, c];
    bean.default_constructor = Some(constructor(owner, &[]));
    bean
}

/// `crm.Person(String name)`: `name` is a constructor argument, `age` a
/// setter, `nickname` has `withNickname`, `id` cannot be mutated.
pub fn person() -> TypeElement {
    let owner = "crm.Person";
    let mut bean = TypeElement::new(owner);
    bean.properties = vec![
        read_only_accessor(owner, "name", TypeRef::string()),
        bean_property(owner, "age", TypeRef::int()),
        read_only_accessor(owner, "nickname", TypeRef::string()),
        read_only_accessor(owner, "id", TypeRef::named("long")),
    ];
    bean.primary_constructor = Some(constructor(owner, &[("name", TypeRef::string())]));

    let mut secret = getter(owner, "secret", TypeRef::string());
    secret.visibility = Visibility::Private;
    bean.methods = vec![
        MethodElement::new(
            TypeName::new(owner),
            "withNickname",
            vec![ParamElement::new("nickname", TypeRef::string())],
            Some(bean.as_type_ref()),
        ),
        MethodElement::new(
            TypeName::new(owner),
            "greet",
            vec![
                ParamElement::new("greeting", TypeRef::string()),
                ParamElement::new("times", TypeRef::int()),
            ],
            Some(TypeRef::string()),
        ),
        MethodElement::new(TypeName::new(owner), "touch", Vec::new(), None),
        secret,
    ];
    bean
}

// ── Harness ─────────────────────────────────────────────────────────

/// A generated bean together with everything needed to run it.
pub struct Fixture {
    pub bean: TypeElement,
    pub hierarchy: TypeHierarchy,
    pub generated: GeneratedArtifact,
    pub host: ConventionHost,
}

impl Fixture {
    pub fn new(bean: TypeElement) -> Self {
        Self::with_config(bean, &GeneratorConfig::default())
    }

    pub fn with_config(bean: TypeElement, config: &GeneratorConfig) -> Self {
        let hierarchy = TypeHierarchy::from_classes([&bean]);
        let generated = generate(&bean, &hierarchy, config)
            .unwrap_or_else(|e| panic!("generation of {} failed: {e}", bean.name));
        let host = ConventionHost::from_classes([&bean], &config.wither_prefix);
        Self {
            bean,
            hierarchy,
            generated,
            host,
        }
    }

    pub fn introspection(&self) -> Introspection<'_> {
        Introspection::new(&self.generated.artifact, &self.host, &self.hierarchy)
    }
}
