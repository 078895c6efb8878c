//! Shared bean fixtures for generator tests.
//!
//! Only compiled in test builds.

use ix_ir::{
    Annotation, AnnotationData, AnnotationValue, ConstructorElement, FieldElement, MemberRef,
    MethodElement, ParamElement, PropertyElement, TypeElement, TypeHierarchy, TypeName, TypeRef,
};

use crate::{generate, GeneratedArtifact, GeneratorConfig};

pub(crate) fn getter(owner: &str, name: &str, ty: TypeRef) -> MethodElement {
    MethodElement::new(TypeName::new(owner), name, Vec::new(), Some(ty))
}

pub(crate) fn setter(owner: &str, name: &str, ty: TypeRef) -> MethodElement {
    MethodElement::new(
        TypeName::new(owner),
        name,
        vec![ParamElement::new("value", ty)],
        None,
    )
}

/// Property read through `name()` with no writer.
pub(crate) fn read_only_accessor(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let mut property = PropertyElement::new(name, ty.clone());
    property.read = Some(MemberRef::Method(getter(owner, name, ty)));
    property
}

/// Property with `getName()`/`setName(..)` accessors.
pub(crate) fn bean_property(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let capitalized = ix_ir::model::capitalize(name);
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
pub(crate) fn field_property(owner: &str, name: &str, ty: TypeRef) -> PropertyElement {
    let field = FieldElement::new(TypeName::new(owner), name, ty.clone());
    let mut property = PropertyElement::new(name, ty);
    property.read = Some(MemberRef::Field(field.clone()));
    property.write = Some(MemberRef::Field(field));
    property
}

pub(crate) fn constructor(owner: &str, params: &[(&str, TypeRef)]) -> ConstructorElement {
    ConstructorElement::new(
        TypeName::new(owner),
        params
            .iter()
            .map(|(name, ty)| ParamElement::new(*name, ty.clone()))
            .collect(),
    )
}

/// `geo.Point(int x, int y)`: immutable, read through `x()` and `y()`.
pub(crate) fn point() -> TypeElement {
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
pub(crate) fn config() -> TypeElement {
    let mut bean = TypeElement::new("app.Config");
    bean.properties = vec![bean_property("app.Config", "name", TypeRef::string())];
    bean.default_constructor = Some(constructor("app.Config", &[]));
    bean
}

/// `demo.Tagged { a: @Tag("x"), b: @Tag("y"), c }`, all mutable fields.
pub(crate) fn tagged() -> TypeElement {
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

pub(crate) fn tag(value: &str) -> AnnotationData {
    AnnotationData::new(vec![Annotation::with_value(
        "Tag",
        AnnotationValue::Str(value.to_owned()),
    )])
}

/// `crm.Person(String name)` exercising every mutation strategy:
///
/// - `name`: constructor argument;
/// - `age`: setter;
/// - `nickname`: explicit `withNickname` wither;
/// - `id`: read-only, not a constructor argument.
///
/// Also declares a two-argument `greet`, a void `touch`, a private helper
/// and a static factory.
pub(crate) fn person() -> TypeElement {
    let owner = "crm.Person";
    let mut bean = TypeElement::new(owner);
    bean.properties = vec![
        read_only_accessor(owner, "name", TypeRef::string()),
        bean_property(owner, "age", TypeRef::int()),
        read_only_accessor(owner, "nickname", TypeRef::string()),
        read_only_accessor(owner, "id", TypeRef::named("long")),
    ];
    bean.primary_constructor = Some(constructor(owner, &[("name", TypeRef::string())]));

    let mut private_helper = getter(owner, "secret", TypeRef::string());
    private_helper.visibility = ix_ir::Visibility::Private;
    let mut factory = getter(owner, "anonymous", bean.as_type_ref());
    factory.is_static = true;

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
        private_helper,
        factory,
    ];
    bean
}

/// Generate `bean` with the default configuration, panicking on failure.
pub(crate) fn generate_ok(bean: &TypeElement) -> GeneratedArtifact {
    generate_with(bean, &GeneratorConfig::default())
}

pub(crate) fn generate_with(bean: &TypeElement, config: &GeneratorConfig) -> GeneratedArtifact {
    let hierarchy = TypeHierarchy::from_classes([bean]);
    generate(bean, &hierarchy, config).unwrap_or_else(|e| panic!("generation failed: {e}"))
}
