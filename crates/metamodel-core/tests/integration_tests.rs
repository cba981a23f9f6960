//! Integration tests for metamodel-core, driven through the public API only.

use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;

use metamodel_core::application::ApplicationError;
use metamodel_core::application::programming_model::{
    FactoryResult, MethodPool, ProcessClassContext, ProcessingPhase,
};
use metamodel_core::domain::facet::{DescribedAsFacet, NamedFacet, PluralFacet};
use metamodel_core::domain::{
    Annotation, FacetOrigin, FieldDescriptor, ROOT_CLASS_NAME, names,
};
use metamodel_core::prelude::*;
use mockall::mock;

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// A fixed set of classes.
#[derive(Default)]
struct Catalog {
    classes: BTreeMap<String, ClassDescriptor>,
}

impl Catalog {
    fn with(mut self, class: ClassDescriptor) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }
}

impl ClassSource for Catalog {
    fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>> {
        Ok(self.classes.get(name).cloned())
    }

    fn class_names(&self) -> MetamodelResult<Vec<String>> {
        Ok(self.classes.keys().cloned().collect())
    }
}

mock! {
    pub Source {}

    impl ClassSource for Source {
        fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>>;
        fn class_names(&self) -> MetamodelResult<Vec<String>>;
        fn mixins_for(&self, mixee: &str) -> MetamodelResult<Vec<String>>;
    }
}

fn shop() -> Catalog {
    Catalog::default()
        .with(
            ClassDescriptor::new("shop.Customer")
                .field(FieldDescriptor::new("name", TypeRef::Text))
                .method(MethodDescriptor::getter("getName", TypeRef::Text, "name"))
                .method(MethodDescriptor::new("setName", TypeRef::Void).param(TypeRef::Text))
                .method(MethodDescriptor::getter(
                    "getOrders",
                    TypeRef::list_of(TypeRef::class("shop.Order")),
                    "orders",
                ))
                .method(
                    MethodDescriptor::new("placeOrder", TypeRef::class("shop.Order"))
                        .named_param("quantity", TypeRef::Int),
                )
                .method(MethodDescriptor::new("title", TypeRef::Text).returns_field("name")),
        )
        .with(
            ClassDescriptor::new("shop.Order")
                .method(MethodDescriptor::getter("getCustomer", TypeRef::class("shop.Customer"), "customer"))
                .method(MethodDescriptor::new("cancel", TypeRef::Void)),
        )
}

fn loader_with(source: impl ClassSource + 'static, model: ProgrammingModel) -> SpecificationLoader {
    SpecificationLoader::new(Arc::new(source), Arc::new(model), IntrospectionPolicy::default())
        .expect("default policy is valid")
}

fn loader(source: impl ClassSource + 'static) -> SpecificationLoader {
    loader_with(source, ProgrammingModel::default_model())
}

// ── Determinism ──────────────────────────────────────────────────────────────

#[test]
fn introspection_is_deterministic() {
    let first = loader(shop());
    let second = loader(shop());

    for class in ["shop.Customer", "shop.Order"] {
        let a = first.load_specification(class).unwrap();
        let b = second.load_specification(class).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint(), "{class} differs between builds");
    }
    assert_eq!(first.build_all().unwrap(), second.build_all().unwrap());
}

#[test]
fn reload_rebuilds_the_same_model() {
    let loader = loader(shop());
    let before = loader.load_specification("shop.Customer").unwrap().fingerprint();

    loader.invalidate_all().unwrap();
    assert_eq!(loader.state_of("shop.Customer"), IntrospectionState::Invalidated);

    let after = loader.load_specification("shop.Customer").unwrap().fingerprint();
    assert_eq!(before, after);
}

// ── Factory ordering ─────────────────────────────────────────────────────────

struct DescribeByKind;

impl FacetFactory for DescribeByKind {
    fn name(&self) -> &'static str {
        "describe-by-kind"
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let text = format!("A {} class", ctx.class.kind.as_str());
        ctx.add_facet(Facet::new(
            DescribedAsFacet::new(text),
            Precedence::High,
            FacetOrigin::fallback(self.name()),
        ));
        Ok(())
    }
}

struct PluralOfEverything;

impl FacetFactory for PluralOfEverything {
    fn name(&self) -> &'static str {
        "plural-of-everything"
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        ctx.add_facet(Facet::new(
            PluralFacet::new("Lots"),
            Precedence::High,
            FacetOrigin::fallback(self.name()),
        ));
        Ok(())
    }
}

#[test]
fn disjoint_factories_commute() {
    let forward = ProgrammingModel::builder()
        .with_defaults()
        .add(DescribeByKind)
        .add(PluralOfEverything)
        .build()
        .unwrap();
    let backward = ProgrammingModel::builder()
        .with_defaults()
        .add(PluralOfEverything)
        .add(DescribeByKind)
        .build()
        .unwrap();

    let a = loader_with(shop(), forward).load_specification("shop.Customer").unwrap();
    let b = loader_with(shop(), backward).load_specification("shop.Customer").unwrap();

    assert_eq!(a.plural_name(), "Lots");
    assert_eq!(
        a.facet::<DescribedAsFacet>().map(|d| d.value.as_str()),
        Some("A entity class")
    );
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn duplicate_factory_names_are_rejected() {
    let err = ProgrammingModel::builder()
        .add(DescribeByKind)
        .add(DescribeByKind)
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        MetamodelError::Application(ApplicationError::DuplicateFactory { .. })
    ));
}

// ── Precedence ───────────────────────────────────────────────────────────────

#[test]
fn annotation_beats_convention_beats_fallback() {
    let named = Catalog::default().with(
        ClassDescriptor::new("ui.Widget")
            .method(
                MethodDescriptor::getter("getFoo", TypeRef::Text, "foo")
                    .annotate(Annotation::new(names::NAMED).with("value", "Annotated Foo")),
            )
            .method(MethodDescriptor::new("namedFoo", TypeRef::Text).returns("Conventional Foo"))
            .method(MethodDescriptor::getter("getBar", TypeRef::Text, "bar"))
            .method(MethodDescriptor::new("namedBar", TypeRef::Text).returns("Conventional Bar"))
            .method(MethodDescriptor::getter("getBaz", TypeRef::Text, "baz")),
    );
    let loader = loader(named);
    let spec = loader.load_specification("ui.Widget").unwrap();
    let obj = DomainObject::new("ui.Widget", "1");

    let foo = spec.property("foo").unwrap();
    assert_eq!(foo.name(Some(&obj)), "Annotated Foo");
    assert_eq!(foo.get_facet(FacetType::Named).unwrap().precedence(), Precedence::High);

    let bar = spec.property("bar").unwrap();
    assert_eq!(bar.name(Some(&obj)), "Conventional Bar");
    assert_eq!(bar.get_facet(FacetType::Named).unwrap().precedence(), Precedence::Default);

    let baz = spec.property("baz").unwrap();
    assert_eq!(baz.name(Some(&obj)), "Baz");
    assert_eq!(baz.get_facet(FacetType::Named).unwrap().precedence(), Precedence::Fallback);
}

#[test]
fn named_annotation_supersedes_named_method() {
    let loader = loader(Catalog::default().with(
        ClassDescriptor::new("ui.Widget")
            .method(
                MethodDescriptor::getter("getFoo", TypeRef::Text, "foo")
                    .annotate(Annotation::new(names::NAMED).with("value", "Shown")),
            )
            .method(MethodDescriptor::new("namedFoo", TypeRef::Text).returns("Hidden")),
    ));
    let spec = loader.load_specification("ui.Widget").unwrap();
    let foo = spec.property("foo").unwrap();

    assert_eq!(foo.get::<NamedFacet>().and_then(NamedFacet::literal), Some("Shown"));
    let superseded = foo.holder().superseded(FacetType::Named);
    assert!(
        superseded
            .iter()
            .any(|s| matches!(s.facet.payload::<NamedFacet>(), Some(NamedFacet::Method(_)))),
        "{superseded:?}"
    );
    // the convention method was consumed, not left behind as an orphan
    assert!(spec.action("namedFoo").is_none());
    assert!(loader.report().is_clean(), "{:?}", loader.report());
}

// ── Support methods ──────────────────────────────────────────────────────────

#[test]
fn throwing_icon_name_yields_no_icon() {
    let loader = loader(Catalog::default().with(
        ClassDescriptor::new("ui.Broken")
            .method(MethodDescriptor::new("iconName", TypeRef::Text).throws("no icon today")),
    ));
    let spec = loader.load_specification("ui.Broken").unwrap();

    assert_eq!(spec.icon_name(&DomainObject::new("ui.Broken", "1")), None);
    assert!(spec.action("iconName").is_none());
}

#[test]
fn orphaned_default_method_is_an_error() {
    let loader = loader(Catalog::default().with(
        ClassDescriptor::new("demo.Holder").method(MethodDescriptor::new("defaultAnInt", TypeRef::Int)),
    ));
    loader.load_specification("demo.Holder").unwrap();

    let report = loader.report();
    assert_eq!(report.error_count(), 1, "{report:?}");
    let failure = report.errors().next().unwrap();
    assert_eq!(failure.identifier, Identifier::class("demo.Holder"));
    assert!(failure.message.contains("defaultAnInt"));
}

#[test]
fn production_mode_aborts_on_errors() {
    let source = shop().with(
        ClassDescriptor::new("demo.Holder").method(MethodDescriptor::new("defaultAnInt", TypeRef::Int)),
    );
    let service = MetamodelService::new(Arc::new(loader(source)));

    let report = service.build(DeploymentMode::Prototype).unwrap();
    assert_eq!(report.error_count(), 1);

    let err = service.build(DeploymentMode::Production).unwrap_err();
    assert!(matches!(
        err,
        MetamodelError::Application(ApplicationError::ValidationAborted { errors: 1, .. })
    ));
}

// ── Methods & identifiers ────────────────────────────────────────────────────

#[test]
fn method_removal_is_monotonic() {
    let getter = MethodDescriptor::getter("getName", TypeRef::Text, "name");
    let action = MethodDescriptor::new("archive", TypeRef::Void);
    let mut pool = MethodPool::new(vec![getter.clone(), action.clone()]);

    assert!(pool.remove(&getter.signature()));
    assert!(!pool.is_available(&getter.signature()));
    assert!(pool.was_removed(&getter.signature()));

    // a second removal changes nothing
    assert!(!pool.remove(&getter.signature()));
    assert_eq!(pool.available_count(), 1);
    assert_eq!(pool.removed_count(), 1);
    assert!(pool.is_available(&action.signature()));
}

#[test]
fn identifiers_round_trip() {
    let action = Identifier::action("shop.Customer", "placeOrder", ["int", "shop.Product"]);
    let cases = [
        Identifier::class("shop.Customer"),
        Identifier::member("shop.Customer", "name"),
        action.clone(),
        action.parameter(1),
    ];
    for identifier in cases {
        let text = identifier.to_string();
        assert_eq!(Identifier::parse(&text).unwrap(), identifier, "{text}");
    }
    assert!(Identifier::parse("#nothing").is_err());
}

#[test]
fn action_identifiers_carry_parameter_types() {
    let loader = loader(shop());
    let spec = loader.load_specification("shop.Customer").unwrap();
    let action = spec.action("placeOrder").unwrap();

    assert_eq!(action.identifier().to_string(), "shop.Customer#placeOrder(int)");
    assert_eq!(action.parameter(0).unwrap().name(), "Quantity");
}

// ── Parent chain ─────────────────────────────────────────────────────────────

fn folders() -> Catalog {
    Catalog::default().with(
        ClassDescriptor::new("fs.Folder").method(
            MethodDescriptor::getter("getParent", TypeRef::class("fs.Folder"), "parent")
                .annotate(Annotation::new(names::PARENT)),
        ),
    )
}

#[test]
fn cyclic_parent_chain_terminates() {
    let service = MetamodelService::new(Arc::new(loader(folders())));

    // a -> b -> c -> a
    let a_again = DomainObject::new("fs.Folder", "a");
    let c = DomainObject::new("fs.Folder", "c").with_field("parent", a_again);
    let b = DomainObject::new("fs.Folder", "b").with_field("parent", c);
    let a = DomainObject::new("fs.Folder", "a").with_field("parent", b);

    let chain = service.parent_chain(&a).unwrap();
    let ids: Vec<_> = chain.iter().map(|o| o.id().to_string()).collect();
    assert_eq!(ids, ["b", "c"]);
}

#[test]
fn parentless_object_has_empty_chain() {
    let service = MetamodelService::new(Arc::new(loader(folders())));
    let root = DomainObject::new("fs.Folder", "root").with_field("parent", Value::Null);
    assert!(service.parent_chain(&root).unwrap().is_empty());
}

// ── Loader ───────────────────────────────────────────────────────────────────

#[test]
fn loader_caches_by_class_name() {
    let mut source = MockSource::new();
    source
        .expect_class()
        .withf(|name| name == "shop.Order")
        .times(1)
        .returning(|_| Ok(Some(ClassDescriptor::new("shop.Order"))));
    source
        .expect_class()
        .withf(|name| name == ROOT_CLASS_NAME)
        .returning(|_| Ok(None));
    source.expect_mixins_for().returning(|_| Ok(Vec::new()));

    let loader = loader(source);
    let first = loader.load_specification("shop.Order").unwrap();
    let second = loader.load_specification("shop.Order").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.state_of("shop.Order"), IntrospectionState::Introspected);
}

#[test]
fn concurrent_loads_finish_introspected() {
    let loader = Arc::new(loader(shop()));
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loader = Arc::clone(&loader);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                loader.load_specification("shop.Customer").unwrap()
            })
        })
        .collect();
    let specs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(specs.iter().all(|spec| Arc::ptr_eq(spec, &specs[0])));
    for name in loader.cached_specs().unwrap().keys() {
        assert_eq!(loader.state_of(name), IntrospectionState::Introspected, "{name}");
    }
}

#[test]
fn source_errors_propagate() {
    let mut source = MockSource::new();
    source.expect_class().returning(|_| {
        Err(ApplicationError::SourceUnavailable {
            reason: "disk on fire".into(),
        }
        .into())
    });

    let loader = loader(source);
    let err = loader.load_specification("shop.Order").unwrap_err();
    assert!(err.to_string().contains("disk on fire"));
}

#[test]
fn every_class_is_listed_after_build() {
    let service = MetamodelService::new(Arc::new(loader(shop())));
    service.build(DeploymentMode::Prototype).unwrap();

    let classes = service.list_classes().unwrap();
    let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["shop.Customer", "shop.Order"]);
    assert!(classes.iter().all(|c| c.state == "introspected"), "{classes:?}");
}
