//! Building whole metamodels from the adapters.

use std::fs;
use std::sync::Arc;

use metamodel_adapters::{InMemoryClassRegistry, ManifestClassLoader, builtin_classes};
use metamodel_core::prelude::*;
use tempfile::TempDir;

fn service(source: impl ClassSource + 'static) -> MetamodelService {
    let loader = SpecificationLoader::new(
        Arc::new(source),
        Arc::new(ProgrammingModel::default_model()),
        IntrospectionPolicy::default(),
    )
    .unwrap();
    MetamodelService::new(Arc::new(loader))
}

#[test]
fn builtin_domain_builds_without_errors() {
    let service = service(InMemoryClassRegistry::with_builtin().unwrap());
    let report = service.build(DeploymentMode::Production).unwrap();
    assert!(!report.has_errors(), "{:#?}", report.failures());
}

#[test]
fn builtin_customer_has_contributed_action() {
    let service = service(InMemoryClassRegistry::with_builtin().unwrap());
    let customer = service.loader().load_specification(builtin_classes::CUSTOMER).unwrap();

    let place_order = customer.action("placeOrder").unwrap();
    assert_eq!(place_order.mixed_in_from(), Some(builtin_classes::PLACE_ORDER_MIXIN));
    assert_eq!(place_order.parameters().len(), 2);
    assert_eq!(place_order.parameter(1).unwrap().name(), "Quantity");

    assert!(customer.property("name").is_some());
    assert!(customer.property("active").is_some());
    assert!(customer.collection("orders").is_some());
    assert!(customer.action("archive").is_some());
    assert!(customer.action("validateEmail").is_none());
}

#[test]
fn builtin_titles_and_icons() {
    let service = service(InMemoryClassRegistry::with_builtin().unwrap());
    let loader = service.loader();

    let customer = loader.load_specification(builtin_classes::CUSTOMER).unwrap();
    let ada = DomainObject::new(builtin_classes::CUSTOMER, "1").with_field("name", "Ada");
    assert_eq!(customer.title(&ada), "Ada");
    assert_eq!(customer.icon_name(&ada).as_deref(), Some("person"));

    let order = loader.load_specification(builtin_classes::ORDER).unwrap();
    let obj = DomainObject::new(builtin_classes::ORDER, "7").with_field("number", "A-7");
    assert_eq!(order.title(&obj), "Order A-7");
}

#[test]
fn order_parent_is_its_customer() {
    let service = service(InMemoryClassRegistry::with_builtin().unwrap());
    let ada = DomainObject::new(builtin_classes::CUSTOMER, "1");
    let order = DomainObject::new(builtin_classes::ORDER, "7").with_field("customer", ada);

    let chain = service.parent_chain(&order).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].class_name(), builtin_classes::CUSTOMER);
}

#[test]
fn manifest_domain_matches_registered_domain() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("invoice.toml"),
        r#"
            [[class]]
            name = "billing.Invoice"

            [[class.field]]
            name = "reference"
            type = "string"
            annotations = [{ name = "Title" }]

            [[class.method]]
            name = "getReference"
            type = "string"
            returns_field = "reference"

            [[class.method]]
            name = "pay"
            annotations = [{ name = "Action", attributes = { semantics = "idempotent" } }]
        "#,
    )
    .unwrap();

    let from_files = service(ManifestClassLoader::open(temp.path()).unwrap());
    let registry = InMemoryClassRegistry::new();
    for class in ManifestClassLoader::new(temp.path()).load_all().unwrap() {
        registry.register(class).unwrap();
    }
    let from_registry = service(registry);

    let a = from_files.loader().load_specification("billing.Invoice").unwrap();
    let b = from_registry.loader().load_specification("billing.Invoice").unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(a.action("pay").is_some());
    assert!(from_files.build(DeploymentMode::Production).is_ok());
}
