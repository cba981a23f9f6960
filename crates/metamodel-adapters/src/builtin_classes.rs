//! A small order-taking domain that ships with the CLI.
//!
//! It exercises most of the programming model: annotations and naming
//! conventions, support methods, a value type, a `@Parent` reference and a
//! mixin contributing an action to `Customer`. The domain builds without
//! validation errors.

use metamodel_core::domain::{
    Annotation, ClassDescriptor, ClassKind, FieldDescriptor, MethodDescriptor, TypeRef, Value,
    names,
};

pub const CUSTOMER: &str = "com.acme.Customer";
pub const ORDER: &str = "com.acme.Order";
pub const ADDRESS: &str = "com.acme.Address";
pub const PLACE_ORDER_MIXIN: &str = "com.acme.Customer_placeOrder";

/// Every built-in class.
pub fn all_classes() -> Vec<ClassDescriptor> {
    vec![address(), customer(), order(), place_order()]
}

pub fn address() -> ClassDescriptor {
    ClassDescriptor::new(ADDRESS)
        .kind(ClassKind::Value)
        .field(FieldDescriptor::new("street", TypeRef::Text))
        .field(FieldDescriptor::new("city", TypeRef::Text).annotate(Annotation::new(names::TITLE)))
        .method(MethodDescriptor::getter("getStreet", TypeRef::Text, "street"))
        .method(MethodDescriptor::getter("getCity", TypeRef::Text, "city"))
}

pub fn customer() -> ClassDescriptor {
    ClassDescriptor::new(CUSTOMER)
        .annotate(
            Annotation::new(names::DOMAIN_OBJECT_LAYOUT)
                .with("describedAs", "Someone who buys from us")
                .with("cssClass", "customer"),
        )
        .field(FieldDescriptor::new("name", TypeRef::Text).annotate(Annotation::new(names::TITLE)))
        .field(FieldDescriptor::new("email", TypeRef::Text))
        .method(
            MethodDescriptor::getter("getName", TypeRef::Text, "name").annotate(
                Annotation::new(names::PROPERTY)
                    .with("maxLength", 40)
                    .with("optionality", "mandatory"),
            ),
        )
        .method(MethodDescriptor::new("setName", TypeRef::Void).param(TypeRef::Text))
        .method(
            MethodDescriptor::getter("getEmail", TypeRef::Text, "email")
                .annotate(Annotation::new(names::MEMBER_ORDER).with("sequence", "2")),
        )
        .method(MethodDescriptor::new("setEmail", TypeRef::Void).param(TypeRef::Text))
        .method(
            MethodDescriptor::new("validateEmail", TypeRef::Text)
                .param(TypeRef::Text)
                .body(|_, args| {
                    let valid = args
                        .first()
                        .and_then(Value::as_text)
                        .is_some_and(|email| email.contains('@'));
                    Ok(if valid {
                        Value::Null
                    } else {
                        Value::from("Not an email address")
                    })
                }),
        )
        .method(MethodDescriptor::getter("getAddress", TypeRef::class(ADDRESS), "address"))
        .method(MethodDescriptor::getter(
            "getOrders",
            TypeRef::list_of(TypeRef::class(ORDER)),
            "orders",
        ))
        .method(MethodDescriptor::getter("isActive", TypeRef::Boolean, "active"))
        .method(
            MethodDescriptor::new("archive", TypeRef::Void)
                .annotate(Annotation::new(names::ACTION).with("semantics", "idempotent")),
        )
        .method(MethodDescriptor::new("hideArchive", TypeRef::Boolean).body(|obj, _| {
            let active = obj.field("active").and_then(Value::as_bool).unwrap_or(false);
            Ok(Value::from(!active))
        }))
        .method(MethodDescriptor::new("iconName", TypeRef::Text).returns("person"))
}

pub fn order() -> ClassDescriptor {
    ClassDescriptor::new(ORDER)
        .field(FieldDescriptor::new("number", TypeRef::Text))
        .method(
            MethodDescriptor::getter("getNumber", TypeRef::Text, "number")
                .annotate(Annotation::new(names::TITLE).with("prepend", "Order ")),
        )
        .method(
            MethodDescriptor::getter("getCustomer", TypeRef::class(CUSTOMER), "customer")
                .annotate(Annotation::new(names::PARENT)),
        )
        .method(MethodDescriptor::getter("getTotal", TypeRef::Decimal, "total"))
        .method(
            MethodDescriptor::new("cancel", TypeRef::Void)
                .named_param("reason", TypeRef::Text)
                .annotate(Annotation::new(names::ACTION).with("semantics", "idempotent")),
        )
        .method(MethodDescriptor::new("default0Cancel", TypeRef::Text).returns("Changed my mind"))
        .method(MethodDescriptor::new("disableCancel", TypeRef::Text).returns_field("shippedNote"))
}

/// Contributes `placeOrder(product, quantity)` to `Customer`.
pub fn place_order() -> ClassDescriptor {
    ClassDescriptor::new(PLACE_ORDER_MIXIN)
        .mixin_for(CUSTOMER)
        .method(
            MethodDescriptor::new("act", TypeRef::class(ORDER))
                .named_param("product", TypeRef::Text)
                .named_param("quantity", TypeRef::Int),
        )
        .method(MethodDescriptor::new("default1Act", TypeRef::Int).returns(1_i64))
        .method(
            MethodDescriptor::new("choices0Act", TypeRef::list_of(TypeRef::Text)).returns(Value::List(vec![
                Value::from("Widget"),
                Value::from("Gadget"),
            ])),
        )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn every_class_is_well_formed() {
        for class in all_classes() {
            class.validate().unwrap_or_else(|e| panic!("{}: {e}", class.name));
        }
    }

    #[test]
    fn class_names_are_unique() {
        let names: BTreeSet<_> = all_classes().into_iter().map(|c| c.name).collect();
        assert_eq!(names.len(), all_classes().len());
    }

    #[test]
    fn mixin_contributes_place_order() {
        let mixin = place_order();
        assert_eq!(mixin.mixee(), Some(CUSTOMER));
        assert_eq!(mixin.mixin_member_name(), Some("placeOrder"));
    }
}
