//! Factories that strip methods which can never become members.

use tracing::debug;

use super::{ENHANCEMENT_ARTEFACTS, LIFECYCLE_CALLBACKS, METHOD_VISIBILITY, PROGRAMMATIC, ROOT_OBJECT_METHODS};
use crate::application::programming_model::{
    FacetFactory, FactoryResult, ProcessClassContext, ProcessingPhase,
};
use crate::domain::{FeatureType, MethodSignature, ROOT_CLASS_NAME, TypeRef, names};

fn log_removed(factory: &str, class: &str, removed: &[MethodSignature]) {
    if !removed.is_empty() {
        debug!(factory, class, count = removed.len(), "removed methods");
    }
}

/// Methods every class inherits from the root.
///
/// Overrides of `equals`, `hashCode` and `getClass` go too; an overridden
/// `toString()` is left for the title fallback.
pub struct RootObjectMethods;

impl FacetFactory for RootObjectMethods {
    fn name(&self) -> &'static str {
        ROOT_OBJECT_METHODS
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MethodRemoving
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let root = TypeRef::class(ROOT_CLASS_NAME);
        let removed = ctx.pool.remove_where(|m| {
            m.declared_in == ROOT_CLASS_NAME
                || (m.name == "equals" && m.params.len() == 1 && m.params[0].ty == root)
                || (m.name == "hashCode" && m.params.is_empty())
                || (m.name == "getClass" && m.params.is_empty())
        });
        log_removed(self.name(), &ctx.class.name, &removed);
        Ok(())
    }
}

/// Methods annotated `@Programmatic`.
pub struct Programmatic;

impl FacetFactory for Programmatic {
    fn name(&self) -> &'static str {
        PROGRAMMATIC
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MethodRemoving
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let removed = ctx
            .pool
            .remove_where(|m| m.annotations.has(names::PROGRAMMATIC));
        log_removed(self.name(), &ctx.class.name, &removed);
        Ok(())
    }
}

/// Persistence lifecycle callbacks.
pub struct LifecycleCallbacks;

impl LifecycleCallbacks {
    pub const CALLBACKS: &'static [&'static str] = &[
        "created",
        "loaded",
        "persisting",
        "persisted",
        "updating",
        "updated",
        "removing",
        "removed",
    ];
}

impl FacetFactory for LifecycleCallbacks {
    fn name(&self) -> &'static str {
        LIFECYCLE_CALLBACKS
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MethodRemoving
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let removed = ctx.pool.remove_where(|m| {
            m.params.is_empty() && m.return_type.is_void() && Self::CALLBACKS.contains(&m.name.as_str())
        });
        log_removed(self.name(), &ctx.class.name, &removed);
        Ok(())
    }
}

/// Methods injected by bytecode enhancers (`jdoGetName`, `_persistence_get`,
/// `$$_hibernate_read`).
pub struct EnhancementArtefacts;

impl EnhancementArtefacts {
    fn is_artefact(name: &str) -> bool {
        let jdo = name
            .strip_prefix("jdo")
            .is_some_and(|rest| rest.starts_with(char::is_uppercase));
        jdo || name.starts_with("_persistence_") || name.contains('$')
    }
}

impl FacetFactory for EnhancementArtefacts {
    fn name(&self) -> &'static str {
        ENHANCEMENT_ARTEFACTS
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MethodRemoving
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let removed = ctx.pool.remove_where(|m| Self::is_artefact(&m.name));
        log_removed(self.name(), &ctx.class.name, &removed);
        Ok(())
    }
}

/// Static methods, and non-public methods unless the policy encapsulates.
pub struct MethodVisibility;

impl FacetFactory for MethodVisibility {
    fn name(&self) -> &'static str {
        METHOD_VISIBILITY
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MethodRemoving
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let policy = *ctx.env.policy;
        let removed = ctx
            .pool
            .remove_where(|m| m.is_static || !policy.admits(m.visibility));
        log_removed(self.name(), &ctx.class.name, &removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::programming_model::factories::test_support::ClassFixture;
    use crate::application::programming_model::IntrospectionPolicy;
    use crate::domain::{Annotation, ClassDescriptor, MethodDescriptor, Visibility};

    fn customer() -> ClassDescriptor {
        ClassDescriptor::new("Customer")
            .method(MethodDescriptor::new("toString", TypeRef::Text).returns("c"))
            .method(MethodDescriptor::new("hashCode", TypeRef::Int).returns(1i64))
            .method(MethodDescriptor::new("getName", TypeRef::Text))
            .method(MethodDescriptor::new("persisted", TypeRef::Void))
            .method(MethodDescriptor::new("jdoGetName", TypeRef::Text))
            .method(MethodDescriptor::new("helper", TypeRef::Void).annotate(Annotation::new(names::PROGRAMMATIC)))
            .method(MethodDescriptor::new("secret", TypeRef::Void).visibility(Visibility::Private))
            .method(MethodDescriptor::new("create", TypeRef::Void).static_method())
    }

    fn remaining(fixture: &ClassFixture) -> Vec<String> {
        fixture.pool.available().map(|m| m.signature().to_string()).collect()
    }

    #[test]
    fn each_remover_takes_only_its_own_methods() {
        let mut fixture = ClassFixture::new(customer());
        fixture.run(&RootObjectMethods).unwrap();
        assert!(!remaining(&fixture).iter().any(|s| s == "hashCode()" || s == "equals(java.lang.Object)"));
        assert!(remaining(&fixture).contains(&"toString()".to_string()));

        fixture.run(&LifecycleCallbacks).unwrap();
        fixture.run(&EnhancementArtefacts).unwrap();
        fixture.run(&Programmatic).unwrap();
        fixture.run(&MethodVisibility).unwrap();

        assert_eq!(remaining(&fixture), ["getName()", "toString()"]);
    }

    #[test]
    fn encapsulation_keeps_private_methods() {
        let mut fixture = ClassFixture::new(customer()).with_policy(IntrospectionPolicy::encapsulated());
        fixture.run(&MethodVisibility).unwrap();
        assert!(remaining(&fixture).contains(&"secret()".to_string()));
        assert!(!remaining(&fixture).contains(&"create()".to_string()));
    }

    #[test]
    fn artefact_detection() {
        assert!(EnhancementArtefacts::is_artefact("jdoGetName"));
        assert!(EnhancementArtefacts::is_artefact("_persistence_get"));
        assert!(EnhancementArtefacts::is_artefact("$$_hibernate_read"));
        assert!(!EnhancementArtefacts::is_artefact("jdoe"));
        assert!(!EnhancementArtefacts::is_artefact("getName"));
    }
}
