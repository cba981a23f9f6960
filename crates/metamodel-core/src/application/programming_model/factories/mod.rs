//! The standard facet factories.
//!
//! | Module          | Factories                                                    |
//! |-----------------|--------------------------------------------------------------|
//! | `removing`      | root-object methods, `@Programmatic`, lifecycle, artefacts   |
//! | `object`        | kind, `@DomainObject`, title, icon, css class, parent        |
//! | `member`        | accessors, invocation, `@Property`/`@Collection`/`@Action`   |
//! | `annotations`   | `@Named`, `@DescribedAs`, layouts, `@Hidden`, `@MemberOrder` |
//! | `support`       | `named`/`hide`/`disable`/`validate`/`default`/`choices`/...  |
//! | `fallback`      | natural names, mandatory, semantics, derived facets          |

use crate::application::programming_model::{FacetFactory, FactoryError, FactoryResult};
use crate::domain::{FacetOrigin, MethodDescriptor, TypeRef};

pub mod annotations;
pub mod fallback;
pub mod member;
pub mod object;
pub mod removing;
pub mod support;

pub use support::SupportKind;

// ── Factory names ────────────────────────────────────────────────────────────

pub const ROOT_OBJECT_METHODS: &str = "root-object-methods";
pub const PROGRAMMATIC: &str = "programmatic";
pub const LIFECYCLE_CALLBACKS: &str = "lifecycle-callbacks";
pub const ENHANCEMENT_ARTEFACTS: &str = "enhancement-artefacts";
pub const METHOD_VISIBILITY: &str = "method-visibility";

pub const DOMAIN_OBJECT_KIND: &str = "domain-object-kind";
pub const DOMAIN_OBJECT_ANNOTATION: &str = "domain-object-annotation";
pub const OBJECT_LAYOUT: &str = "object-layout";
pub const TITLE_METHOD: &str = "title-method";
pub const TITLE_ANNOTATION: &str = "title-annotation";
pub const ICON_NAME_METHOD: &str = "icon-name-method";
pub const CSS_CLASS_METHOD: &str = "css-class-method";
pub const OBJECT_VALIDATE_METHOD: &str = "object-validate-method";
pub const NAVIGABLE_PARENT: &str = "navigable-parent";
pub const TITLE_TO_STRING: &str = "title-to-string";
pub const OBJECT_NATURAL_NAME: &str = "object-natural-name";
pub const PLURAL_FALLBACK: &str = "plural-fallback";

pub const PROPERTY_ACCESSOR: &str = "property-accessor";
pub const COLLECTION_ACCESSOR: &str = "collection-accessor";
pub const ACTION_INVOCATION: &str = "action-invocation";
pub const ACTION_ANNOTATION: &str = "action-annotation";
pub const PROPERTY_ANNOTATION: &str = "property-annotation";
pub const COLLECTION_ANNOTATION: &str = "collection-annotation";
pub const PARAMETER_ANNOTATION: &str = "parameter-annotation";

pub const NAMED_ANNOTATION: &str = "named-annotation";
pub const DESCRIBED_AS_ANNOTATION: &str = "described-as-annotation";
pub const MEMBER_LAYOUT: &str = "member-layout";
pub const HIDDEN_ANNOTATION: &str = "hidden-annotation";
pub const DISABLED_ANNOTATION: &str = "disabled-annotation";
pub const MEMBER_ORDER_ANNOTATION: &str = "member-order-annotation";

pub const NAMED_METHOD: &str = "named-method";
pub const PARAM_NAMED_METHOD: &str = "param-named-method";

pub const MEMBER_NATURAL_NAME: &str = "member-natural-name";
pub const PARAMETER_NAME: &str = "parameter-name";
pub const PARAMETER_NATURAL_NAME: &str = "parameter-natural-name";
pub const MANDATORY_FALLBACK: &str = "mandatory-fallback";
pub const ACTION_SEMANTICS_FALLBACK: &str = "action-semantics-fallback";
pub const IMMUTABLE_DISABLES_MEMBERS: &str = "immutable-disables-members";
pub const BOUNDED_CHOICES: &str = "bounded-choices";

/// Every standard factory, in registration order.
pub fn defaults() -> Vec<Box<dyn FacetFactory>> {
    vec![
        // method removing
        Box::new(removing::RootObjectMethods),
        Box::new(removing::Programmatic),
        Box::new(removing::LifecycleCallbacks),
        Box::new(removing::EnhancementArtefacts),
        Box::new(removing::MethodVisibility),
        // member modelling
        Box::new(object::DomainObjectKind),
        Box::new(member::PropertyAccessor),
        Box::new(member::CollectionAccessor),
        Box::new(member::ActionInvocation),
        // annotations and conventions
        Box::new(object::DomainObjectAnnotation),
        Box::new(object::ObjectLayout),
        Box::new(object::TitleAnnotation),
        Box::new(object::TitleMethod),
        Box::new(object::IconNameMethod),
        Box::new(object::CssClassMethod),
        Box::new(object::ObjectValidateMethod),
        Box::new(object::NavigableParent),
        Box::new(member::ActionAnnotation),
        Box::new(member::PropertyAnnotation),
        Box::new(member::CollectionAnnotation),
        Box::new(member::ParameterAnnotation),
        Box::new(annotations::NamedAnnotation),
        Box::new(annotations::DescribedAsAnnotation),
        Box::new(annotations::MemberLayout),
        Box::new(annotations::HiddenAnnotation),
        Box::new(annotations::DisabledAnnotation),
        Box::new(annotations::MemberOrderAnnotation),
        Box::new(support::NamedMethod),
        Box::new(support::SupportMethod::new(SupportKind::Hide)),
        Box::new(support::SupportMethod::new(SupportKind::Disable)),
        Box::new(support::SupportMethod::new(SupportKind::Validate)),
        Box::new(support::SupportMethod::new(SupportKind::Default)),
        Box::new(support::SupportMethod::new(SupportKind::Choices)),
        Box::new(support::SupportMethod::new(SupportKind::AutoComplete)),
        Box::new(support::ParameterSupportMethod::new(SupportKind::Default)),
        Box::new(support::ParameterSupportMethod::new(SupportKind::Choices)),
        Box::new(support::ParameterSupportMethod::new(SupportKind::AutoComplete)),
        Box::new(support::ParameterSupportMethod::new(SupportKind::Validate)),
        Box::new(support::ParameterSupportMethod::new(SupportKind::Disable)),
        Box::new(support::ParameterNamedMethod),
        Box::new(fallback::ParameterName),
        // fallbacks
        Box::new(object::TitleToString),
        Box::new(object::ObjectNaturalName),
        Box::new(fallback::MemberNaturalName),
        Box::new(fallback::ParameterNaturalName),
        Box::new(fallback::MandatoryFallback),
        Box::new(fallback::ActionSemanticsFallback),
        // post-processing
        Box::new(object::PluralFallback),
        Box::new(fallback::ImmutableDisablesMembers),
        Box::new(fallback::BoundedChoices),
    ]
}

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Origin of a facet built from a convention method.
pub(crate) fn convention(factory: &str, method: &MethodDescriptor) -> FacetOrigin {
    FacetOrigin::convention(factory, method.signature())
}

/// `Invalid` unless `accepted`; the message names the method and both types.
pub(crate) fn expect_return(method: &MethodDescriptor, expected: &str, accepted: bool) -> FactoryResult {
    if accepted {
        return Ok(());
    }
    Err(FactoryError::Invalid(format!(
        "{} must return {expected}, but returns {}",
        method.signature(),
        method.return_type
    )))
}

/// Map any displayable error to [`FactoryError::Invalid`].
pub(crate) fn invalid(err: impl std::fmt::Display) -> FactoryError {
    FactoryError::Invalid(err.to_string())
}

pub(crate) fn is_list_of(ty: &TypeRef, element: &TypeRef) -> bool {
    ty.element_type() == Some(element)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures that run a single factory against a hand-built element.

    use std::collections::BTreeMap;

    use crate::application::ports::ClassSource;
    use crate::application::programming_model::naming;
    use crate::application::programming_model::{
        FacetFactory, FactoryResult, IntrospectionEnv, IntrospectionPolicy, MethodPool,
        ProcessClassContext, ProcessMethodContext, ProcessParameterContext,
    };
    use crate::domain::{
        ClassDescriptor, FacetHolder, FeatureType, Identifier, MethodDescriptor, ValidationFailures,
    };
    use crate::error::MetamodelResult;

    #[derive(Default)]
    pub struct StaticSource(pub BTreeMap<String, ClassDescriptor>);

    impl StaticSource {
        pub fn with(mut self, class: ClassDescriptor) -> Self {
            self.0.insert(class.name.clone(), class);
            self
        }
    }

    impl ClassSource for StaticSource {
        fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>> {
            Ok(self.0.get(name).cloned())
        }

        fn class_names(&self) -> MetamodelResult<Vec<String>> {
            Ok(self.0.keys().cloned().collect())
        }
    }

    pub struct ClassFixture {
        pub class: ClassDescriptor,
        pub holder: FacetHolder,
        pub pool: MethodPool,
        pub failures: ValidationFailures,
        pub policy: IntrospectionPolicy,
        pub source: StaticSource,
    }

    impl ClassFixture {
        pub fn new(class: ClassDescriptor) -> Self {
            Self {
                holder: FacetHolder::new(class.identifier(), FeatureType::Object),
                pool: MethodPool::new(class.methods.clone()),
                class,
                failures: ValidationFailures::new(),
                policy: IntrospectionPolicy::default(),
                source: StaticSource::default(),
            }
        }

        pub fn with_policy(mut self, policy: IntrospectionPolicy) -> Self {
            self.policy = policy;
            self
        }

        pub fn run(&mut self, factory: &dyn FacetFactory) -> FactoryResult {
            let mut ctx = ProcessClassContext {
                class: &self.class,
                holder: &mut self.holder,
                pool: &mut self.pool,
                env: IntrospectionEnv {
                    failures: &self.failures,
                    policy: &self.policy,
                    source: &self.source,
                },
            };
            factory.process_class(&mut ctx)
        }
    }

    /// A property, collection or action of `class` plus its parameters.
    pub struct MemberFixture {
        pub class: ClassDescriptor,
        pub member_id: String,
        pub feature_type: FeatureType,
        pub method: MethodDescriptor,
        pub holder: FacetHolder,
        pub params: Vec<FacetHolder>,
        pub class_holder: FacetHolder,
        pub pool: MethodPool,
        pub failures: ValidationFailures,
        pub policy: IntrospectionPolicy,
        pub source: StaticSource,
    }

    impl MemberFixture {
        fn build(class: ClassDescriptor, method_name: &str, feature_type: FeatureType) -> Self {
            let mut pool = MethodPool::new(class.methods.clone());
            let method = pool
                .available()
                .find(|m| m.name == method_name)
                .cloned()
                .expect("fixture method exists");
            pool.remove(&method.signature());

            let (member_id, identifier) = if feature_type == FeatureType::Action {
                (method.name.clone(), method.action_identifier(&class.name))
            } else {
                let id = naming::property_name_of_getter(&method.name, method.return_type.is_boolean())
                    .expect("fixture accessor is a getter");
                let identifier = Identifier::member(class.name.clone(), id.clone());
                (id, identifier)
            };
            let params = (0..method.param_count())
                .map(|i| FacetHolder::new(identifier.parameter(i), FeatureType::ActionParameter))
                .collect();

            Self {
                holder: FacetHolder::new(identifier, feature_type),
                class_holder: FacetHolder::new(class.identifier(), FeatureType::Object),
                params,
                member_id,
                feature_type,
                method,
                pool,
                class,
                failures: ValidationFailures::new(),
                policy: IntrospectionPolicy::default(),
                source: StaticSource::default(),
            }
        }

        pub fn property(class: ClassDescriptor, getter: &str) -> Self {
            Self::build(class, getter, FeatureType::Property)
        }

        pub fn collection(class: ClassDescriptor, getter: &str) -> Self {
            Self::build(class, getter, FeatureType::Collection)
        }

        pub fn action(class: ClassDescriptor, name: &str) -> Self {
            Self::build(class, name, FeatureType::Action)
        }

        pub fn with_source(mut self, source: StaticSource) -> Self {
            self.source = source;
            self
        }

        pub fn run(&mut self, factory: &dyn FacetFactory) -> FactoryResult {
            let mut ctx = ProcessMethodContext {
                class: &self.class,
                member_id: &self.member_id,
                feature_type: self.feature_type,
                method: &self.method,
                holder: &mut self.holder,
                class_holder: &self.class_holder,
                pool: &mut self.pool,
                env: IntrospectionEnv {
                    failures: &self.failures,
                    policy: &self.policy,
                    source: &self.source,
                },
            };
            factory.process_method(&mut ctx)
        }

        pub fn run_param(&mut self, factory: &dyn FacetFactory, index: usize) -> FactoryResult {
            let mut ctx = ProcessParameterContext {
                class: &self.class,
                action: &self.method,
                action_id: &self.member_id,
                index,
                param: &self.method.params[index],
                holder: &mut self.params[index],
                action_holder: &self.holder,
                class_holder: &self.class_holder,
                pool: &mut self.pool,
                env: IntrospectionEnv {
                    failures: &self.failures,
                    policy: &self.policy,
                    source: &self.source,
                },
            };
            factory.process_param(&mut ctx)
        }
    }
}
