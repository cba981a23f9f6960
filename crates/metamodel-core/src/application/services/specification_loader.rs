//! Specification Loader - builds and caches one specification per class.
//!
//! Loading a class:
//! 1. Fetch its descriptor and run the structural checks
//! 2. Walk the superclass chain for cycles and missing classes
//! 3. Load the superclass, then (for non-mixins) every contributing mixin
//! 4. Take the per-class build lock, re-check the cache and introspect
//!
//! No build lock is held while dependencies load, so two threads loading
//! classes that depend on each other cannot deadlock. A class that fails
//! structurally is never cached; its failure is recorded and a later load
//! tries again.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use crate::application::ApplicationError;
use crate::application::ports::ClassSource;
use crate::application::programming_model::{IntrospectionEnv, IntrospectionPolicy, ProgrammingModel};
use crate::application::services::introspector::{Introspector, MixinContribution, flatten};
use crate::application::services::validators::{
    MetaModelValidator, ValidationContext, default_validators,
};
use crate::domain::{
    ClassDescriptor, DomainError, Identifier, ObjectSpecification, ROOT_CLASS_NAME,
    ValidationFailure, ValidationFailures, ValidationReport,
};
use crate::error::{MetamodelError, MetamodelResult};

/// Deepest superclass chain (or mixin nesting) a load may follow.
pub const MAX_INTROSPECTION_DEPTH: usize = 64;

/// Origin of failures raised by the loader itself.
pub const SPECIFICATION_LOADER: &str = "specification-loader";

/// Lifecycle of one class in the loader.
///
/// Transitions only move forward: `Unknown -> Introspecting -> Introspected`,
/// and `Introspected -> Invalidated -> Introspecting` for hot reload. A
/// failed load is the one way back, `Introspecting -> Unknown`, so the class
/// can be retried. See [`IntrospectionState::advances_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntrospectionState {
    /// Never loaded, or the last load failed.
    Unknown,
    Introspecting,
    Introspected,
    /// Dropped by [`SpecificationLoader::invalidate_all`]; reloads on demand.
    Invalidated,
}

impl IntrospectionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Introspecting => "introspecting",
            Self::Introspected => "introspected",
            Self::Invalidated => "invalidated",
        }
    }

    /// Whether the loader may move a class from `self` to `next`.
    pub const fn advances_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unknown | Self::Invalidated, Self::Introspecting)
                | (Self::Introspecting | Self::Invalidated, Self::Introspected)
                | (Self::Introspecting, Self::Unknown)
                | (Self::Introspected, Self::Invalidated)
        )
    }
}

impl fmt::Display for IntrospectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BuildLock = Arc<Mutex<()>>;

pub struct SpecificationLoader {
    source: Arc<dyn ClassSource>,
    model: Arc<ProgrammingModel>,
    policy: IntrospectionPolicy,
    validators: Vec<Box<dyn MetaModelValidator>>,
    cache: RwLock<HashMap<String, Arc<ObjectSpecification>>>,
    states: RwLock<HashMap<String, IntrospectionState>>,
    build_locks: Mutex<HashMap<String, BuildLock>>,
    failures: ValidationFailures,
    root: ClassDescriptor,
}

impl SpecificationLoader {
    /// Create a loader over `source`.
    ///
    /// Fails with [`MetamodelError::Configuration`] when `policy` cannot be
    /// honoured; nothing is introspected in that case.
    pub fn new(
        source: Arc<dyn ClassSource>,
        model: Arc<ProgrammingModel>,
        policy: IntrospectionPolicy,
    ) -> MetamodelResult<Self> {
        policy
            .validate()
            .map_err(|e| MetamodelError::configuration(e.to_string()))?;

        Ok(Self {
            source,
            model,
            policy,
            validators: default_validators(),
            cache: RwLock::new(HashMap::new()),
            states: RwLock::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
            failures: ValidationFailures::new(),
            root: ClassDescriptor::object_root(),
        })
    }

    /// Replace the post-introspection validators.
    pub fn with_validators(mut self, validators: Vec<Box<dyn MetaModelValidator>>) -> Self {
        self.validators = validators;
        self
    }

    pub fn policy(&self) -> &IntrospectionPolicy {
        &self.policy
    }

    pub fn model(&self) -> &ProgrammingModel {
        &self.model
    }

    /// The loader's failure log, shared with every introspection.
    pub fn failures(&self) -> &ValidationFailures {
        &self.failures
    }

    pub fn report(&self) -> ValidationReport {
        self.failures.report()
    }

    /// Names of every class the source knows, sorted.
    pub fn class_names(&self) -> MetamodelResult<Vec<String>> {
        let mut names = self.source.class_names()?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    pub fn state_of(&self, class_name: &str) -> IntrospectionState {
        self.states
            .read()
            .ok()
            .and_then(|states| states.get(class_name).copied())
            .unwrap_or(IntrospectionState::Unknown)
    }

    /// The cached specification, without loading.
    pub fn cached(&self, class_name: &str) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        let cache = self.cache.read().map_err(|_| ApplicationError::CacheLockError)?;
        Ok(cache.get(class_name).cloned())
    }

    /// Every cached specification, by class name.
    pub fn cached_specs(&self) -> MetamodelResult<BTreeMap<String, Arc<ObjectSpecification>>> {
        let cache = self.cache.read().map_err(|_| ApplicationError::CacheLockError)?;
        Ok(cache
            .iter()
            .map(|(name, spec)| (name.clone(), Arc::clone(spec)))
            .collect())
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// The specification of `class_name`, introspecting it (and its
    /// superclasses and mixins) on first use.
    #[instrument(skip_all, fields(class = %class_name))]
    pub fn load_specification(&self, class_name: &str) -> MetamodelResult<Arc<ObjectSpecification>> {
        let mut stack = Vec::new();
        self.load(class_name, &mut stack)
    }

    fn load(&self, class_name: &str, stack: &mut Vec<String>) -> MetamodelResult<Arc<ObjectSpecification>> {
        if let Some(spec) = self.cached(class_name)? {
            return Ok(spec);
        }

        let result = if stack.iter().any(|entry| entry == class_name) {
            let mut chain = stack.clone();
            chain.push(class_name.to_string());
            Err(DomainError::CyclicHierarchy {
                chain: chain.join(" -> "),
            }
            .into())
        } else if stack.len() >= MAX_INTROSPECTION_DEPTH {
            Err(DomainError::HierarchyTooDeep {
                class: class_name.to_string(),
                max: MAX_INTROSPECTION_DEPTH,
            }
            .into())
        } else {
            stack.push(class_name.to_string());
            let result = self.resolve(class_name, stack);
            stack.pop();
            result
        };

        if let Err(err) = &result {
            self.record(class_name, err);
        }
        result
    }

    fn resolve(&self, class_name: &str, stack: &mut Vec<String>) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.set_state(class_name, IntrospectionState::Introspecting);

        let class = self
            .fetch(class_name)?
            .ok_or_else(|| DomainError::UnknownClass(class_name.to_string()))?;
        class.validate()?;

        let ancestors = self.ancestry(&class)?;
        if let Some(superclass) = class.effective_superclass() {
            if ancestors.is_empty() {
                return Err(DomainError::UnknownSuperclass {
                    class: class_name.to_string(),
                    superclass: superclass.to_string(),
                }
                .into());
            }
            self.load(superclass, stack).map_err(|err| {
                if err.is_per_class() {
                    ApplicationError::IntrospectionFailed {
                        class: class_name.to_string(),
                        reason: format!("superclass '{superclass}' could not be introspected"),
                    }
                    .into()
                } else {
                    err
                }
            })?;
        }

        let mixins = if class.mixee().is_none() && !class.is_root() {
            self.load_mixins(&class, stack)?
        } else {
            Vec::new()
        };

        let lock = self.build_lock(class_name)?;
        let _guard = lock.lock().map_err(|_| ApplicationError::CacheLockError)?;
        if let Some(spec) = self.cached(class_name)? {
            // Another thread built it while this one waited for the lock.
            self.set_state(class_name, IntrospectionState::Introspected);
            return Ok(spec);
        }

        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.push(class);
        chain.extend(ancestors);
        let flat = flatten(&chain).ok_or_else(|| MetamodelError::Internal {
            message: format!("empty class chain for '{class_name}'"),
        })?;

        let env = IntrospectionEnv {
            failures: &self.failures,
            policy: &self.policy,
            source: self.source.as_ref(),
        };
        let spec = Arc::new(Introspector::new(&self.model, env).introspect(&flat, &mixins)?);

        self.cache
            .write()
            .map_err(|_| ApplicationError::CacheLockError)?
            .insert(class_name.to_string(), Arc::clone(&spec));
        self.set_state(class_name, IntrospectionState::Introspected);
        debug!(class = class_name, members = spec.members().len(), "cached specification");
        Ok(spec)
    }

    /// Ancestors of `class`, nearest first, stopping at the first one the
    /// source does not know.
    fn ancestry(&self, class: &ClassDescriptor) -> MetamodelResult<Vec<ClassDescriptor>> {
        let mut names = vec![class.name.clone()];
        let mut ancestors = Vec::new();
        let mut next = class.effective_superclass().map(str::to_string);

        while let Some(name) = next {
            if names.contains(&name) {
                names.push(name);
                return Err(DomainError::CyclicHierarchy {
                    chain: names.join(" -> "),
                }
                .into());
            }
            if names.len() > MAX_INTROSPECTION_DEPTH {
                return Err(DomainError::HierarchyTooDeep {
                    class: class.name.clone(),
                    max: MAX_INTROSPECTION_DEPTH,
                }
                .into());
            }
            let Some(ancestor) = self.fetch(&name)? else {
                break;
            };
            names.push(name);
            next = ancestor.effective_superclass().map(str::to_string);
            ancestors.push(ancestor);
        }
        Ok(ancestors)
    }

    fn load_mixins(
        &self,
        class: &ClassDescriptor,
        stack: &mut Vec<String>,
    ) -> MetamodelResult<Vec<MixinContribution>> {
        let mut contributions = Vec::new();
        for mixin_name in self.source.mixins_for(&class.name)? {
            let Some(mixin) = self.fetch(&mixin_name)? else {
                continue;
            };
            let extends_mixee = self
                .ancestry(&mixin)
                .is_ok_and(|ancestors| ancestors.iter().any(|a| a.name == class.name));
            if extends_mixee {
                self.failures.add(ValidationFailure::error(
                    mixin.identifier(),
                    format!("mixin extends its own mixee '{}'", class.name),
                    SPECIFICATION_LOADER,
                ));
                continue;
            }

            match self.load(&mixin_name, stack) {
                Ok(spec) => contributions.push(MixinContribution { class: mixin, spec }),
                Err(err) if err.is_per_class() => {
                    warn!(mixee = %class.name, mixin = %mixin_name, error = %err, "skipping mixin");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(contributions)
    }

    fn fetch(&self, class_name: &str) -> MetamodelResult<Option<ClassDescriptor>> {
        match self.source.class(class_name)? {
            Some(class) => Ok(Some(class)),
            None if class_name == ROOT_CLASS_NAME => Ok(Some(self.root.clone())),
            None => Ok(None),
        }
    }

    fn build_lock(&self, class_name: &str) -> MetamodelResult<BuildLock> {
        let mut locks = self
            .build_locks
            .lock()
            .map_err(|_| ApplicationError::CacheLockError)?;
        Ok(Arc::clone(locks.entry(class_name.to_string()).or_default()))
    }

    /// Move `class_name` to `state` if the lifecycle allows it. Checked and
    /// written under one lock, so a late thread cannot undo a finished build.
    fn set_state(&self, class_name: &str, state: IntrospectionState) {
        let Ok(mut states) = self.states.write() else {
            return;
        };
        let current = states
            .get(class_name)
            .copied()
            .unwrap_or(IntrospectionState::Unknown);
        if current.advances_to(state) {
            states.insert(class_name.to_string(), state);
        } else if current != state {
            trace!(class = class_name, from = %current, to = %state, "state transition ignored");
        }
    }

    /// Record a structural failure against the class. An in-progress class
    /// goes back to `Unknown`; a class another thread finished stays put.
    fn record(&self, class_name: &str, err: &MetamodelError) {
        self.set_state(class_name, IntrospectionState::Unknown);
        let message = match err {
            MetamodelError::Domain(DomainError::UnknownClass(_)) => return,
            MetamodelError::Domain(e) if e.is_structural() => e.to_string(),
            MetamodelError::Application(e) if e.is_per_class() => e.to_string(),
            _ => return,
        };
        warn!(class = class_name, %message, "class cannot be introspected");
        self.failures.add(ValidationFailure::error(
            Identifier::class(class_name),
            message,
            SPECIFICATION_LOADER,
        ));
    }

    // ── Whole model ──────────────────────────────────────────────────────────

    /// Introspect every class the source knows, in name order, then run the
    /// validators. Per-class failures are collected; a metamodel abort
    /// stops the build.
    #[instrument(skip_all)]
    pub fn build_all(&self) -> MetamodelResult<ValidationReport> {
        let names = self.class_names()?;
        for name in &names {
            match self.load_specification(name) {
                Ok(_) => {}
                Err(err) if err.is_per_class() => {
                    debug!(class = %name, error = %err, "class left out of the metamodel");
                }
                Err(err) => return Err(err),
            }
        }

        self.run_validators(&names)?;
        let report = self.report();
        info!(
            classes = names.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "metamodel built"
        );
        Ok(report)
    }

    fn run_validators(&self, names: &[String]) -> MetamodelResult<()> {
        let specs = self.cached_specs()?;
        let known_classes: BTreeSet<String> = names.iter().cloned().collect();
        let ctx = ValidationContext {
            specs: &specs,
            known_classes: &known_classes,
            failures: &self.failures,
        };
        for spec in specs.values() {
            for validator in &self.validators {
                validator.validate(spec, &ctx);
            }
        }
        Ok(())
    }

    /// Drop every cached specification and failure. The next load of any
    /// class introspects it again.
    pub fn invalidate_all(&self) -> MetamodelResult<()> {
        let mut cache = self.cache.write().map_err(|_| ApplicationError::CacheLockError)?;
        let dropped = cache.len();
        cache.clear();
        drop(cache);

        if let Ok(mut states) = self.states.write() {
            for state in states.values_mut() {
                *state = IntrospectionState::Invalidated;
            }
        }
        self.build_locks
            .lock()
            .map_err(|_| ApplicationError::CacheLockError)?
            .clear();
        self.failures.clear();

        info!(dropped, "metamodel invalidated");
        Ok(())
    }

    // ── Hierarchy ────────────────────────────────────────────────────────────

    /// Names of the direct subclasses of `class_name`, sorted.
    pub fn subclasses_of(&self, class_name: &str) -> MetamodelResult<Vec<String>> {
        let mut subclasses = Vec::new();
        for name in self.class_names()? {
            if let Some(class) = self.fetch(&name)? {
                if class.effective_superclass() == Some(class_name) {
                    subclasses.push(name);
                }
            }
        }
        Ok(subclasses)
    }

    /// The superclass specification, loaded on demand. `None` for the root.
    pub fn superclass_of(
        &self,
        spec: &ObjectSpecification,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        spec.superclass_name()
            .map(|name| self.load_specification(name))
            .transpose()
    }
}

impl fmt::Debug for SpecificationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationLoader")
            .field("policy", &self.policy)
            .field("model", &self.model)
            .field("validators", &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::application::ports::output::MockClassSource;
    use crate::application::programming_model::factories::test_support::StaticSource;
    use crate::application::programming_model::{Encapsulation, MemberAnnotations};
    use crate::domain::{MethodDescriptor, TypeRef};

    fn loader(source: StaticSource) -> SpecificationLoader {
        SpecificationLoader::new(
            Arc::new(source),
            Arc::new(ProgrammingModel::default_model()),
            IntrospectionPolicy::default(),
        )
        .unwrap()
    }

    fn shop() -> StaticSource {
        StaticSource::default()
            .with(
                ClassDescriptor::new("shop.Party")
                    .kind(crate::domain::ClassKind::Abstract)
                    .method(MethodDescriptor::getter("getName", TypeRef::Text, "name")),
            )
            .with(
                ClassDescriptor::new("shop.Customer")
                    .extends("shop.Party")
                    .method(MethodDescriptor::new("archive", TypeRef::Void)),
            )
            .with(ClassDescriptor::new("shop.Supplier").extends("shop.Party"))
    }

    #[test]
    fn invalid_policy_is_a_configuration_error() {
        let policy = IntrospectionPolicy {
            member_annotations: MemberAnnotations::Optional,
            encapsulation: Encapsulation::Encapsulated,
        };
        let result = SpecificationLoader::new(
            Arc::new(StaticSource::default()),
            Arc::new(ProgrammingModel::default_model()),
            policy,
        );
        assert!(matches!(result, Err(MetamodelError::Configuration { .. })));
    }

    #[test]
    fn inherited_members_and_superclass_are_loaded() {
        let loader = loader(shop());
        let customer = loader.load_specification("shop.Customer").unwrap();

        assert!(customer.property("name").is_some());
        assert!(customer.action("archive").is_some());
        assert_eq!(loader.state_of("shop.Party"), IntrospectionState::Introspected);
        assert_eq!(loader.state_of(ROOT_CLASS_NAME), IntrospectionState::Introspected);

        let party = loader.superclass_of(&customer).unwrap().unwrap();
        assert_eq!(party.class_name(), "shop.Party");
        let root = loader.superclass_of(&party).unwrap().unwrap();
        assert!(loader.superclass_of(&root).unwrap().is_none());
    }

    #[test]
    fn specifications_are_cached() {
        let loader = loader(shop());
        let first = loader.load_specification("shop.Customer").unwrap();
        let second = loader.load_specification("shop.Customer").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn the_source_is_consulted_once_per_class() {
        let mut source = MockClassSource::new();
        source
            .expect_class()
            .withf(|name| name == "Customer")
            .times(1)
            .returning(|_| Ok(Some(ClassDescriptor::new("Customer"))));
        source
            .expect_class()
            .withf(|name| name == ROOT_CLASS_NAME)
            .returning(|_| Ok(None));
        source.expect_mixins_for().returning(|_| Ok(Vec::new()));

        let loader = SpecificationLoader::new(
            Arc::new(source),
            Arc::new(ProgrammingModel::default_model()),
            IntrospectionPolicy::default(),
        )
        .unwrap();
        loader.load_specification("Customer").unwrap();
        loader.load_specification("Customer").unwrap();
    }

    #[test]
    fn unknown_superclass_fails_only_that_class() {
        let source = shop().with(ClassDescriptor::new("shop.Orphan").extends("shop.Missing"));
        let loader = loader(source);

        let err = loader.load_specification("shop.Orphan").unwrap_err();
        assert!(matches!(err, MetamodelError::Domain(DomainError::UnknownSuperclass { .. })));
        assert_eq!(loader.state_of("shop.Orphan"), IntrospectionState::Unknown);
        assert!(loader.cached("shop.Orphan").unwrap().is_none());

        let report = loader.build_all().unwrap();
        assert!(report.for_class("shop.Orphan").any(|f| f.is_error()));
        assert!(loader.cached("shop.Customer").unwrap().is_some());
    }

    #[test]
    fn failed_superclass_fails_the_subclass() {
        let source = StaticSource::default()
            .with(ClassDescriptor::new("a.Base").extends("a.Missing"))
            .with(ClassDescriptor::new("a.Derived").extends("a.Base"));
        let loader = loader(source);

        let err = loader.load_specification("a.Derived").unwrap_err();
        assert!(matches!(
            err,
            MetamodelError::Application(ApplicationError::IntrospectionFailed { ref class, .. }) if class == "a.Derived"
        ));
        let report = loader.report();
        assert_eq!(report.for_class("a.Base").count(), 1);
        assert_eq!(report.for_class("a.Derived").count(), 1);
    }

    #[test]
    fn cyclic_hierarchies_are_detected() {
        let source = StaticSource::default()
            .with(ClassDescriptor::new("c.A").extends("c.B"))
            .with(ClassDescriptor::new("c.B").extends("c.A"));
        let loader = loader(source);

        let err = loader.load_specification("c.A").unwrap_err();
        match err {
            MetamodelError::Domain(DomainError::CyclicHierarchy { chain }) => {
                assert_eq!(chain, "c.A -> c.B -> c.A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_class_is_not_recorded() {
        let loader = loader(shop());
        let err = loader.load_specification("shop.Ghost").unwrap_err();
        assert!(matches!(err, MetamodelError::Domain(DomainError::UnknownClass(_))));
        assert!(loader.report().is_clean());
    }

    #[test]
    fn invalidate_all_forces_reintrospection() {
        let loader = loader(shop().with(
            ClassDescriptor::new("shop.Broken").method(MethodDescriptor::new("defaultAnInt", TypeRef::Int)),
        ));
        let before = loader.load_specification("shop.Customer").unwrap();
        loader.load_specification("shop.Broken").unwrap();
        assert!(!loader.report().is_clean());

        loader.invalidate_all().unwrap();
        assert_eq!(loader.state_of("shop.Customer"), IntrospectionState::Invalidated);
        assert!(loader.report().is_clean());

        let after = loader.load_specification("shop.Customer").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn subclasses_are_found_by_name() {
        let loader = loader(shop());
        assert_eq!(
            loader.subclasses_of("shop.Party").unwrap(),
            ["shop.Customer", "shop.Supplier"]
        );
        assert!(loader.subclasses_of("shop.Customer").unwrap().is_empty());
    }

    #[test]
    fn mixins_extending_their_mixee_are_skipped() {
        let source = shop().with(
            ClassDescriptor::new("shop.Customer_promote")
                .extends("shop.Customer")
                .mixin_for("shop.Customer")
                .method(MethodDescriptor::new("act", TypeRef::Void)),
        );
        let loader = loader(source);

        let customer = loader.load_specification("shop.Customer").unwrap();
        assert!(customer.action("promote").is_none());
        assert!(
            loader
                .report()
                .for_class("shop.Customer_promote")
                .any(|f| f.message.contains("own mixee"))
        );
    }

    #[test]
    fn state_transitions_only_move_forward() {
        use IntrospectionState::{Introspected, Introspecting, Invalidated, Unknown};

        assert!(Unknown.advances_to(Introspecting));
        assert!(Introspecting.advances_to(Introspected));
        assert!(Introspected.advances_to(Invalidated));
        assert!(Invalidated.advances_to(Introspecting));
        // A failed load may be retried.
        assert!(Introspecting.advances_to(Unknown));

        assert!(!Introspected.advances_to(Introspecting));
        assert!(!Introspected.advances_to(Unknown));
        assert!(!Unknown.advances_to(Introspected));
        assert!(!Introspecting.advances_to(Introspecting));
    }

    #[test]
    fn late_builder_does_not_rewind_a_finished_class() {
        let loader = loader(shop());
        let built = loader.load_specification("shop.Customer").unwrap();

        // A second builder that missed the cache before the first finished.
        let late = loader.resolve("shop.Customer", &mut Vec::new()).unwrap();

        assert!(Arc::ptr_eq(&built, &late));
        assert_eq!(loader.state_of("shop.Customer"), IntrospectionState::Introspected);
    }

    #[test]
    fn late_failure_does_not_rewind_a_finished_class() {
        let loader = loader(shop());
        loader.load_specification("shop.Customer").unwrap();

        let err = MetamodelError::from(DomainError::UnknownSuperclass {
            class: "shop.Customer".into(),
            superclass: "shop.Missing".into(),
        });
        loader.record("shop.Customer", &err);

        assert_eq!(loader.state_of("shop.Customer"), IntrospectionState::Introspected);
        assert!(loader.cached("shop.Customer").unwrap().is_some());
    }

    #[test]
    fn failed_load_returns_to_unknown_and_can_be_retried() {
        let loader = loader(shop().with(ClassDescriptor::new("shop.Orphan").extends("shop.Missing")));

        assert!(loader.load_specification("shop.Orphan").is_err());
        assert_eq!(loader.state_of("shop.Orphan"), IntrospectionState::Unknown);

        assert!(loader.load_specification("shop.Orphan").is_err());
        assert_eq!(loader.state_of("shop.Orphan"), IntrospectionState::Unknown);
    }

    #[test]
    fn concurrent_loads_leave_every_class_introspected() {
        for _ in 0..50 {
            let loader = Arc::new(loader(shop()));
            let barrier = Arc::new(Barrier::new(8));
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let loader = Arc::clone(&loader);
                    let barrier = Arc::clone(&barrier);
                    let class = if i % 2 == 0 { "shop.Customer" } else { "shop.Supplier" };
                    thread::spawn(move || {
                        barrier.wait();
                        loader.load_specification(class).unwrap();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            for name in loader.cached_specs().unwrap().keys() {
                assert_eq!(loader.state_of(name), IntrospectionState::Introspected, "{name}");
            }
        }
    }

    #[test]
    fn concurrent_loads_share_one_specification() {
        let loader = Arc::new(loader(shop()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                thread::spawn(move || loader.load_specification("shop.Customer").unwrap())
            })
            .collect();
        let specs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for spec in &specs[1..] {
            assert!(Arc::ptr_eq(&specs[0], spec));
        }
    }
}
