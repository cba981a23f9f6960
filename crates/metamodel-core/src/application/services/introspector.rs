//! Per-class introspection: turns one class (with its ancestry already
//! known) into an [`ObjectSpecification`].
//!
//! The steps, in order:
//! 1. merge inherited methods and fields (subclass wins by signature)
//! 2. run the class-level factories
//! 3. discover properties and collections from getters
//! 4. discover actions from what is left
//! 5. compose mixin contributions
//! 6. report orphaned support methods and facet conflicts

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::application::programming_model::{
    IntrospectionEnv, MethodPool, ProcessClassContext, ProcessMethodContext,
    ProcessParameterContext, ProgrammingModel, naming,
};
use crate::domain::facet::{
    ActionInvocationFacet, CollectionAccessorFacet, NamedFacet, PropertyAccessorFacet, TypeOfFacet,
};
use crate::domain::{
    ClassDescriptor, Facet, FacetHolder, FacetOrigin, FacetType, FeatureType, Identifier,
    MethodDescriptor, ObjectMember, ObjectSpecification, Precedence, names,
};
use crate::error::MetamodelResult;

/// Origin recorded for orphaned support methods.
pub const ORPHANED_METHODS: &str = "orphaned-methods";
/// Origin recorded for mixin composition facets and failures.
pub const MIXIN_COMPOSITION: &str = "mixin-composition";
/// Origin recorded for equal-precedence facet conflicts.
pub const PRECEDENCE: &str = "precedence";

/// Method names a mixin uses for the member it contributes.
pub const MIXIN_MAIN_METHODS: &[&str] = &["act", "prop", "coll"];

/// A loaded mixin ready to be folded into its mixee.
pub struct MixinContribution {
    pub class: ClassDescriptor,
    pub spec: Arc<ObjectSpecification>,
}

// ── Flattening ───────────────────────────────────────────────────────────────

/// Merge `chain` (the class first, root last) into one descriptor carrying
/// every inherited method and field. Overrides shadow by signature.
pub fn flatten(chain: &[ClassDescriptor]) -> Option<ClassDescriptor> {
    let (own, ancestors) = chain.split_first()?;
    let mut merged = own.clone();

    let mut signatures: BTreeSet<_> = own.methods.iter().map(MethodDescriptor::signature).collect();
    let mut fields: BTreeSet<_> = own.fields.iter().map(|f| f.name.clone()).collect();

    for ancestor in ancestors {
        for method in &ancestor.methods {
            if signatures.insert(method.signature()) {
                merged.methods.push(method.clone());
            }
        }
        for field in &ancestor.fields {
            if fields.insert(field.name.clone()) {
                merged.fields.push(field.clone());
            }
        }
    }
    Some(merged)
}

// ── Introspector ─────────────────────────────────────────────────────────────

pub struct Introspector<'a> {
    model: &'a ProgrammingModel,
    env: IntrospectionEnv<'a>,
}

impl<'a> Introspector<'a> {
    pub fn new(model: &'a ProgrammingModel, env: IntrospectionEnv<'a>) -> Self {
        Self { model, env }
    }

    /// Introspect `class`, which must already be flattened.
    pub fn introspect(
        &self,
        class: &ClassDescriptor,
        mixins: &[MixinContribution],
    ) -> MetamodelResult<ObjectSpecification> {
        let mut pool = MethodPool::new(class.methods.clone());
        let mut spec = ObjectSpecification::new(
            class.name.clone(),
            class.effective_superclass().map(str::to_string),
            class.kind.clone(),
        );

        let mut ctx = ProcessClassContext {
            class,
            holder: spec.holder_mut(),
            pool: &mut pool,
            env: self.env,
        };
        self.model.run_class(&mut ctx)?;

        let exempt = self.associations(class, &mut spec, &mut pool)?;
        self.actions(class, &mut spec, &mut pool)?;

        if class.mixee().is_none() {
            for mixin in mixins {
                self.compose(class, &mut spec, mixin);
            }
        }

        self.report_orphans(class, &pool, &exempt);
        self.report_conflicts(&spec);

        debug!(
            class = %class.name,
            members = spec.members().len(),
            unclaimed = pool.available_count(),
            "introspected"
        );
        Ok(spec)
    }

    // ── Associations ─────────────────────────────────────────────────────────

    /// Properties and collections. Returns the capitalised stems of getters
    /// skipped because they lack a member annotation; their support methods
    /// are not orphans.
    fn associations(
        &self,
        class: &ClassDescriptor,
        spec: &mut ObjectSpecification,
        pool: &mut MethodPool,
    ) -> MetamodelResult<BTreeSet<String>> {
        let mut exempt = BTreeSet::new();
        let getters: Vec<(String, MethodDescriptor)> = pool
            .available()
            .filter_map(|m| getter_id(m).map(|id| (id, m.clone())))
            .collect();

        for (id, method) in getters {
            if !pool.is_available(&method.signature()) {
                continue;
            }
            if spec.member(&id).is_some() {
                self.env.warning(
                    Identifier::member(class.name.clone(), id.clone()),
                    format!("{} duplicates an existing accessor", method.signature()),
                    ORPHANED_METHODS,
                );
                pool.remove(&method.signature());
                continue;
            }

            let feature_type = if method.return_type.is_list() {
                FeatureType::Collection
            } else {
                FeatureType::Property
            };
            if self.env.policy.requires_member_annotations()
                && !is_annotated_association(class, &id, &method)
            {
                trace!(class = %class.name, member = %id, "skipping unannotated getter");
                exempt.insert(naming::capitalize(&id));
                continue;
            }

            pool.remove(&method.signature());
            let mut member = ObjectMember::association(
                &class.name,
                id.clone(),
                feature_type,
                method.return_type.clone(),
            );
            let mut ctx = ProcessMethodContext {
                class,
                member_id: &id,
                feature_type,
                method: &method,
                holder: member.holder_mut(),
                class_holder: spec.holder(),
                pool: &mut *pool,
                env: self.env,
            };
            self.model.run_method(&mut ctx)?;
            spec.add_member(member);
        }
        Ok(exempt)
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    fn actions(
        &self,
        class: &ClassDescriptor,
        spec: &mut ObjectSpecification,
        pool: &mut MethodPool,
    ) -> MetamodelResult<()> {
        let candidates: Vec<MethodDescriptor> = pool
            .available()
            .filter(|m| !naming::is_support_method_name(&m.name))
            .cloned()
            .collect();

        for method in candidates {
            if !pool.is_available(&method.signature()) {
                continue;
            }
            let is_mixin_main = class.mixee().is_some() && is_mixin_main_method(&method);
            if self.env.policy.requires_member_annotations()
                && !method.annotations.has(names::ACTION)
                && !is_mixin_main
            {
                continue;
            }

            pool.remove(&method.signature());
            let mut member = ObjectMember::action(
                &class.name,
                method.name.clone(),
                method.params.iter().map(|p| p.ty.clone()).collect(),
                method.return_type.clone(),
            );
            let mut ctx = ProcessMethodContext {
                class,
                member_id: &method.name,
                feature_type: FeatureType::Action,
                method: &method,
                holder: member.holder_mut(),
                class_holder: spec.holder(),
                pool: &mut *pool,
                env: self.env,
            };
            self.model.run_method(&mut ctx)?;

            let (action_holder, params) = member.holder_and_params_mut();
            for (index, param) in params.iter_mut().enumerate() {
                let mut ctx = ProcessParameterContext {
                    class,
                    action: &method,
                    action_id: &method.name,
                    index,
                    param: &method.params[index],
                    holder: param.holder_mut(),
                    action_holder,
                    class_holder: spec.holder(),
                    pool: &mut *pool,
                    env: self.env,
                };
                self.model.run_param(&mut ctx)?;
            }
            spec.add_member(member);
        }
        Ok(())
    }

    // ── Mixins ───────────────────────────────────────────────────────────────

    fn compose(&self, class: &ClassDescriptor, spec: &mut ObjectSpecification, mixin: &MixinContribution) {
        let Some(member_id) = mixin.class.mixin_member_name() else {
            return;
        };
        let Some(main) = main_method(&mixin.class) else {
            self.env.error(
                mixin.class.identifier(),
                "mixin declares no act(), prop() or coll() method",
                MIXIN_COMPOSITION,
            );
            return;
        };
        let Some(source) = mixin.spec.action(&main.name) else {
            self.env.error(
                mixin.class.identifier(),
                format!("mixin method {} is not a member", main.signature()),
                MIXIN_COMPOSITION,
            );
            return;
        };

        let feature_type = mixin_feature_type(main);
        if feature_type.is_association() && !main.params.is_empty() {
            self.env.error(
                mixin.class.identifier(),
                format!("{} contributes a {feature_type} and must take no parameters", main.signature()),
                MIXIN_COMPOSITION,
            );
            return;
        }

        let member = if feature_type.is_association() {
            ObjectMember::association(&class.name, member_id, feature_type, main.return_type.clone())
        } else {
            ObjectMember::action(
                &class.name,
                member_id,
                main.params.iter().map(|p| p.ty.clone()).collect(),
                main.return_type.clone(),
            )
        };
        let mut member = member.mixed_in(mixin.class.name.clone());

        rehome(source.holder(), member.holder_mut(), member_id, feature_type);
        for (param, source) in member.parameters_mut().iter_mut().zip(source.parameters()) {
            copy_facets(source.holder(), param.holder_mut());
        }

        debug!(mixee = %class.name, mixin = %mixin.class.name, member = member_id, "mixed in");
        spec.add_member(member);
    }

    // ── Reporting ────────────────────────────────────────────────────────────

    fn report_orphans(&self, class: &ClassDescriptor, pool: &MethodPool, exempt: &BTreeSet<String>) {
        for method in pool.available() {
            let Some(stem) = naming::support_method_stem(&method.name) else {
                continue;
            };
            if exempt.contains(stem) {
                continue;
            }
            self.env.error(
                class.identifier(),
                format!(
                    "orphaned support method {}: no member '{}' claims it",
                    method.signature(),
                    naming::decapitalize(stem)
                ),
                ORPHANED_METHODS,
            );
        }
    }

    fn report_conflicts(&self, spec: &ObjectSpecification) {
        for holder in spec.holders() {
            for conflict in holder.conflicts() {
                self.env
                    .warning(holder.identifier().clone(), conflict.message(), PRECEDENCE);
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Member id of a zero-argument, non-void, non-static getter.
fn getter_id(method: &MethodDescriptor) -> Option<String> {
    if !method.params.is_empty() || method.return_type.is_void() || method.is_static {
        return None;
    }
    naming::property_name_of_getter(&method.name, method.return_type.is_boolean())
}

fn is_annotated_association(class: &ClassDescriptor, id: &str, getter: &MethodDescriptor) -> bool {
    let marked = |annotations: &crate::domain::Annotations| {
        annotations.has(names::PROPERTY) || annotations.has(names::COLLECTION)
    };
    marked(&getter.annotations) || class.find_field(id).is_some_and(|f| marked(&f.annotations))
}

fn is_mixin_main_method(method: &MethodDescriptor) -> bool {
    MIXIN_MAIN_METHODS.contains(&method.name.as_str())
        || method.annotations.has(names::ACTION)
        || method.annotations.has(names::PROPERTY)
        || method.annotations.has(names::COLLECTION)
}

fn main_method(mixin: &ClassDescriptor) -> Option<&MethodDescriptor> {
    mixin
        .methods
        .iter()
        .find(|m| MIXIN_MAIN_METHODS.contains(&m.name.as_str()))
        .or_else(|| mixin.methods.iter().find(|m| is_mixin_main_method(m)))
}

fn mixin_feature_type(main: &MethodDescriptor) -> FeatureType {
    if main.name == "prop" || main.annotations.has(names::PROPERTY) {
        FeatureType::Property
    } else if main.name == "coll" || main.annotations.has(names::COLLECTION) {
        FeatureType::Collection
    } else {
        FeatureType::Action
    }
}

fn copy_facets(from: &FacetHolder, to: &mut FacetHolder) {
    for facet in from.facets() {
        to.add_facet(facet.clone());
    }
}

/// Copy the mixin action's facets onto the contributed member, reshaping
/// them for `feature_type` and renaming it after `member_id`.
fn rehome(from: &FacetHolder, to: &mut FacetHolder, member_id: &str, feature_type: FeatureType) {
    for facet in from.facets() {
        match facet.facet_type() {
            FacetType::Named if facet.precedence() == Precedence::Fallback => {}
            FacetType::ActionSemantics if feature_type.is_association() => {}
            FacetType::ActionInvocation if feature_type.is_association() => {
                if let Some(accessor) = accessor_facet(facet, feature_type) {
                    for derived in accessor {
                        to.add_facet(derived);
                    }
                }
            }
            _ => {
                to.add_facet(facet.clone());
            }
        }
    }
    to.add_facet(Facet::new(
        NamedFacet::Literal(naming::natural_name(member_id)),
        Precedence::Fallback,
        FacetOrigin::fallback(MIXIN_COMPOSITION),
    ));
}

/// Accessor facets standing in for a mixin's invocation facet.
fn accessor_facet(invocation: &Facet, feature_type: FeatureType) -> Option<Vec<Facet>> {
    let payload = invocation.payload::<ActionInvocationFacet>()?;
    let origin = FacetOrigin::derived(MIXIN_COMPOSITION, FacetType::ActionInvocation);
    let precedence = invocation.precedence();

    if feature_type == FeatureType::Property {
        return Some(vec![Facet::new(
            PropertyAccessorFacet {
                accessor: payload.handle.clone(),
                ty: payload.return_type.clone(),
            },
            precedence,
            origin,
        )]);
    }

    let mut facets = vec![Facet::new(
        CollectionAccessorFacet {
            accessor: payload.handle.clone(),
            ty: payload.return_type.clone(),
        },
        precedence,
        origin.clone(),
    )];
    if let Some(element) = payload.return_type.element_type() {
        facets.push(Facet::new(
            TypeOfFacet {
                element: element.clone(),
            },
            Precedence::Inferred,
            origin,
        ));
    }
    Some(facets)
}
