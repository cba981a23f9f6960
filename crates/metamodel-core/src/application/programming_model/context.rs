//! Processing contexts handed to facet factories.
//!
//! Each context borrows exactly what a factory may touch: the descriptor it
//! reads, the holder it writes, and the method pool it consumes from.
//! Everything else is reachable through the shared [`IntrospectionEnv`].

use crate::application::ports::ClassSource;
use crate::application::programming_model::method_pool::MethodPool;
use crate::application::programming_model::naming;
use crate::application::programming_model::policy::IntrospectionPolicy;
use crate::domain::{
    Annotation, ClassDescriptor, Facet, FacetHolder, FacetOutcome, FeatureType, Identifier,
    MethodDescriptor, ParamDescriptor, TypeRef, ValidationFailure, ValidationFailures,
};

/// State shared by every context of one loader.
#[derive(Clone, Copy)]
pub struct IntrospectionEnv<'a> {
    pub failures: &'a ValidationFailures,
    pub policy: &'a IntrospectionPolicy,
    pub source: &'a dyn ClassSource,
}

impl IntrospectionEnv<'_> {
    pub fn error(&self, identifier: Identifier, message: impl Into<String>, origin: &str) {
        self.failures
            .add(ValidationFailure::error(identifier, message, origin));
    }

    pub fn warning(&self, identifier: Identifier, message: impl Into<String>, origin: &str) {
        self.failures
            .add(ValidationFailure::warning(identifier, message, origin));
    }
}

// ── Class ────────────────────────────────────────────────────────────────────

pub struct ProcessClassContext<'a> {
    /// The class with inherited methods merged in.
    pub class: &'a ClassDescriptor,
    pub holder: &'a mut FacetHolder,
    pub pool: &'a mut MethodPool,
    pub env: IntrospectionEnv<'a>,
}

impl ProcessClassContext<'_> {
    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.class.annotations.find(name)
    }

    pub fn add_facet(&mut self, facet: Facet) -> FacetOutcome {
        self.holder.add_facet(facet)
    }
}

// ── Member ───────────────────────────────────────────────────────────────────

/// Context for a property, collection or action.
pub struct ProcessMethodContext<'a> {
    pub class: &'a ClassDescriptor,
    pub member_id: &'a str,
    pub feature_type: FeatureType,
    /// The accessor of an association, or the action method.
    pub method: &'a MethodDescriptor,
    pub holder: &'a mut FacetHolder,
    /// Facets of the owning class; complete by the time members are processed.
    pub class_holder: &'a FacetHolder,
    pub pool: &'a mut MethodPool,
    pub env: IntrospectionEnv<'a>,
}

impl ProcessMethodContext<'_> {
    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    /// Property or collection type, or the action's return type.
    pub fn member_type(&self) -> &TypeRef {
        &self.method.return_type
    }

    /// `name` on the method, else on the backing field of an association.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.method.annotations.find(name).or_else(|| {
            if !self.feature_type.is_association() {
                return None;
            }
            self.class
                .find_field(self.member_id)
                .and_then(|field| field.annotations.find(name))
        })
    }

    /// `FirstName` for member `firstName`: the stem support methods use.
    pub fn capitalized_name(&self) -> String {
        naming::capitalize(self.member_id)
    }

    pub fn add_facet(&mut self, facet: Facet) -> FacetOutcome {
        self.holder.add_facet(facet)
    }
}

// ── Parameter ────────────────────────────────────────────────────────────────

pub struct ProcessParameterContext<'a> {
    pub class: &'a ClassDescriptor,
    pub action: &'a MethodDescriptor,
    pub action_id: &'a str,
    pub index: usize,
    pub param: &'a ParamDescriptor,
    pub holder: &'a mut FacetHolder,
    pub action_holder: &'a FacetHolder,
    pub class_holder: &'a FacetHolder,
    pub pool: &'a mut MethodPool,
    pub env: IntrospectionEnv<'a>,
}

impl ProcessParameterContext<'_> {
    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.param.annotations.find(name)
    }

    pub fn capitalized_action_name(&self) -> String {
        naming::capitalize(self.action_id)
    }

    pub fn add_facet(&mut self, facet: Facet) -> FacetOutcome {
        self.holder.add_facet(facet)
    }
}
