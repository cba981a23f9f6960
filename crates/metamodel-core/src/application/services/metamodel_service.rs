//! Metamodel Service - the entry point the CLI drives.
//!
//! Wraps a [`SpecificationLoader`] with the deployment-mode policy for
//! validation failures and turns specifications into serialisable
//! summaries.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::services::{ParentChain, SpecificationLoader};
use crate::domain::facet::SupersededFacet;
use crate::domain::{
    ActionParameter, DomainError, DomainObject, Facet, FacetHolder, FacetType, FeatureType,
    Identifier, ObjectMember, ObjectSpecification, Precedence, TypeRef, ValidationFailure,
    ValidationReport,
};
use crate::error::MetamodelResult;

/// How strictly a build treats error-severity failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Failures are reported; the metamodel is still usable.
    #[default]
    Prototype,
    /// Any error fails the build.
    Production,
}

impl DeploymentMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prototype => "prototype",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prototype" | "prototyping" => Ok(Self::Prototype),
            "production" => Ok(Self::Production),
            other => Err(DomainError::InvalidValue {
                what: "deployment mode",
                value: other.to_string(),
            }),
        }
    }
}

// ── Summaries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetSummary {
    pub facet_type: FacetType,
    pub value: String,
    pub precedence: Precedence,
    pub origin: String,
}

impl From<&Facet> for FacetSummary {
    fn from(facet: &Facet) -> Self {
        Self {
            facet_type: facet.facet_type(),
            value: facet.data().to_string(),
            precedence: facet.precedence(),
            origin: facet.origin().to_string(),
        }
    }
}

/// A facet that lost to the active one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupersededSummary {
    #[serde(flatten)]
    pub facet: FacetSummary,
    pub reason: &'static str,
    pub winner: String,
}

impl From<&SupersededFacet> for SupersededSummary {
    fn from(superseded: &SupersededFacet) -> Self {
        Self {
            facet: FacetSummary::from(&superseded.facet),
            reason: superseded.reason.as_str(),
            winner: superseded.winner.to_string(),
        }
    }
}

fn facets_of(holder: &FacetHolder) -> Vec<FacetSummary> {
    holder.facets().map(FacetSummary::from).collect()
}

fn superseded_of(holder: &FacetHolder) -> Vec<SupersededSummary> {
    holder.all_superseded().map(SupersededSummary::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub index: usize,
    pub identifier: Identifier,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub name: String,
    pub facets: Vec<FacetSummary>,
    pub superseded: Vec<SupersededSummary>,
}

impl From<&ActionParameter> for ParameterSummary {
    fn from(param: &ActionParameter) -> Self {
        Self {
            index: param.index(),
            identifier: param.holder().identifier().clone(),
            ty: param.ty().clone(),
            name: param.name(),
            facets: facets_of(param.holder()),
            superseded: superseded_of(param.holder()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSummary {
    pub id: String,
    pub identifier: Identifier,
    pub feature_type: FeatureType,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed_in_from: Option<String>,
    pub facets: Vec<FacetSummary>,
    pub superseded: Vec<SupersededSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSummary>,
}

impl From<&ObjectMember> for MemberSummary {
    fn from(member: &ObjectMember) -> Self {
        Self {
            id: member.id().to_string(),
            identifier: member.identifier().clone(),
            feature_type: member.feature_type(),
            ty: member.ty().clone(),
            name: member.name(None),
            mixed_in_from: member.mixed_in_from().map(str::to_string),
            facets: facets_of(member.holder()),
            superseded: superseded_of(member.holder()),
            parameters: member.parameters().iter().map(ParameterSummary::from).collect(),
        }
    }
}

/// Everything known about one class, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecificationSummary {
    pub class_name: String,
    pub kind: String,
    pub superclass: Option<String>,
    pub singular_name: String,
    pub plural_name: String,
    pub immutable: bool,
    pub bounded: bool,
    pub facets: Vec<FacetSummary>,
    pub superseded: Vec<SupersededSummary>,
    /// Members ordered by `@MemberOrder`, then id.
    pub members: Vec<MemberSummary>,
    pub failures: Vec<ValidationFailure>,
}

impl SpecificationSummary {
    fn new(spec: &ObjectSpecification, failures: Vec<ValidationFailure>) -> Self {
        Self {
            class_name: spec.class_name().to_string(),
            kind: spec.kind().to_string(),
            superclass: spec.superclass_name().map(str::to_string),
            singular_name: spec.singular_name(),
            plural_name: spec.plural_name(),
            immutable: spec.is_immutable(),
            bounded: spec.is_bounded(),
            facets: facets_of(spec.holder()),
            superseded: superseded_of(spec.holder()),
            members: spec
                .members_in_order()
                .into_iter()
                .map(MemberSummary::from)
                .collect(),
            failures,
        }
    }
}

/// One row of `metamodel list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: String,
    pub superclass: Option<String>,
    pub members: Option<usize>,
    pub state: String,
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct MetamodelService {
    loader: Arc<SpecificationLoader>,
}

impl MetamodelService {
    pub fn new(loader: Arc<SpecificationLoader>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &SpecificationLoader {
        &self.loader
    }

    /// Build the whole metamodel.
    ///
    /// In [`DeploymentMode::Production`] any error-severity failure turns
    /// into [`ApplicationError::ValidationAborted`]; in prototype mode the
    /// report is returned for inspection.
    #[instrument(skip_all, fields(mode = %mode))]
    pub fn build(&self, mode: DeploymentMode) -> MetamodelResult<ValidationReport> {
        let report = self.loader.build_all()?;

        for failure in report.failures() {
            warn!(
                identifier = %failure.identifier,
                severity = %failure.severity,
                origin = %failure.origin,
                "{}",
                failure.message
            );
        }

        if mode == DeploymentMode::Production && report.has_errors() {
            return Err(ApplicationError::ValidationAborted {
                errors: report.error_count(),
                warnings: report.warning_count(),
            }
            .into());
        }

        info!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "metamodel ready"
        );
        Ok(report)
    }

    /// Summary of one class, with the failures recorded against it.
    pub fn describe(&self, class_name: &str) -> MetamodelResult<SpecificationSummary> {
        let spec = self.loader.load_specification(class_name)?;
        let failures = self
            .loader
            .report()
            .for_class(class_name)
            .cloned()
            .collect();
        Ok(SpecificationSummary::new(&spec, failures))
    }

    /// Every known class, sorted by name. Member counts are shown for
    /// classes already introspected.
    pub fn list_classes(&self) -> MetamodelResult<Vec<ClassInfo>> {
        let names = self.loader.class_names()?;
        let mut classes = Vec::with_capacity(names.len());
        for name in names {
            let cached = self.loader.cached(&name)?;
            let info = match cached {
                Some(spec) => ClassInfo {
                    kind: spec.kind().to_string(),
                    superclass: spec.superclass_name().map(str::to_string),
                    members: Some(spec.members().len()),
                    state: self.loader.state_of(&name).to_string(),
                    name,
                },
                None => ClassInfo {
                    kind: "-".into(),
                    superclass: None,
                    members: None,
                    state: self.loader.state_of(&name).to_string(),
                    name,
                },
            };
            classes.push(info);
        }
        Ok(classes)
    }

    pub fn parent_chain(&self, obj: &DomainObject) -> MetamodelResult<Vec<Arc<DomainObject>>> {
        ParentChain::walk(obj, &self.loader)
    }

    /// Drop every cached specification so the next use re-introspects.
    pub fn reload(&self) -> MetamodelResult<()> {
        self.loader.invalidate_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::programming_model::factories::test_support::StaticSource;
    use crate::application::programming_model::{IntrospectionPolicy, ProgrammingModel};
    use crate::domain::{Annotation, ClassDescriptor, MethodDescriptor, names};
    use crate::error::MetamodelError;

    fn service(source: StaticSource) -> MetamodelService {
        let loader = SpecificationLoader::new(
            Arc::new(source),
            Arc::new(ProgrammingModel::default_model()),
            IntrospectionPolicy::default(),
        )
        .unwrap();
        MetamodelService::new(Arc::new(loader))
    }

    fn clean() -> StaticSource {
        StaticSource::default().with(
            ClassDescriptor::new("crm.Customer")
                .annotate(Annotation::new(names::NAMED).with("value", "Client"))
                .method(MethodDescriptor::getter("getName", TypeRef::Text, "name")),
        )
    }

    fn broken() -> StaticSource {
        clean().with(
            ClassDescriptor::new("crm.Broken").method(MethodDescriptor::new("defaultAnInt", TypeRef::Int)),
        )
    }

    #[test]
    fn deployment_mode_parses() {
        assert_eq!("Production".parse::<DeploymentMode>().unwrap(), DeploymentMode::Production);
        assert_eq!(DeploymentMode::default(), DeploymentMode::Prototype);
        assert!("staging".parse::<DeploymentMode>().is_err());
    }

    #[test]
    fn prototype_returns_the_report() {
        let report = service(broken()).build(DeploymentMode::Prototype).unwrap();
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn production_aborts_on_errors() {
        let err = service(broken()).build(DeploymentMode::Production).unwrap_err();
        assert!(matches!(
            err,
            MetamodelError::Application(ApplicationError::ValidationAborted { errors: 1, .. })
        ));
        assert!(service(clean()).build(DeploymentMode::Production).is_ok());
    }

    #[test]
    fn describe_summarises_facets_and_members() {
        let summary = service(clean()).describe("crm.Customer").unwrap();
        assert_eq!(summary.singular_name, "Client");
        assert_eq!(summary.plural_name, "Clients");
        assert_eq!(summary.members.len(), 1);
        assert_eq!(summary.members[0].name, "Name");
        assert!(summary.superseded.iter().any(|s| s.facet.facet_type == FacetType::Named));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["members"][0]["feature_type"], "property");
        assert_eq!(json["members"][0]["type"], "string");
    }

    #[test]
    fn list_shows_state() {
        let service = service(clean());
        let before = service.list_classes().unwrap();
        assert_eq!(before[0].state, "unknown");
        assert_eq!(before[0].members, None);

        service.describe("crm.Customer").unwrap();
        let after = service.list_classes().unwrap();
        assert_eq!(after[0].state, "introspected");
        assert_eq!(after[0].members, Some(1));
    }
}
