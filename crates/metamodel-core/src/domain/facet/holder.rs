//! The per-element facet container and its precedence protocol.

use std::collections::BTreeMap;

use crate::domain::facet::{Facet, FacetOrigin, FacetType, TypedFacet};
use crate::domain::identifier::Identifier;
use crate::domain::value_objects::{FeatureType, Precedence};

/// What [`FacetHolder::add_facet`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetOutcome {
    /// No facet of this type was held.
    Added,
    /// The candidate outranked the held facet.
    Replaced,
    /// The held facet outranked the candidate.
    Outranked,
    /// Equal precedence and semantically equal: nothing changed.
    Redundant,
    /// Equal precedence but different behaviour: the candidate won.
    TieBreak,
}

impl FacetOutcome {
    /// Whether the candidate is now the active facet.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Added | Self::Replaced | Self::TieBreak)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupersessionReason {
    /// Replaced by a higher-precedence facet.
    Replaced,
    /// Rejected on arrival because a higher-precedence facet was held.
    Outranked,
    /// Lost an equal-precedence tie to a later registration.
    TieBreak,
}

impl SupersessionReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replaced => "replaced",
            Self::Outranked => "outranked",
            Self::TieBreak => "tie-break",
        }
    }
}

/// A facet that lost to the active one, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SupersededFacet {
    pub facet: Facet,
    pub reason: SupersessionReason,
    /// Origin of the facet that won at the time.
    pub winner: FacetOrigin,
}

/// Two semantically different facets with equal precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetConflict {
    pub facet_type: FacetType,
    pub precedence: Precedence,
    pub kept: FacetOrigin,
    pub discarded: FacetOrigin,
}

impl FacetConflict {
    pub fn message(&self) -> String {
        format!(
            "conflicting {} facets at precedence {}: {} wins over {}",
            self.facet_type, self.precedence, self.kept, self.discarded
        )
    }
}

/// Facets of one model element.
///
/// Holds at most one active facet per [`FacetType`]. Losing facets are kept
/// in a superseded list. Once the owning specification is cached the holder
/// is only ever read.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetHolder {
    identifier: Identifier,
    feature_type: FeatureType,
    facets: BTreeMap<FacetType, Facet>,
    superseded: BTreeMap<FacetType, Vec<SupersededFacet>>,
    conflicts: Vec<FacetConflict>,
}

impl FacetHolder {
    pub fn new(identifier: Identifier, feature_type: FeatureType) -> Self {
        Self {
            identifier,
            feature_type,
            facets: BTreeMap::new(),
            superseded: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    /// Offer `candidate` to the holder.
    ///
    /// * higher precedence than the held facet: replaces it;
    /// * lower: discarded, recorded as superseded;
    /// * equal and semantically equal: no-op;
    /// * equal and different: the candidate wins, the held facet is recorded
    ///   as superseded and a [`FacetConflict`] is noted.
    pub fn add_facet(&mut self, candidate: Facet) -> FacetOutcome {
        let facet_type = candidate.facet_type();

        let Some(held) = self.facets.get(&facet_type) else {
            self.facets.insert(facet_type, candidate);
            return FacetOutcome::Added;
        };

        if candidate.precedence() > held.precedence() {
            self.replace(candidate, SupersessionReason::Replaced);
            return FacetOutcome::Replaced;
        }

        if candidate.precedence() < held.precedence() {
            let winner = held.origin().clone();
            self.superseded
                .entry(facet_type)
                .or_default()
                .push(SupersededFacet {
                    facet: candidate,
                    reason: SupersessionReason::Outranked,
                    winner,
                });
            return FacetOutcome::Outranked;
        }

        if candidate.semantically_equals(held) {
            return FacetOutcome::Redundant;
        }

        self.conflicts.push(FacetConflict {
            facet_type,
            precedence: candidate.precedence(),
            kept: candidate.origin().clone(),
            discarded: held.origin().clone(),
        });
        self.replace(candidate, SupersessionReason::TieBreak);
        FacetOutcome::TieBreak
    }

    fn replace(&mut self, candidate: Facet, reason: SupersessionReason) {
        let facet_type = candidate.facet_type();
        let winner = candidate.origin().clone();
        if let Some(old) = self.facets.insert(facet_type, candidate) {
            self.superseded
                .entry(facet_type)
                .or_default()
                .push(SupersededFacet {
                    facet: old,
                    reason,
                    winner,
                });
        }
    }

    pub fn get_facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.facets.get(&facet_type)
    }

    /// Typed payload of the active facet: `holder.get::<TitleFacet>()`.
    pub fn get<T: TypedFacet>(&self) -> Option<&T> {
        self.facets.get(&T::TYPE).and_then(Facet::payload::<T>)
    }

    pub fn contains(&self, facet_type: FacetType) -> bool {
        self.facets.contains_key(&facet_type)
    }

    pub fn has<T: TypedFacet>(&self) -> bool {
        self.contains(T::TYPE)
    }

    /// Active facets in [`FacetType`] order.
    pub fn facets(&self) -> impl Iterator<Item = &Facet> {
        self.facets.values()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    pub fn superseded(&self, facet_type: FacetType) -> &[SupersededFacet] {
        self.superseded
            .get(&facet_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_superseded(&self) -> impl Iterator<Item = &SupersededFacet> {
        self.superseded.values().flatten()
    }

    pub fn conflicts(&self) -> &[FacetConflict] {
        &self.conflicts
    }
}
