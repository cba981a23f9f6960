//! The still-available methods of a class under introspection.

use std::collections::BTreeSet;

use crate::domain::{MethodDescriptor, MethodSignature, TypeRef};

/// Methods of one (flattened) class that no factory has claimed yet.
///
/// Removal is monotonic: a removed method is never offered again during the
/// same introspection. Iteration order is by signature, so every run sees
/// the methods in the same order.
#[derive(Debug, Clone)]
pub struct MethodPool {
    methods: Vec<MethodDescriptor>,
    removed: BTreeSet<MethodSignature>,
}

impl MethodPool {
    pub fn new(mut methods: Vec<MethodDescriptor>) -> Self {
        methods.sort_by_key(MethodDescriptor::signature);
        methods.dedup_by_key(|m| m.signature());
        Self {
            methods,
            removed: BTreeSet::new(),
        }
    }

    pub fn available(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods
            .iter()
            .filter(|m| !self.removed.contains(&m.signature()))
    }

    pub fn available_count(&self) -> usize {
        self.available().count()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// First available method called `name` taking `param_count` parameters.
    pub fn find(&self, name: &str, param_count: usize) -> Option<&MethodDescriptor> {
        self.available()
            .find(|m| m.name == name && m.param_count() == param_count)
    }

    pub fn find_exact(&self, name: &str, params: &[TypeRef]) -> Option<&MethodDescriptor> {
        self.available().find(|m| {
            m.name == name
                && m.params.len() == params.len()
                && m.params.iter().zip(params).all(|(p, ty)| &p.ty == ty)
        })
    }

    /// Every available method called `name`, whatever its parameters.
    pub fn find_all(&self, name: &str) -> Vec<&MethodDescriptor> {
        self.available().filter(|m| m.name == name).collect()
    }

    /// Find and remove in one step.
    pub fn take(&mut self, name: &str, param_count: usize) -> Option<MethodDescriptor> {
        let method = self.find(name, param_count)?.clone();
        self.removed.insert(method.signature());
        Some(method)
    }

    pub fn take_exact(&mut self, name: &str, params: &[TypeRef]) -> Option<MethodDescriptor> {
        let method = self.find_exact(name, params)?.clone();
        self.removed.insert(method.signature());
        Some(method)
    }

    /// Remove by signature. Returns whether the method was still available.
    pub fn remove(&mut self, signature: &MethodSignature) -> bool {
        if !self.methods.iter().any(|m| &m.signature() == signature) {
            return false;
        }
        self.removed.insert(signature.clone())
    }

    /// Remove every available method matching `predicate`; returns the
    /// removed signatures.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<MethodSignature>
    where
        F: FnMut(&MethodDescriptor) -> bool,
    {
        let doomed: Vec<_> = self
            .available()
            .filter(|m| predicate(m))
            .map(MethodDescriptor::signature)
            .collect();
        self.removed.extend(doomed.iter().cloned());
        doomed
    }

    pub fn is_available(&self, signature: &MethodSignature) -> bool {
        !self.removed.contains(signature) && self.methods.iter().any(|m| &m.signature() == signature)
    }

    pub fn was_removed(&self, signature: &MethodSignature) -> bool {
        self.removed.contains(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> MethodPool {
        MethodPool::new(vec![
            MethodDescriptor::new("getName", TypeRef::Text),
            MethodDescriptor::new("placeOrder", TypeRef::Void).param(TypeRef::Int),
            MethodDescriptor::new("placeOrder", TypeRef::Void),
            MethodDescriptor::new("hideName", TypeRef::Boolean),
        ])
    }

    #[test]
    fn iteration_is_sorted_by_signature() {
        let names: Vec<_> = pool().available().map(|m| m.signature().to_string()).collect();
        assert_eq!(names, ["getName()", "hideName()", "placeOrder()", "placeOrder(int)"]);
    }

    #[test]
    fn overloads_are_told_apart() {
        let pool = pool();
        assert!(pool.find("placeOrder", 1).is_some());
        assert!(pool.find_exact("placeOrder", &[TypeRef::Text]).is_none());
        assert_eq!(pool.find_all("placeOrder").len(), 2);
    }

    #[test]
    fn removal_is_monotonic() {
        let mut pool = pool();
        let taken = pool.take("hideName", 0).unwrap();
        assert!(pool.was_removed(&taken.signature()));
        assert!(pool.find("hideName", 0).is_none());
        assert!(!pool.remove(&taken.signature()));
        assert!(pool.take("hideName", 0).is_none());
        assert_eq!(pool.available_count(), 3);
    }

    #[test]
    fn remove_where_reports_what_it_removed() {
        let mut pool = pool();
        let removed = pool.remove_where(|m| m.name.starts_with("place"));
        assert_eq!(removed.len(), 2);
        assert_eq!(pool.available_count(), 2);
        assert!(pool.remove_where(|m| m.name.starts_with("place")).is_empty());
    }

    #[test]
    fn unknown_signatures_are_not_removed() {
        let mut pool = pool();
        let ghost = MethodSignature::new("ghost", vec![]);
        assert!(!pool.remove(&ghost));
        assert!(!pool.was_removed(&ghost));
        assert!(!pool.is_available(&ghost));
    }
}
