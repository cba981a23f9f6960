//! Navigation up the `@Parent` chain of a domain object.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::application::services::SpecificationLoader;
use crate::domain::DomainObject;
use crate::error::MetamodelResult;

/// Longest chain [`ParentChain::walk`] will follow.
pub const MAX_PARENT_CHAIN_LENGTH: usize = 64;

pub struct ParentChain;

impl ParentChain {
    /// Ancestors of `obj`, nearest first, excluding `obj` itself.
    ///
    /// Stops at the first object without a parent, at the first object
    /// already visited, or after [`MAX_PARENT_CHAIN_LENGTH`] steps, so the
    /// result is finite even for cyclic object graphs.
    pub fn walk(obj: &DomainObject, loader: &SpecificationLoader) -> MetamodelResult<Vec<Arc<DomainObject>>> {
        let mut visited = HashSet::from([obj.identity()]);
        let mut chain: Vec<Arc<DomainObject>> = Vec::new();

        loop {
            let current = chain.last().map_or(obj, |last| last.as_ref());
            let spec = loader.load_specification(current.class_name())?;
            let Some(parent) = spec.navigable_parent(current) else {
                break;
            };
            if !visited.insert(parent.identity()) {
                warn!(object = %parent.identity(), "parent chain revisits an object");
                break;
            }
            chain.push(parent);
            if chain.len() >= MAX_PARENT_CHAIN_LENGTH {
                warn!(start = %obj.identity(), "parent chain truncated");
                break;
            }
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::programming_model::factories::test_support::StaticSource;
    use crate::application::programming_model::{IntrospectionPolicy, ProgrammingModel};
    use crate::domain::{Annotation, ClassDescriptor, MethodDescriptor, TypeRef, Value, names};

    fn folder_loader() -> SpecificationLoader {
        let folder = ClassDescriptor::new("fs.Folder").method(
            MethodDescriptor::getter("getParent", TypeRef::class("fs.Folder"), "parent")
                .annotate(Annotation::new(names::PARENT)),
        );
        SpecificationLoader::new(
            Arc::new(StaticSource::default().with(folder)),
            Arc::new(ProgrammingModel::default_model()),
            IntrospectionPolicy::default(),
        )
        .unwrap()
    }

    fn folder(id: &str, parent: Option<DomainObject>) -> DomainObject {
        let obj = DomainObject::new("fs.Folder", id);
        match parent {
            Some(parent) => obj.with_field("parent", parent),
            None => obj.with_field("parent", Value::Null),
        }
    }

    #[test]
    fn walks_to_the_root() {
        let loader = folder_loader();
        let root = folder("root", None);
        let home = folder("home", Some(root));
        let docs = folder("docs", Some(home));

        let chain = ParentChain::walk(&docs, &loader).unwrap();
        let ids: Vec<_> = chain.iter().map(|o| o.id().to_string()).collect();
        assert_eq!(ids, ["home", "root"]);
    }

    #[test]
    fn self_parent_terminates() {
        let loader = folder_loader();
        let ouroboros = folder("loop", Some(DomainObject::new("fs.Folder", "loop")));

        let chain = ParentChain::walk(&ouroboros, &loader).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn two_cycle_terminates() {
        let loader = folder_loader();
        // a -> b -> a, where the second `a` has the same identity as the start
        let b = folder("b", Some(DomainObject::new("fs.Folder", "a")));
        let a = folder("a", Some(b));

        let chain = ParentChain::walk(&a, &loader).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id(), "b");
    }

    #[test]
    fn long_chains_are_truncated() {
        let loader = folder_loader();
        let mut obj = folder("f0", None);
        for i in 1..=100 {
            obj = folder(&format!("f{i}"), Some(obj));
        }

        let chain = ParentChain::walk(&obj, &loader).unwrap();
        assert_eq!(chain.len(), MAX_PARENT_CHAIN_LENGTH);
    }
}
