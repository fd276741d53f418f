//! Candidate method collection
//!
//! Merges a class's declared and inherited methods into one set keyed by
//! [`MethodId`]. A method overridden in the class shows up in both lists;
//! it must be instrumented once.

use std::collections::btree_map::{self, BTreeMap};

use crate::model::{ClassModel, MethodDescriptor, MethodId, MethodOrigin, ResolutionError};

/// Duplicate-free set of methods, unique by name and signature
///
/// Iteration is sorted by identity so reports are reproducible; no
/// downstream logic depends on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMethodSet {
    methods: BTreeMap<MethodId, MethodDescriptor>,
}

impl CandidateMethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method; on identity collision a declared method replaces an inherited one
    pub fn insert(&mut self, method: MethodDescriptor) {
        match self.methods.entry(method.id()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(method);
            }
            btree_map::Entry::Occupied(mut slot) => {
                if method.origin == MethodOrigin::Declared {
                    slot.insert(method);
                }
            }
        }
    }

    /// Set union by identity
    pub fn union(mut self, other: CandidateMethodSet) -> CandidateMethodSet {
        for method in other.methods.into_values() {
            self.insert(method);
        }
        self
    }

    pub fn contains(&self, id: &MethodId) -> bool {
        self.methods.contains_key(id)
    }

    pub fn get(&self, id: &MethodId) -> Option<&MethodDescriptor> {
        self.methods.get(id)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }
}

impl FromIterator<MethodDescriptor> for CandidateMethodSet {
    fn from_iter<I: IntoIterator<Item = MethodDescriptor>>(iter: I) -> Self {
        let mut set = CandidateMethodSet::new();
        for method in iter {
            set.insert(method);
        }
        set
    }
}

impl IntoIterator for CandidateMethodSet {
    type Item = MethodDescriptor;
    type IntoIter = btree_map::IntoValues<MethodId, MethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.into_values()
    }
}

/// Collect declared and inherited methods of a class into one set
///
/// Fails as a whole if the provider cannot resolve the class hierarchy.
pub fn collect(class: &dyn ClassModel) -> Result<CandidateMethodSet, ResolutionError> {
    let all: CandidateMethodSet = class.all_methods()?.into_iter().collect();
    let declared: CandidateMethodSet = class.declared_methods()?.into_iter().collect();
    let set = all.union(declared);
    tracing::debug!("{}: {} candidate methods", class.name(), set.len());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;

    fn declared(name: &str, sig: &str) -> MethodDescriptor {
        MethodDescriptor::new(name, sig, Visibility::Public, false, MethodOrigin::Declared)
    }

    fn inherited(name: &str, sig: &str) -> MethodDescriptor {
        MethodDescriptor::new(
            name,
            sig,
            Visibility::Protected,
            false,
            MethodOrigin::Inherited {
                owner: "android.app.Activity".to_string(),
            },
        )
    }

    struct Listed {
        declared: Vec<MethodDescriptor>,
        all: Result<Vec<MethodDescriptor>, ResolutionError>,
    }

    impl ClassModel for Listed {
        fn name(&self) -> &str {
            "com.example.Listed"
        }

        fn has_annotation(&self, _annotation: &str) -> bool {
            true
        }

        fn is_subtype_of(&self, _type_name: &str) -> Result<bool, ResolutionError> {
            Ok(true)
        }

        fn declared_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
            Ok(self.declared.clone())
        }

        fn all_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
            self.all.clone()
        }
    }

    #[test]
    fn test_declared_and_inherited_collapse() {
        let mut set = CandidateMethodSet::new();
        set.insert(inherited("onCreate", "(Landroid/os/Bundle;)V"));
        set.insert(declared("onCreate", "(Landroid/os/Bundle;)V"));
        assert_eq!(set.len(), 1);
        let only = set.iter().next().unwrap();
        assert_eq!(only.origin, MethodOrigin::Declared);
    }

    #[test]
    fn test_inherited_does_not_replace_declared() {
        let mut set = CandidateMethodSet::new();
        set.insert(declared("onStart", "()V"));
        set.insert(inherited("onStart", "()V"));
        assert_eq!(set.iter().next().unwrap().origin, MethodOrigin::Declared);
    }

    #[test]
    fn test_overloads_kept_apart() {
        let set: CandidateMethodSet =
            vec![declared("onKeyDown", "(I)Z"), declared("onKeyDown", "()Z")]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_union_is_idempotent() {
        let a: CandidateMethodSet = vec![declared("onCreate", "()V"), inherited("onPause", "()V")]
            .into_iter()
            .collect();
        let twice = a.clone().union(a.clone());
        assert_eq!(twice, a);
    }

    #[test]
    fn test_union_ignores_order() {
        let left: CandidateMethodSet = vec![declared("onA", "()V"), declared("onB", "()V")]
            .into_iter()
            .collect();
        let right: CandidateMethodSet = vec![declared("onB", "()V"), declared("onA", "()V")]
            .into_iter()
            .collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_collect_merges_lists() {
        let class = Listed {
            declared: vec![declared("onCreate", "()V"), declared("handleClick", "()V")],
            all: Ok(vec![
                inherited("onCreate", "()V"),
                inherited("onResume", "()V"),
                inherited("onResume", "()V"),
                declared("handleClick", "()V"),
            ]),
        };
        let set = collect(&class).unwrap();
        assert_eq!(set.len(), 3);
        let names: Vec<_> = set.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["handleClick", "onCreate", "onResume"]);
        let on_create = set
            .get(&MethodId {
                name: "onCreate".to_string(),
                signature: "()V".to_string(),
            })
            .unwrap();
        assert_eq!(on_create.origin, MethodOrigin::Declared);
    }

    #[test]
    fn test_collect_fails_as_a_whole() {
        let class = Listed {
            declared: vec![declared("onCreate", "()V")],
            all: Err(ResolutionError::ClassNotFound {
                class: "android.app.Activity".to_string(),
                referenced_by: "com.example.Listed".to_string(),
            }),
        };
        assert!(collect(&class).is_err());
    }
}
