//! Eligibility gate: marked AND in a recognized category

use crate::category;
use crate::model::ClassModel;
use crate::transformer::TransformError;

/// Decide whether a class is a transformation candidate
///
/// The marker is checked first, so unmarked classes never trigger hierarchy
/// resolution. A resolution failure is a classification error for this class.
pub fn admit(class: &dyn ClassModel, marker_annotation: &str) -> Result<bool, TransformError> {
    if !class.has_annotation(marker_annotation) {
        return Ok(false);
    }
    category::is_any_category(class).map_err(|source| TransformError::Classification {
        class: class.name().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodDescriptor, ResolutionError};
    use std::cell::Cell;

    const MARKER: &str = "com.acme.Traced";

    struct Candidate {
        marked: bool,
        screen: Result<bool, ResolutionError>,
        lookups: Cell<usize>,
    }

    impl Candidate {
        fn new(marked: bool, screen: Result<bool, ResolutionError>) -> Self {
            Self {
                marked,
                screen,
                lookups: Cell::new(0),
            }
        }
    }

    impl ClassModel for Candidate {
        fn name(&self) -> &str {
            "com.example.Candidate"
        }

        fn has_annotation(&self, annotation: &str) -> bool {
            self.marked && annotation == MARKER
        }

        fn is_subtype_of(&self, type_name: &str) -> Result<bool, ResolutionError> {
            self.lookups.set(self.lookups.get() + 1);
            if type_name == "android.app.Activity" {
                self.screen.clone()
            } else {
                Ok(false)
            }
        }

        fn declared_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
            Ok(Vec::new())
        }

        fn all_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_marked_screen_admitted() {
        assert!(admit(&Candidate::new(true, Ok(true)), MARKER).unwrap());
    }

    #[test]
    fn test_unmarked_rejected_without_lookup() {
        let class = Candidate::new(false, Ok(true));
        assert!(!admit(&class, MARKER).unwrap());
        assert_eq!(class.lookups.get(), 0);
    }

    #[test]
    fn test_other_marker_rejected() {
        assert!(!admit(&Candidate::new(true, Ok(true)), "com.acme.Other").unwrap());
    }

    #[test]
    fn test_marked_without_category_rejected() {
        let class = Candidate::new(true, Ok(false));
        assert!(!admit(&class, MARKER).unwrap());
        assert_eq!(class.lookups.get(), 8);
    }

    #[test]
    fn test_resolution_failure_is_classification_error() {
        let class = Candidate::new(
            true,
            Err(ResolutionError::Hierarchy {
                class: "com.example.Candidate".to_string(),
                reason: "superclass missing".to_string(),
            }),
        );
        let err = admit(&class, MARKER).unwrap_err();
        assert!(matches!(err, TransformError::Classification { .. }));
        assert!(err.to_string().contains("com.example.Candidate"));
    }
}
