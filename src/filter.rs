//! Overridability filter for candidate lifecycle methods
//!
//! A method is instrumented only when it can be overridden from a subclass
//! and follows the `on...` callback naming convention. Rejection is a normal
//! skip, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{MethodDescriptor, Visibility};

/// Prefix shared by framework lifecycle callbacks (case-sensitive)
pub const LIFECYCLE_PREFIX: &str = "on";

/// Why a candidate method was not instrumented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Declared final, cannot be overridden
    Final,
    /// Private, invisible to subclasses
    NotOverridable,
    /// Name does not start with `on`
    NamingConvention,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Final => "method is final",
            SkipReason::NotOverridable => "method is private",
            SkipReason::NamingConvention => "name does not start with 'on'",
        };
        f.write_str(s)
    }
}

/// Check a method, returning the first reason it must be skipped
///
/// Finality is checked before visibility, visibility before naming.
pub fn check(method: &MethodDescriptor) -> Result<(), SkipReason> {
    if method.is_final {
        return Err(SkipReason::Final);
    }
    if method.visibility == Visibility::Private {
        return Err(SkipReason::NotOverridable);
    }
    // Literal prefix match: `onward` qualifies just like `onResume`.
    if !method.name.starts_with(LIFECYCLE_PREFIX) {
        return Err(SkipReason::NamingConvention);
    }
    Ok(())
}

/// Whether the method should be instrumented
pub fn is_eligible(method: &MethodDescriptor) -> bool {
    check(method).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MethodOrigin;

    fn method(name: &str, visibility: Visibility, is_final: bool) -> MethodDescriptor {
        MethodDescriptor::new(name, "()V", visibility, is_final, MethodOrigin::Declared)
    }

    #[test]
    fn test_public_lifecycle_method_is_eligible() {
        assert!(is_eligible(&method("onCreate", Visibility::Public, false)));
    }

    #[test]
    fn test_protected_and_package_are_eligible() {
        assert!(is_eligible(&method("onPause", Visibility::Protected, false)));
        assert!(is_eligible(&method("onLowMemory", Visibility::Package, false)));
    }

    #[test]
    fn test_private_is_rejected() {
        assert_eq!(
            check(&method("onStop", Visibility::Private, false)),
            Err(SkipReason::NotOverridable)
        );
    }

    #[test]
    fn test_final_is_rejected() {
        assert_eq!(
            check(&method("onDestroy", Visibility::Public, true)),
            Err(SkipReason::Final)
        );
    }

    #[test]
    fn test_final_takes_precedence_over_private() {
        assert_eq!(
            check(&method("onStop", Visibility::Private, true)),
            Err(SkipReason::Final)
        );
    }

    #[test]
    fn test_naming_convention() {
        assert_eq!(
            check(&method("handleClick", Visibility::Public, false)),
            Err(SkipReason::NamingConvention)
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(!is_eligible(&method("OnCreate", Visibility::Public, false)));
        assert!(!is_eligible(&method("ON_START", Visibility::Public, false)));
    }

    #[test]
    fn test_prefix_match_admits_non_callbacks() {
        // Known boundary: the prefix alone decides, so `onward` and bare `on` pass.
        assert!(is_eligible(&method("onward", Visibility::Public, false)));
        assert!(is_eligible(&method("on", Visibility::Public, false)));
        assert!(!is_eligible(&method("o", Visibility::Public, false)));
        assert!(!is_eligible(&method("", Visibility::Public, false)));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Final.to_string(), "method is final");
        assert!(SkipReason::NamingConvention.to_string().contains("'on'"));
    }
}
