//! Class model provider seam
//!
//! The core never looks at class-file bytes. Everything it needs (names,
//! annotations, type hierarchy, method lists) comes through [`ClassModel`],
//! which a class pool implements. See [`crate::pool`] for the in-memory one.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::category::Category;

/// JVM `ACC_PUBLIC`
pub const ACC_PUBLIC: u16 = 0x0001;
/// JVM `ACC_PRIVATE`
pub const ACC_PRIVATE: u16 = 0x0002;
/// JVM `ACC_PROTECTED`
pub const ACC_PROTECTED: u16 = 0x0004;
/// JVM `ACC_STATIC`
pub const ACC_STATIC: u16 = 0x0008;
/// JVM `ACC_FINAL`
pub const ACC_FINAL: u16 = 0x0010;
/// JVM `ACC_ABSTRACT`
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Failure to resolve part of a class hierarchy (usually a classpath gap)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("class not found: {class} (referenced by {referenced_by})")]
    ClassNotFound { class: String, referenced_by: String },

    #[error("cannot resolve hierarchy of {class}: {reason}")]
    Hierarchy { class: String, reason: String },
}

/// Method visibility as encoded in the access flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    /// No access modifier (package-private)
    Package,
    Private,
}

impl Visibility {
    /// Decode visibility from JVM access flags
    ///
    /// A method with none of public/private/protected set is package-private.
    pub fn from_access_flags(flags: u16) -> Self {
        if flags & ACC_PUBLIC != 0 {
            Visibility::Public
        } else if flags & ACC_PROTECTED != 0 {
            Visibility::Protected
        } else if flags & ACC_PRIVATE != 0 {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

/// Where a method came from when it was enumerated
///
/// Informational only; never part of a method's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MethodOrigin {
    Declared,
    Inherited { owner: String },
}

/// Identity of a method: simple name plus JVM descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub name: String,
    pub signature: String,
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

/// Read-only view of a method on a compiled class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// JVM method descriptor, e.g. `(Landroid/os/Bundle;)V`
    pub signature: String,
    pub visibility: Visibility,
    pub is_final: bool,
    /// Static methods have no receiver and cannot be overridden
    pub is_static: bool,
    /// Abstract methods have no body to append to or call through to
    pub is_abstract: bool,
    pub origin: MethodOrigin,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        visibility: Visibility,
        is_final: bool,
        origin: MethodOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            visibility,
            is_final,
            is_static: false,
            is_abstract: false,
            origin,
        }
    }

    /// Build a descriptor from raw JVM access flags
    pub fn from_access_flags(
        name: impl Into<String>,
        signature: impl Into<String>,
        flags: u16,
        origin: MethodOrigin,
    ) -> Self {
        Self {
            is_static: flags & ACC_STATIC != 0,
            is_abstract: flags & ACC_ABSTRACT != 0,
            ..Self::new(
                name,
                signature,
                Visibility::from_access_flags(flags),
                flags & ACC_FINAL != 0,
                origin,
            )
        }
    }

    pub fn id(&self) -> MethodId {
        MethodId {
            name: self.name.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// Handle to one compiled class, supplied by the class model provider
///
/// Implementations must be cheap to query repeatedly and must not cache
/// state across classes. Every query that walks the type hierarchy can fail
/// with a [`ResolutionError`].
pub trait ClassModel {
    /// Fully qualified class name (dotted form)
    fn name(&self) -> &str;

    /// Whether the class carries the given annotation
    fn has_annotation(&self, annotation: &str) -> bool;

    /// Whether this class is, extends, or implements `type_name`
    fn is_subtype_of(&self, type_name: &str) -> Result<bool, ResolutionError>;

    /// Methods declared directly on this class
    fn declared_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError>;

    /// Declared plus inherited methods; may contain the same identity twice
    fn all_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError>;

    /// Category membership, resolved against the category's framework base class
    fn resolve_category(&self, category: Category) -> Result<bool, ResolutionError> {
        self.is_subtype_of(category.base_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_access_flags() {
        assert_eq!(Visibility::from_access_flags(ACC_PUBLIC), Visibility::Public);
        assert_eq!(
            Visibility::from_access_flags(ACC_PROTECTED | ACC_FINAL),
            Visibility::Protected
        );
        assert_eq!(Visibility::from_access_flags(ACC_PRIVATE), Visibility::Private);
        assert_eq!(Visibility::from_access_flags(0), Visibility::Package);
        assert_eq!(Visibility::from_access_flags(ACC_FINAL), Visibility::Package);
    }

    #[test]
    fn test_descriptor_from_access_flags() {
        let m = MethodDescriptor::from_access_flags(
            "onDestroy",
            "()V",
            ACC_PUBLIC | ACC_FINAL,
            MethodOrigin::Declared,
        );
        assert_eq!(m.visibility, Visibility::Public);
        assert!(m.is_final);
        assert!(!m.is_static);
        assert!(!m.is_abstract);
    }

    #[test]
    fn test_descriptor_decodes_static_and_abstract() {
        let helper = MethodDescriptor::from_access_flags(
            "onlyHelper",
            "()V",
            ACC_PUBLIC | ACC_STATIC,
            MethodOrigin::Declared,
        );
        assert!(helper.is_static);
        assert!(!helper.is_abstract);
        assert_eq!(helper.visibility, Visibility::Public);

        let hook = MethodDescriptor::from_access_flags(
            "onBind",
            "(Landroid/content/Intent;)Landroid/os/IBinder;",
            ACC_PUBLIC | ACC_ABSTRACT,
            MethodOrigin::Declared,
        );
        assert!(hook.is_abstract);
        assert!(!hook.is_final);
    }

    #[test]
    fn test_identity_ignores_origin() {
        let declared = MethodDescriptor::new(
            "onCreate",
            "(Landroid/os/Bundle;)V",
            Visibility::Public,
            false,
            MethodOrigin::Declared,
        );
        let inherited = MethodDescriptor::new(
            "onCreate",
            "(Landroid/os/Bundle;)V",
            Visibility::Protected,
            false,
            MethodOrigin::Inherited {
                owner: "android.app.Activity".to_string(),
            },
        );
        assert_eq!(declared.id(), inherited.id());
    }

    #[test]
    fn test_identity_distinguishes_overloads() {
        let a = MethodDescriptor::new(
            "onKey",
            "()V",
            Visibility::Public,
            false,
            MethodOrigin::Declared,
        );
        let b = MethodDescriptor::new(
            "onKey",
            "(I)Z",
            Visibility::Public,
            false,
            MethodOrigin::Declared,
        );
        assert_ne!(a.id(), b.id());
        assert_eq!(b.id().to_string(), "onKey(I)Z");
    }

    #[test]
    fn test_resolution_error_display() {
        let err = ResolutionError::ClassNotFound {
            class: "android.app.Activity".to_string(),
            referenced_by: "com.example.Screen1".to_string(),
        };
        assert!(err.to_string().contains("android.app.Activity"));
        assert!(err.to_string().contains("com.example.Screen1"));
    }
}
