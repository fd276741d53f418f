//! Weaving seam
//!
//! A [`Weaver`] turns a trace statement into byte code at the end of an
//! override of a lifecycle method. The override calls through to the
//! inherited implementation first, so the component keeps its behaviour
//! and return value; the statement only adds the log line.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use crate::model::{ClassModel, MethodDescriptor, MethodOrigin};

/// Failure to weave one statement into one method
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeaveError {
    #[error("method {method} not found on {class}")]
    MethodNotFound { class: String, method: String },

    #[error("method {method} is final in the hierarchy of {class}")]
    FinalInHierarchy { class: String, method: String },

    #[error("method {method} cannot be overridden on {class}: {reason}")]
    NotOverridable {
        class: String,
        method: String,
        reason: String,
    },

    #[error("cannot compile statement for {class}.{method}: {reason}")]
    Compile {
        class: String,
        method: String,
        reason: String,
    },
}

/// Appends compiled statements to (possibly synthesized) method overrides
///
/// Implementations must be callable from several threads at once; the
/// transformer shares one weaver across classes.
pub trait Weaver {
    /// Append `statement` at the end of `method` on `class`
    ///
    /// Creates the override when the class only inherits the method. The
    /// override must invoke the super implementation before the statement.
    fn append_statement_to_override(
        &self,
        class: &dyn ClassModel,
        method: &MethodDescriptor,
        statement: &str,
    ) -> Result<(), WeaveError>;
}

impl<W: Weaver + ?Sized> Weaver for &W {
    fn append_statement_to_override(
        &self,
        class: &dyn ClassModel,
        method: &MethodDescriptor,
        statement: &str,
    ) -> Result<(), WeaveError> {
        (**self).append_statement_to_override(class, method, statement)
    }
}

/// One planned modification of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeavePatch {
    pub class: String,
    pub method: String,
    pub signature: String,
    pub statement: String,
    /// True when the class only inherits the method and needs a new override
    pub creates_override: bool,
}

/// Weaver that validates targets and records patches instead of rewriting classes
#[derive(Debug, Default)]
pub struct RecordingWeaver {
    patches: Mutex<Vec<WeavePatch>>,
}

impl RecordingWeaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded patches, sorted by class then method
    pub fn patches(&self) -> Vec<WeavePatch> {
        let mut patches = match self.patches.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        patches.sort_by(|a, b| {
            (&a.class, &a.method, &a.signature).cmp(&(&b.class, &b.method, &b.signature))
        });
        patches
    }

    fn record(&self, patch: WeavePatch) {
        match self.patches.lock() {
            Ok(mut guard) => guard.push(patch),
            Err(poisoned) => poisoned.into_inner().push(patch),
        }
    }
}

impl Weaver for RecordingWeaver {
    fn append_statement_to_override(
        &self,
        class: &dyn ClassModel,
        method: &MethodDescriptor,
        statement: &str,
    ) -> Result<(), WeaveError> {
        let class_name = class.name().to_string();
        let compile_err = |reason: String| WeaveError::Compile {
            class: class_name.clone(),
            method: method.name.clone(),
            reason,
        };

        if statement.trim().is_empty() || !statement.trim_end().ends_with(';') {
            return Err(compile_err("statement is not a complete Java statement".to_string()));
        }

        let methods = class
            .all_methods()
            .map_err(|e| compile_err(e.to_string()))?;

        let matching: Vec<_> = methods
            .iter()
            .filter(|m| m.name == method.name && m.signature == method.signature)
            .collect();
        if matching.is_empty() {
            return Err(WeaveError::MethodNotFound {
                class: class_name,
                method: method.id().to_string(),
            });
        }
        if matching.iter().any(|m| m.is_final) {
            return Err(WeaveError::FinalInHierarchy {
                class: class_name,
                method: method.id().to_string(),
            });
        }

        let not_overridable = |reason: &str| WeaveError::NotOverridable {
            class: class_name.clone(),
            method: method.id().to_string(),
            reason: reason.to_string(),
        };
        if matching.iter().any(|m| m.is_static) {
            return Err(not_overridable("static method has no instance"));
        }
        let declared = matching.iter().find(|m| m.origin == MethodOrigin::Declared);
        match declared {
            Some(m) if m.is_abstract => {
                return Err(not_overridable("abstract method has no body"))
            }
            None if matching.iter().all(|m| m.is_abstract) => {
                return Err(not_overridable("no super implementation to call"))
            }
            _ => {}
        }

        let creates_override = declared.is_none();
        tracing::trace!(
            "{}: {} {}",
            class_name,
            if creates_override { "new override" } else { "append to" },
            method.id()
        );
        self.record(WeavePatch {
            class: class_name,
            method: method.name.clone(),
            signature: method.signature.clone(),
            statement: statement.to_string(),
            creates_override,
        });
        Ok(())
    }
}
