//! Lifecycle transformer: drives gate, collection, filtering and weaving for one class
//!
//! Failure containment has two tiers:
//! - class level: classification or collection errors abort the class and
//!   surface as [`TransformError`]; nothing is woven
//! - method level: a weave failure is recorded as [`InjectionOutcome::Failed`]
//!   and the remaining methods are still processed
//!
//! The transformer keeps no mutable state. Classes can be transformed
//! concurrently as long as the weaver is `Sync`.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

use crate::category::{self, Category};
use crate::collector;
use crate::config::TransformerConfig;
use crate::filter::{self, SkipReason};
use crate::gate;
use crate::model::{ClassModel, MethodDescriptor, MethodId, MethodOrigin, ResolutionError};
use crate::statement;
use crate::weaver::Weaver;

/// Fatal failure for one class; the class is left untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("classification failed for {class}")]
    Classification {
        class: String,
        source: ResolutionError,
    },

    #[error("method collection failed for {class}")]
    Collection {
        class: String,
        source: ResolutionError,
    },
}

impl TransformError {
    /// Name of the class that failed
    pub fn class_name(&self) -> &str {
        match self {
            TransformError::Classification { class, .. }
            | TransformError::Collection { class, .. } => class,
        }
    }
}

/// Render an error with its full cause chain, `outer: inner: root`
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        cause = inner.source();
    }
    out
}

/// Result of processing one candidate method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum InjectionOutcome {
    Injected,
    SkippedFinal,
    SkippedNotOverridable,
    SkippedNamingConvention,
    Failed { error: String },
}

impl InjectionOutcome {
    pub fn is_injected(&self) -> bool {
        matches!(self, InjectionOutcome::Injected)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            InjectionOutcome::SkippedFinal
                | InjectionOutcome::SkippedNotOverridable
                | InjectionOutcome::SkippedNamingConvention
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, InjectionOutcome::Failed { .. })
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            InjectionOutcome::Injected => "injected",
            InjectionOutcome::SkippedFinal => "skipped (final)",
            InjectionOutcome::SkippedNotOverridable => "skipped (private)",
            InjectionOutcome::SkippedNamingConvention => "skipped (naming)",
            InjectionOutcome::Failed { .. } => "failed",
        }
    }
}

impl From<SkipReason> for InjectionOutcome {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::Final => InjectionOutcome::SkippedFinal,
            SkipReason::NotOverridable => InjectionOutcome::SkippedNotOverridable,
            SkipReason::NamingConvention => InjectionOutcome::SkippedNamingConvention,
        }
    }
}

/// Outcome for one method of a transformed class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReport {
    pub method: MethodId,
    pub origin: MethodOrigin,
    #[serde(flatten)]
    pub outcome: InjectionOutcome,
}

/// Whether the transformer touched the class at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// Rejected by the eligibility gate; nothing attempted
    NotApplicable,
    /// Admitted and processed; individual methods may still have failed
    Transformed,
}

/// Per-class transformation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class_name: String,
    pub status: ClassStatus,
    pub categories: Vec<Category>,
    pub methods: Vec<MethodReport>,
}

impl ClassReport {
    fn not_applicable(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            status: ClassStatus::NotApplicable,
            categories: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Methods that received the trace statement
    pub fn injected(&self) -> impl Iterator<Item = &MethodReport> {
        self.methods.iter().filter(|m| m.outcome.is_injected())
    }

    pub fn injected_count(&self) -> usize {
        self.injected().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.methods.iter().filter(|m| m.outcome.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.methods.iter().filter(|m| m.outcome.is_failed()).count()
    }

    /// Outcome recorded for the first method with this name
    pub fn outcome_of(&self, method_name: &str) -> Option<&InjectionOutcome> {
        self.methods
            .iter()
            .find(|m| m.method.name == method_name)
            .map(|m| &m.outcome)
    }
}

/// Injects lifecycle trace statements into admitted classes
#[derive(Debug)]
pub struct LifecycleTransformer<W> {
    weaver: W,
    config: TransformerConfig,
}

impl<W: Weaver> LifecycleTransformer<W> {
    pub fn new(weaver: W, config: TransformerConfig) -> Self {
        Self { weaver, config }
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    pub fn weaver(&self) -> &W {
        &self.weaver
    }

    /// Cheap pre-check used by the host pipeline before [`Self::transform`]
    ///
    /// Never modifies the class.
    pub fn should_transform(&self, class: &dyn ClassModel) -> Result<bool, TransformError> {
        match gate::admit(class, &self.config.marker_annotation) {
            Ok(admitted) => Ok(admitted),
            Err(e) => {
                self.log_more_if_debug(
                    &format!("Should transform filter failed for class {}", class.name()),
                    &e,
                );
                Err(e)
            }
        }
    }

    /// Instrument every eligible lifecycle method of the class
    ///
    /// Returns a `NotApplicable` report for classes the gate rejects.
    pub fn transform(&self, class: &dyn ClassModel) -> Result<ClassReport, TransformError> {
        if !self.should_transform(class)? {
            return Ok(ClassReport::not_applicable(class.name()));
        }
        self.transform_admitted(class)
    }

    /// [`Self::transform`] for a class the gate already admitted
    pub(crate) fn transform_admitted(
        &self,
        class: &dyn ClassModel,
    ) -> Result<ClassReport, TransformError> {
        let class_name = class.name();
        tracing::info!("Transforming {}", class_name);
        let result = self.collect(class);
        let (categories, candidates) = match result {
            Ok(collected) => collected,
            Err(e) => {
                self.log_more_if_debug(
                    &format!("Transformation failed for class {}", class_name),
                    &e,
                );
                return Err(e);
            }
        };

        let methods: Vec<MethodReport> = candidates
            .iter()
            .map(|method| MethodReport {
                method: method.id(),
                origin: method.origin.clone(),
                outcome: self.instrument(class, method),
            })
            .collect();

        let report = ClassReport {
            class_name: class_name.to_string(),
            status: ClassStatus::Transformed,
            categories,
            methods,
        };
        log_summary(&report);
        Ok(report)
    }

    fn collect(
        &self,
        class: &dyn ClassModel,
    ) -> Result<(Vec<Category>, collector::CandidateMethodSet), TransformError> {
        let candidates = collector::collect(class).map_err(|source| TransformError::Collection {
            class: class.name().to_string(),
            source,
        })?;
        let categories =
            category::matching_categories(class).map_err(|source| TransformError::Classification {
                class: class.name().to_string(),
                source,
            })?;
        Ok((categories, candidates))
    }

    fn instrument(&self, class: &dyn ClassModel, method: &MethodDescriptor) -> InjectionOutcome {
        if let Err(reason) = filter::check(method) {
            tracing::info!("Skipping {}: {}", method.name, reason);
            return reason.into();
        }

        tracing::info!("Overriding {}", method.name);
        let body = statement::generate(class.name(), &method.name);
        match self.weaver.append_statement_to_override(class, method, &body) {
            Ok(()) => {
                tracing::info!("Override successful {}", method.name);
                InjectionOutcome::Injected
            }
            Err(e) => {
                self.log_more_if_debug(&format!("Override didn't work for {}", method.id()), &e);
                InjectionOutcome::Failed {
                    error: error_chain(&e),
                }
            }
        }
    }

    fn log_more_if_debug(&self, message: &str, err: &dyn StdError) {
        if self.config.debug {
            tracing::debug!("{}: {}", message, error_chain(err));
        } else {
            tracing::warn!("{}", message);
        }
    }
}

fn log_summary(report: &ClassReport) {
    tracing::info!(
        "Transformation successful for {}: {} injected, {} skipped, {} failed",
        report.class_name,
        report.injected_count(),
        report.skipped_count(),
        report.failed_count()
    );
    for method in &report.methods {
        tracing::debug!("  {} {}", method.method, method.outcome.label());
    }
}
