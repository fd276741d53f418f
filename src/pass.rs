//! Host pipeline driver
//!
//! Presents classes one at a time to the transformer: the cheap
//! `should_transform` check first, `transform` only for admitted classes.
//! A class that fails is recorded and the pass moves on.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::pool::ClassPool;
use crate::transformer::{error_chain, ClassReport, LifecycleTransformer};
use crate::weaver::Weaver;

/// Class-level failure recorded by a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFailure {
    pub class: String,
    pub error: String,
}

/// Result of a pass over many classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Reports of transformed classes
    pub reports: Vec<ClassReport>,
    /// Classes the gate rejected
    pub rejected: Vec<String>,
    /// Classes that failed classification or collection
    pub failures: Vec<ClassFailure>,
}

impl PassSummary {
    pub fn report_for(&self, class: &str) -> Option<&ClassReport> {
        self.reports.iter().find(|r| r.class_name == class)
    }

    pub fn failure_for(&self, class: &str) -> Option<&ClassFailure> {
        self.failures.iter().find(|f| f.class == class)
    }

    /// Total injected methods across all classes
    pub fn injected_count(&self) -> usize {
        self.reports.iter().map(ClassReport::injected_count).sum()
    }

    fn merge(&mut self, other: PassSummary) {
        self.reports.extend(other.reports);
        self.rejected.extend(other.rejected);
        self.failures.extend(other.failures);
    }

    fn sort(&mut self) {
        self.reports.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        self.rejected.sort();
        self.failures.sort_by(|a, b| a.class.cmp(&b.class));
    }
}

/// Runs a transformer over classes of a pool
pub struct LifecyclePass<'p, W> {
    pool: &'p ClassPool,
    transformer: LifecycleTransformer<W>,
}

impl<'p, W: Weaver> LifecyclePass<'p, W> {
    pub fn new(pool: &'p ClassPool, transformer: LifecycleTransformer<W>) -> Self {
        Self { pool, transformer }
    }

    pub fn transformer(&self) -> &LifecycleTransformer<W> {
        &self.transformer
    }

    /// Process classes sequentially
    pub fn run(&self, class_names: &[String]) -> PassSummary {
        let mut summary = PassSummary::default();
        for name in class_names {
            self.process(name, &mut summary);
        }
        summary.sort();
        tracing::info!(
            "Pass complete: {} transformed, {} rejected, {} failed, {} methods injected",
            summary.reports.len(),
            summary.rejected.len(),
            summary.failures.len(),
            summary.injected_count()
        );
        summary
    }

    fn process(&self, name: &str, summary: &mut PassSummary) {
        let Some(class) = self.pool.get(name) else {
            tracing::warn!("Class {} not found in pool", name);
            summary.failures.push(ClassFailure {
                class: name.to_string(),
                error: format!("class not found in pool: {}", name),
            });
            return;
        };

        let result = match self.transformer.should_transform(&class) {
            Ok(false) => {
                tracing::debug!("Not transforming {}", name);
                summary.rejected.push(name.to_string());
                return;
            }
            Ok(true) => self.transformer.transform_admitted(&class),
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                tracing::warn!("{}", error_chain(&e));
                summary.failures.push(ClassFailure {
                    class: name.to_string(),
                    error: error_chain(&e),
                });
            }
        }
    }
}

impl<'p, W: Weaver + Sync> LifecyclePass<'p, W> {
    /// Process classes on up to `jobs` scoped worker threads
    ///
    /// Produces the same summary as [`Self::run`].
    pub fn run_parallel(&self, class_names: &[String], jobs: usize) -> Result<PassSummary> {
        let jobs = jobs.max(1);
        if jobs == 1 || class_names.len() < 2 {
            return Ok(self.run(class_names));
        }

        let chunk_size = class_names.len().div_ceil(jobs);
        let partials = crossbeam::scope(|s| {
            let handles: Vec<_> = class_names
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move |_| {
                        let mut partial = PassSummary::default();
                        for name in chunk {
                            self.process(name, &mut partial);
                        }
                        partial
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        })
        .map_err(|_| anyhow!("Pass worker panicked"))?;

        let mut summary = PassSummary::default();
        for partial in partials {
            summary.merge(partial.map_err(|_| anyhow!("Pass worker panicked"))?);
        }
        summary.sort();
        tracing::info!(
            "Pass complete ({} jobs): {} transformed, {} rejected, {} failed, {} methods injected",
            jobs,
            summary.reports.len(),
            summary.rejected.len(),
            summary.failures.len(),
            summary.injected_count()
        );
        Ok(summary)
    }
}
