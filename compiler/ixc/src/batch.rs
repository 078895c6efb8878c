//! Parallel generation over a set of classes.

use rayon::prelude::*;

use ix_gen::{generate, GenError, GeneratedArtifact, GeneratorConfig};
use ix_ir::{TypeElement, TypeHierarchy, TypeName};

/// Worker settings for [`generate_batch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Stack size of each worker thread, in bytes.
    pub stack_size: usize,
    /// Generate on the calling thread instead of a worker pool.
    pub sequential: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stack_size: 8 * 1024 * 1024,
            sequential: false,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            sequential: true,
            ..Self::default()
        }
    }
}

/// A class that produced no artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassFailure {
    pub class: TypeName,
    pub error: GenError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub artifacts: Vec<GeneratedArtifact>,
    pub failures: Vec<ClassFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total warnings across all generated artifacts.
    pub fn warning_count(&self) -> usize {
        self.artifacts.iter().map(|a| a.warnings.len()).sum()
    }
}

/// Generate an artifact for every class in `classes`.
///
/// The type hierarchy is built from `classes` and shared read-only by all
/// workers. If the pool cannot be built, generation runs sequentially.
pub fn generate_batch(
    classes: &[TypeElement],
    config: &GeneratorConfig,
    batch: &BatchConfig,
) -> BatchReport {
    let hierarchy = TypeHierarchy::from_classes(classes);
    let run = |class: &TypeElement| generate(class, &hierarchy, config);

    let results: Vec<Result<GeneratedArtifact, GenError>> = if batch.sequential {
        classes.iter().map(run).collect()
    } else {
        rayon::ThreadPoolBuilder::new()
            .stack_size(batch.stack_size)
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| classes.par_iter().map(run).collect::<Vec<_>>())
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                classes.iter().map(run).collect()
            })
    };

    let mut report = BatchReport::default();
    for (class, result) in classes.iter().zip(results) {
        match result {
            Ok(artifact) => report.artifacts.push(artifact),
            Err(error) => {
                tracing::warn!(class = %class.name, %error, "no artifact generated");
                report.failures.push(ClassFailure {
                    class: class.name.clone(),
                    error,
                });
            }
        }
    }
    tracing::debug!(
        classes = classes.len(),
        artifacts = report.artifacts.len(),
        failures = report.failures.len(),
        warnings = report.warning_count(),
        "batch complete"
    );
    report
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
