//! Implementation of `drydock update`.
//!
//! The full pipeline: discover the manifest graph from the configured
//! roots, compute and stage the patch, re-validate every build target
//! through the native checker, and only then make the changed files
//! durable. An incoherent or timed-out check discards the staged edits.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::checker::{build_targets, CheckVerdict, NativeResolver, TopLevelAdder};
use crate::core::edit::ChangedFile;
use crate::core::manifest::MANIFEST_NAME;
use crate::graph::discover;
use crate::patch::{Outcome, PatchRequest, VersionPatcher};
use crate::provider::FileProvider;

/// Options for the update operation.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Root manifests, repository-relative
    pub roots: Vec<String>,

    /// Dependency to move
    pub dependency: String,

    /// Known previous version (`None` = peer mode)
    pub previous: Option<String>,

    /// Requested version
    pub new_version: String,

    /// Whether the dependency is transitive
    pub transitive: bool,

    /// Timeout for each per-target consistency check
    pub check_timeout: Duration,

    /// Compute and report, but write nothing
    pub dry_run: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        UpdateOptions {
            roots: vec![MANIFEST_NAME.to_string()],
            dependency: String::new(),
            previous: None,
            new_version: String::new(),
            transitive: false,
            check_timeout: Duration::from_secs(60),
            dry_run: false,
        }
    }
}

/// What an update run did.
#[derive(Debug)]
pub struct UpdateReport {
    /// Overall outcome for the dependency
    pub outcome: Outcome,

    /// Files written (or, under `dry_run`, that would have been)
    pub changed: Vec<ChangedFile>,
}

/// Run the whole update pipeline for one dependency.
pub fn update<P: FileProvider>(
    provider: &P,
    resolver: &dyn NativeResolver,
    adder: Option<&dyn TopLevelAdder>,
    opts: &UpdateOptions,
) -> Result<UpdateReport> {
    let roots: Vec<&str> = opts.roots.iter().map(String::as_str).collect();
    let mut graph = discover(provider, &roots).context("manifest graph discovery failed")?;
    tracing::info!(files = graph.len(), "discovered manifest graph");

    let mut patcher = VersionPatcher::new(resolver);
    if let Some(adder) = adder {
        patcher = patcher.with_adder(adder);
    }

    let request = PatchRequest {
        name: opts.dependency.clone(),
        previous: opts.previous.clone(),
        new_version: opts.new_version.clone(),
        transitive: opts.transitive,
    };
    let result = patcher
        .patch(&mut graph, &request)
        .with_context(|| format!("failed to patch `{}`", opts.dependency))?;

    if result.changed.is_empty() {
        return Ok(UpdateReport {
            outcome: result.outcome,
            changed: Vec::new(),
        });
    }

    // Re-validate every build target against the staged graph before
    // anything is written. One bad target discards the whole patch.
    for target in build_targets(&graph) {
        let verdict = resolver
            .validate(&graph, &target, opts.check_timeout)
            .with_context(|| format!("consistency check failed for target `{target}`"))?;
        match verdict {
            CheckVerdict::Coherent => {}
            CheckVerdict::Incoherent => {
                tracing::warn!(target, "staged edits leave the graph incoherent; discarding");
                return Ok(UpdateReport {
                    outcome: Outcome::NotSupported,
                    changed: Vec::new(),
                });
            }
            CheckVerdict::TimedOut => {
                tracing::warn!(target, "consistency check timed out; discarding edits");
                return Ok(UpdateReport {
                    outcome: Outcome::NotSupported,
                    changed: Vec::new(),
                });
            }
        }
    }

    if opts.dry_run {
        tracing::info!(
            files = result.changed.len(),
            "dry run; changed files not written"
        );
        return Ok(UpdateReport {
            outcome: result.outcome,
            changed: result.changed,
        });
    }

    for file in &result.changed {
        provider
            .write(&file.path, &file.new_content)
            .with_context(|| format!("failed to write `{}`", file.path))?;
        tracing::info!(path = file.path, "wrote updated manifest");
    }

    Ok(UpdateReport {
        outcome: result.outcome,
        changed: result.changed,
    })
}
