//! Package assembly.
//!
//! The [`PackageAssembler`] owns the in-progress [`Package`] and drives one
//! pass over its Content Builder assets:
//!
//! 1. Read the asset's content and start a fresh dependency list
//! 2. For each catalog function, extract every call in content order
//! 3. Resolve each call's argument to a package-local id
//! 4. Merge newly discovered objects into their bucket
//! 5. Record one edge per distinct argument and rewrite every occurrence
//! 6. Store the rewritten content and the dependency list on the asset
//!
//! Running a pass twice over the same package yields the same content,
//! the same dependency lists and the same bucket membership.
//!
//! # Failure Handling
//!
//! Any resolution error aborts the pass. With [`FailurePolicy::KeepPartial`]
//! objects merged before the failure stay in the package; with
//! [`FailurePolicy::Rollback`] the package is restored to its state at the
//! start of the pass.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{DependencyEdge, Package};
use crate::core::{BldrError, ContextTag};
use crate::platform::PlatformClient;
use crate::references::{ContentRewriter, ReferenceCatalog, extract};
use crate::resolver::IdentityResolver;

/// What happens to the package when a pass fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep objects merged before the failure.
    #[default]
    KeepPartial,
    /// Restore the package to its state before the pass.
    Rollback,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KeepPartial => "keep-partial",
            Self::Rollback => "rollback",
        })
    }
}

impl FromStr for FailurePolicy {
    type Err = BldrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-partial" => Ok(Self::KeepPartial),
            "rollback" => Ok(Self::Rollback),
            other => Err(BldrError::ConfigError {
                message: format!(
                    "unknown failure policy '{other}' (expected 'keep-partial' or 'rollback')"
                ),
            }),
        }
    }
}

/// A reference that matched only with doubled path separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFlag {
    /// Asset containing the reference
    pub asset_bldr_id: String,
    /// Its display name
    pub asset_name: String,
    /// Reference function
    pub reference: String,
    /// The argument as written
    pub literal: String,
    /// What it was matched to
    pub target_bldr_id: String,
}

/// Result of one or more passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Objects added to the package by these passes
    pub new_dependencies: Package,
    /// References to check by hand
    pub review: Vec<ReviewFlag>,
    /// Number of assets whose content was scanned
    pub processed: usize,
}

impl PassReport {
    /// Fold `other` into this report.
    pub fn merge(&mut self, other: Self) {
        for (context, bucket) in other.new_dependencies.iter() {
            for asset in bucket.assets() {
                self.new_dependencies.insert(context, asset.clone());
            }
        }
        self.review.extend(other.review);
        self.processed += other.processed;
    }
}

/// Drives extraction, resolution and rewriting over a package.
pub struct PackageAssembler<'c, C> {
    client: &'c C,
    package: Package,
    policy: FailurePolicy,
}

impl<'c, C: PlatformClient> PackageAssembler<'c, C> {
    /// Assembler over `package`, resolving through `client`.
    pub fn new(client: &'c C, package: Package) -> Self {
        Self {
            client,
            package,
            policy: FailurePolicy::default(),
        }
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The package in its current state.
    #[must_use]
    pub const fn package(&self) -> &Package {
        &self.package
    }

    /// Hand back the package.
    #[must_use]
    pub fn into_package(self) -> Package {
        self.package
    }

    fn content_builder_len(&self) -> usize {
        self.package.bucket(ContextTag::ContentBuilder).map_or(0, |b| b.len())
    }

    /// One pass over every Content Builder asset present now.
    ///
    /// Assets discovered during the pass are merged but not scanned.
    pub async fn assemble(&mut self) -> Result<PassReport> {
        let range = 0..self.content_builder_len();
        self.run_pass(range).await
    }

    /// An initial pass, then further passes over newly discovered assets
    /// until nothing new turns up or `max_depth` extra passes have run.
    ///
    /// Each asset is scanned exactly once.
    pub async fn assemble_transitive(&mut self, max_depth: usize) -> Result<PassReport> {
        let mut scanned = self.content_builder_len();
        let mut report = self.run_pass(0..scanned).await?;

        for depth in 1..=max_depth {
            let len = self.content_builder_len();
            if scanned >= len {
                break;
            }
            debug!("Transitive pass {depth} over {} new asset(s)", len - scanned);
            let next = self.run_pass(scanned..len).await?;
            report.merge(next);
            scanned = len;
        }

        let remaining = self.content_builder_len().saturating_sub(scanned);
        if remaining > 0 {
            warn!("Stopped after {max_depth} transitive pass(es); {remaining} asset(s) were not scanned");
        }
        Ok(report)
    }

    async fn run_pass(&mut self, range: Range<usize>) -> Result<PassReport> {
        let snapshot = match self.policy {
            FailurePolicy::Rollback => Some(self.package.clone()),
            FailurePolicy::KeepPartial => None,
        };

        let mut report = PassReport::default();
        let result = self.scan_assets(range, &mut report).await;

        match result {
            Ok(()) => {
                info!(
                    "Scanned {} asset(s), discovered {} new object(s)",
                    report.processed,
                    report.new_dependencies.len()
                );
                Ok(report)
            }
            Err(e) => {
                if let Some(snapshot) = snapshot {
                    warn!("Pass failed, restoring the package to its state before the pass");
                    self.package = snapshot;
                }
                Err(e)
            }
        }
    }

    async fn scan_assets(&mut self, range: Range<usize>, report: &mut PassReport) -> Result<()> {
        let catalog = ReferenceCatalog::global()?;
        let resolver = IdentityResolver::new(self.client);

        for index in range {
            let Some(owner) = self
                .package
                .bucket(ContextTag::ContentBuilder)
                .and_then(|b| b.get(index))
                .cloned()
            else {
                return Err(BldrError::PackageError {
                    reason: format!("asset index {index} is out of range"),
                }
                .into());
            };
            let Some(mut content) = owner.content.clone() else {
                debug!("Skipping '{}' (no content)", owner.name);
                continue;
            };

            let mut dependencies: Vec<DependencyEdge> = Vec::new();
            let mut resolved: HashMap<(&str, String), (ContextTag, String)> = HashMap::new();
            let mut recorded: HashSet<DependencyEdge> = HashSet::new();

            for function in catalog.iter() {
                let matches: Vec<_> = extract(function, &content).collect();
                if matches.is_empty() {
                    continue;
                }

                let mut rewriter = ContentRewriter::new(content);
                for m in &matches {
                    let key = (function.name, m.literal.clone());
                    let (context, target) = match resolved.get(&key) {
                        Some(known) => known.clone(),
                        None => {
                            let resolution = resolver
                                .resolve(m, &owner, &self.package)
                                .await
                                .with_context(|| {
                                    format!(
                                        "Failed to resolve {}({}) in '{}'",
                                        function.name, m.literal, owner.name
                                    )
                                })?;

                            if resolution.needs_review {
                                warn!(
                                    "'{}' references {}({}) using doubled separators; review the match",
                                    owner.name, function.name, m.literal
                                );
                                report.review.push(ReviewFlag {
                                    asset_bldr_id: owner.bldr_id.clone(),
                                    asset_name: owner.name.clone(),
                                    reference: function.name.to_string(),
                                    literal: m.literal.clone(),
                                    target_bldr_id: resolution.bldr_id.clone(),
                                });
                            }

                            if let Some(payload) = resolution.payload
                                && self.package.insert(resolution.context, payload.clone())
                            {
                                report.new_dependencies.insert(resolution.context, payload);
                            }

                            let edge = DependencyEdge {
                                bldr_id: resolution.bldr_id.clone(),
                                context: resolution.context,
                                reference: function.name.to_string(),
                            };
                            if recorded.insert(edge.clone()) {
                                dependencies.push(edge);
                            }

                            let known = (resolution.context, resolution.bldr_id);
                            resolved.insert(key, known.clone());
                            known
                        }
                    };

                    debug!("Rewriting {} in '{}' to {context}/{target}", m.literal, owner.name);
                    rewriter.rewrite(m, &target);
                }
                content = rewriter.into_content();
            }

            self.package.bucket_mut(ContextTag::ContentBuilder).set_resolution(
                index,
                Some(content),
                dependencies,
            );
            report.processed += 1;
        }

        Ok(())
    }
}
