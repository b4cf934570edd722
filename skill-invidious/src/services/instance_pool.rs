//! Instance pool and liveness selection
//!
//! The pool is rebuilt from three sources in priority order: discovered
//! instances, user-configured instances, and (only when the first two yield
//! fewer than `MIN_CANDIDATES_BEFORE_FALLBACK`) the built-in fallback list.
//!
//! Selection is round-robin with memory: probing starts at the last instance
//! that answered, so a dead first choice is not re-probed on every search.

use crate::services::instance_discovery::CandidateSource;
use crate::services::invidious_client::LivenessProbe;
use skill_common::config::{canonical_instance_url, InstanceManagement};
use tracing::{debug, info, warn};

/// Discovered + custom count below which fallback instances are added
pub const MIN_CANDIDATES_BEFORE_FALLBACK: usize = 3;

/// Ordered, duplicate-free set of instance addresses with a rotation cursor
///
/// Created when a skill session starts and mutated only by `select_live`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePool {
    instances: Vec<String>,
    cursor: usize,
}

impl InstancePool {
    pub fn new(instances: Vec<String>) -> Self {
        Self {
            instances,
            cursor: 0,
        }
    }

    /// Build a pool from a candidate source plus configured instances
    ///
    /// Discovery failures are logged and treated as "nothing discovered".
    pub async fn resolve(
        source: &dyn CandidateSource,
        management: &InstanceManagement,
        fallback: &[String],
    ) -> Self {
        let discovered = match source.resolve_candidates().await {
            Ok(urls) => {
                if !urls.is_empty() {
                    info!(source = %source.name(), "Found {} instances from discovery", urls.len());
                }
                urls
            }
            Err(e) => {
                warn!(source = %source.name(), "Could not fetch instances: {}", e);
                Vec::new()
            }
        };

        let instances = merge_candidates(
            discovered,
            &management.custom_instances,
            fallback,
            management.max_instances,
        );
        info!("Total instances available: {}", instances.len());

        Self::new(instances)
    }

    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Pick a live instance
    ///
    /// Probes each instance at most once, starting at the cursor and wrapping
    /// around. The first one that answers becomes the new cursor. When none
    /// answer, the first pool entry is returned unprobed. `None` only for an
    /// empty pool.
    pub async fn select_live(&mut self, probe: &dyn LivenessProbe) -> Option<String> {
        let len = self.instances.len();
        if len == 0 {
            return None;
        }

        for offset in 0..len {
            let position = (self.cursor + offset) % len;
            let instance = &self.instances[position];
            if probe.is_alive(instance).await {
                self.cursor = position;
                debug!(instance = %instance, position, "Selected live instance");
                return Some(instance.clone());
            }
        }

        warn!("No instance answered the liveness probe, using {}", self.instances[0]);
        Some(self.instances[0].clone())
    }
}

/// Merge candidate sources into a bounded, duplicate-free list
///
/// Addresses are compared in canonical form (see `canonical_instance_url`),
/// so case and trailing-slash variants of one instance collapse. Addresses
/// that are not absolute http(s) URLs with a host are skipped.
pub fn merge_candidates(
    discovered: Vec<String>,
    custom: &[String],
    fallback: &[String],
    max_instances: usize,
) -> Vec<String> {
    let mut candidates = canonical_all(&discovered, "discovered");

    let custom = canonical_all(custom, "custom");
    if !custom.is_empty() {
        info!("Added {} custom instances from configuration", custom.len());
    }
    candidates.extend(custom);

    if candidates.len() < MIN_CANDIDATES_BEFORE_FALLBACK {
        let fallback = canonical_all(fallback, "fallback");
        info!("Added {} fallback instances", fallback.len());
        candidates.extend(fallback);
    }

    let mut unique: Vec<String> = Vec::with_capacity(max_instances.min(candidates.len()));
    for url in candidates {
        if unique.len() >= max_instances {
            break;
        }
        if !unique.contains(&url) {
            unique.push(url);
        }
    }
    unique
}

fn canonical_all(urls: &[String], source: &str) -> Vec<String> {
    urls.iter()
        .filter_map(|url| match canonical_instance_url(url) {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                warn!(source, "Skipping instance: {}", e);
                None
            }
        })
        .collect()
}
