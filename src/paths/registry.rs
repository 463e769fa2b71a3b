//! Sorted registry of watch roots with longest-prefix lookup.

use std::path::PathBuf;

use super::error::RootError;
use super::normalize::WatchRoot;

/// Watch roots sorted byte-wise by their resolved form.
///
/// Built once at startup and never mutated afterwards, so it can be shared
/// with the delivery path without locking.
#[derive(Debug)]
pub struct WatchRegistry {
    roots: Vec<WatchRoot>,
}

impl WatchRegistry {
    /// Sort and store the given roots.
    ///
    /// Roots with identical resolved forms collapse to the one supplied
    /// first. Fails if nothing is left.
    pub fn build(entries: impl IntoIterator<Item = WatchRoot>) -> Result<Self, RootError> {
        let mut roots: Vec<WatchRoot> = entries.into_iter().collect();

        // Stable, so the first spelling of a duplicate survives dedup.
        roots.sort_by(|a, b| a.resolved().cmp(b.resolved()));
        roots.dedup_by(|later, earlier| {
            let duplicate = later.resolved() == earlier.resolved();
            if duplicate {
                crate::debug_event!(
                    "registry",
                    "duplicate",
                    "{} already watched as {}",
                    later.orig().to_string_lossy(),
                    earlier.orig().to_string_lossy()
                );
            }
            duplicate
        });

        if roots.is_empty() {
            return Err(RootError::NoWatchTargets);
        }

        Ok(Self { roots })
    }

    /// All roots in sorted order.
    pub fn roots(&self) -> &[WatchRoot] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Canonical paths to hand to the notification source.
    pub fn resolved_paths(&self) -> Vec<PathBuf> {
        self.roots.iter().map(WatchRoot::resolved_path).collect()
    }

    /// Find the deepest root whose resolved form is a prefix of `event_path`.
    ///
    /// Every root that is a prefix of `event_path` sorts at or before it, and
    /// the prefixes of one path form a chain ordered by length. So the last
    /// root not after `event_path` is the answer if it is a prefix. If it is
    /// not, no deeper root than the common prefix it shares with
    /// `event_path` can match, and the search repeats on that shorter bound.
    /// Each round strictly shortens the bound.
    pub fn find_owner(&self, event_path: &[u8]) -> Option<&WatchRoot> {
        let mut bound = event_path;

        loop {
            let idx = self.roots.partition_point(|root| root.resolved() <= bound);
            if idx == 0 {
                return None;
            }

            let candidate = &self.roots[idx - 1];
            if candidate.is_prefix_of(bound) {
                return Some(candidate);
            }

            bound = &bound[..common_prefix_len(candidate.resolved(), bound)];
        }
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
