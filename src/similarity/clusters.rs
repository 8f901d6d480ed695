//! Single-link duplicate clustering.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::word::{Word, WordId};

use super::{distance, EditCosts};

/// A group of entries proposed as duplicates of each other.
///
/// Members are listed in entry order. A cluster of one is an entry with no
/// near neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Word ids in entry order.
    pub members: Vec<WordId>,
}

impl Cluster {
    /// Returns true if this cluster holds a single entry.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Disjoint-set forest over entry indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Joins two sets, keeping the smaller index as root so that roots
    /// follow entry order.
    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

fn clustering_key(vernacular: &str) -> String {
    vernacular.trim().nfc().collect()
}

/// Groups `entries` into duplicate clusters.
///
/// Two entries link when the cheaper direction of their vernacular distance
/// is at most `threshold`; clusters are the connected components of that
/// relation. Vernacular forms are trimmed and NFC-normalized first so that
/// precomposed and decomposed spellings compare equal.
///
/// Clusters come back ordered by their first member, members in entry order.
/// Runs in O(n²) distance evaluations.
#[must_use]
pub fn find_clusters(entries: &[Word], costs: EditCosts, threshold: u32) -> Vec<Cluster> {
    let keys: Vec<String> = entries.iter().map(|w| clustering_key(&w.vernacular)).collect();
    let mut sets = UnionFind::new(entries.len());

    for i in 0..keys.len() {
        for j in (i + 1)..keys.len() {
            if sets.find(i) == sets.find(j) {
                continue;
            }
            let forward = distance(&keys[i], &keys[j], costs);
            let near = forward <= threshold
                || (!costs.is_symmetric() && distance(&keys[j], &keys[i], costs) <= threshold);
            if near {
                sets.union(i, j);
            }
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; entries.len()];
    for (i, entry) in entries.iter().enumerate() {
        let root = sets.find(i);
        match slot_of_root[root] {
            Some(slot) => clusters[slot].members.push(entry.id.clone()),
            None => {
                slot_of_root[root] = Some(clusters.len());
                clusters.push(Cluster {
                    members: vec![entry.id.clone()],
                });
            }
        }
    }

    tracing::debug!(
        entries = entries.len(),
        clusters = clusters.len(),
        threshold,
        "clustered entries"
    );
    clusters
}
