//! Claim dependency graph
//!
//! Nodes are claims indexed by id; an edge runs from a claim to each claim it
//! references. Cycles are found with an iterative Tarjan pass before any
//! checking happens, and the check order is a topological order of the
//! condensation with ties broken by extraction order.

use crate::error::{CheckerError, DependencyCycleError};
use canon_domain::{Claim, ClaimId};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use tracing::warn;

const UNVISITED: usize = usize::MAX;

/// Identifier-indexed reference graph over one document's claims
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    ids: Vec<ClaimId>,
    ordinals: Vec<usize>,
    /// `edges[i]` holds the positions claim `i` references
    edges: Vec<Vec<usize>>,
}

/// Order in which claims can be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPlan {
    /// Every claim, references before the claims that reference them
    pub order: Vec<ClaimId>,
    /// Claims that sit on a reference cycle
    pub cyclic: BTreeSet<ClaimId>,
    /// Present when `cyclic` is not empty
    pub cycle_error: Option<DependencyCycleError>,
}

impl CheckPlan {
    /// True if `id` is on a cycle
    pub fn is_cyclic(&self, id: &ClaimId) -> bool {
        self.cyclic.contains(id)
    }
}

impl DependencyGraph {
    /// Build the graph, rejecting duplicate ids and dangling references
    ///
    /// References to later claims are accepted with a warning; only a cycle
    /// makes them unusable.
    pub fn build(claims: &[Claim]) -> Result<Self, CheckerError> {
        let mut index: HashMap<ClaimId, usize> = HashMap::with_capacity(claims.len());
        for (i, claim) in claims.iter().enumerate() {
            if index.insert(claim.id, i).is_some() {
                return Err(CheckerError::DuplicateClaim(claim.id));
            }
        }

        let mut edges = Vec::with_capacity(claims.len());
        for (i, claim) in claims.iter().enumerate() {
            let mut targets = Vec::with_capacity(claim.references.len());
            for reference in &claim.references {
                let target = *index.get(reference).ok_or(CheckerError::DanglingReference {
                    claim: claim.id,
                    reference: *reference,
                })?;
                if target > i {
                    warn!(
                        "Claim {} references later claim {} (ordinal {} -> {})",
                        claim.id, reference, claim.ordinal, claims[target].ordinal
                    );
                }
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            edges.push(targets);
        }

        Ok(Self {
            ids: claims.iter().map(|c| c.id).collect(),
            ordinals: claims.iter().map(|c| c.ordinal).collect(),
            edges,
        })
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True for an empty claim set
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Compute the check order and the cyclic claims
    pub fn plan(&self) -> CheckPlan {
        let component = strongly_connected(&self.edges);
        let mut sizes: HashMap<usize, usize> = HashMap::new();
        for &c in &component {
            *sizes.entry(c).or_insert(0) += 1;
        }

        let on_cycle: Vec<bool> = (0..self.len())
            .map(|i| sizes.get(&component[i]).copied().unwrap_or(0) > 1 || self.edges[i].contains(&i))
            .collect();

        // Kahn over the condensation: edges inside a component are ignored
        let mut pending = vec![0usize; self.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for (i, targets) in self.edges.iter().enumerate() {
            for &t in targets {
                if component[t] != component[i] {
                    pending[i] += 1;
                    dependents[t].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..self.len())
            .filter(|&i| pending[i] == 0)
            .map(|i| Reverse((self.ordinals[i], i)))
            .collect();
        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse((_, i))) = ready.pop() {
            order.push(self.ids[i]);
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.push(Reverse((self.ordinals[d], d)));
                }
            }
        }

        let mut cyclic_positions: Vec<usize> = (0..self.len()).filter(|&i| on_cycle[i]).collect();
        cyclic_positions.sort_by_key(|&i| (self.ordinals[i], i));
        let cyclic: BTreeSet<ClaimId> = cyclic_positions.iter().map(|&i| self.ids[i]).collect();
        let cycle_error = (!cyclic_positions.is_empty()).then(|| DependencyCycleError {
            claims: cyclic_positions.iter().map(|&i| self.ids[i]).collect(),
            ordinals: cyclic_positions.iter().map(|&i| self.ordinals[i]).collect(),
        });

        CheckPlan {
            order,
            cyclic,
            cycle_error,
        }
    }
}

/// Component id of every node, by iterative Tarjan
fn strongly_connected(edges: &[Vec<usize>]) -> Vec<usize> {
    let n = edges.len();
    let mut index = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut component = vec![UNVISITED; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0;
    let mut next_component = 0;

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        // (node, next edge to follow)
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if frame.1 < edges[v].len() {
                let w = edges[v][frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    low[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component[w] = next_component;
                    if w == v {
                        break;
                    }
                }
                next_component += 1;
            }
        }
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_domain::{ClaimKind, Span};

    fn claim(ordinal: usize, references: &[usize]) -> Claim {
        let mut claim = Claim::new(
            ClaimId::derive("doc", ordinal),
            ordinal,
            Span::new(ordinal * 10, ordinal * 10 + 5),
            format!("claim {}", ordinal),
            ["Anna".to_string()],
            if references.is_empty() {
                ClaimKind::Factual
            } else {
                ClaimKind::Causal
            },
        );
        for &r in references {
            claim = claim.with_reference(ClaimId::derive("doc", r));
        }
        claim
    }

    fn id(ordinal: usize) -> ClaimId {
        ClaimId::derive("doc", ordinal)
    }

    #[test]
    fn test_acyclic_order_follows_references() {
        let claims = vec![claim(0, &[]), claim(1, &[0]), claim(2, &[]), claim(3, &[1, 2])];
        let plan = DependencyGraph::build(&claims).unwrap().plan();

        assert_eq!(plan.order, vec![id(0), id(1), id(2), id(3)]);
        assert!(plan.cyclic.is_empty());
        assert!(plan.cycle_error.is_none());
    }

    #[test]
    fn test_forward_reference_reordered() {
        let claims = vec![claim(0, &[1]), claim(1, &[])];
        let plan = DependencyGraph::build(&claims).unwrap().plan();
        assert_eq!(plan.order, vec![id(1), id(0)]);
    }

    #[test]
    fn test_mutual_references_are_cyclic() {
        let claims = vec![claim(0, &[1]), claim(1, &[0]), claim(2, &[1])];
        let plan = DependencyGraph::build(&claims).unwrap().plan();

        assert_eq!(plan.order.len(), 3);
        assert_eq!(plan.order[2], id(2));
        assert!(plan.is_cyclic(&id(0)));
        assert!(plan.is_cyclic(&id(1)));
        assert!(!plan.is_cyclic(&id(2)));

        let error = plan.cycle_error.unwrap();
        assert_eq!(error.ordinals, vec![0, 1]);
        assert!(error.to_string().contains("[0, 1]"));
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let claims = vec![claim(0, &[0])];
        let plan = DependencyGraph::build(&claims).unwrap().plan();
        assert!(plan.is_cyclic(&id(0)));
        assert_eq!(plan.order, vec![id(0)]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut claims = vec![claim(0, &[])];
        for i in 1..5_000 {
            claims.push(claim(i, &[i - 1]));
        }
        // close the loop
        claims[0] = claim(0, &[4_999]);
        let plan = DependencyGraph::build(&claims).unwrap().plan();
        assert_eq!(plan.cyclic.len(), 5_000);
        assert_eq!(plan.order.len(), 5_000);
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let claims = vec![claim(0, &[]), claim(1, &[7])];
        assert_eq!(
            DependencyGraph::build(&claims).unwrap_err(),
            CheckerError::DanglingReference {
                claim: id(1),
                reference: id(7)
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let claims = vec![claim(0, &[]), claim(0, &[])];
        assert_eq!(DependencyGraph::build(&claims).unwrap_err(), CheckerError::DuplicateClaim(id(0)));
    }
}
