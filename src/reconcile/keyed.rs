//! Keyed alignment for children lists where every child carries a key.
//!
//! Old children are matched to new ones by key. A match whose identity (tag
//! and `id`) still agrees is patched and moved into place; anything unmatched
//! is removed (old side) or built (new side). Matched nodes on the longest run
//! that kept its relative order stay put; every other node is moved in one
//! backwards walk.

use std::collections::{HashMap, HashSet};

use super::Reconciler;
use crate::dom::{Dom, DomId};
use crate::error::Result;
use crate::types::Node;

/// Whether both lists are fully keyed with unique keys.
pub(super) fn applies(old: &[Node], new: &[Node]) -> bool {
    if old.is_empty() || new.is_empty() {
        return false;
    }
    unique_keys(old) && unique_keys(new)
}

fn unique_keys(nodes: &[Node]) -> bool {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.iter().all(|node| match key_of(node) {
        Some(key) => seen.insert(key),
        None => false,
    })
}

fn key_of(node: &Node) -> Option<&str> {
    node.as_element()?.key.as_deref()
}

fn same_identity(old: &Node, new: &Node) -> bool {
    match (old.as_element(), new.as_element()) {
        (Some(a), Some(b)) => a.tag == b.tag && a.attrs.id() == b.attrs.id(),
        _ => false,
    }
}

impl<D: Dom + ?Sized> Reconciler<'_, D> {
    pub(super) fn reconcile_keyed(
        &mut self,
        parent: DomId,
        old: Vec<Node>,
        new: &mut [Node],
    ) -> Result<()> {
        let mut old: Vec<Option<Node>> = old.into_iter().map(Some).collect();
        let index: HashMap<String, usize> = old
            .iter()
            .enumerate()
            .filter_map(|(i, n)| Some((key_of(n.as_ref()?)?.to_string(), i)))
            .collect();

        let matches: Vec<Option<Node>> = new
            .iter()
            .map(|slot| {
                let i = *index.get(key_of(slot)?)?;
                if old[i].as_ref().is_some_and(|prev| same_identity(prev, slot)) {
                    old[i].take()
                } else {
                    None
                }
            })
            .collect();

        for leftover in old.into_iter().flatten() {
            self.remove(leftover)?;
        }

        let sources: Vec<(usize, usize)> = matches
            .iter()
            .enumerate()
            .filter_map(|(slot, prev)| {
                let key = key_of(prev.as_ref()?)?;
                Some((slot, index[key]))
            })
            .collect();
        let order: Vec<usize> = sources.iter().map(|&(_, from)| from).collect();
        let stable: HashSet<usize> = longest_increasing(&order)
            .into_iter()
            .map(|at| sources[at].0)
            .collect();

        for (slot, prev) in new.iter_mut().zip(matches) {
            match prev {
                Some(prev) => self.reconcile_node(prev, slot)?,
                None => {
                    self.build(slot);
                }
            }
        }

        let mut next: Option<DomId> = None;
        for (at, slot) in new.iter().enumerate().rev() {
            let Some(id) = slot.first_dom() else {
                continue;
            };
            if !stable.contains(&at) {
                let moving = self.dom.parent(id) == Some(parent);
                self.dom.insert_before(parent, id, next);
                if moving {
                    self.stats.moved += 1;
                }
            }
            next = Some(id);
        }
        Ok(())
    }
}

/// Positions in `seq` forming one longest strictly increasing run.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let at = tails.partition_point(|&t| seq[t] < value);
        if at > 0 {
            prev[i] = Some(tails[at - 1]);
        }
        if at == tails.len() {
            tails.push(i);
        } else {
            tails[at] = i;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        out.push(i);
        cursor = prev[i];
    }
    out.reverse();
    out
}
