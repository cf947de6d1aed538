//! Nested claim trees and the structural pairing engine.
//!
//! A claim tree maps claim names to either a leaf value or a nested subtree.
//! Every derived artifact (salts, commitments, disclosures, releases) is a
//! tree congruent to the claim tree it was derived from, so one generic walk
//! serves all four uses: salt generation, commitment building, disclosure
//! building, and verification re-pairing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClaimsError, ClaimsResult};

// ---------------------------------------------------------------------------
// Tree — tagged leaf/branch node
// ---------------------------------------------------------------------------

/// One node of a nested claim tree: a subtree or a leaf payload.
///
/// Serialized untagged: JSON objects are branches, everything else is a leaf.
/// This mirrors the wire format, where nesting is expressed directly as JSON
/// nesting and a leaf is whatever value sits at the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree<T> {
    Branch(BTreeMap<String, Tree<T>>),
    Leaf(T),
}

/// The root of a tree: the top level is always a mapping, never a leaf.
pub type TreeMap<T> = BTreeMap<String, Tree<T>>;

/// Full set of user claims (leaves are arbitrary JSON values).
pub type ClaimTree = TreeMap<serde_json::Value>;

/// Per-leaf random salts, congruent to the claim tree they were built for.
pub type SaltTree = TreeMap<String>;

/// Per-leaf salted-hash commitments, congruent to the claim tree.
pub type CommitmentTree = TreeMap<String>;

/// Per-leaf raw disclosure entries (commitment pre-images), congruent to the
/// claim tree. Held by the holder; a release is a sub-tree of this.
pub type DisclosureTree = TreeMap<String>;

impl<T> Tree<T> {
    pub fn is_branch(&self) -> bool {
        matches!(self, Tree::Branch(_))
    }
}

// ---------------------------------------------------------------------------
// pair_by_structure — the recursive pairing/mapping engine
// ---------------------------------------------------------------------------

/// Walk `data` recursively, pairing each leaf with the leaf at the same path
/// in `structure`, and produce a tree with exactly the shape of `data`.
///
/// `structure` may be sparser than `data`: a branch missing from `structure`
/// is treated as an empty overlay (every leaf below it pairs with `None`),
/// which is how salt generation walks a claim tree with no prior structure.
/// What `structure` may never do is disagree on shape — a branch in `data`
/// over a leaf in `structure`, or the reverse, fails with
/// [`ClaimsError::StructureMismatch`].
///
/// The per-leaf function receives `(key, data_leaf, structure_leaf)` and its
/// error aborts the whole walk; no partial result is ever returned.
pub fn pair_by_structure<S, D, T, F>(
    structure: &TreeMap<S>,
    data: &TreeMap<D>,
    f: &mut F,
) -> ClaimsResult<TreeMap<T>>
where
    F: FnMut(&str, &D, Option<&S>) -> ClaimsResult<T>,
{
    let empty = BTreeMap::new();
    let mut out = BTreeMap::new();
    for (key, node) in data {
        match node {
            Tree::Branch(children) => {
                let overlay = match structure.get(key) {
                    Some(Tree::Branch(sub)) => sub,
                    Some(Tree::Leaf(_)) => {
                        return Err(ClaimsError::StructureMismatch(key.clone()))
                    }
                    None => &empty,
                };
                out.insert(
                    key.clone(),
                    Tree::Branch(pair_by_structure(overlay, children, f)?),
                );
            }
            Tree::Leaf(value) => {
                let overlay = match structure.get(key) {
                    Some(Tree::Leaf(s)) => Some(s),
                    Some(Tree::Branch(_)) => {
                        return Err(ClaimsError::StructureMismatch(key.clone()))
                    }
                    None => None,
                };
                out.insert(key.clone(), Tree::Leaf(f(key, value, overlay)?));
            }
        }
    }
    Ok(out)
}
