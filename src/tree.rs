//! Tree substrate: the owning/optional/sequence containers and arena-backed
//! links used by both the AST (`crate::ast`) and the semantic tree
//! (`crate::semantic`).
//!
//! The original cQASM implementation models back-references (`goto` targets,
//! variable declarations) as raw pointers into a tree owned elsewhere. Rust
//! has no raw back-pointers without unsafe code or reference counting, so
//! per the redesign notes this crate uses an arena: every tree that needs
//! cross-references owns a flat `Arena<T>`, and a `Link<T>`/`OptLink<T>` is
//! just an index into it. `OptLink` additionally supports an `Unresolved`
//! state carrying the deferred name, used by `goto` before the post-pass
//! resolves it against the program's subcircuit list.

use std::fmt;
use std::marker::PhantomData;
use serde::{Deserialize, Serialize};

/// Exactly one `T`, possibly not yet filled in while a node is under
/// construction. Accessing an empty `One<T>` after construction should
/// complete is a programmer error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct One<T>(Option<T>);

impl<T> One<T> {
    pub fn new(value: T) -> Self {
        One(Some(value))
    }

    pub fn empty() -> Self {
        One(None)
    }

    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn is_complete(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> &T {
        self.0.as_ref().expect("One<T> accessed before completion")
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.0.as_mut().expect("One<T> accessed before completion")
    }

    pub fn into_inner(self) -> T {
        self.0.expect("One<T> accessed before completion")
    }
}

impl<T> From<T> for One<T> {
    fn from(value: T) -> Self {
        One::new(value)
    }
}

/// Zero or one `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Maybe<T>(Option<T>);

impl<T> Maybe<T> {
    pub fn none() -> Self {
        Maybe(None)
    }

    pub fn some(value: T) -> Self {
        Maybe(Some(value))
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        self.0.as_mut()
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Maybe(value)
    }
}

/// An ordered sequence of zero or more `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Any<T>(Vec<T>);

impl<T> Any<T> {
    pub fn new() -> Self {
        Any(Vec::new())
    }

    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> From<Vec<T>> for Any<T> {
    fn from(value: Vec<T>) -> Self {
        Any(value)
    }
}

impl<T> IntoIterator for Any<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An ordered, non-empty sequence of `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Many<T>(Vec<T>);

impl<T> Many<T> {
    pub fn new(items: Vec<T>) -> Result<Self, String> {
        if items.is_empty() {
            return Err("Many<T> requires at least one element".to_string());
        }
        Ok(Many(items))
    }

    pub fn singleton(value: T) -> Self {
        Many(vec![value])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn first(&self) -> &T {
        &self.0[0]
    }
}

/// An index into an [`Arena<T>`]. Distinct arenas of the same element type
/// are never mixed up by the type system alone; callers are expected to use
/// one arena per tree, matching how `Program` owns exactly one
/// `Arena<Subcircuit>`.
pub struct NodeId<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NodeId<T> {
    fn new(index: usize) -> Self {
        NodeId { index, _marker: PhantomData }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for NodeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for NodeId<T> {}
impl<T> PartialEq for NodeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<T> Eq for NodeId<T> {}
impl<T> std::hash::Hash for NodeId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}
impl<T> fmt::Debug for NodeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.index)
    }
}

// `NodeId<T>` only ever stores a `usize`; `T` is a phantom marker, so it
// serializes as a bare integer regardless of whether `T` itself implements
// `Serialize`.
impl<T> Serialize for NodeId<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index as u64)
    }
}

impl<'de, T> Deserialize<'de> for NodeId<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u64::deserialize(deserializer)? as usize;
        Ok(NodeId::new(index))
    }
}

/// A resolved, non-owning reference to a `T` stored in the same tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Link<T>(NodeId<T>);

impl<T> Link<T> {
    pub fn new(id: NodeId<T>) -> Self {
        Link(id)
    }

    pub fn id(&self) -> NodeId<T> {
        self.0
    }
}

/// A reference that may still be a deferred name awaiting resolution
/// (`goto` before the post-analysis linking pass runs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum OptLink<T> {
    Unresolved(String),
    Resolved(NodeId<T>),
}

impl<T> OptLink<T> {
    pub fn unresolved(name: impl Into<String>) -> Self {
        OptLink::Unresolved(name.into())
    }

    pub fn resolve(&mut self, id: NodeId<T>) {
        *self = OptLink::Resolved(id);
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, OptLink::Resolved(_))
    }

    pub fn id(&self) -> Option<NodeId<T>> {
        match self {
            OptLink::Resolved(id) => Some(*id),
            OptLink::Unresolved(_) => None,
        }
    }

    pub fn deferred_name(&self) -> Option<&str> {
        match self {
            OptLink::Unresolved(name) => Some(name.as_str()),
            OptLink::Resolved(_) => None,
        }
    }
}

/// A flat, append-only owner of every `T` in one tree. `Link<T>`/`OptLink<T>`
/// values elsewhere in the same tree index into this arena instead of
/// pointing at it directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arena<T> {
    nodes: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    pub fn push(&mut self, value: T) -> NodeId<T> {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(value);
        id
    }

    pub fn get(&self, id: NodeId<T>) -> &T {
        &self.nodes[id.index]
    }

    pub fn get_mut(&mut self, id: NodeId<T>) -> &mut T {
        &mut self.nodes[id.index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up the index of the first node satisfying `pred`, useful for
    /// resolving an `OptLink`'s deferred name against e.g. subcircuit names.
    pub fn position<F: Fn(&T) -> bool>(&self, pred: F) -> Option<NodeId<T>> {
        self.nodes.iter().position(|n| pred(n)).map(NodeId::new)
    }

    /// Every `NodeId` in this arena, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId<T>> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_panics_if_accessed_before_completion() {
        let one: One<i32> = One::empty();
        assert!(!one.is_complete());
        let result = std::panic::catch_unwind(|| one.get());
        assert!(result.is_err());
    }

    #[test]
    fn many_rejects_empty_vec() {
        assert!(Many::<i32>::new(vec![]).is_err());
        assert!(Many::new(vec![1]).is_ok());
    }

    #[test]
    fn arena_push_and_get_roundtrip() {
        let mut arena: Arena<String> = Arena::new();
        let id = arena.push("foo".to_string());
        assert_eq!(arena.get(id), "foo");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn opt_link_resolves_from_unresolved() {
        let mut arena: Arena<String> = Arena::new();
        let id = arena.push("bar".to_string());
        let mut link: OptLink<String> = OptLink::unresolved("bar");
        assert!(!link.is_resolved());
        link.resolve(id);
        assert!(link.is_resolved());
        assert_eq!(arena.get(link.id().unwrap()), "bar");
    }

    #[test]
    fn ids_enumerates_in_insertion_order() {
        let mut arena: Arena<String> = Arena::new();
        let a = arena.push("a".to_string());
        let b = arena.push("b".to_string());
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn position_finds_matching_node() {
        let mut arena: Arena<String> = Arena::new();
        arena.push("a".to_string());
        let b_id = arena.push("b".to_string());
        assert_eq!(arena.position(|s| s == "b"), Some(b_id));
        assert_eq!(arena.position(|s| s == "z"), None);
    }
}
