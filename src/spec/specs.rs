//! Ordered spec collection and its selection/grouping algebra.
//!
//! `Specs` is an arena: derivation order is storage order and indices stay
//! stable for the life of the collection. Queries return [`View`]s (index
//! lists into the arena) instead of deep copies; rewrite passes mutate specs
//! in place by index.

use crate::model::Type;
use crate::spec::{Attr, AttrValue, Path, Pattern, Spec, Tag, TagKind};
use crate::Result;
use serde::Serialize;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Specs {
    items: Vec<Spec>,
}

/// What a `select` call keeps. One kind per call; intersect by chaining.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Specs carrying this exact tag.
    Tag(Tag),
    /// Specs carrying any tag of one enumeration.
    Family { id: TypeId, name: &'static str },
    /// Specs whose type is accepted by this type.
    Type(Type),
    /// Specs whose id full-matches this pattern.
    Pattern(Pattern),
}

impl Selector {
    pub fn tag(tag: impl Into<Tag>) -> Self {
        Selector::Tag(tag.into())
    }

    pub fn family<K: TagKind>() -> Self {
        Selector::Family {
            id: TypeId::of::<K>(),
            name: K::family(),
        }
    }

    pub fn ty(ty: Type) -> Self {
        Selector::Type(ty)
    }

    /// Compile `pattern`; fails with `InvalidPattern`.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Selector::Pattern(Pattern::new(pattern)?))
    }

    pub fn keeps(&self, spec: &Spec) -> bool {
        match self {
            Selector::Tag(tag) => spec.has_tag(tag),
            Selector::Family { id, .. } => spec.tags.iter().any(|t| t.family_id() == *id),
            Selector::Type(ty) => ty.accepts(&spec.ty),
            Selector::Pattern(pattern) => spec.id.matches(pattern),
        }
    }
}

impl Specs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spec> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Spec] {
        &self.items
    }

    pub(crate) fn push(&mut self, spec: Spec) {
        self.items.push(spec);
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Spec> {
        self.items.get_mut(index)
    }

    pub fn get(&self, id: &Path) -> Option<&Spec> {
        self.position(id).map(|i| &self.items[i])
    }

    /// Arena index of the spec with this id.
    pub fn position(&self, id: &Path) -> Option<usize> {
        self.items.iter().position(|s| s.id == *id)
    }

    /// id -> arena index, for passes that resolve many ids.
    pub(crate) fn index_by_id(&self) -> HashMap<&Path, usize> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, i))
            .collect()
    }

    /// A view over the whole collection.
    pub fn view(&self) -> View<'_> {
        View {
            source: self,
            indices: (0..self.items.len()).collect(),
        }
    }

    pub fn select(&self, selector: &Selector) -> View<'_> {
        self.view().select(selector)
    }

    pub fn group_by(&self, attr: Attr) -> Vec<View<'_>> {
        self.view().group_by(attr)
    }

    /// Top-level specs of the whole collection, each with its descendants.
    pub fn groups(&self) -> Vec<View<'_>> {
        self.view().groups()
    }

    /// Like [`Specs::groups`], keeping only groups whose top-level spec is
    /// kept by `selector`. Members are not filtered.
    pub fn groups_of(&self, selector: &Selector) -> Vec<View<'_>> {
        self.view()
            .groups()
            .into_iter()
            .filter(|g| g.first().is_some_and(|top| selector.keeps(top)))
            .collect()
    }

    pub fn first(&self) -> Option<&Spec> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Spec> {
        self.items.last()
    }

    /// The only spec, if there is exactly one.
    pub fn unique(&self) -> Option<&Spec> {
        match self.items.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<Vec<Spec>> for Specs {
    fn from(items: Vec<Spec>) -> Self {
        Self { items }
    }
}

impl FromIterator<Spec> for Specs {
    fn from_iter<I: IntoIterator<Item = Spec>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Specs {
    type Output = Spec;

    fn index(&self, index: usize) -> &Spec {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Specs {
    type Item = &'a Spec;
    type IntoIter = std::slice::Iter<'a, Spec>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Specs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for spec in &self.items {
            writeln!(f, "{}", spec)?;
        }
        Ok(())
    }
}

/// Ordered subset of a [`Specs`] arena.
///
/// Two views are equal when they index the same arena at the same positions.
#[derive(Debug, Clone)]
pub struct View<'a> {
    source: &'a Specs,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Arena indices, in collection order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Spec> + '_ {
        let source = self.source;
        self.indices.iter().map(move |&i| &source.items[i])
    }

    pub fn ids(&self) -> Vec<&'a Path> {
        self.iter().map(|s| &s.id).collect()
    }

    pub fn first(&self) -> Option<&'a Spec> {
        self.indices.first().map(|&i| &self.source.items[i])
    }

    pub fn last(&self) -> Option<&'a Spec> {
        self.indices.last().map(|&i| &self.source.items[i])
    }

    pub fn unique(&self) -> Option<&'a Spec> {
        match self.indices.as_slice() {
            [only] => Some(&self.source.items[*only]),
            _ => None,
        }
    }

    pub fn select(&self, selector: &Selector) -> View<'a> {
        self.filter(|spec| selector.keeps(spec))
    }

    pub(crate) fn filter(&self, mut keep: impl FnMut(&Spec) -> bool) -> View<'a> {
        let source = self.source;
        View {
            source,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&source.items[i]))
                .collect(),
        }
    }

    /// Partition by attribute equality.
    ///
    /// Buckets are ordered by first occurrence of their key, not adjacency:
    /// keys `[A, B, A, C]` give `[A(1, 3), B(2), C(4)]`.
    pub fn group_by(&self, attr: Attr) -> Vec<View<'a>> {
        // Keys are not hashable (data may hold floats), so buckets are
        // matched by linear equality search.
        let mut keys: Vec<AttrValue> = Vec::new();
        let mut buckets: Vec<Vec<usize>> = Vec::new();

        for &i in &self.indices {
            let key = self.source.items[i].attr(attr);
            match keys.iter().position(|k| *k == key) {
                Some(b) => buckets[b].push(i),
                None => {
                    keys.push(key);
                    buckets.push(vec![i]);
                }
            }
        }

        buckets
            .into_iter()
            .map(|indices| View {
                source: self.source,
                indices,
            })
            .collect()
    }

    /// Top-level specs of this view, each followed by its descendants.
    ///
    /// Top-level specs are the direct children of the common ancestor of all
    /// ids in the view.
    pub fn groups(&self) -> Vec<View<'a>> {
        let mut ids = self.iter().map(|s| &s.id);
        let Some(first) = ids.next() else {
            return Vec::new();
        };
        let common = ids.fold(first.clone(), |acc, id| acc.common_ancestor(id));

        self.iter()
            .filter(|s| s.id.parent().as_ref() == Some(&common))
            .map(|top| self.filter(|s| s.id.starts_with(&top.id)))
            .collect()
    }

    /// Copy the viewed specs into a new collection.
    pub fn to_specs(&self) -> Specs {
        self.iter().cloned().collect()
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.source, other.source) && self.indices == other.indices
    }
}
