//! Derivation: walk an annotated record and build the flat spec catalogue.
//!
//! The walk is depth-first and pre-order. For each field of a record:
//! 1) emit the field spec (declared type, tags, runtime data)
//! 2) decompose the value: record fields, or one element-schema spec at
//!    `field/0` for sequences
//! 3) derive metadata and directive annotations as children of the field
//!
//! Element-schema specs describe every element of a sequence at once, so
//! they (and everything below them) carry no data.

use crate::model::{Annotation, Describe, Hint, Node, Record, Type, Value};
use crate::spec::{Path, Spec, Specs, Tag};
use crate::{Error, Result};
use heck::ToSnakeCase;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Which type a spec records when the declared type is a union.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnionRepresentative {
    /// The first listed member.
    #[default]
    First,
    /// The union itself, as declared.
    Whole,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    pub union_representative: UnionRepresentative,
}

#[derive(Debug, Clone, Default)]
pub struct Deriver {
    options: DeriveOptions,
}

/// Derive with default options.
pub fn derive(value: &impl Describe) -> Result<Specs> {
    Deriver::new().derive(value)
}

impl Deriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DeriveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DeriveOptions {
        &self.options
    }

    pub fn derive(&self, value: &impl Describe) -> Result<Specs> {
        self.derive_record(&Path::root(), &value.describe())
    }

    /// Derive with every id placed under `parent` instead of the root.
    pub fn derive_at(&self, parent: &Path, value: &impl Describe) -> Result<Specs> {
        self.derive_record(parent, &value.describe())
    }

    /// Derive from an arbitrary node; only records are valid roots.
    pub fn derive_node(&self, node: &Node) -> Result<Specs> {
        match node {
            Node::Record(record) => self.derive_record(&Path::root(), record),
            Node::Sequence(_) => Err(Error::unsupported(
                Path::root(),
                "root is a sequence, not a record",
            )),
            Node::Scalar(value) => Err(Error::unsupported(
                Path::root(),
                format!("root is a {} scalar, not a record", value.kind()),
            )),
        }
    }

    /// Schema-only catalogue of a bare hint: no runtime value, so every
    /// spec has empty data. Metadata annotations still carry their own data.
    pub fn derive_hint(&self, hint: &Hint) -> Result<Specs> {
        let mut walk = self.walk();
        walk.visit(&Path::root(), hint, None, Mode::Schema)?;

        debug!(ty = %hint.ty, specs = walk.specs.len(), "derived schema specs");
        Ok(walk.specs)
    }

    fn derive_record(&self, root: &Path, record: &Record) -> Result<Specs> {
        let mut walk = self.walk();
        let spec = Spec::new(root.clone(), Type::record(&record.name)).with_data(record.to_value());
        walk.emit(spec)?;
        walk.fields(root, record, Mode::Data)?;

        debug!(root = %record.name, specs = walk.specs.len(), "derived specs");
        Ok(walk.specs)
    }

    fn walk(&self) -> Walk<'_> {
        Walk {
            options: &self.options,
            specs: Specs::new(),
            seen: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Nodes own runtime values.
    Data,
    /// Nodes describe an element schema; the runtime node (if any) only
    /// supplies the layout.
    Schema,
}

struct Walk<'a> {
    options: &'a DeriveOptions,
    specs: Specs,
    seen: HashSet<Path>,
}

impl Walk<'_> {
    fn emit(&mut self, spec: Spec) -> Result<()> {
        if !self.seen.insert(spec.id.clone()) {
            return Err(Error::DuplicatePath(spec.id.to_string()));
        }
        trace!(id = %spec.id, ty = %spec.ty, "emit spec");
        self.specs.push(spec);
        Ok(())
    }

    fn fields(&mut self, parent: &Path, record: &Record, mode: Mode) -> Result<()> {
        for field in &record.fields {
            let path = parent.join(&field.name)?;
            self.visit(&path, &field.hint, Some(&field.value), mode)?;
        }
        Ok(())
    }

    fn visit(&mut self, path: &Path, hint: &Hint, node: Option<&Node>, mode: Mode) -> Result<()> {
        if let Some(Node::Scalar(value)) = node {
            if matches!(value, Value::List(_) | Value::Record { .. }) {
                return Err(Error::unsupported(
                    path,
                    format!("scalar holds a {} value; use a structural node", value.kind()),
                ));
            }
        }

        let member = self.decomposition_member(&hint.ty, node);
        let mut spec = Spec::new(path.clone(), self.representative(&hint.ty)).with_tags(tags(hint));
        if mode == Mode::Data {
            spec.data = node.map(Node::to_value);
        }
        self.emit(spec)?;

        match node {
            Some(Node::Record(record)) => self.fields(path, record, mode)?,
            _ if member.element().is_some() || matches!(node, Some(Node::Sequence(_))) => {
                let first = match node {
                    Some(Node::Sequence(items)) => items.first(),
                    _ => None,
                };
                let element = hint.element_hint(&member);
                self.visit(&path.join_index(0), &element, first, Mode::Schema)?;
            }
            _ => {}
        }

        self.annotations(path, &hint.annotations)
    }

    /// Metadata and directive records, at `path/<snake_case name>`.
    fn annotations(&mut self, path: &Path, annotations: &[Annotation]) -> Result<()> {
        let records: Vec<Cow<'_, Record>> = annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Tag(_) => None,
                Annotation::Meta(record) => Some(Cow::Borrowed(record)),
                Annotation::Directive(directive) => Some(Cow::Owned(directive.to_record())),
            })
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *counts.entry(record.name.as_str()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            let base = record.name.to_snake_case();
            let segment = if counts[record.name.as_str()] > 1 {
                let n = seen.entry(record.name.as_str()).or_default();
                let segment = format!("{}_{}", base, n);
                *n += 1;
                segment
            } else {
                base
            };

            let meta_path = path.join(&segment)?;
            let spec = Spec::new(meta_path.clone(), Type::record(&record.name))
                .with_data(record.to_value());
            self.emit(spec)?;
            self.fields(&meta_path, record, Mode::Data)?;
        }
        Ok(())
    }

    fn representative(&self, declared: &Type) -> Type {
        match (self.options.union_representative, declared) {
            (UnionRepresentative::First, Type::Union(members)) => {
                members.first().cloned().unwrap_or(Type::Any)
            }
            _ => declared.clone(),
        }
    }

    /// The union member whose shape fits the runtime node.
    ///
    /// Ties go to the earliest member; without any fit, the first listed
    /// member is used.
    fn decomposition_member(&self, declared: &Type, node: Option<&Node>) -> Type {
        let Type::Union(members) = declared else {
            return declared.clone();
        };
        node.and_then(|n| members.iter().find(|m| m.fits(n)))
            .or_else(|| members.first())
            .cloned()
            .unwrap_or(Type::Any)
    }
}

fn tags(hint: &Hint) -> Vec<Tag> {
    hint.annotations
        .iter()
        .filter_map(|a| match a {
            Annotation::Tag(tag) => Some(*tag),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    crate::tag_kind! {
        enum Kind { Data, Meta, Dtype }
    }

    fn ids(specs: &Specs) -> Vec<String> {
        specs.iter().map(|s| s.id.to_string()).collect()
    }

    fn at<'a>(specs: &'a Specs, id: &str) -> &'a Spec {
        specs.get(&Path::parse(id).unwrap()).unwrap()
    }

    #[test]
    fn sequence_yields_one_schema_node() {
        let record = Record::new("Weather").field("temp", Type::list(Type::Float), vec![1.0, 2.0]);
        let specs = derive(&record).unwrap();

        assert_eq!(ids(&specs), ["/", "/temp", "/temp/0"]);
        assert_eq!(
            at(&specs, "/temp").data,
            Some(Value::List(vec![Value::Float(1.0), Value::Float(2.0)]))
        );
        assert_eq!(at(&specs, "/temp/0").data, None);
        assert_eq!(at(&specs, "/temp/0").ty, Type::Float);
        assert_eq!(at(&specs, "/").ty, Type::record("Weather"));
    }

    #[test]
    fn empty_sequence_still_has_schema() {
        let record = Record::new("R").field("xs", Type::list(Type::Int), Vec::<i64>::new());
        let specs = derive(&record).unwrap();
        assert_eq!(ids(&specs), ["/", "/xs", "/xs/0"]);
    }

    #[test]
    fn nested_lists_recurse_schema() {
        let record = Record::new("R").field(
            "grid",
            Type::list(Type::list(Type::Int)),
            Vec::<Vec<i64>>::new(),
        );
        let specs = derive(&record).unwrap();
        assert_eq!(ids(&specs), ["/", "/grid", "/grid/0", "/grid/0/0"]);
        assert_eq!(at(&specs, "/grid/0").ty, Type::list(Type::Int));
    }

    #[test]
    fn record_elements_are_schema_only() {
        let point =
            |x: f64| Record::new("Point").field("x", Hint::new(Type::Float).with(Kind::Data), x);
        let record = Record::new("R").field(
            "points",
            Type::list(Type::record("Point")),
            vec![point(1.0), point(2.0)],
        );
        let specs = derive(&record).unwrap();
        assert_eq!(ids(&specs), ["/", "/points", "/points/0", "/points/0/x"]);
        assert_eq!(at(&specs, "/points/0/x").data, None);
        assert_eq!(at(&specs, "/points/0/x").tags, vec![Tag::from(Kind::Data)]);
    }

    #[test]
    fn element_annotations_land_on_schema_node() {
        let record = Record::new("R").field(
            "temp",
            Hint::list(Hint::new(Type::Float).with(Kind::Dtype)).with(Kind::Data),
            vec![1.0],
        );
        let specs = derive(&record).unwrap();
        assert_eq!(at(&specs, "/temp").tags, vec![Tag::from(Kind::Data)]);
        assert_eq!(at(&specs, "/temp/0").tags, vec![Tag::from(Kind::Dtype)]);
    }

    #[test]
    fn nested_records_recurse_with_data() {
        let inner = Record::new("Inner").field("v", Type::Int, 3);
        let record = Record::new("Outer").field("inner", Type::record("Inner"), inner.clone());
        let specs = derive(&record).unwrap();
        assert_eq!(ids(&specs), ["/", "/inner", "/inner/v"]);
        assert_eq!(at(&specs, "/inner").data, Some(inner.to_value()));
        assert_eq!(at(&specs, "/inner/v").data, Some(Value::Int(3)));
    }

    #[test]
    fn metadata_is_a_structural_child() {
        let attrs = Record::new("UnitAttrs")
            .field("name", Hint::new(Type::Str).with(Kind::Meta), "Temperature")
            .field("units", Hint::new(Type::Str).with(Kind::Meta), "K");
        let record = Record::new("R").field(
            "temp",
            Hint::new(Type::Float).with(Kind::Data).with(attrs.clone()),
            20.0,
        );
        let specs = derive(&record).unwrap();
        assert_eq!(
            ids(&specs),
            ["/", "/temp", "/temp/unit_attrs", "/temp/unit_attrs/name", "/temp/unit_attrs/units"]
        );
        assert_eq!(at(&specs, "/temp").tags, vec![Tag::from(Kind::Data)]);
        assert_eq!(at(&specs, "/temp/unit_attrs").data, Some(attrs.to_value()));
        assert_eq!(at(&specs, "/temp/unit_attrs/units").tags, vec![Tag::from(Kind::Meta)]);
    }

    #[test]
    fn repeated_metadata_names_are_numbered() {
        let note = |s: &str| Record::new("Note").field("text", Type::Str, s);
        let record = Record::new("R").field(
            "a",
            Hint::new(Type::Int).with(note("x")).with(note("y")),
            1,
        );
        let specs = derive(&record).unwrap();
        assert_eq!(
            ids(&specs),
            ["/", "/a", "/a/note_0", "/a/note_0/text", "/a/note_1", "/a/note_1/text"]
        );
    }

    #[test]
    fn union_representative_and_decomposition() {
        let declared = Type::Union(vec![Type::Str, Type::list(Type::Int)]);
        let record = Record::new("R").field("u", declared.clone(), vec![1_i64, 2]);

        let specs = derive(&record).unwrap();
        // Recorded type is the first member, but the list member decomposes.
        assert_eq!(at(&specs, "/u").ty, Type::Str);
        assert_eq!(at(&specs, "/u/0").ty, Type::Int);

        let whole = Deriver::with_options(DeriveOptions {
            union_representative: UnionRepresentative::Whole,
        })
        .derive(&record)
        .unwrap();
        assert_eq!(at(&whole, "/u").ty, declared);
    }

    #[test]
    fn union_without_fit_falls_back_to_first_member() {
        let declared = Type::Union(vec![Type::list(Type::Float), Type::Str]);
        let record = Record::new("R").field("u", declared, true);
        let specs = derive(&record).unwrap();
        // No member fits a bool; the first member (a list) is decomposed.
        assert_eq!(ids(&specs), ["/", "/u", "/u/0"]);
    }

    #[test]
    fn union_of_lists_decomposes_by_element() {
        let declared = Type::Union(vec![Type::list(Type::Str), Type::list(Type::Int)]);
        let record = Record::new("R").field("u", declared, vec![1_i64, 2]);
        let specs = derive(&record).unwrap();
        assert_eq!(at(&specs, "/u").ty, Type::list(Type::Str));
        assert_eq!(at(&specs, "/u/0").ty, Type::Int);
    }

    #[test]
    fn derives_under_a_parent_path() {
        let record = Record::new("R").field("temp", Type::list(Type::Float), vec![1.0]);
        let parent = Path::parse("/weather/day").unwrap();
        let specs = Deriver::new().derive_at(&parent, &record).unwrap();

        assert_eq!(ids(&specs), ["/weather/day", "/weather/day/temp", "/weather/day/temp/0"]);
        assert_eq!(at(&specs, "/weather/day").name, "day");
        assert_eq!(
            at(&specs, "/weather/day/temp").data,
            Some(Value::List(vec![Value::Float(1.0)]))
        );
    }

    #[test]
    fn hint_derives_schema_only() {
        let attrs = Record::new("Attrs").field("units", Type::Str, "K");
        let hint = Hint::list(Hint::new(Type::Float).with(Kind::Dtype))
            .with(Kind::Data)
            .with(Annotation::Meta(attrs));
        let specs = Deriver::new().derive_hint(&hint).unwrap();

        assert_eq!(ids(&specs), ["/", "/0", "/attrs", "/attrs/units"]);
        assert_eq!(at(&specs, "/").ty, Type::list(Type::Float));
        assert_eq!(at(&specs, "/").tags, vec![Tag::from(Kind::Data)]);
        assert_eq!(at(&specs, "/").data, None);
        assert_eq!(at(&specs, "/0").tags, vec![Tag::from(Kind::Dtype)]);
        assert_eq!(at(&specs, "/0").data, None);
        assert_eq!(at(&specs, "/attrs/units").data, Some(Value::from("K")));
    }

    #[test]
    fn optional_null_does_not_decompose() {
        let record =
            Record::new("R").field("o", Type::optional(Type::list(Type::Int)), None::<i64>);
        let specs = derive(&record).unwrap();
        assert_eq!(ids(&specs), ["/", "/o"]);
        assert_eq!(at(&specs, "/o").data, Some(Value::Null));
    }

    #[test]
    fn rejects_non_record_root() {
        let deriver = Deriver::new();
        assert!(matches!(
            deriver.derive_node(&Node::from(1.0)),
            Err(Error::UnsupportedValue { .. })
        ));
        assert!(matches!(
            deriver.derive_node(&Node::from(vec![1.0])),
            Err(Error::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn rejects_structured_scalar() {
        let record = Record::new("R").field("x", Type::Any, Node::Scalar(Value::List(vec![])));
        assert!(matches!(derive(&record), Err(Error::UnsupportedValue { .. })));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let inner = Record::new("Inner").field("note", Type::Str, "a");
        let record = Record::new("R").field(
            "x",
            Hint::new(Type::record("Inner")).with(Record::new("Note")),
            inner,
        );
        assert!(matches!(derive(&record), Err(Error::DuplicatePath(_))));
    }

    #[test]
    fn rejects_bad_field_names() {
        let record = Record::new("R").field("a/b", Type::Int, 1);
        assert!(matches!(derive(&record), Err(Error::MalformedPath { .. })));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: DeriveOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DeriveOptions::default());
        let options: DeriveOptions =
            serde_json::from_str(r#"{"union_representative": "whole"}"#).unwrap();
        assert_eq!(options.union_representative, UnionRepresentative::Whole);
    }
}
