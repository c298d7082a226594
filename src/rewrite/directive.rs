//! Directive annotations.
//!
//! A directive is declared on a field like any other annotation. During
//! derivation it decomposes into a metadata record whose parameter fields
//! are tagged with the directive's tag family, e.g. a `Format` on `/units`
//! yields `/units/format`, `/units/format/pattern`, `/units/format/of` and
//! `/units/format/skip_if`. The rewrite passes find directives through
//! those tags.

use crate::model::{Annotation, Hint, Node, Record, Type, Value};
use crate::spec::Attr;

crate::tag_kind! {
    /// Parameters of a [`Format`] directive.
    pub enum FormatTag { Pattern, Of, SkipIf }
}

crate::tag_kind! {
    /// Parameters of a [`Replace`] directive.
    pub enum ReplaceTag { Pattern, Of, SkipIf }
}

crate::tag_kind! {
    /// Parameter of a [`Name`] directive.
    pub enum NameTag { Name }
}

/// Treat the `of` attribute of every spec matching `pattern` as a template
/// and substitute `{0}` with the owner's data.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub pattern: String,
    pub of: Attr,
    /// Owner data for which the directive is skipped.
    pub skip_if: Value,
}

impl Format {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            of: Attr::Data,
            skip_if: Value::Null,
        }
    }

    pub fn of(mut self, attr: Attr) -> Self {
        self.of = attr;
        self
    }

    pub fn skip_if(mut self, sentinel: impl Into<Value>) -> Self {
        self.skip_if = sentinel.into();
        self
    }
}

/// Overwrite the `of` attribute of every spec matching `pattern` with the
/// owner's data.
#[derive(Debug, Clone, PartialEq)]
pub struct Replace {
    pub pattern: String,
    pub of: Attr,
    pub skip_if: Value,
}

impl Replace {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            of: Attr::Data,
            skip_if: Value::Null,
        }
    }

    pub fn of(mut self, attr: Attr) -> Self {
        self.of = attr;
        self
    }

    pub fn skip_if(mut self, sentinel: impl Into<Value>) -> Self {
        self.skip_if = sentinel.into();
        self
    }
}

/// Rename the annotated spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub name: String,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Record names of the directive metadata nodes.
pub(crate) const FORMAT_RECORD: &str = "Format";
pub(crate) const REPLACE_RECORD: &str = "Replace";
pub(crate) const NAME_RECORD: &str = "Name";

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Format(Format),
    Replace(Replace),
    Name(Name),
}

impl Directive {
    /// The metadata record this directive decomposes into.
    pub fn to_record(&self) -> Record {
        match self {
            Directive::Format(f) => Record::new(FORMAT_RECORD)
                .field(
                    "pattern",
                    Hint::new(Type::Str).with(FormatTag::Pattern),
                    f.pattern.as_str(),
                )
                .field("of", Hint::new(Type::Str).with(FormatTag::Of), f.of.as_str())
                .field(
                    "skip_if",
                    Hint::new(Type::Any).with(FormatTag::SkipIf),
                    Node::from(f.skip_if.clone()),
                ),
            Directive::Replace(r) => Record::new(REPLACE_RECORD)
                .field(
                    "pattern",
                    Hint::new(Type::Str).with(ReplaceTag::Pattern),
                    r.pattern.as_str(),
                )
                .field("of", Hint::new(Type::Str).with(ReplaceTag::Of), r.of.as_str())
                .field(
                    "skip_if",
                    Hint::new(Type::Any).with(ReplaceTag::SkipIf),
                    Node::from(r.skip_if.clone()),
                ),
            Directive::Name(n) => Record::new(NAME_RECORD).field(
                "name",
                Hint::new(Type::Str).with(NameTag::Name),
                n.name.as_str(),
            ),
        }
    }
}

impl From<Format> for Annotation {
    fn from(f: Format) -> Self {
        Annotation::Directive(Directive::Format(f))
    }
}

impl From<Replace> for Annotation {
    fn from(r: Replace) -> Self {
        Annotation::Directive(Directive::Replace(r))
    }
}

impl From<Name> for Annotation {
    fn from(n: Name) -> Self {
        Annotation::Directive(Directive::Name(n))
    }
}
