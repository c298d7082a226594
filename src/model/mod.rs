//! Input model: explicit descriptions of annotated records.
//!
//! A value to be derived is described as a tree of [`Node`]s. Records list
//! their fields in declaration order; every field carries a [`Hint`] (its
//! declared type plus annotation markers) and its runtime value.

pub mod types;
pub mod value;

pub use types::Type;
pub use value::Value;

use crate::rewrite::Directive;
use crate::spec::{Tag, TagKind};

/// A declared type together with its annotation markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub ty: Type,
    pub annotations: Vec<Annotation>,
    /// Annotated element hint, set only by [`Hint::list`].
    element: Option<Box<Hint>>,
}

impl Hint {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            annotations: Vec::new(),
            element: None,
        }
    }

    /// `list[element]`, keeping the element's own annotations.
    pub fn list(element: impl Into<Hint>) -> Self {
        let element = element.into();
        Self {
            ty: Type::list(element.ty.clone()),
            annotations: Vec::new(),
            element: Some(Box::new(element)),
        }
    }

    /// Append one annotation marker.
    pub fn with(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Element hint for the list type `member` chosen during decomposition.
    pub(crate) fn element_hint(&self, member: &Type) -> Hint {
        if let Some(element) = &self.element {
            if Type::list(element.ty.clone()) == *member {
                return (**element).clone();
            }
        }
        Hint::new(member.element().cloned().unwrap_or(Type::Any))
    }
}

impl From<Type> for Hint {
    fn from(ty: Type) -> Self {
        Hint::new(ty)
    }
}

/// One annotation marker on a field or element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Tag(Tag),
    /// A metadata record instance, derived as a child of the annotated node.
    Meta(Record),
    Directive(Directive),
}

impl Annotation {
    pub fn meta(value: &impl Describe) -> Self {
        Annotation::Meta(value.describe())
    }
}

impl From<Tag> for Annotation {
    fn from(tag: Tag) -> Self {
        Annotation::Tag(tag)
    }
}

impl<K: TagKind> From<K> for Annotation {
    fn from(kind: K) -> Self {
        Annotation::Tag(Tag::of(kind))
    }
}

impl From<Record> for Annotation {
    fn from(record: Record) -> Self {
        Annotation::Meta(record)
    }
}

impl From<Directive> for Annotation {
    fn from(directive: Directive) -> Self {
        Annotation::Directive(directive)
    }
}

/// A runtime value being walked.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Record(Record),
    /// Homogeneous ordered sequence.
    Sequence(Vec<Node>),
    Scalar(Value),
}

impl Node {
    pub fn to_value(&self) -> Value {
        match self {
            Node::Record(record) => record.to_value(),
            Node::Sequence(items) => Value::List(items.iter().map(Node::to_value).collect()),
            Node::Scalar(value) => value.clone(),
        }
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Node::Record(record)
    }
}

/// Lists and records become structural nodes; their fields get `any` hints.
impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Record { name, fields } => Node::Record(Record {
                name,
                fields: fields
                    .into_iter()
                    .map(|(name, value)| Field {
                        name,
                        hint: Hint::new(Type::Any),
                        value: value.into(),
                    })
                    .collect(),
            }),
            scalar => Node::Scalar(scalar),
        }
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::Sequence(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! scalar_node {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Node {
            fn from(v: $ty) -> Self {
                Node::Scalar(Value::from(v))
            }
        })*
    };
}

scalar_node!(bool, i32, i64, f64, &str, String, Type, Tag);

impl<T: Into<Value>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        Node::from(Value::from(v))
    }
}

/// A structural record instance: fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub hint: Hint,
    pub value: Node,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        hint: impl Into<Hint>,
        value: impl Into<Node>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            hint: hint.into(),
            value: value.into(),
        });
        self
    }

    pub fn to_value(&self) -> Value {
        Value::Record {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.value.to_value()))
                .collect(),
        }
    }
}

/// Registration-time description of a user record type.
///
/// This replaces runtime reflection: an implementation lists its fields in
/// declaration order with their declared types, annotations and values.
pub trait Describe {
    fn describe(&self) -> Record;
}

impl Describe for Record {
    fn describe(&self) -> Record {
        self.clone()
    }
}
