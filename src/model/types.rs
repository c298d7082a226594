//! Bare declared types, as recorded in a spec's `type` attribute.

use crate::model::{Node, Value};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
    /// The type of types: a field whose data is itself a `Type`.
    Type,
    List(Box<Type>),
    /// A structural record, by record name.
    Record(String),
    Union(Vec<Type>),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn record(name: impl Into<String>) -> Self {
        Type::Record(name.into())
    }

    pub fn optional(inner: Type) -> Self {
        Type::Union(vec![inner, Type::Null])
    }

    /// Exact or subtype-compatible match of `other` against `self`.
    pub fn accepts(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) => true,
            (a, b) if a == b => true,
            (Type::Union(members), _) if members.iter().any(|m| m.accepts(other)) => true,
            (_, Type::Union(members)) => members.iter().all(|m| self.accepts(m)),
            (Type::List(a), Type::List(b)) => a.accepts(b),
            _ => false,
        }
    }

    /// True if a runtime node has the shape this type describes.
    pub fn fits(&self, node: &Node) -> bool {
        match (self, node) {
            (Type::Any, _) => true,
            (Type::Union(members), _) => members.iter().any(|m| m.fits(node)),
            (Type::Record(name), Node::Record(record)) => *name == record.name,
            (Type::List(element), Node::Sequence(items)) => {
                items.first().is_none_or(|item| element.fits(item))
            }
            (_, Node::Scalar(value)) => self.fits_value(value),
            _ => false,
        }
    }

    fn fits_value(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Type::Null, Value::Null)
                | (Type::Bool, Value::Bool(_))
                | (Type::Int, Value::Int(_))
                | (Type::Float, Value::Float(_))
                | (Type::Str, Value::Str(_))
                | (Type::Type, Value::Type(_))
        )
    }

    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Null => f.write_str("null"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Str => f.write_str("str"),
            Type::Type => f.write_str("type"),
            Type::List(element) => write!(f, "list[{}]", element),
            Type::Record(name) => f.write_str(name),
            Type::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_forms() {
        assert_eq!(Type::list(Type::Float).to_string(), "list[float]");
        assert_eq!(Type::optional(Type::Str).to_string(), "str | null");
        assert_eq!(Type::record("Weather").to_string(), "Weather");
    }

    #[test]
    fn accepts_subtypes() {
        let num = Type::Union(vec![Type::Int, Type::Float]);
        assert!(num.accepts(&Type::Int));
        assert!(num.accepts(&Type::Float));
        assert!(!num.accepts(&Type::Str));
        assert!(Type::Any.accepts(&Type::list(Type::Str)));
        assert!(Type::list(Type::Any).accepts(&Type::list(Type::Int)));
        assert!(!Type::Int.accepts(&Type::Any));
    }

    #[test]
    fn fits_runtime_shapes() {
        assert!(Type::Float.fits(&Node::from(1.5)));
        assert!(!Type::Int.fits(&Node::from(1.5)));
        assert!(Type::list(Type::Int).fits(&Node::from(vec![1_i64, 2])));
        assert!(Type::optional(Type::Str).fits(&Node::Scalar(Value::Null)));
    }

    #[test]
    fn union_accepts_narrower_union() {
        let wide = Type::Union(vec![Type::Int, Type::Float, Type::Str]);
        assert!(wide.accepts(&Type::Union(vec![Type::Int, Type::Float])));
        assert!(!wide.accepts(&Type::optional(Type::Int)));
        assert!(Type::Int.accepts(&Type::Union(vec![Type::Int])));
    }

    #[test]
    fn list_fit_checks_first_element() {
        let ints = Node::from(vec![1_i64, 2]);
        assert!(!Type::list(Type::Str).fits(&ints));
        assert!(Type::list(Type::Int).fits(&ints));
        assert!(Type::list(Type::Str).fits(&Node::from(Vec::<i64>::new())));
    }
}
