//! Flat, addressable catalogues of annotated records.
//!
//! Pipeline:
//! 1) describe a record ([`Describe`], [`Record`], [`Hint`])
//! 2) [`derive`] it into [`Specs`], one [`Spec`] per addressed node
//! 3) query with [`Specs::select`] / [`Specs::group_by`]
//! 4) run the explicit rewrite passes in [`rewrite`]
//!
//! ```
//! use dataspecs::{derive, rewrite, Format, Hint, Path, Record, Type, Value};
//!
//! let record = Record::new("Weather")
//!     .field("temp", Type::list(Type::Float), vec![20.0, 25.0])
//!     .field("label", Type::Str, "{0} K")
//!     .field("units", Hint::new(Type::Str).with(Format::new("/label")), "deg");
//!
//! let mut specs = derive(&record)?;
//! rewrite::apply_format(&mut specs)?;
//!
//! let label = specs.get(&Path::parse("/label")?).unwrap();
//! assert_eq!(label.data, Some(Value::from("deg K")));
//! # Ok::<(), dataspecs::Error>(())
//! ```

pub mod deriver;
pub mod error;
pub mod model;
pub mod rewrite;
pub mod spec;

pub use deriver::{DeriveOptions, Deriver, UnionRepresentative, derive};
pub use error::Error;
pub use model::{Annotation, Describe, Field, Hint, Node, Record, Type, Value};
pub use rewrite::{Format, Name, Replace};
pub use spec::{Attr, AttrValue, Path, Pattern, Selector, Spec, Specs, Tag, TagKind, View};

pub type Result<T> = std::result::Result<T, Error>;
