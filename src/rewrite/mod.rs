//! Declarative rewrite passes over a derived collection.
//!
//! Each pass is explicit and runs after derivation:
//! - [`apply_format`]: template substitution driven by `Format` directives
//! - [`apply_replace`]: attribute overwrite driven by `Replace` directives
//! - [`apply_name`]: display-name overwrite driven by `Name` directives
//!
//! Passes mutate matched specs in place and return how many attributes they
//! rewrote. They never add, remove or reorder specs. A pass that fails leaves
//! the collection as it was.

pub mod directive;
pub mod format;
pub mod name;
pub mod replace;

pub use directive::{Directive, Format, FormatTag, Name, NameTag, Replace, ReplaceTag};
pub use format::apply_format;
pub use name::apply_name;
pub use replace::apply_replace;

use crate::model::{Type, Value};
use crate::spec::{Attr, Pattern, Spec, Specs, Tag};
use crate::{Error, Result};
use tracing::warn;

/// Run a pass on a staged copy; `specs` only changes when the pass succeeds.
fn atomically(
    specs: &mut Specs,
    pass: impl FnOnce(&mut Specs) -> Result<usize>,
) -> Result<usize> {
    let mut staged = specs.clone();
    let rewrites = pass(&mut staged)?;
    *specs = staged;
    Ok(rewrites)
}

/// Tags identifying the parameters of one directive family.
struct Params {
    /// Record name of the directive node the parameters must sit under.
    record: &'static str,
    pattern: Tag,
    of: Tag,
    skip_if: Tag,
}

/// A directive resolved against the collection.
struct Binding {
    /// Arena index of the spec that carries the directive.
    owner: usize,
    /// Arena index of the directive's own metadata node.
    directive: usize,
    pattern: Pattern,
    attr: Attr,
    skip_if: Value,
}

impl Binding {
    /// Owner data, with empty data read as null.
    fn owner_data(&self, specs: &Specs) -> Value {
        specs[self.owner].data.clone().unwrap_or(Value::Null)
    }

    fn skipped(&self, specs: &Specs) -> bool {
        self.owner_data(specs) == self.skip_if
    }

    /// Arena indices of specs whose current id matches the pattern.
    fn targets(&self, specs: &Specs) -> Vec<usize> {
        specs
            .view()
            .filter(|s| s.id.matches(&self.pattern))
            .indices()
            .to_vec()
    }
}

/// Resolve every directive of one family, in declaration order.
///
/// A directive is anchored on its `pattern` parameter spec: the parent of
/// that spec is the directive node, the grandparent is the owner.
fn bindings(specs: &Specs, params: &Params) -> Result<Vec<Binding>> {
    let by_id = specs.index_by_id();
    let mut out = Vec::new();

    for spec in specs.iter().filter(|s| s.has_tag(&params.pattern)) {
        let Some(directive_id) = spec.id.parent() else {
            continue;
        };
        let owner = directive_id.parent().and_then(|id| by_id.get(&id).copied());
        let directive = by_id.get(&directive_id).copied();
        let (Some(owner), Some(directive)) = (owner, directive) else {
            warn!(id = %spec.id, "directive parameter without an owner spec; skipped");
            continue;
        };
        if !is_directive_node(&specs[directive], params.record) {
            warn!(id = %spec.id, "directive parameter outside a {} record; skipped", params.record);
            continue;
        }

        let param = |tag: &Tag| {
            specs
                .iter()
                .find(|s| s.has_tag(tag) && s.id.parent().as_ref() == Some(&directive_id))
        };
        let (Some(of), Some(skip_if)) = (param(&params.of), param(&params.skip_if)) else {
            warn!(directive = %directive_id, "incomplete directive; skipped");
            continue;
        };

        let pattern = expect_str(spec, Attr::Data)?;
        let attr: Attr = expect_str(of, Attr::Data)?.parse()?;

        out.push(Binding {
            owner,
            directive,
            pattern: Pattern::new(pattern)?,
            attr,
            skip_if: skip_if.data.clone().unwrap_or(Value::Null),
        });
    }

    Ok(out)
}

fn is_directive_node(spec: &Spec, record: &str) -> bool {
    matches!(&spec.ty, Type::Record(name) if name == record)
}

fn expect_str(spec: &Spec, attr: Attr) -> Result<&str> {
    match &spec.data {
        Some(Value::Str(s)) => Ok(s),
        other => Err(Error::IncompatibleValue {
            path: spec.id.to_string(),
            attr: attr.as_str(),
            expected: "str",
            found: other.as_ref().map_or("nothing", Value::kind).to_string(),
        }),
    }
}
