//! Replace pass: unconditional attribute overwrite.

use super::{Params, ReplaceTag, atomically, bindings, directive};
use crate::model::Value;
use crate::spec::{Attr, Path, Spec, Specs, Tag, tag};
use crate::{Error, Result};
use tracing::{debug, trace};

/// Apply every `Replace` directive, in declaration order.
pub fn apply_replace(specs: &mut Specs) -> Result<usize> {
    atomically(specs, replace_all)
}

fn replace_all(specs: &mut Specs) -> Result<usize> {
    let params = Params {
        record: directive::REPLACE_RECORD,
        pattern: ReplaceTag::Pattern.into(),
        of: ReplaceTag::Of.into(),
        skip_if: ReplaceTag::SkipIf.into(),
    };
    let mut rewrites = 0;

    for binding in bindings(specs, &params)? {
        if binding.skipped(specs) {
            debug!(directive = %specs[binding.directive].id, "replace skipped");
            continue;
        }
        let owner = specs[binding.owner].data.clone();
        for index in binding.targets(specs) {
            let Some(target) = specs.get_mut(index) else {
                continue;
            };
            replace_attr(target, binding.attr, owner.as_ref())?;
            trace!(id = %target.id, attr = %binding.attr, "replaced");
            rewrites += 1;
        }
    }

    debug!(rewrites, "replace pass done");
    Ok(rewrites)
}

fn replace_attr(target: &mut Spec, attr: Attr, owner: Option<&Value>) -> Result<()> {
    match attr {
        Attr::Data => target.data = owner.cloned(),
        Attr::Name => target.name = owner.map(Value::to_string).unwrap_or_default(),
        Attr::Id => match owner {
            Some(Value::Str(s)) => target.id = Path::parse(s)?,
            other => return Err(mismatch(target, attr, "path string", other)),
        },
        Attr::Type => match owner {
            Some(Value::Type(ty)) => target.ty = ty.clone(),
            other => return Err(mismatch(target, attr, "type", other)),
        },
        Attr::Tags => {
            target.tags = owner_tags(owner)
                .ok_or_else(|| mismatch(target, attr, "tag or list of tags", owner))?;
        }
    }
    Ok(())
}

fn owner_tags(owner: Option<&Value>) -> Option<Vec<Tag>> {
    match owner? {
        Value::Tag(t) => Some(vec![*t]),
        Value::List(items) => {
            let mut tags = Vec::new();
            for item in items {
                let Value::Tag(t) = item else {
                    return None;
                };
                tag::push_unique(&mut tags, *t);
            }
            Some(tags)
        }
        _ => None,
    }
}

fn mismatch(target: &Spec, attr: Attr, expected: &'static str, found: Option<&Value>) -> Error {
    Error::IncompatibleValue {
        path: target.id.to_string(),
        attr: attr.as_str(),
        expected,
        found: found.map_or("nothing", Value::kind).to_string(),
    }
}
