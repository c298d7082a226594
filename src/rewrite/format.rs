//! Format pass: `{0}` template substitution.

use super::{Binding, FormatTag, Params, atomically, bindings, directive};
use crate::model::Value;
use crate::spec::{Attr, Path, Spec, Specs};
use crate::{Error, Result};
use tracing::{debug, trace, warn};

const PLACEHOLDER: &str = "{0}";

/// Apply every `Format` directive, in declaration order.
///
/// The current value of each target attribute is the template, so a target
/// matched by two directives is formatted twice, left to right.
pub fn apply_format(specs: &mut Specs) -> Result<usize> {
    atomically(specs, format_all)
}

fn format_all(specs: &mut Specs) -> Result<usize> {
    let params = Params {
        record: directive::FORMAT_RECORD,
        pattern: FormatTag::Pattern.into(),
        of: FormatTag::Of.into(),
        skip_if: FormatTag::SkipIf.into(),
    };
    let mut rewrites = 0;

    for binding in bindings(specs, &params)? {
        check_template_attr(binding.attr)?;
        if binding.skipped(specs) {
            debug!(directive = %specs[binding.directive].id, "format skipped");
            continue;
        }
        let owner = binding.owner_data(specs).to_string();
        rewrites += format_targets(specs, &binding, &owner)?;
    }

    debug!(rewrites, "format pass done");
    Ok(rewrites)
}

fn check_template_attr(attr: Attr) -> Result<()> {
    match attr {
        Attr::Id | Attr::Name | Attr::Data => Ok(()),
        _ => Err(Error::InvalidSelector {
            name: attr.to_string(),
            reason: "only id, name and data can be formatted",
        }),
    }
}

fn format_targets(specs: &mut Specs, binding: &Binding, owner: &str) -> Result<usize> {
    let mut rewrites = 0;
    for index in binding.targets(specs) {
        let Some(target) = specs.get_mut(index) else {
            continue;
        };
        if format_attr(target, binding.attr, owner)? {
            trace!(id = %target.id, attr = %binding.attr, "formatted");
            rewrites += 1;
        }
    }
    Ok(rewrites)
}

fn format_attr(target: &mut Spec, attr: Attr, owner: &str) -> Result<bool> {
    match attr {
        Attr::Data => match &target.data {
            Some(Value::Str(template)) => {
                target.data = Some(Value::Str(template.replace(PLACEHOLDER, owner)));
                Ok(true)
            }
            other => {
                warn!(
                    id = %target.id,
                    found = other.as_ref().map_or("nothing", |v| v.kind()),
                    "format target data is not a string; left untouched"
                );
                Ok(false)
            }
        },
        Attr::Name => {
            target.name = target.name.replace(PLACEHOLDER, owner);
            Ok(true)
        }
        Attr::Id => {
            let rendered = target.id.to_string().replace(PLACEHOLDER, owner);
            target.id = Path::parse(&rendered)?;
            Ok(true)
        }
        _ => Err(Error::InvalidSelector {
            name: attr.to_string(),
            reason: "only id, name and data can be formatted",
        }),
    }
}
