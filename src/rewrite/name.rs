//! Name pass: overwrite display names.

use super::directive::NAME_RECORD;
use super::{NameTag, is_directive_node};
use crate::model::Value;
use crate::spec::{Specs, Tag};
use crate::Result;
use tracing::debug;

/// Rename every spec that carries a `Name` directive.
///
/// The `name` parameter spec sits at `owner/name/name` under a `Name`
/// record; its data becomes the owner's display name. Null names and
/// stray `NameTag::Name` tags outside a `Name` record are ignored.
pub fn apply_name(specs: &mut Specs) -> Result<usize> {
    let tag = Tag::from(NameTag::Name);
    let renames: Vec<(usize, String)> = {
        let by_id = specs.index_by_id();
        specs
            .iter()
            .filter(|s| s.has_tag(&tag))
            .filter_map(|param| {
                let directive_id = param.id.parent()?;
                let directive = by_id.get(&directive_id).copied()?;
                if !is_directive_node(&specs[directive], NAME_RECORD) {
                    return None;
                }
                let owner = by_id.get(&directive_id.parent()?).copied()?;
                match param.data.as_ref()? {
                    Value::Null => None,
                    name => Some((owner, name.to_string())),
                }
            })
            .collect()
    };

    let rewrites = renames.len();
    for (owner, name) in renames {
        if let Some(spec) = specs.get_mut(owner) {
            spec.name = name;
        }
    }

    debug!(rewrites, "name pass done");
    Ok(rewrites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive;
    use crate::model::{Annotation, Hint, Record, Type};
    use crate::rewrite::Name;
    use crate::spec::Path;
    use pretty_assertions::assert_eq;

    #[test]
    fn renames_owner() {
        let record = Record::new("Weather")
            .field("temp", Hint::new(Type::Float).with(Name::new("Ground temperature")), 20.0)
            .field("humid", Hint::new(Type::Float).with(Name::new("Relative humidity")), 50.0);
        let mut specs = derive(&record).unwrap();
        assert_eq!(apply_name(&mut specs).unwrap(), 2);

        let name = |id: &str| specs.get(&Path::parse(id).unwrap()).unwrap().name.clone();
        assert_eq!(name("/temp"), "Ground temperature");
        assert_eq!(name("/humid"), "Relative humidity");
        // Parameter specs keep their own names.
        assert_eq!(name("/temp/name/name"), "name");
    }

    #[test]
    fn ignores_name_tag_outside_name_record() {
        let label =
            Record::new("Label").field("name", Hint::new(Type::Str).with(NameTag::Name), "x");
        let record = Record::new("R").field(
            "temp",
            Hint::new(Type::Float).with(Annotation::Meta(label)),
            1.0,
        );
        let mut specs = derive(&record).unwrap();
        let before = specs.clone();
        assert_eq!(apply_name(&mut specs).unwrap(), 0);
        assert_eq!(specs, before);
    }
}
