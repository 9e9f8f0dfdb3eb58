//! Relationship lookups used by list views and the `featureViews` filter.

use std::collections::BTreeMap;

use crate::types::{Position, Relationship, RelationshipIndex};

/// Relationships of `item_key` whose target type equals `target_type`.
///
/// Order follows the index; an unknown key yields nothing.
pub fn relationships_of_type<'a>(
    index: &'a RelationshipIndex,
    item_key: &str,
    target_type: &str,
) -> Vec<&'a Relationship> {
    relationships_by_position(index, item_key, target_type, Position::Target)
}

/// Relationships of `item_key` whose endpoint on `position` has type
/// `object_type`.
pub fn relationships_by_position<'a>(
    index: &'a RelationshipIndex,
    item_key: &str,
    object_type: &str,
    position: Position,
) -> Vec<&'a Relationship> {
    relationships_in(index.get(item_key), object_type, position)
}

/// [`relationships_by_position`] over a plain relationship list.
pub fn relationships_in<'a>(
    relationships: &'a [Relationship],
    object_type: &str,
    position: Position,
) -> Vec<&'a Relationship> {
    relationships
        .iter()
        .filter(|r| r.endpoint(position).has_type(object_type))
        .collect()
}

/// Count endpoints per requested type.
///
/// Source and target are both counted, so a relationship between two objects
/// of a requested type counts twice. Every requested type appears in the
/// result, with zero if absent.
pub fn count_relationship_types<S: AsRef<str>>(
    relationships: &[Relationship],
    types: &[S],
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> =
        types.iter().map(|t| (t.as_ref().to_string(), 0)).collect();

    for relationship in relationships {
        for endpoint in [&relationship.source, &relationship.target] {
            if let Some(count) = endpoint.object_type().and_then(|t| counts.get_mut(t)) {
                *count += 1;
            }
        }
    }

    counts
}
