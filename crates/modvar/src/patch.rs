//! mark computed positions as [Value::Pending]
//!
//! A computed key is a dotted path into already normalized values. Numeric
//! components index lists, everything else indexes maps.
//!
//! - `region` sets the variable `region` to pending unless it already has a value.
//! - `tags.owner` descends into `tags`. If `owner` is missing it is inserted as
//!   pending and the walk stops; remaining components are moot because the branch
//!   did not exist.
//! - `subnets.0` descends into the first element of `subnets` and leaves it as is.
use crate::value::{Value, VariableValues};
use indexmap::map::Entry;

pub fn set_pending_at_path(values: &mut VariableValues, path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let components: Vec<&str> = path.split('.').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(PathError::EmptyComponent {
            path: path.to_string(),
        });
    }

    let (first, rest) = components.split_first().ok_or(PathError::Empty)?;

    let mut current = match values.entry(first.to_string()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            tracing::trace!(%path, variable = %first, "variable missing, marking whole variable");
            entry.insert(Value::Pending);
            return Ok(());
        }
    };

    for component in rest {
        current = match current {
            Value::List(items) => {
                let index: usize = component.parse().map_err(|_| PathError::InvalidIndex {
                    component: component.to_string(),
                    path: path.to_string(),
                })?;
                let len = items.len();
                items.get_mut(index).ok_or_else(|| PathError::IndexOutOfRange {
                    index,
                    len,
                    path: path.to_string(),
                })?
            }
            Value::Map(map) => match map.entry(component.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    tracing::trace!(%path, key = %component, "inserting pending value");
                    entry.insert(Value::Pending);
                    return Ok(());
                }
            },
            // everything below an unknown value is unknown already
            Value::Pending => return Ok(()),
            Value::String(_) => {
                return Err(PathError::NotAContainer {
                    component: component.to_string(),
                    path: path.to_string(),
                })
            }
        };
    }

    Ok(())
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("no path components in computed key")]
    Empty,
    #[error("empty path component in computed key {path}")]
    EmptyComponent { path: String },
    #[error("cannot convert {component} to list index in path {path}")]
    InvalidIndex { component: String, path: String },
    #[error("index {index} out of range (length {len}) in path {path}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        path: String,
    },
    #[error("cannot look up {component} in a string value in path {path}")]
    NotAContainer { component: String, path: String },
}

#[cfg(test)]
mod test {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn values(entries: Vec<(&str, Value)>) -> VariableValues {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(values(entries))
    }

    #[test]
    fn top_level_missing_is_inserted() {
        let mut vals = VariableValues::new();
        set_pending_at_path(&mut vals, "region").unwrap();
        assert_eq!(vals, values(vec![("region", Value::Pending)]));
    }

    #[test]
    fn top_level_present_is_kept() {
        let mut vals = values(vec![("region", "us-east-1".into())]);
        set_pending_at_path(&mut vals, "region").unwrap();
        assert_eq!(vals, values(vec![("region", "us-east-1".into())]));
    }

    #[test]
    fn nested_map_key_is_inserted() {
        let mut vals = values(vec![("tags", map(vec![("a", map(vec![("b", "x".into())]))]))]);
        set_pending_at_path(&mut vals, "tags.a.c").unwrap();

        let expected = values(vec![(
            "tags",
            map(vec![("a", map(vec![("b", "x".into()), ("c", Value::Pending)]))]),
        )]);
        assert_eq!(vals, expected);
    }

    #[test]
    fn existing_list_index_is_navigated() {
        let mut vals = values(vec![("list", vec!["x", "y"].into())]);
        set_pending_at_path(&mut vals, "list.0").unwrap();
        assert_eq!(vals, values(vec![("list", vec!["x", "y"].into())]));
    }

    #[test]
    fn map_inside_list() {
        let rule = map(vec![("port", "80".into())]);
        let mut vals = values(vec![("rules", Value::List(vec![rule]))]);
        set_pending_at_path(&mut vals, "rules.0.cidr").unwrap();

        let rule = map(vec![("port", "80".into()), ("cidr", Value::Pending)]);
        let expected = values(vec![("rules", Value::List(vec![rule]))]);
        assert_eq!(vals, expected);
    }

    #[test]
    fn insertion_ends_the_walk() {
        let mut vals = values(vec![("tags", map(vec![]))]);
        set_pending_at_path(&mut vals, "tags.a.b.c").unwrap();
        assert_eq!(vals, values(vec![("tags", map(vec![("a", Value::Pending)]))]));
    }

    #[test]
    fn missing_variable_on_deep_path() {
        let mut vals = VariableValues::new();
        set_pending_at_path(&mut vals, "tags.owner").unwrap();
        assert_eq!(vals, values(vec![("tags", Value::Pending)]));
    }

    #[test]
    fn below_pending_is_a_no_op() {
        let mut vals = values(vec![("tags", Value::Pending)]);
        set_pending_at_path(&mut vals, "tags.owner").unwrap();
        assert_eq!(vals, values(vec![("tags", Value::Pending)]));
    }

    #[test]
    fn path_errors() {
        let mut vals = values(vec![
            ("list", vec!["x"].into()),
            ("name", "web".into()),
            ("tags", Value::Map(IndexMap::new())),
        ]);

        assert_eq!(set_pending_at_path(&mut vals, ""), Err(PathError::Empty));
        assert!(matches!(
            set_pending_at_path(&mut vals, "tags..a"),
            Err(PathError::EmptyComponent { .. })
        ));
        assert!(matches!(
            set_pending_at_path(&mut vals, "list.first"),
            Err(PathError::InvalidIndex { component, .. }) if component == "first"
        ));
        assert!(matches!(
            set_pending_at_path(&mut vals, "list.-1"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert_eq!(
            set_pending_at_path(&mut vals, "list.3"),
            Err(PathError::IndexOutOfRange {
                index: 3,
                len: 1,
                path: "list.3".into()
            })
        );
        assert!(matches!(
            set_pending_at_path(&mut vals, "name.length"),
            Err(PathError::NotAContainer { .. })
        ));
    }

    #[test]
    fn order_of_disjoint_keys_does_not_matter() {
        let start = values(vec![("tags", map(vec![("a", map(vec![]))]))]);
        let keys = ["tags.a.x", "tags.b", "region"];

        let mut forward = start.clone();
        for key in keys {
            set_pending_at_path(&mut forward, key).unwrap();
        }

        let mut backward = start;
        for key in keys.iter().rev() {
            set_pending_at_path(&mut backward, key).unwrap();
        }

        // IndexMap equality ignores insertion order
        assert_eq!(forward, backward);
    }
}
