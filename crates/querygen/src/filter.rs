//! Column/value maps used for WHERE and SET lists.

use crate::value::SqlValue;
use std::collections::{BTreeMap, HashMap};

/// An ordered list of `column -> value` pairs.
///
/// Used as an equality WHERE map (pairs joined with `AND`, `NULL` values
/// rendered as `IS NULL`) and as the SET list of `update_specific`. Pairs keep
/// insertion order; building a filter from a `HashMap` inherits its order.
///
/// # Example
///
/// ```ignore
/// use querygen::Filter;
///
/// let f = Filter::new().eq("phone_number", "555").eq("deleted_at", None::<i64>);
/// let g: Filter = [("id", 5)].into();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pairs: Vec<(String, SqlValue)>,
}

impl Filter {
    /// An empty filter (no WHERE clause).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column = value` pair.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Add a pair in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.pairs.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<SqlValue>, const N: usize> From<[(K, V); N]> for Filter {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> From<Vec<(K, V)>> for Filter {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> From<HashMap<K, V>> for Filter {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> From<BTreeMap<K, V>> for Filter {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Option<Filter>> for Filter {
    fn from(filter: Option<Filter>) -> Self {
        filter.unwrap_or_default()
    }
}

impl From<()> for Filter {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let f = Filter::new().eq("b", 1).eq("a", "x");
        let keys: Vec<_> = f.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn builds_from_arrays_and_maps() {
        let f: Filter = [("id", 5)].into();
        assert_eq!(f.len(), 1);

        let mut map = HashMap::new();
        map.insert("id", SqlValue::Int(5));
        map.insert("active", SqlValue::Null);
        let g = Filter::from(map);
        assert_eq!(g.len(), 2);

        assert!(Filter::from(()).is_empty());
        assert!(Filter::from(None::<Filter>).is_empty());
    }
}
