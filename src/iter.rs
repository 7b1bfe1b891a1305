//! Fail-fast iteration with typed failures
//!
//! These helpers visit every element of a collection with a fallible
//! callback. The first failure stops the walk: later elements are never
//! visited and the failure is returned unchanged.
//!
//! - **`for_each_element`**: one callback call per element, in iteration order
//! - **`for_each_entry`**: one callback call per key/value pair of a map
//! - **`split`**: adapt a two-argument callback to take a `(key, value)` pair
//!
//! # Examples
//!
//! ```
//! use undertow::iter::for_each_element;
//!
//! let mut seen = Vec::new();
//! let result = for_each_element(vec![1, 2, 3], |n| {
//!     if n == 2 {
//!         return Err(format!("{} rejected", n));
//!     }
//!     seen.push(n);
//!     Ok(())
//! });
//!
//! assert_eq!(result, Err("2 rejected".to_string()));
//! assert_eq!(seen, vec![1]);
//! ```

/// Adapt a two-argument callback into one taking a `(key, value)` tuple.
///
/// Whatever `f` returns, including its failures, passes through unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use undertow::iter::split;
///
/// let prices = BTreeMap::from([("apple", 3), ("pear", 5)]);
/// let labels: Vec<String> = prices
///     .into_iter()
///     .map(split(|name: &str, cents: i32| format!("{}={}", name, cents)))
///     .collect();
/// assert_eq!(labels, vec!["apple=3", "pear=5"]);
/// ```
pub fn split<K, V, R, F>(mut f: F) -> impl FnMut((K, V)) -> R
where
    F: FnMut(K, V) -> R,
{
    move |(key, value)| f(key, value)
}

/// Call `f` on each element of `items` in iteration order, stopping at the
/// first failure.
///
/// # Type Parameters
///
/// * `I` - Input collection type
/// * `E` - Failure type, chosen by the caller
/// * `F` - Callback type
pub fn for_each_element<I, E, F>(items: I, mut f: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<(), E>,
{
    for (index, item) in items.into_iter().enumerate() {
        if let Err(error) = f(item) {
            tracing::debug!(index, "iteration stopped at first failure");
            return Err(error);
        }
    }
    Ok(())
}

/// Call `f` with each key and value of `map`, stopping at the first failure.
///
/// Entries are visited in the map's own iteration order, which for a
/// `HashMap` is unspecified. Pass `&map` to borrow the entries.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use undertow::iter::for_each_entry;
///
/// let limits = HashMap::from([("cpu", 4), ("mem", 0)]);
/// let result = for_each_entry(&limits, |name, limit| {
///     if *limit == 0 {
///         Err(format!("{} has no limit", name))
///     } else {
///         Ok(())
///     }
/// });
/// assert_eq!(result, Err("mem has no limit".to_string()));
/// ```
pub fn for_each_entry<M, K, V, E, F>(map: M, f: F) -> Result<(), E>
where
    M: IntoIterator<Item = (K, V)>,
    F: FnMut(K, V) -> Result<(), E>,
{
    for_each_element(map, split(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use tracing_test::traced_test;

    #[test]
    fn test_for_each_element_visits_all_in_order() {
        let mut seen = Vec::new();

        let result: Result<(), String> = for_each_element(["a", "b", "c"], |s| {
            seen.push(s);
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    #[traced_test]
    fn test_for_each_element_stops_at_first_failure() {
        let mut seen = Vec::new();

        let result = for_each_element(vec![1, 2, 3], |n| {
            seen.push(n);
            if n == 2 {
                Err(format!("failed on {}", n))
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("failed on 2".to_string()));
        assert_eq!(seen, vec![1, 2]);
        assert!(logs_contain("index=1"));
    }

    #[test]
    fn test_for_each_element_empty() {
        let result = for_each_element(Vec::<i32>::new(), |_| Err("never"));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_for_each_element_borrowed_items() {
        let words = vec!["x".to_string(), "yy".to_string()];
        let mut total = 0;

        let result: Result<(), ()> = for_each_element(&words, |w| {
            total += w.len();
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(total, 3);
    }

    #[test]
    fn test_for_each_entry_visits_each_pair_once() {
        let map = HashMap::from([("a", 1), ("b", 2)]);
        let mut seen = Vec::new();

        let result: Result<(), String> = for_each_entry(&map, |k, v| {
            seen.push((*k, *v));
            Ok(())
        });

        assert!(result.is_ok());
        seen.sort();
        assert_eq!(seen, vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_for_each_entry_stops_at_first_failure() {
        let map = BTreeMap::from([(1, "one"), (2, "two"), (3, "three")]);
        let mut visited = Vec::new();

        let result = for_each_entry(map, |k, v| {
            visited.push(k);
            if v == "two" {
                Err(k)
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err(2));
        assert_eq!(visited, vec![1, 2]);
    }

    #[test]
    fn test_split_passes_key_and_value() {
        let mut f = split(|k: &str, v: i32| format!("{}{}", k, v));
        assert_eq!(f(("k", 1)), "k1");
        assert_eq!(f(("j", 2)), "j2");
    }
}
