//! Membership list reconciliation.
//!
//! Pure functions computing the next value of an ordered id list. Neither
//! mutates its input. `append` keeps duplicates and `remove_first` only drops
//! the earliest match, so a list that picked up a duplicate through a race
//! shrinks by one entry per removal.

/// New list with `item` at the end.
pub fn append<T: Clone>(list: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(list.len() + 1);
    next.extend_from_slice(list);
    next.push(item);
    next
}

/// New list without the first occurrence of `item`; a copy of `list` when
/// `item` is absent.
pub fn remove_first<T: Clone + PartialEq>(list: &[T], item: &T) -> Vec<T> {
    let mut next = list.to_vec();
    if let Some(pos) = next.iter().position(|x| x == item) {
        next.remove(pos);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let list = ids(&["a", "b"]);
        assert_eq!(append(&list, "c".to_string()), ids(&["a", "b", "c"]));
        assert_eq!(append(&list, "a".to_string()), ids(&["a", "b", "a"]));
        assert_eq!(list, ids(&["a", "b"]));
    }

    #[test]
    fn test_remove_first_only() {
        let list = ids(&["veh1", "veh2", "veh1"]);
        assert_eq!(remove_first(&list, &"veh1".to_string()), ids(&["veh2", "veh1"]));
    }

    #[test]
    fn test_remove_absent_is_identity() {
        let list = ids(&["veh1", "veh2", "veh3"]);
        assert_eq!(remove_first(&list, &"veh9".to_string()), list);
        assert!(remove_first(&Vec::<String>::new(), &"x".to_string()).is_empty());
    }
}
