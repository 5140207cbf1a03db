//! Keeps "which row the user is looking at" stable while the underlying
//! collection is rebuilt from scratch on every poll.

/// Active selection: the identity plus where it was last seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected<K> {
    pub key: K,
    pub index: usize,
}

/// Outcome of reconciling a selection against a rebuilt collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<K> {
    pub selection: Option<Selected<K>>,
    /// True when the selected identity differs from the previous one
    pub identity_changed: bool,
}

/// Picks the active item in `keys` given the previous selection.
///
/// The previous key is kept wherever it moved. Anything else, including a
/// key that vanished, resets to the first item, or to nothing for an empty
/// collection.
pub fn reconcile<K: PartialEq + Clone>(keys: &[K], previous: Option<&Selected<K>>) -> Reconciled<K> {
    let selection = previous
        .and_then(|prev| {
            keys.iter()
                .position(|k| *k == prev.key)
                .map(|index| Selected { key: prev.key.clone(), index })
        })
        .or_else(|| first(keys));

    let identity_changed = selection.as_ref().map(|s| &s.key) != previous.map(|p| &p.key);

    Reconciled { selection, identity_changed }
}

/// Moves the selection by `delta` rows, clamped to the collection
pub fn step<K: Clone>(keys: &[K], current: Option<&Selected<K>>, delta: isize) -> Option<Selected<K>> {
    if keys.is_empty() {
        return None;
    }
    let index = match current {
        Some(cur) => {
            let max = keys.len() as isize - 1;
            (cur.index as isize + delta).clamp(0, max) as usize
        }
        None => 0,
    };
    Some(Selected { key: keys[index].clone(), index })
}

fn first<K: Clone>(keys: &[K]) -> Option<Selected<K>> {
    keys.first().map(|key| Selected { key: key.clone(), index: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sel(key: &str, index: usize) -> Selected<String> {
        Selected { key: key.to_string(), index }
    }

    #[test]
    fn test_first_item_when_nothing_selected() {
        let r = reconcile(&names(&["lo", "eth0"]), None);
        assert_eq!(r.selection, Some(sel("lo", 0)));
        assert!(r.identity_changed);
    }

    #[test]
    fn test_identity_survives_reordering() {
        let prev = sel("eth0", 0);
        let r = reconcile(&names(&["lo", "wlan0", "eth0"]), Some(&prev));

        assert_eq!(r.selection, Some(sel("eth0", 2)));
        assert!(!r.identity_changed);
    }

    #[test]
    fn test_lost_identity_selects_first_not_same_position() {
        let prev = sel("eth0", 1);
        let r = reconcile(&names(&["lo", "wlan0"]), Some(&prev));

        assert_eq!(r.selection, Some(sel("lo", 0)));
        assert!(r.identity_changed);
    }

    #[test]
    fn test_lost_identity_at_head_selects_first() {
        let prev = sel("eth0", 0);
        let r = reconcile(&names(&["lo", "wlan0"]), Some(&prev));

        assert_eq!(r.selection, Some(sel("lo", 0)));
        assert!(r.identity_changed);
    }

    #[test]
    fn test_lost_identity_out_of_range_selects_first() {
        let prev = sel("veth9", 7);
        let r = reconcile(&names(&["lo", "eth0"]), Some(&prev));

        assert_eq!(r.selection, Some(sel("lo", 0)));
    }

    #[test]
    fn test_empty_collection_clears() {
        let prev = sel("eth0", 0);
        let r = reconcile::<String>(&[], Some(&prev));
        assert_eq!(r.selection, None);
        assert!(r.identity_changed);

        let r = reconcile::<String>(&[], None);
        assert_eq!(r.selection, None);
        assert!(!r.identity_changed);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let keys = names(&["lo", "eth0", "wlan0"]);
        let once = reconcile(&keys, Some(&sel("eth1", 1)));
        let twice = reconcile(&keys, once.selection.as_ref());

        assert_eq!(once.selection, twice.selection);
        assert!(!twice.identity_changed);
    }

    #[test]
    fn test_step_clamps() {
        let keys = names(&["a", "b", "c"]);
        assert_eq!(step(&keys, None, 1), Some(sel("a", 0)));
        assert_eq!(step(&keys, Some(&sel("b", 1)), 1), Some(sel("c", 2)));
        assert_eq!(step(&keys, Some(&sel("c", 2)), 5), Some(sel("c", 2)));
        assert_eq!(step(&keys, Some(&sel("a", 0)), -1), Some(sel("a", 0)));
        assert_eq!(step::<String>(&[], None, 1), None);
    }
}
