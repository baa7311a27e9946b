//! Member-list diff suppression.

use itertools::Itertools;

use super::model::Member;

/// Whether two declared member lists are semantically unchanged.
///
/// Lists are ordered for display but semantically a set: they are
/// equivalent iff their `(ip, port, weight)` multisets match, independent
/// of order and of the remote-computed `status` field. A suppressed list
/// never reaches the wire, which prevents spurious update calls for
/// reordered declarations.
pub fn members_equivalent(old: &[Member], new: &[Member]) -> bool {
    if old.len() != new.len() {
        return false;
    }

    let key = |m: &Member| (m.ip.clone(), m.port, m.weight);
    old.iter().map(key).sorted().eq(new.iter().map(key).sorted())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(ip: &str, port: u16, weight: u32) -> Member {
        Member::new(ip).with_port(port).with_weight(weight)
    }

    #[test]
    fn test_reordered_lists_are_equivalent() {
        let old = vec![member("10.0.0.1", 80, 1), member("10.0.0.2", 8080, 2)];
        let new = vec![member("10.0.0.2", 8080, 2), member("10.0.0.1", 80, 1)];
        assert!(members_equivalent(&old, &new));
    }

    #[test]
    fn test_status_is_ignored() {
        let mut old = vec![member("10.0.0.1", 80, 1)];
        if let Some(m) = old.first_mut() {
            m.status = Some("ACTIVE".to_string());
        }
        let new = vec![member("10.0.0.1", 80, 1)];
        assert!(members_equivalent(&old, &new));
    }

    #[test]
    fn test_weight_change_is_a_diff() {
        let old = vec![member("10.0.0.1", 80, 1)];
        let new = vec![member("10.0.0.1", 80, 3)];
        assert!(!members_equivalent(&old, &new));
    }

    #[test]
    fn test_port_change_is_a_diff() {
        let old = vec![member("10.0.0.1", 80, 1)];
        let new = vec![member("10.0.0.1", 8080, 1)];
        assert!(!members_equivalent(&old, &new));
    }

    #[test]
    fn test_length_change_is_a_diff() {
        let old = vec![member("10.0.0.1", 80, 1)];
        let new = vec![member("10.0.0.1", 80, 1), member("10.0.0.2", 80, 1)];
        assert!(!members_equivalent(&old, &new));
    }

    #[test]
    fn test_duplicates_compare_as_multisets() {
        let old = vec![
            member("10.0.0.1", 80, 1),
            member("10.0.0.1", 80, 1),
            member("10.0.0.2", 80, 1),
        ];
        let new = vec![
            member("10.0.0.1", 80, 1),
            member("10.0.0.2", 80, 1),
            member("10.0.0.2", 80, 1),
        ];
        assert!(!members_equivalent(&old, &new));
    }

    #[test]
    fn test_empty_lists_are_equivalent() {
        assert!(members_equivalent(&[], &[]));
    }
}
