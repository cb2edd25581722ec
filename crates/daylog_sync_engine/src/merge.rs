//! Last-write-wins merge policy.

use daylog_entry::{Entry, EntrySet};

/// Which copy of an entry survives a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Keep the local copy.
    KeepLocal,
    /// Replace the local copy with the remote one.
    TakeRemote,
}

/// Decides between a local and a remote copy of the same entry.
///
/// The remote copy wins only if both copies carry `updated_at` and the
/// remote timestamp is strictly later. Ties and undated copies keep local.
pub fn merge_entry(local: &Entry, remote: &Entry) -> MergeDecision {
    match (local.updated_at, remote.updated_at) {
        (Some(local_at), Some(remote_at)) if remote_at > local_at => MergeDecision::TakeRemote,
        _ => MergeDecision::KeepLocal,
    }
}

/// Counts of what a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Remote entries that were missing locally.
    pub inserted: usize,
    /// Local entries replaced by a newer remote copy.
    pub replaced: usize,
    /// Local entries kept over their remote copy.
    pub kept: usize,
}

impl ReconcileReport {
    /// Returns true if the merge changed the local entry set.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.replaced > 0
    }

    /// Number of local entries that were added or replaced.
    pub fn pulled(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Merges `remote` into `local`.
///
/// Entries present only locally are left untouched; merging never removes.
pub fn merge_into(local: &mut EntrySet, remote: EntrySet) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (id, remote_entry) in remote {
        match local.get_mut(&id) {
            None => {
                local.insert(id, remote_entry);
                report.inserted += 1;
            }
            Some(local_entry) => match merge_entry(local_entry, &remote_entry) {
                MergeDecision::TakeRemote => {
                    *local_entry = remote_entry;
                    report.replaced += 1;
                }
                MergeDecision::KeepLocal => report.kept += 1,
            },
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use daylog_entry::EntryId;
    use proptest::prelude::*;

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    fn dated(content: &str, updated: &str) -> Entry {
        Entry::with_content(content, None, Some(updated.parse().unwrap()))
    }

    #[test]
    fn later_remote_wins() {
        let local = dated("a", "2024-01-01T10:00:00");
        let remote = dated("b", "2024-01-01T11:00:00");
        assert_eq!(merge_entry(&local, &remote), MergeDecision::TakeRemote);
    }

    #[test]
    fn later_local_wins() {
        let local = dated("a", "2024-01-01T12:00:00");
        let remote = dated("b", "2024-01-01T11:00:00");
        assert_eq!(merge_entry(&local, &remote), MergeDecision::KeepLocal);
    }

    #[test]
    fn tie_keeps_local() {
        let local = dated("a", "2024-01-01T10:00:00");
        let remote = dated("b", "2024-01-01T10:00:00");
        assert_eq!(merge_entry(&local, &remote), MergeDecision::KeepLocal);
    }

    #[test]
    fn undated_side_keeps_local() {
        let undated = Entry::with_content("u", None, None);
        let dated_remote = dated("b", "2030-01-01T00:00:00");
        assert_eq!(merge_entry(&undated, &dated_remote), MergeDecision::KeepLocal);
        assert_eq!(
            merge_entry(&dated("a", "2020-01-01T00:00:00"), &undated),
            MergeDecision::KeepLocal
        );
    }

    #[test]
    fn merge_inserts_and_never_removes() {
        let mut local = EntrySet::from([(id("2024-01-01"), dated("local only", "2024-01-01T10:00:00"))]);
        let remote = EntrySet::from([(id("2024-01-02"), dated("remote only", "2024-01-02T10:00:00"))]);

        let report = merge_into(&mut local, remote);

        assert_eq!(report.inserted, 1);
        assert_eq!(local.len(), 2);
        assert_eq!(local[&id("2024-01-01")].content, "local only");
        assert_eq!(local[&id("2024-01-02")].content, "remote only");
    }

    #[test]
    fn merge_scenario_remote_newer() {
        let mut local = EntrySet::from([(id("2024-01-01"), dated("a", "2024-01-01T10:00:00"))]);
        let remote = EntrySet::from([(id("2024-01-01"), dated("b", "2024-01-01T11:00:00"))]);

        let report = merge_into(&mut local, remote);

        assert_eq!(report.replaced, 1);
        assert_eq!(local[&id("2024-01-01")].content, "b");
    }

    fn arb_entry() -> impl Strategy<Value = Entry> {
        ("[a-z]{0,8}", proptest::option::of(0u32..10_000)).prop_map(|(content, secs)| {
            let updated = secs.map(|s| {
                format!("2024-01-01T{:02}:{:02}:{:02}", s / 3600 % 24, s / 60 % 60, s % 60)
                    .parse()
                    .unwrap()
            });
            Entry::with_content(content, None, updated)
        })
    }

    fn arb_set() -> impl Strategy<Value = EntrySet> {
        proptest::collection::btree_map(
            (1u32..20).prop_map(|d| id(&format!("2024-01-{d:02}"))),
            arb_entry(),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(local in arb_set(), remote in arb_set()) {
            let mut once = local.clone();
            merge_into(&mut once, remote.clone());
            let mut twice = once.clone();
            let report = merge_into(&mut twice, remote);

            prop_assert_eq!(&once, &twice);
            prop_assert!(!report.changed());
        }

        #[test]
        fn merge_with_self_is_noop(set in arb_set()) {
            let mut merged = set.clone();
            let report = merge_into(&mut merged, set.clone());
            prop_assert_eq!(merged, set);
            prop_assert_eq!(report.inserted + report.replaced, 0);
        }

        #[test]
        fn merge_keeps_every_local_id(local in arb_set(), remote in arb_set()) {
            let mut merged = local.clone();
            merge_into(&mut merged, remote);
            for key in local.keys() {
                prop_assert!(merged.contains_key(key));
            }
        }
    }
}
