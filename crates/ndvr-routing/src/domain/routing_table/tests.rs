//! Tests for the routing table and merge.

use super::*;
use crate::domain::{Cost, InvertibleBloomFilter};
use proptest::prelude::*;

const LOCAL: &str = "/ufba/%C1.Router/local";
const N: &str = "/ufba/%C1.Router/n";
const M: &str = "/ufba/%C1.Router/m";

fn ctx(neighbor: &str, link: u32) -> MergeContext<'_> {
    MergeContext {
        local_router: LOCAL,
        neighbor,
        link_cost: Cost::new(link),
    }
}

fn hop(id: &str, cost: u32) -> NextHop {
    NextHop::new(id, Cost::new(cost), InvertibleBloomFilter::default())
}

/// A single-entry advertisement.
fn advert(prefix: &str, seq: u64, originator: &str, hops: &[(&str, u32)]) -> RoutingTable {
    let mut entry = RoutingEntry::new(prefix, seq, originator);
    for (id, cost) in hops {
        entry.upsert_next_hop(hop(id, *cost));
    }
    std::iter::once(entry).collect()
}

fn cost_via(table: &RoutingTable, prefix: &str, id: &str) -> Option<u32> {
    table
        .get(prefix)
        .and_then(|e| e.next_hop(id))
        .map(|h| h.cost.value())
}

// =============================================================================
// RoutingEntry selection
// =============================================================================

#[test]
fn test_entry_tie_keeps_existing_selection() {
    let mut entry = RoutingEntry::new("/a", 1, N);
    entry.upsert_next_hop(hop("b", 3));
    entry.upsert_next_hop(hop("a", 3));
    assert_eq!(entry.selected_next_hop().map(|h| h.id.as_str()), Some("b"));
}

#[test]
fn test_entry_new_selection_lowest_cost_then_id() {
    let mut entry = RoutingEntry::new("/a", 1, N);
    entry.upsert_next_hop(hop("c", 4));
    entry.upsert_next_hop(hop("b", 3));
    entry.upsert_next_hop(hop("a", 3));
    // b became selected on strictly lower cost, a only ties
    assert_eq!(entry.selected_next_hop().map(|h| h.id.as_str()), Some("b"));

    entry.remove_next_hop("b");
    assert_eq!(entry.selected_next_hop().map(|h| h.id.as_str()), Some("a"));

    entry.upsert_next_hop(hop("d", 1));
    assert_eq!(entry.selected_next_hop().map(|h| h.id.as_str()), Some("d"));
    assert_eq!(entry.best_cost(), Cost::new(1));
}

#[test]
fn test_entry_one_hop_per_id() {
    let mut entry = RoutingEntry::new("/a", 1, N);
    assert!(entry.upsert_next_hop(hop("a", 3)));
    assert!(!entry.upsert_next_hop(hop("a", 3)));
    assert!(entry.upsert_next_hop(hop("a", 7)));
    assert_eq!(entry.next_hop_count(), 1);
    assert_eq!(entry.best_cost(), Cost::new(7));
}

#[test]
fn test_empty_entry_has_infinite_cost() {
    let entry = RoutingEntry::new("/a", 1, N);
    assert!(entry.is_withdrawn());
    assert!(entry.best_cost().is_infinite());
    assert!(entry.selected_next_hop().is_none());
}

// =============================================================================
// Merge scenarios
// =============================================================================

#[test]
fn test_merge_into_empty_table() {
    let mut table = RoutingTable::new();
    let report = table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 5)]));

    let entry = table.get("/a").unwrap();
    assert_eq!(entry.next_hop_count(), 1);
    assert_eq!(cost_via(&table, "/a", N), Some(6));
    assert_eq!(entry.sequence(), 1);
    assert_eq!(entry.originator(), N);
    assert_eq!(report.accepted, 1);
    assert!(report.is_material());
}

#[test]
fn test_identical_readvertisement_is_noop() {
    let mut table = RoutingTable::new();
    let ad = advert("/a", 1, N, &[(N, 5)]);
    table.merge_advertisement(&ctx(N, 1), &ad);
    let before = table.clone();

    let report = table.merge_advertisement(&ctx(N, 1), &ad);

    assert_eq!(table, before);
    assert_eq!(report.accepted, 0);
    assert!(!report.is_material());
}

#[test]
fn test_infinite_cost_withdraws_sole_next_hop() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 5)]));

    let withdrawal = advert("/a", 2, N, &[(N, u32::MAX)]);
    let report = table.merge_advertisement(&ctx(N, 1), &withdrawal);

    assert!(!table.contains("/a"));
    assert_eq!(report.removed, vec!["/a".to_string()]);
    assert_eq!(report.withdrawn, 1);
    assert!(report.is_material());
}

#[test]
fn test_withdrawal_keeps_other_next_hops() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, "/o", &[("/x", 5)]));
    table.merge_advertisement(&ctx(M, 1), &advert("/a", 1, "/o", &[("/y", 2)]));
    assert_eq!(table.get("/a").unwrap().next_hop_count(), 2);

    // withdrawal marker: no next hops at all
    table.merge_advertisement(&ctx(M, 1), &advert("/a", 2, "/o", &[]));

    let entry = table.get("/a").unwrap();
    assert_eq!(entry.next_hop_count(), 1);
    assert!(entry.next_hop(N).is_some());
    assert_eq!(entry.sequence(), 2);
}

#[test]
fn test_withdrawal_of_unknown_prefix_is_noop() {
    let mut table = RoutingTable::new();
    let report = table.merge_advertisement(&ctx(N, 1), &advert("/a", 3, N, &[]));
    assert!(table.is_empty());
    assert_eq!(report, MergeReport::default());
}

#[test]
fn test_stale_sequence_never_modifies_entry() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 5, N, &[(N, 5)]));
    let before = table.clone();

    let report = table.merge_advertisement(&ctx(N, 1), &advert("/a", 4, N, &[(N, 1)]));

    assert_eq!(table, before);
    assert_eq!(report.stale_ignored, 1);
    assert_eq!(report.accepted, 0);
}

#[test]
fn test_equal_sequence_requires_strict_improvement() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 5)]));

    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 9)]));
    assert_eq!(cost_via(&table, "/a", N), Some(6));

    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 2)]));
    assert_eq!(cost_via(&table, "/a", N), Some(3));
}

#[test]
fn test_newer_sequence_replaces_cost_even_if_worse() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 2)]));
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 2, N, &[(N, 7)]));
    assert_eq!(cost_via(&table, "/a", N), Some(8));
    assert_eq!(table.get("/a").unwrap().sequence(), 2);
}

#[test]
fn test_cost_tie_keeps_existing_path() {
    let a = "/ufba/%C1.Router/a";
    let b = "/ufba/%C1.Router/b";
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(b, 1), &advert("/p", 1, "/o", &[("/o", 3)]));
    table.merge_advertisement(&ctx(a, 1), &advert("/p", 1, "/o", &[("/o", 3)]));

    let entry = table.get("/p").unwrap();
    assert_eq!(entry.next_hop_count(), 2);
    assert_eq!(entry.selected_next_hop().unwrap().id, b);
}

#[test]
fn test_cost_saturates_to_withdrawal() {
    let mut table = RoutingTable::new();
    let report = table.merge_advertisement(&ctx(N, 10), &advert("/a", 1, N, &[(N, u32::MAX - 1)]));
    assert!(table.is_empty());
    assert_eq!(report.accepted, 0);
}

#[test]
fn test_path_through_us_is_suppressed() {
    let mut table = RoutingTable::new();
    let report = table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, "/o", &[(LOCAL, 2)]));
    assert!(table.is_empty());
    assert_eq!(report.loops_suppressed, 1);
}

#[test]
fn test_digest_containing_us_removes_hop_via_neighbor() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, "/o", &[("/o", 2)]));
    assert!(table.contains("/a"));

    let mut digest = InvertibleBloomFilter::new(4096, 3);
    digest.insert("/o");
    digest.insert(LOCAL);
    let looped: RoutingTable = std::iter::once(
        RoutingEntry::new("/a", 2, "/o").with_next_hop(NextHop::new(M, Cost::new(4), digest)),
    )
    .collect();

    let report = table.merge_advertisement(&ctx(N, 1), &looped);

    assert_eq!(report.loops_suppressed, 1);
    assert!(!table.contains("/a"));
}

#[test]
fn test_decoded_advert_keeps_tied_path_through_us() {
    // N forwards /p through us and later learns an equal-cost hop whose id
    // sorts first. The copy we decode must still show N forwarding via us.
    let their_entry = RoutingEntry::new("/p", 1, "/o")
        .with_next_hop(hop(LOCAL, 4))
        .with_next_hop(hop("/aaa", 4));
    assert_eq!(their_entry.selected_next_hop().unwrap().id, LOCAL);
    let theirs: RoutingTable = std::iter::once(their_entry).collect();

    let decoded = crate::codec::decode(&crate::codec::encode(&theirs));
    let mut table = RoutingTable::new();
    let report = table.merge_advertisement(&ctx(N, 1), &decoded);

    assert_eq!(report.loops_suppressed, 1);
    assert_eq!(cost_via(&table, "/p", N), None);
}

#[test]
fn test_accepted_digest_includes_neighbor() {
    let mut their_digest = InvertibleBloomFilter::new(4096, 3);
    their_digest.insert("/o");
    let ad: RoutingTable = std::iter::once(
        RoutingEntry::new("/a", 1, "/o").with_next_hop(NextHop::new("/o", Cost::new(1), their_digest)),
    )
    .collect();

    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &ad);

    let digest = &table.get("/a").unwrap().next_hop(N).unwrap().path_digest;
    assert_eq!(digest.count(), 2);
    assert!(digest.contains(N));
    assert!(digest.contains("/o"));
}

#[test]
fn test_own_prefixes_are_never_overwritten() {
    let mut table = RoutingTable::new();
    table.originate("/mine", LOCAL, &InvertibleBloomFilter::default(), 0);
    let before = table.clone();

    table.merge_advertisement(&ctx(N, 1), &advert("/mine", 99, N, &[(N, 0)]));
    table.merge_advertisement(&ctx(N, 1), &advert("/other", 1, LOCAL, &[(N, 0)]));

    assert_eq!(table, before);
}

#[test]
fn test_missing_prefix_is_withdrawn_implicitly() {
    let mut table = RoutingTable::new();
    let mut ad = advert("/a", 1, N, &[(N, 1)]);
    ad.insert(RoutingEntry::new("/b", 1, N).with_next_hop(hop(N, 1)));
    table.merge_advertisement(&ctx(N, 1), &ad);
    assert_eq!(table.len(), 2);

    let report = table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 1)]));

    assert!(table.contains("/a"));
    assert!(!table.contains("/b"));
    assert_eq!(report.removed, vec!["/b".to_string()]);
}

#[test]
fn test_implicit_withdrawal_only_touches_that_neighbor() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, "/o", &[("/o", 1)]));
    table.merge_advertisement(&ctx(M, 1), &advert("/a", 1, "/o", &[("/o", 3)]));

    table.merge_advertisement(&ctx(N, 1), &RoutingTable::new());

    let entry = table.get("/a").unwrap();
    assert!(entry.next_hop(N).is_none());
    assert_eq!(entry.selected_next_hop().unwrap().id, M);
}

#[test]
fn test_different_originator_needs_better_cost() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 10, "/o1", &[("/o1", 2)]));

    table.merge_advertisement(&ctx(M, 1), &advert("/a", 50, "/o2", &[("/o2", 5)]));
    assert_eq!(table.get("/a").unwrap().originator(), "/o1");

    table.merge_advertisement(&ctx(M, 1), &advert("/a", 1, "/o2", &[("/o2", 0)]));
    let entry = table.get("/a").unwrap();
    assert_eq!(entry.originator(), "/o2");
    assert_eq!(entry.sequence(), 1);
    assert_eq!(entry.next_hop_count(), 1);
    assert_eq!(cost_via(&table, "/a", M), Some(1));
}

// =============================================================================
// Local origination
// =============================================================================

#[test]
fn test_originate_increments_sequence() {
    let mut table = RoutingTable::new();
    let digest = InvertibleBloomFilter::default();
    assert_eq!(table.originate("/p", LOCAL, &digest, 0), 1);
    assert_eq!(table.originate("/p", LOCAL, &digest, 0), 2);
    assert_eq!(table.originate("/p", LOCAL, &digest, 100), 100);
    assert_eq!(table.originate("/p", LOCAL, &digest, 50), 101);

    let entry = table.get("/p").unwrap();
    let own = entry.selected_next_hop().unwrap();
    assert_eq!(own.id, LOCAL);
    assert_eq!(own.cost, Cost::ZERO);
    assert!(own.path_digest.is_empty());
}

#[test]
fn test_withdraw_local_leaves_marker_until_purge() {
    let mut table = RoutingTable::new();
    table.originate("/p", LOCAL, &InvertibleBloomFilter::default(), 0);

    assert!(table.withdraw_local("/p", LOCAL));
    let marker = table.get("/p").unwrap();
    assert!(marker.is_withdrawn());
    assert_eq!(marker.sequence(), 2);
    assert!(!table.withdraw_local("/p", LOCAL));

    assert_eq!(table.purge_withdrawn(), vec!["/p".to_string()]);
    assert!(table.is_empty());
}

#[test]
fn test_withdraw_local_rejects_learned_prefix() {
    let mut table = RoutingTable::new();
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, N, &[(N, 1)]));
    assert!(!table.withdraw_local("/a", LOCAL));
}

#[test]
fn test_remove_next_hops_via_neighbor() {
    let mut table = RoutingTable::new();
    table.originate("/mine", LOCAL, &InvertibleBloomFilter::default(), 0);
    table.merge_advertisement(&ctx(N, 1), &advert("/a", 1, "/o", &[("/o", 1)]));
    table.merge_advertisement(&ctx(N, 1), &advert("/b", 1, "/o", &[("/o", 1)]));
    table.merge_advertisement(&ctx(M, 1), &advert("/b", 1, "/o", &[("/o", 4)]));

    let changed = table.remove_next_hops_via(N, LOCAL);

    assert!(!table.contains("/a"));
    assert!(table.contains("/mine"));
    assert_eq!(table.get("/b").unwrap().selected_next_hop().unwrap().id, M);
    assert!(changed.contains("/a"));
    assert!(changed.contains("/b"));
}

// =============================================================================
// Properties
// =============================================================================

fn arb_advert() -> impl Strategy<Value = RoutingTable> {
    let entry = (
        prop::sample::select(vec!["/a", "/b", "/c", "/d"]),
        1u64..5,
        prop::sample::select(vec!["/o1", "/o2"]),
        prop::collection::vec((prop::sample::select(vec!["/x", "/y"]), prop_oneof![0u32..20, Just(u32::MAX)]), 0..3),
    );
    prop::collection::vec(entry, 0..6).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(prefix, seq, originator, hops)| {
                let mut entry = RoutingEntry::new(prefix, seq, originator);
                for (id, cost) in hops {
                    entry.upsert_next_hop(hop(id, cost));
                }
                entry
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_merge_is_idempotent(first in arb_advert(), second in arb_advert()) {
        let mut table = RoutingTable::new();
        table.merge_advertisement(&ctx(M, 2), &first);
        table.merge_advertisement(&ctx(N, 1), &second);
        let once = table.clone();

        let report = table.merge_advertisement(&ctx(N, 1), &second);

        prop_assert_eq!(&table, &once);
        prop_assert!(!report.is_material());
    }

    #[test]
    fn prop_stale_sequence_never_modifies(
        seq in 2u64..100,
        older in 1u64..100,
        cost in 0u32..50,
        their_cost in 0u32..50,
    ) {
        prop_assume!(older < seq);
        let mut table = RoutingTable::new();
        table.merge_advertisement(&ctx(N, 1), &advert("/a", seq, "/o", &[("/o", cost)]));
        let before = table.get("/a").cloned();

        table.merge_advertisement(&ctx(N, 1), &advert("/a", older, "/o", &[("/o", their_cost)]));

        prop_assert_eq!(table.get("/a").cloned(), before);
    }
}
