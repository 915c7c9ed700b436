//! Distance-vector merge of a neighbor's advertisement.

use std::collections::BTreeSet;

use super::{NextHop, RoutingEntry, RoutingTable};
use crate::domain::Cost;

/// Who sent an advertisement and what the link to them costs.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    /// Our router name
    pub local_router: &'a str,
    /// The advertising neighbor's router name
    pub neighbor: &'a str,
    /// Cost of the link to the neighbor
    pub link_cost: Cost,
}

/// Outcome of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries whose state was updated from the advertisement
    pub accepted: usize,
    /// Next hops via the neighbor that were removed
    pub withdrawn: usize,
    /// Prefixes dropped from the table
    pub removed: Vec<String>,
    /// Entries ignored because their sequence was older than ours
    pub stale_ignored: usize,
    /// Entries whose selected path already runs through us
    pub loops_suppressed: usize,
    /// Prefixes whose selected route changed, appeared or disappeared
    pub changed: BTreeSet<String>,
}

impl MergeReport {
    /// True if forwarding would observe a difference.
    pub fn is_material(&self) -> bool {
        !self.changed.is_empty()
    }
}

enum Verdict {
    Skip,
    Stale,
    Loop,
    Withdraw,
    Update(NextHop),
}

impl RoutingTable {
    /// Merge a neighbor's full table into ours.
    ///
    /// Per prefix P in `theirs`, with `candidate = their best + link cost`:
    /// - prefixes we originate are never touched;
    /// - a path through us (their selected hop is us, or its digest holds
    ///   us) removes our hop via the neighbor;
    /// - an older sequence is ignored;
    /// - otherwise the update is accepted when P is new, the sequence is
    ///   newer, or the sequence is equal and `candidate` beats the cost we
    ///   hold via this neighbor;
    /// - an accepted infinite cost is a withdrawal of the hop via the
    ///   neighbor, and P is dropped once it has no hops left.
    ///
    /// Prefixes we hold via the neighbor that are missing from `theirs` are
    /// withdrawn implicitly, since an advertisement is a full snapshot.
    ///
    /// Merging the same advertisement again changes nothing.
    pub fn merge_advertisement(&mut self, ctx: &MergeContext<'_>, theirs: &RoutingTable) -> MergeReport {
        let mut report = MergeReport::default();

        for their_entry in theirs.iter() {
            let prefix = their_entry.prefix();
            let before = self.get(prefix).map(RoutingEntry::route_signature);

            match evaluate(self.get(prefix), their_entry, ctx) {
                Verdict::Skip => continue,
                Verdict::Stale => {
                    report.stale_ignored += 1;
                    continue;
                }
                Verdict::Loop => {
                    report.loops_suppressed += 1;
                    self.drop_hop_via(prefix, ctx.neighbor, &mut report);
                }
                Verdict::Withdraw => {
                    if let Some(entry) = self.get_mut(prefix) {
                        entry.set_sequence(their_entry.sequence());
                        report.accepted += 1;
                    }
                    self.drop_hop_via(prefix, ctx.neighbor, &mut report);
                }
                Verdict::Update(hop) => {
                    let replace = match self.get(prefix) {
                        None => true,
                        Some(ours) => ours.originator() != their_entry.originator(),
                    };
                    if replace {
                        self.insert(
                            RoutingEntry::new(prefix, their_entry.sequence(), their_entry.originator())
                                .with_next_hop(hop),
                        );
                    } else if let Some(entry) = self.get_mut(prefix) {
                        entry.set_sequence(their_entry.sequence());
                        entry.upsert_next_hop(hop);
                    }
                    report.accepted += 1;
                }
            }

            let after = self.get(prefix).map(RoutingEntry::route_signature);
            if before != after {
                report.changed.insert(prefix.to_string());
            }
        }

        // Implicit withdrawal of prefixes missing from the snapshot.
        let missing: Vec<String> = self
            .prefixes_via(ctx.neighbor)
            .filter(|prefix| !theirs.contains(prefix))
            .map(str::to_string)
            .collect();
        for prefix in missing {
            if self
                .get(&prefix)
                .map_or(true, |entry| entry.originator() == ctx.local_router)
            {
                continue;
            }
            let before = self.get(&prefix).map(RoutingEntry::route_signature);
            self.drop_hop_via(&prefix, ctx.neighbor, &mut report);
            let after = self.get(&prefix).map(RoutingEntry::route_signature);
            if before != after {
                report.changed.insert(prefix);
            }
        }

        report
    }

    fn drop_hop_via(&mut self, prefix: &str, neighbor: &str, report: &mut MergeReport) {
        let Some(entry) = self.get_mut(prefix) else {
            return;
        };
        if entry.remove_next_hop(neighbor).is_some() {
            report.withdrawn += 1;
        }
        if entry.is_withdrawn() {
            self.remove(prefix);
            report.removed.push(prefix.to_string());
        }
    }
}

fn evaluate(ours: Option<&RoutingEntry>, theirs: &RoutingEntry, ctx: &MergeContext<'_>) -> Verdict {
    if theirs.originator() == ctx.local_router {
        return Verdict::Skip;
    }
    if let Some(ours) = ours {
        if ours.originator() == ctx.local_router {
            return Verdict::Skip;
        }
        if ours.originator() == theirs.originator() && theirs.sequence() < ours.sequence() {
            return Verdict::Stale;
        }
    }

    let their_selected = theirs.selected_next_hop();
    if let Some(hop) = their_selected {
        if hop.id == ctx.local_router || hop.path_digest.contains(ctx.local_router) {
            return Verdict::Loop;
        }
    }

    let candidate = theirs.best_cost().saturating_add(ctx.link_cost);
    let withdrawal = candidate.is_infinite();

    let accept = match ours {
        None => true,
        Some(ours) if ours.originator() != theirs.originator() => {
            // Sequences of different originators are not comparable.
            !withdrawal && candidate < ours.best_cost()
        }
        Some(ours) => {
            let via_neighbor = ours
                .next_hop(ctx.neighbor)
                .map(|hop| hop.cost)
                .unwrap_or(Cost::INFINITY);
            theirs.sequence() > ours.sequence() || candidate < via_neighbor
        }
    };

    match (accept, withdrawal, their_selected) {
        (false, _, _) => Verdict::Skip,
        (true, false, Some(selected)) => {
            let mut digest = selected.path_digest.clone();
            digest.insert(ctx.neighbor);
            Verdict::Update(NextHop::new(ctx.neighbor, candidate, digest))
        }
        (true, _, _) => match ours {
            Some(_) => Verdict::Withdraw,
            None => Verdict::Skip,
        },
    }
}
