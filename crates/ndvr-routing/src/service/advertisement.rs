//! Advertisement exchange: polling neighbors, resolving replies, serving
//! our own table.

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use super::core::{DvEngine, PendingRequest};
use crate::domain::{
    ControlName, FaceId, MergeContext, MessageType, RequestId, RoutingTable, TimerEvent,
};
use crate::error::CodecError;
use crate::ports::{DvEvent, DvTransport};

impl<T: DvTransport> DvEngine<T> {
    /// Ask `neighbor` for its table.
    ///
    /// Supersedes any request or retry still outstanding for the neighbor,
    /// bumps its advertisement version and arms a `local_rt_timeout`.
    pub(crate) fn request_advertisement(&mut self, neighbor: &str, is_retry: bool) {
        let previous = match self.neighbors.get_mut(neighbor) {
            Some(entry) => entry.outstanding.take(),
            None => return,
        };
        if let Some(request_id) = previous {
            debug!(neighbor, request = %request_id, "superseding outstanding request");
            self.cancel_pending(request_id);
        }
        self.cancel_retry(neighbor);

        let (version, face_id) = match self.neighbors.get_mut(neighbor) {
            Some(entry) => (entry.next_version(), entry.face_id),
            None => return,
        };
        let name = match ControlName::for_router(
            &self.config.protocol_prefix,
            MessageType::DvInfo,
            neighbor,
        ) {
            Ok(name) => name.with_version(version),
            Err(error) => {
                warn!(%error, neighbor, "cannot address neighbor");
                return;
            }
        };

        let request_id = self.allocate_request_id();
        let lifetime = self.config.local_rt_timeout_secs;
        let timer = self.scheduler.schedule(
            self.now().add_secs(lifetime),
            TimerEvent::RequestTimeout(request_id),
        );
        self.pending.insert(
            request_id,
            PendingRequest {
                neighbor: neighbor.to_string(),
                timer,
            },
        );
        if let Some(entry) = self.neighbors.get_mut(neighbor) {
            entry.outstanding = Some(request_id);
        }

        // A send failure is left to the timeout, which retries.
        match self
            .transport
            .express_advertisement_request(request_id, &name, face_id, lifetime)
        {
            Ok(()) => {
                self.metrics.record_request_sent(is_retry);
                debug!(neighbor, request = %request_id, version, "advertisement requested");
            }
            Err(error) => warn!(%error, neighbor, "failed to express advertisement request"),
        }
    }

    /// A validated reply arrived.
    pub(crate) fn on_advertisement_data(&mut self, request_id: RequestId, payload: &[u8]) {
        let Some(request) = self.cancel_pending(request_id) else {
            debug!(request = %request_id, "ignoring reply to unknown request");
            return;
        };
        let neighbor = request.neighbor;

        let now = self.now();
        match self.neighbors.get_mut(&neighbor) {
            Some(entry) => {
                entry.touch(now);
                entry.failed_attempts = 0;
            }
            None => return,
        }

        // A corrupt reply is not applied: merging the empty table it decodes
        // to would withdraw every route through the neighbor.
        let table = match self.codec.try_decode(payload) {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, neighbor = %neighbor, "discarding malformed advertisement");
                self.metrics.record_decode_failure();
                return;
            }
        };
        self.apply_advertisement(&neighbor, &table);
    }

    /// Merge `table` as advertised by `neighbor`.
    pub(crate) fn apply_advertisement(&mut self, neighbor: &str, table: &RoutingTable) {
        let Some(link_cost) = self.neighbors.get(neighbor).map(|n| n.link_cost) else {
            return;
        };
        let ctx = MergeContext {
            local_router: &self.router_prefix,
            neighbor,
            link_cost,
        };
        let report = self.routing_table.merge_advertisement(&ctx, table);
        self.metrics.record_merge(&report);

        debug!(
            neighbor,
            entries = table.len(),
            accepted = report.accepted,
            withdrawn = report.withdrawn,
            stale = report.stale_ignored,
            loops = report.loops_suppressed,
            "advertisement merged"
        );

        if report.is_material() {
            self.publish_route_changes(&report.changed);
            self.note_topology_change();
        }
    }

    pub(crate) fn on_validation_failed(&mut self, request_id: RequestId, reason: &str) {
        let Some(request) = self.cancel_pending(request_id) else {
            return;
        };
        self.metrics.record_validation_failure();
        warn!(neighbor = %request.neighbor, reason, "advertisement failed validation");
    }

    /// No reply in time: retry with back-off, or give up on the neighbor.
    pub(crate) fn on_request_timeout(&mut self, request_id: RequestId) {
        let Some(request) = self.cancel_pending(request_id) else {
            return;
        };
        self.metrics.record_timeout();
        let neighbor = request.neighbor;

        let attempts = match self.neighbors.get_mut(&neighbor) {
            Some(entry) => {
                entry.failed_attempts = entry.failed_attempts.saturating_add(1);
                entry.failed_attempts
            }
            None => return,
        };

        if attempts >= self.config.max_request_attempts {
            self.mark_stale(&neighbor, "retries exhausted");
            return;
        }

        let delay = self.config.retry_delay_secs(attempts);
        let timer = self.scheduler.schedule(
            self.now().add_secs(delay),
            TimerEvent::RetryRequest(neighbor.clone()),
        );
        if let Some(previous) = self.retry_timers.insert(neighbor.clone(), timer) {
            self.scheduler.cancel(previous);
        }
        debug!(neighbor = %neighbor, attempts, delay, "advertisement request timed out");
    }

    /// The transport says the neighbor is unreachable. No retries.
    pub(crate) fn on_nack(&mut self, request_id: RequestId, reason: &str) {
        let Some(request) = self.cancel_pending(request_id) else {
            return;
        };
        self.metrics.record_nack();
        warn!(neighbor = %request.neighbor, reason, "advertisement request nacked");
        self.mark_stale(&request.neighbor, "nack");
    }

    /// Answer a neighbor's dvinfo request with our encoded table.
    pub(crate) fn serve_advertisement(&mut self, name: &str, face_id: FaceId) {
        match ControlName::parse(name, &self.config.protocol_prefix) {
            Ok(parsed)
                if parsed.message_type == MessageType::DvInfo
                    && parsed.router_prefix() == self.router_prefix => {}
            Ok(_) => {
                debug!(name, "ignoring advertisement request for another router");
                return;
            }
            Err(error) => {
                debug!(%error, name, "ignoring invalid advertisement request");
                return;
            }
        }

        // Receivers reject anything over the limit.
        let payload = match self.codec.try_encode(&self.routing_table) {
            Ok(payload) => payload,
            Err(CodecError::TooLarge { size, max }) => {
                error!(size, max, name, "routing table exceeds message limit, not serving");
                self.metrics.record_oversized_advertisement();
                self.publish(DvEvent::AdvertisementTooLarge { size, max });
                return;
            }
            Err(error) => {
                error!(%error, name, "failed to encode routing table");
                return;
            }
        };
        match self.transport.reply_advertisement(name, face_id, payload) {
            Ok(()) => self.metrics.record_advertisement_served(),
            Err(error) => warn!(%error, name, "failed to serve advertisement"),
        }
    }

    /// Publish the current route (or its absence) for each prefix.
    pub(crate) fn publish_route_changes(&self, prefixes: &BTreeSet<String>) {
        for prefix in prefixes {
            let event = match self
                .routing_table
                .get(prefix)
                .and_then(|entry| entry.selected_next_hop())
            {
                Some(hop) => DvEvent::RouteUpdated {
                    prefix: prefix.clone(),
                    next_hop: hop.id.clone(),
                    face_id: self.neighbors.get(&hop.id).map(|n| n.face_id),
                    cost: hop.cost,
                },
                None => DvEvent::RouteWithdrawn {
                    prefix: prefix.clone(),
                },
            };
            self.publish(event);
        }
    }

    /// Republish routes selected through `neighbor` (its face changed).
    pub(crate) fn publish_routes_via(&self, neighbor: &str) {
        let prefixes: BTreeSet<String> = self
            .routing_table
            .iter()
            .filter(|entry| {
                entry
                    .selected_next_hop()
                    .is_some_and(|hop| hop.id == neighbor)
            })
            .map(|entry| entry.prefix().to_string())
            .collect();
        self.publish_route_changes(&prefixes);
    }
}
