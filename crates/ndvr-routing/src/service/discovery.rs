//! Hello broadcast and neighbor discovery.

use tracing::{debug, info, warn};

use super::core::DvEngine;
use crate::domain::{ControlName, FaceId, MessageType, NeighborEntry};
use crate::ports::{DvEvent, DvTransport};

impl<T: DvTransport> DvEngine<T> {
    /// Broadcast a Hello, then back off unless the topology changed since
    /// the previous one.
    pub(crate) fn send_hello(&mut self) {
        let name = ControlName::new(
            &self.config.protocol_prefix,
            MessageType::Hello,
            &self.config.network,
            &self.config.router_name,
        );
        match self.transport.send_hello(&name) {
            Ok(()) => self.metrics.record_hello_sent(),
            Err(error) => warn!(%error, "failed to send hello"),
        }

        if self.topology_changed {
            self.topology_changed = false;
        } else {
            self.hello.increase();
        }

        let next = self.now().add_secs(self.hello.current_secs());
        self.schedule_hello(next);
        debug!(interval = self.hello.current_secs(), "hello sent");
    }

    /// A Hello arrived on `face_id`.
    ///
    /// Unknown routers become neighbors and are polled right away. For known
    /// ones the Hello refreshes liveness, rebinds a moved face and revives a
    /// stale session.
    pub(crate) fn on_hello(&mut self, name: &str, face_id: FaceId) {
        self.metrics.record_hello_received();

        let parsed = match ControlName::parse(name, &self.config.protocol_prefix) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(%error, name, "ignoring invalid hello");
                return;
            }
        };
        let network = self.config.network.trim_matches('/');
        if parsed.message_type != MessageType::Hello || parsed.network != network {
            debug!(name, "ignoring hello for another network or type");
            return;
        }

        let neighbor = parsed.router_prefix();
        if neighbor == self.router_prefix {
            return;
        }

        let now = self.now();
        if !self.neighbors.contains(&neighbor) {
            self.neighbors.insert(NeighborEntry::new(
                neighbor.as_str(),
                face_id,
                self.config.link_cost(),
                now,
            ));
            info!(neighbor = %neighbor, face = %face_id, "neighbor discovered");
            self.metrics.record_neighbor_discovered();
            self.publish(DvEvent::NeighborDiscovered {
                neighbor: neighbor.clone(),
                face_id,
            });
            self.note_topology_change();
            self.request_advertisement(&neighbor, false);
            return;
        }

        let Some(entry) = self.neighbors.get_mut(&neighbor) else {
            return;
        };
        entry.touch(now);
        let moved = entry.face_id != face_id;
        if moved {
            entry.face_id = face_id;
        }
        let revived = entry.is_stale();
        if revived {
            entry.revive(now);
        }

        if moved {
            info!(neighbor = %neighbor, face = %face_id, "neighbor moved to a new face");
            self.note_topology_change();
            self.publish_routes_via(&neighbor);
        }
        if revived {
            info!(neighbor = %neighbor, "stale neighbor revived");
            self.publish(DvEvent::NeighborRevived {
                neighbor: neighbor.clone(),
            });
            self.note_topology_change();
            self.request_advertisement(&neighbor, false);
        }
    }

    /// Answer a key request addressed to us.
    pub(crate) fn serve_key(&mut self, name: &str) {
        match ControlName::parse(name, &self.config.protocol_prefix) {
            Ok(parsed)
                if parsed.message_type == MessageType::Key
                    && parsed.router_prefix() == self.router_prefix =>
            {
                if let Err(error) = self.transport.reply_key(name) {
                    warn!(%error, name, "failed to answer key request");
                }
            }
            Ok(_) => debug!(name, "ignoring key request for another router"),
            Err(error) => debug!(%error, name, "ignoring invalid key request"),
        }
    }
}
