//! In-process network of routing engines.
//!
//! Every router runs a real [`DvEngine`] over a [`RecordingTransport`];
//! after each step the harness drains what the engines asked their
//! transports to do and delivers it to the linked routers with zero
//! latency. All routers share one manual clock.

use std::collections::{BTreeSet, HashMap};

use ndvr_routing::test_utils::{ManualTimeSource, RecordingTransport, TransportCall};
use ndvr_routing::{
    ControlName, Cost, DvConfig, DvEngine, FaceId, InboundEvent, RequestId, RoutingTable,
};

pub const START: u64 = 10_000;
pub const NETWORK: &str = "net";
const FACE_BASE: u64 = 100;
const MAX_PUMP_ROUNDS: usize = 10_000;

/// Face on which a router reaches router `index`.
pub fn face_to(index: usize) -> FaceId {
    FaceId(FACE_BASE + index as u64)
}

fn router_at(face: FaceId) -> usize {
    (face.0 - FACE_BASE) as usize
}

/// A request in flight: which router asked, and under which id.
struct InFlight {
    requester: usize,
    request_id: RequestId,
}

pub struct SimNetwork {
    pub clock: ManualTimeSource,
    routers: Vec<DvEngine<RecordingTransport>>,
    names: Vec<String>,
    links: BTreeSet<(usize, usize)>,
    /// (responder, request name, face at responder) -> requester
    in_flight: HashMap<(usize, String, FaceId), InFlight>,
}

impl SimNetwork {
    /// Start one router per name. Router `i` originates `/<net>/<name>`.
    pub fn new(names: &[&str]) -> Self {
        let clock = ManualTimeSource::new(START);
        let routers = names
            .iter()
            .map(|name| {
                let mut config = DvConfig::for_testing(name)
                    .with_local_prefixes([format!("/{}/{}", NETWORK, name.to_lowercase())]);
                config.network = NETWORK.to_string();
                let mut engine =
                    DvEngine::new(config, RecordingTransport::new(), Box::new(clock.clone()))
                        .expect("valid config");
                engine.start().expect("registration succeeds");
                engine
            })
            .collect();

        Self {
            clock,
            routers,
            names: names.iter().map(|name| name.to_string()).collect(),
            links: BTreeSet::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn link(&mut self, a: usize, b: usize) {
        self.links.insert((a.min(b), a.max(b)));
    }

    /// Cut a link. Messages in either direction are dropped from now on.
    pub fn cut(&mut self, a: usize, b: usize) {
        self.links.remove(&(a.min(b), a.max(b)));
    }

    fn linked(&self, a: usize, b: usize) -> bool {
        self.links.contains(&(a.min(b), a.max(b)))
    }

    pub fn router(&self, index: usize) -> &DvEngine<RecordingTransport> {
        &self.routers[index]
    }

    pub fn router_prefix(&self, index: usize) -> String {
        self.routers[index].router_prefix().to_string()
    }

    pub fn table(&self, index: usize) -> &RoutingTable {
        self.routers[index].table()
    }

    /// Selected (next hop router index, cost) for `prefix` at `router`.
    pub fn route(&self, router: usize, prefix: &str) -> Option<(usize, Cost)> {
        self.routers[router]
            .fib_entries()
            .into_iter()
            .find(|entry| entry.prefix == prefix)
            .map(|entry| (router_at(entry.face_id), entry.cost))
    }

    /// Advance the shared clock one second at a time, firing timers and
    /// delivering traffic after every step.
    pub fn run_for(&mut self, secs: u64) {
        self.pump();
        for _ in 0..secs {
            self.clock.advance(1);
            for router in &mut self.routers {
                router.run_due_timers();
            }
            self.pump();
        }
    }

    /// Deliver traffic until every transport is quiet.
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut delivered = false;
            for index in 0..self.routers.len() {
                let calls = self.routers[index].transport_mut().take_calls();
                for call in calls {
                    delivered = true;
                    self.deliver(index, call);
                }
            }
            if !delivered {
                return;
            }
        }
        panic!("network did not go quiet");
    }

    fn deliver(&mut self, from: usize, call: TransportCall) {
        match call {
            TransportCall::SendHello(name) => {
                for to in 0..self.routers.len() {
                    if to != from && self.linked(from, to) {
                        self.routers[to].handle(InboundEvent::Hello {
                            name: name.clone(),
                            face_id: face_to(from),
                        });
                    }
                }
            }
            TransportCall::ExpressRequest {
                request_id,
                name,
                face_id,
                ..
            } => {
                let to = router_at(face_id);
                if !self.linked(from, to) || !self.addressed_to(to, &name) {
                    return;
                }
                self.in_flight.insert(
                    (to, name.clone(), face_to(from)),
                    InFlight {
                        requester: from,
                        request_id,
                    },
                );
                self.routers[to].handle(InboundEvent::AdvertisementRequest {
                    name,
                    face_id: face_to(from),
                });
            }
            TransportCall::ReplyAdvertisement {
                name,
                face_id,
                payload,
            } => {
                let Some(request) = self.in_flight.remove(&(from, name, face_id)) else {
                    return;
                };
                if self.linked(from, request.requester) {
                    self.routers[request.requester].handle(InboundEvent::AdvertisementData {
                        request_id: request.request_id,
                        payload,
                    });
                }
            }
            TransportCall::CancelRequest(request_id) => {
                self.in_flight.retain(|_, request| {
                    !(request.requester == from && request.request_id == request_id)
                });
            }
            TransportCall::RegisterPrefix(_) | TransportCall::ReplyKey(_) => {}
        }
    }

    fn addressed_to(&self, index: usize, name: &str) -> bool {
        ControlName::parse(name, "/ndvr")
            .map(|parsed| parsed.router_prefix() == self.router_prefix(index))
            .unwrap_or(false)
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }
}
