use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::publisher::NoOpEventPublisher;
use crate::codec::WireCodec;
use crate::domain::{
    DvConfig, EventScheduler, HelloSchedule, InvertibleBloomFilter, NeighborMap, RequestId,
    RoutingTable, TimerEvent, TimerId, Timestamp,
};
use crate::error::DvError;
use crate::metrics::DvMetrics;
use crate::ports::{DvEvent, DvEventPublisher, DvTransport, InboundEvent, TimeSource};

/// An advertisement request waiting for its reply.
#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    pub neighbor: String,
    pub timer: TimerId,
}

/// Distance-vector routing engine.
///
/// One instance per router. It exclusively owns the routing table and the
/// neighbor map and is driven from a single thread of control: the host
/// feeds it [`InboundEvent`]s and fires its due timers, one at a time. It
/// never blocks and never sleeps.
///
/// # Example
///
/// ```rust,ignore
/// let config = DvConfig::new("ufba", "Router1").with_local_prefixes(["/ufba/video"]);
/// let mut engine = DvEngine::new(config, transport, Box::new(SystemTimeSource::new()))?;
/// engine.start()?;
///
/// engine.handle(InboundEvent::Hello { name, face_id });
/// engine.run_due_timers();
/// ```
pub struct DvEngine<T: DvTransport> {
    pub(crate) config: DvConfig,
    /// Our identity, `/<network>/%C1.Router/<name>`
    pub(crate) router_prefix: String,
    pub(crate) codec: WireCodec,
    pub(crate) empty_digest: InvertibleBloomFilter,
    pub(crate) routing_table: RoutingTable,
    pub(crate) neighbors: NeighborMap,
    /// Prefixes we originate
    pub(crate) local_prefixes: BTreeSet<String>,
    pub(crate) hello: HelloSchedule,
    /// Armed Hello timer and its deadline
    pub(crate) hello_timer: Option<(TimerId, Timestamp)>,
    /// Set by a topology change, cleared by the next Hello
    pub(crate) topology_changed: bool,
    pub(crate) scheduler: EventScheduler,
    pub(crate) pending: HashMap<RequestId, PendingRequest>,
    pub(crate) retry_timers: HashMap<String, TimerId>,
    pub(crate) next_request_id: u64,
    pub(crate) started: bool,
    pub(crate) transport: T,
    pub(crate) time_source: Box<dyn TimeSource>,
    pub(crate) publisher: Arc<dyn DvEventPublisher>,
    pub(crate) metrics: Arc<DvMetrics>,
}

impl<T: DvTransport> DvEngine<T> {
    /// Create an engine. Fails if the configuration is invalid.
    pub fn new(
        config: DvConfig,
        transport: T,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, DvError> {
        config.validate()?;

        let router_prefix = config.router_prefix();
        let local_prefixes = config.local_prefixes.iter().cloned().collect();
        Ok(Self {
            router_prefix,
            codec: WireCodec::from_config(&config),
            empty_digest: InvertibleBloomFilter::new(config.ibf_size, config.ibf_hash_functions),
            routing_table: RoutingTable::new(),
            neighbors: NeighborMap::new(),
            local_prefixes,
            hello: HelloSchedule::new(
                config.hello_interval_initial_secs,
                config.hello_interval_max_secs,
            ),
            hello_timer: None,
            topology_changed: false,
            scheduler: EventScheduler::new(),
            pending: HashMap::new(),
            retry_timers: HashMap::new(),
            next_request_id: 0,
            started: false,
            transport,
            time_source,
            publisher: Arc::new(NoOpEventPublisher::new()),
            metrics: Arc::new(DvMetrics::new()),
            config,
        })
    }

    /// Route events to `publisher` instead of dropping them.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn DvEventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Register control prefixes, originate local prefixes and arm timers.
    ///
    /// Registration failures are returned and leave the engine stopped.
    pub fn start(&mut self) -> Result<(), DvError> {
        if self.started {
            return Ok(());
        }

        let protocol = self.config.protocol_prefix.trim_end_matches('/').to_string();
        let registrations = [
            format!("{}/hello", protocol),
            format!("{}/dvinfo{}", protocol, self.router_prefix),
            format!("{}/key{}", protocol, self.router_prefix),
        ];
        for prefix in registrations {
            self.transport
                .register_prefix(&prefix)
                .map_err(|e| DvError::Registration {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
            debug!(prefix = %prefix, "registered control prefix");
        }

        let now = self.now();
        let local: Vec<String> = self.local_prefixes.iter().cloned().collect();
        for prefix in &local {
            self.routing_table
                .originate(prefix, &self.router_prefix, &self.empty_digest, now.as_secs());
        }

        self.started = true;
        self.schedule_hello(now);
        self.scheduler.schedule(
            now.add_secs(self.config.local_rt_interval_secs),
            TimerEvent::LocalRtRefresh,
        );
        self.scheduler.schedule(
            now.add_secs(self.config.local_rt_interval_secs),
            TimerEvent::NeighborSweep,
        );

        info!(
            router = %self.router_prefix,
            prefixes = local.len(),
            "routing engine started"
        );
        Ok(())
    }

    /// Cancel every timer and outstanding request.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        let outstanding: Vec<RequestId> = self.pending.keys().copied().collect();
        for request_id in outstanding {
            self.cancel_pending(request_id);
        }
        self.scheduler.clear();
        self.retry_timers.clear();
        self.hello_timer = None;
        self.started = false;
        info!(router = %self.router_prefix, "routing engine stopped");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Dispatch one inbound event.
    pub fn handle(&mut self, event: InboundEvent) {
        if !self.started {
            debug!(?event, "engine stopped, dropping event");
            return;
        }
        match event {
            InboundEvent::Hello { name, face_id } => self.on_hello(&name, face_id),
            InboundEvent::AdvertisementRequest { name, face_id } => {
                self.serve_advertisement(&name, face_id)
            }
            InboundEvent::AdvertisementData {
                request_id,
                payload,
            } => self.on_advertisement_data(request_id, &payload),
            InboundEvent::ValidationFailed { request_id, reason } => {
                self.on_validation_failed(request_id, &reason)
            }
            InboundEvent::Timeout { request_id } => self.on_request_timeout(request_id),
            InboundEvent::Nack { request_id, reason } => self.on_nack(request_id, &reason),
            InboundEvent::KeyRequest { name } => self.serve_key(&name),
        }
    }

    /// Earliest armed timer deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }

    /// Fire every timer due now. Returns how many fired.
    pub fn run_due_timers(&mut self) -> usize {
        let now = self.now();
        let mut fired = 0;
        while let Some((_, event)) = self.scheduler.pop_due(now) {
            fired += 1;
            self.on_timer(event);
        }
        fired
    }

    fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SendHello => {
                self.hello_timer = None;
                self.send_hello();
            }
            TimerEvent::LocalRtRefresh => self.refresh_local_table(),
            TimerEvent::RequestTimeout(request_id) => self.on_request_timeout(request_id),
            TimerEvent::RetryRequest(neighbor) => {
                self.retry_timers.remove(&neighbor);
                if self.neighbors.get(&neighbor).is_some_and(|n| !n.is_stale()) {
                    self.request_advertisement(&neighbor, true);
                }
            }
            TimerEvent::NeighborSweep => self.sweep_neighbors(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DvConfig {
        &self.config
    }

    pub fn router_prefix(&self) -> &str {
        &self.router_prefix
    }

    /// Read access to the live table. Clone it to keep it past the next event.
    pub fn table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn neighbors(&self) -> &NeighborMap {
        &self.neighbors
    }

    pub fn hello_interval_secs(&self) -> u64 {
        self.hello.current_secs()
    }

    pub fn metrics(&self) -> Arc<DvMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn outstanding_requests(&self) -> usize {
        self.pending.len()
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    pub(crate) fn publish(&self, event: DvEvent) {
        if let Err(error) = self.publisher.publish(event) {
            debug!(%error, "event publish failed");
        }
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        RequestId(self.next_request_id)
    }

    /// Forget a request: disarm its timeout, tell the transport, detach it
    /// from its neighbor.
    pub(crate) fn cancel_pending(&mut self, request_id: RequestId) -> Option<PendingRequest> {
        let request = self.pending.remove(&request_id)?;
        self.scheduler.cancel(request.timer);
        self.transport.cancel_request(request_id);
        if let Some(neighbor) = self.neighbors.get_mut(&request.neighbor) {
            if neighbor.outstanding == Some(request_id) {
                neighbor.outstanding = None;
            }
        }
        Some(request)
    }

    pub(crate) fn cancel_retry(&mut self, neighbor: &str) {
        if let Some(timer) = self.retry_timers.remove(neighbor) {
            self.scheduler.cancel(timer);
        }
    }

    pub(crate) fn schedule_hello(&mut self, deadline: Timestamp) {
        let id = self.scheduler.schedule(deadline, TimerEvent::SendHello);
        self.hello_timer = Some((id, deadline));
    }

    /// Reset the Hello back-off and pull the next Hello in if it is armed
    /// further out than one initial interval.
    pub(crate) fn note_topology_change(&mut self) {
        self.topology_changed = true;
        self.hello.reset();
        if !self.started {
            return;
        }

        let target = self.now().add_secs(self.hello.initial_secs());
        let rearm = match self.hello_timer {
            Some((_, deadline)) => deadline > target,
            None => true,
        };
        if rearm {
            if let Some((id, _)) = self.hello_timer.take() {
                self.scheduler.cancel(id);
            }
            self.schedule_hello(target);
        }
    }
}
