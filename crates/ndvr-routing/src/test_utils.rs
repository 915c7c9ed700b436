//! Test utilities for the routing engine.
//!
//! Deterministic clocks and a transport that records every call instead of
//! touching a network. Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use ndvr_routing::test_utils::ManualTimeSource;
//! use ndvr_routing::TimeSource;
//!
//! let clock = ManualTimeSource::new(1000);
//! let handle = clock.clone();
//! handle.advance(5);
//! assert_eq!(clock.now().as_secs(), 1005);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::{ControlName, FaceId, RequestId, Timestamp};
use crate::error::TransportError;
use crate::ports::{DvTransport, TimeSource};

/// A time source that returns a fixed timestamp.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: u64,
}

impl FixedTimeSource {
    /// Create a new fixed time source with the given timestamp (in seconds).
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp)
    }
}

/// A clock tests move by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    secs: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start_secs)),
        }
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.load(Ordering::SeqCst))
    }
}

/// One call made on a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    RegisterPrefix(String),
    SendHello(String),
    ExpressRequest {
        request_id: RequestId,
        name: String,
        face_id: FaceId,
        lifetime_secs: u64,
    },
    CancelRequest(RequestId),
    ReplyAdvertisement {
        name: String,
        face_id: FaceId,
        payload: Vec<u8>,
    },
    ReplyKey(String),
}

/// Transport that records calls, optionally failing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Vec<TransportCall>,
    fail_registrations: bool,
    fail_sends: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every prefix registration.
    pub fn fail_registrations(&mut self, fail: bool) {
        self.fail_registrations = fail;
    }

    /// Reject every outgoing message (Hello, request, reply).
    pub fn fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<TransportCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn registered_prefixes(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::RegisterPrefix(prefix) => Some(prefix.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn hellos_sent(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, TransportCall::SendHello(_)))
            .count()
    }

    /// Advertisement requests expressed, as (id, name).
    pub fn requests(&self) -> Vec<(RequestId, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::ExpressRequest {
                    request_id, name, ..
                } => Some((*request_id, name.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn last_request_id(&self) -> Option<RequestId> {
        self.requests().last().map(|(id, _)| *id)
    }

    pub fn canceled(&self) -> Vec<RequestId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::CancelRequest(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Payloads of advertisement replies, oldest first.
    pub fn advertisement_replies(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::ReplyAdvertisement { payload, .. } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    fn send(&mut self, call: TransportCall) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::SendFailed("send disabled".to_string()));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl DvTransport for RecordingTransport {
    fn register_prefix(&mut self, prefix: &str) -> Result<(), TransportError> {
        if self.fail_registrations {
            return Err(TransportError::RegistrationFailed(prefix.to_string()));
        }
        self.calls.push(TransportCall::RegisterPrefix(prefix.to_string()));
        Ok(())
    }

    fn send_hello(&mut self, name: &ControlName) -> Result<(), TransportError> {
        self.send(TransportCall::SendHello(name.to_string()))
    }

    fn express_advertisement_request(
        &mut self,
        request_id: RequestId,
        name: &ControlName,
        face_id: FaceId,
        lifetime_secs: u64,
    ) -> Result<(), TransportError> {
        self.send(TransportCall::ExpressRequest {
            request_id,
            name: name.to_string(),
            face_id,
            lifetime_secs,
        })
    }

    fn cancel_request(&mut self, request_id: RequestId) {
        self.calls.push(TransportCall::CancelRequest(request_id));
    }

    fn reply_advertisement(
        &mut self,
        name: &str,
        face_id: FaceId,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        self.send(TransportCall::ReplyAdvertisement {
            name: name.to_string(),
            face_id,
            payload,
        })
    }

    fn reply_key(&mut self, name: &str) -> Result<(), TransportError> {
        self.send(TransportCall::ReplyKey(name.to_string()))
    }
}
