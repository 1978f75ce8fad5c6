//! Worker channel transport
//!
//! One window per worker: the script side holds a [`ChannelTransport`], the
//! native side (possibly on another thread) holds the matching
//! [`NativeEndpoint`]. Communication is message passing only.

use std::time::Duration;

use smol::channel::{self, Receiver, Sender};
use smol::{Timer, future};

use crate::{Transport, TransportError};

/// Script-side half
#[derive(Debug)]
pub struct ChannelTransport {
    requests: Sender<(u64, Vec<u8>)>,
    replies: Receiver<(u64, Vec<u8>)>,
    timeout: Duration,
    next_seq: u64,
}

/// Native-side half
#[derive(Debug)]
pub struct NativeEndpoint {
    requests: Receiver<(u64, Vec<u8>)>,
    replies: Sender<(u64, Vec<u8>)>,
}

/// A request taken off the channel, waiting for its reply
#[derive(Debug)]
pub struct PendingRequest {
    seq: u64,
    payload: Vec<u8>,
    replies: Sender<(u64, Vec<u8>)>,
}

/// Create a connected transport/endpoint pair
pub fn channel_pair(timeout: Duration) -> (ChannelTransport, NativeEndpoint) {
    let (req_tx, req_rx) = channel::unbounded();
    let (rep_tx, rep_rx) = channel::unbounded();

    let transport = ChannelTransport {
        requests: req_tx,
        replies: rep_rx,
        timeout,
        next_seq: 0,
    };
    let endpoint = NativeEndpoint {
        requests: req_rx,
        replies: rep_tx,
    };
    (transport, endpoint)
}

impl ChannelTransport {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.requests
            .send((seq, request.to_vec()))
            .await
            .map_err(|_| TransportError::Closed)?;

        let replies = &self.replies;
        let wait_reply = async {
            loop {
                let (reply_seq, payload) = match replies.recv().await {
                    Ok(reply) => reply,
                    Err(_) => return Err(TransportError::Closed),
                };
                if reply_seq == seq {
                    return Ok(payload);
                }
                // reply to a request that already timed out
                tracing::debug!("Dropping stale reply #{} (waiting for #{})", reply_seq, seq);
            }
        };
        let timeout = self.timeout;
        let expire = async {
            Timer::after(timeout).await;
            Err(TransportError::Timeout(timeout))
        };

        future::or(wait_reply, expire).await
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        smol::block_on(self.round_trip(request))
    }
}

impl NativeEndpoint {
    /// Wait for the next request; `None` once the transport is dropped
    pub fn recv(&self) -> Option<PendingRequest> {
        smol::block_on(self.recv_async())
    }

    pub async fn recv_async(&self) -> Option<PendingRequest> {
        let (seq, payload) = self.requests.recv().await.ok()?;
        Some(PendingRequest {
            seq,
            payload,
            replies: self.replies.clone(),
        })
    }

    /// Answer requests with `handler` until the transport is dropped
    pub fn serve<F>(&self, mut handler: F)
    where
        F: FnMut(&[u8]) -> Vec<u8>,
    {
        while let Some(request) = self.recv() {
            let reply = handler(request.payload());
            if request.respond(reply).is_err() {
                break;
            }
        }
        tracing::debug!("Native endpoint finished serving");
    }
}

impl PendingRequest {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn respond(self, reply: Vec<u8>) -> Result<(), TransportError> {
        self.replies
            .send_blocking((self.seq, reply))
            .map_err(|_| TransportError::Closed)
    }
}
