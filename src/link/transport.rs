//! Trait abstraction for the radio transport to enable testing
//!
//! Both calls are non-blocking polls. `send` reports whether the peer
//! acknowledged the payload; `try_receive` hands over whatever payload is
//! waiting, of whatever length the radio produced.

use std::collections::VecDeque;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::packet::protocol::PACKET_SIZE;

/// Payloads a receiving radio buffers before refusing more (nRF24 RX FIFO depth)
pub const LOOPBACK_QUEUE_DEPTH: usize = 3;

/// Trait for radio transport operations
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Transmit one packet. Returns `true` if delivery was acknowledged.
    fn send(&mut self, payload: &[u8; PACKET_SIZE]) -> bool;

    /// Take the next received payload, if any.
    fn try_receive(&mut self) -> Option<Vec<u8>>;
}

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// One end of an in-process link
///
/// Delivery is acknowledged when the peer's queue has room. With
/// `drop_every` set, every Nth send is lost without delivery.
#[derive(Debug)]
pub struct LoopbackEndpoint {
    outbox: Queue,
    inbox: Queue,
    drop_every: u32,
    sends: u32,
}

/// Create a connected pair of loopback endpoints
///
/// # Examples
///
/// ```
/// use rc_link::link::transport::{loopback_pair, Transport};
///
/// let (mut controller, mut vehicle) = loopback_pair();
/// assert!(controller.send(&[90, 90, 90, 90]));
/// assert_eq!(vehicle.try_receive(), Some(vec![90, 90, 90, 90]));
/// assert_eq!(vehicle.try_receive(), None);
/// ```
pub fn loopback_pair() -> (LoopbackEndpoint, LoopbackEndpoint) {
    let a_to_b: Queue = Rc::new(RefCell::new(VecDeque::new()));
    let b_to_a: Queue = Rc::new(RefCell::new(VecDeque::new()));

    let a = LoopbackEndpoint {
        outbox: Rc::clone(&a_to_b),
        inbox: Rc::clone(&b_to_a),
        drop_every: 0,
        sends: 0,
    };
    let b = LoopbackEndpoint {
        outbox: b_to_a,
        inbox: a_to_b,
        drop_every: 0,
        sends: 0,
    };
    (a, b)
}

impl LoopbackEndpoint {
    /// Lose every `n`th send from this endpoint (0 disables).
    #[must_use]
    pub fn with_drop_every(mut self, n: u32) -> Self {
        self.drop_every = n;
        self
    }

    /// Push an arbitrary payload to the peer, bypassing the packet size.
    pub fn send_raw(&mut self, payload: &[u8]) -> bool {
        self.sends = self.sends.wrapping_add(1);
        if self.drop_every != 0 && self.sends % self.drop_every == 0 {
            debug!("Loopback dropped send #{}", self.sends);
            return false;
        }

        let mut queue = self.outbox.borrow_mut();
        if queue.len() >= LOOPBACK_QUEUE_DEPTH {
            return false;
        }
        queue.push_back(payload.to_vec());
        true
    }

    /// Payloads waiting at the peer.
    pub fn pending_at_peer(&self) -> usize {
        self.outbox.borrow().len()
    }
}

impl Transport for LoopbackEndpoint {
    fn send(&mut self, payload: &[u8; PACKET_SIZE]) -> bool {
        self.send_raw(payload)
    }

    fn try_receive(&mut self) -> Option<Vec<u8>> {
        self.inbox.borrow_mut().pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_delivers_in_order() {
        let (mut a, mut b) = loopback_pair();
        assert!(a.send(&[1, 1, 1, 1]));
        assert!(a.send(&[2, 2, 2, 2]));
        assert_eq!(b.try_receive(), Some(vec![1, 1, 1, 1]));
        assert_eq!(b.try_receive(), Some(vec![2, 2, 2, 2]));
        assert_eq!(b.try_receive(), None);
    }

    #[test]
    fn test_queued_payload_survives_sender_drop() {
        let (mut a, mut b) = loopback_pair();
        assert!(a.send(&[3, 3, 3, 3]));
        assert_eq!(a.pending_at_peer(), 1);
        drop(a);
        assert_eq!(b.try_receive(), Some(vec![3, 3, 3, 3]));
    }

    #[test]
    fn test_loopback_is_bidirectional() {
        let (mut a, mut b) = loopback_pair();
        assert!(b.send(&[7, 7, 7, 7]));
        assert_eq!(a.try_receive(), Some(vec![7, 7, 7, 7]));
        assert_eq!(b.try_receive(), None);
    }

    #[test]
    fn test_loopback_full_queue_fails_send() {
        let (mut a, _b) = loopback_pair();
        for _ in 0..LOOPBACK_QUEUE_DEPTH {
            assert!(a.send(&[0; PACKET_SIZE]));
        }
        assert!(!a.send(&[0; PACKET_SIZE]));
        assert_eq!(a.pending_at_peer(), LOOPBACK_QUEUE_DEPTH);
    }

    #[test]
    fn test_loopback_drop_every() {
        let (a, mut b) = loopback_pair();
        let mut a = a.with_drop_every(2);
        assert!(a.send(&[1; PACKET_SIZE]));
        assert!(!a.send(&[2; PACKET_SIZE]));
        assert!(a.send(&[3; PACKET_SIZE]));
        assert_eq!(b.try_receive(), Some(vec![1; PACKET_SIZE]));
        assert_eq!(b.try_receive(), Some(vec![3; PACKET_SIZE]));
        assert_eq!(b.try_receive(), None);
    }

    #[test]
    fn test_send_raw_any_length() {
        let (mut a, mut b) = loopback_pair();
        assert!(a.send_raw(&[1, 2]));
        assert_eq!(b.try_receive(), Some(vec![1, 2]));
    }

    #[test]
    fn test_mock_transport() {
        let mut mock = MockTransport::new();
        mock.expect_send().times(1).returning(|_| false);
        mock.expect_try_receive().times(1).returning(|| None);

        assert!(!mock.send(&[0; PACKET_SIZE]));
        assert_eq!(mock.try_receive(), None);
    }
}
