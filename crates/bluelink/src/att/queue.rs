//! ATT transaction queue
//!
//! Serializes outbound PDUs so that at most one request is awaiting a
//! response at any time. Entries without a response continuation are
//! flushed as soon as they reach the head of the queue, so a run of
//! commands and confirmations goes out back-to-back in one pass.
//!
//! The queue performs no I/O. [`TransactionQueue::enqueue`] and
//! [`TransactionQueue::drain`] return the PDUs that must be written, in
//! order, together with the continuation to run once each is handed to the
//! transport.

use std::collections::VecDeque;

/// One queued outbound PDU
#[derive(Debug)]
struct Transaction<R, S> {
    pdu: Vec<u8>,
    on_response: Option<R>,
    on_sent: Option<S>,
}

/// A PDU released by the queue for writing
#[derive(Debug, PartialEq, Eq)]
pub struct Flushed<S> {
    /// Bytes to hand to the transport
    pub pdu: Vec<u8>,
    /// Continuation to run once the bytes are written
    pub on_sent: Option<S>,
}

/// Per-connection FIFO of ATT transactions
#[derive(Debug)]
pub struct TransactionQueue<R, S> {
    pending: VecDeque<Transaction<R, S>>,
    current: Option<R>,
    /// Bytes of the outstanding request
    current_pdu: Option<Vec<u8>>,
}

impl<R, S> Default for TransactionQueue<R, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S> TransactionQueue<R, S> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            current_pdu: None,
        }
    }

    /// Append a PDU and release whatever can be sent now
    pub fn enqueue(
        &mut self,
        pdu: Vec<u8>,
        on_response: Option<R>,
        on_sent: Option<S>,
    ) -> Vec<Flushed<S>> {
        self.pending.push_back(Transaction {
            pdu,
            on_response,
            on_sent,
        });

        self.drain()
    }

    /// Release queued PDUs up to and including the next one that expects a response
    pub fn drain(&mut self) -> Vec<Flushed<S>> {
        let mut flushed = Vec::new();

        while self.current.is_none() {
            let Some(transaction) = self.pending.pop_front() else {
                break;
            };

            if transaction.on_response.is_some() {
                self.current_pdu = Some(transaction.pdu.clone());
            }
            self.current = transaction.on_response;

            flushed.push(Flushed {
                pdu: transaction.pdu,
                on_sent: transaction.on_sent,
            });
        }

        flushed
    }

    /// Take the continuation of the outstanding request.
    ///
    /// The caller must [`drain`](Self::drain) afterwards to release the next entry.
    pub fn take_current(&mut self) -> Option<R> {
        self.current_pdu = None;
        self.current.take()
    }

    /// Continuation of the outstanding request, if any
    pub fn current(&self) -> Option<&R> {
        self.current.as_ref()
    }

    /// Whether a request is awaiting its response
    pub fn is_outstanding(&self) -> bool {
        self.current.is_some()
    }

    /// Number of entries waiting behind the outstanding request
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether an inbound PDU is a loopback copy of the outstanding request
    pub fn is_echo(&self, pdu: &[u8]) -> bool {
        self.current_pdu.as_deref() == Some(pdu)
    }

    /// Drop every queued entry and the outstanding request without running them
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
        self.current_pdu = None;
    }
}
