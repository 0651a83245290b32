//! Cancellable one-shot location request.
//!
//! [`LocationRequest::new`] returns two halves: the request kept by the
//! extension and the [`LocationListener`] handed to the provider. The listener
//! delivers at most one fix. Cancelling is explicit: the extension calls
//! [`LocationRequest::cancel`] and de-registers the listener from the provider.
//! There is no timeout-based cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::time::Duration;

use super::LocationFix;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one registration with a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// State of a request as seen by the extension.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestStatus {
    Pending,
    Ready(LocationFix),
    /// Ended without a fix: cancelled, or the provider dropped the listener
    Cancelled,
}

/// Extension-side half of a one-shot request.
///
/// Once `Ready` has been observed the request is spent; later polls report
/// `Cancelled`.
pub struct LocationRequest {
    id: ListenerId,
    rx: Receiver<LocationFix>,
    cancelled: Arc<AtomicBool>,
}

/// Provider-side half of a one-shot request.
pub struct LocationListener {
    id: ListenerId,
    tx: Sender<LocationFix>,
    cancelled: Arc<AtomicBool>,
}

impl LocationRequest {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (LocationRequest, LocationListener) {
        let id = ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        (
            LocationRequest {
                id,
                rx,
                cancelled: Arc::clone(&cancelled),
            },
            LocationListener { id, tx, cancelled },
        )
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Mark the request cancelled. A fix delivered afterwards is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn poll(&self) -> RequestStatus {
        if self.is_cancelled() {
            return RequestStatus::Cancelled;
        }
        match self.rx.try_recv() {
            Ok(fix) => RequestStatus::Ready(fix),
            Err(TryRecvError::Empty) => RequestStatus::Pending,
            Err(TryRecvError::Disconnected) => RequestStatus::Cancelled,
        }
    }

    /// Block for at most `timeout`. Reports `Pending` if nothing happened in
    /// time; the request stays registered.
    pub fn wait_timeout(&self, timeout: Duration) -> RequestStatus {
        if self.is_cancelled() {
            return RequestStatus::Cancelled;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(fix) => RequestStatus::Ready(fix),
            Err(RecvTimeoutError::Timeout) => RequestStatus::Pending,
            Err(RecvTimeoutError::Disconnected) => RequestStatus::Cancelled,
        }
    }
}

impl fmt::Debug for LocationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationRequest")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl LocationListener {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Deliver the single fix. Returns false if the request was cancelled or
    /// has already gone away.
    pub fn deliver(self, fix: LocationFix) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.tx.send(fix).is_ok()
    }
}

impl fmt::Debug for LocationListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationListener")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn fix() -> LocationFix {
        LocationFix::new(GeoPoint::new(52.52, 13.405).unwrap(), Duration::from_secs(42))
    }

    #[test]
    fn test_deliver_then_poll() {
        let (request, listener) = LocationRequest::new();
        assert_eq!(request.poll(), RequestStatus::Pending);

        assert!(listener.deliver(fix()));
        assert_eq!(request.poll(), RequestStatus::Ready(fix()));
        // Spent after the fix was taken
        assert_eq!(request.poll(), RequestStatus::Cancelled);
    }

    #[test]
    fn test_cancel_discards_late_fix() {
        let (request, listener) = LocationRequest::new();
        request.cancel();

        assert!(listener.is_cancelled());
        assert!(!listener.deliver(fix()));
        assert_eq!(request.poll(), RequestStatus::Cancelled);
        assert_eq!(
            request.wait_timeout(Duration::from_secs(5)),
            RequestStatus::Cancelled
        );
    }

    #[test]
    fn test_dropped_listener_resolves_as_cancelled() {
        let (request, listener) = LocationRequest::new();
        drop(listener);

        // Returns at once instead of waiting out the timeout
        assert_eq!(
            request.wait_timeout(Duration::from_secs(60)),
            RequestStatus::Cancelled
        );
    }

    #[test]
    fn test_dropped_request_rejects_delivery() {
        let (request, listener) = LocationRequest::new();
        drop(request);

        assert!(!listener.deliver(fix()));
    }

    #[test]
    fn test_wait_returns_fix_from_other_thread() {
        let (request, listener) = LocationRequest::new();
        let handle = std::thread::spawn(move || listener.deliver(fix()));

        assert_eq!(
            request.wait_timeout(Duration::from_secs(5)),
            RequestStatus::Ready(fix())
        );
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wait_timeout_stays_pending() {
        let (request, _listener) = LocationRequest::new();
        assert_eq!(
            request.wait_timeout(Duration::from_millis(10)),
            RequestStatus::Pending
        );
        assert!(!request.is_cancelled());
    }

    #[test]
    fn test_ids_are_unique() {
        let (a, la) = LocationRequest::new();
        let (b, lb) = LocationRequest::new();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), la.id());
        assert_eq!(b.id(), lb.id());
    }
}
