//! Driving importer futures at the resolver boundary.
//!
//! The compiler itself is synchronous; the only suspension points the
//! scheduling model allows are `canonicalize` and `load`. An async
//! importer's future is polled here until completion. Importer futures
//! are expected to make progress on their own (in-memory resolvers
//! resolve on first poll; I/O-backed ones park the thread briefly), so a
//! plain poll loop with a no-op waker is sufficient and brings in no
//! executor dependency.

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll};

use futures::task::noop_waker;

/// Poll a future to completion on the current thread.
pub fn drive<F: Future>(future: F) -> F::Output {
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = pin!(future);
    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_ready_future() {
        assert_eq!(drive(async { 21 * 2 }), 42);
    }

    #[test]
    fn test_drive_future_with_yields() {
        // A future that returns Pending a few times before resolving.
        struct CountDown(u32);
        impl Future for CountDown {
            type Output = u32;
            fn poll(
                mut self: std::pin::Pin<&mut Self>,
                _cx: &mut Context<'_>,
            ) -> Poll<u32> {
                if self.0 == 0 {
                    Poll::Ready(7)
                } else {
                    self.0 -= 1;
                    Poll::Pending
                }
            }
        }
        assert_eq!(drive(CountDown(3)), 7);
    }
}
