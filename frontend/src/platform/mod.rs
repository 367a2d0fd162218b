//! Platform abstraction layer
//!
//! The settings coordinator suspends exactly once per update: it waits for
//! the next rendering frame so that the cleared layout is committed before
//! shared state changes. [`FrameClock`] is that wait.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Source of rendering-frame boundaries.
#[allow(async_fn_in_trait)]
pub trait FrameClock {
    /// Resolve once the next rendering frame has been reached.
    async fn next_frame(&self);
}

/// Frame clock for hosts without a compositor (native runs, tests).
///
/// Yields to the executor once, which lets already-queued work run before
/// the caller resumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldFrame;

impl FrameClock for YieldFrame {
    async fn next_frame(&self) {
        YieldOnce { yielded: false }.await
    }
}

struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "web")]
pub use web::{AnimationFrameClock, mirror_atom, rendered_layout_mutable};
