//! Event streaming Relay
//!
//! Relay provides type-safe event streaming from one source to a consumer
//! stream using unbounded channels.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::{Arc, OnceLock};

/// Type-safe event relay.
///
/// Relay names follow the `{source}_{event}_relay` pattern, e.g.
/// `settings_applied_relay` fires after the coordinator applied an update.
///
/// ```rust
/// use frontend::dataflow::relay;
/// use futures::StreamExt;
///
/// let (settings_applied_relay, mut stream) = relay::<u32>();
/// settings_applied_relay.send(1);
/// # futures::executor::block_on(async move {
/// assert_eq!(stream.next().await, Some(1));
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
    #[cfg(debug_assertions)]
    emit_location: Arc<OnceLock<&'static std::panic::Location<'static>>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelayError {
    #[error("relay receiver dropped")]
    ChannelClosed,
    /// Relay send called from multiple locations (debug builds only)
    #[cfg(debug_assertions)]
    #[error("relay emitted from {current} after {previous}")]
    MultipleEmitters {
        previous: &'static std::panic::Location<'static>,
        current: &'static std::panic::Location<'static>,
    },
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            Relay {
                sender,
                #[cfg(debug_assertions)]
                emit_location: Arc::new(OnceLock::new()),
            },
            receiver,
        )
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    fn check_single_source(&self) -> Result<(), RelayError> {
        let caller = std::panic::Location::caller();
        match self.emit_location.set(caller) {
            Ok(()) => Ok(()),
            Err(_) => match self.emit_location.get() {
                Some(previous) if *previous == caller => Ok(()),
                Some(previous) => Err(RelayError::MultipleEmitters {
                    previous,
                    current: caller,
                }),
                None => Ok(()),
            },
        }
    }

    /// Send an event. Events sent after the receiver is gone are discarded.
    ///
    /// Debug builds panic when the same relay is sent from two call sites.
    #[track_caller]
    pub fn send(&self, value: T) {
        #[cfg(debug_assertions)]
        if let Err(error) = self.check_single_source() {
            panic!("{error}");
        }

        let _ = self.sender.unbounded_send(value);
    }

    #[track_caller]
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        #[cfg(debug_assertions)]
        self.check_single_source()?;

        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Disconnected relay; every event is discarded.
    fn default() -> Self {
        let (relay, _receiver) = Self::new();
        relay
    }
}

/// Creates a Relay together with its receiving stream.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_relay_delivers_in_order() {
        let (relay, mut stream) = relay::<u32>();

        for value in 1..=3 {
            relay.send(value);
        }

        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_relay_try_send_after_receiver_dropped() {
        let (relay, receiver) = Relay::new();
        let emit = |value: &str| relay.try_send(value.to_string());

        assert!(emit("kept").is_ok());
        drop(receiver);

        assert_eq!(emit("lost"), Err(RelayError::ChannelClosed));
        assert!(relay.is_closed());
    }

    #[test]
    fn test_default_relay_discards_events() {
        let relay: Relay<u8> = Relay::default();
        relay.send(7);
        assert!(relay.is_closed());
    }
}
