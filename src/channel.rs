//! Change propagation from a live view back to the binding that owns it.
//!
//! One producer, one consumer, FIFO. Every message is a complete
//! [`ContentVariant`]; the consumer replaces its stored value with each one.
//! Delivery is synchronous: `send` enqueues, the owner drains on its own turn
//! of the event loop.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::content::ContentVariant;

#[derive(Debug, Default)]
struct ChannelState {
    queue: VecDeque<ContentVariant>,
    sender_alive: bool,
    receiver_alive: bool,
}

/// The consumer side has been dropped; the value was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("change receiver dropped")]
pub struct ChannelClosed(pub ContentVariant);

/// Producer half, held by the live view.
#[derive(Debug)]
pub struct ChangeSender {
    state: Arc<Mutex<ChannelState>>,
}

/// Consumer half, held by the binding.
#[derive(Debug)]
pub struct ChangeReceiver {
    state: Arc<Mutex<ChannelState>>,
}

/// Create a connected sender/receiver pair.
pub fn change_channel() -> (ChangeSender, ChangeReceiver) {
    let state = Arc::new(Mutex::new(ChannelState {
        queue: VecDeque::new(),
        sender_alive: true,
        receiver_alive: true,
    }));
    (
        ChangeSender {
            state: Arc::clone(&state),
        },
        ChangeReceiver { state },
    )
}

impl ChangeSender {
    /// Announce a new full value.
    pub fn send(&self, content: ContentVariant) -> Result<(), ChannelClosed> {
        let mut state = self.state.lock();
        if !state.receiver_alive {
            return Err(ChannelClosed(content));
        }
        state.queue.push_back(content);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        !self.state.lock().receiver_alive
    }
}

impl Drop for ChangeSender {
    fn drop(&mut self) {
        self.state.lock().sender_alive = false;
    }
}

impl ChangeReceiver {
    pub fn try_recv(&self) -> Option<ContentVariant> {
        self.state.lock().queue.pop_front()
    }

    /// Take every pending value in emission order.
    pub fn drain(&self) -> Vec<ContentVariant> {
        self.state.lock().queue.drain(..).collect()
    }

    /// Take every pending value and keep only the newest.
    pub fn latest(&self) -> Option<ContentVariant> {
        let mut state = self.state.lock();
        let last = state.queue.pop_back();
        state.queue.clear();
        last
    }

    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// False once the view holding the sender is gone. Values it sent before
    /// going away remain readable.
    pub fn is_producer_alive(&self) -> bool {
        self.state.lock().sender_alive
    }
}

impl Drop for ChangeReceiver {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.receiver_alive = false;
        state.queue.clear();
    }
}
