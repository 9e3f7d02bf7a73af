//! Shuffle channels between map and reduce workers.
//!
//! Uses crossbeam-channel for bounded, backpressure-aware communication: a
//! full channel blocks the sending map worker. Distributed shuffles use
//! spill files and flow control; a bounded queue is the local equivalent.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::{Error, Result};
use crate::key::CompositeKey;

/// One message on a shuffle channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ShuffleElement<A> {
    /// A partial aggregate for one key.
    Partial(CompositeKey, A),
    /// End of one map worker's output. A reduce worker may finalize only
    /// after collecting one marker per map task; that is the stage barrier.
    End,
}

/// Sender side of a shuffle channel. One clone per map worker.
#[derive(Clone)]
pub struct ShuffleSender<A> {
    sender: Sender<ShuffleElement<A>>,
}

impl<A> ShuffleSender<A> {
    /// Send one element, blocking while the channel is full (backpressure).
    pub fn send(&self, element: ShuffleElement<A>) -> Result<()> {
        self.sender
            .send(element)
            .map_err(|_| Error::Shuffle("channel closed: receiver dropped".into()))
    }
}

/// Receiver side of a shuffle channel. Owned by exactly one reduce worker.
pub struct ShuffleReceiver<A> {
    receiver: Receiver<ShuffleElement<A>>,
}

impl<A> ShuffleReceiver<A> {
    /// Receive the next element, blocking until one is available.
    pub fn recv(&self) -> Result<ShuffleElement<A>> {
        self.receiver
            .recv()
            .map_err(|_| Error::Shuffle("channel closed: all senders dropped".into()))
    }
}

/// Create a bounded shuffle channel pair with the given capacity.
pub fn shuffle_channel<A>(capacity: usize) -> (ShuffleSender<A>, ShuffleReceiver<A>) {
    let (sender, receiver) = bounded(capacity);
    (ShuffleSender { sender }, ShuffleReceiver { receiver })
}
