//! Messages exchanged between stages

use tokio::sync::mpsc;

/// A work item or the end of a stage's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Item(T),
    EndOfStream,
}

impl<T> Message<T> {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

/// Creates a bounded stage channel
///
/// A capacity of 1 gives near-rendezvous handoff: a sender waits while the
/// receiver is still busy with the previous item.
pub fn channel<T>(capacity: usize) -> (mpsc::Sender<Message<T>>, mpsc::Receiver<Message<T>>) {
    mpsc::channel(capacity.max(1))
}
