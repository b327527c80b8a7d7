//! Durable queue store abstraction.
//!
//! Both pipelines share one mental model: a FIFO list for pending work, a
//! TTL-keyed set for "seen" (the idempotency ledger), and a list for poison
//! messages. The [`QueueStore`] trait captures that contract; the typed
//! [`EventQueue`] and [`UploadJobQueue`] wrappers add message encoding and
//! key namespacing on top of it.
//!
//! An implementation may be backed by any store offering atomic
//! set-if-absent and list push/pop; the in-memory implementation in this
//! crate is the development and test substrate.

pub mod error;
mod event_queue;
mod memory;
mod store;
mod upload_queue;

pub use self::{
    error::{QueueError, Result},
    event_queue::EventQueue,
    memory::InMemoryQueueStore,
    store::{DeadLetterEntry, QueueStore, DEQUEUE_WAIT, SEEN_TTL},
    upload_queue::UploadJobQueue,
};
