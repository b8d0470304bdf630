//! Publish/Subscribe Module
//!
//! In-process event bus with typed payloads and ordered, synchronous delivery.

mod channel;
mod event;

pub use channel::{PubSub, Subscription};
pub use event::{Event, EventKind, PriceUpdate, PRICE_UPDATE_EVENT};
