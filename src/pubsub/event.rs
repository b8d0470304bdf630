//! Event payloads carried by the pub/sub channel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire name of the live price event.
pub const PRICE_UPDATE_EVENT: &str = "priceUpdate";

// == Event Kind ==
/// Names an event stream; subscribers register per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PriceUpdate,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PriceUpdate => PRICE_UPDATE_EVENT,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Payloads ==
/// A new simulated price for a tracked identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub id: String,
    pub price: f64,
}

/// An event together with its payload. The variant decides the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PriceUpdate(PriceUpdate),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PriceUpdate(_) => EventKind::PriceUpdate,
        }
    }
}

impl From<PriceUpdate> for Event {
    fn from(update: PriceUpdate) -> Self {
        Event::PriceUpdate(update)
    }
}
