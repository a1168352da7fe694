//!
//! Publisher -> Subscriber Communication
//!
//! Publishers push data to some endpoint or location so that subscribers
//! can read the data published by the publishers.  Transports that deliver
//! by callback instead of by poll tag every delivery with the execution
//! context it originates from.
//!

/// The execution context a payload was delivered from.
///
/// Transports that can deliver from an interrupt-like restricted context
/// (no blocking, no allocation) tag each delivery so downstream handlers
/// can apply the same discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryContext {
    /// An ordinary task or thread context.
    Task,
    /// An interrupt-like restricted context: handlers must not block,
    /// suspend, or allocate.
    Interrupt,
}

impl DeliveryContext {
    /// Whether this delivery originated from an interrupt-like context.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, DeliveryContext::Interrupt)
    }
}

/// The basic publisher trait that enables the publishing of data to some
/// endpoint for subscribers to read.
pub trait Publisher {
    /// The data to be published by the publisher.
    type Data;
    /// The error type from attempting to publish data.
    type Error;

    /// Publish a piece of data to the endpoint for subscribers to read.
    fn publish(&mut self, data: Self::Data) -> Result<(), Self::Error>;
}

/// The basic subscriber trait that enables the reading of data from some
/// endpoint.
pub trait Subscriber {
    /// The type of data stored in the subscriber.
    type Target;

    /// Update the current data in the subscriber and return a reference
    /// to the current data.
    fn get(&mut self) -> &Self::Target;
}
