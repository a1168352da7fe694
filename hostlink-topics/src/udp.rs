//!
//! A Network UDP-Based Publisher and Subscriber
//!
//! The UDP publisher sends each payload, encoded in the fixed-size wire
//! format, as one datagram to a group of addresses.  The feed subscriber
//! is the receiving end a robot binds for one fragment kind: it drains
//! whatever datagrams arrived since the last poll, in arrival order, so
//! a relay can replay every arrival onto the local bus.
//!

use std::{
    io::Error,
    marker::PhantomData,
    net::{SocketAddr, UdpSocket},
};

use hostlink_core::{Publisher, Subscriber};
use hostlink_utils::wire::{WireError, WireFormat};

/// An error from publishing a payload as a UDP datagram.
#[derive(Debug)]
pub enum UdpPublishError {
    /// A `std::io::Error` occurred.
    IoError(Error),
    /// The payload failed to encode into its wire format.
    WireError(WireError),
}

/// A UDP publisher that sends payloads in their fixed-size wire format
/// to a group of addresses.
pub struct UdpPublisher<Data: WireFormat> {
    // The UdpSocket bound for transmission.
    tx: UdpSocket,
    /// The addresses to send payloads to.
    ///
    /// Public so users can retarget the publisher at runtime, for
    /// example after discovering the robot's address.
    pub addresses: Vec<SocketAddr>,
    // Binds the payload type this publisher encodes.
    phantom: PhantomData<Data>,
}

impl<Data: WireFormat> UdpPublisher<Data> {
    /// Create a new UdpPublisher.
    pub fn new(bind_address: SocketAddr, send_addresses: Vec<SocketAddr>) -> Result<Self, Error> {
        let tx = UdpSocket::bind(bind_address)?;
        tx.set_nonblocking(true)?;
        Ok(Self {
            tx,
            addresses: send_addresses,
            phantom: PhantomData,
        })
    }
}

impl<Data: WireFormat> Publisher for UdpPublisher<Data> {
    type Data = Data;
    type Error = UdpPublishError;

    fn publish(&mut self, data: Self::Data) -> Result<(), Self::Error> {
        let mut datagram = vec![0u8; Data::WIRE_SIZE];
        data.encode(&mut datagram)
            .map_err(UdpPublishError::WireError)?;

        for address in self.addresses.iter() {
            self.tx
                .send_to(&datagram, address)
                .map_err(UdpPublishError::IoError)?;
        }

        Ok(())
    }
}

/// A nonblocking UDP receiver for one fragment kind.
///
/// Each `drain` returns every well-formed datagram received since the
/// previous poll, in arrival order.  Datagrams smaller than the payload's
/// wire size are discarded; oversized ones are truncated to it.
pub struct UdpFeedSubscriber<Data: WireFormat> {
    // The receiving UdpSocket.
    rx: UdpSocket,
    // The payloads drained by the most recent `Subscriber::get`.
    buffer: Vec<Data>,
}

impl<Data: WireFormat> UdpFeedSubscriber<Data> {
    /// Create a new UdpFeedSubscriber bound to a specific bind address.
    pub fn new(bind_address: SocketAddr) -> Result<Self, Error> {
        let rx = UdpSocket::bind(bind_address)?;
        rx.set_nonblocking(true)?;
        Ok(Self {
            rx,
            buffer: Vec::new(),
        })
    }

    /// The local address this feed is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.rx.local_addr()
    }

    /// Drain the payloads received since the last poll, in arrival order.
    pub fn drain(&mut self) -> Vec<Data> {
        let mut datagram = vec![0u8; Data::WIRE_SIZE];
        let mut drained = Vec::new();

        loop {
            match self.rx.recv_from(&mut datagram) {
                Ok((received, _)) if received >= Data::WIRE_SIZE => {
                    if let Ok(data) = Data::decode(&datagram) {
                        drained.push(data);
                    }
                }
                // Undersized datagram: not a payload of this feed.
                Ok(_) => {}
                Err(_) => break,
            }
        }

        drained
    }
}

impl<Data: WireFormat> Subscriber for UdpFeedSubscriber<Data> {
    type Target = Vec<Data>;

    /// Replace the held payloads with the ones received since the last
    /// poll and return them.
    fn get(&mut self) -> &Self::Target {
        self.buffer = self.drain();
        &self.buffer
    }
}
