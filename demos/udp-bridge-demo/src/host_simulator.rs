//!
//! A stand-in for the autonomy host computer on the far side of the
//! UDP link.
//!
//! Sends each fragment kind to its own feed port as fixed-size
//! datagrams, at independent cadences.
//!

use std::{io::Error, net::SocketAddr};

use hostlink_core::{Node, Publisher};
use hostlink_topics::udp::UdpPublisher;
use hostlink_bridge::{AttitudeTarget, ChassisTarget, FireCommand};

fn ephemeral() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

/// Publishes simulated host command fragments over UDP.
pub struct UdpHostSimulator {
    attitude: UdpPublisher<AttitudeTarget>,
    chassis: UdpPublisher<ChassisTarget>,
    fire: UdpPublisher<FireCommand>,
    tick: u32,
}

impl UdpHostSimulator {
    /// Create a simulator sending to the three given feed addresses.
    pub fn new(
        attitude_addr: SocketAddr,
        chassis_addr: SocketAddr,
        fire_addr: SocketAddr,
    ) -> Result<Self, Error> {
        Ok(Self {
            attitude: UdpPublisher::new(ephemeral(), vec![attitude_addr])?,
            chassis: UdpPublisher::new(ephemeral(), vec![chassis_addr])?,
            fire: UdpPublisher::new(ephemeral(), vec![fire_addr])?,
            tick: 0,
        })
    }
}

impl Node for UdpHostSimulator {
    fn get_update_delay_us(&self) -> u128 {
        50_000
    }

    fn update(&mut self) {
        let sweep = (self.tick % 40) as f32 / 40.0 - 0.5;
        self.attitude
            .publish(AttitudeTarget {
                roll: 0.0,
                pitch: sweep * 0.4,
                yaw: sweep,
            })
            .unwrap();

        let phase = self.tick % 80;
        let chassis = if phase < 40 {
            ChassisTarget {
                vx: 0.5,
                vy: 0.0,
                w: 0.2,
            }
        } else {
            ChassisTarget::default()
        };
        self.chassis.publish(chassis).unwrap();

        if self.tick % 5 == 0 {
            self.fire
                .publish(FireCommand {
                    fire: phase >= 20 && phase < 30,
                })
                .unwrap();
        }

        self.tick = self.tick.wrapping_add(1);
    }
}
