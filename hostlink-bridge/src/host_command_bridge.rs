//!
//! The Host Command Bridge
//!
//! The upstream host publishes its gimbal target, chassis velocity and
//! fire trigger on three independent topics, at independent rates, from
//! whatever execution context its transport delivers on.  The bridge
//! keeps one slot per fragment kind holding the latest known value and
//! its arrival time.  Every arrival overwrites its slot and immediately
//! triggers one aggregation pass: the three current slot values are
//! merged into a `RobotCommand` that is handed to the downstream sink
//! before the publishing call returns.  There is no debouncing and no
//! queuing; back-to-back arrivals each produce an emission and the most
//! recent one wins.
//!
//! A field whose latest value is trivial (an exactly-zero chassis
//! vector, or a zero pitch and yaw) is reported offline rather than
//! forwarded, which conflates "never received" with "explicitly
//! commanded to stop".  A NaN in any component compares unequal to
//! zero, so a corrupted fragment is always reported online; downstream
//! consumers must treat the online flags as "a non-trivial value was
//! observed", not as "the value is valid".
//!

use std::{sync::Arc, time::Duration};

use crossbeam::atomic::AtomicCell;

use quanta::{Clock, Instant};

use tracing::{debug, trace};

use hostlink_core::{
    ChassisVelocity, CommandSink, ControlSource, DeliveryContext, GimbalAttitude, Node,
    RobotCommand,
};
use hostlink_topics::local::{Topic, TopicBus, TopicError};

use crate::messages::{AttitudeTarget, ChassisTarget, FireCommand};

/// Fragments older than this are reported offline when staleness gating
/// is enabled.
pub const DATA_TIMEOUT: Duration = Duration::from_millis(200);

/// Construction-time configuration of the bridge.
///
/// The topic names are the only external surface: three inbound
/// channels, fixed at construction.
#[derive(Clone, Debug)]
pub struct HostCommandConfig {
    /// The topic the host publishes `AttitudeTarget` fragments on.
    pub attitude_topic: String,
    /// The topic the host publishes `ChassisTarget` fragments on.
    pub chassis_topic: String,
    /// The topic the host publishes `FireCommand` fragments on.
    pub fire_topic: String,
    /// The age beyond which a fragment is reported offline.  `None`
    /// records arrival times without ever enforcing them.
    pub stale_after: Option<Duration>,
}

impl Default for HostCommandConfig {
    fn default() -> Self {
        Self {
            attitude_topic: "target_eulr".to_string(),
            chassis_topic: "host_chassis_data".to_string(),
            fire_topic: "host_fire_notify".to_string(),
            stale_after: None,
        }
    }
}

// One slot per fragment kind, plus its arrival stamp.  Stores and loads
// are plain fixed-size copies, safe from restricted delivery contexts;
// serializing delivery per kind is the transport's responsibility.
struct FragmentSlots {
    attitude: AtomicCell<AttitudeTarget>,
    chassis: AtomicCell<ChassisTarget>,
    fire: AtomicCell<FireCommand>,
    attitude_stamp: AtomicCell<Option<Instant>>,
    chassis_stamp: AtomicCell<Option<Instant>>,
    fire_stamp: AtomicCell<Option<Instant>>,
}

impl FragmentSlots {
    fn new() -> Self {
        Self {
            attitude: AtomicCell::new(AttitudeTarget::default()),
            chassis: AtomicCell::new(ChassisTarget::default()),
            fire: AtomicCell::new(FireCommand::default()),
            attitude_stamp: AtomicCell::new(None),
            chassis_stamp: AtomicCell::new(None),
            fire_stamp: AtomicCell::new(None),
        }
    }
}

// The state shared between the three receiver callbacks and the bridge
// node itself.
struct BridgeShared {
    slots: FragmentSlots,
    clock: Clock,
    stale_after: Option<Duration>,
    sink: Box<dyn CommandSink>,
}

impl BridgeShared {
    // Whether a fragment with the given stamp participates in the
    // composite.  With gating disabled every fragment does; with gating
    // enabled a never-received fragment does not.
    fn live(&self, stamp: Option<Instant>, now: Instant) -> bool {
        match self.stale_after {
            None => true,
            Some(limit) => match stamp {
                Some(stamp) => now.duration_since(stamp) <= limit,
                None => false,
            },
        }
    }

    // Merge the current slot values into one command.
    fn assemble(&self) -> RobotCommand {
        let now = self.clock.now();
        let mut command = RobotCommand::default();

        let chassis = self.slots.chassis.load();
        if chassis.is_zero() || !self.live(self.slots.chassis_stamp.load(), now) {
            command.chassis = ChassisVelocity::default();
            command.chassis_online = false;
        } else {
            command.chassis.x = chassis.vx;
            command.chassis.y = chassis.vy;
            command.chassis.z = chassis.w;
            command.chassis_online = true;
        }

        let attitude = self.slots.attitude.load();
        if (attitude.pitch == 0.0 && attitude.yaw == 0.0)
            || !self.live(self.slots.attitude_stamp.load(), now)
        {
            command.gimbal = GimbalAttitude::default();
            command.gimbal_online = false;
        } else {
            command.gimbal.pitch = attitude.pitch;
            command.gimbal.yaw = attitude.yaw;
            command.gimbal_online = true;
        }

        command.fire = self.slots.fire.load().fire;

        command.source = ControlSource::Host;
        command
    }

    // One aggregation + emission pass, run on every fragment arrival.
    fn emit(&self, context: DeliveryContext) {
        let command = self.assemble();
        trace!(
            from_interrupt = context.is_interrupt(),
            chassis_online = command.chassis_online,
            gimbal_online = command.gimbal_online,
            fire = command.fire,
            "forwarding host command"
        );
        self.sink.feed(context, command);
    }
}

/// The ingestion adapter between a host computer and the command
/// arbiter.
///
/// Constructing a bridge registers one receiver callback per fragment
/// topic; from then on the bridge is purely reactive.  The `Node`
/// implementation only provides the lifecycle hook and a periodic
/// freshness report.
pub struct HostCommandBridge {
    shared: Arc<BridgeShared>,
}

impl HostCommandBridge {
    /// Create a bridge that feeds assembled commands directly into the
    /// given sink.
    pub fn new(
        bus: &TopicBus,
        config: HostCommandConfig,
        sink: impl CommandSink + 'static,
    ) -> Result<Self, TopicError> {
        Self::build(bus, config, Box::new(sink), Clock::new())
    }

    /// Create a bridge that publishes assembled commands onto a
    /// dedicated outbound topic the downstream consumer subscribes to.
    pub fn with_command_topic(
        bus: &TopicBus,
        config: HostCommandConfig,
        command_topic: &str,
    ) -> Result<Self, TopicError> {
        let sink = CommandTopicSink::new(bus.topic(command_topic)?);
        Self::build(bus, config, Box::new(sink), Clock::new())
    }

    fn build(
        bus: &TopicBus,
        config: HostCommandConfig,
        sink: Box<dyn CommandSink>,
        clock: Clock,
    ) -> Result<Self, TopicError> {
        let attitude_topic = bus.topic::<AttitudeTarget>(&config.attitude_topic)?;
        let chassis_topic = bus.topic::<ChassisTarget>(&config.chassis_topic)?;
        let fire_topic = bus.topic::<FireCommand>(&config.fire_topic)?;

        let shared = Arc::new(BridgeShared {
            slots: FragmentSlots::new(),
            clock,
            stale_after: config.stale_after,
            sink,
        });

        let receiver = shared.clone();
        attitude_topic.register_callback(move |context, fragment: &AttitudeTarget| {
            receiver.slots.attitude.store(*fragment);
            receiver.slots.attitude_stamp.store(Some(receiver.clock.now()));
            receiver.emit(context);
        });

        let receiver = shared.clone();
        chassis_topic.register_callback(move |context, fragment: &ChassisTarget| {
            receiver.slots.chassis.store(*fragment);
            receiver.slots.chassis_stamp.store(Some(receiver.clock.now()));
            receiver.emit(context);
        });

        let receiver = shared.clone();
        fire_topic.register_callback(move |context, fragment: &FireCommand| {
            receiver.slots.fire.store(*fragment);
            receiver.slots.fire_stamp.store(Some(receiver.clock.now()));
            receiver.emit(context);
        });

        debug!(
            attitude = %config.attitude_topic,
            chassis = %config.chassis_topic,
            fire = %config.fire_topic,
            "host command bridge registered"
        );

        Ok(Self { shared })
    }
}

impl Node for HostCommandBridge {
    fn get_update_delay_us(&self) -> u128 {
        100_000
    }

    /// Monitor hook: report how old each fragment currently is.
    fn update(&mut self) {
        let now = self.shared.clock.now();
        let age_ms =
            |stamp: Option<Instant>| stamp.map(|stamp| now.duration_since(stamp).as_millis());

        trace!(
            attitude_age_ms = ?age_ms(self.shared.slots.attitude_stamp.load()),
            chassis_age_ms = ?age_ms(self.shared.slots.chassis_stamp.load()),
            fire_age_ms = ?age_ms(self.shared.slots.fire_stamp.load()),
            "host fragment freshness"
        );
    }
}

/// A `CommandSink` that publishes every assembled command onto an
/// outbound topic, tagged with the context the triggering fragment was
/// delivered from.
pub struct CommandTopicSink {
    topic: Topic<RobotCommand>,
}

impl CommandTopicSink {
    /// Wrap an outbound command topic as a sink.
    pub fn new(topic: Topic<RobotCommand>) -> Self {
        Self { topic }
    }
}

impl CommandSink for CommandTopicSink {
    fn feed(&self, context: DeliveryContext, command: RobotCommand) {
        self.topic.publish_from(context, command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use hostlink_core::Subscriber;

    // Records every emission so tests can assert on the full sequence.
    #[derive(Clone, Default)]
    struct RecordingSink {
        commands: Arc<Mutex<Vec<(DeliveryContext, RobotCommand)>>>,
    }

    impl RecordingSink {
        fn all(&self) -> Vec<(DeliveryContext, RobotCommand)> {
            self.commands.lock().unwrap().clone()
        }

        fn last(&self) -> RobotCommand {
            self.commands.lock().unwrap().last().unwrap().1
        }

        fn len(&self) -> usize {
            self.commands.lock().unwrap().len()
        }
    }

    impl CommandSink for RecordingSink {
        fn feed(&self, context: DeliveryContext, command: RobotCommand) {
            self.commands.lock().unwrap().push((context, command));
        }
    }

    struct Fixture {
        bus: TopicBus,
        sink: RecordingSink,
        bridge: HostCommandBridge,
    }

    impl Fixture {
        fn new(stale_after: Option<Duration>) -> Self {
            let bus = TopicBus::new();
            let sink = RecordingSink::default();
            let bridge = HostCommandBridge::new(
                &bus,
                HostCommandConfig {
                    stale_after,
                    ..Default::default()
                },
                sink.clone(),
            )
            .unwrap();
            Self { bus, sink, bridge }
        }

        // Same fixture, but on a mock clock the test controls.
        fn with_mock_clock(stale_after: Option<Duration>) -> (Self, Arc<quanta::Mock>) {
            let (clock, mock) = Clock::mock();
            let bus = TopicBus::new();
            let sink = RecordingSink::default();
            let bridge = HostCommandBridge::build(
                &bus,
                HostCommandConfig {
                    stale_after,
                    ..Default::default()
                },
                Box::new(sink.clone()),
                clock,
            )
            .unwrap();
            (Self { bus, sink, bridge }, mock)
        }

        fn publish_attitude(&self, pitch: f32, yaw: f32) {
            self.bus
                .topic::<AttitudeTarget>("target_eulr")
                .unwrap()
                .publish(AttitudeTarget {
                    roll: 0.0,
                    pitch,
                    yaw,
                });
        }

        fn publish_chassis(&self, vx: f32, vy: f32, w: f32) {
            self.bus
                .topic::<ChassisTarget>("host_chassis_data")
                .unwrap()
                .publish(ChassisTarget { vx, vy, w });
        }

        fn publish_fire(&self, fire: bool) {
            self.bus
                .topic::<FireCommand>("host_fire_notify")
                .unwrap()
                .publish(FireCommand { fire });
        }
    }

    #[test]
    fn test_first_chassis_update_goes_online() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(1.0, 0.0, 0.0);

        let command = fixture.sink.last();
        assert_eq!(
            command.chassis,
            ChassisVelocity {
                x: 1.0,
                y: 0.0,
                z: 0.0
            }
        );
        assert!(command.chassis_online);
        assert_eq!(command.gimbal, GimbalAttitude::default());
        assert!(!command.gimbal_online);
        assert!(!command.fire);
    }

    #[test]
    fn test_gimbal_update_with_chassis_still_zero() {
        let fixture = Fixture::new(None);

        fixture.publish_attitude(0.1, -0.2);

        let command = fixture.sink.last();
        assert!(!command.chassis_online);
        assert!(command.gimbal_online);
        assert_eq!(command.gimbal.pitch, 0.1);
        assert_eq!(command.gimbal.yaw, -0.2);
        assert_eq!(command.gimbal.roll, 0.0);
    }

    #[test]
    fn test_zero_chassis_reports_offline() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(0.0, 0.0, 0.0);

        let command = fixture.sink.last();
        assert!(!command.chassis_online);
        assert_eq!(command.chassis, ChassisVelocity::default());
    }

    #[test]
    fn test_chassis_axes_map_onto_velocity_axes() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(0.25, -1.5, 3.0);

        let command = fixture.sink.last();
        assert!(command.chassis_online);
        assert_eq!(command.chassis.x, 0.25);
        assert_eq!(command.chassis.y, -1.5);
        assert_eq!(command.chassis.z, 3.0);
    }

    #[test]
    fn test_gimbal_offline_checks_only_pitch_and_yaw() {
        let fixture = Fixture::new(None);

        // A nonzero roll alone does not make the gimbal target live.
        fixture
            .bus
            .topic::<AttitudeTarget>("target_eulr")
            .unwrap()
            .publish(AttitudeTarget {
                roll: 1.0,
                pitch: 0.0,
                yaw: 0.0,
            });

        let command = fixture.sink.last();
        assert!(!command.gimbal_online);
        assert_eq!(command.gimbal, GimbalAttitude::default());
    }

    #[test]
    fn test_repeated_fragment_is_idempotent() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(1.0, 2.0, 3.0);
        fixture.publish_chassis(1.0, 2.0, 3.0);

        let emissions = fixture.sink.all();
        assert_eq!(emissions.len(), 2);
        assert_eq!(emissions[0].1, emissions[1].1);
    }

    #[test]
    fn test_last_write_wins_within_a_kind() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(1.0, 0.0, 0.0);
        fixture.publish_chassis(2.0, 0.0, 0.0);

        assert_eq!(fixture.sink.last().chassis.x, 2.0);

        // A later cross-kind arrival still reads the newest chassis value.
        fixture.publish_fire(false);
        assert_eq!(fixture.sink.last().chassis.x, 2.0);
    }

    #[test]
    fn test_trigger_update_leaves_other_fields_alone() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(1.0, 2.0, 3.0);
        fixture.publish_attitude(0.5, 0.5);
        let before = fixture.sink.last();

        fixture.publish_fire(true);
        let after = fixture.sink.last();

        assert_eq!(after.chassis, before.chassis);
        assert_eq!(after.gimbal, before.gimbal);
        assert!(after.fire);
    }

    #[test]
    fn test_every_emission_is_tagged_host() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(1.0, 0.0, 0.0);
        fixture.publish_attitude(0.1, 0.1);
        fixture.publish_fire(true);

        assert_eq!(fixture.sink.len(), 3);
        for (_, command) in fixture.sink.all() {
            assert_eq!(command.source, ControlSource::Host);
        }
    }

    #[test]
    fn test_delivery_context_reaches_the_sink() {
        let fixture = Fixture::new(None);

        fixture
            .bus
            .topic::<ChassisTarget>("host_chassis_data")
            .unwrap()
            .publish_from(
                DeliveryContext::Interrupt,
                ChassisTarget {
                    vx: 1.0,
                    vy: 0.0,
                    w: 0.0,
                },
            );

        let (context, _) = fixture.sink.all()[0];
        assert!(context.is_interrupt());
    }

    #[test]
    fn test_nan_fragment_is_reported_online() {
        let fixture = Fixture::new(None);

        fixture.publish_chassis(f32::NAN, 0.0, 0.0);

        let command = fixture.sink.last();
        assert!(command.chassis_online);
        assert!(command.chassis.x.is_nan());
    }

    #[test]
    fn test_recorded_stamps_are_not_enforced_by_default() {
        let (fixture, mock) = Fixture::with_mock_clock(None);

        fixture.publish_chassis(1.0, 0.0, 0.0);
        mock.increment(Duration::from_secs(10));
        fixture.publish_fire(false);

        let command = fixture.sink.last();
        assert!(command.chassis_online);
        assert_eq!(command.chassis.x, 1.0);
    }

    #[test]
    fn test_stale_fragment_goes_offline_when_gated() {
        let (fixture, mock) = Fixture::with_mock_clock(Some(DATA_TIMEOUT));

        fixture.publish_chassis(1.0, 0.0, 0.0);
        assert!(fixture.sink.last().chassis_online);

        mock.increment(DATA_TIMEOUT + Duration::from_millis(1));
        fixture.publish_fire(true);

        let command = fixture.sink.last();
        assert!(!command.chassis_online);
        assert_eq!(command.chassis, ChassisVelocity::default());
        assert!(command.fire);
    }

    #[test]
    fn test_gated_gimbal_expires_like_the_chassis() {
        let (fixture, mock) = Fixture::with_mock_clock(Some(DATA_TIMEOUT));

        fixture.publish_attitude(0.3, 0.3);
        assert!(fixture.sink.last().gimbal_online);

        mock.increment(Duration::from_millis(150));
        fixture.publish_fire(false);
        assert!(fixture.sink.last().gimbal_online, "not yet stale");

        mock.increment(Duration::from_millis(100));
        fixture.publish_fire(false);
        assert!(!fixture.sink.last().gimbal_online);
    }

    #[test]
    fn test_monitor_update_runs_with_empty_slots() {
        let mut fixture = Fixture::new(None);
        fixture.bridge.update();

        fixture.publish_chassis(1.0, 0.0, 0.0);
        fixture.bridge.update();
    }

    #[test]
    fn test_command_topic_variant_publishes_downstream() {
        let bus = TopicBus::new();
        let _bridge = HostCommandBridge::with_command_topic(
            &bus,
            HostCommandConfig::default(),
            "robot_command",
        )
        .unwrap();

        let mut subscriber = bus.topic::<RobotCommand>("robot_command").unwrap().subscribe();

        bus.topic::<ChassisTarget>("host_chassis_data")
            .unwrap()
            .publish(ChassisTarget {
                vx: 1.0,
                vy: 0.0,
                w: 0.0,
            });

        let command = subscriber.get().unwrap();
        assert!(command.chassis_online);
        assert_eq!(command.source, ControlSource::Host);
    }
}
