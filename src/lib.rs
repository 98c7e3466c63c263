pub mod ring_buffer;
pub mod pubsub;
pub mod actuator;
pub mod link;
pub mod source;
pub mod event_log;
pub mod controller;
pub mod config;
pub mod ffi;

#[cfg(feature = "python")]
pub mod python;

pub use ring_buffer::RingBuffer;

pub use pubsub::{Message, Topic, Publisher, Subscriber};

pub use actuator::{ActuatorVector, ActuatorError, NUM_ACTUATORS, MIN_ACTUATOR_VALUE, MAX_ACTUATOR_VALUE};
pub use link::{ConnectionConfig, Link, LinkError, LinkEvent, LinkState, MemoryOpener, Port, PortOpener, SerialOpener};
pub use source::{CommandEvent, CommandSink, ManualSource, MotionSource};
pub use event_log::{EventLog, EventLogEntry};
pub use controller::{Controller, Status};
pub use config::{AppConfig, ConfigError, load_config};
