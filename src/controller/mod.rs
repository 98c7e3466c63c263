/**
 * Platform Controller
 *
 * Owns the actuator vector, the serial link and the event log:
 * 1. Acts as the sink for the manual and motion sources, applying each
 *    event before the source call returns
 * 2. Merges edits and frames into the actuator vector
 * 3. Writes the vector to the link on an explicit send, or on every
 *    motion frame while motion control is enabled
 * 4. Turns link transitions into status changes and log entries
 *
 * Everything runs on the caller's thread, one event at a time.
 */

use std::sync::Arc;

use crate::actuator::{ActuatorError, ActuatorVector};
use crate::event_log::EventLog;
use crate::link::{ConnectionConfig, Link, LinkEvent, PortOpener, SerialOpener, LINK_TOPIC};
use crate::pubsub::{Subscriber, Topic};
use crate::source::{CommandEvent, CommandSink, ManualSource, MotionSource};

pub const STATUS_DISCONNECTED: &str = "Disconnected";
pub const STATUS_CONNECTED: &str = "Connected";

//initial slot count; link transitions are drained right after each link call
const LINK_TOPIC_CAPACITY: usize = 16;

/// Externally observable state for the surrounding UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status{
    /// Port name while connected, otherwise "Disconnected".
    pub link: String,
    /// "Connected" / "Disconnected" for the motion tracker.
    pub motion: String,
    /// The send action is available only while the link is open.
    pub send_enabled: bool,
    pub motion_enabled: bool,
    pub lines_sent: u64,
}

pub struct Controller<O: PortOpener = SerialOpener>{
    actuators: ActuatorVector,
    link: Link<O>,
    log: EventLog,
    status: Status,
    link_events: Subscriber<LinkEvent>,
}

impl Controller<SerialOpener>{
    pub fn with_serial() -> Self{
        Self::new(SerialOpener)
    }
}

impl<O: PortOpener> Controller<O>{
    /// Each controller gets its own link topic, so its link events are
    /// never visible to another controller.
    pub fn new(opener: O) -> Self{
        let link_topic = Arc::new(Topic::new(LINK_TOPIC, LINK_TOPIC_CAPACITY));

        Controller{
            actuators: ActuatorVector::new(),
            link: Link::new(opener, Arc::clone(&link_topic)),
            log: EventLog::new(),
            status: Status{
                link: STATUS_DISCONNECTED.to_string(),
                motion: STATUS_DISCONNECTED.to_string(),
                send_enabled: false,
                motion_enabled: false,
                lines_sent: 0,
            },
            link_events: Subscriber::new(link_topic),
        }
    }

    pub fn manual_source(&mut self) -> ManualSource<'_, Self>{
        ManualSource::new(self)
    }

    pub fn motion_source(&mut self) -> MotionSource<'_, Self>{
        MotionSource::new(self)
    }

    pub fn actuators(&self) -> &ActuatorVector{
        &self.actuators
    }

    pub fn log(&self) -> &EventLog{
        &self.log
    }

    pub fn status(&self) -> &Status{
        &self.status
    }

    pub fn is_connected(&self) -> bool{
        self.link.is_open()
    }

    fn reject(&mut self, what: &str, err: &ActuatorError){
        tracing::warn!("{} rejected: {}", what, err);
        self.log.append(format!("<CTL>  Rejected {}: {}", what, err));
    }

    /// Manual edit of one axis; never transmits.
    pub fn set_axis(&mut self, index: usize, value: i32) -> Result<(), ActuatorError>{
        let result = self.actuators.set(index, value);
        if let Err(e) = &result{
            self.reject("axis edit", e);
        }
        result
    }

    /// Replace the whole vector. Wrong arity leaves the vector untouched.
    pub fn merge(&mut self, values: &[i32]) -> Result<(), ActuatorError>{
        let result = self.actuators.replace(values);
        if let Err(e) = &result{
            self.reject("frame", e);
        }
        result
    }

    /// Explicit send. Returns whether the line reached the link.
    pub fn send_requested(&mut self) -> bool{
        if !self.link.is_open(){
            tracing::warn!("send requested while link is closed");
            self.log.append("<COM>  Not connected, nothing sent");
            return false;
        }
        self.transmit()
    }

    //caller guarantees the link is open
    fn transmit(&mut self) -> bool{
        let line = self.actuators.serialize();
        let sent = match self.link.write(line.as_bytes()){
            Ok(()) =>{
                self.status.lines_sent += 1;
                tracing::debug!("sent {}", line.trim_end());
                true
            }
            Err(e) =>{
                self.log.append(format!("<COM>  Write error: {}", e));
                false
            }
        };
        self.sync_link_events();
        sent
    }

    /// A motion frame always updates the vector; it is transmitted only
    /// while motion control is enabled and the link is open.
    pub fn on_motion_frame(&mut self, values: &[i32]) -> Result<(), ActuatorError>{
        self.merge(values)?;
        if !self.status.motion_enabled{
            return Ok(());
        }
        if !self.link.is_open(){
            tracing::trace!("motion frame not sent: link closed");
            return Ok(());
        }
        self.transmit();
        Ok(())
    }

    pub fn on_motion_connected(&mut self, connected: bool){
        if connected{
            self.status.motion = STATUS_CONNECTED.to_string();
            self.log.append("<LEAP> Connected");
        }else{
            self.status.motion = STATUS_DISCONNECTED.to_string();
            self.log.append("<LEAP> Disconnected");
        }
        tracing::info!(connected, "motion tracker connectivity changed");
    }

    /// Gate motion frames onto the link. Manual edits keep updating the
    /// vector either way.
    pub fn set_motion_enabled(&mut self, enabled: bool){
        self.status.motion_enabled = enabled;
        tracing::info!(enabled, "motion control toggled");
    }

    /// New connection settings: close whatever is open, then open with
    /// `config`. Failures are logged; no retry is attempted.
    pub fn apply_config(&mut self, config: &ConnectionConfig) -> bool{
        let opened = self.link.open(config).is_ok();
        self.sync_link_events();
        opened
    }

    pub fn disconnect(&mut self){
        self.link.close();
        self.sync_link_events();
    }

    /// I/O readiness: forward whatever the device sent to the log as one
    /// entry. Valid UTF-8 is logged verbatim; anything else is logged with
    /// non-printable bytes escaped (`\xff`).
    /// Returns the number of bytes received.
    pub fn on_readable(&mut self) -> usize{
        if !self.link.is_open(){
            return 0;
        }
        let received = match self.link.read(){
            Ok(bytes) => bytes,
            Err(e) =>{
                self.log.append(format!("<COM>  Read error: {}", e));
                self.sync_link_events();
                return 0;
            }
        };
        if !received.is_empty(){
            let text = match std::str::from_utf8(&received){
                Ok(text) => text.to_string(),
                Err(_) => received.escape_ascii().to_string(),
            };
            tracing::debug!("RX {:?}", text);
            self.log.append(text);
        }
        received.len()
    }

    pub fn shutdown(&mut self){
        self.disconnect();
    }

    fn sync_link_events(&mut self){
        while let Some(event) = self.link_events.try_recv(){
            match event{
                LinkEvent::Connected{ name, summary } =>{
                    self.log.append(format!("<COM>  Connected to {} : {}", name, summary));
                    self.status.link = name;
                    self.status.send_enabled = true;
                }
                LinkEvent::ConnectionError(msg) =>{
                    self.log.append(format!("<COM>  Connection error: {}", msg));
                }
                LinkEvent::Disconnected{ name } =>{
                    self.log.append(format!("<COM>  Disconnected from {}", name));
                    self.status.link = STATUS_DISCONNECTED.to_string();
                    self.status.send_enabled = false;
                }
            }
        }
    }
}

impl<O: PortOpener> CommandSink for Controller<O>{
    fn dispatch(&mut self, event: CommandEvent) -> Result<(), ActuatorError>{
        match event{
            CommandEvent::Axis{ index, value } => self.set_axis(index, value),
            CommandEvent::SendRequested =>{
                self.send_requested();
                Ok(())
            }
            CommandEvent::Frame(values) => self.on_motion_frame(&values),
            CommandEvent::MotionConnected(connected) =>{
                self.on_motion_connected(connected);
                Ok(())
            }
        }
    }
}
