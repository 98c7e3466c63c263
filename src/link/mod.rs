pub mod config;
pub mod memory;

pub use config::*;
pub use memory::MemoryOpener;

use std::io::{self, Read, Write};
use std::sync::Arc;
use thiserror::Error;
use crate::pubsub::{Publisher, Topic};

pub const LINK_TOPIC: &str = "/platform/link";

const READ_CHUNK: usize = 256;

/// Byte-level handle to an opened serial device.
pub trait Port: Read + Write + Send{}

impl<T: Read + Write + Send + ?Sized> Port for T{}

/// Creates OS-level handles. Production code uses [`SerialOpener`].
pub trait PortOpener{
    fn open(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Port>, serialport::Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener{
    fn open(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Port>, serialport::Error>{
        let port = serialport::new(&config.port_name, config.baud_rate)
            .data_bits(config.data_bits.into())
            .parity(config.parity.into())
            .stop_bits(config.stop_bits.into())
            .flow_control(config.flow_control.into())
            .timeout(config.timeout())
            .open()?;
        Ok(Box::new(port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo{
    pub name: String,
    pub description: String,
}

/// Serial ports currently visible to the OS.
pub fn available_ports() -> Result<Vec<PortInfo>, serialport::Error>{
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p|{
        let description = match p.port_type{
            serialport::SerialPortType::UsbPort(usb) => {
                let product = usb.product.unwrap_or_default();
                format!("USB {:04x}:{:04x} {}", usb.vid, usb.pid, product).trim_end().to_string()
            }
            serialport::SerialPortType::PciPort => "PCI".to_string(),
            serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            serialport::SerialPortType::Unknown => "Unknown".to_string(),
        };
        PortInfo{ name: p.port_name, description }
    }).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState{
    Closed,
    Open,
}

/// Transitions reported by the link to whoever subscribed to its topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent{
    Connected{ name: String, summary: String },
    ConnectionError(String),
    Disconnected{ name: String },
}

#[derive(Debug, Error)]
pub enum LinkError{
    #[error("precondition violated: link is not open")]
    PreconditionViolation,
    #[error("failed to open {port}: {source}")]
    Open{ port: String, #[source] source: serialport::Error },
    #[error("I/O error on {port}: {source}")]
    Io{ port: String, #[source] source: io::Error },
}

/// The one serial connection to the platform controller.
///
/// Reconfiguration never touches an open handle: `open` always tears the
/// current handle down first and builds a new one from the given config.
pub struct Link<O: PortOpener = SerialOpener>{
    opener: O,
    port: Option<Box<dyn Port>>,
    port_name: String,
    events: Publisher<LinkEvent>,
}

impl<O: PortOpener> Link<O>{
    pub fn new(opener: O, events: Arc<Topic<LinkEvent>>) -> Self{
        Link{
            opener,
            port: None,
            port_name: String::new(),
            events: Publisher::new(events),
        }
    }

    pub fn state(&self) -> LinkState{
        if self.port.is_some(){
            LinkState::Open
        }else{
            LinkState::Closed
        }
    }

    pub fn is_open(&self) -> bool{
        self.state() == LinkState::Open
    }

    pub fn open(&mut self, config: &ConnectionConfig) -> Result<(), LinkError>{
        self.close();

        match self.opener.open(config){
            Ok(port) =>{
                self.port = Some(port);
                self.port_name = config.port_name.clone();
                tracing::info!(port = %config.port_name, params = %config.summary(), "serial link open");
                self.events.publish(LinkEvent::Connected{
                    name: config.port_name.clone(),
                    summary: config.summary(),
                });
                Ok(())
            }
            Err(source) =>{
                tracing::error!(port = %config.port_name, "serial open failed: {}", source);
                self.events.publish(LinkEvent::ConnectionError(source.to_string()));
                Err(LinkError::Open{ port: config.port_name.clone(), source })
            }
        }
    }

    /// Close the handle; no-op (and no event) when already closed.
    pub fn close(&mut self){
        if let Some(port) = self.port.take(){
            drop(port);
            tracing::info!(port = %self.port_name, "serial link closed");
            self.events.publish(LinkEvent::Disconnected{ name: self.port_name.clone() });
        }
    }

    //any I/O failure while open forces the link closed
    fn fail(&mut self, source: io::Error) -> LinkError{
        tracing::error!(port = %self.port_name, "serial I/O error: {}", source);
        let port = self.port_name.clone();
        self.close();
        LinkError::Io{ port, source }
    }

    /// Write the whole buffer. Calling this on a closed link is a
    /// programming error reported as `PreconditionViolation`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>{
        let Some(port) = self.port.as_mut() else{
            tracing::error!("write of {} bytes attempted on closed link", bytes.len());
            return Err(LinkError::PreconditionViolation);
        };

        let result = port.write_all(bytes).and_then(|_| port.flush());
        match result{
            Ok(()) =>{
                tracing::trace!(port = %self.port_name, "TX {:?}", String::from_utf8_lossy(bytes));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Drain whatever the device has sent so far. Read timeouts mean
    /// "nothing more available" and end the drain.
    pub fn read(&mut self) -> Result<Vec<u8>, LinkError>{
        let Some(port) = self.port.as_mut() else{
            tracing::error!("read attempted on closed link");
            return Err(LinkError::PreconditionViolation);
        };

        let mut received = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let outcome = loop{
            match port.read(&mut chunk){
                Ok(0) => break Ok(()),
                Ok(n) =>{
                    received.extend_from_slice(&chunk[..n]);
                    if n < chunk.len(){
                        break Ok(());
                    }
                }
                Err(ref e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => break Ok(()),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        match outcome{
            Ok(()) =>{
                if !received.is_empty(){
                    tracing::trace!(port = %self.port_name, "RX {} bytes", received.len());
                }
                Ok(received)
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::pubsub::Subscriber;

    fn link() -> (Link<MemoryOpener>, MemoryOpener, Subscriber<LinkEvent>){
        let topic = Arc::new(Topic::new(LINK_TOPIC, 16));
        let opener = MemoryOpener::new();
        let link = Link::new(opener.clone(), Arc::clone(&topic));
        (link, opener, Subscriber::new(topic))
    }

    fn drain(sub: &mut Subscriber<LinkEvent>) -> Vec<LinkEvent>{
        std::iter::from_fn(|| sub.try_recv()).collect()
    }

    #[test]
    fn test_open_close_transitions(){
        let (mut link, _opener, mut sub) = link();
        assert_eq!(link.state(), LinkState::Closed);

        link.open(&ConnectionConfig::new("/dev/ttyS1", 9600)).unwrap();
        assert_eq!(link.state(), LinkState::Open);

        link.close();
        link.close();
        assert_eq!(link.state(), LinkState::Closed);

        assert_eq!(drain(&mut sub), vec![
            LinkEvent::Connected{ name: "/dev/ttyS1".into(), summary: "9600, 8, None, 1, None".into() },
            LinkEvent::Disconnected{ name: "/dev/ttyS1".into() },
        ]);
    }

    #[test]
    fn test_write_on_closed_link_is_precondition_violation(){
        let (mut link, opener, _sub) = link();
        let err = link.write(b"0 0 0 0 0 0\n").unwrap_err();
        assert!(matches!(err, LinkError::PreconditionViolation));
        assert_eq!(opener.write_calls(), 0);
    }

    #[test]
    fn test_read_on_closed_link_is_precondition_violation(){
        let (mut link, opener, mut sub) = link();
        opener.push_rx(b"stale");
        assert!(matches!(link.read(), Err(LinkError::PreconditionViolation)));
        assert!(!link.is_open());
        assert!(drain(&mut sub).is_empty());
    }

    #[test]
    fn test_reopen_closes_first(){
        let (mut link, opener, mut sub) = link();
        link.open(&ConnectionConfig::new("A", 9600)).unwrap();
        drain(&mut sub);

        link.open(&ConnectionConfig::new("B", 115200)).unwrap();
        let events = drain(&mut sub);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], LinkEvent::Disconnected{ name: "A".into() });
        assert!(matches!(&events[1], LinkEvent::Connected{ name, .. } if name == "B"));
        assert_eq!(opener.open_count(), 2);
        assert_eq!(opener.last_config().unwrap().baud_rate, 115200);
    }

    #[test]
    fn test_failed_open_stays_closed(){
        let (mut link, opener, mut sub) = link();
        opener.refuse_open(Some("permission denied"));
        let err = link.open(&ConnectionConfig::new("/dev/ttyS9", 9600)).unwrap_err();
        assert!(matches!(err, LinkError::Open{ .. }));
        assert!(!link.is_open());
        assert_eq!(drain(&mut sub), vec![LinkEvent::ConnectionError("permission denied".into())]);
    }

    #[test]
    fn test_write_error_forces_close(){
        let (mut link, opener, mut sub) = link();
        link.open(&ConnectionConfig::new("/dev/ttyS1", 9600)).unwrap();
        drain(&mut sub);

        opener.fail_next_io(io::ErrorKind::BrokenPipe);
        assert!(matches!(link.write(b"1 1 1 1 1 1\n"), Err(LinkError::Io{ .. })));
        assert!(!link.is_open());
        assert_eq!(drain(&mut sub), vec![LinkEvent::Disconnected{ name: "/dev/ttyS1".into() }]);
        assert!(opener.written().is_empty());
    }

    #[test]
    fn test_read_drains_available_bytes(){
        let (mut link, opener, _sub) = link();
        link.open(&ConnectionConfig::default()).unwrap();

        assert!(link.read().unwrap().is_empty());

        let long: Vec<u8> = (0..600).map(|i| b'a' + (i % 26) as u8).collect();
        opener.push_rx(&long);
        assert_eq!(link.read().unwrap(), long);
    }

    #[test]
    fn test_read_error_forces_close(){
        let (mut link, opener, mut sub) = link();
        link.open(&ConnectionConfig::default()).unwrap();
        drain(&mut sub);

        opener.fail_next_io(io::ErrorKind::Other);
        assert!(link.read().is_err());
        assert!(!link.is_open());
        assert_eq!(drain(&mut sub).len(), 1);
    }
}
