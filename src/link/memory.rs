//! In-memory serial port for dry runs and tests.
//!
//! Every handle opened by a `MemoryOpener` shares one state block, so the
//! opener can be cloned and kept around to inspect what was written after
//! the link has taken ownership of the port.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ConnectionConfig, Port, PortOpener};

#[derive(Default)]
struct MemoryState{
    written: Vec<u8>,
    write_calls: usize,
    opens: usize,
    rx: VecDeque<u8>,
    refuse_open: Option<String>,
    fail_io: Option<io::ErrorKind>,
    last_config: Option<ConnectionConfig>,
}

#[derive(Clone, Default)]
pub struct MemoryOpener{
    shared: Arc<Mutex<MemoryState>>,
}

impl MemoryOpener{
    pub fn new() -> Self{
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState>{
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn written(&self) -> Vec<u8>{
        self.state().written.clone()
    }

    pub fn written_lines(&self) -> Vec<String>{
        String::from_utf8_lossy(&self.state().written)
            .split_inclusive('\n')
            .map(str::to_string)
            .collect()
    }

    /// Number of write operations that reached a port.
    pub fn write_calls(&self) -> usize{
        self.state().write_calls
    }

    pub fn open_count(&self) -> usize{
        self.state().opens
    }

    pub fn last_config(&self) -> Option<ConnectionConfig>{
        self.state().last_config.clone()
    }

    /// Queue bytes for the next reads, as if the device had sent them.
    pub fn push_rx(&self, bytes: &[u8]){
        self.state().rx.extend(bytes.iter().copied());
    }

    /// Make subsequent opens fail with `message` (`None` restores success).
    pub fn refuse_open(&self, message: Option<&str>){
        self.state().refuse_open = message.map(str::to_string);
    }

    /// Make the next read or write on an open port fail once.
    pub fn fail_next_io(&self, kind: io::ErrorKind){
        self.state().fail_io = Some(kind);
    }
}

impl PortOpener for MemoryOpener{
    fn open(&mut self, config: &ConnectionConfig) -> Result<Box<dyn Port>, serialport::Error>{
        let mut state = self.state();
        if let Some(msg) = &state.refuse_open{
            return Err(serialport::Error::new(serialport::ErrorKind::NoDevice, msg.as_str()));
        }
        state.opens += 1;
        state.last_config = Some(config.clone());
        Ok(Box::new(MemoryPort{ shared: Arc::clone(&self.shared) }))
    }
}

struct MemoryPort{
    shared: Arc<Mutex<MemoryState>>,
}

impl MemoryPort{
    fn state(&self) -> MutexGuard<'_, MemoryState>{
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for MemoryPort{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>{
        let mut state = self.state();
        if let Some(kind) = state.fail_io.take(){
            return Err(io::Error::new(kind, "injected read failure"));
        }
        if state.rx.is_empty(){
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(state.rx.len());
        for (dst, src) in buf.iter_mut().zip(state.rx.drain(..n)){
            *dst = src;
        }
        Ok(n)
    }
}

impl Write for MemoryPort{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>{
        let mut state = self.state();
        if let Some(kind) = state.fail_io.take(){
            return Err(io::Error::new(kind, "injected write failure"));
        }
        state.written.extend_from_slice(buf);
        state.write_calls += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>{
        Ok(())
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_opened_ports_share_state(){
        let mut opener = MemoryOpener::new();
        let mut port = opener.open(&ConnectionConfig::default()).unwrap();
        port.write_all(b"1 2 3 4 5 6\n").unwrap();
        assert_eq!(opener.written_lines(), vec!["1 2 3 4 5 6\n".to_string()]);
        assert_eq!(opener.open_count(), 1);
        assert_eq!(opener.last_config(), Some(ConnectionConfig::default()));
    }

    #[test]
    fn test_read_times_out_when_empty(){
        let mut opener = MemoryOpener::new();
        let mut port = opener.open(&ConnectionConfig::default()).unwrap();
        let mut buf = [0u8; 8];
        let err = port.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        opener.push_rx(b"ok");
        assert_eq!(port.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ok");
    }

    #[test]
    fn test_refused_open(){
        let mut opener = MemoryOpener::new();
        opener.refuse_open(Some("busy"));
        assert!(opener.open(&ConnectionConfig::default()).is_err());
        assert_eq!(opener.open_count(), 0);
    }
}
