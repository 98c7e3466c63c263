/**
 * Command sources
 *
 * Two producers drive the controller:
 * - ManualSource: per-axis edits from the operator's controls, plus the
 *   explicit "send" request
 * - MotionSource: complete frames and connectivity changes from the
 *   motion tracker
 *
 * A source borrows the sink it feeds and hands every event over the moment
 * it is produced. Nothing is queued in between, so the sink sees the events
 * of both sources in exactly the order they were emitted.
 */

use crate::actuator::ActuatorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent{
    /// One axis edited on the manual surface.
    Axis{ index: usize, value: i32 },
    /// Operator pressed "send".
    SendRequested,
    /// Full vector from the motion tracker.
    Frame(Vec<i32>),
    /// Motion tracker connected / disconnected.
    MotionConnected(bool),
}

/// Whatever consumes command events. The controller is the production sink.
pub trait CommandSink{
    /// Apply one event before returning. Only axis edits and frames can be
    /// rejected; the sink is expected to have recorded the rejection.
    fn dispatch(&mut self, event: CommandEvent) -> Result<(), ActuatorError>;
}

pub struct ManualSource<'a, S: CommandSink + ?Sized>{
    sink: &'a mut S,
}

impl<'a, S: CommandSink + ?Sized> ManualSource<'a, S>{
    pub fn new(sink: &'a mut S) -> Self{
        ManualSource{ sink }
    }

    /// Edit a single axis. Does not transmit anything by itself.
    pub fn update(&mut self, index: usize, value: i32) -> Result<(), ActuatorError>{
        self.sink.dispatch(CommandEvent::Axis{ index, value })
    }

    //the outcome of a send shows up in the sink's log and status
    pub fn request_send(&mut self){
        let _ = self.sink.dispatch(CommandEvent::SendRequested);
    }
}

pub struct MotionSource<'a, S: CommandSink + ?Sized>{
    sink: &'a mut S,
}

impl<'a, S: CommandSink + ?Sized> MotionSource<'a, S>{
    pub fn new(sink: &'a mut S) -> Self{
        MotionSource{ sink }
    }

    /// Deliver one tracker frame; arity is checked by the sink.
    pub fn frame(&mut self, values: &[i32]) -> Result<(), ActuatorError>{
        self.sink.dispatch(CommandEvent::Frame(values.to_vec()))
    }

    pub fn set_connected(&mut self, connected: bool){
        let _ = self.sink.dispatch(CommandEvent::MotionConnected(connected));
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[derive(Default)]
    struct Recorder{
        events: Vec<CommandEvent>,
    }

    impl CommandSink for Recorder{
        fn dispatch(&mut self, event: CommandEvent) -> Result<(), ActuatorError>{
            let result = match &event{
                CommandEvent::Axis{ index, .. } if *index >= 6 =>
                    Err(ActuatorError::IndexOutOfRange{ index: *index, len: 6 }),
                _ => Ok(()),
            };
            self.events.push(event);
            result
        }
    }

    #[test]
    fn test_sources_feed_one_ordered_stream(){
        let mut sink = Recorder::default();

        ManualSource::new(&mut sink).update(0, 10).unwrap();
        MotionSource::new(&mut sink).frame(&[1, 2, 3, 4, 5, 6]).unwrap();
        ManualSource::new(&mut sink).request_send();
        MotionSource::new(&mut sink).set_connected(true);

        assert_eq!(sink.events, vec![
            CommandEvent::Axis{ index: 0, value: 10 },
            CommandEvent::Frame(vec![1, 2, 3, 4, 5, 6]),
            CommandEvent::SendRequested,
            CommandEvent::MotionConnected(true),
        ]);
    }

    #[test]
    fn test_every_event_reaches_the_sink_before_returning(){
        let mut sink = Recorder::default();
        let mut manual = ManualSource::new(&mut sink);
        for v in 0..200{
            manual.update((v % 6) as usize, v).unwrap();
        }
        manual.request_send();
        assert_eq!(sink.events.len(), 201);
        assert_eq!(sink.events[199], CommandEvent::Axis{ index: 1, value: 199 });
        assert_eq!(sink.events[200], CommandEvent::SendRequested);
    }

    #[test]
    fn test_sink_rejection_is_returned_to_the_caller(){
        let mut sink = Recorder::default();
        let err = ManualSource::new(&mut sink).update(6, 1).unwrap_err();
        assert_eq!(err, ActuatorError::IndexOutOfRange{ index: 6, len: 6 });
        assert_eq!(sink.events.len(), 1);
    }
}
