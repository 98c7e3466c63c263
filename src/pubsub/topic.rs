use std::sync::{Mutex, MutexGuard, PoisonError};
use crate::ring_buffer::RingBuffer;
use super::message::Message;

//named, shared event stream backed by a growing ring buffer
//capacity is only the initial slot count; nothing published is ever discarded
pub struct Topic<T: Message>{
    name: String,
    buffer: Mutex<RingBuffer<T>>,
}

impl<T: Message> Topic<T>{
    pub fn new(name: &str, capacity: usize) -> Self{
        Topic{
            name: name.to_string(),
            buffer: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    //a panicking publisher must not wedge the bus for everyone else
    fn lock(&self) -> MutexGuard<'_, RingBuffer<T>>{
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, msg: T) -> u64{
        let epoch = self.lock().push(msg);
        tracing::trace!(topic = %self.name, epoch, "published");
        epoch
    }

    pub fn try_receive(&self) -> Option<T>{
        self.lock().pop()
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Frame{
        values: [i32; 6],
    }

    #[test]
    fn test_typed_topic_publish_receive(){
        let topic: Topic<Frame> = Topic::new("/motion/frame", 8);
        let f1 = Frame{ values: [1, 2, 3, 4, 5, 6] };
        let f2 = Frame{ values: [6, 5, 4, 3, 2, 1] };
        assert_eq!(topic.publish(f1.clone()), 1);
        assert_eq!(topic.publish(f2.clone()), 2);
        assert_eq!(topic.try_receive(), Some(f1));
        assert_eq!(topic.try_receive(), Some(f2));
        assert!(topic.try_receive().is_none());
    }

    #[test]
    fn test_topic_keeps_everything_past_initial_capacity(){
        let topic: Topic<i32> = Topic::new("/small", 2);
        for i in 0..100{
            topic.publish(i);
        }
        let received: Vec<i32> = std::iter::from_fn(|| topic.try_receive()).collect();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_topic_shared_through_arc(){
        let topic = Arc::new(Topic::<i32>::new("/shared", 8));
        let other = Arc::clone(&topic);
        topic.publish(100);

        assert_eq!(other.try_receive(), Some(100));
        assert!(topic.try_receive().is_none());
    }
}
