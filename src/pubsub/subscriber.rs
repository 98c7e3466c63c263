use std::sync::Arc;
use super::topic::Topic;
use super::message::Message;

//destructive reader: each message is handed to exactly one subscriber
pub struct Subscriber<T: Message>{
    topic: Arc<Topic<T>>,
}

impl<T: Message> Subscriber<T>{
    pub fn new(topic: Arc<Topic<T>>) -> Self{
        Subscriber{ topic }
    }

    pub fn try_recv(&mut self) -> Option<T>{
        self.topic.try_receive()
    }
}
