use std::sync::Arc;
use super::topic::Topic;
use super::message::Message;

pub struct Publisher<T: Message>{
    topic: Arc<Topic<T>>,
}

impl<T: Message> Publisher<T>{
    pub fn new(topic: Arc<Topic<T>>) -> Self{
        Publisher{ topic }
    }

    pub fn publish(&self, msg: T) -> u64{
        self.topic.publish(msg)
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_publisher_publish(){
        let topic = Arc::new(Topic::<i32>::new("/test", 8));
        let publisher = Publisher::new(Arc::clone(&topic));
        assert_eq!(publisher.publish(10), 1);
        assert_eq!(publisher.publish(20), 2);
        assert_eq!(topic.try_receive(), Some(10));
        assert_eq!(topic.try_receive(), Some(20));
    }

    #[test]
    fn test_publishers_on_one_topic_share_epochs(){
        let topic = Arc::new(Topic::<i32>::new("/test", 8));
        let a = Publisher::new(Arc::clone(&topic));
        let b = Publisher::new(Arc::clone(&topic));
        assert_eq!(a.publish(1), 1);
        assert_eq!(b.publish(2), 2);
        assert_eq!(a.publish(3), 3);
    }
}
