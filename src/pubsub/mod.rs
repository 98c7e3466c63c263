pub mod message;
pub mod topic;
pub mod publisher;
pub mod subscriber;

pub use message::Message;
pub use topic::Topic;
pub use publisher::Publisher;
pub use subscriber::Subscriber;
