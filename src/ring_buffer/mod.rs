//a slot in the ring buffer containing data and the epoch it was written at
struct Slot<T>{
    data: Option<T>,
    epoch: u64,
}

impl<T> Slot<T>{
    fn empty() -> Self{
        Slot{
            data: None,
            epoch: 0,
        }
    }
}

//FIFO with per-slot epochs
//never discards: a full buffer doubles its slot count before the push
pub struct RingBuffer<T>{
    buffer: Vec<Slot<T>>,
    head: usize,
    tail: usize,
    len: usize,
    write_epoch: u64, //epoch of the last push
    capacity: usize,
}

fn empty_slots<T>(capacity: usize) -> Vec<Slot<T>>{
    let mut buffer = Vec::with_capacity(capacity);
    for _ in 0..capacity{
        buffer.push(Slot::empty());
    }
    buffer
}

impl<T> RingBuffer<T>{
    pub fn new(capacity: usize) -> Self{
        assert!(capacity > 0, "ring buffer capacity must be greater than 0");

        RingBuffer{
            buffer: empty_slots(capacity),
            head: 0,
            tail: 0,
            len: 0,
            write_epoch: 0,
            capacity,
        }
    }

    //push item, returns the epoch assigned to it
    pub fn push(&mut self, item: T) -> u64{
        if self.is_full(){
            self.grow();
        }

        self.write_epoch += 1;

        let slot = &mut self.buffer[self.head];
        slot.data = Some(item);
        slot.epoch = self.write_epoch;

        self.head = (self.head + 1) % self.capacity;
        self.len += 1;

        self.write_epoch
    }

    //relinearize from tail into twice the slots; order and epochs are kept
    fn grow(&mut self){
        let new_capacity = self.capacity * 2;
        let mut buffer = empty_slots(new_capacity);
        for (i, slot) in buffer.iter_mut().enumerate().take(self.len){
            let old = &mut self.buffer[(self.tail + i) % self.capacity];
            slot.data = old.data.take();
            slot.epoch = old.epoch;
        }

        self.buffer = buffer;
        self.tail = 0;
        self.head = self.len;
        self.capacity = new_capacity;
    }

    //pop the oldest item
    pub fn pop(&mut self) -> Option<T>{
        self.pop_with_epoch().map(|(item, _)| item)
    }

    //pop the oldest item together with its epoch
    pub fn pop_with_epoch(&mut self) -> Option<(T, u64)>{
        if self.is_empty(){
            return None;
        }

        let slot = &mut self.buffer[self.tail];
        let item = slot.data.take()?;
        let epoch = slot.epoch;

        self.tail = (self.tail + 1) % self.capacity;
        self.len -= 1;

        Some((item, epoch))
    }

    pub fn len(&self) -> usize{
        self.len
    }

    pub fn is_empty(&self) -> bool{
        self.len == 0
    }

    fn is_full(&self) -> bool{
        self.len == self.capacity
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_push_pop_fifo(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(5);

        rb.push(10);
        rb.push(20);
        rb.push(30);

        assert_eq!(rb.pop(), Some(10));
        assert_eq!(rb.pop(), Some(20));
        assert_eq!(rb.pop(), Some(30));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_wraparound(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(3);

        rb.push(1);
        rb.push(2);
        rb.push(3);

        assert_eq!(rb.pop(), Some(1));

        rb.push(4); //reuses slot 0

        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), Some(4));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_full_buffer_grows_instead_of_discarding(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(3);

        rb.push(1);
        rb.push(2);
        rb.push(3);
        assert!(rb.is_full());

        rb.push(4);
        assert_eq!(rb.len(), 4);
        assert!(!rb.is_full());

        assert_eq!(rb.pop_with_epoch(), Some((1, 1)));
        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), Some(4));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_grow_after_wraparound_keeps_order(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(2);

        rb.push(1);
        rb.push(2);
        assert_eq!(rb.pop(), Some(1));
        rb.push(3); //head wrapped to slot 0, tail at slot 1

        for v in 4..70{
            rb.push(v);
        }
        assert_eq!(rb.len(), 68);

        let drained: Vec<(i32, u64)> = std::iter::from_fn(|| rb.pop_with_epoch()).collect();
        let values: Vec<i32> = drained.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, (2..70).collect::<Vec<_>>());
        for pair in drained.windows(2){
            assert_eq!(pair[1].1, pair[0].1 + 1);
        }
    }

    #[test]
    fn test_epochs_are_monotonic(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(2);

        assert_eq!(rb.push(100), 1);
        assert_eq!(rb.push(200), 2);
        rb.pop();
        assert_eq!(rb.push(300), 3);
        assert_eq!(rb.push(400), 4);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_rejected(){
        let _rb: RingBuffer<i32> = RingBuffer::new(0);
    }
}
