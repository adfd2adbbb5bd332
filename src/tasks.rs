use log::trace;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

struct Scheduled<T> {
    due: Instant,
    seq: u64,
    generation: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Deferred work keyed by a generation counter.
///
/// Every task carries the generation current when it was scheduled.
/// `invalidate` bumps the generation, after which older tasks are dropped
/// unrun when they come due.
pub struct TaskQueue<T> {
    heap: BinaryHeap<Reverse<Scheduled<T>>>,
    generation: u64,
    next_seq: u64,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            generation: 0,
            next_seq: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule(&mut self, due: Instant, task: T) {
        self.schedule_in_generation(self.generation, due, task);
    }

    /// Schedule on behalf of a producer that captured `generation` earlier.
    pub fn schedule_in_generation(&mut self, generation: u64, due: Instant, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            due,
            seq,
            generation,
            task,
        }));
    }

    /// Supersede everything scheduled so far.
    pub fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.heap.clear();
        self.generation
    }

    /// Due tasks of the current generation, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|Reverse(head)| head.due <= now) {
            if let Some(Reverse(item)) = self.heap.pop() {
                if item.generation == self.generation {
                    due.push(item.task);
                } else {
                    trace!("Dropping stale task from generation {}", item.generation);
                }
            }
        }
        due
    }

    /// Live tasks still waiting.
    pub fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(s)| s.generation == self.generation)
            .count()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_due_order_with_ties_in_insertion_order() {
        let t0 = Instant::now();
        let mut q = TaskQueue::new();
        q.schedule(t0 + Duration::from_millis(20), "c");
        q.schedule(t0 + Duration::from_millis(10), "a");
        q.schedule(t0 + Duration::from_millis(10), "b");
        q.schedule(t0 + Duration::from_millis(90), "later");
        assert_eq!(q.pop_due(t0 + Duration::from_millis(50)), vec!["a", "b", "c"]);
        assert_eq!(q.pending(), 1);
        assert_eq!(q.pop_due(t0 + Duration::from_millis(90)), vec!["later"]);
    }

    #[test]
    fn test_invalidate_drops_old_generation() {
        let t0 = Instant::now();
        let mut q = TaskQueue::new();
        q.schedule(t0, 1);
        q.invalidate();
        q.schedule(t0, 2);
        assert_eq!(q.pop_due(t0), vec![2]);
    }

    #[test]
    fn test_captured_stale_generation_never_runs() {
        let t0 = Instant::now();
        let mut q = TaskQueue::new();
        let captured = q.generation();
        q.invalidate();
        q.schedule_in_generation(captured, t0, "stale");
        assert_eq!(q.pending(), 0);
        assert!(q.pop_due(t0 + Duration::from_secs(1)).is_empty());
    }
}
