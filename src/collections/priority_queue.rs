use std::cmp::Ordering;

/// Binary min-heap ordered by a caller-supplied comparator.
///
/// Items comparing equal are all retained; their relative order is unspecified.
pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    heap: Vec<T>,
    compare: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(compare: F) -> Self {
        Self::with_capacity(0, compare)
    }

    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn add(&mut self, item: T) {
        self.heap.push(item);
        self.float_up(self.heap.len() - 1);
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Removes and returns the minimum item.
    pub fn next(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.float_down(0);
        }
        Some(min)
    }

    fn float_up(&mut self, mut curr: usize) {
        while curr > 0 {
            let parent = (curr - 1) / 2;
            if (self.compare)(&self.heap[curr], &self.heap[parent]) != Ordering::Less {
                break;
            }
            self.heap.swap(curr, parent);
            curr = parent;
        }
    }

    fn float_down(&mut self, mut curr: usize) {
        let size = self.heap.len();
        loop {
            let mut child = curr * 2 + 1;
            if child >= size {
                break;
            }
            if child + 1 < size
                && (self.compare)(&self.heap[child + 1], &self.heap[child]) == Ordering::Less
            {
                child += 1;
            }
            if (self.compare)(&self.heap[curr], &self.heap[child]) != Ordering::Greater {
                break;
            }
            self.heap.swap(curr, child);
            curr = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_value(a: &f64, b: &f64) -> Ordering {
        a.partial_cmp(b).unwrap_or(Ordering::Equal)
    }

    #[test]
    fn test_pops_in_order() {
        let mut pq = PriorityQueue::new(by_value);
        for v in [5.0, 1.0, 4.0, 2.0, 3.0, 0.5, 9.0] {
            pq.add(v);
        }
        assert_eq!(pq.len(), 7);
        assert_eq!(pq.peek(), Some(&0.5));

        let mut out = Vec::new();
        while let Some(v) = pq.next() {
            out.push(v);
        }
        assert_eq!(out, vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
        assert!(pq.is_empty());
        assert!(pq.next().is_none());
        assert!(pq.peek().is_none());
    }

    #[test]
    fn test_keeps_duplicates() {
        let mut pq = PriorityQueue::with_capacity(4, |a: &(f64, u32), b: &(f64, u32)| {
            a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal)
        });
        pq.add((1.0, 1));
        pq.add((1.0, 2));
        pq.add((0.0, 3));

        assert_eq!(pq.next().map(|e| e.1), Some(3));
        let mut rest: Vec<u32> = std::iter::from_fn(|| pq.next()).map(|e| e.1).collect();
        rest.sort();
        assert_eq!(rest, vec![1, 2]);
    }

    #[test]
    fn test_interleaved_add_and_next() {
        let mut pq = PriorityQueue::new(by_value);
        pq.add(3.0);
        pq.add(1.0);
        assert_eq!(pq.next(), Some(1.0));
        pq.add(0.0);
        pq.add(2.0);
        assert_eq!(pq.next(), Some(0.0));
        assert_eq!(pq.next(), Some(2.0));
        assert_eq!(pq.next(), Some(3.0));
        pq.add(7.0);
        pq.clear();
        assert!(pq.is_empty());
    }
}
