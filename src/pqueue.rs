/// A simple priority queue ordered by a key function.
///
/// Pushing only appends; the contents are re-sorted lazily before the next
/// read. Sorting is stable, so elements with equal keys keep their insertion
/// order and [`PQueue::pop`] returns the most recently pushed of them.
pub struct PQueue<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    contents: Vec<T>,
    sort_key: F,
    sorted: bool,
}

impl<T, K, F> PQueue<T, K, F>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    /// Creates an empty queue ordered by `sort_key`.
    pub fn new(sort_key: F) -> Self {
        PQueue {
            contents: Vec::new(),
            sort_key,
            sorted: true,
        }
    }

    fn sort(&mut self) {
        if !self.sorted {
            let key = &self.sort_key;
            self.contents.sort_by_key(|item| key(item));
            self.sorted = true;
        }
    }

    /// Adds an element.
    pub fn push(&mut self, item: T) {
        self.contents.push(item);
        self.sorted = false;
    }

    /// Removes and returns the element with the largest key.
    pub fn pop(&mut self) -> Option<T> {
        self.sort();
        self.contents.pop()
    }

    /// Returns the element at `index` in ascending key order, or the largest
    /// one if `index` is `None`.
    pub fn peek(&mut self, index: Option<usize>) -> Option<&T> {
        self.sort();
        match index {
            Some(i) => self.contents.get(i),
            None => self.contents.last(),
        }
    }

    /// Number of elements in the queue.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns `true` if the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Removes every element, largest key first.
    pub fn drain_sorted(&mut self) -> impl Iterator<Item = T> + '_ {
        self.sort();
        self.contents.drain(..).rev()
    }
}
