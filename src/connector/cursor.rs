/// Current position within a loaded state sequence
///
/// `index < dataset_size` holds whenever `dataset_size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    dataset_size: usize,
}

impl PlaybackCursor {
    pub fn new(dataset_size: usize) -> Self {
        Self { index: 0, dataset_size }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn dataset_size(&self) -> usize {
        self.dataset_size
    }

    pub fn last_index(&self) -> usize {
        self.dataset_size.saturating_sub(1)
    }

    /// Steps left before the last loaded state
    pub fn remaining(&self) -> usize {
        self.last_index() - self.index
    }

    pub fn is_at_last(&self) -> bool {
        self.index == self.last_index()
    }

    /// Move forward, wrapping past the last state back to the first
    pub fn wrap_forward(&mut self, step: usize) {
        if self.dataset_size == 0 {
            return;
        }
        self.index = (self.index + step % self.dataset_size) % self.dataset_size;
    }

    /// Move backward, wrapping before the first state to the last
    pub fn wrap_backward(&mut self, step: usize) {
        if self.dataset_size == 0 {
            return;
        }
        self.index = (self.index + self.dataset_size - step % self.dataset_size) % self.dataset_size;
    }

    /// Move forward, stopping at the last state
    pub fn clamp_forward(&mut self, step: usize) {
        self.index = self.index.saturating_add(step).min(self.last_index());
    }

    /// Move backward, stopping at the first state
    pub fn clamp_backward(&mut self, step: usize) {
        self.index = self.index.saturating_sub(step);
    }

    /// Record that the sequence grew to `dataset_size` states
    pub fn grow(&mut self, dataset_size: usize) {
        self.dataset_size = self.dataset_size.max(dataset_size);
    }

    pub fn seek_last(&mut self) {
        self.index = self.last_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize, size: usize) -> PlaybackCursor {
        let mut cursor = PlaybackCursor::new(size);
        cursor.clamp_forward(index);
        cursor
    }

    #[test]
    fn test_wrap_forward() {
        let mut cursor = at(3, 5);
        cursor.wrap_forward(4);
        assert_eq!(cursor.index(), 2);

        cursor.wrap_forward(5);
        assert_eq!(cursor.index(), 2);

        cursor.wrap_forward(13);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_wrap_backward() {
        let mut cursor = at(0, 5);
        cursor.wrap_backward(1);
        assert_eq!(cursor.index(), 4);

        // larger than the dataset: plain modulo, never negative
        cursor.wrap_backward(12);
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_clamping() {
        let mut cursor = at(3, 10);
        cursor.clamp_backward(1000);
        assert_eq!(cursor.index(), 0);

        cursor.clamp_forward(usize::MAX);
        assert_eq!(cursor.index(), 9);
        assert!(cursor.is_at_last());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_grow_then_seek_last() {
        let mut cursor = at(8, 10);
        assert_eq!(cursor.remaining(), 1);
        cursor.grow(14);
        cursor.seek_last();
        assert_eq!(cursor.index(), 13);
        assert_eq!(cursor.dataset_size(), 14);
    }

    #[test]
    fn test_empty_cursor_is_inert() {
        let mut cursor = PlaybackCursor::new(0);
        cursor.wrap_forward(3);
        cursor.wrap_backward(3);
        cursor.clamp_forward(3);
        assert_eq!(cursor.index(), 0);
    }
}
