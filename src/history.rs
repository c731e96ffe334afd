//! Linear undo/redo history around a single value

use std::collections::VecDeque;

/// Tracks the past and future of one value
///
/// `past` and `future` only move together with `present` through
/// [`set`](HistoryManager::set), [`undo`](HistoryManager::undo) and
/// [`redo`](HistoryManager::redo). Setting a value equal to the present one
/// records nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryManager<T> {
    past: Vec<T>,
    present: T,
    future: VecDeque<T>,
}

impl<T: Clone + PartialEq> HistoryManager<T> {
    pub fn new(initial: T) -> Self {
        Self {
            past: Vec::new(),
            present: initial,
            future: VecDeque::new(),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Oldest first
    pub fn past(&self) -> &[T] {
        &self.past
    }

    /// Next redo first
    pub fn future(&self) -> impl Iterator<Item = &T> {
        self.future.iter()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Replace the present value; returns whether history changed
    pub fn set(&mut self, value: T) -> bool {
        if value == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push(previous);
        self.future.clear();
        true
    }

    /// Step back one entry; returns whether anything moved
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one entry; returns whether anything moved
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    /// Apply `edit` to a copy of the present value and record the result
    pub fn update(&mut self, edit: impl FnOnce(&T) -> T) -> bool {
        let next = edit(&self.present);
        self.set(next)
    }

    pub fn into_present(self) -> T {
        self.present
    }
}

impl<T: Clone + PartialEq + Default> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_same_value_is_not_recorded() {
        let mut history = HistoryManager::new("X");
        assert!(history.set("Y"));
        assert!(!history.set("Y"));
        assert_eq!(history.past(), &["X"]);
        assert_eq!(*history.present(), "Y");
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = HistoryManager::new("X");
        history.set("Y");

        assert!(history.undo());
        assert_eq!(*history.present(), "X");
        assert!(history.can_redo());
        assert!(!history.can_undo());

        assert!(history.redo());
        assert_eq!(*history.present(), "Y");
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_undo_and_redo_on_empty_history_are_noops() {
        let mut history = HistoryManager::new(1);
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.present(), 1);
    }

    #[test]
    fn test_set_after_undo_clears_future() {
        let mut history = HistoryManager::new(1);
        history.set(2);
        history.set(3);
        history.undo();
        history.undo();
        assert_eq!(history.future().copied().collect::<Vec<_>>(), vec![2, 3]);

        history.set(4);
        assert!(!history.can_redo());
        assert_eq!(history.past(), &[1]);
        assert_eq!(*history.present(), 4);
    }

    #[test]
    fn test_update_applies_edit() {
        let mut history = HistoryManager::new(vec![1]);
        assert!(history.update(|v| {
            let mut next = v.clone();
            next.push(2);
            next
        }));
        assert!(!history.update(Clone::clone));
        assert_eq!(history.present(), &vec![1, 2]);
    }
}
