//! Per-thread reuse of workspace arenas.

use super::buffers::Buffers;
use std::cell::RefCell;

thread_local! {
    static BUFFERS: RefCell<Buffers> = const { RefCell::new(Buffers::new()) };
}

/// Runs `f` with this thread's cached [`Buffers`].
///
/// Each thread owns its own arena, so no locking is involved and threads
/// never share an entry. The arena keeps its capacity between calls, which
/// removes the per-run allocation when the dimension does not grow.
///
/// A nested call on the same thread (the outer one still holds the arena)
/// gets a temporary arena instead.
pub fn with_thread_local<T>(f: impl FnOnce(&mut Buffers) -> T) -> T {
    BUFFERS.with(|cell| match cell.try_borrow_mut() {
        Ok(mut buffers) => f(&mut buffers),
        Err(_) => f(&mut Buffers::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_survives_between_calls() {
        let capacity = with_thread_local(|buffers| {
            buffers.resize(64).unwrap();
            buffers.capacity()
        });
        with_thread_local(|buffers| {
            assert_eq!(buffers.capacity(), capacity);
            assert_eq!(buffers.size(), 64);
        });
    }

    #[test]
    fn test_nested_call_gets_separate_arena() {
        with_thread_local(|outer| {
            outer.resize(32).unwrap();
            with_thread_local(|inner| {
                assert_eq!(inner.size(), 0);
                inner.resize(8).unwrap();
            });
            assert_eq!(outer.size(), 32);
        });
    }

    #[test]
    fn test_threads_do_not_share() {
        with_thread_local(|buffers| buffers.resize(100).unwrap());
        let other = std::thread::spawn(|| with_thread_local(|buffers| buffers.size()))
            .join()
            .unwrap();
        assert_eq!(other, 0);
    }
}
