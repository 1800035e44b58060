//! Allocation-free storage for the annealing chain.
//!
//! A [`Buffers`] arena owns one aligned block carved into three
//! cache-line aligned buffers. [`Buffers::workspace`] lends them out as a
//! [`Workspace`] of three points (current, proposed, best) addressed by
//! [`Slot`]. Accepting a full move swaps two slots in O(1). Arenas can be
//! owned by the caller and passed to the runner explicitly, or reused
//! per thread through [`with_thread_local`].

mod buffers;
mod point;
mod pool;

pub use buffers::{Buffers, CACHE_LINE_ELEMS, CACHE_LINE_SIZE};
pub use point::{Point, PointMut, Slot, Workspace};
pub use pool::with_thread_local;
