//! Cache-line aligned arena backing the three chain points.

use super::point::Workspace;
use crate::error::AllocationError;
use bytemuck::{Pod, Zeroable};

/// Alignment of every buffer in the arena, in bytes.
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of `f32` elements in one cache line.
pub const CACHE_LINE_ELEMS: usize = CACHE_LINE_SIZE / std::mem::size_of::<f32>();

/// Number of buffers carved out of the arena (current, proposed, best).
pub(crate) const NUM_BUFFERS: usize = 3;

/// One cache line worth of `f32`s. Allocating a `Vec` of these gives
/// 64-byte aligned storage without touching the raw allocator.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(64))]
struct CacheLine([f32; CACHE_LINE_ELEMS]);

/// Rounds `size` (in elements) up to a whole number of cache lines.
fn lines_for(size: usize) -> usize {
    size.div_ceil(CACHE_LINE_ELEMS)
}

/// Owned storage for the three point buffers of a [`Workspace`].
///
/// The arena holds `3 * roundUp(size, CACHE_LINE_ELEMS)` elements. Each
/// buffer starts on a cache-line boundary and the buffers never overlap.
/// Capacity is tracked separately from the logical size: shrinking, or
/// growing within capacity, reuses the allocation. Every resize zeroes
/// the whole arena.
///
/// # Examples
///
/// ```
/// use u_gsa::workspace::Buffers;
///
/// let mut buffers = Buffers::with_size(10).unwrap();
/// let workspace = buffers.workspace();
/// assert_eq!(workspace.dim(), 10);
/// assert!(workspace.current().x.iter().all(|&v| v == 0.0));
/// ```
#[derive(Default)]
pub struct Buffers {
    lines: Vec<CacheLine>,
    size: usize,
}

impl Buffers {
    /// Creates an empty arena. Does not allocate.
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            size: 0,
        }
    }

    /// Creates an arena whose buffers hold `size` elements each.
    pub fn with_size(size: usize) -> Result<Self, AllocationError> {
        let mut buffers = Self::new();
        buffers.resize(size)?;
        Ok(buffers)
    }

    /// Logical number of elements per buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance in elements between the starts of two adjacent buffers.
    pub fn stride(&self) -> usize {
        lines_for(self.size) * CACHE_LINE_ELEMS
    }

    /// Total number of `f32` elements currently allocated.
    pub fn capacity(&self) -> usize {
        self.lines.len() * CACHE_LINE_ELEMS
    }

    /// Sets the logical buffer size to `size` elements.
    ///
    /// Reallocates only when the required capacity exceeds the current
    /// one; the old contents are discarded in that case. The arena is
    /// zeroed afterwards in both cases. On error the arena is unchanged.
    pub fn resize(&mut self, size: usize) -> Result<(), AllocationError> {
        let required = lines_for(size)
            .checked_mul(NUM_BUFFERS)
            .filter(|lines| {
                lines
                    .checked_mul(CACHE_LINE_SIZE)
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(AllocationError::CapacityOverflow { dim: size })?;

        if required > self.lines.len() {
            let mut fresh = Vec::new();
            fresh.try_reserve_exact(required)?;
            fresh.resize(required, CacheLine::zeroed());
            self.lines = fresh;
        } else {
            self.lines.fill(CacheLine::zeroed());
        }
        self.size = size;
        Ok(())
    }

    /// Borrows the arena as a fresh [`Workspace`].
    ///
    /// Slot assignment starts as current = 0, proposed = 1, best = 2 and
    /// all function values are NaN.
    pub fn workspace(&mut self) -> Workspace<'_> {
        let stride = self.stride();
        let used = stride / CACHE_LINE_ELEMS * NUM_BUFFERS;
        let data: &mut [f32] = bytemuck::cast_slice_mut(&mut self.lines[..used]);
        Workspace::new(data, self.size, stride)
    }
}

impl std::fmt::Debug for Buffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffers")
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .finish()
    }
}
