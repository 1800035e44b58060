//! Point views over the arena and the slot-indexed [`Workspace`].

/// Role of a buffer within the annealing chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// State of the Markov chain.
    Current,
    /// Scratch candidate written by move generation and local search.
    Proposed,
    /// Best point seen so far.
    Best,
}

impl Slot {
    const fn role(self) -> usize {
        match self {
            Slot::Current => 0,
            Slot::Proposed => 1,
            Slot::Best => 2,
        }
    }
}

/// Read-only view of one point: objective value plus coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Point<'a> {
    pub func: f64,
    pub x: &'a [f32],
}

/// Mutable view of one point.
#[derive(Debug)]
pub struct PointMut<'a> {
    pub func: &'a mut f64,
    pub x: &'a mut [f32],
}

/// Three same-length points (current, proposed, best) over one arena.
///
/// Each role maps to one of three physical buffers. Swapping two roles
/// exchanges the mapping only, so it costs O(1) regardless of dimension.
/// Function values travel with their buffer.
pub struct Workspace<'a> {
    data: &'a mut [f32],
    dim: usize,
    stride: usize,
    /// Physical buffer index for each role.
    buffer: [usize; 3],
    /// Function value per physical buffer.
    func: [f64; 3],
}

impl<'a> Workspace<'a> {
    pub(crate) fn new(data: &'a mut [f32], dim: usize, stride: usize) -> Self {
        debug_assert!(stride >= dim);
        debug_assert!(data.len() >= 3 * stride);
        Self {
            data,
            dim,
            stride,
            buffer: [0, 1, 2],
            func: [f64::NAN; 3],
        }
    }

    /// Dimension of every point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn range(&self, slot: Slot) -> std::ops::Range<usize> {
        let start = self.buffer[slot.role()] * self.stride;
        start..start + self.dim
    }

    /// Returns the view of `slot`.
    pub fn point(&self, slot: Slot) -> Point<'_> {
        Point {
            func: self.func(slot),
            x: &self.data[self.range(slot)],
        }
    }

    /// Returns the mutable view of `slot`.
    pub fn point_mut(&mut self, slot: Slot) -> PointMut<'_> {
        let index = self.buffer[slot.role()];
        let range = self.range(slot);
        PointMut {
            func: &mut self.func[index],
            x: &mut self.data[range],
        }
    }

    pub fn current(&self) -> Point<'_> {
        self.point(Slot::Current)
    }

    pub fn proposed(&self) -> Point<'_> {
        self.point(Slot::Proposed)
    }

    pub fn best(&self) -> Point<'_> {
        self.point(Slot::Best)
    }

    /// Objective value stored for `slot`.
    pub fn func(&self, slot: Slot) -> f64 {
        self.func[self.buffer[slot.role()]]
    }

    pub fn set_func(&mut self, slot: Slot, func: f64) {
        self.func[self.buffer[slot.role()]] = func;
    }

    /// Coordinates of `slot`, mutable.
    pub fn x_mut(&mut self, slot: Slot) -> &mut [f32] {
        let range = self.range(slot);
        &mut self.data[range]
    }

    /// Borrows `src` immutably and `dst` mutably at the same time.
    ///
    /// # Panics
    ///
    /// Panics if both slots refer to the same buffer.
    pub fn split(&mut self, src: Slot, dst: Slot) -> (&[f32], &mut [f32]) {
        let (s, d) = (self.buffer[src.role()], self.buffer[dst.role()]);
        assert_ne!(s, d, "split requires two distinct buffers");
        let dim = self.dim;
        if s < d {
            let (lo, hi) = self.data.split_at_mut(d * self.stride);
            (&lo[s * self.stride..][..dim], &mut hi[..dim])
        } else {
            let (lo, hi) = self.data.split_at_mut(s * self.stride);
            (&hi[..dim], &mut lo[d * self.stride..][..dim])
        }
    }

    /// Exchanges the buffers behind two roles in O(1).
    pub fn swap(&mut self, a: Slot, b: Slot) {
        self.buffer.swap(a.role(), b.role());
    }

    /// `dst := src`: copies the function value and the coordinates.
    ///
    /// A no-op when both roles share a buffer.
    pub fn assign(&mut self, dst: Slot, src: Slot) {
        let (s, d) = (self.buffer[src.role()], self.buffer[dst.role()]);
        if s == d {
            return;
        }
        self.func[d] = self.func[s];
        self.data
            .copy_within(s * self.stride..s * self.stride + self.dim, d * self.stride);
    }

    /// Copies `x` into the coordinates of `slot`.
    pub fn copy_from(&mut self, slot: Slot, x: &[f32]) {
        debug_assert_eq!(x.len(), self.dim, "incompatible dimensions");
        self.x_mut(slot).copy_from_slice(x);
    }
}

impl std::fmt::Debug for Workspace<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("dim", &self.dim)
            .field("current", &self.current())
            .field("proposed", &self.proposed())
            .field("best", &self.best())
            .finish()
    }
}
