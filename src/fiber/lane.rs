//! Lane flags - what happened to a fiber during the current pass.
//!
//! One integer carries both the pending operation (insert/update/remove) and
//! the traversal markers (SVG namespace context, dirty work-unit boundary).

bitflags::bitflags! {
    /// Combinable per-fiber flags.
    ///
    /// At most one of `UPDATE`, `INSERT`, `REMOVE` is meaningful per pass.
    /// `SVG` and `DIRTY` compose with any of them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Lane: u8 {
        const NONE = 0;
        /// Reused in place; props may have changed.
        const UPDATE = 1 << 1;
        /// Freshly created, or reused but moved.
        const INSERT = 1 << 2;
        /// Unlinked into the detach chain.
        const REMOVE = 1 << 3;
        /// Host node lives in the SVG namespace.
        const SVG = 1 << 4;
        /// Root of a queued or in-flight work unit.
        const DIRTY = 1 << 5;

        /// The operation bits.
        const OPS = Self::UPDATE.bits() | Self::INSERT.bits() | Self::REMOVE.bits();
        /// The marker bits.
        const MARKERS = Self::SVG.bits() | Self::DIRTY.bits();
    }
}

impl Lane {
    /// Only the operation part of the lane.
    #[inline]
    pub fn op(self) -> Lane {
        self & Lane::OPS
    }

    /// Replace the operation, keeping markers.
    #[inline]
    pub fn with_op(self, op: Lane) -> Lane {
        (self & Lane::MARKERS) | (op & Lane::OPS)
    }

    #[inline]
    pub fn is_dirty(self) -> bool {
        self.contains(Lane::DIRTY)
    }

    #[inline]
    pub fn is_svg(self) -> bool {
        self.contains(Lane::SVG)
    }
}
