use crate::geom::Point;

/// An in-flight drag: where the pointer went down and where it is now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEvent {
    pub start: Point,
    pub current: Point,
}

impl DragEvent {
    pub fn delta(&self) -> Point {
        self.current - self.start
    }
}

/// Per-tick pending input, one ordered list per event class. The input
/// device collaborator refills these each tick; widgets signal consumption
/// by removing entries, so no two overlapping widgets claim the same event.
#[derive(Debug, Default)]
pub struct InputQueue {
    pub highlights: Vec<Point>,
    pub clicks: Vec<Point>,
    pub drags: Vec<DragEvent>,
    pub drops: Vec<Point>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
            && self.clicks.is_empty()
            && self.drags.is_empty()
            && self.drops.is_empty()
    }

    /// Discard anything left unconsumed at the end of the tick.
    pub fn clear(&mut self) {
        self.highlights.clear();
        self.clicks.clear();
        self.drags.clear();
        self.drops.clear();
    }
}
