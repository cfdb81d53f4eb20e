use crate::geom::Point;
use crate::item::ItemId;

/// Interaction events produced by input dispatch through a layout tree.
/// The first widget (topmost in z-order) to consume a pointer event emits
/// one of these; there are no hidden subscriber lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Pointer passed over a highlightable item this tick.
    Highlighted { item: ItemId },
    /// A click landed on a clickable item.
    Clicked { item: ItemId, position: Point },
    /// A drag moved a draggable item by `delta`.
    Dragged { item: ItemId, delta: Point },
    /// A drop landed on a draggable item.
    Dropped { item: ItemId, position: Point },
}

/// Ordered event queue drained by the owner once per tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<UiEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn some_id() -> ItemId {
        let mut arena: SlotMap<ItemId, ()> = SlotMap::with_key();
        arena.insert(())
    }

    #[test]
    fn drain_returns_in_order_and_empties() {
        let item = some_id();
        let mut queue = EventQueue::new();
        queue.push(UiEvent::Highlighted { item });
        queue.push(UiEvent::Clicked {
            item,
            position: Point::new(3, 4),
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], UiEvent::Highlighted { .. }));
        assert!(matches!(drained[1], UiEvent::Clicked { .. }));
        assert!(queue.is_empty());
    }
}
