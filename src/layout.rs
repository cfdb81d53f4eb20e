use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::draw::{DrawList, OutlineCommand, QuadCommand, SurfaceCommand, TextCommand};
use crate::events::{EventQueue, UiEvent};
use crate::geom::{
    HorizontalAlignment, Point, Rect, Size, StackAlignment, VerticalAlignment, aligned_rect,
};
use crate::input::InputQueue;
use crate::item::{ItemId, ItemKind, ItemNode, LayoutKind, Widget};
use crate::style::StyleSheet;

/// Arena-backed retained layout tree.
///
/// All placement rules live here, keyed off each container's
/// [`LayoutKind`]. Rects are derived on demand from item state and never
/// cached across a mutation. Positions are stored in screen coordinates;
/// moving an item translates its whole subtree.
pub struct LayoutTree {
    arena: SlotMap<ItemId, ItemNode>,
}

enum Placement {
    /// One-time stamp: add the layout's rect location at insertion.
    Stamp(Point),
    /// Snap to one of the 9 anchor points of the layout rect.
    Anchor,
    /// Position derives from the running stack edge; set during relayout.
    Stacked,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
        }
    }

    /// Insert an item with no parent. Roots keep the position they are given.
    pub fn insert_root(&mut self, node: ItemNode) -> ItemId {
        self.arena.insert(node)
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemNode> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.arena.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // ------------------------------------------------------------------
    // Rect derivation
    // ------------------------------------------------------------------

    /// Resolved rect. Leaves, relative layouts, and scroll viewports derive
    /// from their own position/size/scale/alignment; absolute and stack
    /// layouts are the union of their children, or a zero-size rect at the
    /// anchor when empty.
    pub fn rect(&self, id: ItemId) -> Rect {
        let Some(node) = self.arena.get(id) else {
            return Rect::default();
        };
        match &node.kind {
            ItemKind::Layout(LayoutKind::Absolute) | ItemKind::Layout(LayoutKind::Stack { .. }) => {
                self.children_union(node)
            }
            _ => aligned_rect(
                node.position,
                node.size,
                node.scale,
                node.horizontal,
                node.vertical,
            ),
        }
    }

    fn children_union(&self, node: &ItemNode) -> Rect {
        let mut iter = node.children.iter();
        let Some(first) = iter.next() else {
            return Rect::at(node.position);
        };
        let mut acc = self.rect(*first);
        for c in iter {
            acc = acc.union(&self.rect(*c));
        }
        acc
    }

    /// Rect used for translation bookkeeping when position/size/alignment
    /// change: like `rect`, but union-derived layouts use their current
    /// union size anchored at their own position.
    fn anchor_rect(&self, id: ItemId) -> Rect {
        let Some(node) = self.arena.get(id) else {
            return Rect::default();
        };
        let size = match &node.kind {
            ItemKind::Layout(LayoutKind::Absolute) | ItemKind::Layout(LayoutKind::Stack { .. }) => {
                self.children_union(node).size()
            }
            _ => node.size,
        };
        aligned_rect(node.position, size, node.scale, node.horizontal, node.vertical)
    }

    /// Union of the scroll layout's own rect and every child's rect.
    /// Defined for every container, but only scroll layouts consult it.
    pub fn total_rect(&self, id: ItemId) -> Rect {
        let base = self.rect(id);
        let Some(node) = self.arena.get(id) else {
            return base;
        };
        node.children
            .iter()
            .fold(base, |acc, c| acc.union(&self.rect(*c)))
    }

    // ------------------------------------------------------------------
    // Insertion / removal
    // ------------------------------------------------------------------

    /// Add a child, placed according to the parent's rule, appended to the
    /// ordered list and stably re-sorted by layer.
    pub fn add_item(&mut self, parent: ItemId, node: ItemNode) -> ItemId {
        self.attach(parent, node, None)
    }

    /// Insert a child at `index` among the parent's children. Stack layouts
    /// re-run the whole placement sequence afterwards.
    pub fn insert_item(&mut self, parent: ItemId, index: usize, node: ItemNode) -> ItemId {
        self.attach(parent, node, Some(index))
    }

    /// Insert a child immediately before an existing sibling. Returns `None`
    /// if `sibling` is not a child of `parent`.
    pub fn insert_item_before(
        &mut self,
        parent: ItemId,
        sibling: ItemId,
        node: ItemNode,
    ) -> Option<ItemId> {
        let index = self
            .arena
            .get(parent)?
            .children
            .iter()
            .position(|c| *c == sibling)?;
        Some(self.attach(parent, node, Some(index)))
    }

    fn attach(&mut self, parent: ItemId, mut node: ItemNode, index: Option<usize>) -> ItemId {
        let placement = match self.arena.get(parent).map(|p| &p.kind) {
            Some(ItemKind::Layout(LayoutKind::Absolute))
            | Some(ItemKind::Layout(LayoutKind::Scroll(_))) => {
                Placement::Stamp(self.rect(parent).location())
            }
            Some(ItemKind::Layout(LayoutKind::Relative)) => Placement::Anchor,
            Some(ItemKind::Layout(LayoutKind::Stack { .. })) => Placement::Stacked,
            Some(ItemKind::Widget(_)) | None => {
                log::warn!("add_item: parent is not a layout, stamping at its rect");
                Placement::Stamp(self.rect(parent).location())
            }
        };

        node.parent = Some(parent);
        let id = self.arena.insert(node);
        if let Some(pn) = self.arena.get_mut(parent) {
            let at = index.unwrap_or(pn.children.len()).min(pn.children.len());
            pn.children.insert(at, id);
        }

        match placement {
            Placement::Stamp(location) => self.translate_subtree(id, location),
            Placement::Anchor => self.anchor_child(parent, id),
            Placement::Stacked => {}
        }

        self.sort_children_by_layer(parent);
        self.relayout_if_stack(parent);
        self.refresh_if_scroll(parent);
        id
    }

    /// Remove an item and its whole subtree. The parent's placement rule
    /// reconciles the remaining children (a stack re-runs its sequence).
    pub fn remove_item(&mut self, id: ItemId) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let parent = node.parent;

        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);
        if let Some(pid) = parent
            && let Some(pn) = self.arena.get_mut(pid)
        {
            pn.children.retain(|c| *c != id);
        }
        for rid in subtree {
            self.arena.remove(rid);
        }

        if let Some(pid) = parent {
            self.relayout_if_stack(pid);
            self.refresh_if_scroll(pid);
        }
    }

    fn collect_subtree(&self, id: ItemId, out: &mut Vec<ItemId>) {
        out.push(id);
        if let Some(node) = self.arena.get(id) {
            for &c in &node.children {
                self.collect_subtree(c, out);
            }
        }
    }

    fn sort_children_by_layer(&mut self, parent: ItemId) {
        let Some(pn) = self.arena.get(parent) else {
            return;
        };
        let mut children = pn.children.clone();
        children.sort_by_key(|c| self.arena.get(*c).map(|n| n.layer).unwrap_or(0));
        if let Some(pn) = self.arena.get_mut(parent) {
            pn.children = children;
        }
    }

    fn relayout_if_stack(&mut self, id: ItemId) {
        if matches!(
            self.arena.get(id).map(|n| &n.kind),
            Some(ItemKind::Layout(LayoutKind::Stack { .. }))
        ) {
            self.relayout_stack(id);
        }
    }

    fn refresh_if_scroll(&mut self, id: ItemId) {
        if self.arena.get(id).and_then(|n| n.scroll_state()).is_some() {
            self.update_min_max_scroll(id);
        }
    }

    // ------------------------------------------------------------------
    // Mutation: position / size / scale / alignment / layer
    // ------------------------------------------------------------------

    fn translate_subtree(&mut self, id: ItemId, delta: Point) {
        if delta == Point::ZERO {
            return;
        }
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.position += delta;
        let children: SmallVec<[ItemId; 4]> = node.children.clone();
        for c in children {
            self.translate_subtree(c, delta);
        }
    }

    /// Move an item's anchor. Children keep their offsets: the whole
    /// subtree translates by the delta. Relative layouts re-anchor instead.
    pub fn set_position(&mut self, id: ItemId, position: Point) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let delta = position - node.position;
        if delta == Point::ZERO {
            return;
        }
        if matches!(node.kind, ItemKind::Layout(LayoutKind::Relative)) {
            if let Some(n) = self.arena.get_mut(id) {
                n.position = position;
            }
            self.re_anchor_children(id);
        } else {
            self.translate_subtree(id, delta);
        }
        self.parent_fixup(id);
    }

    pub fn set_size(&mut self, id: ItemId, size: Size) {
        let before = self.anchor_rect(id);
        {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            if node.size == size {
                return;
            }
            node.size = size;
        }
        self.reconcile_after_resize(id, before);
    }

    pub fn set_scale(&mut self, id: ItemId, scale: f32) {
        let before = self.anchor_rect(id);
        {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            if node.scale == scale {
                return;
            }
            node.scale = scale;
        }
        self.reconcile_after_resize(id, before);
    }

    pub fn set_alignment(&mut self, id: ItemId, h: HorizontalAlignment, v: VerticalAlignment) {
        let before = self.anchor_rect(id);
        {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            if node.horizontal == h && node.vertical == v {
                return;
            }
            node.horizontal = h;
            node.vertical = v;
        }
        self.reconcile_after_resize(id, before);
    }

    /// Capture the previous resolved rect, recompute, and translate children
    /// by the location delta (or re-anchor them for relative layouts).
    fn reconcile_after_resize(&mut self, id: ItemId, before: Rect) {
        let is_relative = matches!(
            self.arena.get(id).map(|n| &n.kind),
            Some(ItemKind::Layout(LayoutKind::Relative))
        );
        if is_relative {
            self.re_anchor_children(id);
        } else {
            let after = self.anchor_rect(id);
            let delta = after.location() - before.location();
            let children: SmallVec<[ItemId; 4]> = self
                .arena
                .get(id)
                .map(|n| n.children.clone())
                .unwrap_or_default();
            for c in children {
                self.translate_subtree(c, delta);
            }
        }
        self.refresh_if_scroll(id);
        self.parent_fixup(id);
    }

    /// Change the draw/update layer and re-sort among siblings.
    pub fn set_layer(&mut self, id: ItemId, layer: i32) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        if node.layer == layer {
            return;
        }
        node.layer = layer;
        if let Some(pid) = node.parent {
            self.sort_children_by_layer(pid);
            self.relayout_if_stack(pid);
        }
    }

    /// Replace a label's text and re-measure it.
    pub fn set_text(&mut self, id: ItemId, text: &str, style: &StyleSheet) {
        let size = style.measure_text(text);
        {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            let ItemKind::Widget(Widget::Label { text: t, .. }) = &mut node.kind else {
                log::warn!("set_text on a non-label item");
                return;
            };
            *t = text.to_string();
            node.size = size;
        }
        self.parent_fixup(id);
    }

    /// An item's extent changed: let the parent's placement rule react.
    fn parent_fixup(&mut self, id: ItemId) {
        let Some(pid) = self.arena.get(id).and_then(|n| n.parent) else {
            return;
        };
        self.relayout_if_stack(pid);
        self.refresh_if_scroll(pid);
    }

    // ------------------------------------------------------------------
    // Relative placement
    // ------------------------------------------------------------------

    fn re_anchor_children(&mut self, id: ItemId) {
        let children: SmallVec<[ItemId; 4]> = self
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for c in children {
            self.anchor_child(id, c);
        }
        self.refresh_if_scroll(id);
    }

    /// Snap a child's anchor to one of the 9 points of the layout rect,
    /// chosen by the child's own alignment flags.
    fn anchor_child(&mut self, parent: ItemId, child: ItemId) {
        let r = self.rect(parent);
        let Some(node) = self.arena.get(child) else {
            return;
        };
        let x = match node.horizontal {
            HorizontalAlignment::Left => r.left(),
            HorizontalAlignment::Center => r.center().x,
            HorizontalAlignment::Right => r.right(),
        };
        let y = match node.vertical {
            VerticalAlignment::Top => r.top(),
            VerticalAlignment::Center => r.center().y,
            VerticalAlignment::Bottom => r.bottom(),
        };
        let delta = Point::new(x, y) - node.position;
        self.translate_subtree(child, delta);
    }

    // ------------------------------------------------------------------
    // Stack placement
    // ------------------------------------------------------------------

    /// Re-run the full placement sequence for a stack's children. Every
    /// item's position derives from its predecessor's resulting edge, so
    /// removal and mid-stream insertion are never a simple splice.
    fn relayout_stack(&mut self, id: ItemId) {
        let (alignment, origin, children) = {
            let Some(node) = self.arena.get(id) else {
                return;
            };
            let ItemKind::Layout(LayoutKind::Stack { alignment }) = node.kind else {
                return;
            };
            (alignment, node.position, node.children.clone())
        };

        let mut cursor = match alignment {
            StackAlignment::Top | StackAlignment::Bottom => origin.y,
            StackAlignment::Left | StackAlignment::Right => origin.x,
        };
        for c in children {
            let r = self.rect(c);
            let delta = match alignment {
                StackAlignment::Top => Point::new(origin.x - r.x, cursor - r.y),
                StackAlignment::Bottom => Point::new(origin.x - r.x, cursor - r.height - r.y),
                StackAlignment::Left => Point::new(cursor - r.x, origin.y - r.y),
                StackAlignment::Right => Point::new(cursor - r.width - r.x, origin.y - r.y),
            };
            self.translate_subtree(c, delta);
            cursor = match alignment {
                StackAlignment::Top => cursor + r.height,
                StackAlignment::Bottom => cursor - r.height,
                StackAlignment::Left => cursor + r.width,
                StackAlignment::Right => cursor - r.width,
            };
        }
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    pub fn scroll_offset(&self, id: ItemId) -> Point {
        self.arena
            .get(id)
            .and_then(|n| n.scroll_state())
            .map(|s| s.offset)
            .unwrap_or(Point::ZERO)
    }

    pub fn min_scroll(&self, id: ItemId) -> Point {
        self.arena
            .get(id)
            .and_then(|n| n.scroll_state())
            .map(|s| s.min_scroll)
            .unwrap_or(Point::ZERO)
    }

    pub fn max_scroll(&self, id: ItemId) -> Point {
        self.arena
            .get(id)
            .and_then(|n| n.scroll_state())
            .map(|s| s.max_scroll)
            .unwrap_or(Point::ZERO)
    }

    /// Recompute scroll bounds from the current total rect. The current
    /// offset is folded in so the bounds stay expressed in the same frame
    /// regardless of how far the content has already been scrolled.
    pub fn update_min_max_scroll(&mut self, id: ItemId) {
        let t = self.total_rect(id);
        let r = self.rect(id);
        let Some(s) = self.arena.get_mut(id).and_then(|n| n.scroll_state_mut()) else {
            return;
        };
        s.min_scroll = Point::new(
            t.left() - r.left() + s.offset.x,
            t.top() - r.top() + s.offset.y,
        );
        s.max_scroll = Point::new(
            t.right() - r.right() + s.offset.x,
            t.bottom() - r.bottom() + s.offset.y,
        );
    }

    /// Clamp the requested offset to the scroll bounds and translate every
    /// child by the resulting delta.
    pub fn set_scroll(&mut self, id: ItemId, target: Point) {
        self.update_min_max_scroll(id);
        let (clamped, delta, children) = {
            let Some(node) = self.arena.get(id) else {
                return;
            };
            let Some(s) = node.scroll_state() else {
                log::warn!("set_scroll on a non-scroll item");
                return;
            };
            let clamped = target.clamp(s.min_scroll, s.max_scroll);
            (clamped, s.offset - clamped, node.children.clone())
        };
        if delta == Point::ZERO {
            return;
        }
        if let Some(s) = self.arena.get_mut(id).and_then(|n| n.scroll_state_mut()) {
            s.offset = clamped;
        }
        for c in children {
            self.translate_subtree(c, delta);
        }
    }

    pub fn scroll_by(&mut self, id: ItemId, delta: Point) {
        let target = self.scroll_offset(id) + delta;
        self.set_scroll(id, target);
    }

    // ------------------------------------------------------------------
    // Per-tick update
    // ------------------------------------------------------------------

    /// Per-tick pass: clears pointer-over state and commits scroll surface
    /// sizes (flagging a surface rebuild on the tick after a size change).
    pub fn update(&mut self, id: ItemId) {
        let viewport = self.rect(id).size();
        let children: SmallVec<[ItemId; 4]> = {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            node.highlighted = false;
            if let Some(s) = node.scroll_state_mut() {
                s.recreate_surface = viewport != s.surface_size;
                s.surface_size = viewport;
            }
            node.children.clone()
        };
        for c in children {
            self.update(c);
        }
    }

    // ------------------------------------------------------------------
    // Draw
    // ------------------------------------------------------------------

    /// Emit background quads for the subtree. Scroll layouts emit only
    /// their own background here; their children draw through the clipped
    /// surface in [`LayoutTree::draw`].
    pub fn draw_background(&self, id: ItemId, offset: Point, alpha: f32, dl: &mut DrawList) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let rect = self.rect(id).translated(offset);
        if let Some(bg) = node.background {
            dl.quads.push(QuadCommand {
                rect,
                color: faded(bg, alpha),
                texture: None,
            });
        }
        if node.scroll_state().is_some() {
            return;
        }
        for &c in &node.children {
            self.draw_background(c, offset, alpha, dl);
        }
    }

    /// Emit foreground commands for the subtree, in child order. A scroll
    /// layout redirects its children into an offscreen surface command.
    pub fn draw(&self, id: ItemId, offset: Point, alpha: f32, dl: &mut DrawList) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let rect = self.rect(id).translated(offset);
        match &node.kind {
            ItemKind::Widget(Widget::Label {
                text,
                color,
                font_size,
            }) => {
                dl.texts.push(TextCommand {
                    text: text.clone(),
                    position: rect.location(),
                    color: faded(*color, alpha),
                    font_size: *font_size,
                });
            }
            ItemKind::Widget(Widget::Image { texture, color }) => {
                dl.quads.push(QuadCommand {
                    rect,
                    color: faded(*color, alpha),
                    texture: Some(*texture),
                });
            }
            ItemKind::Widget(Widget::Spacer) => {}
            ItemKind::Layout(LayoutKind::Scroll(s)) => {
                let mut inner = DrawList::new();
                for &c in &node.children {
                    self.draw_background(c, Point::ZERO, 1.0, &mut inner);
                }
                for &c in &node.children {
                    self.draw(c, Point::ZERO, 1.0, &mut inner);
                }
                dl.surfaces.push(SurfaceCommand {
                    viewport: rect.size(),
                    origin: self.rect(id).location(),
                    destination: rect.location(),
                    alpha,
                    recreate: s.recreate_surface,
                    list: inner,
                });
            }
            ItemKind::Layout(_) => {
                for &c in &node.children {
                    self.draw(c, offset, alpha, dl);
                }
            }
        }
        if node.highlighted
            && let Some(outline) = node.outline
        {
            dl.outlines.push(OutlineCommand {
                rect,
                color: faded(outline.color, alpha),
                width: outline.width,
            });
        }
    }

    // ------------------------------------------------------------------
    // Input dispatch
    // ------------------------------------------------------------------

    /// Route pending highlight positions through the subtree. Consumed
    /// positions are removed from the queue.
    pub fn check_highlight(&mut self, root: ItemId, input: &mut InputQueue, events: &mut EventQueue) {
        let mut i = 0;
        while i < input.highlights.len() {
            let p = input.highlights[i];
            if self.highlight_at(root, p, events) {
                input.highlights.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn highlight_at(&mut self, id: ItemId, p: Point, events: &mut EventQueue) -> bool {
        if !self.rect(id).contains(p) {
            return false;
        }
        let children: SmallVec<[ItemId; 4]> = self
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        // Later children draw on top, so they get first claim.
        for &c in children.iter().rev() {
            if self.highlight_at(c, p, events) {
                return true;
            }
        }
        let Some(node) = self.arena.get_mut(id) else {
            return false;
        };
        if node.highlightable {
            node.highlighted = true;
            events.push(UiEvent::Highlighted { item: id });
            true
        } else {
            false
        }
    }

    /// Route pending clicks through the subtree, topmost item first.
    pub fn check_click(&mut self, root: ItemId, input: &mut InputQueue, events: &mut EventQueue) {
        let mut i = 0;
        while i < input.clicks.len() {
            let p = input.clicks[i];
            if self.click_at(root, p, events) {
                input.clicks.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn click_at(&mut self, id: ItemId, p: Point, events: &mut EventQueue) -> bool {
        if !self.rect(id).contains(p) {
            return false;
        }
        let children: SmallVec<[ItemId; 4]> = self
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for &c in children.iter().rev() {
            if self.click_at(c, p, events) {
                return true;
            }
        }
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        if node.clickable {
            events.push(UiEvent::Clicked { item: id, position: p });
            true
        } else {
            false
        }
    }

    /// Route pending drags; a drag belongs to the draggable item under its
    /// start position.
    pub fn check_drag(&mut self, root: ItemId, input: &mut InputQueue, events: &mut EventQueue) {
        let mut i = 0;
        while i < input.drags.len() {
            let drag = input.drags[i];
            if self.drag_at(root, drag.start, drag.delta(), events) {
                input.drags.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn drag_at(&mut self, id: ItemId, start: Point, delta: Point, events: &mut EventQueue) -> bool {
        if !self.rect(id).contains(start) {
            return false;
        }
        let children: SmallVec<[ItemId; 4]> = self
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for &c in children.iter().rev() {
            if self.drag_at(c, start, delta, events) {
                return true;
            }
        }
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        if node.draggable {
            events.push(UiEvent::Dragged { item: id, delta });
            true
        } else {
            false
        }
    }

    /// Route pending drops to the draggable item under the drop position.
    pub fn check_drop(&mut self, root: ItemId, input: &mut InputQueue, events: &mut EventQueue) {
        let mut i = 0;
        while i < input.drops.len() {
            let p = input.drops[i];
            if self.drop_at(root, p, events) {
                input.drops.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn drop_at(&mut self, id: ItemId, p: Point, events: &mut EventQueue) -> bool {
        if !self.rect(id).contains(p) {
            return false;
        }
        let children: SmallVec<[ItemId; 4]> = self
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for &c in children.iter().rev() {
            if self.drop_at(c, p, events) {
                return true;
            }
        }
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        if node.draggable {
            events.push(UiEvent::Dropped { item: id, position: p });
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Composite constructors
    // ------------------------------------------------------------------

    /// A button is a relative layout with click semantics and a centered
    /// label — composition instead of an inheritance tower.
    pub fn add_button(&mut self, parent: ItemId, text: &str, style: &StyleSheet) -> ItemId {
        let text_size = style.measure_text(text);
        let size = Size::new(
            text_size.width + style.button_padding.width * 2,
            text_size.height + style.button_padding.height * 2,
        );
        let button = ItemNode::layout(LayoutKind::Relative)
            .with_size(size)
            .with_background(style.button_background_color)
            .with_outline(style.outline_color, style.outline_width)
            .clickable()
            .highlightable();
        let button_id = self.add_item(parent, button);
        let label = ItemNode::label(text, style).centered();
        self.add_item(button_id, label);
        button_id
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

fn faded(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ScrollState;

    fn abs_at(p: Point) -> ItemNode {
        ItemNode::layout(LayoutKind::Absolute).with_position(p)
    }

    fn box_node(w: i32, h: i32) -> ItemNode {
        ItemNode::spacer(Size::new(w, h))
    }

    #[test]
    fn empty_layout_is_zero_size_at_position() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::new(30, 40)));
        assert_eq!(ui.rect(root), Rect::new(30, 40, 0, 0));
    }

    #[test]
    fn absolute_add_stamps_layout_location_once() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::new(100, 50)));
        let child = ui.add_item(root, box_node(10, 10).with_position(Point::new(5, 5)));
        // Child position = given + layout rect location at insertion.
        assert_eq!(ui.rect(child), Rect::new(105, 55, 10, 10));
        // No standing transform: layout rect is now the child union.
        assert_eq!(ui.rect(root), Rect::new(105, 55, 10, 10));
    }

    #[test]
    fn absolute_move_translates_children_by_delta() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let a = ui.add_item(root, box_node(10, 10));
        let b = ui.add_item(root, box_node(10, 10).with_position(Point::new(20, 0)));

        ui.set_position(root, Point::new(7, 9));
        assert_eq!(ui.rect(a).location(), Point::new(7, 9));
        assert_eq!(ui.rect(b).location(), Point::new(27, 9));
        assert_eq!(ui.rect(root), Rect::new(7, 9, 30, 10));
    }

    #[test]
    fn nested_layout_moves_with_ancestor() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let inner = ui.add_item(root, abs_at(Point::new(10, 10)));
        let leaf = ui.add_item(inner, box_node(5, 5));
        assert_eq!(ui.rect(leaf).location(), Point::new(10, 10));

        ui.set_position(root, Point::new(100, 0));
        assert_eq!(ui.rect(leaf).location(), Point::new(110, 10));
    }

    #[test]
    fn relative_layout_anchors_children_to_nine_points() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(
            ItemNode::layout(LayoutKind::Relative)
                .with_position(Point::new(0, 0))
                .with_size(Size::new(100, 60)),
        );
        let centered = ui.add_item(root, box_node(20, 10).centered());
        assert_eq!(ui.rect(centered), Rect::new(40, 25, 20, 10));

        let bottom_right = ui.add_item(
            root,
            box_node(20, 10)
                .with_alignment(HorizontalAlignment::Right, VerticalAlignment::Bottom),
        );
        assert_eq!(ui.rect(bottom_right), Rect::new(80, 50, 20, 10));
    }

    #[test]
    fn relative_resize_re_anchors_all_children() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(
            ItemNode::layout(LayoutKind::Relative).with_size(Size::new(100, 60)),
        );
        let centered = ui.add_item(root, box_node(20, 10).centered());
        ui.set_size(root, Size::new(200, 100));
        assert_eq!(ui.rect(centered), Rect::new(90, 45, 20, 10));
    }

    #[test]
    fn stack_top_grows_downward() {
        let mut ui = LayoutTree::new();
        let stack = ui.insert_root(
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Top,
            })
            .with_position(Point::new(10, 20)),
        );
        let a = ui.add_item(stack, box_node(30, 10));
        let b = ui.add_item(stack, box_node(50, 20));
        let c = ui.add_item(stack, box_node(40, 5));

        assert_eq!(ui.rect(a), Rect::new(10, 20, 30, 10));
        assert_eq!(ui.rect(b), Rect::new(10, 30, 50, 20));
        assert_eq!(ui.rect(c), Rect::new(10, 50, 40, 5));
        // Union: height sums, width maxes.
        assert_eq!(ui.rect(stack), Rect::new(10, 20, 50, 35));
    }

    #[test]
    fn stack_bottom_grows_upward() {
        let mut ui = LayoutTree::new();
        let stack = ui.insert_root(
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Bottom,
            })
            .with_position(Point::new(0, 100)),
        );
        let a = ui.add_item(stack, box_node(30, 10));
        let b = ui.add_item(stack, box_node(30, 20));
        assert_eq!(ui.rect(a), Rect::new(0, 90, 30, 10));
        assert_eq!(ui.rect(b), Rect::new(0, 70, 30, 20));
    }

    #[test]
    fn stack_left_and_right_grow_horizontally() {
        let mut ui = LayoutTree::new();
        let left = ui.insert_root(
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Left,
            })
            .with_position(Point::new(5, 5)),
        );
        let a = ui.add_item(left, box_node(10, 10));
        let b = ui.add_item(left, box_node(20, 10));
        assert_eq!(ui.rect(a).location(), Point::new(5, 5));
        assert_eq!(ui.rect(b).location(), Point::new(15, 5));

        let right = ui.insert_root(
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Right,
            })
            .with_position(Point::new(100, 0)),
        );
        let c = ui.add_item(right, box_node(10, 10));
        let d = ui.add_item(right, box_node(20, 10));
        assert_eq!(ui.rect(c), Rect::new(90, 0, 10, 10));
        assert_eq!(ui.rect(d), Rect::new(70, 0, 20, 10));
    }

    #[test]
    fn stack_remove_re_runs_placement() {
        let mut ui = LayoutTree::new();
        let stack = ui.insert_root(ItemNode::layout(LayoutKind::Stack {
            alignment: StackAlignment::Top,
        }));
        let a = ui.add_item(stack, box_node(30, 10));
        let b = ui.add_item(stack, box_node(30, 20));
        let c = ui.add_item(stack, box_node(30, 5));
        assert_eq!(ui.rect(c).top(), 30);

        ui.remove_item(b);
        // c moves up into b's former slot; not a splice, a full re-run.
        assert_eq!(ui.rect(a).top(), 0);
        assert_eq!(ui.rect(c).top(), 10);
        assert_eq!(ui.rect(stack).height, 15);
    }

    #[test]
    fn stack_insert_before_shifts_later_siblings() {
        let mut ui = LayoutTree::new();
        let stack = ui.insert_root(ItemNode::layout(LayoutKind::Stack {
            alignment: StackAlignment::Top,
        }));
        let a = ui.add_item(stack, box_node(30, 10));
        let b = ui.add_item(stack, box_node(30, 10));
        let inserted = ui
            .insert_item_before(stack, b, box_node(30, 40))
            .expect("sibling exists");

        assert_eq!(ui.rect(a).top(), 0);
        assert_eq!(ui.rect(inserted).top(), 10);
        assert_eq!(ui.rect(b).top(), 50);
        assert_eq!(ui.children(stack), &[a, inserted, b]);
    }

    #[test]
    fn insert_item_before_missing_sibling_returns_none() {
        let mut ui = LayoutTree::new();
        let stack = ui.insert_root(ItemNode::layout(LayoutKind::Stack {
            alignment: StackAlignment::Top,
        }));
        let other = ui.insert_root(abs_at(Point::ZERO));
        assert!(ui.insert_item_before(stack, other, box_node(1, 1)).is_none());
    }

    #[test]
    fn children_sorted_stably_by_layer() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let top = ui.add_item(root, box_node(1, 1).with_layer(5));
        let a = ui.add_item(root, box_node(1, 1).with_layer(1));
        let b = ui.add_item(root, box_node(1, 1).with_layer(1));
        assert_eq!(ui.children(root), &[a, b, top]);
    }

    #[test]
    fn scroll_bounds_track_content() {
        let mut ui = LayoutTree::new();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 50)),
        );
        // Content twice the viewport height.
        ui.add_item(scroll, box_node(100, 100));
        let min = ui.min_scroll(scroll);
        let max = ui.max_scroll(scroll);
        assert_eq!(min, Point::ZERO);
        assert_eq!(max, Point::new(0, 50));

        let t = ui.total_rect(scroll);
        let r = ui.rect(scroll);
        assert_eq!(max.y - min.y, t.height - r.height);
    }

    #[test]
    fn scroll_clamps_and_translates_children() {
        let mut ui = LayoutTree::new();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 50)),
        );
        let content = ui.add_item(scroll, box_node(100, 120));

        ui.set_scroll(scroll, Point::new(0, 9999));
        assert_eq!(ui.scroll_offset(scroll), Point::new(0, 70));
        // Children translated up by the clamped offset.
        assert_eq!(ui.rect(content).top(), -70);

        ui.set_scroll(scroll, Point::new(0, -50));
        assert_eq!(ui.scroll_offset(scroll), Point::ZERO);
        assert_eq!(ui.rect(content).top(), 0);
    }

    #[test]
    fn scroll_bounds_invariant_under_scrolling() {
        let mut ui = LayoutTree::new();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 50)),
        );
        ui.add_item(scroll, box_node(100, 120));

        ui.set_scroll(scroll, Point::new(0, 30));
        ui.update_min_max_scroll(scroll);
        assert_eq!(ui.min_scroll(scroll), Point::ZERO);
        assert_eq!(ui.max_scroll(scroll), Point::new(0, 70));
    }

    #[test]
    fn scroll_add_item_refreshes_bounds() {
        let mut ui = LayoutTree::new();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 50)),
        );
        ui.add_item(scroll, box_node(100, 60));
        assert_eq!(ui.max_scroll(scroll).y, 10);
        ui.add_item(scroll, box_node(100, 200).with_position(Point::new(0, 60)));
        assert_eq!(ui.max_scroll(scroll).y, 210);
    }

    #[test]
    fn click_consumed_by_topmost_only() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let under = ui.add_button(root, "under", &style);
        let over = ui.add_button(root, "over", &style);
        // Put both buttons at the same place; `over` is later, so on top.
        ui.set_position(under, Point::ZERO);
        ui.set_position(over, Point::ZERO);

        let mut input = InputQueue::new();
        input.clicks.push(Point::new(2, 2));
        let mut events = EventQueue::new();
        ui.check_click(root, &mut input, &mut events);

        assert!(input.clicks.is_empty(), "click should be consumed");
        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(
            drained[0],
            UiEvent::Clicked {
                item: over,
                position: Point::new(2, 2)
            }
        );
    }

    #[test]
    fn click_outside_layout_rect_not_forwarded() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let button = ui.add_button(root, "b", &style);
        let far = ui.rect(button).right() + 100;

        let mut input = InputQueue::new();
        input.clicks.push(Point::new(far, 0));
        let mut events = EventQueue::new();
        ui.check_click(root, &mut input, &mut events);

        assert_eq!(input.clicks.len(), 1, "unconsumed events stay queued");
        assert!(events.is_empty());
    }

    #[test]
    fn scroll_viewport_gates_input() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(200, 30)),
        );
        let button = ui.add_button(scroll, "inside", &style);
        ui.set_position(button, Point::new(0, 100)); // below the viewport

        let mut input = InputQueue::new();
        input.clicks.push(Point::new(5, 105));
        let mut events = EventQueue::new();
        ui.check_click(scroll, &mut input, &mut events);
        // The click is inside the button's rect but outside the viewport.
        assert_eq!(input.clicks.len(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn highlight_sets_flag_and_update_clears_it() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let button = ui.add_button(root, "hover", &style);

        let mut input = InputQueue::new();
        input.highlights.push(Point::new(2, 2));
        let mut events = EventQueue::new();
        ui.check_highlight(root, &mut input, &mut events);
        assert!(ui.get(button).expect("button").highlighted);
        assert_eq!(events.len(), 1);

        ui.update(root);
        assert!(!ui.get(button).expect("button").highlighted);
    }

    #[test]
    fn drag_and_drop_route_to_draggable() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let handle = ui.add_item(root, box_node(20, 20).draggable());

        let mut input = InputQueue::new();
        input.drags.push(crate::input::DragEvent {
            start: Point::new(5, 5),
            current: Point::new(25, 15),
        });
        input.drops.push(Point::new(10, 10));
        let mut events = EventQueue::new();
        ui.check_drag(root, &mut input, &mut events);
        ui.check_drop(root, &mut input, &mut events);

        let drained = events.drain();
        assert_eq!(
            drained[0],
            UiEvent::Dragged {
                item: handle,
                delta: Point::new(20, 10)
            }
        );
        assert_eq!(
            drained[1],
            UiEvent::Dropped {
                item: handle,
                position: Point::new(10, 10)
            }
        );
        assert!(input.is_empty());
    }

    #[test]
    fn remove_item_drops_subtree() {
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let inner = ui.add_item(root, abs_at(Point::ZERO));
        let leaf = ui.add_item(inner, box_node(5, 5));

        ui.remove_item(inner);
        assert!(!ui.contains(inner));
        assert!(!ui.contains(leaf));
        assert!(ui.children(root).is_empty());
    }

    #[test]
    fn draw_scroll_redirects_children_into_surface() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 40))
                .with_background(style.background_color),
        );
        ui.add_item(scroll, ItemNode::label("row", &style));

        let mut dl = DrawList::new();
        ui.draw_background(scroll, Point::ZERO, 1.0, &mut dl);
        ui.draw(scroll, Point::ZERO, 1.0, &mut dl);

        // Background quad outside the surface, label inside it.
        assert_eq!(dl.quads.len(), 1);
        assert!(dl.texts.is_empty());
        assert_eq!(dl.surfaces.len(), 1);
        assert_eq!(dl.surfaces[0].viewport, Size::new(100, 40));
        assert_eq!(dl.surfaces[0].list.texts.len(), 1);
    }

    #[test]
    fn surface_recreate_flag_follows_viewport_change() {
        let mut ui = LayoutTree::new();
        let scroll = ui.insert_root(
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_size(Size::new(100, 40)),
        );
        ui.update(scroll);
        let first = ui.get(scroll).and_then(|n| n.scroll_state().copied());
        assert!(first.expect("scroll").recreate_surface, "first commit allocates");

        ui.update(scroll);
        let second = ui.get(scroll).and_then(|n| n.scroll_state().copied());
        assert!(!second.expect("scroll").recreate_surface);

        ui.set_size(scroll, Size::new(100, 80));
        ui.update(scroll);
        let third = ui.get(scroll).and_then(|n| n.scroll_state().copied());
        assert!(third.expect("scroll").recreate_surface);
    }

    #[test]
    fn draw_applies_offset_and_alpha() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let root = ui.insert_root(abs_at(Point::ZERO));
        ui.add_item(root, ItemNode::label("hi", &style));

        let mut dl = DrawList::new();
        ui.draw(root, Point::new(50, 0), 0.5, &mut dl);
        assert_eq!(dl.texts[0].position, Point::new(50, 0));
        assert!((dl.texts[0].color[3] - style.text_color[3] * 0.5).abs() < 1e-6);
    }

    #[test]
    fn button_centers_its_label() {
        let mut ui = LayoutTree::new();
        let style = StyleSheet::default();
        let root = ui.insert_root(abs_at(Point::ZERO));
        let button = ui.add_button(root, "ok", &style);
        let label = ui.children(button)[0];

        let br = ui.rect(button);
        let lr = ui.rect(label);
        assert_eq!(lr.center().x, br.center().x);
        assert_eq!(lr.center().y, br.center().y);
        // Moving the button keeps the label centered.
        ui.set_position(button, Point::new(40, 40));
        let br = ui.rect(button);
        let lr = ui.rect(label);
        assert_eq!(lr.center(), br.center());
    }
}
