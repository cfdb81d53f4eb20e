use slotmap::{SlotMap, new_key_type};

use crate::geom::{Point, Size, StackAlignment};
use crate::item::{ItemId, ItemNode, LayoutKind, ScrollState, Widget};
use crate::layout::LayoutTree;
use crate::style::StyleSheet;

new_key_type! {
    /// Handle into a tree's data arena, independent of layout item ids.
    pub struct TreeItemId;
}

#[derive(Debug)]
struct TreeNode<T> {
    value: T,
    label: String,
    parent: Option<TreeItemId>,
    children: Vec<TreeItemId>,
    expanded: bool,
}

#[derive(Debug, Clone, Copy)]
struct TreeRow {
    /// Absolute wrapper holding the row inside the stack.
    row: ItemId,
    /// The clickable button for the row.
    button: ItemId,
    item: TreeItemId,
}

/// Expandable tree view: a scroll viewport over a vertical stack of row
/// buttons, one per visible node.
///
/// The data model (nodes, expansion flags, selection) lives here; the
/// visual rows are plain layout items rebuilt wholesale whenever the
/// visible set changes. There is no incremental diff, a rebuild tears
/// down every row and re-adds the visible ones in pre-order. The scroll
/// offset is saved across the rebuild and re-applied clamped, so
/// collapsing a large subtree pulls the view back into range.
///
/// Selection is by value equality, not by node handle: it survives
/// rebuilds and stays put when the selected row is scrolled or collapsed
/// out of view.
pub struct Tree<T> {
    nodes: SlotMap<TreeItemId, TreeNode<T>>,
    roots: Vec<TreeItemId>,
    selected: Option<T>,
    scroll: ItemId,
    stack: ItemId,
    rows: Vec<TreeRow>,
}

impl<T: Clone + PartialEq> Tree<T> {
    /// Create the scroll viewport and row stack under `parent`.
    pub fn new(ui: &mut LayoutTree, parent: ItemId, position: Point, viewport: Size) -> Self {
        let scroll = ui.add_item(
            parent,
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_position(position)
                .with_size(viewport),
        );
        let stack = ui.add_item(
            scroll,
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Top,
            }),
        );
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            selected: None,
            scroll,
            stack,
            rows: Vec::new(),
        }
    }

    pub fn scroll_item(&self) -> ItemId {
        self.scroll
    }

    // ------------------------------------------------------------------
    // Data model
    // ------------------------------------------------------------------

    /// Add a top-level node. New nodes start collapsed; call `rebuild`
    /// once the model is in shape.
    pub fn add_root(&mut self, value: T, label: &str) -> TreeItemId {
        let id = self.nodes.insert(TreeNode {
            value,
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            expanded: false,
        });
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: TreeItemId, value: T, label: &str) -> Option<TreeItemId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(TreeNode {
            value,
            label: label.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            expanded: false,
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Remove a node and its whole subtree from the model. Visuals are
    /// untouched until the next `rebuild`.
    pub fn remove(&mut self, id: TreeItemId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match node.parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(pid) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
    }

    pub fn is_expanded(&self, id: TreeItemId) -> bool {
        self.nodes.get(id).map(|n| n.expanded).unwrap_or(false)
    }

    pub fn set_expanded(&mut self, id: TreeItemId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.expanded = expanded;
        }
    }

    pub fn value(&self, id: TreeItemId) -> Option<&T> {
        self.nodes.get(id).map(|n| &n.value)
    }

    /// Visible nodes with their depth: pre-order traversal that descends
    /// only into expanded nodes.
    pub fn visible(&self) -> Vec<(TreeItemId, usize)> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.push_visible(root, 0, &mut out);
        }
        out
    }

    fn push_visible(&self, id: TreeItemId, depth: usize, out: &mut Vec<(TreeItemId, usize)>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        out.push((id, depth));
        if node.expanded {
            for &c in &node.children {
                self.push_visible(c, depth + 1, out);
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_value(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Select by value: scans for a value-equal payload and stores it, or
    /// clears when `None` or no node matches. Reassigning the current value
    /// is a no-op; the selection is not tied to any visible row.
    pub fn select_value(&mut self, value: Option<T>) {
        self.selected = value.filter(|v| self.nodes.values().any(|n| n.value == *v));
    }

    fn is_selected(&self, id: TreeItemId) -> bool {
        match (&self.selected, self.nodes.get(id)) {
            (Some(sel), Some(node)) => *sel == node.value,
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Visual rebuild
    // ------------------------------------------------------------------

    /// Tear down every row and rebuild from the visible set. The scroll
    /// offset is restored afterwards, clamped to the new content extent.
    pub fn rebuild(&mut self, ui: &mut LayoutTree, style: &StyleSheet) {
        let saved = ui.scroll_offset(self.scroll);
        ui.set_scroll(self.scroll, Point::ZERO);

        for row in self.rows.drain(..) {
            ui.remove_item(row.row);
        }

        for (id, depth) in self.visible() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let text = if node.children.is_empty() {
                node.label.clone()
            } else if node.expanded {
                format!("- {}", node.label)
            } else {
                format!("+ {}", node.label)
            };
            let selected = self.is_selected(id);
            let indent = depth as i32 * style.tree_indent;

            let row = ui.add_item(self.stack, ItemNode::layout(LayoutKind::Absolute));
            // Zero-size spacer pins the row's left edge at the stack
            // origin, so the button's indent survives stack placement.
            ui.add_item(row, ItemNode::spacer(Size::ZERO));
            let button = add_row_button(ui, row, &text, style, selected, indent);
            self.rows.push(TreeRow { row, button, item: id });
        }

        ui.update_min_max_scroll(self.scroll);
        ui.set_scroll(self.scroll, saved);
    }

    /// React to a click on one of the row buttons: select the node's value
    /// and toggle expansion if it has children. Returns false when the
    /// clicked item is not one of this tree's rows.
    pub fn handle_click(&mut self, ui: &mut LayoutTree, style: &StyleSheet, item: ItemId) -> bool {
        let Some(row) = self.rows.iter().find(|r| r.button == item).copied() else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(row.item) else {
            return false;
        };
        self.selected = Some(node.value.clone());
        if !node.children.is_empty() {
            node.expanded = !node.expanded;
        }
        self.rebuild(ui, style);
        true
    }
}

/// Row button variant of [`LayoutTree::add_button`] with an explicit text
/// color and horizontal offset for indentation.
fn add_row_button(
    ui: &mut LayoutTree,
    parent: ItemId,
    text: &str,
    style: &StyleSheet,
    selected: bool,
    indent: i32,
) -> ItemId {
    let text_size = style.measure_text(text);
    let size = Size::new(
        text_size.width + style.button_padding.width * 2,
        style.tree_row_height,
    );
    let color = if selected {
        style.selected_text_color
    } else {
        style.text_color
    };
    let button = ItemNode::layout(LayoutKind::Relative)
        .with_position(Point::new(indent, 0))
        .with_size(size)
        .with_outline(style.outline_color, style.outline_width)
        .clickable()
        .highlightable();
    let button_id = ui.add_item(parent, button);
    let label = ItemNode::widget(Widget::Label {
        text: text.to_string(),
        color,
        font_size: style.font_size,
    })
    .with_size(text_size)
    .centered();
    ui.add_item(button_id, label);
    button_id
}
