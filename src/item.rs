use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::content::TextureHandle;
use crate::geom::{HorizontalAlignment, Point, Size, StackAlignment, VerticalAlignment};
use crate::style::StyleSheet;

new_key_type! {
    /// Handle into the layout item arena. Stable across insertions/removals.
    pub struct ItemId;
}

/// Leaf widget identity. Closed set — no trait objects.
#[derive(Debug, Clone)]
pub enum Widget {
    /// Single-line text.
    Label {
        text: String,
        color: [f32; 4], // sRGB RGBA
        font_size: f32,
    },
    /// Textured quad.
    Image {
        texture: TextureHandle,
        color: [f32; 4], // tint, sRGB RGBA
    },
    /// Invisible box that only occupies space.
    Spacer,
}

/// Scroll bookkeeping for a `LayoutKind::Scroll` container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    /// Current scroll offset, always within `[min_scroll, max_scroll]`.
    pub offset: Point,
    pub min_scroll: Point,
    pub max_scroll: Point,
    /// Viewport size the offscreen surface was last committed at.
    pub surface_size: Size,
    /// Set for one tick after the viewport size changed, telling the
    /// renderer to reallocate the offscreen surface.
    pub recreate_surface: bool,
}

/// Placement rule for a container's children.
#[derive(Debug, Clone)]
pub enum LayoutKind {
    /// Children keep whatever position they are given; moving the layout
    /// translates them by the delta.
    Absolute,
    /// Children snap to one of the 9 anchor points of the layout's rect
    /// whenever the rect changes.
    Relative,
    /// Children appended sequentially along the growth axis.
    Stack { alignment: StackAlignment },
    /// Absolute placement behind a fixed viewport with clamped scrolling.
    Scroll(ScrollState),
}

/// Widget leaf or layout container.
#[derive(Debug, Clone)]
pub enum ItemKind {
    Widget(Widget),
    Layout(LayoutKind),
}

/// Outline drawn around an item while it is highlighted.
#[derive(Debug, Clone, Copy)]
pub struct Outline {
    pub color: [f32; 4],
    pub width: i32,
}

/// Arena entry: one positionable item plus its tree metadata.
///
/// The rect is never stored — it is derived from
/// position/size/scale/alignment on demand. Capability flags replace an
/// inheritance tower: a button is a relative layout with `clickable` set.
#[derive(Debug, Clone)]
pub struct ItemNode {
    pub kind: ItemKind,
    pub parent: Option<ItemId>,
    pub children: SmallVec<[ItemId; 4]>,
    /// Anchor point. Its relation to the rect is set by the alignments.
    pub position: Point,
    /// Explicit size for leaves, relative layouts, and scroll viewports.
    /// Absolute and stack layouts derive their extent from children.
    pub size: Size,
    pub scale: f32,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    /// Draw/update order among siblings; stably sorted, so equal layers
    /// keep insertion order.
    pub layer: i32,
    pub clickable: bool,
    pub highlightable: bool,
    pub draggable: bool,
    /// Pointer-over state for the current tick.
    pub highlighted: bool,
    pub background: Option<[f32; 4]>,
    pub outline: Option<Outline>,
}

impl ItemNode {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            position: Point::ZERO,
            size: Size::ZERO,
            scale: 1.0,
            horizontal: HorizontalAlignment::default(),
            vertical: VerticalAlignment::default(),
            layer: 0,
            clickable: false,
            highlightable: false,
            draggable: false,
            highlighted: false,
            background: None,
            outline: None,
        }
    }

    pub fn layout(kind: LayoutKind) -> Self {
        Self::new(ItemKind::Layout(kind))
    }

    pub fn widget(widget: Widget) -> Self {
        Self::new(ItemKind::Widget(widget))
    }

    /// Label leaf measured with the style sheet's font metrics.
    pub fn label(text: &str, style: &StyleSheet) -> Self {
        let size = style.measure_text(text);
        Self::widget(Widget::Label {
            text: text.to_string(),
            color: style.text_color,
            font_size: style.font_size,
        })
        .with_size(size)
    }

    pub fn image(texture: TextureHandle, size: Size) -> Self {
        Self::widget(Widget::Image {
            texture,
            color: [1.0; 4],
        })
        .with_size(size)
    }

    pub fn spacer(size: Size) -> Self {
        Self::widget(Widget::Spacer).with_size(size)
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_alignment(mut self, h: HorizontalAlignment, v: VerticalAlignment) -> Self {
        self.horizontal = h;
        self.vertical = v;
        self
    }

    /// Anchor at the center on both axes.
    pub fn centered(self) -> Self {
        self.with_alignment(HorizontalAlignment::Center, VerticalAlignment::Center)
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_background(mut self, color: [f32; 4]) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_outline(mut self, color: [f32; 4], width: i32) -> Self {
        self.outline = Some(Outline { color, width });
        self
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }

    pub fn highlightable(mut self) -> Self {
        self.highlightable = true;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn is_layout(&self) -> bool {
        matches!(self.kind, ItemKind::Layout(_))
    }

    pub fn scroll_state(&self) -> Option<&ScrollState> {
        match &self.kind {
            ItemKind::Layout(LayoutKind::Scroll(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn scroll_state_mut(&mut self) -> Option<&mut ScrollState> {
        match &mut self.kind {
            ItemKind::Layout(LayoutKind::Scroll(s)) => Some(s),
            _ => None,
        }
    }
}
