use crate::content::TextureHandle;
use crate::geom::{Point, Rect, Size};

/// Draw command for a filled quad, optionally textured.
/// Consumed by the renderer collaborator.
#[derive(Debug, Clone)]
pub struct QuadCommand {
    pub rect: Rect,
    pub color: [f32; 4], // sRGB RGBA
    pub texture: Option<TextureHandle>,
}

/// Draw command for a rectangle outline.
#[derive(Debug, Clone)]
pub struct OutlineCommand {
    pub rect: Rect,
    pub color: [f32; 4], // sRGB RGBA
    pub width: i32,
}

/// Draw command for a text run.
#[derive(Debug, Clone)]
pub struct TextCommand {
    pub text: String,
    pub position: Point,
    pub color: [f32; 4], // sRGB RGBA
    pub font_size: f32,
}

/// Draw commands redirected into an offscreen surface, then blitted at
/// `destination`. This is how a scroll layout clips overflowing content:
/// the renderer draws `list` into a target of `viewport` size and copies the
/// result. `recreate` is set on the tick after the viewport size changed so
/// the renderer knows to reallocate the target.
#[derive(Debug, Clone)]
pub struct SurfaceCommand {
    pub viewport: Size,
    /// Top-left of the viewport in content coordinates; subtract this when
    /// drawing `list` into the surface.
    pub origin: Point,
    pub destination: Point,
    pub alpha: f32,
    pub recreate: bool,
    pub list: DrawList,
}

/// Collects draw commands from the screen/widget tree.
/// Decouples layout logic from the rendering backend.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub quads: Vec<QuadCommand>,
    pub outlines: Vec<OutlineCommand>,
    pub texts: Vec<TextCommand>,
    pub surfaces: Vec<SurfaceCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.quads.clear();
        self.outlines.clear();
        self.texts.clear();
        self.surfaces.clear();
    }

    /// Total command count, including nested surface lists.
    pub fn len(&self) -> usize {
        let nested: usize = self.surfaces.iter().map(|s| s.list.len()).sum();
        self.quads.len() + self.outlines.len() + self.texts.len() + self.surfaces.len() + nested
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_nested_surface_commands() {
        let mut inner = DrawList::new();
        inner.texts.push(TextCommand {
            text: "row".into(),
            position: Point::ZERO,
            color: [1.0; 4],
            font_size: 12.0,
        });

        let mut outer = DrawList::new();
        outer.quads.push(QuadCommand {
            rect: Rect::new(0, 0, 10, 10),
            color: [1.0; 4],
            texture: None,
        });
        outer.surfaces.push(SurfaceCommand {
            viewport: Size::new(10, 10),
            origin: Point::ZERO,
            destination: Point::ZERO,
            alpha: 1.0,
            recreate: false,
            list: inner,
        });

        assert_eq!(outer.len(), 3);
        assert!(!outer.is_empty());

        outer.clear();
        assert!(outer.is_empty());
    }
}
