use std::time::Duration;

use crate::content::{ContentError, ContentSource, TextureHandle};
use crate::draw::{DrawList, QuadCommand};
use crate::events::{EventQueue, UiEvent};
use crate::geom::{Rect, Size};
use crate::input::InputQueue;
use crate::item::{ItemId, ItemNode, LayoutKind};
use crate::layout::LayoutTree;
use crate::style::StyleSheet;
use crate::transition::{Transition, TransitionState, Wipe};

/// Everything a screen needs at load time, passed down explicitly.
pub struct UiContext<'a> {
    pub style: &'a StyleSheet,
    pub content: &'a mut dyn ContentSource,
}

/// Backdrop drawn behind a screen's widgets, faded with the transition.
#[derive(Debug, Clone)]
enum Fade {
    None,
    Solid([f32; 4]),
    /// Resolved to a handle during `load`; falls back to solid if missing.
    TextureByName(String),
    Texture(TextureHandle),
}

/// One screen: a transition, a widget tree rooted at an absolute layout,
/// and the bookkeeping the stack needs to order, cover, and retire it.
///
/// Lifecycle: constructed, `load`ed once content is available, then
/// `update`/`handle_input`/`draw` every tick until `exit_screen` is called
/// and the off-transition completes, at which point the stack drops it.
pub struct Screen {
    name: String,
    transition: Transition,
    ui: LayoutTree,
    root: ItemId,
    wipe: Wipe,
    layer: i32,
    sub_layer: u64,
    is_exiting: bool,
    hide_when_covered: bool,
    cover_other_screens: bool,
    events: EventQueue,
    fade: Fade,
    fade_color: [f32; 4],
    viewport: Size,
    loaded: bool,
}

impl Screen {
    pub fn new(name: &str, style: &StyleSheet, viewport: Size) -> Self {
        let transition = Transition::new(
            Duration::from_secs_f32(style.transition_on_seconds),
            Duration::from_secs_f32(style.transition_off_seconds),
        );
        let mut ui = LayoutTree::new();
        let root = ui.insert_root(ItemNode::layout(LayoutKind::Absolute));
        Self {
            name: name.to_string(),
            transition,
            ui,
            root,
            wipe: Wipe::None,
            layer: 0,
            sub_layer: 0,
            is_exiting: false,
            hide_when_covered: true,
            cover_other_screens: false,
            events: EventQueue::new(),
            fade: Fade::None,
            fade_color: style.fade_color,
            viewport,
            loaded: false,
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn with_wipe(mut self, wipe: Wipe) -> Self {
        self.wipe = wipe;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Keep updating toward `Active` even when a screen above covers this
    /// one. Popups over a background scene want this off on the scene.
    pub fn with_hide_when_covered(mut self, hide: bool) -> Self {
        self.hide_when_covered = hide;
        self
    }

    /// Mark every screen beneath this one as covered while it is visible.
    pub fn with_cover_other_screens(mut self, cover: bool) -> Self {
        self.cover_other_screens = cover;
        self
    }

    /// Draw a solid backdrop behind the widgets.
    pub fn with_solid_fade(mut self, color: [f32; 4]) -> Self {
        self.fade = Fade::Solid(color);
        self
    }

    /// Draw a textured backdrop, resolved by name during `load`.
    pub fn with_texture_fade(mut self, name: &str) -> Self {
        self.fade = Fade::TextureByName(name.to_string());
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn sub_layer(&self) -> u64 {
        self.sub_layer
    }

    pub(crate) fn set_sub_layer(&mut self, sub_layer: u64) {
        self.sub_layer = sub_layer;
    }

    pub fn state(&self) -> TransitionState {
        self.transition.state()
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn covers_other_screens(&self) -> bool {
        self.cover_other_screens
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn ui(&self) -> &LayoutTree {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut LayoutTree {
        &mut self.ui
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Resolve named content. A missing fade texture degrades to the solid
    /// fallback color with a warning; other content errors propagate.
    pub fn load(&mut self, ctx: &mut UiContext<'_>) -> Result<(), ContentError> {
        if let Fade::TextureByName(name) = &self.fade {
            match ctx.content.texture(name) {
                Ok(handle) => self.fade = Fade::Texture(handle),
                Err(e) => {
                    log::warn!("screen {}: fade texture missing ({e}), using solid", self.name);
                    self.fade = Fade::Solid(self.fade_color);
                }
            }
        }
        self.loaded = true;
        log::debug!("screen {} loaded", self.name);
        Ok(())
    }

    /// Ask the screen to leave; the stack removes it once the
    /// off-transition reaches `Hidden`.
    pub fn exit_screen(&mut self) {
        if !self.is_exiting {
            log::debug!("screen {} exiting", self.name);
            self.is_exiting = true;
        }
    }

    pub fn is_finished_exiting(&self) -> bool {
        self.is_exiting && self.transition.state() == TransitionState::Hidden
    }

    /// Advance transition and widget state one tick. Returns `true` while
    /// the transition is still moving.
    pub fn update(&mut self, dt: Duration, _focused: bool, covered: bool) -> bool {
        let should_be_on = !self.is_exiting && !(covered && self.hide_when_covered);
        let moving = self.transition.update(dt, should_be_on);
        self.ui.update(self.root);
        moving
    }

    /// Route this tick's pending input through the widget tree. Consumed
    /// entries are removed from the queue; produced events accumulate in
    /// the screen's queue until drained.
    pub fn handle_input(&mut self, input: &mut InputQueue) {
        self.ui
            .check_highlight(self.root, input, &mut self.events);
        self.ui.check_click(self.root, input, &mut self.events);
        self.ui.check_drag(self.root, input, &mut self.events);
        self.ui.check_drop(self.root, input, &mut self.events);
    }

    /// Take the interaction events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.events.drain()
    }

    /// Emit this screen's draw commands: fade backdrop first (never wiped,
    /// only faded), then widget backgrounds and foregrounds shifted by the
    /// wipe offset. Hidden screens emit nothing.
    pub fn draw(&self, dl: &mut DrawList) {
        if self.transition.state() == TransitionState::Hidden {
            return;
        }
        let full = Rect::new(0, 0, self.viewport.width, self.viewport.height);
        match &self.fade {
            Fade::None | Fade::TextureByName(_) => {}
            Fade::Solid(color) => dl.quads.push(QuadCommand {
                rect: full,
                color: self.transition.fade(*color),
                texture: None,
            }),
            Fade::Texture(handle) => dl.quads.push(QuadCommand {
                rect: full,
                color: self.transition.fade([1.0; 4]),
                texture: Some(*handle),
            }),
        }
        let offset = self.transition.wipe_offset(self.wipe);
        let alpha = self.transition.alpha();
        self.ui.draw_background(self.root, offset, alpha, dl);
        self.ui.draw(self.root, offset, alpha, dl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MapContent;
    use crate::geom::Point;

    const TICK: Duration = Duration::from_millis(100);
    const VIEW: Size = Size {
        width: 800,
        height: 600,
    };

    fn instant_style() -> StyleSheet {
        StyleSheet {
            transition_on_seconds: 0.0,
            transition_off_seconds: 0.0,
            ..StyleSheet::default()
        }
    }

    #[test]
    fn load_resolves_fade_texture() {
        let style = StyleSheet::default();
        let mut content = MapContent::new();
        let handle = content.add_texture("fade");
        let mut screen = Screen::new("menu", &style, VIEW).with_texture_fade("fade");
        let mut ctx = UiContext {
            style: &style,
            content: &mut content,
        };
        screen.load(&mut ctx).expect("load");
        assert!(screen.is_loaded());
        assert!(matches!(screen.fade, Fade::Texture(h) if h == handle));
    }

    #[test]
    fn missing_fade_texture_falls_back_to_solid() {
        let style = StyleSheet::default();
        let mut content = MapContent::new();
        let mut screen = Screen::new("menu", &style, VIEW).with_texture_fade("nope");
        let mut ctx = UiContext {
            style: &style,
            content: &mut content,
        };
        screen.load(&mut ctx).expect("load degrades, not fails");
        assert!(matches!(screen.fade, Fade::Solid(c) if c == style.fade_color));
    }

    #[test]
    fn update_drives_transition_lifecycle() {
        let style = StyleSheet::default(); // 0.5s legs
        let mut screen = Screen::new("menu", &style, VIEW);
        assert_eq!(screen.state(), TransitionState::Hidden);

        for _ in 0..5 {
            screen.update(TICK, true, false);
        }
        assert_eq!(screen.state(), TransitionState::Active);

        screen.exit_screen();
        screen.update(TICK, true, false);
        assert_eq!(screen.state(), TransitionState::TransitionOff);
        assert!(!screen.is_finished_exiting());
        for _ in 0..5 {
            screen.update(TICK, true, false);
        }
        assert!(screen.is_finished_exiting());
    }

    #[test]
    fn covered_screen_hides_unless_told_otherwise() {
        let style = instant_style();
        let mut screen = Screen::new("menu", &style, VIEW);
        screen.update(TICK, true, false);
        assert_eq!(screen.state(), TransitionState::Active);

        screen.update(TICK, true, true);
        assert_eq!(screen.state(), TransitionState::Hidden);

        let mut stubborn = Screen::new("scene", &style, VIEW).with_hide_when_covered(false);
        stubborn.update(TICK, true, true);
        assert_eq!(stubborn.state(), TransitionState::Active);
    }

    #[test]
    fn input_routes_to_widgets_and_events_accumulate() {
        let style = instant_style();
        let mut screen = Screen::new("menu", &style, VIEW);
        let root = screen.root();
        let style2 = style.clone();
        let button = screen.ui_mut().add_button(root, "go", &style2);
        screen.update(TICK, true, false);

        let center = screen.ui().rect(button).center();
        let mut input = InputQueue::new();
        input.clicks.push(center);
        input.clicks.push(Point::new(-100, -100));
        screen.handle_input(&mut input);

        // Only the in-bounds click is consumed.
        assert_eq!(input.clicks.len(), 1);
        let events = screen.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], UiEvent::Clicked { item, .. } if item == button));
        assert!(screen.drain_events().is_empty());
    }

    #[test]
    fn hidden_screen_draws_nothing() {
        let style = StyleSheet::default();
        let mut screen = Screen::new("menu", &style, VIEW).with_solid_fade([0.0, 0.0, 0.0, 0.5]);
        let root = screen.root();
        let style2 = style.clone();
        screen.ui_mut().add_button(root, "go", &style2);

        let mut dl = DrawList::new();
        screen.draw(&mut dl);
        assert!(dl.is_empty());
    }

    #[test]
    fn draw_fades_backdrop_and_wipes_content() {
        let style = StyleSheet::default();
        let mut screen = Screen::new("menu", &style, VIEW)
            .with_solid_fade([0.0, 0.0, 0.0, 0.5])
            .with_wipe(Wipe::PopLeft);
        let root = screen.root();
        let style2 = style.clone();
        let button = screen.ui_mut().add_button(root, "go", &style2);
        let resting = screen.ui().rect(button).left();

        // One tick into a 0.5s entrance: position 0.8.
        screen.update(TICK, true, false);
        let mut dl = DrawList::new();
        screen.draw(&mut dl);

        // First quad is the full-viewport fade at transition alpha.
        let fade = &dl.quads[0];
        assert_eq!(fade.rect, Rect::new(0, 0, VIEW.width, VIEW.height));
        assert!((fade.color[3] - 0.5 * 0.2).abs() < 1e-4);

        // The button background is offset left of its resting position.
        let body = &dl.quads[1];
        assert!(body.rect.left() < resting);
        assert_eq!(body.rect.left(), resting + screen.transition.wipe_offset(Wipe::PopLeft).x);
    }
}
