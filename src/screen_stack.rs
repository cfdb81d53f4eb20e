use std::time::Duration;

use crate::draw::DrawList;
use crate::input::InputQueue;
use crate::loader::ScreenLoader;
use crate::screen::Screen;
use crate::transition::TransitionState;

type ScreenBuilder = Box<dyn FnOnce() -> Vec<Screen> + Send + 'static>;

/// Owner and scheduler of the live screens.
///
/// Screens are kept sorted by `(layer, sub_layer)`; `sub_layer` is a
/// monotonic counter assigned at insertion, so equal layers keep FIFO
/// order. One optional `top_screen` sits outside the ordering and is
/// updated, given input, and drawn unconditionally — the slot for a
/// loading overlay or debug console.
///
/// Per tick the stack walks from topmost down: exiting screens head
/// toward `Hidden` and are removed once they arrive, covered screens that
/// hide when covered do the same without being removed, and the rest head
/// toward `Active`. Only the first non-covered, non-exiting screen that is
/// on (or on its way on) receives the tick's input. Drawing runs the other
/// way, bottom up, with the top screen last.
pub struct ScreenStack {
    screens: Vec<Screen>,
    top_screen: Option<Screen>,
    next_sub_layer: u64,
    pending: Option<ScreenBuilder>,
    loader: Option<ScreenLoader>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            top_screen: None,
            next_sub_layer: 0,
            pending: None,
            loader: None,
        }
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// True while a background load is pending or running.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some() || self.loader.is_some()
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut [Screen] {
        &mut self.screens
    }

    pub fn top_screen(&self) -> Option<&Screen> {
        self.top_screen.as_ref()
    }

    pub fn top_screen_mut(&mut self) -> Option<&mut Screen> {
        self.top_screen.as_mut()
    }

    /// Insert a screen, assigning the next `sub_layer` and keeping the
    /// list sorted by `(layer, sub_layer)`.
    pub fn add_screen(&mut self, mut screen: Screen) {
        screen.set_sub_layer(self.next_sub_layer);
        self.next_sub_layer += 1;
        log::debug!(
            "screen {} added at layer {} sub {}",
            screen.name(),
            screen.layer(),
            screen.sub_layer()
        );
        self.screens.push(screen);
        self.screens
            .sort_by_key(|s| (s.layer(), s.sub_layer()));
    }

    /// Install or clear the always-on-top screen.
    pub fn set_top_screen(&mut self, screen: Option<Screen>) -> Option<Screen> {
        let previous = self.top_screen.take();
        self.top_screen = screen.map(|mut s| {
            s.set_sub_layer(self.next_sub_layer);
            self.next_sub_layer += 1;
            s
        });
        previous
    }

    /// Ask every stacked screen to leave. The top screen is untouched.
    pub fn exit_all(&mut self) {
        for screen in &mut self.screens {
            screen.exit_screen();
        }
    }

    /// Replace the whole stack with screens built on a worker thread. The
    /// current screens transition off first; the worker is spawned only
    /// once the stack has drained, and the new screens are installed on
    /// the main thread when the worker finishes. Meanwhile `update` keeps
    /// running, so a loading screen in the top slot keeps animating.
    pub fn start_loading<F>(&mut self, builder: F)
    where
        F: FnOnce() -> Vec<Screen> + Send + 'static,
    {
        if self.is_loading() {
            log::warn!("start_loading while a load is in progress, replacing it");
            self.loader = None;
        }
        self.exit_all();
        self.pending = Some(Box::new(builder));
    }

    fn advance_loading(&mut self) {
        if self.screens.is_empty()
            && let Some(builder) = self.pending.take()
        {
            self.loader = Some(ScreenLoader::start(builder));
        }
        let ready = self.loader.as_ref().map(|l| l.is_ready()).unwrap_or(false);
        if ready && let Some(mut loader) = self.loader.take() {
            if let Some(screens) = loader.take() {
                for screen in screens {
                    self.add_screen(screen);
                }
            }
        }
    }

    /// One tick: poll any background load, update the top screen, then
    /// every stacked screen from topmost down, routing input to the single
    /// eligible screen and dropping screens that finished exiting.
    /// Leftover input is discarded at the end of the tick.
    pub fn update(&mut self, dt: Duration, input: &mut InputQueue, focused: bool) {
        self.advance_loading();

        if let Some(top) = self.top_screen.as_mut() {
            top.update(dt, focused, false);
            if focused {
                top.handle_input(input);
            }
        }

        let mut covered = false;
        let mut input_given = false;
        for screen in self.screens.iter_mut().rev() {
            screen.update(dt, focused, covered);
            let state = screen.state();
            let on = matches!(
                state,
                TransitionState::Active | TransitionState::TransitionOn
            );
            if focused && !input_given && !covered && on && !screen.is_exiting() {
                screen.handle_input(input);
                input_given = true;
            }
            if screen.covers_other_screens() && on {
                covered = true;
            }
        }
        self.screens.retain(|s| {
            if s.is_finished_exiting() {
                log::debug!("screen {} removed", s.name());
                false
            } else {
                true
            }
        });

        input.clear();
    }

    /// Emit draw commands bottom-up so upper screens paint over lower
    /// ones, with the top screen last of all.
    pub fn draw(&self, dl: &mut DrawList) {
        for screen in &self.screens {
            screen.draw(dl);
        }
        if let Some(top) = &self.top_screen {
            top.draw(dl);
        }
    }
}

impl Default for ScreenStack {
    fn default() -> Self {
        Self::new()
    }
}
