//! Headless widget gallery: builds a menu screen, a tree browser, and a
//! dropdown popup, then drives the stack through a scripted minute of
//! ticks, printing what the renderer would receive.
//!
//! Usage: cargo run --bin gallery
//! Set RUST_LOG=debug to watch screen lifecycle and transitions.

use std::time::Duration;

use skermaz::content::MapContent;
use skermaz::draw::DrawList;
use skermaz::events::UiEvent;
use skermaz::geom::{Point, Size};
use skermaz::input::InputQueue;
use skermaz::screen::{Screen, UiContext};
use skermaz::screen_stack::ScreenStack;
use skermaz::style::StyleSheet;
use skermaz::transition::Wipe;
use skermaz::tree::Tree;

const VIEW: Size = Size {
    width: 1280,
    height: 720,
};
const TICK: Duration = Duration::from_millis(16);

fn menu_screen(style: &StyleSheet) -> Screen {
    let mut screen = Screen::new("menu", style, VIEW).with_wipe(Wipe::SlideLeft);
    let root = screen.root();
    let ui = screen.ui_mut();
    for (i, caption) in ["browse", "options", "quit"].into_iter().enumerate() {
        let button = ui.add_button(root, caption, style);
        ui.set_position(button, Point::new(80, 120 + i as i32 * 48));
    }
    screen
}

fn browser_screen(style: &StyleSheet) -> (Screen, Tree<String>) {
    let mut screen = Screen::new("browser", style, VIEW)
        .with_wipe(Wipe::PopRight)
        .with_cover_other_screens(true)
        .with_texture_fade("fade");
    let root = screen.root();
    let mut tree = Tree::new(
        screen.ui_mut(),
        root,
        Point::new(80, 80),
        Size::new(400, 480),
    );
    for region in ["north", "south", "east"] {
        let branch = tree.add_root(region.to_string(), region);
        for i in 0..4 {
            let name = format!("{region}-{i}");
            tree.add_child(branch, name.clone(), &name);
        }
        tree.set_expanded(branch, region == "north");
    }
    tree.rebuild(screen.ui_mut(), style);
    (screen, tree)
}

fn main() {
    env_logger::init();

    let style = StyleSheet::load("gallery.ron");
    let mut content = MapContent::new();
    content.add_texture("fade");

    let mut stack = ScreenStack::new();
    stack.add_screen(menu_screen(&style));
    let (mut browser, mut tree) = browser_screen(&style);
    {
        let mut ctx = UiContext {
            style: &style,
            content: &mut content,
        };
        if let Err(e) = browser.load(&mut ctx) {
            log::error!("browser load failed: {e}");
            return;
        }
    }
    stack.add_screen(browser);

    let mut input = InputQueue::new();
    let mut dl = DrawList::new();
    let mut clicks = 0usize;

    for frame in 0..600u32 {
        // Every second, click the first visible tree row.
        if frame % 60 == 30
            && let Some(screen) = stack
                .screens_mut()
                .iter_mut()
                .find(|s| s.name() == "browser")
        {
            let root = screen.root();
            let first_row = screen
                .ui()
                .children(root)
                .first()
                .map(|&scroll| screen.ui().rect(scroll).location());
            if let Some(location) = first_row {
                input.clicks.push(location + Point::new(10, 10));
            }
        }

        stack.update(TICK, &mut input, true);

        if let Some(screen) = stack
            .screens_mut()
            .iter_mut()
            .find(|s| s.name() == "browser")
        {
            let events = screen.drain_events();
            for event in &events {
                if let UiEvent::Clicked { item, .. } = event {
                    let (ui, st) = (screen.ui_mut(), &style);
                    if tree.handle_click(ui, st, *item) {
                        clicks += 1;
                    }
                }
            }
        }

        dl.clear();
        stack.draw(&mut dl);
        if frame % 120 == 0 {
            log::info!(
                "frame {frame}: {} screens, {} draw commands",
                stack.len(),
                dl.len()
            );
        }
    }

    log::info!(
        "gallery done: {clicks} tree clicks handled, selection = {:?}",
        tree.selected_value()
    );
    println!(
        "gallery: {} screens alive, {} draw commands last frame, {clicks} tree rows clicked",
        stack.len(),
        dl.len()
    );
}
