use crate::geom::{Point, Size, StackAlignment};
use crate::item::{ItemId, ItemNode, LayoutKind, ScrollState, Widget};
use crate::layout::LayoutTree;
use crate::style::StyleSheet;

/// Closed-by-default option picker: a button showing the current choice,
/// and while open, a scrollable stack of option buttons hanging below it.
///
/// Options pair a value with a display label. Selection stores the backing
/// index found by value equality, so `set_selected` with an unregistered
/// value clears rather than inventing an entry, and reassigning the current
/// value is a no-op. The option list is rebuilt from scratch on every open
/// and torn down on close, mirroring how the tree view treats its rows.
pub struct Dropdown<T> {
    options: Vec<(T, String)>,
    selected: Option<usize>,
    placeholder: String,
    button: ItemId,
    button_label: ItemId,
    root: ItemId,
    list: Option<ItemId>,
    option_buttons: Vec<(ItemId, usize)>,
}

impl<T: Clone + PartialEq> Dropdown<T> {
    pub fn new(
        ui: &mut LayoutTree,
        parent: ItemId,
        position: Point,
        placeholder: &str,
        style: &StyleSheet,
    ) -> Self {
        let root = ui.add_item(
            parent,
            ItemNode::layout(LayoutKind::Absolute).with_position(position),
        );
        let button = ui.add_button(root, placeholder, style);
        let button_label = ui.children(button)[0];
        Self {
            options: Vec::new(),
            selected: None,
            placeholder: placeholder.to_string(),
            button,
            button_label,
            root,
            list: None,
            option_buttons: Vec::new(),
        }
    }

    pub fn add_option(&mut self, value: T, label: &str) {
        self.options.push((value, label.to_string()));
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|(v, _)| v)
    }

    pub fn is_open(&self) -> bool {
        self.list.is_some()
    }

    pub fn button_item(&self) -> ItemId {
        self.button
    }

    /// Select by value: scans the registered options for a value-equal
    /// payload and stores its index, or clears on `None`/not found. The
    /// button caption follows the selection.
    pub fn set_selected(&mut self, ui: &mut LayoutTree, style: &StyleSheet, value: Option<T>) {
        self.selected =
            value.and_then(|v| self.options.iter().position(|(opt, _)| *opt == v));
        let caption = match self.selected.and_then(|i| self.options.get(i)) {
            Some((_, label)) => label.clone(),
            None => self.placeholder.clone(),
        };
        ui.set_text(self.button_label, &caption, style);
    }

    /// Build the option list below the button: a scroll viewport capped at
    /// the style's dropdown height over a Top-aligned stack. The list sits
    /// on a higher layer so it draws over (and takes clicks before) its
    /// siblings.
    pub fn open(&mut self, ui: &mut LayoutTree, style: &StyleSheet) {
        if self.is_open() {
            return;
        }
        let anchor = ui.rect(self.button);
        let scroll = ui.add_item(
            self.root,
            ItemNode::layout(LayoutKind::Scroll(ScrollState::default()))
                .with_position(Point::new(anchor.left(), anchor.bottom()))
                .with_layer(1),
        );
        let stack = ui.add_item(
            scroll,
            ItemNode::layout(LayoutKind::Stack {
                alignment: StackAlignment::Top,
            }),
        );
        let labels: Vec<String> = self.options.iter().map(|(_, l)| l.clone()).collect();
        for (index, label) in labels.iter().enumerate() {
            let selected = self.selected == Some(index);
            let button = add_option_button(ui, stack, label, style, selected);
            self.option_buttons.push((button, index));
        }
        // Size the viewport to the built content, capped so long lists
        // scroll instead of running down the screen.
        let content = ui.rect(stack).size();
        let viewport = Size::new(
            content.width.max(anchor.width),
            content.height.min(style.dropdown_max_height),
        );
        ui.set_size(scroll, viewport);
        self.list = Some(scroll);
        // The whole dropdown rises above its siblings while open, so the
        // list overlays whatever sits below the button.
        ui.set_layer(self.root, 1);
    }

    pub fn close(&mut self, ui: &mut LayoutTree) {
        if let Some(list) = self.list.take() {
            ui.remove_item(list);
        }
        self.option_buttons.clear();
        ui.set_layer(self.root, 0);
    }

    pub fn toggle(&mut self, ui: &mut LayoutTree, style: &StyleSheet) {
        if self.is_open() {
            self.close(ui);
        } else {
            self.open(ui, style);
        }
    }

    /// React to a click: the main button toggles the list, an option
    /// button selects its value and closes. Returns false for items that
    /// belong to neither.
    pub fn handle_click(&mut self, ui: &mut LayoutTree, style: &StyleSheet, item: ItemId) -> bool {
        if item == self.button {
            self.toggle(ui, style);
            return true;
        }
        let Some(&(_, index)) = self.option_buttons.iter().find(|(b, _)| *b == item) else {
            return false;
        };
        let Some((value, _)) = self.options.get(index) else {
            return false;
        };
        let value = value.clone();
        self.set_selected(ui, style, Some(value));
        self.close(ui);
        true
    }
}

fn add_option_button(
    ui: &mut LayoutTree,
    parent: ItemId,
    text: &str,
    style: &StyleSheet,
    selected: bool,
) -> ItemId {
    let text_size = style.measure_text(text);
    let size = Size::new(
        text_size.width + style.button_padding.width * 2,
        text_size.height + style.button_padding.height * 2,
    );
    let color = if selected {
        style.selected_text_color
    } else {
        style.text_color
    };
    let button = ItemNode::layout(LayoutKind::Relative)
        .with_size(size)
        .with_background(style.button_background_color)
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
