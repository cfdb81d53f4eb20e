pub mod content;
pub mod draw;
pub mod dropdown;
pub mod events;
pub mod geom;
pub mod input;
pub mod item;
pub mod layout;
pub mod loader;
pub mod screen;
pub mod screen_stack;
pub mod style;
pub mod transition;
pub mod tree;
