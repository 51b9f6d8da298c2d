//! Terminal aquarium: fish and decorations on a glyph canvas, dragged with
//! the mouse and saved to `.aqua` XML files.

pub mod app;
pub mod aquarium;
pub mod background;
pub mod config;
pub mod error;
pub mod fish;
pub mod input;
pub mod item;
pub mod logging;
pub mod render;
pub mod sprite;
pub mod storage;
pub mod view;
pub mod xml;

pub use aquarium::{Aquarium, ItemId};
pub use error::SceneError;
pub use item::{Item, ItemKind};
