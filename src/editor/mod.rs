pub mod island_editor;

pub use island_editor::{EditorTool, IslandEditor};
