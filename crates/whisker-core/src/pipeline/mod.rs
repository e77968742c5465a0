pub mod config;
pub mod importer;

pub use config::{Markup, RenderConfig};
pub use importer::{load_story, Importer};
