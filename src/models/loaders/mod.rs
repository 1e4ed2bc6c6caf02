pub mod text_loader;

pub use text_loader::{load_artifacts, save_artifacts, save_report};
