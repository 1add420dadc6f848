pub mod toml_loader;

pub use toml_loader::{load_course_names, load_targets};
