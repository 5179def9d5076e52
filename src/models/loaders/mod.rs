pub mod toml_loader;

pub use toml_loader::{load_all_batch_files, load_batch_file};
