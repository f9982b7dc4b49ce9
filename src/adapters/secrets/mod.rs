//! Secret store adapters.

mod yaml_file;

pub use yaml_file::YamlFileSecretStore;
