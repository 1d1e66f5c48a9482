pub mod credentials;
pub mod fs_store;

pub use credentials::{hash_password, YamlCredentialStore};
pub use fs_store::FsDocumentStore;
