pub mod domain;
pub mod ports;

pub use domain::{is_plain_file_name, DocumentKind, DocumentName, NameError};
pub use ports::{CredentialStore, DocumentStore, PortError, PortResult};
