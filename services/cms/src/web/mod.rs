pub mod auth;
pub mod documents;
pub mod gate;
pub mod pages;
pub mod router;
pub mod session;
pub mod state;

// Re-export what the binary needs to assemble the server.
pub use router::router;
pub use state::AppState;
