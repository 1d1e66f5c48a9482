//! services/cms/src/lib.rs
//!
//! A small file-backed content-management web application: signed-in users
//! create, edit and delete `.txt` and `.md` documents; anyone can read them.

pub mod adapters;
pub mod config;
pub mod error;
pub mod render;
pub mod web;
