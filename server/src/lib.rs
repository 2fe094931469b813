//! Todo Watcher Server - live todo dashboard backend.
//!
//! This crate serves a folder of plain-text todo files to the dashboard:
//! - Parsing the folder on demand and returning the task trees as JSON
//! - Watching the folder and pushing change notices over WebSocket
//! - Opening a todo file in the user's editor
//!
//! # Architecture
//!
//! The server holds no parsed state. A change in the folder is announced to
//! every connected client, and clients fetch `/api/todos` again to get a
//! fresh full parse.

pub mod broadcast;
pub mod config;
pub mod editor;
pub mod error;
pub mod routes;
pub mod watcher;
