//! # Quill Shared
//!
//! Form payloads shared between the web server and its templates.

pub mod forms;

pub use forms::{CommentForm, SearchForm, ShareForm};
