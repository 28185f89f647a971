//! Incremental HTTP/1.x Message Reader and Writer
//!
//! - [`reader`]: resumable, event driven parser for requests and responses, including chunked
//!   and multipart bodies
//! - [`message`]: owned message model
//! - [`simple`]: one-shot parsing into a [`message::HttpMessage`]
//! - [`write`]: serialization
//! - [`io`]: async driver over [`tokio::io::AsyncRead`]
#![warn(missing_debug_implementations)]

mod log;

pub mod cursor;
pub mod error;
pub mod http;
pub mod headers;
pub mod message;
pub mod reader;
pub mod simple;
pub mod write;
pub mod io;

pub use error::Error;
