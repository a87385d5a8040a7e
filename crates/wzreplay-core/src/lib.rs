pub mod config;
pub mod error;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod handler;
pub mod launcher;
pub mod locator;
pub mod protocol;
pub mod storage;
pub mod url_model;

pub use error::{HandlerError, HandlerResult};
pub use handler::{Handler, Invocation};
