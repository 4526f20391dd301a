//! JSON front end of the transit router: builds a base file from a request
//! document and answers stat requests against it.

use thiserror::Error;

pub mod base;
pub mod commands;
pub mod handler;
pub mod requests;

pub use base::Base;
pub use commands::{make_base, process_requests, read_document};
pub use handler::{RequestHandler, Response, build_catalogue};
pub use requests::{BaseRequest, RequestDocument, SerializationSettings, StatKind, StatRequest};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] transit_router_core::Error),
    #[error("Malformed request document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request document has no {0}")]
    MissingSection(&'static str),
}
