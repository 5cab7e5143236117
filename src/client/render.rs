//! Response rendering for `passwortctl`
//!
//! The output is the server's body text whatever the status, except that a
//! DELETE answered with exactly 204 renders [`DELETED_MESSAGE`]. Transport
//! failures render their error string verbatim.

use std::fmt::Display;

use reqwest::StatusCode;

use super::ApiResponse;
use crate::constants::DELETED_MESSAGE;

/// Which request produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Set,
    Get,
    Delete,
    List,
    Init,
    Seal,
    Unseal,
    Status,
}

/// Turn the outcome of one request into the text shown to the user
pub fn render<E: Display>(kind: RequestKind, outcome: Result<ApiResponse, E>) -> String {
    match outcome {
        Ok(response) if kind == RequestKind::Delete && response.status == StatusCode::NO_CONTENT => {
            DELETED_MESSAGE.to_string()
        }
        Ok(response) => response.body,
        Err(e) => e.to_string(),
    }
}
