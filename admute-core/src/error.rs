/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use thiserror::Error;

/// A read or write against a page element failed.
///
/// These are always handled per element: the caller logs and moves on to the
/// next video, they never abort a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("document has no {0}")]
    Missing(&'static str),

    #[error("property write rejected: {0}")]
    Rejected(String),
}

/// Loading or saving extension storage failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed stored value: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Sending a message to another extension context failed.
///
/// Every sender in this crate treats this as expected: the receiving context
/// may simply not be loaded yet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessagingError {
    #[error("no receiver for message")]
    NoReceiver,

    #[error("message could not be encoded: {0}")]
    Encode(String),

    #[error("receiver rejected message: {0}")]
    Rejected(String),
}
