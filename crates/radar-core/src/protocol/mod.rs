// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Feed document parsing.
//!
//! The engine itself owns no wire format. This layer turns decoder output
//! files into per-cycle snapshot maps. Currently implements the dump1090
//! `aircraft.json` / `receiver.json` documents.

mod aircraft_json;

pub use aircraft_json::{AircraftJsonParser, FeedSnapshot, ReceiverInfo};

use thiserror::Error;

/// Errors for documents that cannot be used at all.
///
/// A single bad field inside an otherwise valid document is not an error; it
/// is logged and read as absent.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid document format: {0}")]
    InvalidFormat(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for feed document parsers.
pub trait Protocol {
    /// The value produced for one document.
    type Message;
    /// The error type for parsing failures.
    type Error;

    /// Parse one complete document.
    ///
    /// Returns `Ok(Some(message))` if parsing succeeded,
    /// `Ok(None)` if the input is blank (a decoder mid-rewrite),
    /// or `Err(error)` if the document is unusable.
    fn parse(&mut self, input: &[u8]) -> Result<Option<Self::Message>, Self::Error>;
}
