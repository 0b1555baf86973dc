//! Internal error type for the map façade (component C7). Never observed
//! outside `map` itself — every public operation collapses it to the
//! boolean/sentinel shape spec.md §6-7 requires, logging the reason at
//! `debug` level first.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    InvalidArgument(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    Ambiguous(&'static str),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            MapError::NotFound(msg) => write!(f, "not found: {}", msg),
            MapError::Conflict(msg) => write!(f, "conflict: {}", msg),
            MapError::Ambiguous(msg) => write!(f, "ambiguous: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

pub type MapResult<T> = Result<T, MapError>;
