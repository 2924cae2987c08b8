//! # Error Handling - Flat, String-Based Error Taxonomy
//!
//! This module provides the error type used across all Prism stores. The
//! taxonomy is deliberately flat: every failure carries a plain message
//! string, because store consumers render messages directly and never
//! branch on structured error data.
//!
//! ## 🎯 Design Philosophy
//!
//! Prism's error handling is designed to be:
//! - **Flat**: One enum, four categories, no nested sources
//! - **Presentable**: Every message is ready for display as-is
//! - **Predictable**: Validation never mixes with remote failures
//!
//! ## 📊 Error Categories
//!
//! | Error Type | When It Occurs | Where It Lands |
//! |------------|----------------|----------------|
//! | `Validation` | Local shape rule failure (empty, separator, too long) | Returned to the caller, never a store's error state |
//! | `NotFound` | Remote lookup succeeded but matched nothing | Store `Status::Error` |
//! | `Remote` | Transport failure or non-2xx response | Store `Status::Error` |
//! | `Generic` | Anything else, coerced to its message | Store `Status::Error` |
//!
//! ## 🔧 Using Errors in Stores
//!
//! Stores call [`PrismError::message`] when committing a failure, so the
//! category collapses to its string at the store boundary - `NotFound` and
//! a malformed payload both end up as `Status::Error` with a message. The
//! category exists for callers that handle errors *before* they reach a
//! store, like validation.

/// Error type for Prism store operations
///
/// Four flat categories, each wrapping a display-ready message. There is no
/// retry taxonomy: failures surface immediately and recovery is always a
/// fresh `load` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrismError {
    /// Local shape rule failure, caught before any remote call
    ///
    /// Use this for input that fails validation (empty, forbidden
    /// separator, too long). Validation errors are returned to the caller
    /// and never reach a store's error state.
    Validation(String),

    /// Remote lookup succeeded, but no result matched
    ///
    /// Non-2xx responses from the package registry also map here, since
    /// the registry contract treats them all as not-found.
    NotFound(String),

    /// Transport failure or unusable remote response
    Remote(String),

    /// General-purpose error for other scenarios
    ///
    /// Use this for errors that don't fit the other categories. Try to be
    /// specific in the error message.
    Generic(String),
}

impl PrismError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        PrismError::Validation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        PrismError::NotFound(msg.into())
    }

    /// Create a new remote error
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        PrismError::Remote(msg.into())
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        PrismError::Generic(msg.into())
    }

    /// Get the error message as a string slice
    pub fn message(&self) -> &str {
        match self {
            PrismError::Validation(msg) => msg,
            PrismError::NotFound(msg) => msg,
            PrismError::Remote(msg) => msg,
            PrismError::Generic(msg) => msg,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            PrismError::Validation(_) => "validation",
            PrismError::NotFound(_) => "not_found",
            PrismError::Remote(_) => "remote",
            PrismError::Generic(_) => "generic",
        }
    }
}

impl std::fmt::Display for PrismError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrismError::Validation(msg) => write!(f, "Validation error: {msg}"),
            PrismError::NotFound(msg) => write!(f, "Not found: {msg}"),
            PrismError::Remote(msg) => write!(f, "Remote error: {msg}"),
            PrismError::Generic(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for PrismError {}

// Conversion traits for ergonomic error handling

impl From<&str> for PrismError {
    fn from(err: &str) -> Self {
        PrismError::Generic(err.to_string())
    }
}

impl From<String> for PrismError {
    fn from(err: String) -> Self {
        PrismError::Generic(err)
    }
}

impl From<reqwest::Error> for PrismError {
    fn from(err: reqwest::Error) -> Self {
        PrismError::Remote(err.to_string())
    }
}

impl From<serde_json::Error> for PrismError {
    fn from(err: serde_json::Error) -> Self {
        PrismError::Remote(format!("Malformed payload: {err}"))
    }
}

/// Convenient Result type alias for Prism operations
///
/// Wraps the standard `Result<T, E>` with [`PrismError`] as the error type.
/// It's the recommended return type for all Prism-related functions that
/// can fail.
pub type PrismResult<T> = Result<T, PrismError>;
