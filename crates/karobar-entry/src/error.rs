//! # Entry Error Types
//!
//! Error taxonomy for the entry layer.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Entry Error Categories                              │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  ValidationError │  │  StockShortage   │  │  Transport/Timeout   │  │
//! │  │  (karobar-core)  │  │                  │  │                      │  │
//! │  │                  │  │  Typed variant   │  │  Fatal for the       │  │
//! │  │  Caught before   │  │  carrying the    │  │  current submission; │  │
//! │  │  any network     │  │  shortage items; │  │  message surfaced    │  │
//! │  │  call            │  │  retryable       │  │  verbatim, manual    │  │
//! │  │                  │  │  EXACTLY ONCE    │  │  resubmission only   │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  Coercion fallback is NOT an error (see karobar-core::numeric).         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::api::StockShortage;
use karobar_core::ValidationError;

/// Result type alias for entry operations.
pub type EntryResult<T> = Result<T, EntryError>;

// =============================================================================
// Gateway Error
// =============================================================================

/// Failures of a gateway call.
///
/// ## Design Note
/// Insufficient stock is a TYPED variant, not a payload shape to probe.
/// The HTTP client implementing [`crate::api::InvoiceGateway`] decodes the
/// server's `data.code == "LOW_STOCK"` body into it once, at the wire
/// boundary; everything above matches on the variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Server rejected the submission for insufficient stock.
    ///
    /// Carries the itemized shortage list so the retry outcome can name
    /// each item. Retryable exactly once with the override flag.
    #[error("Insufficient stock for {} item(s)", items.len())]
    StockShortage { items: Vec<StockShortage> },

    /// Any other rejected request. The message is surfaced verbatim.
    #[error("{0}")]
    Transport(String),

    /// The call did not resolve within the submission timeout.
    ///
    /// Carries the configured timeout itself so sub-second test timeouts
    /// render as "10ms" rather than a truncated zero.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// True only for the one error variant with engine-driven recovery.
    pub fn is_stock_shortage(&self) -> bool {
        matches!(self, GatewayError::StockShortage { .. })
    }

    /// Decodes a server error body into the typed variant.
    ///
    /// Gateway implementations call this at the wire boundary so the
    /// LOW_STOCK special case lives in exactly one place.
    pub fn from_error_body(body: &serde_json::Value, fallback: &str) -> GatewayError {
        let code = body
            .pointer("/data/code")
            .and_then(serde_json::Value::as_str);
        if code == Some("LOW_STOCK") {
            let items = body
                .pointer("/warnings/items")
                .cloned()
                .and_then(|items| serde_json::from_value(items).ok())
                .unwrap_or_default();
            return GatewayError::StockShortage { items };
        }
        let message = body
            .pointer("/message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(fallback);
        GatewayError::Transport(message.to_string())
    }
}

// =============================================================================
// Entry Error
// =============================================================================

/// What the host UI sees from an entry operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    /// Client-side invariant violation; no network call was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Gateway failure, including a failed override retry.
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

// =============================================================================
// Unit Tests
// =============================================================================
