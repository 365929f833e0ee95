//! # Stale Lookup Guard
//!
//! Sequence tickets for counterparty balance lookups.
//!
//! ## The Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator selects customer A ──► lookup A starts (ticket 1)             │
//! │  Operator selects customer B ──► lookup B starts (ticket 2)             │
//! │                                                                         │
//! │  Lookup B resolves first ──► ticket 2 is current ──► applied            │
//! │  Lookup A resolves late  ──► ticket 1 < current   ──► DISCARDED         │
//! │                                                                         │
//! │  Without the guard, A's balance would land on B's invoice.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A discarded result is logged and dropped; it never mutates the draft and
//! never surfaces as an error.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Monotonic ticket issuer; only the most recent ticket is current.
#[derive(Debug, Default)]
pub struct LookupGuard {
    seq: AtomicU64,
}

/// A ticket for one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket(u64);

impl LookupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup, invalidating every earlier ticket.
    pub fn begin(&self) -> LookupTicket {
        LookupTicket(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether this ticket is still the most recent lookup.
    pub fn is_current(&self, ticket: LookupTicket) -> bool {
        let current = self.seq.load(Ordering::SeqCst) == ticket.0;
        if !current {
            debug!(ticket = ticket.0, "stale lookup result discarded");
        }
        current
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
