//! # Entry Sessions
//!
//! One session per entry screen: sales, purchase, supplier payment. Each
//! owns its draft, the lookup guard for its counterparty fetches, and a
//! [`Submitter`] over the gateway.
//!
//! ## Thread Safety
//! The draft is wrapped in `Arc<Mutex<T>>` because:
//! 1. Field-change events and lookup completions land concurrently
//! 2. Only one event may modify the draft at a time
//! 3. The lock is NEVER held across an await - lookups clone what they
//!    need, await, then re-acquire to apply (guarded against staleness)
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select_customer("C002")                                                │
//! │    │                                                                    │
//! │    ├─ lock: draft.select_customer()   (paid/balance reset immediately)  │
//! │    ├─ ticket = guard.begin()                                            │
//! │    ├─ unlock                                                            │
//! │    ├─ await gateway.customer_balance("C002")                            │
//! │    ├─ lock: guard.is_current(ticket)?                                   │
//! │    │     yes ─► draft.apply_balance(fetched)                            │
//! │    │     no  ─► drop result (a newer selection owns the draft)          │
//! │    └─ unlock                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::debug;

use crate::api::{InvoiceGateway, StockShortage};
use crate::error::EntryResult;
use crate::lookup::LookupGuard;
use crate::submit::{SubmitOutcome, SubmitState, Submitter};
use karobar_core::{
    PayableSnapshot, PaymentDraft, PurchaseInvoice, PurchaseTotals, SalesInvoice, SalesTotals,
};

// =============================================================================
// Sales Session
// =============================================================================

/// State behind the sales entry screen.
pub struct SalesSession<G> {
    draft: Arc<Mutex<SalesInvoice>>,
    guard: LookupGuard,
    submitter: Submitter<G>,
}

impl<G: InvoiceGateway> SalesSession<G> {
    pub fn new(submitter: Submitter<G>) -> Self {
        SalesSession {
            draft: Arc::new(Mutex::new(SalesInvoice::new())),
            guard: LookupGuard::new(),
            submitter,
        }
    }

    /// Runs a closure with exclusive access to the draft.
    ///
    /// This is how field-change events reach the invoice: lock, mutate,
    /// unlock. Callers must not await inside the closure (they cannot -
    /// the closure is synchronous).
    pub fn with_draft<R>(&self, f: impl FnOnce(&mut SalesInvoice) -> R) -> R {
        let mut draft = self.draft.lock().expect("Sales draft mutex poisoned");
        f(&mut draft)
    }

    /// Current totals for the summary panel.
    pub fn totals(&self) -> SalesTotals {
        self.with_draft(|draft| draft.totals())
    }

    /// Lifecycle state of the submission in flight, for field locking and
    /// the override prompt.
    pub fn submit_state(&self) -> SubmitState {
        self.submitter.current_state()
    }

    /// Selects a customer and fetches their ledger balance.
    ///
    /// Payment fields reset immediately; the balance lands only if no newer
    /// selection superseded this one while the fetch was in flight. A failed
    /// fetch leaves the baseline at zero rather than blocking entry.
    pub async fn select_customer(&self, code: &str, display: &str) {
        let ticket = self.with_draft(|draft| {
            draft.select_customer(code, display);
            self.guard.begin()
        });

        match self.submitter.gateway().customer_balance(code).await {
            Ok(response) => self.with_draft(|draft| {
                if self.guard.is_current(ticket) && draft.customer_code == code {
                    draft.apply_balance(response.balance);
                }
            }),
            Err(err) => {
                debug!(customer = code, error = %err, "balance lookup failed, baseline stays 0");
            }
        }
    }

    /// Submits the draft; on commit the session resets for the next sale.
    pub async fn submit<F>(&self, confirm_override: F) -> EntryResult<SubmitOutcome>
    where
        F: FnOnce(&[StockShortage]) -> bool,
    {
        let draft = self.with_draft(|draft| draft.clone());
        let outcome = self.submitter.submit_sales(&draft, confirm_override).await?;
        if matches!(outcome.state, SubmitState::Committed { .. }) {
            self.with_draft(|draft| draft.reset());
        }
        Ok(outcome)
    }
}

// =============================================================================
// Purchase Session
// =============================================================================

/// State behind the purchase entry screen.
///
/// No balance auto-fetch here: the previous balance is typed by the operator
/// from the supplier's statement, so there is no lookup race to guard.
pub struct PurchaseSession<G> {
    draft: Arc<Mutex<PurchaseInvoice>>,
    submitter: Submitter<G>,
}

impl<G: InvoiceGateway> PurchaseSession<G> {
    pub fn new(submitter: Submitter<G>) -> Self {
        PurchaseSession {
            draft: Arc::new(Mutex::new(PurchaseInvoice::new())),
            submitter,
        }
    }

    /// Runs a closure with exclusive access to the draft.
    pub fn with_draft<R>(&self, f: impl FnOnce(&mut PurchaseInvoice) -> R) -> R {
        let mut draft = self.draft.lock().expect("Purchase draft mutex poisoned");
        f(&mut draft)
    }

    /// Current totals for the summary panel.
    pub fn totals(&self) -> PurchaseTotals {
        self.with_draft(|draft| draft.totals())
    }

    /// Lifecycle state of the submission in flight.
    pub fn submit_state(&self) -> SubmitState {
        self.submitter.current_state()
    }

    /// Submits the draft; on commit the session resets, keeping the
    /// supplier's issued next-invoice number on display for the operator.
    pub async fn submit<F>(&self, confirm_override: F) -> EntryResult<SubmitOutcome>
    where
        F: FnOnce(&[StockShortage]) -> bool,
    {
        let draft = self.with_draft(|draft| draft.clone());
        let outcome = self
            .submitter
            .submit_purchase(&draft, confirm_override)
            .await?;
        if matches!(outcome.state, SubmitState::Committed { .. }) {
            let next_invoice = outcome
                .receipt
                .as_ref()
                .and_then(|receipt| receipt.next_invoice.clone());
            self.with_draft(|draft| {
                draft.reset();
                if let Some(next) = next_invoice {
                    draft.last_invoice = next;
                }
            });
        }
        Ok(outcome)
    }
}

// =============================================================================
// Payment Session
// =============================================================================

/// State behind the supplier payment screen.
///
/// Holds the last fetched payable snapshot alongside the draft; the gate
/// always runs against the snapshot for the CURRENTLY selected supplier.
pub struct PaymentSession<G> {
    state: Arc<Mutex<PaymentState>>,
    guard: LookupGuard,
    submitter: Submitter<G>,
}

#[derive(Default)]
struct PaymentState {
    draft: PaymentDraft,
    snapshot: Option<PayableSnapshot>,
}

impl<G: InvoiceGateway> PaymentSession<G> {
    pub fn new(submitter: Submitter<G>) -> Self {
        PaymentSession {
            state: Arc::new(Mutex::new(PaymentState::default())),
            guard: LookupGuard::new(),
            submitter,
        }
    }

    /// Runs a closure with exclusive access to the draft.
    pub fn with_draft<R>(&self, f: impl FnOnce(&mut PaymentDraft) -> R) -> R {
        let mut state = self.state.lock().expect("Payment state mutex poisoned");
        f(&mut state.draft)
    }

    /// The payable snapshot for the selected supplier, if fetched.
    pub fn snapshot(&self) -> Option<PayableSnapshot> {
        self.state.lock().expect("Payment state mutex poisoned").snapshot.clone()
    }

    /// Lifecycle state of the submission in flight.
    pub fn submit_state(&self) -> SubmitState {
        self.submitter.current_state()
    }

    /// Selects a supplier, fetches their payable position, and pre-fills
    /// the amount from it (unless the operator already typed a diverging
    /// amount).
    pub async fn select_supplier(&self, code: &str, label: &str) {
        let ticket = {
            let mut state = self.state.lock().expect("Payment state mutex poisoned");
            state.snapshot = None;
            self.guard.begin()
        };

        match self.submitter.gateway().supplier_payable(code).await {
            Ok(response) => {
                let snapshot: PayableSnapshot = response.into();
                let mut state = self.state.lock().expect("Payment state mutex poisoned");
                if self.guard.is_current(ticket) {
                    state.draft.select_supplier(code, label, snapshot.payable);
                    state.snapshot = Some(snapshot);
                }
            }
            Err(err) => {
                debug!(supplier = code, error = %err, "payable lookup failed");
                let mut state = self.state.lock().expect("Payment state mutex poisoned");
                if self.guard.is_current(ticket) {
                    state.draft.select_supplier(code, label, 0.0);
                }
            }
        }
    }

    /// Gates the draft and submits the payment.
    ///
    /// Validation failures surface as [`crate::EntryError::Validation`]
    /// with no network call. On commit the draft resets to cash defaults
    /// and the snapshot clears, forcing a fresh fetch for the next payment.
    pub async fn submit(&self, today: NaiveDate) -> EntryResult<SubmitOutcome> {
        let request = {
            let state = self.state.lock().expect("Payment state mutex poisoned");
            let snapshot = state.snapshot.clone().unwrap_or_default();
            state.draft.gate(&snapshot, today)?
        };

        let outcome = self.submitter.submit_payment(&request).await?;
        if matches!(outcome.state, SubmitState::Committed { .. }) {
            let mut state = self.state.lock().expect("Payment state mutex poisoned");
            state.draft.reset();
            state.snapshot = None;
        }
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
