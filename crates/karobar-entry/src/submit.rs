//! # Invoice Submission
//!
//! Drives an invoice draft through validation, the gateway call, and the
//! one-shot negative-stock override retry.
//!
//! ## Submission State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Submission Lifecycle                                │
//! │                                                                         │
//! │   Draft ──validate──► Submitting ──gateway──► Committed                 │
//! │     ▲                     │                                             │
//! │     │ validation          │ StockShortage                               │
//! │     │ failure             ▼                                             │
//! │     └──────── AwaitingOverrideConfirmation                              │
//! │                           │                                             │
//! │              confirm ─────┤───── decline ──► Draft (unchanged)          │
//! │                           ▼                                             │
//! │              retry with allowNegativeStock = true                       │
//! │                           │                                             │
//! │              ┌────────────┴────────────┐                                │
//! │              ▼                         ▼                                │
//! │          Committed                  Failed                              │
//! │          (warning names          (message verbatim,                     │
//! │           each shortage)          NO further retry)                     │
//! │                                                                         │
//! │  The override flag is request-scoped: it is never persisted and the     │
//! │  next submission starts at Draft with the flag off.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every gateway call runs under a timeout so a hung transport cannot strand
//! the entry in `Submitting` forever.
//!
//! The current state is published on a `watch` channel: the entry screen
//! reads it to lock fields while `Submitting` and to render the override
//! prompt while `AwaitingOverrideConfirmation`.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::api::{
    InvoiceGateway, PurchaseInvoicePayload, SalesInvoicePayload, StockShortage, SubmitReceipt,
};
use crate::error::{EntryResult, GatewayError};
use karobar_core::validation::{validate_purchase_submit, validate_sales_submit};
use karobar_core::{PurchaseInvoice, SalesInvoice};

/// Default gateway-call timeout.
const SUBMIT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Submission State
// =============================================================================

/// Where a submission currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmitState {
    /// Editable; nothing in flight.
    #[default]
    Draft,
    /// A gateway call is in flight. Entry is locked against edits.
    Submitting,
    /// The server reported a stock shortage; waiting on the operator to
    /// confirm or decline the negative-stock override.
    AwaitingOverrideConfirmation { items: Vec<StockShortage> },
    /// Committed server-side. Carries the operator-facing message.
    Committed { message: String },
    /// Rejected. The message is surfaced verbatim; resubmission is manual.
    Failed { message: String },
}

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub state: SubmitState,
    /// Server receipt, present only when committed.
    pub receipt: Option<SubmitReceipt>,
}

impl SubmitOutcome {
    fn committed(message: String, receipt: SubmitReceipt) -> Self {
        SubmitOutcome {
            state: SubmitState::Committed { message },
            receipt: Some(receipt),
        }
    }

    fn failed(message: String) -> Self {
        SubmitOutcome {
            state: SubmitState::Failed { message },
            receipt: None,
        }
    }
}

// =============================================================================
// Submitter
// =============================================================================

/// Runs submissions against a gateway.
///
/// Holds no draft state of its own; sessions own their drafts and hand them
/// here by reference. The lifecycle state of the submission in flight is
/// published via [`Submitter::current_state`] / [`Submitter::watch_state`].
pub struct Submitter<G> {
    gateway: G,
    call_timeout: Duration,
    state: watch::Sender<SubmitState>,
}

impl<G: InvoiceGateway> Submitter<G> {
    pub fn new(gateway: G) -> Self {
        Submitter {
            gateway,
            call_timeout: Duration::from_secs(SUBMIT_TIMEOUT_SECS),
            state: watch::channel(SubmitState::Draft).0,
        }
    }

    /// Overrides the per-call timeout. Test hook and slow-link tuning.
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// The lifecycle state of the submission in flight (or the outcome of
    /// the last one).
    pub fn current_state(&self) -> SubmitState {
        self.state.borrow().clone()
    }

    /// Subscribes to state transitions, for screens that react to
    /// `Submitting` / `AwaitingOverrideConfirmation` as they happen.
    pub fn watch_state(&self) -> watch::Receiver<SubmitState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: SubmitState) {
        // send_replace rather than send: transitions matter even with no
        // subscriber listening.
        self.state.send_replace(state);
    }

    /// Submits a sales invoice.
    ///
    /// On a stock shortage, calls `confirm_override` with the shortage list;
    /// a `true` return retries EXACTLY ONCE with the override flag set. Any
    /// failure of the retry is final.
    pub async fn submit_sales<F>(
        &self,
        draft: &SalesInvoice,
        confirm_override: F,
    ) -> EntryResult<SubmitOutcome>
    where
        F: FnOnce(&[StockShortage]) -> bool,
    {
        validate_sales_submit(draft)?;
        info!(customer = %draft.customer_code, lines = draft.lines.len(), "submitting sale");
        self.set_state(SubmitState::Submitting);

        let payload = SalesInvoicePayload::from_draft(draft, false);
        let outcome = match self.call_sales(&payload).await {
            Ok(receipt) => {
                SubmitOutcome::committed("Sale saved successfully.".to_string(), receipt)
            }
            Err(GatewayError::StockShortage { items }) => {
                warn!(count = items.len(), "sale blocked on stock shortage");
                self.set_state(SubmitState::AwaitingOverrideConfirmation {
                    items: items.clone(),
                });
                if !confirm_override(&items) {
                    info!("override declined, returning to draft");
                    self.set_state(SubmitState::Draft);
                    return Ok(SubmitOutcome {
                        state: SubmitState::Draft,
                        receipt: None,
                    });
                }
                self.set_state(SubmitState::Submitting);
                let payload = SalesInvoicePayload::from_draft(draft, true);
                match self.call_sales(&payload).await {
                    Ok(receipt) => {
                        SubmitOutcome::committed(override_message("Sale", &items), receipt)
                    }
                    Err(err) => SubmitOutcome::failed(err.to_string()),
                }
            }
            Err(err) => SubmitOutcome::failed(err.to_string()),
        };
        self.set_state(outcome.state.clone());
        Ok(outcome)
    }

    /// Submits a purchase invoice. Same protocol as sales, including the
    /// one-shot override retry.
    pub async fn submit_purchase<F>(
        &self,
        draft: &PurchaseInvoice,
        confirm_override: F,
    ) -> EntryResult<SubmitOutcome>
    where
        F: FnOnce(&[StockShortage]) -> bool,
    {
        validate_purchase_submit(draft)?;
        info!(supplier = %draft.supplier_code, lines = draft.lines.len(), "submitting purchase");
        self.set_state(SubmitState::Submitting);

        let payload = PurchaseInvoicePayload::from_draft(draft, false);
        let outcome = match self.call_purchase(&payload).await {
            Ok(receipt) => {
                SubmitOutcome::committed("Purchase saved successfully.".to_string(), receipt)
            }
            Err(GatewayError::StockShortage { items }) => {
                warn!(count = items.len(), "purchase blocked on stock shortage");
                self.set_state(SubmitState::AwaitingOverrideConfirmation {
                    items: items.clone(),
                });
                if !confirm_override(&items) {
                    self.set_state(SubmitState::Draft);
                    return Ok(SubmitOutcome {
                        state: SubmitState::Draft,
                        receipt: None,
                    });
                }
                self.set_state(SubmitState::Submitting);
                let payload = PurchaseInvoicePayload::from_draft(draft, true);
                match self.call_purchase(&payload).await {
                    Ok(receipt) => {
                        SubmitOutcome::committed(override_message("Purchase", &items), receipt)
                    }
                    Err(err) => SubmitOutcome::failed(err.to_string()),
                }
            }
            Err(err) => SubmitOutcome::failed(err.to_string()),
        };
        self.set_state(outcome.state.clone());
        Ok(outcome)
    }

    /// Submits a gated supplier payment.
    pub async fn submit_payment(
        &self,
        request: &karobar_core::PaymentRequest,
    ) -> EntryResult<SubmitOutcome> {
        info!(supplier = %request.supplier_code, amount = request.amount, "submitting payment");
        self.set_state(SubmitState::Submitting);
        let outcome = match timeout(self.call_timeout, self.gateway.post_supplier_payment(request))
            .await
        {
            Ok(Ok(receipt)) => {
                SubmitOutcome::committed("Payment recorded successfully.".to_string(), receipt)
            }
            Ok(Err(err)) => SubmitOutcome::failed(err.to_string()),
            Err(_) => {
                SubmitOutcome::failed(GatewayError::Timeout(self.call_timeout).to_string())
            }
        };
        self.set_state(outcome.state.clone());
        Ok(outcome)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    async fn call_sales(&self, payload: &SalesInvoicePayload) -> Result<SubmitReceipt, GatewayError> {
        match timeout(self.call_timeout, self.gateway.post_sales(payload)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.call_timeout)),
        }
    }

    async fn call_purchase(
        &self,
        payload: &PurchaseInvoicePayload,
    ) -> Result<SubmitReceipt, GatewayError> {
        match timeout(self.call_timeout, self.gateway.post_purchase(payload)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.call_timeout)),
        }
    }
}

/// Operator-facing message for an override commit, naming each shortage.
fn override_message(kind: &str, items: &[StockShortage]) -> String {
    let details: Vec<String> = items
        .iter()
        .map(|item| format!("{} (short by {:.2})", item.item_code, item.shortage))
        .collect();
    format!(
        "{} saved with negative stock for {}.",
        kind,
        details.join(", ")
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NegativeStockWarning;
    use crate::error::EntryError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use karobar_core::{PurchaseLine, SalesField, SalesLine};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Gateway that plays back a scripted response per call.
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<SubmitReceipt, GatewayError>>>,
        calls: AtomicUsize,
        overrides_seen: Mutex<Vec<bool>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<SubmitReceipt, GatewayError>>) -> Self {
            ScriptedGateway {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
                overrides_seen: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, override_flag: bool) -> Result<SubmitReceipt, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.overrides_seen.lock().unwrap().push(override_flag);
            self.responses.lock().unwrap().remove(0)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InvoiceGateway for ScriptedGateway {
        async fn post_sales(
            &self,
            payload: &SalesInvoicePayload,
        ) -> Result<SubmitReceipt, GatewayError> {
            self.next(payload.allow_negative_stock)
        }

        async fn post_purchase(
            &self,
            payload: &PurchaseInvoicePayload,
        ) -> Result<SubmitReceipt, GatewayError> {
            self.next(payload.allow_negative_stock)
        }

        async fn post_supplier_payment(
            &self,
            _payload: &karobar_core::PaymentRequest,
        ) -> Result<SubmitReceipt, GatewayError> {
            self.next(false)
        }

        async fn customer_balance(
            &self,
            _customer_code: &str,
        ) -> Result<crate::api::BalanceResponse, GatewayError> {
            unreachable!("not used in submit tests")
        }

        async fn supplier_payable(
            &self,
            _supplier_code: &str,
        ) -> Result<crate::api::PayableResponse, GatewayError> {
            unreachable!("not used in submit tests")
        }
    }

    fn sales_draft() -> SalesInvoice {
        let mut draft = SalesInvoice::new();
        draft.select_customer("C001", "C001 — Ahmed Stores");
        draft.select_salesman("SM01", "SM01 — Imran");
        draft.date = NaiveDate::from_ymd_opt(2025, 3, 14);
        let mut line = SalesLine::new("IT001", "Rice 5kg");
        line.apply_edit(SalesField::Quantity, "10").unwrap();
        line.apply_edit(SalesField::TradePrice, "100").unwrap();
        draft.add_line(line);
        draft
    }

    fn purchase_draft() -> PurchaseInvoice {
        let mut draft = PurchaseInvoice::new();
        draft.select_supplier("S001", "S001 — Karachi Wholesale");
        draft.invoice_no = "INV-4471".into();
        draft.date = NaiveDate::from_ymd_opt(2025, 3, 14);
        let mut line = PurchaseLine::new("IT002", "Tea 250g");
        line.quantity = 5.0;
        line.purchase_rate = 40.0;
        draft.add_line(line);
        draft
    }

    fn shortage() -> GatewayError {
        GatewayError::StockShortage {
            items: vec![StockShortage {
                item_code: "IT001".into(),
                shortage: 4.0,
            }],
        }
    }

    #[tokio::test]
    async fn test_clean_sale_commits_first_try() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![Ok(SubmitReceipt::default())]));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| panic!("no shortage expected"))
            .await
            .unwrap();

        assert_eq!(
            outcome.state,
            SubmitState::Committed {
                message: "Sale saved successfully.".into()
            }
        );
        assert_eq!(submitter.gateway().calls(), 1);
        assert_eq!(*submitter.gateway().overrides_seen.lock().unwrap(), vec![false]);
    }

    #[tokio::test]
    async fn test_shortage_confirmed_retries_once_with_flag() {
        let receipt = SubmitReceipt {
            next_invoice: None,
            warnings: Some(NegativeStockWarning {
                kind: "NEGATIVE_STOCK".into(),
                items: vec![StockShortage {
                    item_code: "IT001".into(),
                    shortage: 4.0,
                }],
            }),
        };
        let submitter =
            Submitter::new(ScriptedGateway::new(vec![Err(shortage()), Ok(receipt)]));

        let outcome = submitter
            .submit_sales(&sales_draft(), |items| {
                assert_eq!(items[0].item_code, "IT001");
                true
            })
            .await
            .unwrap();

        match outcome.state {
            SubmitState::Committed { message } => {
                assert_eq!(message, "Sale saved with negative stock for IT001 (short by 4.00).");
            }
            other => panic!("expected Committed, got {other:?}"),
        }
        assert_eq!(submitter.gateway().calls(), 2);
        // First attempt without the flag, retry with it.
        assert_eq!(
            *submitter.gateway().overrides_seen.lock().unwrap(),
            vec![false, true]
        );
    }

    #[tokio::test]
    async fn test_shortage_declined_returns_to_draft() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![Err(shortage())]));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| false)
            .await
            .unwrap();

        assert_eq!(outcome.state, SubmitState::Draft);
        assert!(outcome.receipt.is_none());
        assert_eq!(submitter.gateway().calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_failure_is_final_no_second_retry() {
        // Even a second shortage on the retry must not loop.
        let submitter = Submitter::new(ScriptedGateway::new(vec![
            Err(shortage()),
            Err(shortage()),
        ]));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| true)
            .await
            .unwrap();

        assert!(matches!(outcome.state, SubmitState::Failed { .. }));
        assert_eq!(submitter.gateway().calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_fails_verbatim_without_retry() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![Err(GatewayError::Transport(
            "Customer ledger is locked.".into(),
        ))]));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| panic!("no shortage expected"))
            .await
            .unwrap();

        assert_eq!(
            outcome.state,
            SubmitState::Failed {
                message: "Customer ledger is locked.".into()
            }
        );
        assert_eq!(submitter.gateway().calls(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_call() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![]));
        let mut draft = sales_draft();
        draft.clear_lines();

        let err = submitter
            .submit_sales(&draft, |_| panic!("never reached"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EntryError::Validation(karobar_core::ValidationError::NoLines)
        ));
        assert_eq!(submitter.gateway().calls(), 0);
    }

    #[tokio::test]
    async fn test_purchase_override_protocol_mirrors_sales() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![
            Err(GatewayError::StockShortage {
                items: vec![StockShortage {
                    item_code: "IT002".into(),
                    shortage: 1.5,
                }],
            }),
            Ok(SubmitReceipt::default()),
        ]));

        let outcome = submitter
            .submit_purchase(&purchase_draft(), |_| true)
            .await
            .unwrap();

        match outcome.state {
            SubmitState::Committed { message } => {
                assert_eq!(
                    message,
                    "Purchase saved with negative stock for IT002 (short by 1.50)."
                );
            }
            other => panic!("expected Committed, got {other:?}"),
        }
        assert_eq!(
            *submitter.gateway().overrides_seen.lock().unwrap(),
            vec![false, true]
        );
    }

    #[tokio::test]
    async fn test_timeout_fails_submission() {
        struct HangingGateway;

        #[async_trait]
        impl InvoiceGateway for HangingGateway {
            async fn post_sales(
                &self,
                _payload: &SalesInvoicePayload,
            ) -> Result<SubmitReceipt, GatewayError> {
                std::future::pending().await
            }
            async fn post_purchase(
                &self,
                _payload: &PurchaseInvoicePayload,
            ) -> Result<SubmitReceipt, GatewayError> {
                std::future::pending().await
            }
            async fn post_supplier_payment(
                &self,
                _payload: &karobar_core::PaymentRequest,
            ) -> Result<SubmitReceipt, GatewayError> {
                std::future::pending().await
            }
            async fn customer_balance(
                &self,
                _customer_code: &str,
            ) -> Result<crate::api::BalanceResponse, GatewayError> {
                std::future::pending().await
            }
            async fn supplier_payable(
                &self,
                _supplier_code: &str,
            ) -> Result<crate::api::PayableResponse, GatewayError> {
                std::future::pending().await
            }
        }

        let submitter =
            Submitter::new(HangingGateway).with_timeout(Duration::from_millis(10));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| false)
            .await
            .unwrap();

        assert_eq!(
            outcome.state,
            SubmitState::Failed {
                message: "Request timed out after 10ms".into()
            }
        );
    }

    #[tokio::test]
    async fn test_submitting_state_visible_during_gateway_call() {
        // Gateway that reads the published state at the moment it is called.
        struct StateReadingGateway {
            rx: Mutex<Option<tokio::sync::watch::Receiver<SubmitState>>>,
            seen: Mutex<Vec<SubmitState>>,
        }

        impl StateReadingGateway {
            fn record(&self) {
                if let Some(rx) = self.rx.lock().unwrap().as_ref() {
                    self.seen.lock().unwrap().push(rx.borrow().clone());
                }
            }
        }

        #[async_trait]
        impl InvoiceGateway for StateReadingGateway {
            async fn post_sales(
                &self,
                _payload: &SalesInvoicePayload,
            ) -> Result<SubmitReceipt, GatewayError> {
                self.record();
                Ok(SubmitReceipt::default())
            }
            async fn post_purchase(
                &self,
                _payload: &PurchaseInvoicePayload,
            ) -> Result<SubmitReceipt, GatewayError> {
                self.record();
                Ok(SubmitReceipt::default())
            }
            async fn post_supplier_payment(
                &self,
                _payload: &karobar_core::PaymentRequest,
            ) -> Result<SubmitReceipt, GatewayError> {
                self.record();
                Ok(SubmitReceipt::default())
            }
            async fn customer_balance(
                &self,
                _customer_code: &str,
            ) -> Result<crate::api::BalanceResponse, GatewayError> {
                unreachable!("not used here")
            }
            async fn supplier_payable(
                &self,
                _supplier_code: &str,
            ) -> Result<crate::api::PayableResponse, GatewayError> {
                unreachable!("not used here")
            }
        }

        let submitter = Submitter::new(StateReadingGateway {
            rx: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        });
        *submitter.gateway().rx.lock().unwrap() = Some(submitter.watch_state());
        assert_eq!(submitter.current_state(), SubmitState::Draft);

        let outcome = submitter
            .submit_sales(&sales_draft(), |_| false)
            .await
            .unwrap();

        // While the call was in flight the published state was Submitting;
        // afterwards it settles on the outcome.
        assert_eq!(
            *submitter.gateway().seen.lock().unwrap(),
            vec![SubmitState::Submitting]
        );
        assert_eq!(submitter.current_state(), outcome.state);
    }

    #[tokio::test]
    async fn test_awaiting_override_state_spans_operator_decision() {
        let submitter =
            Submitter::new(ScriptedGateway::new(vec![Err(shortage()), Ok(SubmitReceipt::default())]));

        let outcome = submitter
            .submit_sales(&sales_draft(), |items| {
                // The operator prompt is open: the machine sits in
                // AwaitingOverrideConfirmation carrying the shortage list.
                match submitter.current_state() {
                    SubmitState::AwaitingOverrideConfirmation { items: pending } => {
                        assert_eq!(pending.len(), items.len());
                        assert_eq!(pending[0].item_code, "IT001");
                    }
                    other => panic!("expected AwaitingOverrideConfirmation, got {other:?}"),
                }
                true
            })
            .await
            .unwrap();

        assert!(matches!(outcome.state, SubmitState::Committed { .. }));
        assert_eq!(submitter.current_state(), outcome.state);
    }

    #[tokio::test]
    async fn test_declined_override_publishes_draft_state() {
        let submitter = Submitter::new(ScriptedGateway::new(vec![Err(shortage())]));
        let outcome = submitter
            .submit_sales(&sales_draft(), |_| false)
            .await
            .unwrap();

        assert_eq!(outcome.state, SubmitState::Draft);
        assert_eq!(submitter.current_state(), SubmitState::Draft);
    }
}
