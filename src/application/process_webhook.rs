//! ProcessWebhookHandler - The webhook pipeline orchestrator.
//!
//! Sequences verification, classification, identity extraction, the
//! processed-session gate, and reconciliation. No directory mutation
//! happens unless verification and eligibility both succeeded.

use std::sync::Arc;

use crate::domain::{
    extract_identity, EligibilityTargets, LineItem, MatchReason, NameFieldMatcher,
    PurchaseSession, WebhookError,
};
use crate::ports::{
    EventVerifier, ProcessedSessionStore, ReconciliationResult, SessionLookup,
};

use super::reconcile_contact::{PurchaseDetails, ReconcileContactHandler};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,

    /// Signature header value.
    pub signature: String,
}

/// Terminal outcome of a successfully handled delivery.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The purchaser was reconciled into the directory.
    Reconciled(ReconciliationResult),

    /// The event was acknowledged without touching the directory.
    Skipped { reason: String },
}

/// Handler orchestrating the webhook pipeline.
pub struct ProcessWebhookHandler {
    verifier: Arc<dyn EventVerifier>,
    session_lookup: Arc<dyn SessionLookup>,
    processed_sessions: Arc<dyn ProcessedSessionStore>,
    reconciler: ReconcileContactHandler,
    targets: EligibilityTargets,
    name_field: NameFieldMatcher,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: Arc<dyn EventVerifier>,
        session_lookup: Arc<dyn SessionLookup>,
        processed_sessions: Arc<dyn ProcessedSessionStore>,
        reconciler: ReconcileContactHandler,
        targets: EligibilityTargets,
        name_field: NameFieldMatcher,
    ) -> Self {
        Self {
            verifier,
            session_lookup,
            processed_sessions,
            reconciler,
            targets,
            name_field,
        }
    }

    /// Run one delivery through the pipeline.
    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessOutcome, WebhookError> {
        // 1. Verify signature and parse the event
        let event = self.verifier.verify(&cmd.payload, &cmd.signature)?;

        // 2. Only completed checkouts are considered
        if !event.is_checkout_completed() {
            tracing::info!(event_kind = %event.kind, "Event kind not handled, skipping");
            return Ok(ProcessOutcome::Skipped {
                reason: format!("Event kind {} not handled", event.kind),
            });
        }

        let session = event.session.ok_or_else(|| {
            WebhookError::ParseError("Checkout event carried no session object".to_string())
        })?;

        // 3. Classify against the tracked product
        let Some(reason) = self.classify(&session).await? else {
            tracing::info!(
                session_id = %session.id,
                metadata = ?session.metadata,
                "Purchase is not for the tracked product, skipping"
            );
            return Ok(ProcessOutcome::Skipped {
                reason: "Not a tracked product purchase".to_string(),
            });
        };
        tracing::info!(session_id = %session.id, matched = ?reason, "Tracked purchase detected");

        // 4. Extract the customer identity
        let identity = extract_identity(&session, &self.name_field)?;

        // 5. Dedup gate: redelivered sessions never reach the directory
        if self.processed_sessions.contains(&session.id).await {
            tracing::info!(session_id = %session.id, "Session already processed, skipping");
            return Ok(ProcessOutcome::Skipped {
                reason: "Session already processed".to_string(),
            });
        }

        // 6. Reconcile into the directory
        let purchase = PurchaseDetails {
            amount: session.amount_major_units(),
            date: chrono::Utc::now().to_rfc3339(),
            session_id: session.id.clone(),
        };

        let result = self.reconciler.handle(&identity, &purchase).await?;

        self.processed_sessions.mark_processed(&session.id).await;

        tracing::info!(
            session_id = %session.id,
            contact_id = %result.contact_id,
            action = ?result.action,
            email = %identity.email,
            "Customer reconciled into directory"
        );

        Ok(ProcessOutcome::Reconciled(result))
    }

    /// Try the eligibility strategies in priority order.
    ///
    /// Returns the matching reason, or `None` when no strategy fires. Only
    /// the line-item strategy touches the network, and only when the
    /// earlier strategies missed and item targets are configured.
    async fn classify(
        &self,
        session: &PurchaseSession,
    ) -> Result<Option<MatchReason>, WebhookError> {
        if let Some(reason) = self.targets.metadata_match(session) {
            return Ok(Some(reason));
        }

        if !self.targets.has_item_targets() {
            return Ok(None);
        }

        let items = match &session.line_items {
            Some(items) => items.clone(),
            None => self.fetch_line_items(&session.id).await?,
        };

        Ok(self
            .targets
            .items_match(&items)
            .then_some(MatchReason::LineItem))
    }

    /// Fetch line items, retrying exactly once on transient failure.
    ///
    /// A final failure fails the whole request: silently skipping here
    /// would drop a legitimate eligible purchase.
    async fn fetch_line_items(&self, session_id: &str) -> Result<Vec<LineItem>, WebhookError> {
        match self.session_lookup.line_items(session_id).await {
            Ok(items) => Ok(items),
            Err(first) if first.is_transient() => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %first,
                    "Line item lookup failed, retrying once"
                );
                self.session_lookup
                    .line_items(session_id)
                    .await
                    .map_err(|e| WebhookError::LineItemLookupFailed(e.to_string()))
            }
            Err(err) => Err(WebhookError::LineItemLookupFailed(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomField, VerifiedEvent, CHECKOUT_COMPLETED};
    use crate::ports::{
        ContactDirectory, ContactDraft, ContactPatch, DirectoryContact, DirectoryError,
        LookupError, ReconciliationAction,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockVerifier {
        event: Option<VerifiedEvent>,
    }

    impl MockVerifier {
        fn with_event(event: VerifiedEvent) -> Self {
            Self { event: Some(event) }
        }

        fn failing() -> Self {
            Self { event: None }
        }
    }

    impl EventVerifier for MockVerifier {
        fn verify(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> Result<VerifiedEvent, WebhookError> {
            self.event
                .clone()
                .ok_or(WebhookError::InvalidSignature)
        }
    }

    struct MockSessionLookup {
        // One entry per call; `None` simulates a transient network failure.
        responses: Mutex<Vec<Option<Vec<LineItem>>>>,
        calls: AtomicU32,
    }

    impl MockSessionLookup {
        fn with_responses(responses: Vec<Option<Vec<LineItem>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn unused() -> Self {
            Self::with_responses(vec![])
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionLookup for MockSessionLookup {
        async fn line_items(&self, _session_id: &str) -> Result<Vec<LineItem>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LookupError::Network("no response configured".to_string()));
            }
            match responses.remove(0) {
                Some(items) => Ok(items),
                None => Err(LookupError::Network("connection reset".to_string())),
            }
        }
    }

    struct MockStore {
        seen: Mutex<std::collections::HashSet<String>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                seen: Mutex::new(std::collections::HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl ProcessedSessionStore for MockStore {
        async fn contains(&self, session_id: &str) -> bool {
            self.seen.lock().unwrap().contains(session_id)
        }

        async fn mark_processed(&self, session_id: &str) {
            self.seen.lock().unwrap().insert(session_id.to_string());
        }
    }

    struct MockDirectory {
        created: Mutex<Vec<ContactDraft>>,
        patched: Mutex<Vec<(String, ContactPatch)>>,
        searches: AtomicU32,
        fail_create_status: Option<u16>,
    }

    impl MockDirectory {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                patched: Mutex::new(Vec::new()),
                searches: AtomicU32::new(0),
                fail_create_status: None,
            }
        }

        fn failing_create(status: u16) -> Self {
            Self {
                fail_create_status: Some(status),
                ..Self::new()
            }
        }

        fn call_count(&self) -> u32 {
            self.searches.load(Ordering::SeqCst)
                + self.created.lock().unwrap().len() as u32
                + self.patched.lock().unwrap().len() as u32
        }

        fn created(&self) -> Vec<ContactDraft> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContactDirectory for MockDirectory {
        async fn search_by_email(
            &self,
            _email: &str,
        ) -> Result<Vec<DirectoryContact>, DirectoryError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn create(&self, draft: &ContactDraft) -> Result<DirectoryContact, DirectoryError> {
            if let Some(status) = self.fail_create_status {
                return Err(DirectoryError::Api {
                    status,
                    body: "create rejected".to_string(),
                });
            }
            self.created.lock().unwrap().push(draft.clone());
            Ok(DirectoryContact {
                id: "contact-new".to_string(),
                ..Default::default()
            })
        }

        async fn patch(
            &self,
            contact_id: &str,
            patch: &ContactPatch,
        ) -> Result<DirectoryContact, DirectoryError> {
            self.patched
                .lock()
                .unwrap()
                .push((contact_id.to_string(), patch.clone()));
            Ok(DirectoryContact {
                id: contact_id.to_string(),
                ..Default::default()
            })
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    const LABEL: &str = "custom.tracked";

    fn targets() -> EligibilityTargets {
        EligibilityTargets {
            label_key: "Label".to_string(),
            label_code: Some("RT2025".to_string()),
            label_phrase_key: "Wix Label".to_string(),
            label_phrase: None,
            product_id: Some("prod_X".to_string()),
            price_id: None,
        }
    }

    fn checkout_event(session: PurchaseSession) -> VerifiedEvent {
        VerifiedEvent {
            id: "evt_1".to_string(),
            kind: CHECKOUT_COMPLETED.to_string(),
            session: Some(session),
        }
    }

    fn eligible_session() -> PurchaseSession {
        PurchaseSession {
            id: "cs_123".to_string(),
            customer_email: Some("a@b.com".to_string()),
            display_name: Some("A B".to_string()),
            amount_total: Some(4999),
            metadata: HashMap::from([("product_id".to_string(), "prod_X".to_string())]),
            ..Default::default()
        }
    }

    fn command() -> ProcessWebhookCommand {
        ProcessWebhookCommand {
            payload: b"{}".to_vec(),
            signature: "t=0,v1=00".to_string(),
        }
    }

    struct Fixture {
        handler: ProcessWebhookHandler,
        directory: Arc<MockDirectory>,
        lookup: Arc<MockSessionLookup>,
    }

    fn fixture(verifier: MockVerifier, lookup: MockSessionLookup) -> Fixture {
        fixture_with_directory(verifier, lookup, MockDirectory::new())
    }

    fn fixture_with_directory(
        verifier: MockVerifier,
        lookup: MockSessionLookup,
        directory: MockDirectory,
    ) -> Fixture {
        let directory = Arc::new(directory);
        let lookup = Arc::new(lookup);
        let handler = ProcessWebhookHandler::new(
            Arc::new(verifier),
            lookup.clone(),
            Arc::new(MockStore::new()),
            ReconcileContactHandler::new(directory.clone(), LABEL),
            targets(),
            NameFieldMatcher::new("firstname", "Last name"),
        );
        Fixture {
            handler,
            directory,
            lookup,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_signature_stops_the_pipeline() {
        let f = fixture(MockVerifier::failing(), MockSessionLookup::unused());

        let result = f.handler.handle(command()).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert_eq!(f.directory.call_count(), 0);
        assert_eq!(f.lookup.calls(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Classification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn other_event_kinds_are_acknowledged_and_skipped() {
        let event = VerifiedEvent {
            id: "evt_2".to_string(),
            kind: "invoice.paid".to_string(),
            session: None,
        };
        let f = fixture(MockVerifier::with_event(event), MockSessionLookup::unused());

        let outcome = f.handler.handle(command()).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Skipped { .. }));
        assert_eq!(f.directory.call_count(), 0);
    }

    #[tokio::test]
    async fn session_without_signals_is_skipped() {
        let session = PurchaseSession {
            id: "cs_other".to_string(),
            customer_email: Some("a@b.com".to_string()),
            metadata: HashMap::from([("Label".to_string(), "OTHER".to_string())]),
            // Present-but-unmatching items keep strategy 3 local.
            line_items: Some(vec![LineItem {
                product_id: Some("prod_other".to_string()),
                price_id: None,
            }]),
            ..Default::default()
        };
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::unused(),
        );

        let outcome = f.handler.handle(command()).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Skipped { .. }));
        assert_eq!(f.directory.call_count(), 0);
        assert_eq!(f.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn metadata_match_skips_the_line_item_lookup() {
        let f = fixture(
            MockVerifier::with_event(checkout_event(eligible_session())),
            MockSessionLookup::unused(),
        );

        let outcome = f.handler.handle(command()).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Reconciled(_)));
        assert_eq!(f.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn line_item_lookup_classifies_when_metadata_is_silent() {
        let session = PurchaseSession {
            metadata: HashMap::new(),
            line_items: None,
            ..eligible_session()
        };
        let items = vec![LineItem {
            product_id: Some("prod_X".to_string()),
            price_id: None,
        }];
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::with_responses(vec![Some(items)]),
        );

        let outcome = f.handler.handle(command()).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Reconciled(_)));
        assert_eq!(f.lookup.calls(), 1);
        assert_eq!(f.directory.created().len(), 1);
    }

    #[tokio::test]
    async fn transient_lookup_failure_is_retried_once() {
        let session = PurchaseSession {
            metadata: HashMap::new(),
            line_items: None,
            ..eligible_session()
        };
        let items = vec![LineItem {
            product_id: Some("prod_X".to_string()),
            price_id: None,
        }];
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::with_responses(vec![None, Some(items)]),
        );

        let outcome = f.handler.handle(command()).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::Reconciled(_)));
        assert_eq!(f.lookup.calls(), 2);
    }

    #[tokio::test]
    async fn persistent_lookup_failure_fails_the_request() {
        let session = PurchaseSession {
            metadata: HashMap::new(),
            line_items: None,
            ..eligible_session()
        };
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::with_responses(vec![None, None]),
        );

        let result = f.handler.handle(command()).await;

        assert!(matches!(result, Err(WebhookError::LineItemLookupFailed(_))));
        assert_eq!(f.lookup.calls(), 2);
        assert_eq!(f.directory.call_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Identity Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_email_fails_before_any_directory_call() {
        let session = PurchaseSession {
            customer_email: None,
            details_email: None,
            ..eligible_session()
        };
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::unused(),
        );

        let result = f.handler.handle(command()).await;

        assert!(matches!(result, Err(WebhookError::MissingEmail)));
        assert_eq!(f.directory.call_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Reconciliation and Dedup Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn eligible_purchase_creates_a_labeled_contact() {
        let f = fixture(
            MockVerifier::with_event(checkout_event(eligible_session())),
            MockSessionLookup::unused(),
        );

        let outcome = f.handler.handle(command()).await.unwrap();

        match outcome {
            ProcessOutcome::Reconciled(result) => {
                assert_eq!(result.action, ReconciliationAction::Created);
            }
            other => panic!("Expected reconciled outcome, got {:?}", other),
        }

        let created = f.directory.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].email, "a@b.com");
        assert_eq!(created[0].first_name, "A");
        assert_eq!(created[0].last_name, "B");
        assert_eq!(created[0].label_key, LABEL);
    }

    #[tokio::test]
    async fn redelivered_session_is_skipped_without_directory_calls() {
        let f = fixture(
            MockVerifier::with_event(checkout_event(eligible_session())),
            MockSessionLookup::unused(),
        );

        let first = f.handler.handle(command()).await.unwrap();
        assert!(matches!(first, ProcessOutcome::Reconciled(_)));
        let calls_after_first = f.directory.call_count();

        let second = f.handler.handle(command()).await.unwrap();
        assert!(matches!(second, ProcessOutcome::Skipped { .. }));
        assert_eq!(f.directory.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn directory_failure_surfaces_and_session_stays_unmarked() {
        let f = fixture_with_directory(
            MockVerifier::with_event(checkout_event(eligible_session())),
            MockSessionLookup::unused(),
            MockDirectory::failing_create(500),
        );

        let result = f.handler.handle(command()).await;
        assert!(matches!(result, Err(WebhookError::Directory { .. })));

        // The session was not recorded, so the redelivery retries the write.
        let retry = f.handler.handle(command()).await;
        assert!(matches!(retry, Err(WebhookError::Directory { .. })));
    }

    #[tokio::test]
    async fn structured_last_name_field_reaches_the_draft() {
        let session = PurchaseSession {
            display_name: Some("Jane".to_string()),
            custom_fields: vec![CustomField {
                key: "firstname".to_string(),
                label: Some("Last name".to_string()),
                value: Some("Public".to_string()),
            }],
            ..eligible_session()
        };
        let f = fixture(
            MockVerifier::with_event(checkout_event(session)),
            MockSessionLookup::unused(),
        );

        f.handler.handle(command()).await.unwrap();

        let created = f.directory.created();
        assert_eq!(created[0].first_name, "Jane");
        assert_eq!(created[0].last_name, "Public");
    }
}
