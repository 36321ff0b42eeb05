// src/wizard/store.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    draft::{DraftAction, KitchenDraft, PropertyDraft, VenueDraft},
    machine::{ListingSubmitter, Retreat, SubmitFailure, SubmitOutcome, SubmitReceipt, Wizard, WizardError},
};
use crate::{common::error::AppError, models::listing::ListingKind};

/// Where a vendor lands after backing out of the first wizard step.
pub const LIST_PROPERTY_PATH: &str = "/dashboard/vendor/list-property";

const DEFAULT_IDLE_HOURS: i64 = 12;

/// A wizard of any listing kind.
#[derive(Debug, Clone)]
pub enum AnyWizard {
    Flat(Wizard<PropertyDraft>),
    Garden(Wizard<VenueDraft>),
    Restaurant(Wizard<KitchenDraft>),
}

macro_rules! dispatch {
    ($wizard:expr, $w:ident => $body:expr) => {
        match $wizard {
            AnyWizard::Flat($w) => $body,
            AnyWizard::Garden($w) => $body,
            AnyWizard::Restaurant($w) => $body,
        }
    };
}

impl AnyWizard {
    pub fn new(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Flat => AnyWizard::Flat(Wizard::new()),
            ListingKind::Garden => AnyWizard::Garden(Wizard::new()),
            ListingKind::Restaurant => AnyWizard::Restaurant(Wizard::new()),
        }
    }

    pub fn kind(&self) -> ListingKind {
        match self {
            AnyWizard::Flat(_) => ListingKind::Flat,
            AnyWizard::Garden(_) => ListingKind::Garden,
            AnyWizard::Restaurant(_) => ListingKind::Restaurant,
        }
    }

    pub fn update_draft(&mut self, patch: &Value) -> Result<(), WizardError> {
        dispatch!(self, w => w.update_draft(patch))
    }

    pub fn apply(&mut self, action: DraftAction) -> Result<bool, WizardError> {
        dispatch!(self, w => w.apply(action))
    }

    pub fn touch(&mut self, field: &str) {
        dispatch!(self, w => w.touch(field))
    }

    pub fn advance(&mut self) -> bool {
        dispatch!(self, w => w.advance())
    }

    pub fn retreat(&mut self, on_cancel: impl FnOnce()) -> Retreat {
        dispatch!(self, w => w.retreat(on_cancel))
    }

    pub fn begin_submit(&mut self) -> Result<Value, WizardError> {
        dispatch!(self, w => w.begin_submit_json())
    }

    pub fn is_submitting(&self) -> bool {
        dispatch!(self, w => w.is_submitting())
    }

    pub fn finish_submit(&mut self, result: Result<SubmitReceipt, SubmitFailure>) -> SubmitOutcome {
        dispatch!(self, w => w.finish_submit(result))
    }

    pub fn view(&self, id: Uuid) -> WizardView {
        let kind = self.kind();
        dispatch!(self, w => WizardView {
            id,
            kind,
            step: w.step(),
            step_label: w.step_label(),
            total_steps: w.total_steps(),
            progress: w.progress_percent(),
            can_advance: w.can_advance(w.step()),
            is_last_step: w.is_last_step(),
            is_submitting: w.is_submitting(),
            submission_error: w.submission_error().map(str::to_string),
            draft: serde_json::to_value(w.draft()).unwrap_or_default(),
            errors: w.visible_errors(),
        })
    }
}

/// What the client renders for the current step.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: Uuid,
    pub kind: ListingKind,
    pub step: usize,
    #[schema(example = "Location")]
    pub step_label: &'static str,
    pub total_steps: usize,
    #[schema(example = 27)]
    pub progress: u8,
    pub can_advance: bool,
    pub is_last_step: bool,
    pub is_submitting: bool,
    pub submission_error: Option<String>,
    #[schema(value_type = Object)]
    pub draft: Value,
    pub errors: BTreeMap<String, &'static str>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetreatOutcome {
    pub cancelled: bool,
    pub redirect_to: Option<&'static str>,
    pub wizard: Option<WizardView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub outcome: SubmitOutcome,
    /// Still present when the submission failed and can be retried.
    pub wizard: Option<WizardView>,
}

#[derive(Debug)]
struct WizardEntry {
    owner: Uuid,
    wizard: AnyWizard,
    last_used: DateTime<Utc>,
}

/// In-progress wizards, keyed by wizard id and scoped to the vendor that started them.
#[derive(Debug, Clone)]
pub struct WizardStore {
    entries: Arc<Mutex<HashMap<Uuid, WizardEntry>>>,
    idle_ttl: Duration,
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_IDLE_HOURS))
    }
}

impl WizardStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn entry_mut<'a>(
        entries: &'a mut HashMap<Uuid, WizardEntry>,
        owner: Uuid,
        id: Uuid,
    ) -> Result<&'a mut WizardEntry, AppError> {
        match entries.get_mut(&id) {
            Some(entry) if entry.owner == owner => {
                entry.last_used = Utc::now();
                Ok(entry)
            }
            _ => Err(AppError::NotFound("wizard")),
        }
    }

    // Like `entry_mut`, for changes that must wait until an in-flight submission settles.
    fn idle_entry_mut<'a>(
        entries: &'a mut HashMap<Uuid, WizardEntry>,
        owner: Uuid,
        id: Uuid,
    ) -> Result<&'a mut WizardEntry, AppError> {
        let entry = Self::entry_mut(entries, owner, id)?;
        if entry.wizard.is_submitting() {
            return Err(WizardError::AlreadySubmitting.into());
        }
        Ok(entry)
    }

    pub async fn start(&self, owner: Uuid, kind: ListingKind) -> WizardView {
        let mut entries = self.entries.lock().await;

        let cutoff = Utc::now() - self.idle_ttl;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_used > cutoff);
        if entries.len() < before {
            tracing::debug!(pruned = before - entries.len(), "dropped idle wizards");
        }

        let id = Uuid::new_v4();
        let wizard = AnyWizard::new(kind);
        let view = wizard.view(id);
        entries.insert(id, WizardEntry { owner, wizard, last_used: Utc::now() });

        tracing::info!(wizard_id = %id, vendor_id = %owner, kind = ?kind, "listing wizard started");
        view
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<WizardView, AppError> {
        let mut entries = self.entries.lock().await;
        let entry = Self::entry_mut(&mut entries, owner, id)?;
        Ok(entry.wizard.view(id))
    }

    /// Runs an edit against the wizard and returns its result with the updated view.
    pub async fn edit<T>(
        &self,
        owner: Uuid,
        id: Uuid,
        edit: impl FnOnce(&mut AnyWizard) -> Result<T, WizardError>,
    ) -> Result<(T, WizardView), AppError> {
        let mut entries = self.entries.lock().await;
        let entry = Self::idle_entry_mut(&mut entries, owner, id)?;
        let value = edit(&mut entry.wizard)?;
        Ok((value, entry.wizard.view(id)))
    }

    pub async fn retreat(&self, owner: Uuid, id: Uuid) -> Result<RetreatOutcome, AppError> {
        let mut entries = self.entries.lock().await;
        let entry = Self::idle_entry_mut(&mut entries, owner, id)?;
        let retreat = entry
            .wizard
            .retreat(|| tracing::info!(wizard_id = %id, "listing wizard cancelled"));
        let view = entry.wizard.view(id);

        match retreat {
            Retreat::Cancelled => {
                entries.remove(&id);
                Ok(RetreatOutcome {
                    cancelled: true,
                    redirect_to: Some(LIST_PROPERTY_PATH),
                    wizard: None,
                })
            }
            Retreat::Moved(_) => Ok(RetreatOutcome {
                cancelled: false,
                redirect_to: None,
                wizard: Some(view),
            }),
        }
    }

    pub async fn discard(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut entries = self.entries.lock().await;
        Self::idle_entry_mut(&mut entries, owner, id)?;
        entries.remove(&id);
        Ok(())
    }

    /// Submits the wizard's draft.
    ///
    /// The lock is released while the submitter runs; the wizard's own
    /// `is_submitting` flag keeps a second submit from starting meanwhile.
    pub async fn submit(
        &self,
        owner: Uuid,
        id: Uuid,
        submitter: &dyn ListingSubmitter,
    ) -> Result<SubmitResult, AppError> {
        let (kind, body) = {
            let mut entries = self.entries.lock().await;
            let entry = Self::entry_mut(&mut entries, owner, id)?;
            let body = entry.wizard.begin_submit()?;
            (entry.wizard.kind(), body)
        };

        let result = submitter.submit(kind, body).await;

        let mut entries = self.entries.lock().await;
        let entry = Self::entry_mut(&mut entries, owner, id)?;
        let outcome = entry.wizard.finish_submit(result);
        let view = entry.wizard.view(id);

        let wizard = match &outcome {
            SubmitOutcome::Submitted { listing_id, .. } => {
                tracing::info!(wizard_id = %id, listing_id = %listing_id, "listing submitted for review");
                entries.remove(&id);
                None
            }
            SubmitOutcome::Failed { message } => {
                tracing::warn!(wizard_id = %id, %message, "listing submission failed");
                Some(view)
            }
        };

        Ok(SubmitResult { outcome, wizard })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::wizard::machine::LIST_SUCCESS_PATH;

    struct FixedSubmitter(Result<SubmitReceipt, SubmitFailure>);

    #[async_trait]
    impl ListingSubmitter for FixedSubmitter {
        async fn submit(&self, _kind: ListingKind, _draft: Value) -> Result<SubmitReceipt, SubmitFailure> {
            self.0.clone()
        }
    }

    /// Holds the submission open until released, then fails it.
    #[derive(Default)]
    struct GatedSubmitter {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ListingSubmitter for GatedSubmitter {
        async fn submit(&self, _kind: ListingKind, _draft: Value) -> Result<SubmitReceipt, SubmitFailure> {
            self.started.notify_one();
            self.release.notified().await;
            Err(SubmitFailure::from_message(Some("server said no".into())))
        }
    }

    async fn kitchen_on_last_step(store: &WizardStore, owner: Uuid) -> Uuid {
        let id = store.start(owner, ListingKind::Restaurant).await.id;
        let patches = [
            json!({ "name": "Tandoor House" }),
            json!({ "location": "5 Mall Road", "city": "Shimla", "state": "Himachal Pradesh", "pincode": "171001" }),
            json!({ "cuisine": ["north_indian"], "priceRange": "budget" }),
            json!({ "images": ["/uploads/t.jpg"] }),
            json!({ "description": "Clay-oven breads and kebabs on the Mall, open late every evening." }),
        ];
        for patch in patches {
            let (advanced, _) = store
                .edit(owner, id, |w| {
                    w.update_draft(&patch)?;
                    Ok(w.advance())
                })
                .await
                .unwrap();
            assert!(advanced);
        }
        store
            .edit(owner, id, |w| {
                w.update_draft(&json!({
                    "ownerName": "Meera Singh",
                    "ownerPhone": "9988776655",
                    "ownerEmail": "meera@example.com",
                    "idType": "passport",
                    "idNumber": "Z1234567",
                    "agreeToTerms": true,
                }))
            })
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn wizards_are_scoped_to_their_owner() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let view = store.start(owner, ListingKind::Garden).await;
        assert_eq!(view.total_steps, 9);
        assert_eq!(view.step_label, "Basic Details");

        assert!(store.get(owner, view.id).await.is_ok());
        assert!(matches!(
            store.get(Uuid::new_v4(), view.id).await,
            Err(AppError::NotFound("wizard"))
        ));
    }

    #[tokio::test]
    async fn failed_edit_surfaces_wizard_error() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let id = store.start(owner, ListingKind::Flat).await.id;
        let result = store.edit(owner, id, |w| w.update_draft(&json!({ "nope": 1 }))).await;
        assert!(matches!(result, Err(AppError::Wizard(WizardError::UnknownField(_)))));
    }

    #[tokio::test]
    async fn retreat_from_first_step_discards_wizard() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let id = store.start(owner, ListingKind::Flat).await.id;

        let outcome = store.retreat(owner, id).await.unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.redirect_to, Some(LIST_PROPERTY_PATH));
        assert!(store.get(owner, id).await.is_err());
    }

    #[tokio::test]
    async fn successful_submit_removes_wizard() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let id = kitchen_on_last_step(&store, owner).await;
        let listing_id = Uuid::new_v4();

        let result = store
            .submit(owner, id, &FixedSubmitter(Ok(SubmitReceipt { listing_id })))
            .await
            .unwrap();
        assert_eq!(
            result.outcome,
            SubmitOutcome::Submitted { listing_id, redirect_to: LIST_SUCCESS_PATH.to_string() }
        );
        assert!(result.wizard.is_none());
        assert!(store.get(owner, id).await.is_err());
    }

    #[tokio::test]
    async fn failed_submit_keeps_wizard_for_retry() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let id = kitchen_on_last_step(&store, owner).await;

        let failure = SubmitFailure::from_message(None);
        let result = store.submit(owner, id, &FixedSubmitter(Err(failure))).await.unwrap();
        let view = result.wizard.unwrap();
        assert_eq!(view.submission_error.as_deref(), Some("Failed to submit listing"));
        assert!(!view.is_submitting);
        assert_eq!(view.step, 5);
    }

    #[tokio::test]
    async fn wizard_is_frozen_while_submission_is_in_flight() {
        let store = WizardStore::default();
        let owner = Uuid::new_v4();
        let id = kitchen_on_last_step(&store, owner).await;
        let submitter = Arc::new(GatedSubmitter::default());

        let pending = tokio::spawn({
            let store = store.clone();
            let submitter = submitter.clone();
            async move { store.submit(owner, id, submitter.as_ref()).await }
        });
        submitter.started.notified().await;

        assert!(store.get(owner, id).await.unwrap().is_submitting);
        assert!(matches!(
            store.retreat(owner, id).await,
            Err(AppError::Wizard(WizardError::AlreadySubmitting))
        ));
        assert!(matches!(
            store.edit(owner, id, |w| w.update_draft(&json!({ "name": "Other Place" }))).await,
            Err(AppError::Wizard(WizardError::AlreadySubmitting))
        ));
        assert!(matches!(
            store.discard(owner, id).await,
            Err(AppError::Wizard(WizardError::AlreadySubmitting))
        ));
        assert!(matches!(
            store.submit(owner, id, &FixedSubmitter(Ok(SubmitReceipt { listing_id: Uuid::new_v4() }))).await,
            Err(AppError::Wizard(WizardError::AlreadySubmitting))
        ));

        submitter.release.notify_one();
        let result = pending.await.unwrap().unwrap();
        let view = result.wizard.unwrap();
        assert_eq!(view.step, 5);
        assert!(view.is_last_step);
        assert!(!view.is_submitting);
        assert_eq!(view.submission_error.as_deref(), Some("server said no"));
        assert_eq!(view.draft["name"], "Tandoor House");

        assert!(store.retreat(owner, id).await.is_ok());
    }

    #[tokio::test]
    async fn idle_wizards_are_pruned_on_start() {
        let store = WizardStore::new(Duration::zero());
        let owner = Uuid::new_v4();
        let stale = store.start(owner, ListingKind::Flat).await.id;
        store.start(owner, ListingKind::Garden).await;
        assert!(store.get(owner, stale).await.is_err());
    }
}
