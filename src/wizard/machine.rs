// src/wizard/machine.rs

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::draft::ListingDraft;
use crate::models::listing::ListingKind;

/// Where a vendor lands after a listing is accepted for review.
pub const LIST_SUCCESS_PATH: &str = "/dashboard/vendor/list-success";
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to submit listing";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Step {} ({label}) is incomplete", .step + 1)]
    StepIncomplete { step: usize, label: &'static str },

    #[error("Listings can only be submitted from the last step")]
    NotOnLastStep,

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("Invalid draft patch: {0}")]
    InvalidPatch(String),

    #[error("Unknown draft field '{0}'")]
    UnknownField(String),

    #[error("This edit is not available for {} listings", .0.label())]
    UnsupportedAction(ListingKind),

    #[error("'{value}' is not a valid {field} option")]
    UnknownTag { field: &'static str, value: String },

    #[error("A listing can have at most {0} photos")]
    ImageLimit(usize),

    #[error("Nothing at position {0}")]
    IndexOutOfRange(usize),
}

impl WizardError {
    pub fn status(&self) -> StatusCode {
        match self {
            WizardError::StepIncomplete { .. } | WizardError::ImageLimit(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WizardError::NotOnLastStep | WizardError::AlreadySubmitting => StatusCode::CONFLICT,
            WizardError::InvalidPatch(_)
            | WizardError::UnknownField(_)
            | WizardError::UnsupportedAction(_)
            | WizardError::UnknownTag { .. }
            | WizardError::IndexOutOfRange(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// ---
// Submission seam
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub listing_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub message: String,
}

impl SubmitFailure {
    /// Uses the backend's message when it sent one.
    pub fn from_message(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SUBMIT_FALLBACK_MESSAGE.to_string());
        Self { message }
    }
}

/// Sends a finished draft to the creation endpoint for its kind.
#[async_trait]
pub trait ListingSubmitter: Send + Sync {
    async fn submit(&self, kind: ListingKind, draft: Value) -> Result<SubmitReceipt, SubmitFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmitOutcome {
    #[serde(rename_all = "camelCase")]
    Submitted { listing_id: Uuid, redirect_to: String },
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    Moved(usize),
    Cancelled,
}

// ---
// Wizard state
// ---

/// One vendor's walk through a listing form.
#[derive(Debug, Clone)]
pub struct Wizard<D> {
    step: usize,
    draft: D,
    submission_error: Option<String>,
    is_submitting: bool,
    touched: BTreeSet<String>,
}

impl<D: ListingDraft> Default for Wizard<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ListingDraft> Wizard<D> {
    pub fn new() -> Self {
        Self {
            step: 0,
            draft: D::default(),
            submission_error: None,
            is_submitting: false,
            touched: BTreeSet::new(),
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn total_steps(&self) -> usize {
        D::STEPS.len()
    }

    pub fn step_label(&self) -> &'static str {
        D::STEPS.get(self.step).copied().unwrap_or_default()
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 == D::STEPS.len()
    }

    pub fn can_advance(&self, step: usize) -> bool {
        self.draft.step_complete(step)
    }

    /// Progress through the form as a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        let total = D::STEPS.len().max(1);
        let pct = ((self.step + 1) * 100 + total / 2) / total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    /// Shallow merge of `patch` into the draft.
    ///
    /// Keys must name draft fields. If the merged value does not fit the
    /// draft's types, the draft is left untouched.
    pub fn update_draft(&mut self, patch: &Value) -> Result<(), WizardError> {
        let Value::Object(patch) = patch else {
            return Err(WizardError::InvalidPatch("expected a JSON object".into()));
        };

        let mut merged = serde_json::to_value(&self.draft)
            .map_err(|e| WizardError::InvalidPatch(e.to_string()))?;
        let Value::Object(fields) = &mut merged else {
            return Err(WizardError::InvalidPatch("draft is not an object".into()));
        };

        for (key, value) in patch {
            if !fields.contains_key(key) {
                return Err(WizardError::UnknownField(key.clone()));
            }
            fields.insert(key.clone(), value.clone());
        }

        self.draft = serde_json::from_value(merged).map_err(|e| WizardError::InvalidPatch(e.to_string()))?;
        self.touched.extend(patch.keys().cloned());
        Ok(())
    }

    pub fn apply(&mut self, action: super::DraftAction) -> Result<bool, WizardError> {
        self.draft.apply(action)
    }

    pub fn touch(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    /// Inline errors, only for fields the vendor has already interacted with.
    pub fn visible_errors(&self) -> BTreeMap<String, &'static str> {
        self.touched
            .iter()
            .filter_map(|field| self.draft.field_issue(field).map(|msg| (field.clone(), msg)))
            .collect()
    }

    /// Moves forward when the current step is complete. Never passes the last step.
    pub fn advance(&mut self) -> bool {
        if self.is_last_step() || !self.can_advance(self.step) {
            return false;
        }
        self.step += 1;
        true
    }

    /// Moves back one step, or runs `on_cancel` when already on the first one.
    pub fn retreat(&mut self, on_cancel: impl FnOnce()) -> Retreat {
        if self.step == 0 {
            on_cancel();
            return Retreat::Cancelled;
        }
        self.step -= 1;
        Retreat::Moved(self.step)
    }

    pub fn begin_submit(&mut self) -> Result<D, WizardError> {
        if self.is_submitting {
            return Err(WizardError::AlreadySubmitting);
        }
        if !self.is_last_step() {
            return Err(WizardError::NotOnLastStep);
        }
        if !self.can_advance(self.step) {
            return Err(WizardError::StepIncomplete {
                step: self.step,
                label: self.step_label(),
            });
        }
        self.is_submitting = true;
        self.submission_error = None;
        Ok(self.draft.clone())
    }

    /// Same as [`Wizard::begin_submit`], with the draft already encoded as the request body.
    pub fn begin_submit_json(&mut self) -> Result<Value, WizardError> {
        let draft = self.begin_submit()?;
        match serde_json::to_value(&draft) {
            Ok(body) => Ok(body),
            Err(e) => {
                self.finish_submit(Err(SubmitFailure::from_message(None)));
                Err(WizardError::InvalidPatch(e.to_string()))
            }
        }
    }

    pub fn finish_submit(&mut self, result: Result<SubmitReceipt, SubmitFailure>) -> SubmitOutcome {
        self.is_submitting = false;
        match result {
            Ok(receipt) => SubmitOutcome::Submitted {
                listing_id: receipt.listing_id,
                redirect_to: LIST_SUCCESS_PATH.to_string(),
            },
            Err(failure) => {
                self.submission_error = Some(failure.message.clone());
                SubmitOutcome::Failed { message: failure.message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Mutex};

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::{
        models::{kitchen::PriceRange, IdDocumentType},
        wizard::{KitchenDraft, PropertyDraft, VenueDraft},
    };

    struct RecordingSubmitter {
        result: Result<SubmitReceipt, SubmitFailure>,
        calls: Mutex<Vec<(ListingKind, Value)>>,
    }

    impl RecordingSubmitter {
        fn returning(result: Result<SubmitReceipt, SubmitFailure>) -> Self {
            Self { result, calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ListingSubmitter for RecordingSubmitter {
        async fn submit(&self, kind: ListingKind, draft: Value) -> Result<SubmitReceipt, SubmitFailure> {
            self.calls.lock().unwrap().push((kind, draft));
            self.result.clone()
        }
    }

    // Same sequence `WizardStore::submit` runs, minus the lock.
    async fn submit_through<D: ListingDraft>(
        wizard: &mut Wizard<D>,
        submitter: &dyn ListingSubmitter,
    ) -> SubmitOutcome {
        let body = wizard.begin_submit_json().unwrap();
        assert!(wizard.is_submitting());
        let result = submitter.submit(D::KIND, body).await;
        wizard.finish_submit(result)
    }

    fn owner_patch() -> Value {
        json!({
            "ownerName": "Ravi Kumar",
            "ownerPhone": "9123456780",
            "ownerEmail": "ravi@example.com",
            "idType": "pan",
            "idNumber": "ABCDE1234F",
            "agreeToTerms": true,
        })
    }

    fn kitchen_ready_for_submit() -> Wizard<KitchenDraft> {
        let mut wizard = Wizard::<KitchenDraft>::new();
        wizard.update_draft(&json!({ "name": "Spice Route" })).unwrap();
        assert!(wizard.advance());
        wizard
            .update_draft(&json!({
                "location": "12 Park Street", "city": "Kolkata", "state": "West Bengal", "pincode": "700016"
            }))
            .unwrap();
        assert!(wizard.advance());
        wizard
            .update_draft(&json!({ "cuisine": ["chinese", "north_indian"], "priceRange": "moderate" }))
            .unwrap();
        assert!(wizard.advance());
        wizard.update_draft(&json!({ "images": ["/uploads/front.jpg"] })).unwrap();
        assert!(wizard.advance());
        wizard
            .update_draft(&json!({ "description": "Family restaurant serving Indo-Chinese favourites since 1998." }))
            .unwrap();
        assert!(wizard.advance());
        wizard.update_draft(&owner_patch()).unwrap();
        wizard
    }

    #[test]
    fn fresh_wizard_starts_on_first_step() {
        let wizard = Wizard::<PropertyDraft>::new();
        assert_eq!(wizard.step(), 0);
        assert_eq!(wizard.step_label(), "Property Type");
        assert_eq!(wizard.total_steps(), 11);
        assert_eq!(wizard.progress_percent(), 9);
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.draft().bedrooms, 1);
    }

    #[test]
    fn advance_is_gated_by_step_predicate() {
        let mut wizard = Wizard::<PropertyDraft>::new();
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), 0);

        wizard.update_draft(&json!({ "propertyType": "villa" })).unwrap();
        assert!(wizard.advance());
        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn advance_never_passes_last_step() {
        let mut wizard = kitchen_ready_for_submit();
        assert!(wizard.is_last_step());
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), 5);
        assert_eq!(wizard.progress_percent(), 100);
    }

    #[test]
    fn retreat_from_first_step_cancels() {
        let mut wizard = Wizard::<VenueDraft>::new();
        let cancels = Cell::new(0u32);
        assert_eq!(wizard.retreat(|| cancels.set(cancels.get() + 1)), Retreat::Cancelled);
        assert_eq!(wizard.retreat(|| cancels.set(cancels.get() + 1)), Retreat::Cancelled);
        assert_eq!(cancels.get(), 2);
        assert_eq!(wizard.step(), 0);
    }

    #[test]
    fn retreat_moves_back_without_touching_draft() {
        let mut wizard = Wizard::<VenueDraft>::new();
        wizard.update_draft(&json!({ "name": "Rose Garden" })).unwrap();
        assert!(wizard.advance());
        assert_eq!(wizard.retreat(|| panic!("must not cancel")), Retreat::Moved(0));
        assert_eq!(wizard.draft().name, "Rose Garden");
    }

    #[test]
    fn patch_with_unknown_key_is_rejected() {
        let mut wizard = Wizard::<PropertyDraft>::new();
        assert_eq!(
            wizard.update_draft(&json!({ "colour": "blue" })),
            Err(WizardError::UnknownField("colour".into()))
        );
    }

    #[test]
    fn ill_typed_patch_leaves_draft_unchanged() {
        let mut wizard = Wizard::<PropertyDraft>::new();
        wizard.update_draft(&json!({ "title": "Lake view cottage" })).unwrap();
        let result = wizard.update_draft(&json!({ "title": "Changed", "bedrooms": "many" }));
        assert!(matches!(result, Err(WizardError::InvalidPatch(_))));
        assert_eq!(wizard.draft().title, "Lake view cottage");
        assert_eq!(wizard.draft().bedrooms, 1);
    }

    #[test]
    fn patch_merges_shallowly() {
        let mut wizard = Wizard::<VenueDraft>::new();
        wizard.update_draft(&json!({ "foodTypes": ["veg"] })).unwrap();
        wizard.update_draft(&json!({ "foodTypes": ["jain"], "price": 75000 })).unwrap();
        assert_eq!(wizard.draft().food_types, vec!["jain".to_string()]);
        assert_eq!(wizard.draft().price, Decimal::from(75_000));
    }

    #[test]
    fn errors_show_only_for_touched_fields() {
        let mut wizard = Wizard::<PropertyDraft>::new();
        assert!(wizard.visible_errors().is_empty());
        wizard.touch("ownerPhone");
        wizard.update_draft(&json!({ "title": "short" })).unwrap();
        let errors = wizard.visible_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("ownerPhone"));

        wizard.update_draft(&json!({ "ownerPhone": "9876543210" })).unwrap();
        assert!(!wizard.visible_errors().contains_key("ownerPhone"));
    }

    #[test]
    fn submit_requires_last_step() {
        let mut wizard = Wizard::<KitchenDraft>::new();
        assert_eq!(wizard.begin_submit().unwrap_err(), WizardError::NotOnLastStep);
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn submit_requires_complete_last_step() {
        let mut wizard = kitchen_ready_for_submit();
        wizard.update_draft(&json!({ "agreeToTerms": false })).unwrap();
        assert_eq!(
            wizard.begin_submit().unwrap_err(),
            WizardError::StepIncomplete { step: 5, label: "Verification" }
        );
    }

    #[test]
    fn second_submit_while_pending_is_refused() {
        let mut wizard = kitchen_ready_for_submit();
        let draft = wizard.begin_submit().unwrap();
        assert_eq!(draft.price_range, Some(PriceRange::Moderate));
        assert_eq!(draft.owner.id_type, Some(IdDocumentType::Pan));
        assert!(wizard.is_submitting());
        assert_eq!(wizard.begin_submit().unwrap_err(), WizardError::AlreadySubmitting);
    }

    #[tokio::test]
    async fn successful_submit_redirects_to_success_page() {
        let mut wizard = kitchen_ready_for_submit();
        let listing_id = Uuid::new_v4();
        let submitter = RecordingSubmitter::returning(Ok(SubmitReceipt { listing_id }));

        let outcome = submit_through(&mut wizard, &submitter).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Submitted { listing_id, redirect_to: LIST_SUCCESS_PATH.to_string() }
        );
        assert!(!wizard.is_submitting());

        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ListingKind::Restaurant);
        assert_eq!(calls[0].1["name"], "Spice Route");
        assert_eq!(calls[0].1["city"], "Kolkata");
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft_and_records_message() {
        let mut wizard = kitchen_ready_for_submit();
        let submitter = RecordingSubmitter::returning(Err(SubmitFailure::from_message(Some(
            "Owner phone already registered".into(),
        ))));

        let outcome = submit_through(&mut wizard, &submitter).await;
        assert_eq!(outcome, SubmitOutcome::Failed { message: "Owner phone already registered".into() });
        assert_eq!(wizard.submission_error(), Some("Owner phone already registered"));
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.step(), 5);
        assert_eq!(wizard.draft().name, "Spice Route");
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        assert_eq!(SubmitFailure::from_message(None).message, SUBMIT_FALLBACK_MESSAGE);
        assert_eq!(SubmitFailure::from_message(Some("  ".into())).message, SUBMIT_FALLBACK_MESSAGE);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(WizardError::NotOnLastStep.status(), StatusCode::CONFLICT);
        assert_eq!(
            WizardError::StepIncomplete { step: 0, label: "Basic Details" }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(WizardError::UnknownField("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WizardError::StepIncomplete { step: 2, label: "Location" }.to_string(),
            "Step 3 (Location) is incomplete"
        );
    }
}
