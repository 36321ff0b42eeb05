// src/wizard.rs
//
// Multi-step listing creation. `draft` holds the per-kind forms and their
// step predicates, `machine` the step/submit state, `store` the per-vendor
// wizards kept between requests.

pub mod draft;
pub mod machine;
pub mod store;

pub use draft::{
    DraftAction, KitchenDraft, ListingDraft, LocationFields, MenuItemDraft, OwnerVerification, PackageDraft,
    PropertyDraft, TagField, VenueDraft,
};
pub use machine::{ListingSubmitter, SubmitFailure, SubmitOutcome, SubmitReceipt, WizardError};
pub use store::{RetreatOutcome, SubmitResult, WizardStore, WizardView};
