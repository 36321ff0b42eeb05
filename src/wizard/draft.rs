// src/wizard/draft.rs
//
// Drafts collected by the listing wizard. The same structs are the JSON
// bodies accepted by the creation endpoints, so field names match what the
// client sends (`ownerPhone`, `agreeToTerms`, ...).

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::WizardError;
use crate::models::{
    kitchen::PriceRange,
    listing::ListingKind,
    property::{ListingStatus, PlaceType, PropertyType},
    IdDocumentType,
};

pub const MAX_IMAGES: usize = 10;
pub const MAX_ROOMS: i32 = 20;
pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 80;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

pub const SECURITY_FEATURES: &[&str] = &[
    "cctv_exterior",
    "cctv_interior",
    "security_guard",
    "intercom",
    "smart_lock",
    "fire_alarm",
    "fire_extinguisher",
    "weapon",
];

/// Security features that must be disclosed to tenants before booking.
pub const DISCLOSURE_REQUIRED: &[&str] = &["cctv_interior", "weapon"];

pub const FOOD_TYPES: &[&str] = &["veg", "non_veg", "jain", "chinese", "continental", "indian"];

pub const DECORATION_TYPES: &[&str] = &["floral", "theme", "royal", "minimal", "traditional", "modern"];

pub const CUISINES: &[&str] = &[
    "north_indian",
    "south_indian",
    "chinese",
    "continental",
    "italian",
    "mexican",
    "mughlai",
    "seafood",
    "street_food",
    "desserts",
    "healthy",
    "fast_food",
];

// ---
// Field checks shared by the step predicates and the validators
// ---

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Exactly ten ASCII digits.
pub fn is_valid_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let last = domain.len().saturating_sub(1);
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < last)
}

fn char_count_within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !is_valid_phone(value) {
        return Err(ValidationError::new("phone"));
    }
    Ok(())
}

fn validate_email_shape(value: &str) -> Result<(), ValidationError> {
    if !is_email_shaped(value) {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

fn validate_accepted(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(ValidationError::new("terms"));
    }
    Ok(())
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Price must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_tags(values: &[String], catalog: &[&str]) -> Result<(), ValidationError> {
    if let Some(unknown) = values.iter().find(|v| !catalog.contains(&v.as_str())) {
        let mut err = ValidationError::new("unknown_option");
        err.add_param("value".into(), unknown);
        return Err(err);
    }
    Ok(())
}

fn validate_security(values: &[String]) -> Result<(), ValidationError> {
    validate_tags(values, SECURITY_FEATURES)
}

fn validate_food_types(values: &[String]) -> Result<(), ValidationError> {
    validate_tags(values, FOOD_TYPES)
}

fn validate_decoration_types(values: &[String]) -> Result<(), ValidationError> {
    validate_tags(values, DECORATION_TYPES)
}

fn validate_cuisine(values: &[String]) -> Result<(), ValidationError> {
    validate_tags(values, CUISINES)
}

// ---
// Shared sections
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationFields {
    #[validate(custom(function = "not_blank", message = "Street address is required."))]
    #[schema(example = "42, Sunrise Colony, MG Road")]
    pub location: String,
    #[validate(custom(function = "not_blank", message = "City is required."))]
    pub city: String,
    #[validate(custom(function = "not_blank", message = "State is required."))]
    pub state: String,
    #[validate(custom(function = "not_blank", message = "Pincode is required."))]
    pub pincode: String,
}

impl LocationFields {
    pub fn is_complete(&self) -> bool {
        [&self.location, &self.city, &self.state, &self.pincode]
            .iter()
            .all(|field| !is_blank(field))
    }

    fn issue(&self, field: &str) -> Option<&'static str> {
        let (value, message) = match field {
            "location" => (&self.location, "Street address is required."),
            "city" => (&self.city, "City is required."),
            "state" => (&self.state, "State is required."),
            "pincode" => (&self.pincode, "Pincode is required."),
            _ => return None,
        };
        is_blank(value).then_some(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerVerification {
    #[validate(custom(function = "not_blank", message = "Full name is required."))]
    pub owner_name: String,
    #[validate(custom(function = "validate_phone", message = "Enter a valid 10-digit mobile number."))]
    #[schema(example = "9876543210")]
    pub owner_phone: String,
    #[validate(custom(function = "validate_email_shape", message = "Enter a valid email address."))]
    pub owner_email: String,
    #[validate(required(message = "Select an ID type."))]
    pub id_type: Option<IdDocumentType>,
    #[validate(custom(function = "not_blank", message = "ID number is required."))]
    pub id_number: String,
    #[validate(custom(function = "validate_accepted", message = "You must accept the terms."))]
    pub agree_to_terms: bool,
}

impl OwnerVerification {
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.owner_name)
            && is_valid_phone(&self.owner_phone)
            && is_email_shaped(&self.owner_email)
            && self.id_type.is_some()
            && !is_blank(&self.id_number)
            && self.agree_to_terms
    }

    fn issue(&self, field: &str) -> Option<&'static str> {
        match field {
            "ownerName" => is_blank(&self.owner_name).then_some("Full name is required."),
            "ownerPhone" => (!is_valid_phone(&self.owner_phone))
                .then_some("Enter a valid 10-digit mobile number."),
            "ownerEmail" => (!is_email_shaped(&self.owner_email)).then_some("Enter a valid email address."),
            "idType" => self.id_type.is_none().then_some("Select an ID type."),
            "idNumber" => is_blank(&self.id_number).then_some("ID number is required."),
            "agreeToTerms" => (!self.agree_to_terms).then_some("You must accept the terms."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageDraft {
    #[validate(custom(function = "not_blank", message = "Package name is required."))]
    #[schema(example = "Gold")]
    pub name: String,
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub price: Decimal,
    pub items: Vec<String>,
}

impl PackageDraft {
    pub fn is_acceptable(&self) -> bool {
        !is_blank(&self.name) && self.price > Decimal::ZERO
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuItemDraft {
    #[validate(custom(function = "not_blank", message = "Item name is required."))]
    #[schema(example = "Paneer Tikka")]
    pub name: String,
    #[validate(custom(function = "validate_positive"))]
    pub price: Decimal,
    pub category: String,
}

impl MenuItemDraft {
    pub fn is_acceptable(&self) -> bool {
        !is_blank(&self.name) && self.price > Decimal::ZERO
    }
}

// ---
// Typed edits beyond a plain field merge
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TagField {
    Amenities,
    Security,
    FoodTypes,
    DecorationTypes,
    Cuisine,
}

impl TagField {
    fn name(self) -> &'static str {
        match self {
            TagField::Amenities => "amenities",
            TagField::Security => "security",
            TagField::FoodTypes => "foodTypes",
            TagField::DecorationTypes => "decorationTypes",
            TagField::Cuisine => "cuisine",
        }
    }

    /// `None` for free-form tag sets.
    fn catalog(self) -> Option<&'static [&'static str]> {
        match self {
            TagField::Amenities => None,
            TagField::Security => Some(SECURITY_FEATURES),
            TagField::FoodTypes => Some(FOOD_TYPES),
            TagField::DecorationTypes => Some(DECORATION_TYPES),
            TagField::Cuisine => Some(CUISINES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DraftAction {
    ToggleTag { field: TagField, value: String },
    AddImage { url: String },
    RemoveImage { index: usize },
    MoveImage { from: usize, to: usize },
    AddPackage { package: PackageDraft },
    RemovePackage { index: usize },
    AddMenuItem { item: MenuItemDraft },
    RemoveMenuItem { index: usize },
}

fn toggle_tag(tags: &mut Vec<String>, field: TagField, value: &str) -> Result<bool, WizardError> {
    let value = value.trim();
    let known = field
        .catalog()
        .map_or(!value.is_empty(), |catalog| catalog.contains(&value));
    if !known {
        return Err(WizardError::UnknownTag {
            field: field.name(),
            value: value.to_string(),
        });
    }

    if let Some(pos) = tags.iter().position(|t| t == value) {
        tags.remove(pos);
    } else {
        tags.push(value.to_string());
    }
    Ok(true)
}

fn apply_image_action(images: &mut Vec<String>, action: &DraftAction) -> Option<Result<bool, WizardError>> {
    let result = match action {
        DraftAction::AddImage { url } => {
            if images.len() >= MAX_IMAGES {
                Err(WizardError::ImageLimit(MAX_IMAGES))
            } else if is_blank(url) {
                Ok(false)
            } else {
                images.push(url.trim().to_string());
                Ok(true)
            }
        }
        DraftAction::RemoveImage { index } => remove_at(images, *index),
        DraftAction::MoveImage { from, to } => {
            if *from >= images.len() {
                Err(WizardError::IndexOutOfRange(*from))
            } else if *to >= images.len() {
                Err(WizardError::IndexOutOfRange(*to))
            } else {
                let moved = images.remove(*from);
                images.insert(*to, moved);
                Ok(true)
            }
        }
        _ => return None,
    };
    Some(result)
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Result<bool, WizardError> {
    if index >= items.len() {
        return Err(WizardError::IndexOutOfRange(index));
    }
    items.remove(index);
    Ok(true)
}

// ---
// The draft contract the wizard runs on
// ---

pub trait ListingDraft:
    Serialize + DeserializeOwned + Validate + Default + Clone + Send + Sync + 'static
{
    const KIND: ListingKind;
    const STEPS: &'static [&'static str];

    /// Completeness predicate gating the move past `step`.
    fn step_complete(&self, step: usize) -> bool;

    /// Inline error text for a touched field, if its value is not acceptable.
    fn field_issue(&self, field: &str) -> Option<&'static str>;

    /// Applies a typed edit. `Ok(false)` means the edit was ignored.
    fn apply(&mut self, action: DraftAction) -> Result<bool, WizardError>;

    fn first_incomplete_step(&self) -> Option<usize> {
        (0..Self::STEPS.len()).find(|&step| !self.step_complete(step))
    }
}

// ---
// Property (flat, house, villa, ...)
// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDraft {
    #[validate(required(message = "Select a property type."))]
    pub property_type: Option<PropertyType>,
    #[validate(required(message = "Select a place type."))]
    pub place_type: Option<PlaceType>,
    #[serde(flatten)]
    #[validate(nested)]
    pub address: LocationFields,
    #[validate(range(min = 0, max = 20, message = "Must be between 0 and 20."))]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 20, message = "Must be between 0 and 20."))]
    pub bathrooms: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub area: Decimal,
    pub status: ListingStatus,
    pub amenities: Vec<String>,
    #[validate(length(min = 1, max = 10, message = "Add between 1 and 10 photos."))]
    pub images: Vec<String>,
    #[validate(length(min = 50, max = 1000, message = "Description must be 50 to 1000 characters."))]
    pub description: String,
    #[validate(length(min = 10, max = 80, message = "Title must be 10 to 80 characters."))]
    pub title: String,
    #[validate(custom(function = "validate_positive"))]
    pub price: Decimal,
    #[validate(custom(function = "validate_security"))]
    pub security: Vec<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub owner: OwnerVerification,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            property_type: None,
            place_type: None,
            address: LocationFields::default(),
            bedrooms: 1,
            bathrooms: 1,
            area: Decimal::ZERO,
            status: ListingStatus::Rent,
            amenities: Vec::new(),
            images: Vec::new(),
            description: String::new(),
            title: String::new(),
            price: Decimal::ZERO,
            security: Vec::new(),
            owner: OwnerVerification::default(),
        }
    }
}

impl PropertyDraft {
    /// Selected security features that must be disclosed to tenants.
    pub fn disclosures(&self) -> Vec<&str> {
        self.security
            .iter()
            .map(String::as_str)
            .filter(|s| DISCLOSURE_REQUIRED.contains(s))
            .collect()
    }
}

impl ListingDraft for PropertyDraft {
    const KIND: ListingKind = ListingKind::Flat;
    const STEPS: &'static [&'static str] = &[
        "Property Type",
        "Place Type",
        "Location",
        "Basics",
        "Amenities",
        "Photos",
        "Description",
        "Title",
        "Pricing",
        "Security",
        "Verification",
    ];

    fn step_complete(&self, step: usize) -> bool {
        match step {
            0 => self.property_type.is_some(),
            1 => self.place_type.is_some(),
            2 => self.address.is_complete(),
            3 => (0..=MAX_ROOMS).contains(&self.bedrooms) && (0..=MAX_ROOMS).contains(&self.bathrooms),
            4 | 9 => true,
            5 => (1..=MAX_IMAGES).contains(&self.images.len()),
            6 => char_count_within(&self.description, DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS),
            7 => char_count_within(&self.title, TITLE_MIN_CHARS, TITLE_MAX_CHARS),
            8 => self.price > Decimal::ZERO,
            10 => self.owner.is_complete(),
            _ => false,
        }
    }

    fn field_issue(&self, field: &str) -> Option<&'static str> {
        match field {
            "title" => (!self.step_complete(7)).then_some("Title must be 10 to 80 characters."),
            "description" => {
                (!self.step_complete(6)).then_some("Description must be 50 to 1000 characters.")
            }
            "price" => (!self.step_complete(8)).then_some("Enter a valid price."),
            "images" => (!self.step_complete(5)).then_some("Add at least one photo."),
            _ => self.address.issue(field).or_else(|| self.owner.issue(field)),
        }
    }

    fn apply(&mut self, action: DraftAction) -> Result<bool, WizardError> {
        if let Some(result) = apply_image_action(&mut self.images, &action) {
            return result;
        }
        match action {
            DraftAction::ToggleTag { field: field @ TagField::Amenities, value } => {
                toggle_tag(&mut self.amenities, field, &value)
            }
            DraftAction::ToggleTag { field: field @ TagField::Security, value } => {
                toggle_tag(&mut self.security, field, &value)
            }
            _ => Err(WizardError::UnsupportedAction(Self::KIND)),
        }
    }
}

// ---
// Venue (marriage garden)
// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueDraft {
    #[validate(custom(function = "not_blank", message = "Venue name is required."))]
    pub name: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub address: LocationFields,
    #[validate(range(min = 1, message = "Capacity must be at least 1."))]
    pub capacity: i32,
    #[validate(custom(function = "validate_positive"))]
    pub price: Decimal,
    pub amenities: Vec<String>,
    #[validate(custom(function = "validate_food_types"))]
    pub food_types: Vec<String>,
    #[validate(custom(function = "validate_decoration_types"))]
    pub decoration_types: Vec<String>,
    #[validate(length(min = 1, max = 10, message = "Add between 1 and 10 photos."))]
    pub images: Vec<String>,
    pub videos: Vec<String>,
    #[validate(length(min = 50, max = 1000, message = "Description must be 50 to 1000 characters."))]
    pub description: String,
    #[validate(nested)]
    pub packages: Vec<PackageDraft>,
    #[serde(flatten)]
    #[validate(nested)]
    pub owner: OwnerVerification,
}

impl Default for VenueDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: LocationFields::default(),
            capacity: 100,
            price: Decimal::ZERO,
            amenities: Vec::new(),
            food_types: Vec::new(),
            decoration_types: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
            description: String::new(),
            packages: Vec::new(),
            owner: OwnerVerification::default(),
        }
    }
}

impl ListingDraft for VenueDraft {
    const KIND: ListingKind = ListingKind::Garden;
    const STEPS: &'static [&'static str] = &[
        "Basic Details",
        "Location",
        "Capacity & Pricing",
        "Amenities",
        "Food & Decor",
        "Photos",
        "Description",
        "Packages",
        "Verification",
    ];

    fn step_complete(&self, step: usize) -> bool {
        match step {
            0 => !is_blank(&self.name),
            1 => self.address.is_complete(),
            2 => self.capacity > 0 && self.price > Decimal::ZERO,
            3 | 4 => true,
            5 => (1..=MAX_IMAGES).contains(&self.images.len()),
            6 => char_count_within(&self.description, DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS),
            7 => self.packages.iter().all(PackageDraft::is_acceptable),
            8 => self.owner.is_complete(),
            _ => false,
        }
    }

    fn field_issue(&self, field: &str) -> Option<&'static str> {
        match field {
            "name" => is_blank(&self.name).then_some("Venue name is required."),
            "capacity" => (self.capacity <= 0).then_some("Capacity must be at least 1."),
            "price" => (self.price <= Decimal::ZERO).then_some("Enter a valid price."),
            "description" => {
                (!self.step_complete(6)).then_some("Description must be 50 to 1000 characters.")
            }
            "images" => (!self.step_complete(5)).then_some("Add at least one photo."),
            _ => self.address.issue(field).or_else(|| self.owner.issue(field)),
        }
    }

    fn apply(&mut self, action: DraftAction) -> Result<bool, WizardError> {
        if let Some(result) = apply_image_action(&mut self.images, &action) {
            return result;
        }
        match action {
            DraftAction::ToggleTag { field: field @ TagField::Amenities, value } => {
                toggle_tag(&mut self.amenities, field, &value)
            }
            DraftAction::ToggleTag { field: field @ TagField::FoodTypes, value } => {
                toggle_tag(&mut self.food_types, field, &value)
            }
            DraftAction::ToggleTag { field: field @ TagField::DecorationTypes, value } => {
                toggle_tag(&mut self.decoration_types, field, &value)
            }
            DraftAction::AddPackage { mut package } => {
                if !package.is_acceptable() {
                    return Ok(false);
                }
                package.items.retain(|item| !is_blank(item));
                self.packages.push(package);
                Ok(true)
            }
            DraftAction::RemovePackage { index } => remove_at(&mut self.packages, index),
            _ => Err(WizardError::UnsupportedAction(Self::KIND)),
        }
    }
}

// ---
// Restaurant / kitchen
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct KitchenDraft {
    #[validate(custom(function = "not_blank", message = "Restaurant name is required."))]
    pub name: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub address: LocationFields,
    #[validate(
        length(min = 1, message = "Pick at least one cuisine."),
        custom(function = "validate_cuisine")
    )]
    pub cuisine: Vec<String>,
    #[validate(required(message = "Select a price range."))]
    pub price_range: Option<PriceRange>,
    #[validate(nested)]
    pub menu: Vec<MenuItemDraft>,
    #[validate(length(min = 1, max = 10, message = "Add between 1 and 10 photos."))]
    pub images: Vec<String>,
    #[validate(length(min = 50, max = 1000, message = "Description must be 50 to 1000 characters."))]
    pub description: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub owner: OwnerVerification,
}

impl ListingDraft for KitchenDraft {
    const KIND: ListingKind = ListingKind::Restaurant;
    const STEPS: &'static [&'static str] = &[
        "Basic Details",
        "Location",
        "Cuisine & Menu",
        "Photos",
        "Description",
        "Verification",
    ];

    fn step_complete(&self, step: usize) -> bool {
        match step {
            0 => !is_blank(&self.name),
            1 => self.address.is_complete(),
            2 => !self.cuisine.is_empty() && self.price_range.is_some(),
            3 => (1..=MAX_IMAGES).contains(&self.images.len()),
            4 => char_count_within(&self.description, DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS),
            5 => self.owner.is_complete(),
            _ => false,
        }
    }

    fn field_issue(&self, field: &str) -> Option<&'static str> {
        match field {
            "name" => is_blank(&self.name).then_some("Restaurant name is required."),
            "cuisine" => self.cuisine.is_empty().then_some("Pick at least one cuisine."),
            "priceRange" => self.price_range.is_none().then_some("Select a price range."),
            "description" => {
                (!self.step_complete(4)).then_some("Description must be 50 to 1000 characters.")
            }
            "images" => (!self.step_complete(3)).then_some("Add at least one photo."),
            _ => self.address.issue(field).or_else(|| self.owner.issue(field)),
        }
    }

    fn apply(&mut self, action: DraftAction) -> Result<bool, WizardError> {
        if let Some(result) = apply_image_action(&mut self.images, &action) {
            return result;
        }
        match action {
            DraftAction::ToggleTag { field: field @ TagField::Cuisine, value } => {
                toggle_tag(&mut self.cuisine, field, &value)
            }
            DraftAction::AddMenuItem { item } => {
                if !item.is_acceptable() {
                    return Ok(false);
                }
                self.menu.push(item);
                Ok(true)
            }
            DraftAction::RemoveMenuItem { index } => remove_at(&mut self.menu, index),
            _ => Err(WizardError::UnsupportedAction(Self::KIND)),
        }
    }
}
