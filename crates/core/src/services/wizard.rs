//! Listing creation wizard state machine.
//!
//! The wizard is an explicit finite-state object owned by one session. Steps
//! are ordered; `next_step` only advances when the active step validates,
//! `go_to_step` can never jump past the first incomplete step, and validation
//! failures are collected per field instead of failing the call.
//!
//! Property details and pricing are tagged unions keyed by the property type
//! and listing action chosen in the first two steps.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hestia_db::entities::listing::{ListingAction, PropertyType};

/// Maximum number of marketing badges per listing.
pub const MAX_BADGES: usize = 5;

/// Minimum title length.
pub const MIN_TITLE_LEN: usize = 10;

/// Minimum description length.
pub const MIN_DESCRIPTION_LEN: usize = 40;

/// Ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Action,
    PropertyType,
    Badges,
    PropertyDetails,
    BasicInfo,
    Pricing,
    Location,
    Media,
    Preview,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [Self; 9] = [
        Self::Action,
        Self::PropertyType,
        Self::Badges,
        Self::PropertyDetails,
        Self::BasicInfo,
        Self::Pricing,
        Self::Location,
        Self::Media,
        Self::Preview,
    ];

    /// 1-based position of the step.
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    /// Step for a 1-based position.
    #[must_use]
    pub fn from_number(n: usize) -> Option<Self> {
        (n >= 1).then(|| Self::ALL.get(n - 1).copied()).flatten()
    }

    /// The following step, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// The preceding step, if any.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        Self::from_number(self.number().saturating_sub(1))
    }
}

/// Property details, keyed by [`PropertyType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyDetails {
    /// Apartment / flat.
    Apartment {
        bedrooms: u8,
        bathrooms: u8,
        floor_area_sqm: u32,
        floor: Option<i16>,
        has_parking: bool,
        is_furnished: bool,
    },
    /// Free-standing house.
    House {
        bedrooms: u8,
        bathrooms: u8,
        floor_area_sqm: u32,
        erf_size_sqm: u32,
        garages: u8,
        has_pool: bool,
    },
    /// Farm or smallholding.
    Farm {
        land_size_ha: f64,
        dwellings: u8,
        has_water_rights: bool,
    },
    /// Vacant land.
    Land {
        erf_size_sqm: u32,
        is_serviced: bool,
        zoning: String,
    },
    /// Commercial premises.
    Commercial {
        floor_area_sqm: u32,
        parking_bays: u16,
        zoning: String,
    },
    /// Room in a shared home.
    SharedLiving {
        rooms_total: u8,
        rooms_available: u8,
        shared_bathrooms: u8,
        is_furnished: bool,
    },
}

impl PropertyDetails {
    /// The property type this variant belongs to.
    #[must_use]
    pub const fn property_type(&self) -> PropertyType {
        match self {
            Self::Apartment { .. } => PropertyType::Apartment,
            Self::House { .. } => PropertyType::House,
            Self::Farm { .. } => PropertyType::Farm,
            Self::Land { .. } => PropertyType::Land,
            Self::Commercial { .. } => PropertyType::Commercial,
            Self::SharedLiving { .. } => PropertyType::SharedLiving,
        }
    }
}

/// Pricing terms, keyed by [`ListingAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PricingTerms {
    /// Fixed-price sale.
    Sell {
        price: i64,
        is_negotiable: bool,
    },
    /// Monthly rental.
    Rent {
        monthly_rent: i64,
        deposit: i64,
        lease_months: Option<u8>,
    },
    /// Auction.
    Auction {
        starting_bid: i64,
        reserve_price: Option<i64>,
        auction_ends_at: DateTime<Utc>,
    },
}

impl PricingTerms {
    /// The listing action this variant belongs to.
    #[must_use]
    pub const fn action(&self) -> ListingAction {
        match self {
            Self::Sell { .. } => ListingAction::Sell,
            Self::Rent { .. } => ListingAction::Rent,
            Self::Auction { .. } => ListingAction::Auction,
        }
    }
}

/// Location fields collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFields {
    pub address: String,
    pub city: String,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Media recorded on the draft after a completed direct upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMedia {
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
}

/// In-progress wizard form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub action: Option<ListingAction>,
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub details: Option<PropertyDetails>,
    pub pricing: Option<PricingTerms>,
    #[serde(default)]
    pub location: LocationFields,
    #[serde(default)]
    pub media: Vec<DraftMedia>,
}

/// Snapshot persisted by `save_draft`, with no validation applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub draft: ListingDraft,
    pub current_step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
}

/// The frozen payload produced by a successful `submit_for_review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitListingInput {
    pub action: ListingAction,
    pub property_type: PropertyType,
    pub badges: Vec<String>,
    pub title: String,
    pub description: String,
    pub details: PropertyDetails,
    pub pricing: PricingTerms,
    pub location: LocationFields,
    pub media: Vec<DraftMedia>,
}

/// Per-field validation errors, keyed by wire field name.
pub type FieldErrors = BTreeMap<String, String>;

/// The listing creation wizard.
#[derive(Debug, Clone)]
pub struct ListingWizard {
    draft: ListingDraft,
    current_step: WizardStep,
    completed: BTreeSet<WizardStep>,
    errors: FieldErrors,
}

impl Default for ListingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingWizard {
    /// Start a fresh wizard at the first step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: ListingDraft::default(),
            current_step: WizardStep::Action,
            completed: BTreeSet::new(),
            errors: FieldErrors::new(),
        }
    }

    /// Resume a previously saved draft.
    ///
    /// Completed steps are recomputed from the draft contents rather than
    /// trusted from the snapshot, so a stale snapshot can never unlock steps
    /// the data no longer supports.
    #[must_use]
    pub fn from_snapshot(snapshot: DraftSnapshot) -> Self {
        let mut wizard = Self {
            draft: snapshot.draft,
            current_step: WizardStep::Action,
            completed: BTreeSet::new(),
            errors: FieldErrors::new(),
        };

        for step in WizardStep::ALL {
            if wizard.validate_step(step).is_empty() {
                wizard.completed.insert(step);
            } else {
                break;
            }
        }

        let resume = snapshot.current_step.min(
            wizard
                .first_incomplete_step()
                .unwrap_or(WizardStep::Preview),
        );
        wizard.current_step = resume;
        wizard
    }

    /// The active step.
    #[must_use]
    pub const fn current_step(&self) -> WizardStep {
        self.current_step
    }

    /// Steps completed so far.
    #[must_use]
    pub const fn completed_steps(&self) -> &BTreeSet<WizardStep> {
        &self.completed
    }

    /// Validation errors from the last blocked transition.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Read access to the draft.
    #[must_use]
    pub const fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    fn first_incomplete_step(&self) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .find(|s| !self.completed.contains(s))
    }

    // === Field setters ===

    /// Choose the listing action. Pricing of a different action is discarded.
    pub fn set_action(&mut self, action: ListingAction) {
        if self.draft.pricing.as_ref().is_some_and(|p| p.action() != action) {
            self.draft.pricing = None;
            self.invalidate_from(WizardStep::Pricing);
        }
        self.draft.action = Some(action);
    }

    /// Choose the property type. Details of a different variant are discarded.
    pub fn set_property_type(&mut self, property_type: PropertyType) {
        if self
            .draft
            .details
            .as_ref()
            .is_some_and(|d| d.property_type() != property_type)
        {
            self.draft.details = None;
            self.invalidate_from(WizardStep::PropertyDetails);
        }
        self.draft.property_type = Some(property_type);
    }

    /// Replace the badge list.
    pub fn set_badges(&mut self, badges: Vec<String>) {
        self.draft.badges = badges;
    }

    /// Set title and description.
    pub fn set_basic_info(&mut self, title: String, description: String) {
        self.draft.title = title;
        self.draft.description = description;
    }

    /// Set the property details variant.
    pub fn set_details(&mut self, details: PropertyDetails) {
        self.draft.details = Some(details);
    }

    /// Set the pricing variant.
    pub fn set_pricing(&mut self, pricing: PricingTerms) {
        self.draft.pricing = Some(pricing);
    }

    /// Set the location fields.
    pub fn set_location(&mut self, location: LocationFields) {
        self.draft.location = location;
    }

    /// Record a completed direct upload on the draft.
    pub fn add_media(&mut self, media: DraftMedia) {
        self.draft.media.push(media);
    }

    /// Remove an uploaded media item by storage key.
    pub fn remove_media(&mut self, storage_key: &str) {
        self.draft.media.retain(|m| m.storage_key != storage_key);
    }

    fn invalidate_from(&mut self, step: WizardStep) {
        self.completed.retain(|s| *s < step);
    }

    // === Transitions ===

    /// Advance to the next step if the active step validates.
    ///
    /// On failure the per-field errors are stored on the wizard and the step
    /// does not change. Advancing from the last step is a validated no-op.
    pub fn next_step(&mut self) -> bool {
        let errors = self.validate_step(self.current_step);
        if !errors.is_empty() {
            self.errors = errors;
            return false;
        }

        self.errors.clear();
        self.completed.insert(self.current_step);
        if let Some(next) = self.current_step.next() {
            self.current_step = next;
        }
        true
    }

    /// Go back one step. Always allowed; a no-op on the first step.
    pub fn prev_step(&mut self) -> bool {
        match self.current_step.prev() {
            Some(prev) => {
                self.errors.clear();
                self.current_step = prev;
                true
            }
            None => false,
        }
    }

    /// Jump to a step. Allowed only up to one past the furthest completed
    /// step; anything beyond is a no-op returning `false`.
    pub fn go_to_step(&mut self, step: WizardStep) -> bool {
        let max_reachable = self
            .completed
            .iter()
            .map(|s| s.number())
            .max()
            .unwrap_or(0)
            + 1;

        if step.number() > max_reachable {
            return false;
        }

        self.errors.clear();
        self.current_step = step;
        true
    }

    /// Snapshot the in-progress state without validation.
    #[must_use]
    pub fn save_draft(&self) -> DraftSnapshot {
        DraftSnapshot {
            draft: self.draft.clone(),
            current_step: self.current_step,
            completed_steps: self.completed.iter().copied().collect(),
        }
    }

    /// Validate every step and freeze the draft for submission.
    ///
    /// Returns the collected field errors of all steps on failure; the wizard
    /// state is left untouched either way.
    pub fn submit_for_review(&self) -> Result<SubmitListingInput, FieldErrors> {
        let mut all_errors = FieldErrors::new();
        for step in WizardStep::ALL {
            all_errors.extend(self.validate_step(step));
        }
        if !all_errors.is_empty() {
            return Err(all_errors);
        }

        // Every option is present once all steps validate.
        match (
            self.draft.action,
            self.draft.property_type,
            self.draft.details.clone(),
            self.draft.pricing.clone(),
        ) {
            (Some(action), Some(property_type), Some(details), Some(pricing)) => {
                Ok(SubmitListingInput {
                    action,
                    property_type,
                    badges: self.draft.badges.clone(),
                    title: self.draft.title.trim().to_string(),
                    description: self.draft.description.trim().to_string(),
                    details,
                    pricing,
                    location: self.draft.location.clone(),
                    media: self.draft.media.clone(),
                })
            }
            _ => Err(all_errors),
        }
    }

    // === Validation ===

    /// Validate a single step, returning per-field errors.
    #[must_use]
    pub fn validate_step(&self, step: WizardStep) -> FieldErrors {
        let mut errors = FieldErrors::new();

        match step {
            WizardStep::Action => {
                if self.draft.action.is_none() {
                    errors.insert("action".into(), "Choose sell, rent or auction".into());
                }
            }

            WizardStep::PropertyType => {
                if self.draft.property_type.is_none() {
                    errors.insert("propertyType".into(), "Choose a property type".into());
                }
            }

            WizardStep::Badges => {
                if self.draft.badges.len() > MAX_BADGES {
                    errors.insert(
                        "badges".into(),
                        format!("At most {MAX_BADGES} badges are allowed"),
                    );
                }
                if self.draft.badges.iter().any(|b| b.trim().is_empty()) {
                    errors.insert("badges".into(), "Badges cannot be blank".into());
                }
            }

            WizardStep::PropertyDetails => match (&self.draft.details, self.draft.property_type) {
                (None, _) => {
                    errors.insert("details".into(), "Fill in the property details".into());
                }
                (Some(details), Some(property_type)) => {
                    if details.property_type() != property_type {
                        errors.insert(
                            "details".into(),
                            "Details do not match the chosen property type".into(),
                        );
                    } else {
                        Self::validate_details(details, &mut errors);
                    }
                }
                (Some(_), None) => {
                    errors.insert("propertyType".into(), "Choose a property type first".into());
                }
            },

            WizardStep::BasicInfo => {
                if self.draft.title.trim().len() < MIN_TITLE_LEN {
                    errors.insert(
                        "title".into(),
                        format!("Title must be at least {MIN_TITLE_LEN} characters"),
                    );
                }
                if self.draft.description.trim().len() < MIN_DESCRIPTION_LEN {
                    errors.insert(
                        "description".into(),
                        format!("Description must be at least {MIN_DESCRIPTION_LEN} characters"),
                    );
                }
            }

            WizardStep::Pricing => match (&self.draft.pricing, self.draft.action) {
                (None, _) => {
                    errors.insert("pricing".into(), "Fill in the pricing".into());
                }
                (Some(pricing), Some(action)) => {
                    if pricing.action() != action {
                        errors.insert(
                            "pricing".into(),
                            "Pricing does not match the chosen action".into(),
                        );
                    } else {
                        Self::validate_pricing(pricing, &mut errors);
                    }
                }
                (Some(_), None) => {
                    errors.insert("action".into(), "Choose a listing action first".into());
                }
            },

            WizardStep::Location => {
                if self.draft.location.address.trim().is_empty() {
                    errors.insert("location.address".into(), "Address is required".into());
                }
                if self.draft.location.city.trim().is_empty() {
                    errors.insert("location.city".into(), "City is required".into());
                }
            }

            // Media is optional; the preview step is a confirmation screen.
            WizardStep::Media | WizardStep::Preview => {}
        }

        errors
    }

    fn validate_details(details: &PropertyDetails, errors: &mut FieldErrors) {
        match details {
            PropertyDetails::Apartment {
                bedrooms,
                floor_area_sqm,
                ..
            }
            | PropertyDetails::House {
                bedrooms,
                floor_area_sqm,
                ..
            } => {
                if *bedrooms == 0 {
                    errors.insert(
                        "details.bedrooms".into(),
                        "At least one bedroom is required".into(),
                    );
                }
                if *floor_area_sqm == 0 {
                    errors.insert(
                        "details.floorAreaSqm".into(),
                        "Floor area is required".into(),
                    );
                }
            }
            PropertyDetails::Farm { land_size_ha, .. } => {
                if *land_size_ha <= 0.0 {
                    errors.insert("details.landSizeHa".into(), "Land size is required".into());
                }
            }
            PropertyDetails::Land {
                erf_size_sqm,
                zoning,
                ..
            } => {
                if *erf_size_sqm == 0 {
                    errors.insert("details.erfSizeSqm".into(), "Erf size is required".into());
                }
                if zoning.trim().is_empty() {
                    errors.insert("details.zoning".into(), "Zoning is required".into());
                }
            }
            PropertyDetails::Commercial {
                floor_area_sqm,
                zoning,
                ..
            } => {
                if *floor_area_sqm == 0 {
                    errors.insert(
                        "details.floorAreaSqm".into(),
                        "Floor area is required".into(),
                    );
                }
                if zoning.trim().is_empty() {
                    errors.insert("details.zoning".into(), "Zoning is required".into());
                }
            }
            PropertyDetails::SharedLiving {
                rooms_total,
                rooms_available,
                ..
            } => {
                if *rooms_total == 0 {
                    errors.insert("details.roomsTotal".into(), "Room count is required".into());
                }
                if rooms_available > rooms_total {
                    errors.insert(
                        "details.roomsAvailable".into(),
                        "More rooms available than the home has".into(),
                    );
                }
            }
        }
    }

    fn validate_pricing(pricing: &PricingTerms, errors: &mut FieldErrors) {
        match pricing {
            PricingTerms::Sell { price, .. } => {
                if *price <= 0 {
                    errors.insert("pricing.price".into(), "Price must be positive".into());
                }
            }
            PricingTerms::Rent {
                monthly_rent,
                deposit,
                ..
            } => {
                if *monthly_rent <= 0 {
                    errors.insert(
                        "pricing.monthlyRent".into(),
                        "Monthly rent must be positive".into(),
                    );
                }
                if *deposit < 0 {
                    errors.insert(
                        "pricing.deposit".into(),
                        "Deposit cannot be negative".into(),
                    );
                }
            }
            PricingTerms::Auction {
                starting_bid,
                reserve_price,
                auction_ends_at,
            } => {
                if *starting_bid <= 0 {
                    errors.insert(
                        "pricing.startingBid".into(),
                        "Starting bid must be positive".into(),
                    );
                }
                if reserve_price.is_some_and(|r| r < *starting_bid) {
                    errors.insert(
                        "pricing.reservePrice".into(),
                        "Reserve cannot be below the starting bid".into(),
                    );
                }
                if *auction_ends_at <= Utc::now() {
                    errors.insert(
                        "pricing.auctionEndsAt".into(),
                        "Auction end must be in the future".into(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_rent_apartment_wizard() -> ListingWizard {
        let mut w = ListingWizard::new();
        w.set_action(ListingAction::Rent);
        w.set_property_type(PropertyType::Apartment);
        w.set_badges(vec!["pet_friendly".into()]);
        w.set_details(PropertyDetails::Apartment {
            bedrooms: 2,
            bathrooms: 1,
            floor_area_sqm: 78,
            floor: Some(3),
            has_parking: true,
            is_furnished: false,
        });
        w.set_basic_info(
            "Sunny two-bed near the promenade".into(),
            "Bright two-bedroom apartment with sea glimpses, a stone's throw from the beachfront."
                .into(),
        );
        w.set_pricing(PricingTerms::Rent {
            monthly_rent: 12_000,
            deposit: 12_000,
            lease_months: Some(12),
        });
        w.set_location(LocationFields {
            address: "7 Marine Drive".into(),
            city: "Durban".into(),
            province: Some("KwaZulu-Natal".into()),
            postal_code: Some("4001".into()),
            latitude: None,
            longitude: None,
        });
        w
    }

    fn walk_to_preview(w: &mut ListingWizard) {
        for _ in 0..WizardStep::ALL.len() - 1 {
            assert!(w.next_step(), "blocked at {:?}: {:?}", w.current_step(), w.errors());
        }
    }

    #[test]
    fn test_next_step_blocked_without_action() {
        let mut w = ListingWizard::new();

        assert!(!w.next_step());
        assert_eq!(w.current_step(), WizardStep::Action);
        assert!(w.errors().contains_key("action"));
    }

    #[test]
    fn test_next_step_advances_when_valid() {
        let mut w = ListingWizard::new();
        w.set_action(ListingAction::Sell);

        assert!(w.next_step());
        assert_eq!(w.current_step(), WizardStep::PropertyType);
        assert!(w.errors().is_empty());
        assert!(w.completed_steps().contains(&WizardStep::Action));
    }

    #[test]
    fn test_prev_step_always_allowed() {
        let mut w = ListingWizard::new();
        assert!(!w.prev_step()); // no-op on first step

        w.set_action(ListingAction::Sell);
        assert!(w.next_step());
        assert!(w.prev_step());
        assert_eq!(w.current_step(), WizardStep::Action);
    }

    #[test]
    fn test_go_to_step_cannot_jump_ahead() {
        let mut w = ListingWizard::new();
        w.set_action(ListingAction::Rent);
        assert!(w.next_step()); // completed: Action

        // One past the furthest completed step is reachable...
        assert!(w.go_to_step(WizardStep::PropertyType));
        // ...two past is not.
        assert!(!w.go_to_step(WizardStep::Badges));
        assert_eq!(w.current_step(), WizardStep::PropertyType);
    }

    #[test]
    fn test_go_to_step_back_is_always_fine() {
        let mut w = filled_rent_apartment_wizard();
        walk_to_preview(&mut w);

        assert!(w.go_to_step(WizardStep::Pricing));
        assert_eq!(w.current_step(), WizardStep::Pricing);
    }

    #[test]
    fn test_full_rent_walkthrough_reaches_preview() {
        let mut w = filled_rent_apartment_wizard();
        walk_to_preview(&mut w);

        assert_eq!(w.current_step(), WizardStep::Preview);
        let input = w.submit_for_review().unwrap();
        assert_eq!(input.action, ListingAction::Rent);
        assert_eq!(input.property_type, PropertyType::Apartment);
        match input.pricing {
            PricingTerms::Rent {
                monthly_rent,
                deposit,
                ..
            } => {
                assert_eq!(monthly_rent, 12_000);
                assert_eq!(deposit, 12_000);
            }
            other => panic!("wrong pricing variant: {other:?}"),
        }
    }

    #[test]
    fn test_submit_collects_errors_from_all_steps() {
        let w = ListingWizard::new();
        let errors = w.submit_for_review().unwrap_err();

        assert!(errors.contains_key("action"));
        assert!(errors.contains_key("propertyType"));
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("location.address"));
    }

    #[test]
    fn test_changing_property_type_discards_mismatched_details() {
        let mut w = filled_rent_apartment_wizard();
        walk_to_preview(&mut w);

        w.set_property_type(PropertyType::Land);

        assert!(w.draft().details.is_none());
        // Details step (and everything after) is no longer completed.
        assert!(!w.completed_steps().contains(&WizardStep::PropertyDetails));
        assert!(w.completed_steps().contains(&WizardStep::Badges));
        assert!(w.submit_for_review().is_err());
    }

    #[test]
    fn test_changing_action_discards_mismatched_pricing() {
        let mut w = filled_rent_apartment_wizard();
        w.set_action(ListingAction::Sell);

        assert!(w.draft().pricing.is_none());
    }

    #[test]
    fn test_rent_pricing_validation() {
        let mut w = filled_rent_apartment_wizard();
        w.set_pricing(PricingTerms::Rent {
            monthly_rent: 0,
            deposit: -1,
            lease_months: None,
        });

        let errors = w.validate_step(WizardStep::Pricing);
        assert!(errors.contains_key("pricing.monthlyRent"));
        assert!(errors.contains_key("pricing.deposit"));
    }

    #[test]
    fn test_shared_living_rooms_cross_check() {
        let mut w = ListingWizard::new();
        w.set_property_type(PropertyType::SharedLiving);
        w.set_details(PropertyDetails::SharedLiving {
            rooms_total: 3,
            rooms_available: 5,
            shared_bathrooms: 1,
            is_furnished: true,
        });

        let errors = w.validate_step(WizardStep::PropertyDetails);
        assert!(errors.contains_key("details.roomsAvailable"));
    }

    #[test]
    fn test_save_and_resume_draft() {
        let mut w = filled_rent_apartment_wizard();
        walk_to_preview(&mut w);
        let snapshot = w.save_draft();

        let resumed = ListingWizard::from_snapshot(snapshot);

        assert_eq!(resumed.current_step(), WizardStep::Preview);
        assert!(resumed.submit_for_review().is_ok());
    }

    #[test]
    fn test_resume_does_not_trust_stale_snapshot() {
        let mut w = filled_rent_apartment_wizard();
        walk_to_preview(&mut w);
        let mut snapshot = w.save_draft();

        // Corrupt the snapshot: claim Preview while the draft lost its pricing.
        snapshot.draft.pricing = None;

        let resumed = ListingWizard::from_snapshot(snapshot);
        assert_eq!(resumed.current_step(), WizardStep::Pricing);
        assert!(!resumed.completed_steps().contains(&WizardStep::Pricing));
    }

    #[test]
    fn test_save_draft_works_mid_wizard_without_validation() {
        let mut w = ListingWizard::new();
        w.set_action(ListingAction::Auction);
        w.next_step();

        // Title far too short, nothing else filled. Still snapshots fine.
        w.set_basic_info("x".into(), "y".into());
        let snapshot = w.save_draft();

        assert_eq!(snapshot.current_step, WizardStep::PropertyType);
        assert_eq!(snapshot.draft.title, "x");
    }

    #[test]
    fn test_details_variant_mismatch_is_reported() {
        let mut w = ListingWizard::new();
        w.set_property_type(PropertyType::House);
        // Bypass the setter guard by building the draft directly.
        let mut w2 = w.clone();
        w2.draft.details = Some(PropertyDetails::Apartment {
            bedrooms: 1,
            bathrooms: 1,
            floor_area_sqm: 40,
            floor: None,
            has_parking: false,
            is_furnished: false,
        });

        let errors = w2.validate_step(WizardStep::PropertyDetails);
        assert!(errors.contains_key("details"));
    }

    #[test]
    fn test_step_numbering_round_trip() {
        for (i, step) in WizardStep::ALL.into_iter().enumerate() {
            assert_eq!(step.number(), i + 1);
            assert_eq!(WizardStep::from_number(i + 1), Some(step));
        }
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(10), None);
    }
}
