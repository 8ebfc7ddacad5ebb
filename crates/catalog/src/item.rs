//! The catalog item aggregate.
//!
//! A catalog item is either a *simple* product (its offer fields are
//! authoritative directly) or a *variant* product (its offer fields are
//! derived from the default variant of its variant set plus the set
//! aggregates). The two shapes are a tagged [`Offering`] so the variant flag
//! can never disagree with the presence of variants.
//!
//! Every event that touches the offering ends with a synchronous listing
//! resync inside `apply` - the listing snapshot consumed by storefront
//! browsing is never observable stale relative to the variant set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use merx_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use merx_events::{Command, Event};

use crate::slug::slugify;
use crate::variant::{
    Dimensions, Variant, VariantDraft, VariantId, VariantSet, discounted_price, normalize_images,
    normalize_opt,
};

/// Catalog item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogItemId(pub AggregateId);

impl CatalogItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CatalogItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Editor-supplied shared fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseDraft {
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    /// Rich text.
    pub description: Option<String>,
    /// Ordered bullet strings.
    pub details: Vec<String>,
    pub rating: f32,
    pub review_count: u32,
    pub new_arrival: bool,
    pub best_seller: bool,
    pub sale: bool,
    pub a_plus_image: Option<String>,
}

impl BaseDraft {
    /// Names of every missing required field. `subcategory` is required for
    /// variant-bearing items only.
    pub fn missing_fields(&self, require_subcategory: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sku.trim().is_empty() {
            missing.push("sku");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        if require_subcategory
            && self
                .subcategory
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
        {
            missing.push("subcategory");
        }
        missing
    }

    /// Normalize into validated fields; the slug is derived from the name.
    /// Callers check [`BaseDraft::missing_fields`] first.
    fn into_fields(self) -> BaseFields {
        let name = self.name.trim().to_owned();
        let slug = slugify(&name);
        BaseFields {
            sku: self.sku.trim().to_owned(),
            name,
            slug,
            brand: normalize_opt(self.brand),
            model: normalize_opt(self.model),
            category: self.category.trim().to_owned(),
            subcategory: normalize_opt(self.subcategory),
            description: self.description,
            details: self
                .details
                .into_iter()
                .filter_map(|d| normalize_opt(Some(d)))
                .collect(),
            rating: self.rating,
            review_count: self.review_count,
            new_arrival: self.new_arrival,
            best_seller: self.best_seller,
            sale: self.sale,
            a_plus_image: normalize_opt(self.a_plus_image),
        }
    }
}

/// Validated shared fields of a catalog item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseFields {
    pub sku: String,
    pub name: String,
    /// Derived from `name`: lowercase, non-alphanumeric runs collapsed to a
    /// single hyphen, leading/trailing hyphens trimmed.
    pub slug: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub details: Vec<String>,
    pub rating: f32,
    pub review_count: u32,
    pub new_arrival: bool,
    pub best_seller: bool,
    pub sale: bool,
    pub a_plus_image: Option<String>,
}

/// Editor-supplied offer fields for a simple product, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleOfferDraft {
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub old_price: Option<u64>,
    pub color: String,
    pub color_code: Option<String>,
    pub material: String,
    pub main_image: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub inventory: u32,
    pub weight_g: Option<u32>,
    pub dimensions: Option<Dimensions>,
}

impl SimpleOfferDraft {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.price == 0 {
            missing.push("price");
        }
        if self.color.trim().is_empty() {
            missing.push("color");
        }
        if self.material.trim().is_empty() {
            missing.push("material");
        }
        if self.main_image.trim().is_empty() {
            missing.push("main_image");
        }
        missing
    }

    /// Normalize into the validated offering. Callers check
    /// [`SimpleOfferDraft::missing_fields`] first.
    fn into_offering(self) -> SimpleOffering {
        let main_image = self.main_image.trim().to_owned();
        let images = normalize_images(&main_image, &self.images);
        SimpleOffering {
            price: self.price,
            old_price: self.old_price,
            color: self.color.trim().to_owned(),
            color_code: normalize_opt(self.color_code),
            material: self.material.trim().to_owned(),
            main_image,
            images,
            video: normalize_opt(self.video),
            inventory: self.inventory,
            weight_g: self.weight_g,
            dimensions: self.dimensions,
        }
    }
}

/// Authoritative offer fields of a simple product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleOffering {
    pub price: u64,
    pub old_price: Option<u64>,
    pub color: String,
    pub color_code: Option<String>,
    pub material: String,
    pub main_image: String,
    /// Never contains `main_image`.
    pub images: Vec<String>,
    pub video: Option<String>,
    pub inventory: u32,
    pub weight_g: Option<u32>,
    pub dimensions: Option<Dimensions>,
}

impl SimpleOffering {
    fn apply_discount(&mut self, percentage: u8) {
        let old_price = self.old_price.unwrap_or(self.price);
        self.old_price = Some(old_price);
        self.price = discounted_price(old_price, percentage);
    }

    fn remove_discount(&mut self) {
        if let Some(old_price) = self.old_price.take() {
            self.price = old_price;
        }
    }
}

/// The two shapes a catalog item can take.
///
/// Whether an item "has variants" is a consequence of this tag, so the flag
/// and the data cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Offering {
    Simple(SimpleOffering),
    WithVariants(VariantSet),
}

/// The derived snapshot consumed by storefront browsing and filtering.
///
/// For a simple item these mirror the offering directly; for a variant item
/// they are taken from the default variant plus the set aggregates. The
/// availability lists are omitted from serialized output when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listing {
    pub price: u64,
    pub old_price: Option<u64>,
    pub color: String,
    pub color_code: Option<String>,
    pub material: Option<String>,
    pub image: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub weight_g: Option<u32>,
    pub dimensions: Option<Dimensions>,
    /// Sum of variant inventories, or the simple offering's inventory.
    pub inventory: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_finishes: Vec<String>,
}

impl Listing {
    fn from_simple(offer: &SimpleOffering) -> Self {
        Self {
            price: offer.price,
            old_price: offer.old_price,
            color: offer.color.clone(),
            color_code: offer.color_code.clone(),
            material: Some(offer.material.clone()),
            image: offer.main_image.clone(),
            images: offer.images.clone(),
            video: offer.video.clone(),
            weight_g: offer.weight_g,
            dimensions: offer.dimensions,
            inventory: u64::from(offer.inventory),
            available_colors: Vec::new(),
            available_sizes: Vec::new(),
            available_materials: Vec::new(),
            available_finishes: Vec::new(),
        }
    }

    fn from_variants(set: &VariantSet) -> Option<Self> {
        let default = set.default_variant()?;
        let aggregates = set.aggregates();
        Some(Self {
            price: default.price(),
            old_price: default.old_price(),
            color: default.color().to_owned(),
            color_code: default.color_code().map(str::to_owned),
            material: default.material().map(str::to_owned),
            image: default.main_image().to_owned(),
            images: default.images().to_vec(),
            video: default.video().map(str::to_owned),
            weight_g: default.weight_g(),
            dimensions: default.dimensions(),
            inventory: aggregates.total_inventory,
            available_colors: aggregates.colors,
            available_sizes: aggregates.sizes,
            available_materials: aggregates.materials,
            available_finishes: aggregates.finishes,
        })
    }
}

/// Aggregate root: CatalogItem.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    id: CatalogItemId,
    base: BaseFields,
    offering: Offering,
    listing: Listing,
    deleted: bool,
    version: u64,
    created: bool,
}

impl CatalogItem {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CatalogItemId) -> Self {
        Self {
            id,
            base: BaseFields::default(),
            offering: Offering::Simple(SimpleOffering::default()),
            listing: Listing::default(),
            deleted: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CatalogItemId {
        self.id
    }

    pub fn base(&self) -> &BaseFields {
        &self.base
    }

    pub fn offering(&self) -> &Offering {
        &self.offering
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn has_variants(&self) -> bool {
        matches!(self.offering, Offering::WithVariants(_))
    }

    pub fn variant_set(&self) -> Option<&VariantSet> {
        match &self.offering {
            Offering::WithVariants(set) => Some(set),
            Offering::Simple(_) => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn resync_listing(&mut self) {
        self.listing = match &self.offering {
            Offering::Simple(offer) => Listing::from_simple(offer),
            Offering::WithVariants(set) => Listing::from_variants(set).unwrap_or_default(),
        };
    }
}

impl AggregateRoot for CatalogItem {
    type Id = CatalogItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A variant identifier paired with its draft, for variant-item creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSeed {
    pub variant_id: VariantId,
    pub draft: VariantDraft,
}

/// Command: CreateSimple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSimple {
    pub item_id: CatalogItemId,
    pub base: BaseDraft,
    pub offer: SimpleOfferDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CreateWithVariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWithVariants {
    pub item_id: CatalogItemId,
    pub base: BaseDraft,
    pub variants: Vec<VariantSeed>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub item_id: CatalogItemId,
    pub base: BaseDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateSimpleOffering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSimpleOffering {
    pub item_id: CatalogItemId,
    pub offer: SimpleOfferDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVariant {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub draft: VariantDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVariant {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub draft: VariantDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveVariant {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DuplicateVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateVariant {
    pub item_id: CatalogItemId,
    pub source_id: VariantId,
    pub new_variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetDefaultVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDefaultVariant {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyDiscount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyDiscount {
    pub item_id: CatalogItemId,
    /// Whole percent, 0..=100.
    pub percentage: u8,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveDiscount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDiscount {
    pub item_id: CatalogItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delete {
    pub item_id: CatalogItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogCommand {
    CreateSimple(CreateSimple),
    CreateWithVariants(CreateWithVariants),
    UpdateDetails(UpdateDetails),
    UpdateSimpleOffering(UpdateSimpleOffering),
    AddVariant(AddVariant),
    UpdateVariant(UpdateVariant),
    RemoveVariant(RemoveVariant),
    DuplicateVariant(DuplicateVariant),
    SetDefaultVariant(SetDefaultVariant),
    ApplyDiscount(ApplyDiscount),
    RemoveDiscount(RemoveDiscount),
    Delete(Delete),
}

impl CatalogCommand {
    fn item_id(&self) -> CatalogItemId {
        match self {
            CatalogCommand::CreateSimple(cmd) => cmd.item_id,
            CatalogCommand::CreateWithVariants(cmd) => cmd.item_id,
            CatalogCommand::UpdateDetails(cmd) => cmd.item_id,
            CatalogCommand::UpdateSimpleOffering(cmd) => cmd.item_id,
            CatalogCommand::AddVariant(cmd) => cmd.item_id,
            CatalogCommand::UpdateVariant(cmd) => cmd.item_id,
            CatalogCommand::RemoveVariant(cmd) => cmd.item_id,
            CatalogCommand::DuplicateVariant(cmd) => cmd.item_id,
            CatalogCommand::SetDefaultVariant(cmd) => cmd.item_id,
            CatalogCommand::ApplyDiscount(cmd) => cmd.item_id,
            CatalogCommand::RemoveDiscount(cmd) => cmd.item_id,
            CatalogCommand::Delete(cmd) => cmd.item_id,
        }
    }
}

impl Command for CatalogCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        self.item_id().0
    }
}

/// Event: SimpleCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleCreated {
    pub item_id: CatalogItemId,
    pub base: BaseFields,
    pub offer: SimpleOffering,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantItemCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantItemCreated {
    pub item_id: CatalogItemId,
    pub base: BaseFields,
    pub variants: Vec<Variant>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsUpdated {
    pub item_id: CatalogItemId,
    pub base: BaseFields,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SimpleOfferingUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleOfferingUpdated {
    pub item_id: CatalogItemId,
    pub offer: SimpleOffering,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAdded {
    pub item_id: CatalogItemId,
    pub variant: Variant,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdated {
    pub item_id: CatalogItemId,
    pub variant: Variant,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRemoved {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantDuplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDuplicated {
    pub item_id: CatalogItemId,
    pub source_id: VariantId,
    pub variant: Variant,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DefaultVariantChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultVariantChanged {
    pub item_id: CatalogItemId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DiscountApplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub item_id: CatalogItemId,
    pub percentage: u8,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DiscountRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRemoved {
    pub item_id: CatalogItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub item_id: CatalogItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogEvent {
    SimpleCreated(SimpleCreated),
    VariantItemCreated(VariantItemCreated),
    DetailsUpdated(DetailsUpdated),
    SimpleOfferingUpdated(SimpleOfferingUpdated),
    VariantAdded(VariantAdded),
    VariantUpdated(VariantUpdated),
    VariantRemoved(VariantRemoved),
    VariantDuplicated(VariantDuplicated),
    DefaultVariantChanged(DefaultVariantChanged),
    DiscountApplied(DiscountApplied),
    DiscountRemoved(DiscountRemoved),
    Deleted(Deleted),
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::SimpleCreated(_) => "catalog.item.simple_created",
            CatalogEvent::VariantItemCreated(_) => "catalog.item.variant_item_created",
            CatalogEvent::DetailsUpdated(_) => "catalog.item.details_updated",
            CatalogEvent::SimpleOfferingUpdated(_) => "catalog.item.simple_offering_updated",
            CatalogEvent::VariantAdded(_) => "catalog.item.variant_added",
            CatalogEvent::VariantUpdated(_) => "catalog.item.variant_updated",
            CatalogEvent::VariantRemoved(_) => "catalog.item.variant_removed",
            CatalogEvent::VariantDuplicated(_) => "catalog.item.variant_duplicated",
            CatalogEvent::DefaultVariantChanged(_) => "catalog.item.default_variant_changed",
            CatalogEvent::DiscountApplied(_) => "catalog.item.discount_applied",
            CatalogEvent::DiscountRemoved(_) => "catalog.item.discount_removed",
            CatalogEvent::Deleted(_) => "catalog.item.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::SimpleCreated(e) => e.occurred_at,
            CatalogEvent::VariantItemCreated(e) => e.occurred_at,
            CatalogEvent::DetailsUpdated(e) => e.occurred_at,
            CatalogEvent::SimpleOfferingUpdated(e) => e.occurred_at,
            CatalogEvent::VariantAdded(e) => e.occurred_at,
            CatalogEvent::VariantUpdated(e) => e.occurred_at,
            CatalogEvent::VariantRemoved(e) => e.occurred_at,
            CatalogEvent::VariantDuplicated(e) => e.occurred_at,
            CatalogEvent::DefaultVariantChanged(e) => e.occurred_at,
            CatalogEvent::DiscountApplied(e) => e.occurred_at,
            CatalogEvent::DiscountRemoved(e) => e.occurred_at,
            CatalogEvent::Deleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for CatalogItem {
    type Command = CatalogCommand;
    type Event = CatalogEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CatalogEvent::SimpleCreated(e) => {
                self.id = e.item_id;
                self.base = e.base.clone();
                self.offering = Offering::Simple(e.offer.clone());
                self.deleted = false;
                self.created = true;
                self.resync_listing();
            }
            CatalogEvent::VariantItemCreated(e) => {
                self.id = e.item_id;
                self.base = e.base.clone();
                self.offering = Offering::WithVariants(VariantSet::from_variants(e.variants.clone()));
                self.deleted = false;
                self.created = true;
                self.resync_listing();
            }
            CatalogEvent::DetailsUpdated(e) => {
                self.base = e.base.clone();
            }
            CatalogEvent::SimpleOfferingUpdated(e) => {
                self.offering = Offering::Simple(e.offer.clone());
                self.resync_listing();
            }
            CatalogEvent::VariantAdded(e) => {
                if let Offering::WithVariants(set) = &mut self.offering {
                    set.insert(e.variant.clone());
                }
                self.resync_listing();
            }
            CatalogEvent::VariantUpdated(e) => {
                if let Offering::WithVariants(set) = &mut self.offering {
                    set.replace(e.variant.clone());
                }
                self.resync_listing();
            }
            CatalogEvent::VariantRemoved(e) => {
                if let Offering::WithVariants(set) = &mut self.offering {
                    set.remove(e.variant_id);
                }
                self.resync_listing();
            }
            CatalogEvent::VariantDuplicated(e) => {
                if let Offering::WithVariants(set) = &mut self.offering {
                    set.insert(e.variant.clone());
                }
                self.resync_listing();
            }
            CatalogEvent::DefaultVariantChanged(e) => {
                if let Offering::WithVariants(set) = &mut self.offering {
                    set.set_default(e.variant_id);
                }
                self.resync_listing();
            }
            CatalogEvent::DiscountApplied(e) => {
                match &mut self.offering {
                    Offering::Simple(offer) => offer.apply_discount(e.percentage),
                    Offering::WithVariants(set) => {
                        if let Some(variant) = set.default_variant_mut() {
                            variant.apply_discount(e.percentage);
                        }
                    }
                }
                self.resync_listing();
            }
            CatalogEvent::DiscountRemoved(_) => {
                match &mut self.offering {
                    Offering::Simple(offer) => offer.remove_discount(),
                    Offering::WithVariants(set) => {
                        if let Some(variant) = set.default_variant_mut() {
                            variant.remove_discount();
                        }
                    }
                }
                self.resync_listing();
            }
            CatalogEvent::Deleted(_) => {
                self.deleted = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CatalogCommand::CreateSimple(cmd) => self.handle_create_simple(cmd),
            CatalogCommand::CreateWithVariants(cmd) => self.handle_create_with_variants(cmd),
            CatalogCommand::UpdateDetails(cmd) => self.handle_update_details(cmd),
            CatalogCommand::UpdateSimpleOffering(cmd) => self.handle_update_simple_offering(cmd),
            CatalogCommand::AddVariant(cmd) => self.handle_add_variant(cmd),
            CatalogCommand::UpdateVariant(cmd) => self.handle_update_variant(cmd),
            CatalogCommand::RemoveVariant(cmd) => self.handle_remove_variant(cmd),
            CatalogCommand::DuplicateVariant(cmd) => self.handle_duplicate_variant(cmd),
            CatalogCommand::SetDefaultVariant(cmd) => self.handle_set_default_variant(cmd),
            CatalogCommand::ApplyDiscount(cmd) => self.handle_apply_discount(cmd),
            CatalogCommand::RemoveDiscount(cmd) => self.handle_remove_discount(cmd),
            CatalogCommand::Delete(cmd) => self.handle_delete(cmd),
        }
    }
}

impl CatalogItem {
    fn ensure_item_id(&self, item_id: CatalogItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        Ok(())
    }

    /// Target checks shared by every mutation of an existing item.
    fn ensure_mutable(&self, item_id: CatalogItemId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found("catalog item does not exist"));
        }
        self.ensure_item_id(item_id)?;
        if self.deleted {
            return Err(DomainError::conflict("item has been deleted"));
        }
        Ok(())
    }

    fn variant_set_checked(&self) -> Result<&VariantSet, DomainError> {
        match &self.offering {
            Offering::WithVariants(set) => Ok(set),
            Offering::Simple(_) => Err(DomainError::conflict(
                "simple items have no variant set",
            )),
        }
    }

    fn handle_create_simple(&self, cmd: &CreateSimple) -> Result<Vec<CatalogEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("item already exists"));
        }

        let mut missing = cmd.base.missing_fields(false);
        missing.extend(cmd.offer.missing_fields());
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )));
        }

        Ok(vec![CatalogEvent::SimpleCreated(SimpleCreated {
            item_id: cmd.item_id,
            base: cmd.base.clone().into_fields(),
            offer: cmd.offer.clone().into_offering(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_create_with_variants(
        &self,
        cmd: &CreateWithVariants,
    ) -> Result<Vec<CatalogEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("item already exists"));
        }

        let missing = cmd.base.missing_fields(true);
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )));
        }

        if cmd.variants.is_empty() {
            return Err(DomainError::validation("at least one variant is required"));
        }

        for (i, seed) in cmd.variants.iter().enumerate() {
            if cmd.variants[..i]
                .iter()
                .any(|other| other.variant_id == seed.variant_id)
            {
                return Err(DomainError::validation("duplicate variant id"));
            }
        }

        // Exactly one default: the first explicitly flagged seed wins, the
        // first seed otherwise.
        let default_idx = cmd
            .variants
            .iter()
            .position(|seed| seed.draft.is_default == Some(true))
            .unwrap_or(0);

        let mut variants = Vec::with_capacity(cmd.variants.len());
        for (i, seed) in cmd.variants.iter().enumerate() {
            let mut draft = seed.draft.clone();
            draft.is_default = Some(i == default_idx);
            let variant = draft.build(seed.variant_id).map_err(|err| match err {
                DomainError::Validation(msg) => {
                    DomainError::validation(format!("variant {}: {}", i + 1, msg))
                }
                other => other,
            })?;
            variants.push(variant);
        }

        Ok(vec![CatalogEvent::VariantItemCreated(VariantItemCreated {
            item_id: cmd.item_id,
            base: cmd.base.clone().into_fields(),
            variants,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_details(&self, cmd: &UpdateDetails) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;

        let missing = cmd.base.missing_fields(self.has_variants());
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )));
        }

        Ok(vec![CatalogEvent::DetailsUpdated(DetailsUpdated {
            item_id: cmd.item_id,
            base: cmd.base.clone().into_fields(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_simple_offering(
        &self,
        cmd: &UpdateSimpleOffering,
    ) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;

        if self.has_variants() {
            return Err(DomainError::conflict(
                "offer fields of a variant item are derived from its default variant",
            ));
        }

        let missing = cmd.offer.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )));
        }

        Ok(vec![CatalogEvent::SimpleOfferingUpdated(
            SimpleOfferingUpdated {
                item_id: cmd.item_id,
                offer: cmd.offer.clone().into_offering(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_add_variant(&self, cmd: &AddVariant) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;
        let set = self.variant_set_checked()?;

        if set.contains(cmd.variant_id) {
            return Err(DomainError::conflict("variant id already exists"));
        }

        let mut draft = cmd.draft.clone();
        draft.is_default = Some(set.is_empty() || draft.is_default == Some(true));
        let variant = draft.build(cmd.variant_id)?;

        Ok(vec![CatalogEvent::VariantAdded(VariantAdded {
            item_id: cmd.item_id,
            variant,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_variant(&self, cmd: &UpdateVariant) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;
        let set = self.variant_set_checked()?;

        let Some(existing) = set.get(cmd.variant_id) else {
            return Err(DomainError::not_found(format!(
                "variant {} not found",
                cmd.variant_id
            )));
        };

        // A draft with no opinion on the default flag preserves it.
        let mut draft = cmd.draft.clone();
        draft.is_default = Some(draft.is_default.unwrap_or(existing.is_default()));
        let variant = draft.build(cmd.variant_id)?;

        Ok(vec![CatalogEvent::VariantUpdated(VariantUpdated {
            item_id: cmd.item_id,
            variant,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_variant(&self, cmd: &RemoveVariant) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;
        let set = self.variant_set_checked()?;

        if !set.contains(cmd.variant_id) {
            return Err(DomainError::not_found(format!(
                "variant {} not found",
                cmd.variant_id
            )));
        }

        if set.len() == 1 {
            return Err(DomainError::conflict(
                "an item with variants must keep at least one variant",
            ));
        }

        Ok(vec![CatalogEvent::VariantRemoved(VariantRemoved {
            item_id: cmd.item_id,
            variant_id: cmd.variant_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_duplicate_variant(
        &self,
        cmd: &DuplicateVariant,
    ) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;
        let set = self.variant_set_checked()?;

        let Some(source) = set.get(cmd.source_id) else {
            return Err(DomainError::not_found(format!(
                "variant {} not found",
                cmd.source_id
            )));
        };

        if set.contains(cmd.new_variant_id) {
            return Err(DomainError::conflict("variant id already exists"));
        }

        let mut draft = source.as_draft();
        draft.sku = format!("{}-COPY", source.sku());
        draft.is_default = Some(false);
        let variant = draft.build(cmd.new_variant_id)?;

        Ok(vec![CatalogEvent::VariantDuplicated(VariantDuplicated {
            item_id: cmd.item_id,
            source_id: cmd.source_id,
            variant,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_default_variant(
        &self,
        cmd: &SetDefaultVariant,
    ) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;
        let set = self.variant_set_checked()?;

        let Some(variant) = set.get(cmd.variant_id) else {
            return Err(DomainError::not_found(format!(
                "variant {} not found",
                cmd.variant_id
            )));
        };

        // Already the default: nothing to record.
        if variant.is_default() {
            return Ok(vec![]);
        }

        Ok(vec![CatalogEvent::DefaultVariantChanged(
            DefaultVariantChanged {
                item_id: cmd.item_id,
                variant_id: cmd.variant_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_apply_discount(&self, cmd: &ApplyDiscount) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;

        if cmd.percentage > 100 {
            return Err(DomainError::validation(
                "discount percentage must be between 0 and 100",
            ));
        }

        Ok(vec![CatalogEvent::DiscountApplied(DiscountApplied {
            item_id: cmd.item_id,
            percentage: cmd.percentage,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_discount(
        &self,
        cmd: &RemoveDiscount,
    ) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;

        let old_price = match &self.offering {
            Offering::Simple(offer) => offer.old_price,
            Offering::WithVariants(set) => set.default_variant().and_then(|v| v.old_price()),
        };
        if old_price.is_none() {
            return Err(DomainError::validation("no discount to remove"));
        }

        Ok(vec![CatalogEvent::DiscountRemoved(DiscountRemoved {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &Delete) -> Result<Vec<CatalogEvent>, DomainError> {
        self.ensure_mutable(cmd.item_id)?;

        Ok(vec![CatalogEvent::Deleted(Deleted {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
