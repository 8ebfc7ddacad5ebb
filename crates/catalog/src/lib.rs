//! Catalog domain module (event-sourced).
//!
//! This crate contains business rules for the product catalog - variant sets,
//! catalog items and their derived listing fields - implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod session;
pub mod sku;
pub mod slug;
pub mod variant;

pub use item::{
    AddVariant, ApplyDiscount, BaseDraft, BaseFields, CatalogCommand, CatalogEvent, CatalogItem,
    CatalogItemId, CreateSimple, CreateWithVariants, DefaultVariantChanged, Delete, Deleted,
    DetailsUpdated, DiscountApplied, DiscountRemoved, DuplicateVariant, Listing, Offering,
    RemoveDiscount, RemoveVariant, SetDefaultVariant, SimpleCreated, SimpleOfferDraft,
    SimpleOffering, SimpleOfferingUpdated, UpdateDetails, UpdateSimpleOffering, UpdateVariant,
    VariantAdded, VariantDuplicated, VariantItemCreated, VariantRemoved, VariantSeed,
    VariantUpdated,
};
pub use session::{CATALOG_ITEM_AGGREGATE_TYPE, EditorSession};
pub use sku::{generate_sku, generate_sku_with_suffix};
pub use slug::slugify;
pub use variant::{Dimensions, Variant, VariantAggregates, VariantDraft, VariantId, VariantSet};
