//! Variants and the variant set.
//!
//! A variant is one purchasable configuration of a catalog item, with its own
//! SKU, price and inventory. The [`VariantSet`] is the ordered collection of
//! variants owned by one item; it maintains the defaulting rules and computes
//! the aggregate fields the parent item is derived from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use merx_core::{DomainError, DomainResult, Entity, EntityId, ValueObject};

/// Variant identifier, unique within its variant set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub EntityId);

impl VariantId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for VariantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Physical dimensions in millimetres.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_mm: u32,
    pub width_mm: u32,
    pub height_mm: u32,
}

impl ValueObject for Dimensions {}

/// One purchasable configuration of a catalog item.
///
/// Built from a [`VariantDraft`] so the field invariants (required fields,
/// `images` never containing `main_image`) hold from construction on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    id: VariantId,
    sku: String,
    color: String,
    color_code: Option<String>,
    size: Option<String>,
    material: Option<String>,
    finish: Option<String>,
    /// Price in smallest currency unit (e.g., cents).
    price: u64,
    /// Strike-through reference price, when discounted.
    old_price: Option<u64>,
    inventory: u32,
    main_image: String,
    /// Additional image references; never contains `main_image`.
    images: Vec<String>,
    video: Option<String>,
    weight_g: Option<u32>,
    dimensions: Option<Dimensions>,
    is_default: bool,
}

impl Variant {
    pub fn id_typed(&self) -> VariantId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn color_code(&self) -> Option<&str> {
        self.color_code.as_deref()
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn finish(&self) -> Option<&str> {
        self.finish.as_deref()
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn old_price(&self) -> Option<u64> {
        self.old_price
    }

    pub fn inventory(&self) -> u32 {
        self.inventory
    }

    pub fn main_image(&self) -> &str {
        &self.main_image
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn video(&self) -> Option<&str> {
        self.video.as_deref()
    }

    pub fn weight_g(&self) -> Option<u32> {
        self.weight_g
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Turn the variant back into an editable draft (identity excluded).
    /// Used by duplication.
    pub fn as_draft(&self) -> VariantDraft {
        VariantDraft {
            sku: self.sku.clone(),
            color: self.color.clone(),
            color_code: self.color_code.clone(),
            size: self.size.clone(),
            material: self.material.clone(),
            finish: self.finish.clone(),
            price: self.price,
            old_price: self.old_price,
            inventory: self.inventory,
            main_image: self.main_image.clone(),
            images: self.images.clone(),
            video: self.video.clone(),
            weight_g: self.weight_g,
            dimensions: self.dimensions,
            is_default: Some(self.is_default),
        }
    }

    pub(crate) fn apply_discount(&mut self, percentage: u8) {
        let old_price = self.old_price.unwrap_or(self.price);
        self.old_price = Some(old_price);
        self.price = discounted_price(old_price, percentage);
    }

    pub(crate) fn remove_discount(&mut self) {
        if let Some(old_price) = self.old_price.take() {
            self.price = old_price;
        }
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Price after discounting the reference price by `percentage`, rounded to
/// the nearest smallest currency unit (half up).
pub(crate) fn discounted_price(old_price: u64, percentage: u8) -> u64 {
    let scaled = u128::from(old_price) * u128::from(100 - u32::from(percentage).min(100));
    ((scaled + 50) / 100) as u64
}

/// Editor-supplied variant fields, not yet validated.
///
/// `is_default: None` means "no opinion": preserved on update, resolved by
/// position on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub sku: String,
    pub color: String,
    pub color_code: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub price: u64,
    pub old_price: Option<u64>,
    pub inventory: u32,
    pub main_image: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub weight_g: Option<u32>,
    pub dimensions: Option<Dimensions>,
    pub is_default: Option<bool>,
}

impl VariantDraft {
    /// The minimum viable variant: color, SKU, a positive price and a main
    /// image. Returns the names of every missing/invalid field.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.color.trim().is_empty() {
            missing.push("color");
        }
        if self.sku.trim().is_empty() {
            missing.push("sku");
        }
        if self.price == 0 {
            missing.push("price");
        }
        if self.main_image.trim().is_empty() {
            missing.push("main_image");
        }
        missing
    }

    /// Validate and build the variant.
    ///
    /// Normalizes whitespace, drops blank optional attributes and removes the
    /// main image (and blanks/duplicates) from the additional image list.
    pub fn build(self, id: VariantId) -> DomainResult<Variant> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing or invalid variant fields: {}",
                missing.join(", ")
            )));
        }

        let main_image = self.main_image.trim().to_owned();
        let images = normalize_images(&main_image, &self.images);

        Ok(Variant {
            id,
            sku: self.sku.trim().to_owned(),
            color: self.color.trim().to_owned(),
            color_code: normalize_opt(self.color_code),
            size: normalize_opt(self.size),
            material: normalize_opt(self.material),
            finish: normalize_opt(self.finish),
            price: self.price,
            old_price: self.old_price,
            inventory: self.inventory,
            main_image,
            images,
            video: normalize_opt(self.video),
            weight_g: self.weight_g,
            dimensions: self.dimensions,
            is_default: self.is_default.unwrap_or(false),
        })
    }
}

pub(crate) fn normalize_opt(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim();
        if v.is_empty() { None } else { Some(v.to_owned()) }
    })
}

/// Additional image references never contain the main image; blanks and
/// duplicates are dropped, order is preserved.
pub(crate) fn normalize_images(main_image: &str, images: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(images.len());
    for image in images {
        let image = image.trim();
        if image.is_empty() || image == main_image {
            continue;
        }
        if normalized.iter().any(|existing| existing == image) {
            continue;
        }
        normalized.push(image.to_owned());
    }
    normalized
}

/// Aggregate fields derived from a variant set.
///
/// Deterministic for the same collection contents; the set-valued outputs are
/// sorted, so insertion order does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAggregates {
    pub total_inventory: u64,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub materials: Vec<String>,
    pub finishes: Vec<String>,
}

impl ValueObject for VariantAggregates {}

/// The ordered collection of variants owned by one catalog item.
///
/// Maintains the defaulting invariant: exactly one default variant whenever
/// the set is non-empty, none when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantSet {
    variants: Vec<Variant>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set by inserting the given variants in order; the defaulting
    /// rules apply exactly as for sequential [`VariantSet::insert`] calls.
    pub fn from_variants(variants: Vec<Variant>) -> Self {
        let mut set = Self::new();
        for variant in variants {
            set.insert(variant);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn get(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: VariantId) -> bool {
        self.get(id).is_some()
    }

    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_default)
    }

    /// Number of variants flagged as default. Always 1 for a non-empty set,
    /// 0 for an empty one; exposed so invariant checks can say so.
    pub fn default_count(&self) -> usize {
        self.variants.iter().filter(|v| v.is_default).count()
    }

    /// Append a variant.
    ///
    /// The first variant of an empty set becomes the default regardless of
    /// its flag; a later insert flagged default demotes all others.
    pub fn insert(&mut self, mut variant: Variant) {
        if self.variants.is_empty() {
            variant.is_default = true;
        }
        let make_default = variant.is_default;
        self.variants.push(variant);
        if make_default {
            let last = self.variants.len() - 1;
            for (i, v) in self.variants.iter_mut().enumerate() {
                v.is_default = i == last;
            }
        }
    }

    /// Replace the variant with the same id in place, preserving its
    /// position. Returns false when the id is absent.
    pub fn replace(&mut self, variant: Variant) -> bool {
        let Some(pos) = self.variants.iter().position(|v| v.id == variant.id) else {
            return false;
        };
        let make_default = variant.is_default;
        self.variants[pos] = variant;
        if make_default {
            for (i, v) in self.variants.iter_mut().enumerate() {
                v.is_default = i == pos;
            }
        }
        // A default demoted by its own update falls back to the first variant.
        self.ensure_default();
        true
    }

    /// Remove the variant; deleting the default promotes the first remaining
    /// variant. Returns false when the id is absent.
    pub fn remove(&mut self, id: VariantId) -> bool {
        let Some(pos) = self.variants.iter().position(|v| v.id == id) else {
            return false;
        };
        let was_default = self.variants[pos].is_default;
        self.variants.remove(pos);
        if was_default {
            self.ensure_default();
        }
        true
    }

    /// Make `id` the sole default. Returns false when the id is absent.
    pub fn set_default(&mut self, id: VariantId) -> bool {
        if !self.contains(id) {
            return false;
        }
        for v in &mut self.variants {
            v.is_default = v.id == id;
        }
        true
    }

    fn ensure_default(&mut self) {
        if self.variants.is_empty() {
            return;
        }
        if !self.variants.iter().any(|v| v.is_default) {
            self.variants[0].is_default = true;
        }
    }

    pub(crate) fn default_variant_mut(&mut self) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.is_default)
    }

    /// Compute the aggregate fields over the current collection.
    pub fn aggregates(&self) -> VariantAggregates {
        VariantAggregates {
            total_inventory: self.variants.iter().map(|v| u64::from(v.inventory)).sum(),
            colors: distinct(self.variants.iter().map(|v| v.color.as_str())),
            sizes: distinct(self.variants.iter().filter_map(|v| v.size.as_deref())),
            materials: distinct(self.variants.iter().filter_map(|v| v.material.as_deref())),
            finishes: distinct(self.variants.iter().filter_map(|v| v.finish.as_deref())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
