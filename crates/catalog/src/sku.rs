//! SKU generation for variants.
//!
//! Advisory only: editors may override the generated value. The enforced
//! invariant is a non-empty SKU per variant, not global uniqueness.

use uuid::Uuid;

/// Generate a variant SKU from the base SKU and the variant's attributes.
///
/// Shape: `BASE-COL[-SIZE][-MAT]-XXX` where `COL` is the first three letters
/// of the color, `SIZE` the full size label, `MAT` the first three letters of
/// the material (all uppercased) and `XXX` a random 3-letter suffix for
/// uniqueness.
pub fn generate_sku(base: &str, color: &str, size: Option<&str>, material: Option<&str>) -> String {
    generate_sku_with_suffix(base, color, size, material, &random_suffix())
}

/// Deterministic core of [`generate_sku`]; takes the uniqueness suffix as an
/// argument so callers (and tests) control it.
pub fn generate_sku_with_suffix(
    base: &str,
    color: &str,
    size: Option<&str>,
    material: Option<&str>,
    suffix: &str,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    let base = base.trim();
    if !base.is_empty() {
        parts.push(base.to_owned());
    }

    let color_part = prefix_upper(color, 3);
    if !color_part.is_empty() {
        parts.push(color_part);
    }

    if let Some(size) = size {
        let size = size.trim();
        if !size.is_empty() {
            parts.push(size.to_uppercase());
        }
    }

    if let Some(material) = material {
        let material_part = prefix_upper(material, 3);
        if !material_part.is_empty() {
            parts.push(material_part);
        }
    }

    if !suffix.is_empty() {
        parts.push(suffix.to_uppercase());
    }

    parts.join("-")
}

fn prefix_upper(value: &str, len: usize) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(len)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Three uppercase letters drawn from the random section of a fresh UUIDv7.
fn random_suffix() -> String {
    let uuid = Uuid::now_v7();
    let bytes = uuid.as_bytes();
    bytes[13..16]
        .iter()
        .map(|b| char::from(b'A' + b % 26))
        .collect()
}
