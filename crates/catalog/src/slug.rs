//! URL slug derivation.

/// Derive a URL-friendly slug from a display name.
///
/// Lowercases the input, collapses every run of non-alphanumeric characters
/// to a single hyphen and trims leading/trailing hyphens. Recomputed whenever
/// an item is renamed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Solid Oak Dining Table"), "solid-oak-dining-table");
    }

    #[test]
    fn collapses_non_alphanumeric_runs() {
        assert_eq!(slugify("Lounge Chair -- 2 (Grey/Oak)"), "lounge-chair-2-grey-oak");
    }

    #[test]
    fn trims_leading_and_trailing_hyphens() {
        assert_eq!(slugify("  ...Velvet Sofa!  "), "velvet-sofa");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Bookshelf 80x200cm"), "bookshelf-80x200cm");
    }

    #[test]
    fn empty_and_symbol_only_names_yield_empty_slug() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
