//! Column label canonicalisation.

/// Canonicalises a column label for comparison.
///
/// Leading and trailing whitespace is removed, internal whitespace runs are
/// collapsed to a single space and the result is case-folded. Two labels name
/// the same column iff their normalized keys are equal.
pub fn normalize(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for word in label.split_whitespace() {
        if !key.is_empty() {
            key.push(' ');
        }
        key.extend(word.chars().flat_map(char::to_lowercase));
    }
    key
}

/// Returns `true` when both labels normalize to the same key.
pub fn same_column(lhs: &str, rhs: &str) -> bool {
    normalize(lhs) == normalize(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_collapses_and_folds_case() {
        assert_eq!(normalize("  Order \t  ID "), "order id");
        assert_eq!(normalize("POS\nName"), "pos name");
    }

    #[test]
    fn blank_labels_normalize_to_empty_key() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn padded_and_lowercase_labels_are_the_same_column() {
        assert!(same_column("  Order ID ", "order id"));
        assert!(!same_column("Order ID", "OrderID"));
    }

    #[test]
    fn folds_non_ascii_letters() {
        assert_eq!(normalize("ÉTAT Civil"), "état civil");
    }
}
