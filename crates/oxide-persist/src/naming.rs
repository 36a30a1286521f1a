//! Table naming rule.

use heck::ToSnakeCase;

/// Derives the default table name for a record type name.
///
/// The type name is converted to `snake_case` and its last word pluralized:
/// `User` becomes `users`, `UserProfile` becomes `user_profiles` and
/// `Empty` becomes `empties`.
#[must_use]
pub fn table_name_for(type_name: &str) -> String {
    let snake = type_name.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

fn pluralize(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names_are_pluralized() {
        assert_eq!(table_name_for("User"), "users");
        assert_eq!(table_name_for("Order"), "orders");
    }

    #[test]
    fn test_y_suffix() {
        assert_eq!(table_name_for("Empty"), "empties");
        assert_eq!(table_name_for("Category"), "categories");
    }

    #[test]
    fn test_camel_case_becomes_snake_case() {
        assert_eq!(table_name_for("UserProfile"), "user_profiles");
        assert_eq!(table_name_for("LineItem"), "line_items");
    }
}
