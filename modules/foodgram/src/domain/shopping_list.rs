//! Plain-text rendering of an aggregated shopping list.

use chrono::{DateTime, Utc};

use crate::contract::model::ShoppingList;

/// Attachment name of the downloaded list.
pub const FILE_NAME: &str = "shopping_cart.txt";

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Render the list: a timestamped header, numbered product lines, then the
/// recipes the products come from. Sections are joined with `\n`.
pub fn render(list: &ShoppingList, generated_at: DateTime<Utc>) -> String {
    let products = list.items.iter().enumerate().map(|(idx, item)| {
        format!(
            "{}. {} ({}) - {}",
            idx + 1,
            capitalize(&item.name),
            item.measurement_unit,
            item.total_amount
        )
    });
    let recipes = list
        .recipes
        .iter()
        .map(|r| format!("- {} (@{})", r.name, r.author_username));

    let mut lines = vec![
        format!(
            "Shopping list for {}\n",
            generated_at.format(TIMESTAMP_FORMAT)
        ),
        "Products:\n".to_string(),
    ];
    lines.extend(products);
    lines.push("\nRecipes using these products:\n".to_string());
    lines.extend(recipes);
    lines.join("\n")
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{CartRecipe, ShoppingListItem};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap()
    }

    #[test]
    fn renders_products_and_recipes() {
        let list = ShoppingList {
            items: vec![
                ShoppingListItem {
                    name: "flour".into(),
                    measurement_unit: "g".into(),
                    total_amount: 500,
                },
                ShoppingListItem {
                    name: "SALT".into(),
                    measurement_unit: "g".into(),
                    total_amount: 8,
                },
            ],
            recipes: vec![
                CartRecipe {
                    name: "A".into(),
                    author_username: "alice".into(),
                },
                CartRecipe {
                    name: "B".into(),
                    author_username: "bob".into(),
                },
            ],
        };

        let expected = "Shopping list for 07-03-2024 09:05:01\n\n\
                        Products:\n\n\
                        1. Flour (g) - 500\n\
                        2. Salt (g) - 8\n\
                        \nRecipes using these products:\n\n\
                        - A (@alice)\n\
                        - B (@bob)";
        assert_eq!(render(&list, at()), expected);
    }

    #[test]
    fn empty_cart_keeps_section_headers() {
        let text = render(&ShoppingList::default(), at());
        assert_eq!(
            text,
            "Shopping list for 07-03-2024 09:05:01\n\nProducts:\n\n\nRecipes using these products:\n"
        );
    }

    #[test]
    fn capitalize_handles_unicode_and_empty() {
        assert_eq!(capitalize("сахар ПЕСОК"), "Сахар песок");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }
}
