use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::messages::CategorySuggestion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Drinks")]
    FoodAndDrinks,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Personal")]
    Personal,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Catalogue order. Keyword matching walks categories in this order.
    pub const ALL: [Category; 7] = [
        Category::FoodAndDrinks,
        Category::Travel,
        Category::Shopping,
        Category::BillsAndUtilities,
        Category::Entertainment,
        Category::Personal,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::FoodAndDrinks => "Food & Drinks",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Entertainment => "Entertainment",
            Category::Personal => "Personal",
            Category::Other => "Other",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::FoodAndDrinks => &[
                "starbucks", "coffee", "restaurant", "food", "lunch", "dinner", "breakfast",
                "cafe", "pizza", "burger", "meal", "grocery", "groceries", "supermarket",
                "mcdonalds", "kfc", "subway", "dominos", "eat", "snack", "drink", "tea", "juice",
            ],
            Category::Travel => &[
                "uber", "lyft", "ola", "gas", "fuel", "flight", "hotel", "airbnb", "taxi",
                "train", "bus", "parking", "toll", "petrol", "diesel", "metro", "railway",
            ],
            Category::Shopping => &[
                "amazon", "flipkart", "store", "clothes", "shopping", "mall", "purchase", "buy",
                "retail", "dress", "shoes", "bag", "myntra", "ajio", "shop",
            ],
            Category::BillsAndUtilities => &[
                "electric", "electricity", "water", "internet", "phone", "utility", "bill",
                "rent", "mortgage", "wifi", "broadband", "mobile", "recharge", "postpaid", "jio",
                "airtel",
            ],
            Category::Entertainment => &[
                "movie", "cinema", "netflix", "spotify", "concert", "game", "party", "club",
                "bar", "theater", "prime", "hotstar", "youtube", "subscription", "music", "pvr",
                "inox",
            ],
            Category::Personal => &[
                "gym", "fitness", "haircut", "salon", "pharmacy", "medicine", "doctor", "health",
                "hospital", "clinic", "medical", "cosmetic", "beauty", "spa",
            ],
            Category::Other => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl std::error::Error for UnknownCategory {}

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category: {}", self.0)
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(String::from(s)))
    }
}

pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// First keyword hit in catalogue order, as `(category, keyword)`.
pub fn match_keyword(description: &str) -> Option<(Category, &'static str)> {
    let description = description.to_lowercase();

    Category::ALL.into_iter().find_map(|category| {
        category
            .keywords()
            .iter()
            .find(|keyword| description.contains(*keyword))
            .map(|keyword| (category, *keyword))
    })
}

/// Keyword suggestion. A hit reports a confidence in [0.85, 0.95).
pub fn suggest(description: &str) -> CategorySuggestion {
    match match_keyword(description) {
        Some((category, keyword)) => CategorySuggestion {
            category,
            confidence: 0.85 + rand::thread_rng().gen_range(0.0..0.1),
            matched_keyword: Some(String::from(keyword)),
        },
        None => CategorySuggestion {
            category: Category::Other,
            confidence: FALLBACK_CONFIDENCE,
            matched_keyword: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>(), Ok(category));
            assert_eq!(
                serde_json::to_string(&category).unwrap(),
                format!("\"{}\"", category.label())
            );
        }

        assert!("food & drinks".parse::<Category>().is_err());
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_suggest_matches_keyword() {
        let suggestion = suggest("Starbucks latte");

        assert_eq!(suggestion.category, Category::FoodAndDrinks);
        assert_eq!(suggestion.matched_keyword.as_deref(), Some("starbucks"));
        assert!(suggestion.confidence >= 0.85);
        assert!(suggestion.confidence < 0.95);
    }

    #[test]
    fn test_suggest_uses_catalogue_order() {
        // "gas bill" hits Travel ("gas") before Bills & Utilities ("bill")
        assert_eq!(
            match_keyword("Gas bill"),
            Some((Category::Travel, "gas"))
        );
        assert_eq!(
            match_keyword("NETFLIX subscription"),
            Some((Category::Entertainment, "netflix"))
        );
    }

    #[test]
    fn test_suggest_falls_back_to_other() {
        let suggestion = suggest("zzz qqq");

        assert_eq!(suggestion.category, Category::Other);
        assert_eq!(suggestion.confidence, 0.5);
        assert_eq!(suggestion.matched_keyword, None);
    }
}
