//! Closed category and equipment vocabularies, and the classifiers that map
//! free text onto them.
//!
//! The string labels are a stable contract with the bundled resource files.
//! Renaming one requires migrating persisted data.
//!
//! Classification never fails: unknown input lands on a defined fallback.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Exercise categories
// ============================================================================

/// Category of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Push,
    Pull,
    Legs,
    Core,
    Cardio,
    Olympic,
    Functional,
    Isolation,
    Strength,
    Flexibility,
    Plyometric,
    Other,
}

impl ExerciseCategory {
    pub const ALL: [ExerciseCategory; 12] = [
        ExerciseCategory::Push,
        ExerciseCategory::Pull,
        ExerciseCategory::Legs,
        ExerciseCategory::Core,
        ExerciseCategory::Cardio,
        ExerciseCategory::Olympic,
        ExerciseCategory::Functional,
        ExerciseCategory::Isolation,
        ExerciseCategory::Strength,
        ExerciseCategory::Flexibility,
        ExerciseCategory::Plyometric,
        ExerciseCategory::Other,
    ];

    /// Concrete category assigned to exercises still marked `Other`.
    pub const DEFAULT_CONCRETE: ExerciseCategory = ExerciseCategory::Strength;

    pub fn label(self) -> &'static str {
        match self {
            ExerciseCategory::Push => "push",
            ExerciseCategory::Pull => "pull",
            ExerciseCategory::Legs => "legs",
            ExerciseCategory::Core => "core",
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::Olympic => "olympic",
            ExerciseCategory::Functional => "functional",
            ExerciseCategory::Isolation => "isolation",
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Flexibility => "flexibility",
            ExerciseCategory::Plyometric => "plyometric",
            ExerciseCategory::Other => "other",
        }
    }

    /// Case-insensitive exact match on the label; anything else is `Other`.
    pub fn from_label(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(raw))
            .unwrap_or(ExerciseCategory::Other)
    }

    pub fn is_concrete(self) -> bool {
        self != ExerciseCategory::Other
    }

    pub fn display_name(self) -> String {
        title_case(self.label())
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Equipment needed for an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Cable,
    Machine,
    Bodyweight,
    Kettlebell,
    PullUpBar,
    Other,
}

impl Equipment {
    pub const ALL: [Equipment; 8] = [
        Equipment::Barbell,
        Equipment::Dumbbell,
        Equipment::Cable,
        Equipment::Machine,
        Equipment::Bodyweight,
        Equipment::Kettlebell,
        Equipment::PullUpBar,
        Equipment::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Cable => "cable",
            Equipment::Machine => "machine",
            Equipment::Bodyweight => "bodyweight",
            Equipment::Kettlebell => "kettlebell",
            Equipment::PullUpBar => "pull_up_bar",
            Equipment::Other => "other",
        }
    }

    /// Human-readable name: snake_case label in Title Case, with compound
    /// terms spelled the way people write them.
    pub fn display_name(self) -> String {
        match self {
            Equipment::PullUpBar => "Pull-up Bar".to_string(),
            other => title_case(other.label()),
        }
    }

    /// Case-insensitive exact match on the label or the display name.
    pub fn from_label(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|e| {
                e.label().eq_ignore_ascii_case(raw) || e.display_name().eq_ignore_ascii_case(raw)
            })
            .unwrap_or(Equipment::Other)
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Food categories
// ============================================================================

/// Category of a food item
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Meat,
    Dairy,
    Grains,
    Bakery,
    Vegetables,
    Fruits,
    Nuts,
    Beverages,
    Snacks,
    Desserts,
    Condiments,
    Seafood,
    #[serde(rename = "fastfood")]
    FastFood,
    Turkish,
    Other,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 15] = [
        FoodCategory::Meat,
        FoodCategory::Dairy,
        FoodCategory::Grains,
        FoodCategory::Bakery,
        FoodCategory::Vegetables,
        FoodCategory::Fruits,
        FoodCategory::Nuts,
        FoodCategory::Beverages,
        FoodCategory::Snacks,
        FoodCategory::Desserts,
        FoodCategory::Condiments,
        FoodCategory::Seafood,
        FoodCategory::FastFood,
        FoodCategory::Turkish,
        FoodCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FoodCategory::Meat => "meat",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grains => "grains",
            FoodCategory::Bakery => "bakery",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Fruits => "fruits",
            FoodCategory::Nuts => "nuts",
            FoodCategory::Beverages => "beverages",
            FoodCategory::Snacks => "snacks",
            FoodCategory::Desserts => "desserts",
            FoodCategory::Condiments => "condiments",
            FoodCategory::Seafood => "seafood",
            FoodCategory::FastFood => "fastfood",
            FoodCategory::Turkish => "turkish",
            FoodCategory::Other => "other",
        }
    }

    /// Case-insensitive exact match on the label; anything else is `Other`.
    pub fn from_label(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(raw))
            .unwrap_or(FoodCategory::Other)
    }

    pub fn display_name(self) -> String {
        match self {
            FoodCategory::FastFood => "Fast Food".to_string(),
            other => title_case(other.label()),
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a free-text exercise category label onto [`ExerciseCategory`].
pub fn exercise_category(raw: &str) -> ExerciseCategory {
    ExerciseCategory::from_label(raw)
}

/// Map a free-text food category label onto [`FoodCategory`].
pub fn food_category(raw: &str) -> FoodCategory {
    FoodCategory::from_label(raw)
}

/// Map a free-text equipment label onto [`Equipment`].
pub fn equipment(raw: &str) -> Equipment {
    Equipment::from_label(raw)
}

// ============================================================================
// Food name heuristic
// ============================================================================

/// Keyword -> category table used to rescue foods stuck in `Other`.
///
/// Keywords match the start of a word, so "apple" also matches "apples".
/// English entries follow the category mapping used when the food snapshot was
/// exported; Turkish entries cover the staple foods it was queried with.
static FOOD_KEYWORDS: Lazy<Vec<(&'static str, FoodCategory)>> = Lazy::new(|| {
    use FoodCategory::*;
    vec![
        // meat
        ("meat", Meat),
        ("beef", Meat),
        ("poultry", Meat),
        ("chicken", Meat),
        ("turkey", Meat),
        ("lamb", Meat),
        ("pork", Meat),
        ("steak", Meat),
        ("tavuk", Meat),
        ("hindi", Meat),
        ("dana", Meat),
        ("kuzu", Meat),
        ("et", Meat),
        // dairy
        ("dairy", Dairy),
        ("milk", Dairy),
        ("cheese", Dairy),
        ("yogurt", Dairy),
        ("yoghurt", Dairy),
        ("kefir", Dairy),
        ("egg", Dairy),
        ("eggs", Dairy),
        ("süt", Dairy),
        ("peynir", Dairy),
        ("yoğurt", Dairy),
        ("lor", Dairy),
        ("yumurta", Dairy),
        // grains
        ("grain", Grains),
        ("cereal", Grains),
        ("rice", Grains),
        ("pasta", Grains),
        ("oat", Grains),
        ("oats", Grains),
        ("bulgur", Grains),
        ("pirinç", Grains),
        ("yulaf", Grains),
        ("makarna", Grains),
        // bakery
        ("bread", Bakery),
        ("bakery", Bakery),
        ("bagel", Bakery),
        ("ekmek", Bakery),
        ("simit", Bakery),
        // vegetables
        ("vegetable", Vegetables),
        ("legume", Vegetables),
        ("salad", Vegetables),
        ("spinach", Vegetables),
        ("broccoli", Vegetables),
        ("tomato", Vegetables),
        ("cucumber", Vegetables),
        ("chickpea", Vegetables),
        ("lentil", Vegetables),
        ("bean", Vegetables),
        ("ıspanak", Vegetables),
        ("brokoli", Vegetables),
        ("domates", Vegetables),
        ("salatalık", Vegetables),
        ("nohut", Vegetables),
        ("mercimek", Vegetables),
        ("fasulye", Vegetables),
        ("barbunya", Vegetables),
        // fruits
        ("fruit", Fruits),
        ("apple", Fruits),
        ("banana", Fruits),
        ("orange", Fruits),
        ("strawberr", Fruits),
        ("avocado", Fruits),
        ("elma", Fruits),
        ("muz", Fruits),
        ("portakal", Fruits),
        ("çilek", Fruits),
        ("avokado", Fruits),
        // nuts
        ("nut", Nuts),
        ("almond", Nuts),
        ("hazelnut", Nuts),
        ("walnut", Nuts),
        ("badem", Nuts),
        ("fındık", Nuts),
        ("ceviz", Nuts),
        // beverages
        ("beverage", Beverages),
        ("drink", Beverages),
        ("juice", Beverages),
        ("coffee", Beverages),
        ("tea", Beverages),
        ("ayran", Beverages),
        ("çay", Beverages),
        ("kahve", Beverages),
        // snacks
        ("snack", Snacks),
        ("confectionery", Snacks),
        ("chocolate", Snacks),
        ("chips", Snacks),
        ("cracker", Snacks),
        ("çikolata", Snacks),
        // desserts
        ("sweet", Desserts),
        ("dessert", Desserts),
        ("cake", Desserts),
        ("ice cream", Desserts),
        ("baklava", Desserts),
        ("tatlı", Desserts),
        // condiments
        ("sauce", Condiments),
        ("condiment", Condiments),
        ("ketchup", Condiments),
        ("mayonnaise", Condiments),
        ("olive oil", Condiments),
        ("zeytinyağı", Condiments),
        ("sos", Condiments),
        // seafood
        ("seafood", Seafood),
        ("fish", Seafood),
        ("salmon", Seafood),
        ("tuna", Seafood),
        ("shrimp", Seafood),
        ("balık", Seafood),
        ("somon", Seafood),
        ("karides", Seafood),
        // fast food
        ("fast-food", FastFood),
        ("burger", FastFood),
        ("pizza", FastFood),
        ("fries", FastFood),
        ("hot dog", FastFood),
        // turkish cuisine
        ("turkish-cuisine", Turkish),
        ("kebab", Turkish),
        ("döner", Turkish),
        ("lahmacun", Turkish),
        ("pide", Turkish),
        ("köfte", Turkish),
        ("mantı", Turkish),
    ]
});

/// Guess a concrete category for a food from its names.
///
/// Returns `None` when nothing matches, or when matches disagree (e.g.
/// "Chicken Salad" hits both meat and vegetables). Only unanimous matches are
/// considered confident.
pub fn classify_food_name<'a, I>(names: I) -> Option<FoodCategory>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    // Dotted/dotless i differ between English and Turkish casing ("ISPANAK"),
    // so try both foldings.
    let texts = [fold_names(&names, false), fold_names(&names, true)];
    let words: Vec<Vec<&str>> = texts.iter().map(|t| split_words(t)).collect();
    let text = &texts[0];

    let mut found: Option<FoodCategory> = None;
    for (keyword, category) in FOOD_KEYWORDS.iter() {
        let hit = texts
            .iter()
            .zip(&words)
            .any(|(t, w)| keyword_matches(keyword, t, w));
        if !hit {
            continue;
        }
        match found {
            None => found = Some(*category),
            Some(existing) if existing == *category => {}
            Some(existing) => {
                tracing::debug!(
                    "Ambiguous food name '{}': {} vs {}",
                    text,
                    existing,
                    category
                );
                return None;
            }
        }
    }
    found
}

fn fold_names(names: &[&str], turkish: bool) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for c in name.chars() {
            match c {
                'I' if turkish => out.push('ı'),
                'İ' => out.push('i'),
                _ => out.extend(c.to_lowercase()),
            }
        }
    }
    out
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect()
}

fn keyword_matches(keyword: &str, text: &str, words: &[&str]) -> bool {
    if keyword.contains(' ') {
        // Multi-word keywords match as a phrase.
        return text.contains(keyword);
    }
    if keyword.chars().count() <= 3 {
        // Short keywords ("et", "tea", "muz") only match whole words.
        return words.iter().any(|w| *w == keyword);
    }
    words.iter().any(|w| w.starts_with(keyword))
}

/// `pull_up_bar` -> `Pull Up Bar`
pub fn title_case(label: &str) -> String {
    label
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
