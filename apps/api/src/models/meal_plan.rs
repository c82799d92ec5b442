//! Meal-plan content tree and render flags, as produced by the plan generation step.
//!
//! The content originates from an LLM and its shape is not guaranteed. Every
//! nested value that could plausibly arrive malformed is wrapped in [`Lenient`],
//! so one bad field invalidates only the smallest enclosing item instead of the
//! whole request. Renderers read through the accessor methods and never see the
//! wrapper.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ────────────────────────────────────────────────────────────────────────────
// Lenient wrapper
// ────────────────────────────────────────────────────────────────────────────

/// A value that either deserialized as `T` or was kept verbatim as raw JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        self.as_result().ok()
    }

    /// The parsed value, or the raw JSON it failed to parse from.
    pub fn as_result(&self) -> Result<&T, &Value> {
        match self {
            Lenient::Valid(value) => Ok(value),
            Lenient::Invalid(raw) => Err(raw),
        }
    }
}

fn valid<T>(field: &Option<Lenient<T>>) -> Option<&T> {
    field.as_ref().and_then(Lenient::valid)
}

// ────────────────────────────────────────────────────────────────────────────
// Content tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanContent {
    #[serde(default)]
    pub overview: Option<Lenient<Overview>>,
    #[serde(default)]
    pub days: Option<Lenient<Vec<Lenient<Day>>>>,
    /// Category name → items. Insertion order is the display order.
    #[serde(default)]
    pub grocery_list: Option<Lenient<Map<String, Value>>>,
}

impl MealPlanContent {
    pub fn overview(&self) -> Option<&Overview> {
        valid(&self.overview)
    }

    /// Day entries in order, with their 1-based position. Malformed entries yield their raw JSON.
    pub fn days(&self) -> impl Iterator<Item = (usize, Result<&Day, &Value>)> {
        valid(&self.days)
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, entry)| (index + 1, entry.as_result()))
    }

    pub fn grocery_list(&self) -> Option<&Map<String, Value>> {
        valid(&self.grocery_list)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default)]
    pub daily_calories: Option<f64>,
    #[serde(default)]
    pub macros: Option<Lenient<Macros>>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Overview {
    pub fn macros(&self) -> Option<&Macros> {
        valid(&self.macros)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Macros {
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Day {
    #[serde(default)]
    pub day: Option<Lenient<u32>>,
    #[serde(default)]
    pub meals: Option<Lenient<Meals>>,
}

impl Day {
    /// The printed day number, falling back to the entry's position.
    pub fn number(&self, position: usize) -> u64 {
        valid(&self.day)
            .map(|n| u64::from(*n))
            .unwrap_or(position as u64)
    }

    pub fn meals(&self) -> Option<&Meals> {
        valid(&self.meals)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: Option<Lenient<Meal>>,
    #[serde(default)]
    pub lunch: Option<Lenient<Meal>>,
    #[serde(default)]
    pub dinner: Option<Lenient<Meal>>,
    #[serde(default)]
    pub snacks: Option<Lenient<Vec<Lenient<Meal>>>>,
}

impl Meals {
    /// The three main meals in display order, with their card labels.
    pub fn main_meals(&self) -> [(&'static str, Option<&Meal>); 3] {
        [
            ("BREAKFAST", valid(&self.breakfast)),
            ("LUNCH", valid(&self.lunch)),
            ("DINNER", valid(&self.dinner)),
        ]
    }

    pub fn snacks(&self) -> Vec<&Meal> {
        valid(&self.snacks)
            .into_iter()
            .flatten()
            .filter_map(Lenient::valid)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meal {
    #[serde(default)]
    pub name: Option<Lenient<String>>,
    #[serde(default)]
    pub nutrition: Option<Lenient<Nutrition>>,
    #[serde(default)]
    pub ingredients: Option<Lenient<Vec<Lenient<String>>>>,
    #[serde(default)]
    pub instructions: Option<Lenient<Instructions>>,
}

impl Meal {
    pub fn name(&self) -> Option<&str> {
        valid(&self.name).map(String::as_str)
    }

    pub fn nutrition(&self) -> Option<&Nutrition> {
        valid(&self.nutrition)
    }

    /// Raw ingredient strings; non-string entries are dropped.
    pub fn ingredients(&self) -> impl Iterator<Item = &str> {
        valid(&self.ingredients)
            .into_iter()
            .flatten()
            .filter_map(Lenient::valid)
            .map(String::as_str)
    }

    pub fn instructions(&self) -> Option<&Instructions> {
        valid(&self.instructions)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

/// Cooking instructions: either free text or an ordered list of steps.
/// Steps that are not strings are dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    Text(String),
    Steps(Vec<Lenient<String>>),
}

impl Instructions {
    /// Flattens the instructions into one block of text.
    ///
    /// Steps are numbered `1. `, `2. `, … and separated by a blank line.
    pub fn to_text(&self) -> String {
        match self {
            Instructions::Text(text) => text.clone(),
            Instructions::Steps(steps) => steps
                .iter()
                .filter_map(Lenient::valid)
                .enumerate()
                .map(|(i, step)| format!("{}. {step}", i + 1))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Render options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Weekly,
    Monthly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Daily => "daily",
            PlanType::Weekly => "weekly",
            PlanType::Monthly => "monthly",
        }
    }

    pub fn badge_label(&self) -> &'static str {
        match self {
            PlanType::Daily => "DAILY PLAN",
            PlanType::Weekly => "WEEKLY PLAN",
            PlanType::Monthly => "MONTHLY PLAN",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub plan_type: PlanType,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    pub is_free_tier: bool,
}

impl RenderOptions {
    /// The creation date as `YYYY-MM-DD`, if the timestamp parses.
    pub fn created_on(&self) -> Option<String> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.format("%Y-%m-%d").to_string())
    }

    /// The creation date as printed on the cover, e.g. `January 1, 2024`.
    pub fn display_date(&self) -> Option<String> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.format("%B %-d, %Y").to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> MealPlanContent {
        serde_json::from_value(value).expect("content should always deserialize")
    }

    #[test]
    fn test_empty_object_is_valid_content() {
        let content = parse(json!({}));
        assert!(content.overview().is_none());
        assert_eq!(content.days().count(), 0);
        assert!(content.grocery_list().is_none());
    }

    #[test]
    fn test_malformed_days_are_kept_as_invalid_entries() {
        let content = parse(json!({
            "days": [null, {"day": 2, "meals": {"breakfast": {"name": "X"}}}, "not-an-object"]
        }));
        let days: Vec<_> = content.days().collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].1.unwrap_err(), &Value::Null);
        assert_eq!(days[2].1.unwrap_err(), &json!("not-an-object"));
        let (position, day) = days[1];
        assert_eq!(day.map(|d| d.number(position)).ok(), Some(2));
    }

    #[test]
    fn test_day_number_falls_back_to_position() {
        let content = parse(json!({ "days": [{}, {"day": "three"}] }));
        let numbers: Vec<u64> = content
            .days()
            .filter_map(|(pos, day)| day.ok().map(|d| d.number(pos)))
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_bad_nutrition_does_not_invalidate_meal() {
        let content = parse(json!({
            "days": [{"meals": {"lunch": {"name": "Soup", "nutrition": "lots"}}}]
        }));
        let (_, day) = content.days().next().unwrap();
        let meals = day.unwrap().meals().unwrap();
        let lunch = meals.main_meals()[1].1.expect("lunch should survive");
        assert_eq!(lunch.name(), Some("Soup"));
        assert!(lunch.nutrition().is_none());
    }

    #[test]
    fn test_non_string_ingredients_are_dropped() {
        let meal: Meal = serde_json::from_value(json!({
            "ingredients": ["oats", 4, null, "milk"]
        }))
        .unwrap();
        assert_eq!(meal.ingredients().collect::<Vec<_>>(), vec!["oats", "milk"]);
    }

    #[test]
    fn test_instruction_steps_are_numbered() {
        let steps: Instructions = serde_json::from_value(json!(["Boil", "Serve"])).unwrap();
        assert_eq!(steps.to_text(), "1. Boil\n\n2. Serve");
        let text = Instructions::Text("Boil then serve.".into());
        assert_eq!(text.to_text(), "Boil then serve.");
    }

    #[test]
    fn test_non_string_steps_are_dropped() {
        let meal: Meal = serde_json::from_value(json!({
            "name": "Pasta",
            "instructions": ["Boil", 2, null, "Serve"]
        }))
        .unwrap();
        let instructions = meal.instructions().expect("remaining steps should be kept");
        assert_eq!(instructions.to_text(), "1. Boil\n\n2. Serve");
    }

    #[test]
    fn test_snacks_skip_malformed_entries() {
        let meals: Meals = serde_json::from_value(json!({
            "snacks": [{"name": "Nuts"}, 42, {"name": "Apple"}]
        }))
        .unwrap();
        let names: Vec<_> = meals.snacks().iter().filter_map(|s| s.name()).collect();
        assert_eq!(names, vec!["Nuts", "Apple"]);
    }

    #[test]
    fn test_render_options_dates() {
        let options: RenderOptions = serde_json::from_value(json!({
            "planType": "weekly",
            "createdAt": "2024-01-01T00:00:00Z",
            "isFreeTier": true
        }))
        .unwrap();
        assert_eq!(options.plan_type, PlanType::Weekly);
        assert_eq!(options.created_on().as_deref(), Some("2024-01-01"));
        assert_eq!(options.display_date().as_deref(), Some("January 1, 2024"));
    }

    #[test]
    fn test_unparseable_created_at_has_no_date() {
        let options = RenderOptions {
            plan_type: PlanType::Daily,
            created_at: "yesterday".into(),
            is_free_tier: false,
        };
        assert!(options.created_on().is_none());
        assert!(options.display_date().is_none());
    }
}
