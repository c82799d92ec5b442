//! Meal-plan document layout: cover, one page per day, grocery list.
//!
//! The builder flows content down the page with a running cursor and asks
//! the page geometry whether each block fits before drawing it (see
//! `layout::pagination`). Wrapped text is additionally flowed line by line,
//! so nothing is drawn below the bottom margin even when an estimate is short.
//!
//! Every user-influenced string is sanitized right before it is measured or
//! drawn, and any item that turns out malformed or empty is skipped on its own.

use serde_json::{Map, Value};
use tracing::debug;

use crate::layout::pagination::{
    ingredients_block_height, instructions_block_height, INGREDIENT_LINE_HEIGHT,
};
use crate::layout::Placement;
use crate::models::meal_plan::{Day, Meal, MealPlanContent, Nutrition, Overview, RenderOptions};
use crate::render::canvas::{Canvas, Rect, Surface, TextStyle};
use crate::render::sanitize::{sanitize_text, to_single_line, truncate_with_ellipsis};
use crate::render::theme;

/// Instruction text beyond this many characters is cut and ends with `...`.
pub const MAX_INSTRUCTION_CHARS: usize = 1200;
/// Snack names beyond this many characters are cut before wrapping.
pub const MAX_SNACK_NAME_CHARS: usize = 300;

const CARD_PADDING: f32 = 12.0;
const MEAL_SPACING: f32 = 20.0;
const BODY_LINE_HEIGHT: f32 = 14.0;
const NUTRITION_STRIP_HEIGHT: f32 = 26.0;
const SNACK_LINE_HEIGHT: f32 = 14.0;
const SNACK_CARD_PADDING: f32 = 10.0;
const CATEGORY_BAR_HEIGHT: f32 = 26.0;
const STAT_BOX_HEIGHT: f32 = 78.0;
const STAT_BOX_GAP: f32 = 15.0;
/// Room reserved for a meal card's label and first name line, so a label is never orphaned.
const MEAL_HEADER_HEIGHT: f32 = 50.0;
/// Distance of the cover caption from the bottom edge.
const COVER_FOOTER_OFFSET: f32 = 60.0;
/// Distance of day/grocery footers from the bottom edge.
const PAGE_FOOTER_OFFSET: f32 = 35.0;

const COVER_FOOTER_TEXT: &str =
    "Consult a healthcare professional before making significant changes to your diet.";
const PAGE_FOOTER_TEXT: &str = "MEALPLAN AI  •  Personalized nutrition plan";

pub struct DocumentBuilder<'a, S: Surface> {
    canvas: Canvas<S>,
    options: &'a RenderOptions,
    y: f32,
}

impl<'a, S: Surface> DocumentBuilder<'a, S> {
    pub fn new(canvas: Canvas<S>, options: &'a RenderOptions) -> Self {
        let y = canvas.page().margin_top;
        Self { canvas, options, y }
    }

    /// Lays out the whole document and hands back the canvas.
    pub fn build(mut self, content: &MealPlanContent) -> Canvas<S> {
        self.cover_page(content.overview());

        for (position, day) in content.days() {
            match day {
                Ok(day) => self.day_page(position, day),
                Err(raw) => debug!(position, raw = %raw, "skipping malformed day entry"),
            }
        }

        if let Some(list) = content.grocery_list() {
            self.grocery_pages(list);
        }

        self.canvas
    }

    // ── pagination ──────────────────────────────────────────────────────────

    fn new_page(&mut self) {
        self.canvas.add_page();
        self.y = self.canvas.page().margin_top;
    }

    /// Would-it-fit check: starts a new page unless `required` points fit below the cursor.
    fn ensure_space(&mut self, required: f32) {
        if self.canvas.page().place(self.y, required) == Placement::NewPage {
            self.new_page();
        }
    }

    /// Draws wrapped text line by line, breaking before any line that would cross the bottom margin.
    fn paragraph(&mut self, x: f32, width: f32, text: &str, style: TextStyle, line_height: f32) {
        for line in self.canvas.wrap(text, style, width) {
            if !self.canvas.page().line_fits(self.y, line_height) {
                self.new_page();
            }
            self.canvas.text(x, self.y, &line, style);
            self.y += line_height;
        }
    }

    fn divider(&mut self) {
        self.ensure_space(10.0);
        let page = self.canvas.page();
        let (x, width) = (page.margin_left, page.content_width());
        self.canvas.hline(x, self.y, width, theme::PRIMARY, 2.0);
        self.y += 20.0;
    }

    fn footer_if_room(&mut self) {
        if self.canvas.page().has_footer_room(self.y) {
            let y = self.canvas.page().height - PAGE_FOOTER_OFFSET;
            self.canvas.centered_text(y, PAGE_FOOTER_TEXT, theme::FOOTER);
        }
    }

    // ── cover ───────────────────────────────────────────────────────────────

    fn cover_page(&mut self, overview: Option<&Overview>) {
        self.new_page();
        let x = self.canvas.page().margin_left;

        self.canvas.text(x, self.y, theme::BRAND_NAME, theme::BRAND);
        self.y += 40.0;

        let badge = self.options.plan_type.badge_label();
        let badge_width = self.canvas.measure(badge, theme::BADGE) + 24.0;
        self.canvas
            .fill_rounded_rect(Rect::new(x, self.y, badge_width, 24.0), 12.0, theme::PRIMARY);
        self.canvas.text(x + 12.0, self.y + 7.0, badge, theme::BADGE);
        self.y += 40.0;

        let date = self
            .options
            .display_date()
            .unwrap_or_else(|| to_single_line(&sanitize_text(&self.options.created_at)));
        if !date.is_empty() {
            let width = self.canvas.page().content_width();
            let line = self
                .canvas
                .ellipsize(&format!("Generated on {date}"), theme::CAPTION, width);
            self.canvas.text(x, self.y, &line, theme::CAPTION);
        }
        self.y += 60.0;

        self.canvas.text(x, self.y, "YOUR PERSONALIZED", theme::TITLE);
        self.y += 42.0;
        self.canvas.text(x, self.y, "MEAL PLAN", theme::TITLE_ACCENT);
        self.y += 70.0;

        if let Some(overview) = overview {
            self.overview_grid(overview);
        }

        let footer_y = self.canvas.page().height - COVER_FOOTER_OFFSET;
        self.canvas
            .centered_text(footer_y, COVER_FOOTER_TEXT, theme::FOOTER);
    }

    fn overview_grid(&mut self, overview: &Overview) {
        let macros = overview.macros();
        let stats: Vec<(&str, String)> = [
            ("DAILY CALORIES", overview.daily_calories.map(|v| format!("{} kcal", format_number(v)))),
            ("PROTEIN", macros.and_then(|m| m.protein).map(|v| format!("{}g", format_number(v)))),
            ("CARBS", macros.and_then(|m| m.carbs).map(|v| format!("{}g", format_number(v)))),
            ("FAT", macros.and_then(|m| m.fat).map(|v| format!("{}g", format_number(v)))),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect();

        let page = self.canvas.page();
        let (left, box_width) = (page.margin_left, (page.content_width() - STAT_BOX_GAP) / 2.0);

        for (i, (label, value)) in stats.iter().enumerate() {
            let column = (i % 2) as f32;
            let row = (i / 2) as f32;
            let rect = Rect::new(
                left + column * (box_width + STAT_BOX_GAP),
                self.y + row * (STAT_BOX_HEIGHT + STAT_BOX_GAP),
                box_width,
                STAT_BOX_HEIGHT,
            );
            self.canvas.bordered_box(rect, theme::CARD, theme::CARD_BORDER);
            self.canvas.text(rect.x + 15.0, rect.y + 15.0, label, theme::STAT_LABEL);
            self.canvas.text(rect.x + 15.0, rect.y + 36.0, value, theme::STAT_VALUE);
        }

        let rows = stats.len().div_ceil(2) as f32;
        self.y += rows * (STAT_BOX_HEIGHT + STAT_BOX_GAP);

        if let Some(duration) = overview.duration {
            self.y += 10.0;
            let unit = if duration == 1.0 { "day" } else { "days" };
            let line = format!("Plan duration: {} {unit}", format_number(duration));
            self.canvas.text(left, self.y, &line, theme::CAPTION);
            self.y += 20.0;
        }
    }

    // ── day pages ───────────────────────────────────────────────────────────

    fn day_page(&mut self, position: usize, day: &Day) {
        self.new_page();
        let x = self.canvas.page().margin_left;
        let number = day.number(position);

        self.canvas
            .text(x, self.y, &format!("DAY {number}"), theme::PAGE_HEADER);
        self.y += 36.0;
        self.divider();

        let Some(meals) = day.meals() else {
            debug!(day = number, "day has no meals");
            self.footer_if_room();
            return;
        };

        for (label, meal) in meals.main_meals() {
            if let Some(meal) = meal {
                self.y = self.meal_card(label, meal);
                self.y += MEAL_SPACING;
            }
        }

        let snacks = meals.snacks();
        if !snacks.is_empty() {
            self.snacks_section(&snacks);
        }

        self.footer_if_room();
    }

    /// Draws a full meal card at the cursor and returns the cursor below it.
    fn meal_card(&mut self, label: &str, meal: &Meal) -> f32 {
        self.ensure_space(MEAL_HEADER_HEIGHT);
        let page = self.canvas.page().clone();
        let inner_x = page.margin_left + CARD_PADDING;
        let inner_width = page.content_width() - 2.0 * CARD_PADDING;
        let start_page = self.canvas.page_count();
        let start_y = self.y;

        self.y += CARD_PADDING;
        self.canvas.text(inner_x, self.y, label, theme::MEAL_LABEL);
        self.y += 16.0;

        let name = meal.name().map(sanitize_text).unwrap_or_default();
        if !name.is_empty() {
            self.paragraph(inner_x, inner_width, &name, theme::MEAL_NAME, 19.0);
            self.y += 6.0;
        }

        if let Some(strip) = meal.nutrition().and_then(nutrition_summary) {
            self.ensure_space(NUTRITION_STRIP_HEIGHT);
            let rect = Rect::new(inner_x, self.y, inner_width, NUTRITION_STRIP_HEIGHT);
            self.canvas.bordered_box(rect, theme::CARD, theme::CARD_BORDER);
            self.canvas
                .text(inner_x + 10.0, self.y + 8.0, &strip, theme::BODY);
            self.y += NUTRITION_STRIP_HEIGHT + 10.0;
        }

        let ingredients: Vec<String> = meal
            .ingredients()
            .map(sanitize_text)
            .filter(|i| !i.is_empty())
            .collect();
        if !ingredients.is_empty() {
            self.ensure_space(ingredients_block_height(ingredients.len()));
            self.canvas
                .text(inner_x, self.y, "INGREDIENTS:", theme::BLOCK_HEADER);
            self.y += 20.0;
            for ingredient in &ingredients {
                self.ensure_space(INGREDIENT_LINE_HEIGHT);
                let line = format!("• {ingredient}");
                self.paragraph(inner_x + 8.0, inner_width - 8.0, &line, theme::BODY, BODY_LINE_HEIGHT);
                self.y += INGREDIENT_LINE_HEIGHT - BODY_LINE_HEIGHT;
            }
            self.y += 6.0;
        }

        let instructions = meal
            .instructions()
            .map(|i| sanitize_text(&i.to_text()))
            .map(|text| truncate_with_ellipsis(&text, MAX_INSTRUCTION_CHARS))
            .unwrap_or_default();
        if !instructions.is_empty() {
            let text_height =
                self.canvas
                    .text_height(&instructions, theme::BODY, inner_width, BODY_LINE_HEIGHT);
            self.ensure_space(instructions_block_height(text_height));
            self.canvas
                .text(inner_x, self.y, "INSTRUCTIONS:", theme::BLOCK_HEADER);
            self.y += 20.0;
            self.paragraph(inner_x, inner_width, &instructions, theme::BODY, BODY_LINE_HEIGHT);
        }

        self.y += CARD_PADDING;

        // Border the part of the card on the page it ends on.
        let top = if self.canvas.page_count() == start_page {
            start_y
        } else {
            page.margin_top
        };
        let bottom = self.y.min(page.content_bottom());
        let rect = Rect::new(page.margin_left, top, page.content_width(), bottom - top);
        self.canvas.stroke_rect(rect, theme::CARD_BORDER);

        self.y
    }

    fn snacks_section(&mut self, snacks: &[&Meal]) {
        let page = self.canvas.page().clone();
        self.ensure_space(30.0);
        self.canvas
            .text(page.margin_left, self.y, "SNACKS", theme::SECTION_HEADER);
        self.y += 24.0;

        let inner_x = page.margin_left + CARD_PADDING;
        let inner_width = page.content_width() - 2.0 * CARD_PADDING;

        for snack in snacks {
            let name = snack
                .name()
                .map(sanitize_text)
                .map(|n| truncate_with_ellipsis(&n, MAX_SNACK_NAME_CHARS))
                .unwrap_or_default();
            let calories = snack
                .nutrition()
                .and_then(|n| n.calories)
                .map(|c| format!("{} kcal", format_number(c)));
            if name.is_empty() && calories.is_none() {
                debug!("skipping empty snack");
                continue;
            }

            let mut name_lines = if name.is_empty() {
                Vec::new()
            } else {
                self.canvas.wrap(&name, theme::SNACK_NAME, inner_width)
            };
            let calorie_height = if calories.is_some() { SNACK_LINE_HEIGHT } else { 0.0 };

            // A snack card never breaks, so it must fit on an empty page.
            let room = page.content_bottom() - page.margin_top - 2.0 * SNACK_CARD_PADDING - calorie_height;
            let max_lines = ((room / SNACK_LINE_HEIGHT).floor() as usize).max(1);
            if name_lines.len() > max_lines {
                name_lines.truncate(max_lines);
                if let Some(last) = name_lines.last_mut() {
                    let cut = self.canvas.cut_with_ellipsis(last, theme::SNACK_NAME, inner_width);
                    *last = cut;
                }
            }

            let card_height = 2.0 * SNACK_CARD_PADDING
                + name_lines.len() as f32 * SNACK_LINE_HEIGHT
                + calorie_height;

            self.ensure_space(card_height);
            let rect = Rect::new(page.margin_left, self.y, page.content_width(), card_height);
            self.canvas.bordered_box(rect, theme::CARD, theme::CARD_BORDER);

            let mut line_y = self.y + SNACK_CARD_PADDING;
            for line in &name_lines {
                self.canvas.text(inner_x, line_y, line, theme::SNACK_NAME);
                line_y += SNACK_LINE_HEIGHT;
            }
            if let Some(calories) = &calories {
                self.canvas.text(inner_x, line_y, calories, theme::CAPTION);
            }

            self.y += card_height + 8.0;
        }
    }

    // ── grocery list ────────────────────────────────────────────────────────

    fn grocery_pages(&mut self, list: &Map<String, Value>) {
        let categories: Vec<(String, Vec<String>)> = list
            .iter()
            .filter_map(|(category, items)| {
                let Some(items) = items.as_array() else {
                    debug!(category = %category, "grocery category is not a list");
                    return None;
                };
                let items: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(sanitize_text)
                    .filter(|i| !i.is_empty())
                    .collect();
                if items.is_empty() {
                    return None;
                }
                let name = to_single_line(&sanitize_text(category)).to_uppercase();
                let name = if name.is_empty() { "OTHER".to_string() } else { name };
                Some((name, items))
            })
            .collect();

        if categories.is_empty() {
            return;
        }

        self.new_page();
        let page = self.canvas.page().clone();
        let inner_x = page.margin_left + CARD_PADDING;
        let inner_width = page.content_width() - 2.0 * CARD_PADDING;

        self.canvas
            .text(page.margin_left, self.y, "GROCERY LIST", theme::PAGE_HEADER);
        self.y += 36.0;
        self.divider();

        for (name, items) in &categories {
            // Keep the bar together with its first item.
            self.ensure_space(CATEGORY_BAR_HEIGHT + INGREDIENT_LINE_HEIGHT);
            let bar = Rect::new(page.margin_left, self.y, page.content_width(), CATEGORY_BAR_HEIGHT);
            self.canvas.bordered_box(bar, theme::CARD, theme::CARD_BORDER);
            let label = self.canvas.ellipsize(name, theme::CATEGORY, inner_width);
            self.canvas.text(inner_x, self.y + 8.0, &label, theme::CATEGORY);
            self.y += CATEGORY_BAR_HEIGHT + 8.0;

            for item in items {
                self.ensure_space(INGREDIENT_LINE_HEIGHT);
                let line = format!("• {item}");
                self.paragraph(inner_x, inner_width, &line, theme::BODY, BODY_LINE_HEIGHT);
                self.y += INGREDIENT_LINE_HEIGHT - BODY_LINE_HEIGHT;
            }
            self.y += 12.0;
        }

        self.footer_if_room();
    }
}

/// Joins the nutrition fields that are present with a bullet separator.
fn nutrition_summary(nutrition: &Nutrition) -> Option<String> {
    let parts: Vec<String> = [
        nutrition.calories.map(|v| format!("{} kcal", format_number(v))),
        nutrition.protein.map(|v| format!("{}g protein", format_number(v))),
        nutrition.carbs.map(|v| format!("{}g carbs", format_number(v))),
        nutrition.fat.map(|v| format!("{}g fat", format_number(v))),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!parts.is_empty()).then(|| parts.join(" • "))
}

/// Prints integral values without a fractional part: `300`, `10.5`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
