use crate::render::MealPlanRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PDF renderer. Holds the process-wide font resources and the page geometry.
    pub renderer: MealPlanRenderer,
}
