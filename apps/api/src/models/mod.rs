pub mod meal_plan;
