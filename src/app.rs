use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::customers_page))
        .route("/customers", post(handlers::add_customer))
        .route("/customers/edit", get(handlers::edit_customer_page))
        .route("/customers/update", post(handlers::update_customer))
        .route(
            "/customers/delete",
            get(handlers::confirm_delete_customer).post(handlers::delete_customer),
        )
        .route("/trainings", get(handlers::trainings_page).post(handlers::add_training))
        .route("/trainings/edit", get(handlers::edit_training_page))
        .route("/trainings/update", post(handlers::update_training))
        .route(
            "/trainings/delete",
            get(handlers::confirm_delete_training).post(handlers::delete_training),
        )
        .route("/calendar", get(handlers::calendar_page))
        .route("/statistics", get(handlers::statistics_page))
        .route("/api/customers", get(handlers::api_customers))
        .route("/api/trainings", get(handlers::api_trainings))
        .route("/api/calendar", get(handlers::api_calendar))
        .route("/api/statistics", get(handlers::api_statistics))
        .with_state(state)
}
