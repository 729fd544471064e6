use crate::client::Collection;
use crate::confirm::{Choice, Confirmation, Prompt};
use crate::errors::AppError;
use crate::models::{ActivitySummary, CalendarEvent, Customer, CustomerDraft, EnrichedTraining, Training, TrainingDraft};
use crate::projection::{
    Granularity, Linked, action_href, events_in_window, load_calendar, load_customers, load_statistics, load_trainings,
};
use crate::state::AppState;
use crate::ui::{
    render_calendar, render_confirm, render_customer_edit, render_customers, render_statistics,
    render_training_edit, render_trainings,
};
use crate::view::View;
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{Html, Redirect},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteDecision {
    pub link: String,
    pub choice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub view: Option<String>,
    pub date: Option<String>,
}

pub async fn customers_page(State(state): State<AppState>) -> Html<String> {
    let view = View::mount("customers");
    let customers = view.load(load_customers(state.client.clone())).await;
    Html(render_customers(&customers))
}

pub async fn add_customer(
    State(state): State<AppState>,
    Form(draft): Form<CustomerDraft>,
) -> Redirect {
    match state.client.create::<Value, _>(Collection::Customers, &draft).await {
        Ok(_) => info!(firstname = %draft.firstname, lastname = %draft.lastname, "customer added"),
        Err(err) => error!("adding customer failed: {err}"),
    }
    Redirect::to("/")
}

pub async fn edit_customer_page(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
) -> Result<Html<String>, AppError> {
    let link = owned_link(&state, &query.link)?;
    let customer: Customer = state.client.get(link).await?;
    let action = action_href("/customers", "update", link);
    Ok(Html(render_customer_edit(&action, &CustomerDraft::from(&customer))))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
    Form(draft): Form<CustomerDraft>,
) -> Result<Redirect, AppError> {
    let link = owned_link(&state, &query.link)?;
    match state.client.update::<Value, _>(link, &draft).await {
        Ok(_) => info!(%link, "customer updated"),
        Err(err) => error!(%link, "updating customer failed: {err}"),
    }
    Ok(Redirect::to("/"))
}

pub async fn confirm_delete_customer(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
) -> Result<Html<String>, AppError> {
    let link = owned_link(&state, &query.link)?;
    Ok(Html(render_confirm(Prompt::DELETE_CUSTOMER, "/customers/delete", link, "/")))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Form(decision): Form<DeleteDecision>,
) -> Result<Redirect, AppError> {
    decide_delete(&state, Prompt::DELETE_CUSTOMER, &decision).await?;
    Ok(Redirect::to("/"))
}

pub async fn trainings_page(State(state): State<AppState>) -> Html<String> {
    let trainings_view = View::mount("trainings");
    let customers_view = View::mount("training-customers");
    let (trainings, customers) = tokio::join!(
        trainings_view.load(load_trainings(state.client.clone())),
        customers_view.load(load_customers(state.client.clone())),
    );
    let customers = customers.data().map(Vec::as_slice).unwrap_or_default();
    Html(render_trainings(&trainings, customers))
}

pub async fn add_training(
    State(state): State<AppState>,
    Form(draft): Form<TrainingDraft>,
) -> Result<Redirect, AppError> {
    let payload = draft.to_payload()?;
    match state.client.create::<Value, _>(Collection::Trainings, &payload).await {
        Ok(_) => info!(activity = %payload.activity, "training added"),
        Err(err) => error!("adding training failed: {err}"),
    }
    Ok(Redirect::to("/trainings"))
}

pub async fn edit_training_page(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
) -> Result<Html<String>, AppError> {
    let link = owned_link(&state, &query.link)?;
    let (training, customers) = tokio::join!(
        state.client.get::<Training>(link),
        load_customers(state.client.clone()),
    );
    let training = training?;
    let customers = customers.unwrap_or_else(|err| {
        error!("loading customers for the training form failed: {err}");
        Vec::new()
    });
    let action = action_href("/trainings", "update", link);
    Ok(Html(render_training_edit(&action, &training, &customers)))
}

pub async fn update_training(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
    Form(draft): Form<TrainingDraft>,
) -> Result<Redirect, AppError> {
    let link = owned_link(&state, &query.link)?;
    let payload = draft.to_payload()?;
    match state.client.update::<Value, _>(link, &payload).await {
        Ok(_) => info!(%link, "training updated"),
        Err(err) => error!(%link, "updating training failed: {err}"),
    }
    Ok(Redirect::to("/trainings"))
}

pub async fn confirm_delete_training(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
) -> Result<Html<String>, AppError> {
    let link = owned_link(&state, &query.link)?;
    Ok(Html(render_confirm(
        Prompt::DELETE_TRAINING,
        "/trainings/delete",
        link,
        "/trainings",
    )))
}

pub async fn delete_training(
    State(state): State<AppState>,
    Form(decision): Form<DeleteDecision>,
) -> Result<Redirect, AppError> {
    decide_delete(&state, Prompt::DELETE_TRAINING, &decision).await?;
    Ok(Redirect::to("/trainings"))
}

pub async fn calendar_page(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Html<String>, AppError> {
    let granularity = match query.view.as_deref() {
        Some(value) => value
            .parse::<Granularity>()
            .map_err(|value| AppError::bad_request(format!("unknown calendar view '{value}'")))?,
        None => Granularity::default(),
    };
    let anchor = match query.date.as_deref() {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request(format!("invalid date '{value}'")))?,
        None => Local::now().date_naive(),
    };

    let view = View::mount("calendar");
    let events = view.load(load_calendar(state.client.clone())).await;
    let all = events.data().map(Vec::as_slice).unwrap_or_default();
    let visible = events_in_window(all, granularity, anchor);
    Ok(Html(render_calendar(&events, &visible, granularity, anchor)))
}

pub async fn statistics_page(State(state): State<AppState>) -> Html<String> {
    let view = View::mount("statistics");
    let series = view
        .load(load_statistics(state.client.clone(), state.duration_policy))
        .await;
    Html(render_statistics(&series))
}

pub async fn api_customers(State(state): State<AppState>) -> Json<Vec<Linked<Customer>>> {
    let view = View::mount("api-customers");
    let customers = view.load(load_customers(state.client.clone())).await;
    Json(customers.data().cloned().unwrap_or_default())
}

pub async fn api_trainings(State(state): State<AppState>) -> Json<Vec<Linked<EnrichedTraining>>> {
    let view = View::mount("api-trainings");
    let trainings = view.load(load_trainings(state.client.clone())).await;
    Json(trainings.data().cloned().unwrap_or_default())
}

pub async fn api_calendar(State(state): State<AppState>) -> Json<Vec<CalendarEvent>> {
    let view = View::mount("api-calendar");
    let events = view.load(load_calendar(state.client.clone())).await;
    Json(events.data().cloned().unwrap_or_default())
}

pub async fn api_statistics(State(state): State<AppState>) -> Json<Vec<ActivitySummary>> {
    let view = View::mount("api-statistics");
    let series = view
        .load(load_statistics(state.client.clone(), state.duration_policy))
        .await;
    Json(series.data().cloned().unwrap_or_default())
}

async fn decide_delete(state: &AppState, prompt: Prompt, decision: &DeleteDecision) -> Result<(), AppError> {
    let link = owned_link(state, &decision.link)?;
    let choice = Choice::from_form(decision.choice.as_deref());
    let gate = Confirmation::new(prompt, || state.client.delete(link));

    match gate.resolve_async(choice).await {
        Some(Ok(())) => info!(%link, "deleted"),
        Some(Err(err)) => error!(%link, "delete failed: {err}"),
        None => info!(%link, ?choice, "delete not confirmed"),
    }
    Ok(())
}

fn owned_link<'a>(state: &AppState, link: &'a str) -> Result<&'a str, AppError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(AppError::bad_request("link is required"));
    }
    if !state.owns_link(link) {
        warn!(%link, "refusing link outside the configured API");
        return Err(AppError::bad_request("link does not belong to the API"));
    }
    Ok(link)
}
