use crate::client::{Collection, ResourceClient};
use crate::enrich::{enrich, enrich_embedded};
use crate::errors::NetworkError;
use crate::models::{
    ActivitySummary, CalendarEvent, Customer, EnrichedTraining, Training, UNKNOWN_CUSTOMER,
};
use crate::resolver::LinkResolver;
use crate::stats::{DurationPolicy, activity_summary};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::str::FromStr;
use tracing::warn;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Linked<T> {
    #[serde(flatten)]
    pub record: T,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRender {
    Text,
    Edit(&'static str),
    Delete(&'static str),
}

pub struct Column<T> {
    pub field: &'static str,
    pub header: &'static str,
    pub format: fn(&T) -> String,
    pub render: CellRender,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Link { href: String, label: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub fields: Vec<&'static str>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn build_grid<T>(rows: &[T], columns: &[Column<T>]) -> Grid {
    Grid {
        fields: columns.iter().map(|column| column.field).collect(),
        headers: columns.iter().map(|column| column.header).collect(),
        rows: rows
            .iter()
            .map(|row| columns.iter().map(|column| cell(row, column)).collect())
            .collect(),
    }
}

fn cell<T>(row: &T, column: &Column<T>) -> Cell {
    let value = (column.format)(row);
    let (prefix, action, label) = match column.render {
        CellRender::Text => return Cell::Text(value),
        CellRender::Edit(prefix) => (prefix, "edit", "Muokkaa"),
        CellRender::Delete(prefix) => (prefix, "delete", "Poista"),
    };
    if value.is_empty() {
        return Cell::Text(String::new());
    }
    Cell::Link {
        href: action_href(prefix, action, &value),
        label,
    }
}

pub fn action_href(prefix: &str, action: &str, link: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("link", link)
        .finish();
    format!("{prefix}/{action}?{query}")
}

fn link_of<T>(row: &Linked<T>) -> String {
    row.link.clone().unwrap_or_default()
}

pub fn customer_columns() -> Vec<Column<Linked<Customer>>> {
    vec![
        Column { field: "firstname", header: "Etunimi", format: |row| row.record.firstname.clone(), render: CellRender::Text },
        Column { field: "lastname", header: "Sukunimi", format: |row| row.record.lastname.clone(), render: CellRender::Text },
        Column { field: "email", header: "Email", format: |row| row.record.email.clone(), render: CellRender::Text },
        Column { field: "phone", header: "Puhelin", format: |row| row.record.phone.clone(), render: CellRender::Text },
        Column { field: "streetaddress", header: "Osoite", format: |row| row.record.streetaddress.clone(), render: CellRender::Text },
        Column { field: "postcode", header: "Postinumero", format: |row| row.record.postcode.clone(), render: CellRender::Text },
        Column { field: "city", header: "Kaupunki", format: |row| row.record.city.clone(), render: CellRender::Text },
        Column { field: "link", header: "Muokkaa", format: link_of, render: CellRender::Edit("/customers") },
        Column { field: "link", header: "Poista", format: link_of, render: CellRender::Delete("/customers") },
    ]
}

pub fn training_columns() -> Vec<Column<Linked<EnrichedTraining>>> {
    vec![
        Column { field: "customerName", header: "Asiakas", format: |row| row.record.customer_name.clone(), render: CellRender::Text },
        Column { field: "activity", header: "Aktiviteetti", format: |row| row.record.training.activity.clone(), render: CellRender::Text },
        Column {
            field: "duration",
            header: "Kesto",
            format: |row| row.record.training.minutes().map(|m| m.to_string()).unwrap_or_default(),
            render: CellRender::Text,
        },
        Column { field: "date", header: "Päivämäärä", format: |row| format_date(&row.record.training), render: CellRender::Text },
        Column { field: "link", header: "Muokkaa", format: link_of, render: CellRender::Edit("/trainings") },
        Column { field: "link", header: "Poista", format: link_of, render: CellRender::Delete("/trainings") },
    ]
}

pub fn format_date(training: &Training) -> String {
    match training.starts_at() {
        Some(start) => start.format("%d.%m.%Y %H:%M").to_string(),
        None => training.date.clone(),
    }
}

pub fn calendar_title(training: &Training) -> String {
    let name = training
        .embedded_customer()
        .and_then(Customer::display_name)
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    format!("{} ({})", training.activity, name)
}

pub fn calendar_events(trainings: &[Training]) -> Vec<CalendarEvent> {
    trainings
        .iter()
        .filter_map(|training| {
            let Some(start) = training.starts_at() else {
                warn!(date = %training.date, "skipping training with unreadable date");
                return None;
            };
            let minutes = training.minutes().unwrap_or(0).max(0);
            let end = Duration::try_minutes(minutes)
                .and_then(|length| start.checked_add_signed(length))
                .unwrap_or(start);
            Some(CalendarEvent {
                title: calendar_title(training),
                start,
                end,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    Month,
    #[default]
    Week,
    Day,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            other => Err(other.to_string()),
        }
    }
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    /// Inclusive first and last day of the period containing `anchor`.
    pub fn window(self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Day => (anchor, anchor),
            Self::Week => {
                let start = week_start(anchor);
                (start, start + Duration::days(6))
            }
            Self::Month => {
                let start = anchor.with_day(1).unwrap_or(anchor);
                let next = start
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap_or(start);
                (start, next - Duration::days(1))
            }
        }
    }

    pub fn shift(self, anchor: NaiveDate, step: i32) -> NaiveDate {
        match self {
            Self::Day => anchor + Duration::days(step.into()),
            Self::Week => anchor + Duration::weeks(step.into()),
            Self::Month => {
                let months = chrono::Months::new(step.unsigned_abs());
                let shifted = if step < 0 {
                    anchor.checked_sub_months(months)
                } else {
                    anchor.checked_add_months(months)
                };
                shifted.unwrap_or(anchor)
            }
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn events_in_window(events: &[CalendarEvent], granularity: Granularity, anchor: NaiveDate) -> Vec<CalendarEvent> {
    let (first, last) = granularity.window(anchor);
    let mut visible: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| {
            let day = event.start.date_naive();
            day >= first && day <= last
        })
        .cloned()
        .collect();
    visible.sort_by_key(|event| event.start);
    visible
}

pub async fn load_customers(client: ResourceClient) -> Result<Vec<Linked<Customer>>, NetworkError> {
    let collection_url = client.collection_url(Collection::Customers);
    let customers: Vec<Customer> = client.list(Collection::Customers).await?;
    Ok(customers
        .into_iter()
        .map(|mut customer| {
            customer.id = customer.id();
            let link = customer.resource_link(&collection_url);
            Linked { record: customer, link }
        })
        .collect())
}

pub async fn load_trainings(client: ResourceClient) -> Result<Vec<Linked<EnrichedTraining>>, NetworkError> {
    let collection_url = client.collection_url(Collection::Trainings);
    let trainings: Vec<Training> = client.list(Collection::Trainings).await?;
    let resolver = LinkResolver::new(client);
    Ok(enrich(&resolver, trainings)
        .await
        .into_iter()
        .map(|mut row| {
            row.training.id = row.training.id();
            let link = row.training.resource_link(&collection_url);
            Linked { record: row, link }
        })
        .collect())
}

pub async fn load_calendar(client: ResourceClient) -> Result<Vec<CalendarEvent>, NetworkError> {
    let trainings: Vec<Training> = client.list(Collection::Trainings).await?;
    Ok(calendar_events(&trainings))
}

pub async fn load_statistics(
    client: ResourceClient,
    policy: DurationPolicy,
) -> Result<Vec<ActivitySummary>, NetworkError> {
    // The summary never reads customer names, so links are not followed.
    let trainings: Vec<Training> = client.list(Collection::Trainings).await?;
    Ok(activity_summary(&enrich_embedded(trainings), policy))
}
