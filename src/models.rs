use crate::errors::ValidationError;
use crate::links::{ResourceLinks, id_from_href};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_CUSTOMER: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub firstname: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lastname: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub streetaddress: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postcode: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(flatten)]
    pub links: ResourceLinks,
}

impl Customer {
    pub fn id(&self) -> Option<String> {
        self.id
            .clone()
            .or_else(|| self.links.self_href().and_then(id_from_href))
    }

    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.firstname.trim(), self.lastname.trim());
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn resource_link(&self, collection_url: &str) -> Option<String> {
        resource_link(&self.links, self.id(), collection_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Link(String),
    Embedded(Box<Customer>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CustomerSource<'a> {
    Embedded(&'a Customer),
    Link(&'a str),
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Training {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity: String,
    #[serde(default)]
    pub duration: Value,
    #[serde(default, deserialize_with = "lenient_customer", skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
    #[serde(flatten)]
    pub links: ResourceLinks,
}

impl Training {
    pub fn id(&self) -> Option<String> {
        self.id
            .clone()
            .or_else(|| self.links.self_href().and_then(id_from_href))
    }

    pub fn resource_link(&self, collection_url: &str) -> Option<String> {
        resource_link(&self.links, self.id(), collection_url)
    }

    pub fn customer_source(&self) -> CustomerSource<'_> {
        match &self.customer {
            Some(CustomerRef::Embedded(customer)) => CustomerSource::Embedded(&**customer),
            Some(CustomerRef::Link(link)) if !link.trim().is_empty() => {
                CustomerSource::Link(link.as_str())
            }
            _ => match self.links.href("customer") {
                Some(link) => CustomerSource::Link(link),
                None => CustomerSource::Missing,
            },
        }
    }

    pub fn embedded_customer(&self) -> Option<&Customer> {
        match &self.customer {
            Some(CustomerRef::Embedded(customer)) => Some(&**customer),
            _ => None,
        }
    }

    pub fn minutes(&self) -> Option<i64> {
        coerce_minutes(&self.duration)
    }

    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTraining {
    #[serde(flatten)]
    pub training: Training,
    #[serde(rename = "customerName")]
    pub customer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub activity: String,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDraft {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub streetaddress: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
}

impl From<&Customer> for CustomerDraft {
    fn from(customer: &Customer) -> Self {
        Self {
            firstname: customer.firstname.clone(),
            lastname: customer.lastname.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            streetaddress: customer.streetaddress.clone(),
            postcode: customer.postcode.clone(),
            city: customer.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrainingDraft {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub customer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPayload {
    pub date: String,
    pub activity: String,
    pub duration: i64,
    pub customer: String,
}

impl TrainingDraft {
    pub fn to_payload(&self) -> Result<TrainingPayload, ValidationError> {
        let activity = self.activity.trim();
        if activity.is_empty() {
            return Err(ValidationError::Missing("activity"));
        }
        let customer = self.customer.trim();
        if customer.is_empty() {
            return Err(ValidationError::Missing("customer"));
        }
        let date = parse_form_date(&self.date)?;

        Ok(TrainingPayload {
            date: date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            activity: activity.to_string(),
            duration: coerce_minutes(&Value::String(self.duration.clone())).unwrap_or(0),
            customer: customer.to_string(),
        })
    }
}

// datetime-local input is taken as UTC.
fn parse_form_date(raw: &str) -> Result<DateTime<chrono::Utc>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Missing("date"));
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.to_utc());
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))
}

const OFFSET_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// ISO-8601 date-times: RFC 3339, basic offsets (`+0000`), minute
/// precision. Offset-less timestamps are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp);
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

pub fn coerce_minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(text) => leading_integer(text),
        _ => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn resource_link(links: &ResourceLinks, id: Option<String>, collection_url: &str) -> Option<String> {
    if let Some(href) = links.self_href() {
        return Some(href.to_string());
    }
    id.map(|id| format!("{}/{}", collection_url.trim_end_matches('/'), id))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// Anything but a link string or a customer object counts as no reference.
fn lenient_customer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CustomerRef>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(link) => Some(CustomerRef::Link(link)),
        value @ Value::Object(_) => serde_json::from_value::<Customer>(value)
            .ok()
            .map(|customer| CustomerRef::Embedded(Box::new(customer))),
        _ => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
