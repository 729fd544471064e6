use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelLink {
    pub rel: String,
    pub href: String,
}

/// HAL `_links: {rel: {href}}` and list style `links: [{rel, href}]`.
/// Entries of any other shape are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLinks {
    #[serde(
        rename = "_links",
        default,
        deserialize_with = "lenient_hal",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub hal: BTreeMap<String, Href>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<RelLink>,
}

impl ResourceLinks {
    pub fn href(&self, rel: &str) -> Option<&str> {
        if let Some(link) = self.hal.get(rel) {
            return Some(link.href.as_str());
        }
        self.links
            .iter()
            .find(|link| link.rel == rel)
            .map(|link| link.href.as_str())
    }

    pub fn self_href(&self) -> Option<&str> {
        self.href("self")
    }
}

fn href_of(value: Value) -> Option<Href> {
    match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        // HAL allows several links per rel; the first one wins.
        Value::Array(entries) => entries.into_iter().find_map(href_of),
        _ => None,
    }
}

fn lenient_hal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, Href>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(rels) => rels
            .into_iter()
            .filter_map(|(rel, value)| href_of(value).map(|href| (rel, href)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RelLink>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub fn id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_id_from_self_link() {
        assert_eq!(
            id_from_href("https://api.example/api/customers/42").as_deref(),
            Some("42")
        );
        assert_eq!(id_from_href("https://api.example/api/customers/42/").as_deref(), Some("42"));
        assert_eq!(id_from_href("/api/trainings/7?projection=full").as_deref(), Some("7"));
        assert_eq!(id_from_href(""), None);
        assert_eq!(id_from_href("https://"), None);
    }

    #[test]
    fn reads_both_link_dialects() {
        let hal: ResourceLinks = serde_json::from_value(json!({
            "_links": {
                "self": { "href": "https://api.example/api/customers/1" },
                "customer": { "href": "https://api.example/api/customers/1" }
            }
        }))
        .unwrap();
        assert_eq!(hal.self_href(), Some("https://api.example/api/customers/1"));

        let listed: ResourceLinks = serde_json::from_value(json!({
            "links": [
                { "rel": "self", "href": "https://api.example/api/trainings/9" },
                { "rel": "customer", "href": "https://api.example/api/trainings/9/customer" }
            ]
        }))
        .unwrap();
        assert_eq!(
            listed.href("customer"),
            Some("https://api.example/api/trainings/9/customer")
        );
        assert_eq!(listed.href("missing"), None);
    }

    #[test]
    fn tolerates_link_arrays_and_junk() {
        let links: ResourceLinks = serde_json::from_value(json!({
            "_links": {
                "customer": [
                    { "title": "no href" },
                    { "href": "https://api.example/api/customers/3" },
                    { "href": "https://api.example/api/customers/4" }
                ],
                "self": "https://api.example/api/trainings/1",
                "curies": null
            },
            "links": [{ "rel": "profile" }, { "rel": "edit", "href": "/edit/1" }]
        }))
        .unwrap();
        assert_eq!(links.href("customer"), Some("https://api.example/api/customers/3"));
        assert_eq!(links.self_href(), None);
        assert_eq!(links.href("edit"), Some("/edit/1"));
        assert_eq!(links.links.len(), 1);

        let junk: ResourceLinks = serde_json::from_value(json!({ "_links": 5, "links": "none" })).unwrap();
        assert_eq!(junk, ResourceLinks::default());
    }
}
