use crate::models::{CustomerSource, EnrichedTraining, Training, UNKNOWN_CUSTOMER};
use crate::resolver::LinkResolver;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::warn;

/// Same length and order as the input; a failed lookup only turns its
/// own rows into "Unknown".
pub async fn enrich(resolver: &LinkResolver, trainings: Vec<Training>) -> Vec<EnrichedTraining> {
    let mut links: Vec<String> = Vec::new();
    for training in &trainings {
        if let CustomerSource::Link(link) = training.customer_source() {
            if !links.iter().any(|seen| seen == link) {
                links.push(link.to_string());
            }
        }
    }

    let outcomes = join_all(links.iter().map(|link| resolver.resolve(link))).await;
    let mut names: HashMap<String, String> = HashMap::with_capacity(links.len());
    for (link, outcome) in links.into_iter().zip(outcomes) {
        let name = match outcome {
            Ok(customer) => customer.display_name(),
            Err(err) => {
                warn!("customer lookup failed: {err}");
                None
            }
        };
        names.insert(link, name.unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()));
    }

    attach_names(trainings, |link| names.get(link).cloned())
}

/// Names from embedded customers only; linked customers are not fetched.
pub fn enrich_embedded(trainings: Vec<Training>) -> Vec<EnrichedTraining> {
    attach_names(trainings, |_| None)
}

fn attach_names(
    trainings: Vec<Training>,
    linked_name: impl Fn(&str) -> Option<String>,
) -> Vec<EnrichedTraining> {
    trainings
        .into_iter()
        .map(|training| {
            let customer_name = match training.customer_source() {
                CustomerSource::Embedded(customer) => customer.display_name(),
                CustomerSource::Link(link) => linked_name(link),
                CustomerSource::Missing => None,
            }
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
            EnrichedTraining {
                training,
                customer_name,
            }
        })
        .collect()
}
