use crate::models::{ActivitySummary, EnrichedTraining, coerce_minutes};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Activity,
    CustomerName,
    Date,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    #[default]
    CountAsZero,
    Exclude,
}

impl FromStr for DurationPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zero" | "count-as-zero" => Ok(Self::CountAsZero),
            "exclude" => Ok(Self::Exclude),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: i64,
}

impl EnrichedTraining {
    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::Activity => self.training.activity.clone(),
            Field::CustomerName => self.customer_name.clone(),
            Field::Date => self.training.date.clone(),
            Field::Duration => match &self.training.duration {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            },
        }
    }

    pub fn field_number(&self, field: Field) -> Option<i64> {
        match field {
            Field::Duration => self.training.minutes(),
            other => coerce_minutes(&Value::String(self.field_text(other))),
        }
    }
}

pub fn aggregate(
    rows: &[EnrichedTraining],
    group_key: Field,
    sum_field: Field,
    policy: DurationPolicy,
) -> Vec<GroupTotal> {
    let mut totals: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let value = match (row.field_number(sum_field), policy) {
            (Some(value), _) => value,
            (None, DurationPolicy::CountAsZero) => 0,
            (None, DurationPolicy::Exclude) => continue,
        };

        let key = row.field_text(group_key);
        match index.get(&key) {
            Some(&slot) => totals[slot].total = totals[slot].total.saturating_add(value),
            None => {
                index.insert(key.clone(), totals.len());
                totals.push(GroupTotal { key, total: value });
            }
        }
    }

    totals
}

pub fn activity_summary(rows: &[EnrichedTraining], policy: DurationPolicy) -> Vec<ActivitySummary> {
    aggregate(rows, Field::Activity, Field::Duration, policy)
        .into_iter()
        .map(|group| ActivitySummary {
            activity: group.key,
            duration: group.total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Training;
    use serde_json::json;

    fn row(activity: &str, duration: Value, customer: &str) -> EnrichedTraining {
        let training: Training =
            serde_json::from_value(json!({ "activity": activity, "duration": duration })).unwrap();
        EnrichedTraining {
            training,
            customer_name: customer.to_string(),
        }
    }

    fn mixed_rows() -> Vec<EnrichedTraining> {
        vec![
            row("Run", json!("30"), "A B"),
            row("Gym", json!(45), "Unknown"),
            row("Run", json!(20), "Unknown"),
            row("run", json!(10), "A B"),
            row("Gym", json!("pitkä"), "A B"),
            row("Yoga", Value::Null, "A B"),
        ]
    }

    #[test]
    fn linked_and_embedded_runs_sum_to_fifty() {
        let rows = vec![row("Run", json!("30"), "A B"), row("Run", json!(20), "Unknown")];
        assert_eq!(
            activity_summary(&rows, DurationPolicy::CountAsZero),
            vec![ActivitySummary {
                activity: "Run".into(),
                duration: 50
            }]
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(activity_summary(&[], DurationPolicy::CountAsZero).is_empty());
        assert!(aggregate(&[], Field::CustomerName, Field::Duration, DurationPolicy::Exclude).is_empty());
    }

    #[test]
    fn groups_are_exact_and_in_first_occurrence_order() {
        let summary = activity_summary(&mixed_rows(), DurationPolicy::CountAsZero);
        let keys: Vec<_> = summary.iter().map(|s| s.activity.as_str()).collect();
        assert_eq!(keys, ["Run", "Gym", "run", "Yoga"]);
        assert_eq!(summary[0].duration, 50);
        assert_eq!(summary[1].duration, 45);
        assert_eq!(summary[2].duration, 10);
        assert_eq!(summary[3].duration, 0);
    }

    #[test]
    fn exclude_policy_drops_non_numeric_rows() {
        let summary = activity_summary(&mixed_rows(), DurationPolicy::Exclude);
        let keys: Vec<_> = summary.iter().map(|s| s.activity.as_str()).collect();
        assert_eq!(keys, ["Run", "Gym", "run"]);
        assert_eq!(summary[1].duration, 45);
    }

    #[test]
    fn totals_are_conserved_under_both_policies() {
        let rows = mixed_rows();
        let expected: i64 = rows
            .iter()
            .map(|row| row.training.minutes().unwrap_or(0))
            .sum();
        for policy in [DurationPolicy::CountAsZero, DurationPolicy::Exclude] {
            let total: i64 = aggregate(&rows, Field::Activity, Field::Duration, policy)
                .iter()
                .map(|group| group.total)
                .sum();
            assert_eq!(total, expected, "{policy:?}");
        }
    }

    #[test]
    fn groups_by_other_fields() {
        let by_customer = aggregate(&mixed_rows(), Field::CustomerName, Field::Duration, DurationPolicy::CountAsZero);
        assert_eq!(
            by_customer,
            vec![
                GroupTotal { key: "A B".into(), total: 40 },
                GroupTotal { key: "Unknown".into(), total: 65 },
            ]
        );
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("zero".parse::<DurationPolicy>(), Ok(DurationPolicy::CountAsZero));
        assert_eq!(" Exclude ".parse::<DurationPolicy>(), Ok(DurationPolicy::Exclude));
        assert_eq!("skip".parse::<DurationPolicy>(), Err("skip".to_string()));
    }
}
