// src/api/mock.rs - In-memory RecordSource for tests
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::client::{QueryOutcome, Record, RecordSource};
use crate::api::query::QueryParams;

static LIKE_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+) LIKE "%(.*)%"$"#).unwrap());
static EQ_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+)="(.*)"$"#).unwrap());
static IN_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+) IN \((.*)\)$"#).unwrap());

/// Serves records from memory, evaluating the small subset of ODSQL the
/// crate emits. Every query is logged so tests can count requests.
#[derive(Default)]
pub struct MockRecordSource {
    datasets: HashMap<String, Vec<Record>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, dataset: &str, record: Value) -> Self {
        let record = record.as_object().cloned().expect("record must be an object");
        self.datasets.entry(dataset.to_string()).or_default().push(record);
        self
    }

    /// Every query against `dataset` fails as a transport error.
    pub fn failing(mut self, dataset: &str) -> Self {
        self.failing.insert(dataset.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().unwrap().clone()
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn clause_matches(record: &Record, clause: &str) -> bool {
    let field_value = |field: &str| record.get(field).and_then(value_as_string);

    if let Some(caps) = LIKE_CLAUSE.captures(clause) {
        let needle = caps[2]
            .replace("\\\\", "\\")
            .replace("\\%", "%")
            .replace("\\_", "_")
            .to_uppercase();
        return field_value(&caps[1])
            .map(|v| v.to_uppercase().contains(&needle))
            .unwrap_or(false);
    }
    if let Some(caps) = IN_CLAUSE.captures(clause) {
        let allowed: Vec<String> = caps[2]
            .split(',')
            .map(|v| v.trim().trim_matches('"').to_string())
            .collect();
        return field_value(&caps[1]).map(|v| allowed.contains(&v)).unwrap_or(false);
    }
    if let Some(caps) = EQ_CLAUSE.captures(clause) {
        let expected = caps[2].replace("\\\"", "\"");
        return field_value(&caps[1]).map(|v| v == expected).unwrap_or(false);
    }
    panic!("mock cannot evaluate clause: {}", clause);
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn query(&self, dataset: &str, params: &QueryParams) -> QueryOutcome {
        self.requests
            .lock()
            .unwrap()
            .push((dataset.to_string(), params.clone()));

        if self.failing.contains(dataset) {
            return QueryOutcome::Failed("connection reset".to_string());
        }

        let clauses: Vec<&str> = params.where_clause.split(" AND ").collect();
        let select: Option<Vec<&str>> = params
            .select
            .as_deref()
            .map(|s| s.split(',').collect());

        let records = self
            .datasets
            .get(dataset)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| clauses.iter().all(|c| clause_matches(r, c)))
                    .take(params.limit)
                    .map(|r| match &select {
                        Some(fields) => r
                            .iter()
                            .filter(|(k, _)| fields.contains(&k.as_str()))
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                        None => r.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        QueryOutcome::Records(records)
    }
}

/// A minimal record with a name, department and year.
pub fn commune_record(name: &str, dep: &str, year: i32) -> Value {
    json!({ "inom": name, "dep": dep, "an": year.to_string() })
}
