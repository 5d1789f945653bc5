// src/finance/fetch.rs - Per-year record retrieval over resolved name variants
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::client::{QueryOutcome, Record, RecordSource};
use crate::api::query::exact_year_query;
use crate::finance::topics::{Topic, TopicTable};
use crate::matching::cache::Variant;
use crate::matching::resolver::NameResolver;
use crate::utils::constants::LOOKUP_PAGE_SIZE;
use crate::utils::logging::{ResolutionLogger, Stage};
use crate::utils::progress_config::ProgressConfig;

/// Records accepted for one year and the variant that produced them.
#[derive(Debug, Clone)]
pub struct YearRecords {
    pub variant: Variant,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub variants: Vec<Variant>,
    pub found: BTreeMap<i32, YearRecords>,
    pub missing_years: Vec<i32>,
}

impl FetchOutcome {
    /// First record of every found year, in year order.
    pub fn first_records(&self) -> Vec<(i32, &Record)> {
        self.found
            .iter()
            .filter_map(|(year, data)| data.records.first().map(|r| (*year, r)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommuneReport {
    pub commune: String,
    pub department: Option<String>,
    pub years: Vec<i32>,
    pub generated_at: DateTime<Utc>,
    pub variants: Vec<Variant>,
    pub tables: Vec<TopicTable>,
}

impl CommuneReport {
    /// No topic has a single row: nothing exists for this commune and these years.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.is_empty())
    }

    pub fn table(&self, topic: Topic) -> Option<&TopicTable> {
        self.tables.iter().find(|t| t.topic == topic)
    }
}

/// Drives name resolution and the per-year variant retry against one source.
pub struct CommuneFetcher<S: RecordSource> {
    source: S,
    resolver: NameResolver,
    progress: ProgressConfig,
}

impl<S: RecordSource> CommuneFetcher<S> {
    pub fn new(source: S, resolver: NameResolver) -> Self {
        Self {
            source,
            resolver,
            progress: ProgressConfig {
                enabled: false,
                ..ProgressConfig::default()
            },
        }
    }

    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub async fn resolve(&mut self, name: &str, department: Option<&str>) -> Vec<Variant> {
        self.resolver.resolve_variants(&self.source, name, department).await
    }

    /// Resolves `name` once, then for each year asks the year's partition for
    /// each variant in turn and keeps the first non-empty answer.
    pub async fn fetch_years(
        &mut self,
        name: &str,
        department: Option<&str>,
        years: &[i32],
    ) -> FetchOutcome {
        let department = department.map(str::trim).filter(|d| !d.is_empty());
        let variants = self.resolve(name, department).await;
        let logger = ResolutionLogger::new(Stage::Fetch);
        logger.log_start(name, department);

        let years = normalize_years(years);
        let pb = self.progress.create_bar(years.len() as u64);
        let mut outcome = FetchOutcome {
            variants: variants.clone(),
            ..FetchOutcome::default()
        };
        let mut requests = 0usize;

        for &year in &years {
            if let Some(pb) = &pb {
                pb.set_message(format!("{} {}", name, year));
            }
            let dataset = self.resolver.partitions().dataset_for_year(year).to_string();

            for variant in &variants {
                let dep = department.unwrap_or(variant.department.as_str());
                let params = exact_year_query(year, &variant.name, Some(dep), LOOKUP_PAGE_SIZE);
                requests += 1;
                match self.source.query(&dataset, &params).await {
                    QueryOutcome::Failed(reason) => {
                        logger.log_query_failed(&dataset, &variant.name, &reason);
                    }
                    QueryOutcome::Records(records) if !records.is_empty() => {
                        logger.log_variant_used(year, name, &variant.name);
                        outcome.found.insert(
                            year,
                            YearRecords {
                                variant: variant.clone(),
                                records,
                            },
                        );
                        break;
                    }
                    QueryOutcome::Records(_) => {}
                }
            }

            if !outcome.found.contains_key(&year) {
                logger.log_missing_year(name, year);
                outcome.missing_years.push(year);
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        logger.log_completion(outcome.found.len(), requests);
        outcome
    }

    /// Fetches every year once and builds one table per topic from the same records.
    pub async fn fetch_report(
        &mut self,
        name: &str,
        department: Option<&str>,
        years: &[i32],
        topics: &[Topic],
    ) -> CommuneReport {
        let years = normalize_years(years);
        let outcome = self.fetch_years(name, department, &years).await;
        let records = outcome.first_records();
        let tables = topics
            .iter()
            .map(|topic| TopicTable::build(*topic, &years, &records))
            .collect();

        CommuneReport {
            commune: name.trim().to_string(),
            department: department
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            years,
            generated_at: Utc::now(),
            variants: outcome.variants,
            tables,
        }
    }
}

fn normalize_years(years: &[i32]) -> Vec<i32> {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();
    years
}
