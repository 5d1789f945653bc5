// src/matching/resolver.rs - Commune name resolution across dataset partitions
use crate::api::client::{field_str, QueryOutcome, RecordSource};
use crate::api::partitions::PartitionTable;
use crate::api::query::name_search_query;
use crate::matching::cache::{CacheKey, Variant, VariantCache};
use crate::matching::name::{generate_search_terms, is_similar_commune};
use crate::utils::constants::{FIELD_DEPARTMENT, FIELD_NAME, SEARCH_PAGE_SIZE};
use crate::utils::logging::{ResolutionLogger, Stage};

/// Maps a typed commune name to the exact `(inom, dep)` pairs used upstream.
///
/// One resolver (and so one cache) per session. Resolution issues its queries
/// one at a time: partition outer, search term inner.
pub struct NameResolver {
    partitions: PartitionTable,
    cache: VariantCache,
    requests_issued: usize,
}

impl NameResolver {
    pub fn new(partitions: PartitionTable) -> Self {
        Self {
            partitions,
            cache: VariantCache::new(),
            requests_issued: 0,
        }
    }

    pub fn partitions(&self) -> &PartitionTable {
        &self.partitions
    }

    pub fn cache(&self) -> &VariantCache {
        &self.cache
    }

    /// Total upstream queries issued by this resolver so far.
    pub fn requests_issued(&self) -> usize {
        self.requests_issued
    }

    /// Candidate variants for `raw_name`, most likely first.
    ///
    /// Never empty: when nothing upstream is similar enough, the single
    /// fallback `{raw_name, department or ""}` is returned. Surrounding
    /// whitespace is stripped from the department, which is then attached as
    /// given to every variant; an empty or blank department is the same as
    /// no department.
    pub async fn resolve_variants<S>(
        &mut self,
        source: &S,
        raw_name: &str,
        department: Option<&str>,
    ) -> Vec<Variant>
    where
        S: RecordSource + ?Sized,
    {
        let department = department.map(str::trim).filter(|d| !d.is_empty());
        let key = CacheKey::new(raw_name, department);
        let logger = ResolutionLogger::new(Stage::Resolve);

        if let Some(cached) = self.cache.get(&key) {
            logger.log_cache_hit(raw_name, cached.len());
            return cached.to_vec();
        }

        logger.log_start(raw_name, department);
        let mut variants: Vec<Variant> = Vec::new();
        let mut requests = 0usize;

        if !raw_name.trim().is_empty() {
            let terms = generate_search_terms(raw_name);
            let datasets = self.partitions.distinct_datasets();
            let valid_years = self.partitions.known_years();
            logger.log_search_terms(&terms, datasets.len());

            for dataset in &datasets {
                for term in &terms {
                    let params = name_search_query(term, department, &valid_years, SEARCH_PAGE_SIZE);
                    requests += 1;
                    let outcome = source.query(dataset, &params).await;
                    if let QueryOutcome::Failed(reason) = &outcome {
                        logger.log_query_failed(dataset, term, reason);
                        continue;
                    }

                    for record in outcome.records() {
                        let Some(found_name) = field_str(record, FIELD_NAME).filter(|n| !n.is_empty())
                        else {
                            continue;
                        };
                        if !is_similar_commune(raw_name, found_name) {
                            continue;
                        }
                        let found_department = match department {
                            Some(d) => d.to_string(),
                            None => field_str(record, FIELD_DEPARTMENT).unwrap_or_default().to_string(),
                        };
                        let variant = Variant::new(found_name, found_department);
                        if !variants.contains(&variant) {
                            variants.push(variant);
                        }
                    }
                }
            }
        }

        if variants.is_empty() {
            logger.log_fallback(raw_name);
            variants.push(Variant::new(raw_name, department.unwrap_or_default()));
        }

        self.requests_issued += requests;
        logger.log_completion(variants.len(), requests);
        self.cache.insert(key, variants.clone());
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{commune_record, MockRecordSource};

    const P_2022: &str = "comptes-individuels-des-communes-fichier-global-2022";
    const P_2023: &str = "comptes-individuels-des-communes-fichier-global-2023-2024";

    fn resolver() -> NameResolver {
        NameResolver::new(PartitionTable::default())
    }

    #[tokio::test]
    async fn test_la_rochelle_end_to_end() {
        let source = MockRecordSource::new()
            .with_record(P_2022, commune_record("ROCHELLE (LA)", "17", 2022));
        let variants = resolver().resolve_variants(&source, "LA ROCHELLE", Some("")).await;
        assert_eq!(variants, vec![Variant::new("ROCHELLE (LA)", "17")]);
    }

    #[tokio::test]
    async fn test_second_call_is_a_pure_cache_hit() {
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("RENAGE", "038", 2023));
        let mut resolver = resolver();

        let first = resolver.resolve_variants(&source, "RENAGE", Some("")).await;
        let after_first = source.request_count();
        assert!(after_first > 0);

        let second = resolver.resolve_variants(&source, "RENAGE", Some("")).await;
        assert_eq!(first, second);
        assert_eq!(source.request_count(), after_first);
        assert_eq!(resolver.cache().hits, 1);
    }

    #[tokio::test]
    async fn test_unknown_commune_falls_back_to_input() {
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("RENAGE", "038", 2023));
        let variants = resolver().resolve_variants(&source, "QZXWVYK", None).await;
        assert_eq!(variants, vec![Variant::new("QZXWVYK", "")]);
    }

    #[tokio::test]
    async fn test_duplicates_across_terms_and_partitions_kept_once() {
        // "ROCHELLE (LA)" is hit by two search terms in two partitions.
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("ROCHELLE (LA)", "17", 2023))
            .with_record(P_2022, commune_record("ROCHELLE (LA)", "17", 2022))
            .with_record(P_2022, commune_record("ROCHELLE(LA)", "17", 2022));
        let variants = resolver().resolve_variants(&source, "LA ROCHELLE", None).await;
        assert_eq!(
            variants,
            vec![Variant::new("ROCHELLE (LA)", "17"), Variant::new("ROCHELLE(LA)", "17")]
        );
    }

    #[tokio::test]
    async fn test_dissimilar_hits_are_filtered_out() {
        // Substring hits that are not the same commune
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("RENAGE", "038", 2023))
            .with_record(P_2023, commune_record("SAINT-JEAN-DE-RENAGE-LES-BAINS", "038", 2023));
        let variants = resolver().resolve_variants(&source, "renage", None).await;
        assert_eq!(variants, vec![Variant::new("RENAGE", "038")]);
    }

    #[tokio::test]
    async fn test_failed_partition_does_not_stop_resolution() {
        let source = MockRecordSource::new()
            .failing(P_2023)
            .with_record(P_2022, commune_record("RENAGE", "038", 2022));
        let mut resolver = resolver();
        let variants = resolver.resolve_variants(&source, "RENAGE", None).await;
        assert_eq!(variants, vec![Variant::new("RENAGE", "038")]);
        // One term over four partitions, the failure included
        assert_eq!(source.request_count(), 4);
        assert_eq!(resolver.requests_issued(), 4);
    }

    #[tokio::test]
    async fn test_department_narrows_search_and_is_attached() {
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("RENAGE", "038", 2023))
            .with_record(P_2023, commune_record("RENAGE", "999", 2023));
        let variants = resolver().resolve_variants(&source, "RENAGE", Some("038")).await;
        assert_eq!(variants, vec![Variant::new("RENAGE", "038")]);

        let (dataset, params) = &source.requests()[0];
        assert_eq!(dataset, P_2023);
        assert!(params.where_clause.contains(r#"dep="038""#));
        assert_eq!(params.limit, 50);
        assert_eq!(params.select.as_deref(), Some("inom,dep"));
    }

    #[tokio::test]
    async fn test_request_count_bounded_by_partitions_times_terms() {
        let source = MockRecordSource::new();
        let mut resolver = resolver();
        resolver.resolve_variants(&source, "LA ROCHELLE", None).await;
        let bound = resolver.partitions().distinct_datasets().len()
            * generate_search_terms("LA ROCHELLE").len();
        assert_eq!(source.request_count(), bound);
        assert!(bound <= 12);
    }

    #[tokio::test]
    async fn test_blank_name_issues_no_queries() {
        let source = MockRecordSource::new();
        let variants = resolver().resolve_variants(&source, "   ", None).await;
        assert_eq!(variants, vec![Variant::new("   ", "")]);
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_padded_names_still_resolve() {
        let source = MockRecordSource::new()
            .with_record(P_2022, commune_record("ROCHELLE (LA)", "17", 2022));
        let mut resolver = resolver();
        for raw in ["  LA ROCHELLE ", "LA  ROCHELLE"] {
            let variants = resolver.resolve_variants(&source, raw, None).await;
            assert_eq!(variants, vec![Variant::new("ROCHELLE (LA)", "17")], "input {:?}", raw);
        }
    }

    #[tokio::test]
    async fn test_department_whitespace_is_stripped() {
        let source = MockRecordSource::new()
            .with_record(P_2023, commune_record("RENAGE", "038", 2023));
        let mut resolver = resolver();
        let variants = resolver.resolve_variants(&source, "RENAGE", Some(" 038 ")).await;
        assert_eq!(variants, vec![Variant::new("RENAGE", "038")]);

        // Same cache entry as the unpadded department
        let again = resolver.resolve_variants(&source, "RENAGE", Some("038")).await;
        assert_eq!(again, variants);
        assert_eq!(resolver.cache().hits, 1);

        let blank = resolver.resolve_variants(&source, "QZXWVYK", Some("  ")).await;
        assert_eq!(blank, vec![Variant::new("QZXWVYK", "")]);
    }

    #[tokio::test]
    async fn test_request_order_partition_outer_term_inner() {
        let source = MockRecordSource::new();
        resolver().resolve_variants(&source, "LA ROCHELLE", None).await;

        let order: Vec<(String, String)> = source
            .requests()
            .into_iter()
            .map(|(dataset, params)| (dataset, params.where_clause))
            .collect();
        let mut expected = Vec::new();
        for dataset in [
            P_2023,
            P_2022,
            "comptes-individuels-des-communes-fichier-global-2021",
            "comptes-individuels-des-communes-fichier-global-2019-2020",
        ] {
            for term in ["LA ROCHELLE", "ROCHELLE", "ROCHELLE (LA)"] {
                expected.push((
                    dataset.to_string(),
                    format!(
                        r#"inom LIKE "%{}%" AND an IN ("2019","2020","2021","2022","2023","2024")"#,
                        term
                    ),
                ));
            }
        }
        assert_eq!(order, expected);
    }
}
