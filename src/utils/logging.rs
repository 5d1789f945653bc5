// src/utils/logging.rs - Logging helpers for name resolution and record fetching
use log::{debug, info, warn};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Fetch,
    Export,
}

#[derive(Clone)]
pub struct ResolutionLogger {
    stage_name: &'static str,
    stage_emoji: &'static str,
    start_time: Instant,
}

impl ResolutionLogger {
    pub fn new(stage: Stage) -> Self {
        let (stage_name, stage_emoji) = match stage {
            Stage::Resolve => ("RESOLVE", "🔎"),
            Stage::Fetch => ("FETCH", "📥"),
            Stage::Export => ("EXPORT", "💾"),
        };

        Self {
            stage_name,
            stage_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, commune: &str, department: Option<&str>) {
        info!(
            "[{}] {} 🚀 Starting for '{}'{}",
            self.stage_name,
            self.stage_emoji,
            commune,
            department
                .map(|d| format!(" (department {})", d))
                .unwrap_or_default()
        );
    }

    pub fn log_cache_hit(&self, commune: &str, variants: usize) {
        debug!(
            "[{}] {} ♻️  Cache hit for '{}' ({} variants)",
            self.stage_name, self.stage_emoji, commune, variants
        );
    }

    pub fn log_search_terms(&self, terms: &[String], partitions: usize) {
        debug!(
            "[{}] {} 🔤 {} search terms {:?} across {} partitions",
            self.stage_name,
            self.stage_emoji,
            terms.len(),
            terms,
            partitions
        );
    }

    pub fn log_query_failed(&self, dataset: &str, detail: &str, reason: &str) {
        debug!(
            "[{}] {} ⚠️  Query on {} for {} failed, skipping: {}",
            self.stage_name, self.stage_emoji, dataset, detail, reason
        );
    }

    pub fn log_fallback(&self, commune: &str) {
        warn!(
            "[{}] {} ⚠️  No upstream variant found for '{}', falling back to the name as typed",
            self.stage_name, self.stage_emoji, commune
        );
    }

    pub fn log_variant_used(&self, year: i32, requested: &str, found: &str) {
        if requested != found {
            info!(
                "[{}] {} 🔁 {}: data for '{}' found via '{}'",
                self.stage_name, self.stage_emoji, year, requested, found
            );
        }
    }

    pub fn log_missing_year(&self, commune: &str, year: i32) {
        warn!(
            "[{}] {} ⏭️  No data for '{}' in {}",
            self.stage_name, self.stage_emoji, commune, year
        );
    }

    pub fn log_completion(&self, found: usize, requests: usize) {
        let elapsed = self.start_time.elapsed();
        info!(
            "[{}] {} ✅ Completed: {} found, {} upstream requests [{:.2}s]",
            self.stage_name,
            self.stage_emoji,
            found,
            requests,
            elapsed.as_secs_f32()
        );
    }

    pub fn log_written(&self, path: &str) {
        info!("[{}] {} 📄 Wrote {}", self.stage_name, self.stage_emoji, path);
    }
}
