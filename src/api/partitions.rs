// src/api/partitions.rs
//! Year to dataset-partition routing for the "comptes individuels des communes" files.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// Published partitions, one per year or two-year range.
pub const DATASET_PARTITIONS: [(i32, &str); 6] = [
    (2019, "comptes-individuels-des-communes-fichier-global-2019-2020"),
    (2020, "comptes-individuels-des-communes-fichier-global-2019-2020"),
    (2021, "comptes-individuels-des-communes-fichier-global-2021"),
    (2022, "comptes-individuels-des-communes-fichier-global-2022"),
    (2023, "comptes-individuels-des-communes-fichier-global-2023-2024"),
    (2024, "comptes-individuels-des-communes-fichier-global-2023-2024"),
];

#[derive(Debug, Clone)]
pub struct PartitionTable {
    by_year: BTreeMap<i32, String>,
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self {
            by_year: DATASET_PARTITIONS
                .iter()
                .map(|(year, dataset)| (*year, dataset.to_string()))
                .collect(),
        }
    }
}

impl PartitionTable {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let by_year: BTreeMap<i32, String> =
            entries.into_iter().map(|(y, d)| (y, d.into())).collect();
        if by_year.is_empty() {
            return Err(anyhow!("Partition table needs at least one year"));
        }
        Ok(Self { by_year })
    }

    /// Dataset holding `year`; unknown years go to the most recent partition.
    pub fn dataset_for_year(&self, year: i32) -> &str {
        self.by_year
            .get(&year)
            .or_else(|| self.by_year.values().next_back())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn is_known_year(&self, year: i32) -> bool {
        self.by_year.contains_key(&year)
    }

    /// Every year with a published partition, ascending.
    pub fn known_years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }

    /// Physical partitions, newest first, each listed once.
    pub fn distinct_datasets(&self) -> Vec<&str> {
        let mut datasets: Vec<&str> = Vec::new();
        for dataset in self.by_year.values().rev() {
            if !datasets.contains(&dataset.as_str()) {
                datasets.push(dataset);
            }
        }
        datasets
    }
}
