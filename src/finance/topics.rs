// src/finance/topics.rs - Per-topic column definitions and derived ratios
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::api::client::{field_f64, field_str, Record};
use crate::finance::ratios::{difference, round2, safe_ratio};
use crate::utils::constants::{FIELD_DEPARTMENT, FIELD_NAME};

/// How a column value is obtained from one upstream record.
#[derive(Debug)]
pub enum Expr {
    Field(&'static str),
    Difference(&'static Expr, &'static Expr),
    /// `numerator / denominator * scale`, `None` on a zero or absent denominator
    Ratio {
        numerator: &'static Expr,
        denominator: &'static Expr,
        scale: f64,
    },
}

impl Expr {
    pub fn evaluate(&self, record: &Record) -> Option<f64> {
        match self {
            Expr::Field(key) => field_f64(record, key),
            Expr::Difference(a, b) => difference(a.evaluate(record), b.evaluate(record)),
            Expr::Ratio {
                numerator,
                denominator,
                scale,
            } => safe_ratio(numerator.evaluate(record), denominator.evaluate(record), *scale),
        }
    }
}

#[derive(Debug)]
pub struct ColumnDef {
    pub label: &'static str,
    pub expr: Expr,
}

const fn field(label: &'static str, key: &'static str) -> ColumnDef {
    ColumnDef {
        label,
        expr: Expr::Field(key),
    }
}

const fn ratio(
    label: &'static str,
    numerator: &'static Expr,
    denominator: &'static Expr,
    scale: f64,
) -> ColumnDef {
    ColumnDef {
        label,
        expr: Expr::Ratio {
            numerator,
            denominator,
            scale,
        },
    }
}

// Upstream fields that appear as ratio operands
const POP: Expr = Expr::Field("pop1");
const PROD: Expr = Expr::Field("prod");
const CHARGE: Expr = Expr::Field("charge");
const FPROD: Expr = Expr::Field("fprod");
const MPROD: Expr = Expr::Field("mprod");
const FCHARGE: Expr = Expr::Field("fcharge");
const MCHARGE: Expr = Expr::Field("mcharge");
const FPERSO: Expr = Expr::Field("fperso");
const MPERSO: Expr = Expr::Field("mperso");
const FCAF: Expr = Expr::Field("fcaf");
const MCAF: Expr = Expr::Field("mcaf");
const FCAFN: Expr = Expr::Field("fcafn");
const MCAFN: Expr = Expr::Field("mcafn");
const FIMPO: Expr = Expr::Field("fimpo1");
const MIMPO: Expr = Expr::Field("mimpo1");
const FDETTE: Expr = Expr::Field("fdette");
const MDETTE: Expr = Expr::Field("mdette");
const FEQUIP: Expr = Expr::Field("fequip");
const MEQUIP: Expr = Expr::Field("mequip");
const FFDR: Expr = Expr::Field("ffdr");
const MFDR: Expr = Expr::Field("mfdr");
const OPERATING_RESULT: Expr = Expr::Difference(&PROD, &CHARGE);

const FONCTIONNEMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef { label: "Population", expr: POP },
    field("Recettes de fonctionnement", "prod"),
    field("Dépenses de fonctionnement", "charge"),
    field("Recettes réelles fonctionnement / hab", "fprod"),
    field("Moyenne strate Recettes / hab", "mprod"),
    field("Dépenses réelles fonctionnement / hab", "fcharge"),
    field("Moyenne strate Dépenses / hab", "mcharge"),
    field("DGF / habitant", "fdgf"),
    field("Moyenne strate DGF / hab", "mdgf"),
    field("Dépenses personnel / hab", "fperso"),
    field("Moyenne strate Personnel / hab", "mperso"),
    ratio("Ratio Personnel/DRF Commune", &FPERSO, &FCHARGE, 100.0),
    ratio("Ratio Personnel/DRF Moyenne", &MPERSO, &MCHARGE, 100.0),
    ColumnDef {
        label: "Résultat de fonctionnement",
        expr: OPERATING_RESULT,
    },
    ratio("Taux d'épargne", &OPERATING_RESULT, &PROD, 100.0),
];

const CAF_COLUMNS: &[ColumnDef] = &[
    ColumnDef { label: "Population", expr: POP },
    field("CAF brute / hab Commune", "fcaf"),
    field("CAF brute / hab Moyenne", "mcaf"),
    ratio("CAF brute / RRF Commune", &FCAF, &FPROD, 100.0),
    ratio("CAF brute / RRF Moyenne", &MCAF, &MPROD, 100.0),
    ratio("CAF nette / RRF Commune", &FCAFN, &FPROD, 100.0),
    ratio("CAF nette / RRF Moyenne", &MCAFN, &MPROD, 100.0),
];

const FISCALITE_COLUMNS: &[ColumnDef] = &[
    field("Impôts / hab Commune", "fimpo1"),
    field("Impôts / hab Moyenne", "mimpo1"),
    ratio("Impôts/RRF Commune", &FIMPO, &FPROD, 100.0),
    ratio("Impôts/RRF Moyenne", &MIMPO, &MPROD, 100.0),
    field("Taux TH Commune", "tth"),
    field("Taux TH Moyenne", "tmth"),
    field("Taux TFB Commune", "tfb"),
    field("Taux TFB Moyenne", "tmfb"),
    field("Taux TFNB Commune", "tfnb"),
    field("Taux TFNB Moyenne", "tmfnb"),
];

const ENDETTEMENT_COLUMNS: &[ColumnDef] = &[
    field("Dette / hab Commune", "fdette"),
    field("Dette / hab Moyenne", "mdette"),
    ratio("Dette / RRF Commune", &FDETTE, &FPROD, 100.0),
    ratio("Dette / RRF Moyenne", &MDETTE, &MPROD, 100.0),
    ratio("Dette en années CAF Commune", &FDETTE, &FCAF, 1.0),
    ratio("Dette en années CAF Moyenne", &MDETTE, &MCAF, 1.0),
];

const INVESTISSEMENT_COLUMNS: &[ColumnDef] = &[
    field("Équipement / hab Commune", "fequip"),
    field("Équipement / hab Moyenne", "mequip"),
    ratio("Équipement / RRF Commune", &FEQUIP, &FPROD, 100.0),
    ratio("Équipement / RRF Moyenne", &MEQUIP, &MPROD, 100.0),
];

const FDR_COLUMNS: &[ColumnDef] = &[
    field("FDR / hab Commune", "ffdr"),
    field("FDR / hab Moyenne", "mfdr"),
    ratio("FDR en jours DRF Commune", &FFDR, &FCHARGE, 365.0),
    ratio("FDR en jours DRF Moyenne", &MFDR, &MCHARGE, 365.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Fonctionnement,
    Caf,
    Fiscalite,
    Endettement,
    Investissement,
    Fdr,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Fonctionnement,
        Topic::Caf,
        Topic::Fiscalite,
        Topic::Endettement,
        Topic::Investissement,
        Topic::Fdr,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Topic::Fonctionnement => "fonctionnement",
            Topic::Caf => "caf",
            Topic::Fiscalite => "fiscalite",
            Topic::Endettement => "endettement",
            Topic::Investissement => "investissement",
            Topic::Fdr => "fdr",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Topic::Fonctionnement => "Fonctionnement",
            Topic::Caf => "CAF",
            Topic::Fiscalite => "Fiscalité",
            Topic::Endettement => "Endettement",
            Topic::Investissement => "Investissement",
            Topic::Fdr => "Fonds de roulement",
        }
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            Topic::Fonctionnement => FONCTIONNEMENT_COLUMNS,
            Topic::Caf => CAF_COLUMNS,
            Topic::Fiscalite => FISCALITE_COLUMNS,
            Topic::Endettement => ENDETTEMENT_COLUMNS,
            Topic::Investissement => INVESTISSEMENT_COLUMNS,
            Topic::Fdr => FDR_COLUMNS,
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.label).collect()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.label == label)
    }

    /// Whether the record carries at least one raw field of this topic.
    pub fn has_data(&self, record: &Record) -> bool {
        self.columns()
            .iter()
            .any(|c| matches!(c.expr, Expr::Field(key) if record.contains_key(key)))
    }

    /// Values of every column for one record; raw fields are kept as served,
    /// derived ratios are rounded to two decimals.
    pub fn evaluate(&self, record: &Record) -> Vec<Option<f64>> {
        self.columns()
            .iter()
            .map(|c| match &c.expr {
                Expr::Field(_) => c.expr.evaluate(record),
                Expr::Difference(..) => c.expr.evaluate(record).map(round2),
                Expr::Ratio { .. } => c.expr.evaluate(record),
            })
            .collect()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.slug() == wanted || t.title().to_lowercase() == wanted)
            .ok_or_else(|| anyhow!("Unknown topic '{}'", s))
    }
}

/// One year of one topic for a commune.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRow {
    pub year: i32,
    pub commune: String,
    pub department: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTable {
    pub topic: Topic,
    pub columns: Vec<&'static str>,
    /// Sorted by year
    pub rows: Vec<TopicRow>,
    pub missing_years: Vec<i32>,
}

impl TopicTable {
    /// Builds the table from the accepted record of each year. Years in
    /// `requested` without a record carrying this topic's fields end up in
    /// `missing_years`.
    pub fn build(topic: Topic, requested: &[i32], records: &[(i32, &Record)]) -> Self {
        let mut rows: Vec<TopicRow> = records
            .iter()
            .filter(|(_, record)| topic.has_data(record))
            .map(|(year, record)| TopicRow {
                year: *year,
                commune: field_str(record, FIELD_NAME).unwrap_or_default().to_string(),
                department: field_str(record, FIELD_DEPARTMENT).unwrap_or_default().to_string(),
                values: topic.evaluate(record),
            })
            .collect();
        rows.sort_by_key(|r| r.year);
        rows.dedup_by_key(|r| r.year);

        let missing_years = requested
            .iter()
            .copied()
            .filter(|y| !rows.iter().any(|r| r.year == *y))
            .collect();

        Self {
            topic,
            columns: topic.labels(),
            rows,
            missing_years,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(year, value)` pairs of one column, skipping years without a value.
    pub fn series(&self, label: &str) -> Vec<(i32, f64)> {
        let Some(idx) = self.topic.column_index(label) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|r| r.values.get(idx).copied().flatten().map(|v| (r.year, v)))
            .collect()
    }
}
