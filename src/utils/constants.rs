// src/utils/constants.rs

/// Minimum Ratcliff/Obershelp ratio between two normalized commune names for
/// them to be treated as the same commune.
pub const COMMUNE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Page size for the `inom LIKE` candidate search during name resolution.
pub const SEARCH_PAGE_SIZE: usize = 50;

/// Page size for the exact per-year record lookup.
pub const LOOKUP_PAGE_SIZE: usize = 100;

pub const DEFAULT_API_BASE_URL: &str =
    "https://data.economie.gouv.fr/api/explore/v2.1/catalog/datasets";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upstream field codes used by the resolver.
pub const FIELD_NAME: &str = "inom";
pub const FIELD_DEPARTMENT: &str = "dep";
pub const FIELD_YEAR: &str = "an";
