//! Result curation pipeline: filter, dedup, diversify, score, truncate.
//!
//! Queries fan out to the search backend concurrently and fan back in
//! before the similarity dedup runs once over the merged candidate set.
//! Every stage is order-preserving and fail-open: a stage that cannot judge
//! a result keeps it.

pub mod curate;
pub mod dedup;
pub mod diversity;
pub mod freshness;
pub mod url_filter;
