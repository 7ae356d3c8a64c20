pub(crate) mod config;
pub(crate) mod fetch;
pub(crate) mod parse;

use romfill_core::Obligation;

use crate::cli_types::FilterArgs;

/// Apply `--kinds` and `--limit`, preserving report order.
pub(crate) fn apply_filter(obligations: Vec<Obligation>, filter: &FilterArgs) -> Vec<Obligation> {
    let filtered = obligations.into_iter().filter(|ob| {
        filter
            .kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&ob.kind()))
    });
    match filter.limit {
        Some(limit) => filtered.take(limit).collect(),
        None => filtered.collect(),
    }
}
