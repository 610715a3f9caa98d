use crate::config::TableKind;
use crate::error::{ReportError, Result};
use crate::loader::RawTable;
use std::collections::HashSet;
use tracing::{debug, warn};

/// How one header was treated by [`normalize_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChange {
    pub original: String,
    pub normalized: String,
}

/// Rename known header variants to their canonical names, in place.
///
/// Headers are trimmed first. Unknown headers pass through. When two headers
/// map to the same canonical name the first one wins.
pub fn normalize_headers(table: &mut RawTable, kind: TableKind) -> Vec<HeaderChange> {
    let mut taken: HashSet<&'static str> = HashSet::new();
    let mut changes = Vec::with_capacity(table.headers.len());
    for header in table.headers.iter_mut() {
        let original = header.clone();
        let trimmed = header.trim().to_string();
        let normalized = match kind.canonical_for(&trimmed) {
            Some(canonical) if taken.insert(canonical) => canonical.to_string(),
            Some(canonical) => {
                warn!(
                    table = kind.label(),
                    header = %trimmed,
                    canonical,
                    "Duplicate header variant left unrenamed"
                );
                trimmed
            }
            None => trimmed,
        };
        if normalized != original {
            debug!(table = kind.label(), from = %original, to = %normalized, "Renamed header");
        }
        *header = normalized.clone();
        changes.push(HeaderChange {
            original,
            normalized,
        });
    }
    changes
}

/// Required columns absent from an already-normalized table, in checklist
/// order.
pub fn missing_columns(table: &RawTable, kind: TableKind) -> Vec<String> {
    kind.required_columns()
        .iter()
        .filter(|col| table.column_index(col).is_none())
        .map(|col| col.to_string())
        .collect()
}

/// Normalize both tables and halt with every missing column when either
/// table fails its checklist.
pub fn normalize_pair(footfall: &mut RawTable, master: &mut RawTable) -> Result<()> {
    normalize_headers(footfall, TableKind::Footfall);
    normalize_headers(master, TableKind::Master);
    let missing_footfall = missing_columns(footfall, TableKind::Footfall);
    let missing_master = missing_columns(master, TableKind::Master);
    if missing_footfall.is_empty() && missing_master.is_empty() {
        return Ok(());
    }
    Err(ReportError::MissingColumns {
        footfall: missing_footfall,
        master: missing_master,
    })
}
