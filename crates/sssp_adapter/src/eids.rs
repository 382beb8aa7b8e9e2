//! Identity normalization and reconciliation.
//!
//! The host hands over user-id assertions as a list of
//! `{ source, uids: [{ id, atype, ext? }] }` records. The endpoint wants a
//! flat `source -> [id, ...]` table plus a signal describing how the
//! Trade Desk identifiers (`adserver.org`) relate to the publisher-provided
//! common id (`pubcid.org`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Source name of the baseline identity provider (publisher common id).
pub const BASELINE_SOURCE: &str = "pubcid.org";
/// Source name of the reference identity provider (Trade Desk id).
pub const REFERENCE_SOURCE: &str = "adserver.org";

/// Per-request lookup table: identity source -> identifiers in issue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityTable(BTreeMap<String, Vec<String>>);

impl IdentityTable {
    /// A table holding only the baseline key, mapped to no identifiers.
    pub fn baseline() -> Self {
        let mut map = BTreeMap::new();
        map.insert(BASELINE_SOURCE.to_string(), Vec::new());
        Self(map)
    }

    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.0.get(source).map(Vec::as_slice)
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the identifiers recorded for `source`.
    pub fn insert(&mut self, source: impl Into<String>, ids: Vec<String>) {
        self.0.insert(source.into(), ids);
    }

    pub fn remove(&mut self, source: &str) -> Option<Vec<String>> {
        self.0.remove(source)
    }
}

impl From<BTreeMap<String, Vec<String>>> for IdentityTable {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

/// Fold raw identity assertions into an [`IdentityTable`].
///
/// Anything other than an array yields the baseline-only table. Elements
/// without a string `source` are skipped; a missing or non-array `uids`
/// counts as empty. When two elements share a source the later one wins.
pub fn normalize(assertions: Option<&Value>) -> IdentityTable {
    let mut table = IdentityTable::baseline();
    let Some(items) = assertions.and_then(Value::as_array) else {
        return table;
    };

    let mut asserted = BTreeSet::new();
    for item in items {
        let Some(source) = item.get("source").and_then(Value::as_str) else {
            debug!(?item, "skipping identity assertion without source");
            continue;
        };
        let ids = item
            .get("uids")
            .and_then(Value::as_array)
            .map(|uids| uids.iter().filter_map(uid_text).collect())
            .unwrap_or_default();
        if !asserted.insert(source) {
            debug!(source, "duplicate identity source, keeping the later assertion");
        }
        table.insert(source, ids);
    }
    table
}

fn uid_text(uid: &Value) -> Option<String> {
    match uid.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Relationship between the reference and baseline identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconciliationCode {
    /// Identifiers issued, none shared with the baseline source
    NoConflict,
    /// Reference module integrated but issued no identifiers
    NoIdentifiers,
    /// Reference module not integrated at all
    NotIntegrated,
    /// A reference identifier duplicates a baseline identifier
    DuplicatesBaseline,
}

impl ReconciliationCode {
    pub const fn code(self) -> i8 {
        match self {
            Self::NoConflict => 0,
            Self::NoIdentifiers => -1,
            Self::NotIntegrated => -2,
            Self::DuplicatesBaseline => -5,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NoConflict),
            -1 => Some(Self::NoIdentifiers),
            -2 => Some(Self::NotIntegrated),
            -5 => Some(Self::DuplicatesBaseline),
            _ => None,
        }
    }
}

impl fmt::Display for ReconciliationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ReconciliationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

impl<'de> Deserialize<'de> for ReconciliationCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Self::from_code(code).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown reconciliation code {code}"))
        })
    }
}

/// Compare the reference source against the baseline source.
///
/// First match wins: reference absent, reference empty, reference id
/// present in baseline, otherwise no conflict. A missing baseline entry
/// counts as empty.
pub fn reconcile(table: &IdentityTable) -> ReconciliationCode {
    let Some(reference) = table.get(REFERENCE_SOURCE) else {
        return ReconciliationCode::NotIntegrated;
    };
    if reference.is_empty() {
        return ReconciliationCode::NoIdentifiers;
    }
    let baseline = table.get(BASELINE_SOURCE).unwrap_or_default();
    if reference.iter().any(|id| baseline.contains(id)) {
        return ReconciliationCode::DuplicatesBaseline;
    }
    ReconciliationCode::NoConflict
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(table: &IdentityTable, source: &str) -> Vec<String> {
        table.get(source).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn non_array_input_yields_baseline_only() {
        for input in [
            None,
            Some(json!(null)),
            Some(json!({"source": "adserver.org"})),
            Some(json!("pubcid.org")),
            Some(json!(42)),
        ] {
            let table = normalize(input.as_ref());
            assert_eq!(table, IdentityTable::baseline(), "input: {input:?}");
            assert_eq!(table.len(), 1);
        }
    }

    #[test]
    fn empty_array_yields_baseline_only() {
        assert_eq!(normalize(Some(&json!([]))), IdentityTable::baseline());
    }

    #[test]
    fn ids_keep_uid_order() {
        let input = json!([
            {"source": "adserver.org", "uids": [
                {"id": "t1", "atype": 1, "ext": {"rtiPartner": "TDID"}},
                {"id": "t2", "atype": 1}
            ]}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(ids(&table, "adserver.org"), vec!["t1", "t2"]);
        assert_eq!(ids(&table, BASELINE_SOURCE), Vec::<String>::new());
    }

    #[test]
    fn missing_or_malformed_uids_count_as_empty() {
        let input = json!([
            {"source": "id5-sync.com"},
            {"source": "criteo.com", "uids": "nope"}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(table.get("id5-sync.com"), Some(&[][..]));
        assert_eq!(table.get("criteo.com"), Some(&[][..]));
    }

    #[test]
    fn duplicate_source_is_last_wins() {
        let input = json!([
            {"source": "adserver.org", "uids": [{"id": "first"}]},
            {"source": "adserver.org", "uids": [{"id": "second"}, {"id": "third"}]}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(ids(&table, "adserver.org"), vec!["second", "third"]);
    }

    #[test]
    fn every_duplicate_source_logs_the_overwrite() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "A"}]},
            {"source": "pubcid.org", "uids": [{"id": "B"}]},
            {"source": "adserver.org", "uids": [{"id": "T"}]}
        ]);
        let mut table = None;
        let logs = crate::test_support::capture_logs(|| table = Some(normalize(Some(&input))));
        assert_eq!(ids(&table.unwrap(), "pubcid.org"), vec!["B"]);
        let overwrites: Vec<&str> = logs
            .lines()
            .filter(|l| l.contains("duplicate identity source"))
            .collect();
        assert_eq!(overwrites.len(), 1, "logs: {logs}");
        assert!(overwrites[0].contains("pubcid.org"));
    }

    #[test]
    fn first_baseline_assertion_is_not_an_overwrite() {
        let input = json!([{"source": "pubcid.org", "uids": [{"id": "A"}]}]);
        let logs = crate::test_support::capture_logs(|| {
            normalize(Some(&input));
        });
        assert!(!logs.contains("duplicate identity source"), "logs: {logs}");
    }

    #[test]
    fn later_empty_assertion_clears_earlier_ids() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "A"}]},
            {"source": "pubcid.org", "uids": []}
        ]);
        let table = normalize(Some(&input));
        assert!(ids(&table, "pubcid.org").is_empty());
    }

    #[test]
    fn malformed_elements_are_skipped() {
        let input = json!([
            null,
            7,
            {"uids": [{"id": "orphan"}]},
            {"source": 12, "uids": [{"id": "bad"}]},
            {"source": "pubcid.org", "uids": [{"id": "A"}, {"atype": 1}, {"id": null}, {"id": 99}]}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(table.len(), 1);
        assert_eq!(ids(&table, "pubcid.org"), vec!["A", "99"]);
    }

    #[test]
    fn duplicate_with_baseline_is_detected() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "A"}]},
            {"source": "adserver.org", "uids": [{"id": "A"}]}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(ids(&table, "pubcid.org"), vec!["A"]);
        assert_eq!(ids(&table, "adserver.org"), vec!["A"]);
        assert_eq!(table.len(), 2);
        assert_eq!(reconcile(&table), ReconciliationCode::DuplicatesBaseline);
        assert_eq!(reconcile(&table).code(), -5);
    }

    #[test]
    fn missing_reference_is_not_integrated() {
        let input = json!([{"source": "pubcid.org", "uids": [{"id": "X"}]}]);
        let table = normalize(Some(&input));
        assert_eq!(reconcile(&table).code(), -2);
    }

    #[test]
    fn empty_reference_has_no_identifiers() {
        let input = json!([{"source": "adserver.org", "uids": []}]);
        let table = normalize(Some(&input));
        assert_eq!(reconcile(&table).code(), -1);
    }

    #[test]
    fn distinct_reference_ids_have_no_conflict() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "A"}, {"id": "B"}]},
            {"source": "adserver.org", "uids": [{"id": "C"}]}
        ]);
        assert_eq!(reconcile(&normalize(Some(&input))).code(), 0);
    }

    #[test]
    fn any_overlapping_reference_id_is_a_duplicate() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "A"}, {"id": "B"}]},
            {"source": "adserver.org", "uids": [{"id": "C"}, {"id": "B"}]}
        ]);
        assert_eq!(
            reconcile(&normalize(Some(&input))),
            ReconciliationCode::DuplicatesBaseline
        );
    }

    #[test]
    fn reconcile_tolerates_missing_baseline() {
        let mut table = IdentityTable::baseline();
        table.remove(BASELINE_SOURCE);
        assert_eq!(reconcile(&table), ReconciliationCode::NotIntegrated);

        table.insert(REFERENCE_SOURCE, vec!["T".into()]);
        assert_eq!(reconcile(&table), ReconciliationCode::NoConflict);
    }

    #[test]
    fn numeric_id_matches_its_decimal_text() {
        let input = json!([
            {"source": "pubcid.org", "uids": [{"id": "99"}]},
            {"source": "adserver.org", "uids": [{"id": 99}]}
        ]);
        let table = normalize(Some(&input));
        assert_eq!(ids(&table, "adserver.org"), vec!["99"]);
        assert_eq!(reconcile(&table), ReconciliationCode::DuplicatesBaseline);
    }

    #[test]
    fn code_matching_is_exact() {
        let mut table = IdentityTable::baseline();
        table.insert(BASELINE_SOURCE, vec!["abc".into()]);
        table.insert(REFERENCE_SOURCE, vec!["ABC".into(), "abc ".into()]);
        assert_eq!(reconcile(&table), ReconciliationCode::NoConflict);
    }

    #[test]
    fn code_serializes_as_bare_integer() {
        let v = serde_json::to_value(ReconciliationCode::DuplicatesBaseline).unwrap();
        assert_eq!(v, json!(-5));
        let back: ReconciliationCode = serde_json::from_value(json!(-1)).unwrap();
        assert_eq!(back, ReconciliationCode::NoIdentifiers);
        assert!(serde_json::from_value::<ReconciliationCode>(json!(-3)).is_err());
    }

    #[test]
    fn table_serializes_as_plain_object() {
        let input = json!([{"source": "adserver.org", "uids": [{"id": "T"}]}]);
        let v = serde_json::to_value(normalize(Some(&input))).unwrap();
        assert_eq!(v, json!({"pubcid.org": [], "adserver.org": ["T"]}));
    }
}
