//! The fixture case model.
//!
//! A fixture is a YAML document of the form:
//!
//! ```yaml
//! db: test_db
//! debugs: []
//! cases:
//!   - id: 0
//!     desc: select a column
//!     inputs:
//!       - columns: ["c1 string", "c2 int", "c4 timestamp"]
//!         indexs: ["index1:c1:c4"]
//!         rows:
//!           - [aa, 2, 1590738989000]
//!     sql: select c1, c2 from {0};
//!     expect:
//!       columns: ["c1 string", "c2 int"]
//!       order: c1
//!       rows:
//!         - [aa, 2]
//! ```
//!
//! `{n}` in `sql` stands for the table created from the n-th input.

pub mod datum;
pub mod schema;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize};

pub use datum::Datum;
pub use schema::{ColumnDef, ColumnType, IndexDef, SchemaError, TableDef};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

/// A whole fixture document. Unknown keys are rejected at every level.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFile {
    /// Database inherited by cases that do not name one.
    #[serde(default)]
    pub db: Option<String>,
    /// When non-empty, only cases whose `desc` is listed are kept.
    #[serde(default)]
    pub debugs: Vec<String>,
    pub cases: Vec<SqlCase>,
}

impl CaseFile {
    /// Applies `debugs` filtering and `db` inheritance, keeping file order.
    pub fn into_cases(self) -> Vec<SqlCase> {
        let CaseFile { db, debugs, cases } = self;
        cases
            .into_iter()
            .filter(|case| {
                debugs.is_empty()
                    || case
                        .desc
                        .as_ref()
                        .is_some_and(|desc| debugs.iter().any(|d| d == desc))
            })
            .map(|mut case| {
                if case.db.is_none() {
                    case.db = db.clone();
                }
                case
            })
            .collect()
    }
}

/// One SQL scenario: inputs to create, a query to run and what to expect.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlCase {
    #[serde(default, deserialize_with = "de_case_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    /// Comma separated mode tags, e.g. `batch-unsupport`.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub db: Option<String>,
    pub sql: String,
    #[serde(default)]
    pub inputs: Vec<InputTable>,
    #[serde(default)]
    pub expect: Expectation,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn de_case_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Int(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

impl SqlCase {
    /// Human-readable name: `<id>_<desc>`, whichever parts exist, else the SQL.
    pub fn name(&self) -> String {
        match (self.id.as_deref(), self.desc.as_deref()) {
            (Some(id), Some(desc)) => format!("{}_{}", id, desc),
            (Some(id), None) => id.to_string(),
            (None, Some(desc)) => desc.to_string(),
            (None, None) => self.sql.trim().to_string(),
        }
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.mode
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes().any(|m| m == mode)
    }

    /// Input indices referenced by `{n}` placeholders, in order of appearance.
    pub fn placeholders(&self) -> Vec<usize> {
        PLACEHOLDER
            .captures_iter(&self.sql)
            .filter_map(|c| c[1].parse().ok())
            .collect()
    }

    /// Substitutes `{n}` placeholders with the given table names.
    ///
    /// Placeholders without a matching name are left untouched.
    pub fn render_sql(&self, tables: &[String]) -> String {
        PLACEHOLDER
            .replace_all(&self.sql, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| tables.get(i))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Checks the case is internally consistent before anything runs.
    pub fn validate(&self) -> Result<(), String> {
        if self.sql.trim().is_empty() {
            return Err("sql must not be empty".to_string());
        }
        for (i, input) in self.inputs.iter().enumerate() {
            input
                .validate()
                .map_err(|e| format!("input {}: {}", i, e))?;
        }
        if let Some(missing) = self.placeholders().into_iter().find(|&i| i >= self.inputs.len()) {
            return Err(format!(
                "sql refers to {{{}}} but only {} input(s) are declared",
                missing,
                self.inputs.len()
            ));
        }
        self.expect.validate().map_err(|e| format!("expect: {}", e))
    }
}

/// A table the executor creates before running the case.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputTable {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, alias = "indexes")]
    pub indexs: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Datum>>,
}

impl InputTable {
    pub fn column_defs(&self) -> Result<Vec<ColumnDef>, SchemaError> {
        schema::parse_columns(&self.columns)
    }

    pub fn index_defs(&self) -> Result<Vec<IndexDef>, SchemaError> {
        self.indexs.iter().map(|i| IndexDef::parse(i)).collect()
    }

    /// Builds the table definition under the given name.
    pub fn table_def(&self, name: impl Into<String>) -> Result<TableDef, SchemaError> {
        Ok(TableDef {
            name: name.into(),
            columns: self.column_defs()?,
            indexes: self.index_defs()?,
        })
    }

    fn validate(&self) -> Result<(), String> {
        let table = self.table_def("").map_err(|e| e.to_string())?;
        if table.columns.is_empty() {
            return Err("no columns declared".to_string());
        }
        let mut seen = HashSet::new();
        if let Some(dup) = table.columns.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(format!("duplicate column '{}'", dup.name));
        }
        for index in &table.indexes {
            if let Some(col) = index.columns().find(|c| table.column_index(c).is_none()) {
                return Err(format!(
                    "index '{}' refers to unknown column '{}'",
                    index.name, col
                ));
            }
        }
        check_row_widths(&self.rows, table.columns.len())
    }
}

/// What the query is expected to produce.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub columns: Vec<String>,
    /// `None` leaves rows unchecked; `Some(vec![])` expects an empty result.
    #[serde(default)]
    pub rows: Option<Vec<Vec<Datum>>>,
    /// Column used to sort both sides before rows are compared.
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: None,
            order: None,
            count: None,
            success: true,
        }
    }
}

impl Expectation {
    pub fn column_defs(&self) -> Result<Vec<ColumnDef>, SchemaError> {
        schema::parse_columns(&self.columns)
    }

    fn validate(&self) -> Result<(), String> {
        let columns = self.column_defs().map_err(|e| e.to_string())?;
        if let (Some(order), false) = (&self.order, columns.is_empty()) {
            if !columns.iter().any(|c| &c.name == order) {
                return Err(format!("order column '{}' is not an expected column", order));
            }
        }
        match (&self.rows, columns.is_empty()) {
            (Some(rows), false) => check_row_widths(rows, columns.len()),
            _ => Ok(()),
        }
    }
}

fn check_row_widths(rows: &[Vec<Datum>], width: usize) -> Result<(), String> {
    match rows.iter().position(|r| r.len() != width) {
        Some(i) => Err(format!(
            "row {} has {} value(s), expected {}",
            i,
            rows[i].len(),
            width
        )),
        None => Ok(()),
    }
}
