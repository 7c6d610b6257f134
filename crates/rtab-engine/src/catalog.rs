//! Table assembly, publishing, and the catalog query API
//!
//! One fetch cycle turns every configured data-source into a main table plus
//! zero or more pre-joined sub-tables, published into a [`Catalog`] under
//! derived names: `{source}_main` for the main table and `{source}_df_sub_{n}`
//! for the n-th discovered sub-collection, left-joined against its main table.
//! The catalog is the queryable snapshot until the next cycle replaces it.

use crate::client::RecordClient;
use crate::config::Settings;
use crate::error::{EngineError, Result};
use crate::flatten::{flatten_record, SubTableCollector, MAIN_ID_COLUMN};
use crate::record::{RawRecord, ID_FIELD};
use chrono::{DateTime, Utc};
use rtab_common::Table;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// Catalog Constants
// ============================================================================

/// Row count above which a table is flagged as nearing the remote offset cap.
pub const NEAR_OFFSET_CAP_ROWS: usize = 9_000;

/// Build one source's main table and its sub-tables from raw records.
///
/// Sub-tables keep their originating field name here; positional naming
/// happens at publish time.
pub fn build_source_tables(records: &[RawRecord]) -> (Table, Vec<(String, Table)>) {
    let mut parent_rows = Vec::with_capacity(records.len());
    let mut collector = SubTableCollector::new();

    for record in records {
        let (parent, children) = flatten_record(record);
        parent_rows.push(parent);
        collector.collect(children);
    }

    let main = Table::from_rows(parent_rows);
    let sub_tables = collector
        .into_sub_collections()
        .into_iter()
        .map(|(field, rows)| (field, Table::from_rows(rows)))
        .collect();

    (main, sub_tables)
}

/// Row-count summary for one published table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub near_offset_cap: bool,
}

/// The named-table snapshot produced by one fetch cycle.
#[derive(Debug, Clone)]
pub struct Catalog {
    order: Vec<String>,
    tables: HashMap<String, Table>,
    sub_index: HashMap<(String, String), String>,
    fetched_at: DateTime<Utc>,
}

impl Catalog {
    /// Create an empty catalog stamped with its snapshot time.
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            order: Vec::new(),
            tables: HashMap::new(),
            sub_index: HashMap::new(),
            fetched_at,
        }
    }

    /// Publish one source's tables.
    ///
    /// The main table lands under `{source}_main`. Each sub-table is
    /// left-joined against the main table on `main_id = $id` and lands under
    /// `{source}_df_sub_{n}`, where n is the sub-collection's 1-based
    /// discovery order. The field-name lookup is kept alongside as a
    /// non-positional way to reach the same tables.
    pub fn publish_source(&mut self, source: &str, main: Table, sub_tables: Vec<(String, Table)>) {
        let joined: Vec<(String, String, Table)> = sub_tables
            .into_iter()
            .enumerate()
            .map(|(i, (field, sub))| {
                let published = format!("{}_df_sub_{}", source, i + 1);
                let table = sub.left_join(&main, MAIN_ID_COLUMN, ID_FIELD);
                (field, published, table)
            })
            .collect();

        self.insert(format!("{}_main", source), main);

        for (field, published, table) in joined {
            self.sub_index
                .insert((source.to_string(), field), published.clone());
            self.insert(published, table);
        }
    }

    fn insert(&mut self, name: String, table: Table) {
        if !self.tables.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tables.insert(name, table);
    }

    /// Look up a published table by exact name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Published table names, in publish order.
    pub fn table_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Published name of the sub-table built from `field` within `source`.
    pub fn sub_table_name(&self, source: &str, field: &str) -> Option<&str> {
        self.sub_index
            .get(&(source.to_string(), field.to_string()))
            .map(String::as_str)
    }

    /// Number of published tables.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no tables are published.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// When this snapshot was fetched.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Row-count summaries in publish order.
    pub fn summary(&self) -> Vec<TableSummary> {
        self.order
            .iter()
            .filter_map(|name| {
                self.tables.get(name).map(|table| TableSummary {
                    name: name.clone(),
                    rows: table.height(),
                    near_offset_cap: table.height() > NEAR_OFFSET_CAP_ROWS,
                })
            })
            .collect()
    }
}

/// Owns the configured sources, the record client, and the current snapshot.
///
/// Holding the manager by `&mut` during [`DataManager::fetch_cycle`] is what
/// serializes cycles; there is no internal locking and no cancellation.
pub struct DataManager {
    settings: Settings,
    client: RecordClient,
    catalog: Option<Catalog>,
}

impl DataManager {
    /// Create a manager from resolved settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = RecordClient::new(settings.base_url.clone())?;

        Ok(Self {
            settings,
            client,
            catalog: None,
        })
    }

    /// Create a manager straight from a settings file and environment name.
    pub fn from_file(path: &Path, environment: &str) -> Result<Self> {
        let settings = Settings::load(path, environment)?;
        Self::new(settings)
    }

    /// Run one fetch cycle over every configured data-source, sequentially.
    ///
    /// An error in any source aborts the whole cycle and publishes nothing;
    /// a previously published snapshot stays queryable in that case.
    pub async fn fetch_cycle(&mut self) -> Result<()> {
        let mut catalog = Catalog::new(Utc::now());

        for (source_name, source) in self.settings.sources() {
            info!(source = %source_name, "Fetching data-source");
            let records = self.client.fetch_records(source).await?;
            info!(source = %source_name, records = records.len(), "Fetched records");

            let (main, sub_tables) = build_source_tables(&records);
            catalog.publish_source(source_name, main, sub_tables);
        }

        for summary in catalog.summary() {
            if summary.near_offset_cap {
                warn!(
                    table = %summary.name,
                    rows = summary.rows,
                    "Table is nearing the remote offset cap"
                );
            }
        }

        info!(tables = catalog.len(), "Fetch cycle complete");
        self.catalog = Some(catalog);
        Ok(())
    }

    /// The current snapshot, or a state error before the first cycle.
    pub fn catalog(&self) -> Result<&Catalog> {
        self.catalog
            .as_ref()
            .ok_or_else(|| EngineError::state("catalog not initialized"))
    }

    /// Look up one table by name. Surrounding whitespace in `name` is
    /// ignored; an unknown name is `None`, not an error.
    pub fn table(&self, name: &str) -> Result<Option<&Table>> {
        Ok(self.catalog()?.table(name.trim()))
    }

    /// Look up several tables at once, in input order.
    pub fn tables<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<Option<&Table>>> {
        let catalog = self.catalog()?;
        Ok(names.into_iter().map(|name| catalog.table(name.trim())).collect())
    }

    /// Published table names in publish order.
    pub fn table_names(&self) -> Result<Vec<&str>> {
        Ok(self.catalog()?.table_names())
    }

    /// Published name of the sub-table built from `field` within `source`.
    pub fn sub_table_name(&self, source: &str, field: &str) -> Result<Option<&str>> {
        Ok(self.catalog()?.sub_table_name(source, field))
    }

    /// Row-count summaries for the current snapshot.
    pub fn summary(&self) -> Result<Vec<TableSummary>> {
        Ok(self.catalog()?.summary())
    }
}
