//! Coefficient catalog
//!
//! Holds every coefficient table of every tenant, keyed by
//! [`CoefficientTableId`]. Lookups are pure reads; the catalog is shared
//! between requests behind an `Arc`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use core_kernel::{CalculatorId, TenantId};
use domain_variables::VariableContext;

use crate::error::CoefficientError;
use crate::table::{CoefficientColumn, CoefficientTable, CoefficientTableId, MatchMode};

/// Registry of coefficient tables
#[derive(Debug, Clone, Default)]
pub struct CoefficientCatalog {
    tables: HashMap<CoefficientTableId, Arc<CoefficientTable>>,
}

impl CoefficientCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table
    pub fn insert(&mut self, table: CoefficientTable) -> Result<(), CoefficientError> {
        table.check()?;
        debug!(table = %table.id, rows = table.rows().len(), "Registered coefficient table");
        self.tables.insert(table.id.clone(), Arc::new(table));
        Ok(())
    }

    pub fn get(&self, id: &CoefficientTableId) -> Option<Arc<CoefficientTable>> {
        self.tables.get(id).cloned()
    }

    pub fn contains(&self, id: &CoefficientTableId) -> bool {
        self.tables.contains_key(id)
    }

    /// All tables of one calculator, ordered by code
    pub fn tables_for(&self, tenant: TenantId, calculator: CalculatorId) -> Vec<Arc<CoefficientTable>> {
        let mut tables: Vec<_> = self
            .tables
            .values()
            .filter(|t| t.id.tenant == tenant && t.id.calculator == calculator)
            .cloned()
            .collect();
        tables.sort_by(|a, b| a.id.code.cmp(&b.id.code));
        tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Looks up the result of the first row matching every column
    ///
    /// `known_values` maps variable codes to their raw text. Returns `None`
    /// when the table is absent or no row matches.
    pub fn lookup(
        &self,
        id: &CoefficientTableId,
        known_values: &HashMap<String, String>,
        columns: &[CoefficientColumn],
    ) -> Option<String> {
        let Some(table) = self.tables.get(id) else {
            warn!(table = %id, "Coefficient table not found");
            return None;
        };

        let result = table.find(known_values, columns).map(|row| row.result.clone());
        if result.is_none() {
            debug!(table = %id, "No coefficient row matched");
        }
        result
    }

    /// Looks up using the table's own columns and the context's values
    pub fn lookup_in_context(&self, id: &CoefficientTableId, ctx: &VariableContext) -> Option<String> {
        let Some(table) = self.tables.get(id) else {
            warn!(table = %id, "Coefficient table not found");
            return None;
        };
        table
            .find(&ctx.known_values(), &table.columns)
            .map(|row| row.result.clone())
    }

    /// Renders the lookup as a query with variable placeholders
    ///
    /// Used by support tooling to see which row a lookup would pick. Returns
    /// `None` when the table is absent or a column is not part of it.
    pub fn render_query(&self, id: &CoefficientTableId, columns: &[CoefficientColumn]) -> Option<String> {
        let table = self.tables.get(id)?;

        let mut query = format!(
            "SELECT result FROM coefficient WHERE calculator_id = '{}' AND code = '{}'",
            id.calculator.as_uuid(),
            id.code.replace('\'', "''"),
        );
        for column in columns {
            table.column_index(&column.name)?;
            match column.match_mode {
                MatchMode::Exact => {
                    query.push_str(&format!(" AND {} = :{}", column.name, column.variable_code));
                }
                MatchMode::Range => {
                    query.push_str(&format!(
                        " AND :{} BETWEEN {}_min AND {}_max",
                        column.variable_code, column.name, column.name
                    ));
                }
            }
        }
        query.push_str(" ORDER BY row_no LIMIT 1");
        Some(query)
    }

    /// Copies a table's columns and rows to another identity
    ///
    /// Row order is preserved. An existing target table is replaced.
    /// Returns the number of rows copied.
    pub fn copy(&mut self, source: &CoefficientTableId, target: CoefficientTableId) -> Result<usize, CoefficientError> {
        let table = self
            .tables
            .get(source)
            .ok_or_else(|| CoefficientError::TableNotFound(source.clone()))?;

        let copied = table.copy_as(target.clone());
        let rows = copied.rows().len();
        debug!(source = %source, target = %target, rows, "Copied coefficient table");
        self.tables.insert(target, Arc::new(copied));
        Ok(rows)
    }

    /// Copies every table of one calculator to another, e.g. when cloning a product version
    pub fn copy_calculator(
        &mut self,
        tenant: TenantId,
        source: CalculatorId,
        target: CalculatorId,
    ) -> Result<usize, CoefficientError> {
        let ids: Vec<CoefficientTableId> = self
            .tables_for(tenant, source)
            .iter()
            .map(|t| t.id.clone())
            .collect();

        let mut copied = 0;
        for id in ids {
            let target_id = CoefficientTableId::new(tenant, target, id.code.clone());
            self.copy(&id, target_id)?;
            copied += 1;
        }
        Ok(copied)
    }

    /// Loads tables from a JSON array
    pub fn load_from_str(&mut self, json_str: &str) -> Result<usize, CoefficientError> {
        let tables: Vec<CoefficientTable> =
            serde_json::from_str(json_str).map_err(|e| CoefficientError::Parse(e.to_string()))?;

        let count = tables.len();
        for table in tables {
            self.insert(table)?;
        }
        Ok(count)
    }

    /// Loads tables from a JSON file
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, CoefficientError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoefficientError::Parse(format!("{}: {}", path.display(), e)))?;
        self.load_from_str(&content)
    }
}
