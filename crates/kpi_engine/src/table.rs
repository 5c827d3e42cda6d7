//! KPI Table - typed row store over an immutable schema
//!
//! Every cell of every row holds a value of its column's declared type from
//! allocation on. Calculators overwrite cells by `(row, column)`; the table
//! is rounded once by [`KpiTable::finalize`] and read-only afterwards.

use contracts::{ColumnSpec, ColumnType, ContractError, Feature, KpiSchema, KpiValue};
use std::cmp::Ordering;

/// Typed KPI rows keyed by window label
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    schema: KpiSchema,
    labels: Vec<String>,
    rows: Vec<Vec<KpiValue>>,
    finalized: bool,
}

/// Borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct KpiRow<'a> {
    pub label: &'a str,
    pub values: &'a [KpiValue],
}

impl KpiTable {
    /// Allocate `row_count` rows filled with typed defaults
    pub fn create(schema: KpiSchema, row_count: usize) -> Self {
        let defaults = default_row(&schema);
        Self {
            labels: vec![String::new(); row_count],
            rows: vec![defaults; row_count],
            schema,
            finalized: false,
        }
    }

    /// Allocate one row per label
    pub fn with_labels(schema: KpiSchema, labels: Vec<String>) -> Self {
        let mut table = Self::create(schema, labels.len());
        table.labels = labels;
        table
    }

    pub fn schema(&self) -> &KpiSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn label(&self, row: usize) -> Option<&str> {
        self.labels.get(row).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// # Errors
    /// Returns `InvalidIndex` for a row outside the table.
    pub fn set_label(&mut self, row: usize, label: impl Into<String>) -> Result<(), ContractError> {
        let rows = self.rows.len();
        let slot = self
            .labels
            .get_mut(row)
            .ok_or_else(|| ContractError::invalid_index("label", format!("row {row} of {rows}")))?;
        *slot = label.into();
        Ok(())
    }

    /// Make sure `name` exists, appending it with typed defaults if not
    ///
    /// # Errors
    /// Returns `KpiColumn` if the column exists with another type.
    pub fn ensure_column(
        &mut self,
        name: &str,
        ty: ColumnType,
        unit: &str,
    ) -> Result<(), ContractError> {
        if let Some(existing) = self.schema.column(name) {
            if existing.ty != ty {
                return Err(ContractError::kpi_column(
                    name,
                    format!("declared as {:?}, calculator writes {:?}", existing.ty, ty),
                ));
            }
            return Ok(());
        }
        self.check_writable(name)?;
        self.schema = self
            .schema
            .extended(ColumnSpec::new(name, ty, unit, Feature::Common))?;
        let default = KpiValue::default_for(ty);
        for row in &mut self.rows {
            row.push(default.clone());
        }
        Ok(())
    }

    /// Assign one cell
    ///
    /// # Errors
    /// Returns `InvalidIndex` for an unknown row, `KpiColumn` for an unknown
    /// column, a type mismatch or a write after finalize.
    pub fn set(
        &mut self,
        row: usize,
        column: &str,
        value: impl Into<KpiValue>,
    ) -> Result<(), ContractError> {
        self.check_writable(column)?;
        let value = value.into();
        let pos = self
            .schema
            .position(column)
            .ok_or_else(|| ContractError::kpi_column(column, "unknown column"))?;
        let expected = self.schema.columns()[pos].ty;
        if value.column_type() != expected {
            return Err(ContractError::kpi_column(
                column,
                format!("expected {:?}, got {:?}", expected, value.column_type()),
            ));
        }
        let rows = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or_else(|| ContractError::invalid_index(column, format!("row {row} of {rows}")))?;
        cells[pos] = value;
        Ok(())
    }

    /// Reset one cell to its column default
    pub fn reset(&mut self, row: usize, column: &str) -> Result<(), ContractError> {
        let ty = self
            .schema
            .column(column)
            .map(|c| c.ty)
            .ok_or_else(|| ContractError::kpi_column(column, "unknown column"))?;
        self.set(row, column, KpiValue::default_for(ty))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&KpiValue> {
        let pos = self.schema.position(column)?;
        self.rows.get(row).map(|cells| &cells[pos])
    }

    pub fn get_f64(&self, row: usize, column: &str) -> Option<f64> {
        self.get(row, column).and_then(KpiValue::as_f64)
    }

    pub fn get_bool(&self, row: usize, column: &str) -> Option<bool> {
        self.get(row, column).and_then(KpiValue::as_bool)
    }

    pub fn row(&self, row: usize) -> Option<KpiRow<'_>> {
        Some(KpiRow {
            label: self.labels.get(row)?.as_str(),
            values: self.rows.get(row)?.as_slice(),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = KpiRow<'_>> {
        self.labels
            .iter()
            .zip(&self.rows)
            .map(|(label, values)| KpiRow {
                label: label.as_str(),
                values: values.as_slice(),
            })
    }

    /// Round every double cell to `decimals` places, once
    pub fn finalize(&mut self, decimals: u32) {
        if self.finalized {
            return;
        }
        let scale = 10f64.powi(decimals as i32);
        for cells in &mut self.rows {
            for cell in cells.iter_mut() {
                if let KpiValue::Double(v) = cell {
                    if v.is_finite() {
                        *v = (*v * scale).round() / scale;
                    }
                }
            }
        }
        self.finalized = true;
    }

    /// `"name [unit]"` headers in column order
    pub fn display_names(&self) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .map(ColumnSpec::display_name)
            .collect()
    }

    /// Row indices ordered ascending by a double column, NaN last
    ///
    /// Unknown or non-double columns keep the insertion order.
    pub fn rows_sorted_by(&self, column: &str) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        let is_double = self
            .schema
            .column(column)
            .is_some_and(|c| c.ty == ColumnType::Double);
        if !is_double {
            return order;
        }
        let key = |row: usize| self.get_f64(row, column).unwrap_or(f64::NAN);
        order.sort_by(|&a, &b| match (key(a), key(b)) {
            (x, y) if x.is_nan() && y.is_nan() => Ordering::Equal,
            (x, _) if x.is_nan() => Ordering::Greater,
            (_, y) if y.is_nan() => Ordering::Less,
            (x, y) => x.total_cmp(&y),
        });
        order
    }

    fn check_writable(&self, column: &str) -> Result<(), ContractError> {
        if self.finalized {
            return Err(ContractError::kpi_column(column, "table already finalized"));
        }
        Ok(())
    }
}

fn default_row(schema: &KpiSchema) -> Vec<KpiValue> {
    schema
        .columns()
        .iter()
        .map(|c| KpiValue::default_for(c.ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> KpiSchema {
        KpiSchema::new(vec![
            ColumnSpec::new("vehSpd", ColumnType::Double, "kph", Feature::Common),
            ColumnSpec::new("isPBOn", ColumnType::Boolean, "", Feature::Aeb),
            ColumnSpec::new("note", ColumnType::String, "", Feature::Common),
        ])
        .unwrap()
    }

    #[test]
    fn test_create_fills_typed_defaults() {
        let table = KpiTable::create(schema(), 2);
        for row in 0..2 {
            assert!(table.get_f64(row, "vehSpd").unwrap().is_nan());
            assert_eq!(table.get_bool(row, "isPBOn"), Some(false));
            assert_eq!(table.get(row, "note").unwrap().as_str(), Some(""));
        }
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut table = KpiTable::create(schema(), 1);
        let result = table.set(0, "vehSpd", "fast");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("vehSpd"));
        assert!(table.set(0, "vehSpd", 50.0).is_ok());
    }

    #[test]
    fn test_set_unknown_row_or_column() {
        let mut table = KpiTable::create(schema(), 1);
        assert!(table.set(3, "vehSpd", 1.0).is_err());
        assert!(table.set(0, "missing", 1.0).is_err());
    }

    #[test]
    fn test_ensure_column_appends_defaults() {
        let mut table = KpiTable::create(schema(), 2);
        table.ensure_column("extra", ColumnType::Boolean, "").unwrap();
        assert_eq!(table.get_bool(1, "extra"), Some(false));
        // same type again is a no-op
        table.ensure_column("extra", ColumnType::Boolean, "").unwrap();
        assert_eq!(table.schema().len(), 4);
        assert!(table.ensure_column("vehSpd", ColumnType::String, "").is_err());
    }

    #[test]
    fn test_finalize_rounds_once() {
        let mut table = KpiTable::create(schema(), 1);
        table.set(0, "vehSpd", 12.34567).unwrap();
        table.finalize(3);
        assert_eq!(table.get_f64(0, "vehSpd"), Some(12.346));
        assert!(table.set(0, "vehSpd", 1.0).is_err());
    }

    #[test]
    fn test_rows_sorted_by_nan_last() {
        let mut table = KpiTable::with_labels(
            schema(),
            vec!["a".into(), "b".into(), "c".into()],
        );
        table.set(0, "vehSpd", 80.0).unwrap();
        table.set(2, "vehSpd", 20.0).unwrap();
        assert_eq!(table.rows_sorted_by("vehSpd"), vec![2, 0, 1]);
        assert_eq!(table.rows_sorted_by("note"), vec![0, 1, 2]);
    }

    #[test]
    fn test_display_names() {
        let table = KpiTable::create(schema(), 0);
        assert_eq!(table.display_names(), vec!["vehSpd [kph]", "isPBOn", "note"]);
    }
}
