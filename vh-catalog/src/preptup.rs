//! PrepTup: a declarative column-projection pipeline for turning an
//! inbound tuple into an outbound one. Grounded on `PrepTup.h`: each
//! output column is either copied straight across or computed by a
//! [`PrepCol`], and columns run in the order they were added.

use std::cell::Cell;

use vh_types::Value;

use crate::error::CatalogError;

/// A column transform. Given the source values a column's search
/// paths resolved, produce the output value.
pub trait PrepCol {
    fn apply(&self, inputs: &[Value]) -> Value;
}

/// `CopyCol`: passes its single input straight through.
pub struct CopyCol;

impl PrepCol for CopyCol {
    fn apply(&self, inputs: &[Value]) -> Value {
        inputs.first().cloned().unwrap_or(Value::Null)
    }
}

/// The MinMax PrepCol (spec.md section 4.5): precomputes min/max as
/// doubles over every value seen, then `apply` returns
/// `(x - min) / (max - min)`. Min/max live behind a `Cell` since
/// `accumulate` has to run ahead of `apply` over the same instance but
/// `PrepCol::apply` takes `&self`, matching every other transform.
pub struct MinMaxPrepCol {
    min: Cell<f64>,
    max: Cell<f64>,
}

impl MinMaxPrepCol {
    pub fn new() -> Self {
        MinMaxPrepCol {
            min: Cell::new(f64::INFINITY),
            max: Cell::new(f64::NEG_INFINITY),
        }
    }

    fn as_f64(value: &Value) -> f64 {
        match value {
            Value::I16(v) => *v as f64,
            Value::I32(v) => *v as f64,
            Value::I64(v) => *v as f64,
            Value::Float(v) => *v as f64,
            Value::Double(v) => *v,
            Value::Bool(_) | Value::Bytes(_) | Value::Null => 0.0,
        }
    }

    /// Folds `value` into the running min/max. Callers must accumulate
    /// every input a column will see before relying on `apply`'s
    /// normalized result.
    pub fn accumulate(&self, value: &Value) {
        let v = Self::as_f64(value);
        if v < self.min.get() {
            self.min.set(v);
        }
        if v > self.max.get() {
            self.max.set(v);
        }
    }
}

impl Default for MinMaxPrepCol {
    fn default() -> Self {
        Self::new()
    }
}

impl PrepCol for MinMaxPrepCol {
    fn apply(&self, inputs: &[Value]) -> Value {
        let v = inputs.first().map(Self::as_f64).unwrap_or(0.0);
        let (min, max) = (self.min.get(), self.max.get());
        if max > min {
            Value::Double((v - min) / (max - min))
        } else {
            Value::Double(0.0)
        }
    }
}

struct PrepTupColumn {
    target_name: String,
    /// `chain`: when true for a given input slot, the promoted value
    /// (as threaded through earlier columns) is used instead of the
    /// inbound tuple's original value.
    chain: Vec<bool>,
    transform: Box<dyn PrepCol>,
}

/// `PrepTupData`: an ordered list of output columns.
#[derive(Default)]
pub struct PrepTup {
    columns: Vec<PrepTupColumn>,
}

impl PrepTup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `vh_pt_col_add`.
    pub fn add_column(
        &mut self,
        target_name: impl Into<String>,
        chain: Vec<bool>,
        transform: Box<dyn PrepCol>,
    ) -> usize {
        self.columns.push(PrepTupColumn {
            target_name: target_name.into(),
            chain,
            transform,
        });
        self.columns.len() - 1
    }

    /// `vh_pt_input_htp`: runs every column's transform over `inputs`
    /// (the resolved value for each of that column's search paths, in
    /// order) and returns the projected output tuple as
    /// `(target column name, value)` pairs.
    pub fn input(&self, per_column_inputs: &[Vec<Value>]) -> Result<Vec<(String, Value)>, CatalogError> {
        if per_column_inputs.len() != self.columns.len() {
            return Err(CatalogError::PrepColUnresolved(
                "input count does not match column count".into(),
            ));
        }
        Ok(self
            .columns
            .iter()
            .zip(per_column_inputs)
            .map(|(col, inputs)| (col.target_name.clone(), col.transform.apply(inputs)))
            .collect())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.target_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DoubleInt;
    impl PrepCol for DoubleInt {
        fn apply(&self, inputs: &[Value]) -> Value {
            match inputs.first() {
                Some(Value::I32(v)) => Value::I32(v * 2),
                _ => Value::Null,
            }
        }
    }

    #[test]
    fn columns_run_in_addition_order() {
        let mut pt = PrepTup::new();
        pt.add_column("id", vec![false], Box::new(CopyCol));
        pt.add_column("doubled", vec![false], Box::new(DoubleInt));

        let output = pt
            .input(&[vec![Value::I32(7)], vec![Value::I32(7)]])
            .unwrap();

        assert_eq!(output[0], ("id".to_string(), Value::I32(7)));
        assert_eq!(output[1], ("doubled".to_string(), Value::I32(14)));
    }

    #[test]
    fn mismatched_input_count_is_an_error() {
        let mut pt = PrepTup::new();
        pt.add_column("id", vec![false], Box::new(CopyCol));
        assert!(pt.input(&[]).is_err());
    }

    #[test]
    fn minmax_prepcol_normalizes_against_the_observed_range() {
        let minmax = MinMaxPrepCol::new();
        for v in [Value::I32(10), Value::I32(20), Value::I32(30)] {
            minmax.accumulate(&v);
        }
        assert_eq!(minmax.apply(&[Value::I32(20)]), Value::Double(0.5));
    }
}
