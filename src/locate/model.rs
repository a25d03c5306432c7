//! Solver-independent MILP description
//!
//! The builder fills a [`MilpModel`] with columns and rows; an engine
//! translates it into its own representation. Columns are referred to by
//! [`ColumnId`], which is only handed out by [`MilpModel::add_column`].

use crate::error::{CflpError, CflpResult};

/// Handle to a column of a [`MilpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

impl ColumnId {
    /// Position of the column in the model and in the engine's value vector.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cost: f64,
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
}

/// Which constraint group a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// `sum_f assign[c][f] = 1`
    Assignment { customer: usize },
    /// `assign[c][f] - open[f]` bounded above by 0
    Linking { facility: usize, customer: usize },
    /// `sum_c demand[c] * assign[c][f] <= capacity[f]`
    Capacity { facility: usize },
}

/// A linear constraint `lower <= sum(coef * col) <= upper`.
///
/// Infinite bounds mean the side is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub lower: f64,
    pub upper: f64,
    pub terms: Vec<(ColumnId, f64)>,
}

impl Row {
    /// Left-hand side evaluated at `values`.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(col, coef)| coef * values[col.0]).sum()
    }

    /// Whether the row holds at `values` within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let act = self.activity(values);
        act >= self.lower - tol && act <= self.upper + tol
    }
}

/// A minimization MILP.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MilpModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_columns: usize, n_rows: usize) -> Self {
        Self {
            columns: Vec::with_capacity(n_columns),
            rows: Vec::with_capacity(n_rows),
        }
    }

    /// Adds a binary column with the given objective coefficient.
    pub fn add_binary(&mut self, name: String, cost: f64) -> ColumnId {
        self.add_column(Column {
            name,
            cost,
            lower: 0.0,
            upper: 1.0,
            integer: true,
        })
    }

    pub fn add_column(&mut self, column: Column) -> ColumnId {
        let id = ColumnId(self.columns.len());
        self.columns.push(column);
        id
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of nonzero coefficients over all rows.
    pub fn n_nonzeros(&self) -> usize {
        self.rows.iter().map(|r| r.terms.len()).sum()
    }

    /// Objective value at `values`.
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(col, &v)| col.cost * v)
            .sum()
    }
}

/// Arena of the CFLP decision variables.
///
/// `open[f]` and `assign[c][f]` are stored densely; every lookup is
/// bounds-checked against the instance dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStore {
    n_facilities: usize,
    n_customers: usize,
    open: Vec<ColumnId>,
    // row-major by customer
    assign: Vec<ColumnId>,
}

impl VariableStore {
    pub(crate) fn new(n_facilities: usize, n_customers: usize) -> Self {
        Self {
            n_facilities,
            n_customers,
            open: Vec::with_capacity(n_facilities),
            assign: Vec::with_capacity(n_customers * n_facilities),
        }
    }

    pub(crate) fn push_open(&mut self, col: ColumnId) {
        debug_assert!(self.open.len() < self.n_facilities);
        self.open.push(col);
    }

    /// Registers the next `assign` column; callers push in (customer, facility) order.
    pub(crate) fn push_assign(&mut self, col: ColumnId) {
        debug_assert!(self.assign.len() < self.n_customers * self.n_facilities);
        self.assign.push(col);
    }

    /// Column of `open[facility]`.
    pub fn open(&self, facility: usize) -> CflpResult<ColumnId> {
        self.open
            .get(facility)
            .copied()
            .ok_or_else(|| self.out_of_range(format!("open[{}]", facility)))
    }

    /// Column of `assign[customer][facility]`.
    pub fn assign(&self, customer: usize, facility: usize) -> CflpResult<ColumnId> {
        if customer >= self.n_customers || facility >= self.n_facilities {
            return Err(self.out_of_range(format!("assign[{}][{}]", customer, facility)));
        }
        self.assign
            .get(customer * self.n_facilities + facility)
            .copied()
            .ok_or_else(|| self.out_of_range(format!("assign[{}][{}]", customer, facility)))
    }

    pub fn n_facilities(&self) -> usize {
        self.n_facilities
    }

    pub fn n_customers(&self) -> usize {
        self.n_customers
    }

    fn out_of_range(&self, variable: String) -> CflpError {
        CflpError::VariableOutOfRange {
            variable,
            facility_count: self.n_facilities,
            customer_count: self.n_customers,
        }
    }
}
