//! Facilities, customers and the instance text format.

use std::fmt;
use std::str::FromStr;

use crate::error::{CflpError, CflpResult};

/// A location in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A candidate facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    index: usize,
    setup_cost: f64,
    capacity: u64,
    location: Point,
}

impl Facility {
    pub fn new(index: usize, setup_cost: f64, capacity: u64, location: Point) -> Self {
        Self {
            index,
            setup_cost,
            capacity,
            location,
        }
    }

    /// Zero-based position in the instance.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Fixed cost paid when the facility is opened.
    pub fn setup_cost(&self) -> f64 {
        self.setup_cost
    }

    /// Total demand the facility can serve.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn location(&self) -> Point {
        self.location
    }
}

/// A customer that must be served by exactly one facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    index: usize,
    demand: u64,
    location: Point,
}

impl Customer {
    pub fn new(index: usize, demand: u64, location: Point) -> Self {
        Self {
            index,
            demand,
            location,
        }
    }

    /// Zero-based position in the instance.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn demand(&self) -> u64 {
        self.demand
    }

    pub fn location(&self) -> Point {
        self.location
    }
}

/// A CFLP instance. Facility and customer indices are their positions.
///
/// # Examples
///
/// ```
/// use cflp_milp::Instance;
///
/// let instance: Instance = "1 1\n0 10 0 0\n3 3 4\n".parse().unwrap();
/// assert_eq!(instance.facility_count(), 1);
/// assert_eq!(instance.customers()[0].demand(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instance {
    facilities: Vec<Facility>,
    customers: Vec<Customer>,
}

impl Instance {
    /// Builds an instance from `(setup_cost, capacity, location)` and
    /// `(demand, location)` tuples, assigning indices by position.
    pub fn new(
        facilities: impl IntoIterator<Item = (f64, u64, Point)>,
        customers: impl IntoIterator<Item = (u64, Point)>,
    ) -> Self {
        let facilities = facilities
            .into_iter()
            .enumerate()
            .map(|(i, (cost, cap, loc))| Facility::new(i, cost, cap, loc))
            .collect();
        let customers = customers
            .into_iter()
            .enumerate()
            .map(|(i, (demand, loc))| Customer::new(i, demand, loc))
            .collect();
        Self {
            facilities,
            customers,
        }
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Sum of all demands, widened so any parsed instance fits.
    pub fn total_demand(&self) -> u128 {
        self.customers.iter().map(|c| u128::from(c.demand)).sum()
    }

    pub fn total_capacity(&self) -> u128 {
        self.facilities.iter().map(|f| u128::from(f.capacity)).sum()
    }
}

impl FromStr for Instance {
    type Err = CflpError;

    fn from_str(s: &str) -> CflpResult<Self> {
        parse_instance(s)
    }
}

/// Parses the whitespace-delimited instance format.
///
/// Blank lines are skipped; every other line must carry exactly the fields
/// its position requires. Line numbers in errors are 1-based.
pub fn parse_instance(input: &str) -> CflpResult<Instance> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, fields)| !fields.is_empty());

    let (line_no, header) = lines
        .next()
        .ok_or_else(|| CflpError::parse(1, "missing header line"))?;
    expect_fields(line_no, &header, 2)?;
    let facility_count: usize = parse_field(line_no, header[0], "facility count")?;
    let customer_count: usize = parse_field(line_no, header[1], "customer count")?;
    let mut last_line = line_no;

    let mut facilities = Vec::new();
    for index in 0..facility_count {
        let (line_no, fields) = lines.next().ok_or_else(|| {
            CflpError::parse(
                last_line,
                format!("expected {} facility lines, found {}", facility_count, index),
            )
        })?;
        last_line = line_no;
        expect_fields(line_no, &fields, 4)?;
        let setup_cost: f64 = parse_field(line_no, fields[0], "setup cost")?;
        if !(setup_cost.is_finite() && setup_cost >= 0.0) {
            return Err(CflpError::parse(
                line_no,
                format!("setup cost must be finite and non-negative, got {}", setup_cost),
            ));
        }
        let capacity: u64 = parse_field(line_no, fields[1], "capacity")?;
        let location = parse_point(line_no, fields[2], fields[3])?;
        facilities.push(Facility::new(index, setup_cost, capacity, location));
    }

    let mut customers = Vec::new();
    for index in 0..customer_count {
        let (line_no, fields) = lines.next().ok_or_else(|| {
            CflpError::parse(
                last_line,
                format!("expected {} customer lines, found {}", customer_count, index),
            )
        })?;
        last_line = line_no;
        expect_fields(line_no, &fields, 3)?;
        let demand: u64 = parse_field(line_no, fields[0], "demand")?;
        let location = parse_point(line_no, fields[1], fields[2])?;
        customers.push(Customer::new(index, demand, location));
    }

    if let Some((line_no, _)) = lines.next() {
        return Err(CflpError::parse(
            line_no,
            "unexpected data after the last customer line",
        ));
    }

    Ok(Instance {
        facilities,
        customers,
    })
}

fn expect_fields(line: usize, fields: &[&str], expected: usize) -> CflpResult<()> {
    if fields.len() != expected {
        return Err(CflpError::parse(
            line,
            format!("expected {} fields, found {}", expected, fields.len()),
        ));
    }
    Ok(())
}

fn parse_field<T>(line: usize, token: &str, what: &str) -> CflpResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    token
        .parse()
        .map_err(|e| CflpError::parse(line, format!("invalid {} '{}': {}", what, token, e)))
}

fn parse_point(line: usize, x: &str, y: &str) -> CflpResult<Point> {
    let x: f64 = parse_field(line, x, "x coordinate")?;
    let y: f64 = parse_field(line, y, "y coordinate")?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(CflpError::parse(line, "coordinates must be finite"));
    }
    Ok(Point::new(x, y))
}
