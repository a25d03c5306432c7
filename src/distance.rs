use rayon::prelude::*;

use crate::instance::{Instance, Point};

/// Matrices with more entries than this are filled in parallel.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Euclidean distance between two points.
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Customer-to-facility distances, row-major by customer.
///
/// The model builder and the decoder both read coefficients from the same
/// matrix so the recomputed cost uses exactly the objective's numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n_customers: usize,
    n_facilities: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_instance(instance: &Instance) -> Self {
        let n_customers = instance.customer_count();
        let n_facilities = instance.facility_count();
        let customers = instance.customers();
        let facilities = instance.facilities();

        let row = |c: usize| {
            let origin = customers[c].location();
            facilities
                .iter()
                .map(|f| euclidean(origin, f.location()))
                .collect::<Vec<_>>()
        };

        // Compute distances in parallel for large matrices
        let data: Vec<f64> = if n_customers * n_facilities > PARALLEL_THRESHOLD {
            (0..n_customers).into_par_iter().flat_map(row).collect()
        } else {
            (0..n_customers).flat_map(row).collect()
        };

        Self {
            n_customers,
            n_facilities,
            data,
        }
    }

    /// Distance from `customer` to `facility`, `None` when out of range.
    pub fn checked_get(&self, customer: usize, facility: usize) -> Option<f64> {
        if customer < self.n_customers && facility < self.n_facilities {
            Some(self.data[customer * self.n_facilities + facility])
        } else {
            None
        }
    }

    /// Panics when out of range; callers iterate within the instance dimensions.
    pub(crate) fn get(&self, customer: usize, facility: usize) -> f64 {
        assert!(
            customer < self.n_customers && facility < self.n_facilities,
            "distance ({}, {}) out of range {}x{}",
            customer,
            facility,
            self.n_customers,
            self.n_facilities
        );
        self.data[customer * self.n_facilities + facility]
    }

    pub fn n_customers(&self) -> usize {
        self.n_customers
    }

    pub fn n_facilities(&self) -> usize {
        self.n_facilities
    }
}
