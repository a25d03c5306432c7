//! Exact facility location models solved as MILPs.

pub mod cflp;
pub mod decode;
pub mod model;
pub mod solver;
