pub use anyhow::Result;

use std::fmt;
use fnv::FnvHashMap as Map;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnkownInstanceName,
    IndexOutOfRange,
    /// CSV header is missing a required column
    MissingColumn(String),
    /// Field could not be parsed as a number: (column, value)
    BadNumber(String, String),
    /// Location referenced by a cart or WIP record but absent from the travel-time table
    UnknownLocation(String),
    /// Off-diagonal pair absent from the travel-time table
    MissingTravelTime(String, String),
    /// Negative or non-finite travel time
    InvalidTravelTime(String, String, f64),
    DuplicateId(String),
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingColumn(c) => write!(f, "missing column `{}`", c),
            Error::BadNumber(c, v) => write!(f, "column `{}`: cannot parse `{}` as a number", c, v),
            Error::UnknownLocation(l) => write!(f, "location {} is not in the travel-time table", l),
            Error::MissingTravelTime(i, j) => write!(f, "no travel time for {} -> {}", i, j),
            Error::InvalidTravelTime(i, j, t) => write!(f, "invalid travel time {} for {} -> {}", t, i, j),
            Error::DuplicateId(id) => write!(f, "duplicate id {}", id),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

impl std::error::Error for Error {}


pub mod dataset;
pub mod raw;

mod parsers;
pub use parsers::{ParseInstance, CsvFile, CsvText};
