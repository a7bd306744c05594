//! Functions for reading/writing candidate tables in CSV format.
pub use csv::Error;
use csv::{ReaderBuilder, Writer};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Cursor;

/// A row of the candidate table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Row {
    /// Input start angle offset in degrees
    pub offset2: u32,
    /// Output start angle offset in degrees
    pub offset4: u32,
    /// Ground link
    pub r1: f64,
    /// Driver link
    pub r2: f64,
    /// Coupler link
    pub r3: f64,
    /// Follower link
    pub r4: f64,
    /// Cost of the objective
    pub cost: f64,
}

impl From<&crate::Candidate> for Row {
    fn from(c: &crate::Candidate) -> Self {
        let [offset2, offset4] = c.offset;
        let [r1, r2, r3, r4] = c.fb.planar_loop();
        Self { offset2, offset4, r1, r2, r3, r4, cost: c.cost }
    }
}

/// Parse CSV from string.
///
/// Lines start with `#` are comments.
pub fn parse_csv<D>(s: &str) -> Result<Vec<D>, Error>
where
    D: DeserializeOwned,
{
    ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(Cursor::new(s))
        .deserialize()
        .collect()
}

/// Dump CSV with a header line to string.
pub fn dump_csv<S>(rows: &[S]) -> Result<String, Box<dyn std::error::Error>>
where
    S: Serialize,
{
    let mut w = Writer::from_writer(Vec::new());
    rows.iter().try_for_each(|row| w.serialize(row))?;
    Ok(String::from_utf8(w.into_inner()?)?)
}
