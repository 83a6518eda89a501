use serde::{Deserialize, Serialize};
use std::fmt;

/// How missing or non-numeric cells in the value column are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    DropRows,
    FillMean,
    FillMedian,
}

impl MissingPolicy {
    pub fn all() -> Vec<Self> {
        vec![Self::DropRows, Self::FillMean, Self::FillMedian]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropRows => "drop_rows",
            Self::FillMean => "fill_mean",
            Self::FillMedian => "fill_median",
        }
    }
}

impl Default for MissingPolicy {
    fn default() -> Self {
        Self::DropRows
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARIMA hyperparameters (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const MAX_P: usize = 10;
    pub const MAX_D: usize = 2;
    pub const MAX_Q: usize = 10;

    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Default candidate grid for automatic order selection
    pub fn default_grid() -> Vec<Self> {
        let mut grid = Vec::new();
        for d in 0..=1 {
            for p in 0..=5 {
                for q in 0..=2 {
                    grid.push(Self::new(p, d, q));
                }
            }
        }
        grid
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 0 }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Either a caller-chosen order or AIC-based selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderChoice {
    Fixed(ArimaOrder),
    Auto(Vec<ArimaOrder>),
}

impl Default for OrderChoice {
    fn default() -> Self {
        Self::Fixed(ArimaOrder::default())
    }
}
