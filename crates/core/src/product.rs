//! Product unit-of-measure values.
//!
//! These must match the `CHECK` constraint on `products.dimension`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dimension assigned to new products when the client omits one.
pub const DEFAULT_DIMENSION: Dimension = Dimension::Pc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimension {
    Bag,
    Bundle,
    Box,
    Carton,
    Coils,
    Dozen,
    Ft,
    Gross,
    Kg,
    Mtr,
    #[default]
    Pc,
    Pkt,
    Set,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

impl Dimension {
    pub const ALL: [Dimension; 14] = [
        Dimension::Bag,
        Dimension::Bundle,
        Dimension::Box,
        Dimension::Carton,
        Dimension::Coils,
        Dimension::Dozen,
        Dimension::Ft,
        Dimension::Gross,
        Dimension::Kg,
        Dimension::Mtr,
        Dimension::Pc,
        Dimension::Pkt,
        Dimension::Set,
        Dimension::NotApplicable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Bag => "Bag",
            Dimension::Bundle => "Bundle",
            Dimension::Box => "Box",
            Dimension::Carton => "Carton",
            Dimension::Coils => "Coils",
            Dimension::Dozen => "Dozen",
            Dimension::Ft => "Ft",
            Dimension::Gross => "Gross",
            Dimension::Kg => "Kg",
            Dimension::Mtr => "Mtr",
            Dimension::Pc => "Pc",
            Dimension::Pkt => "Pkt",
            Dimension::Set => "Set",
            Dimension::NotApplicable => "Not Applicable",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Dimension::ALL.iter().map(|d| d.as_str()).collect();
                format!("'{s}' is not a valid dimension. Must be one of: {valid:?}")
            })
    }
}
