//! Mission descriptors.
//!
//! A [`Mission`] is plain data: the catalog collection name plus the
//! product-type tokens that commonly appear in that mission's product names.
//! The built-in Sentinel missions are exposed as constants and can be looked up
//! by name with [`Mission::from_name`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A catalog collection and its known product-type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mission {
    name: &'static str,
    product_types: &'static [&'static str],
}

/// Returned when a mission name is not one of the built-in missions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mission '{name}': expected one of {}", Mission::ALL.map(|m| m.name()).join(", "))]
pub struct UnknownMission {
    /// The rejected name.
    pub name: String,
}

impl Mission {
    /// Sentinel-1 (C-band SAR).
    pub const SENTINEL_1: Self = Self {
        name: "SENTINEL-1",
        product_types: &["RAW", "SLC", "GRD", "GRDH", "GRDM", "OCN", "IW", "EW"],
    };

    /// Sentinel-2 (multispectral imagery).
    pub const SENTINEL_2: Self = Self {
        name: "SENTINEL-2",
        product_types: &["L1C", "L2A"],
    };

    /// Sentinel-3 (ocean and land colour, temperature, altimetry).
    pub const SENTINEL_3: Self = Self {
        name: "SENTINEL-3",
        product_types: &["OL_1", "OL_2", "SL_1", "SL_2", "SR_1", "SR_2", "SR", "SY_2"],
    };

    /// Sentinel-5P (atmospheric composition).
    pub const SENTINEL_5P: Self = Self {
        name: "SENTINEL-5P",
        product_types: &[
            "L1B_RA_BD1",
            "L1B_RA_BD2",
            "L1B_RA_BD3",
            "L1B_RA_BD4",
            "L1B_RA_BD5",
            "L1B_RA_BD6",
            "L1B_RA_BD7",
            "L1B_RA_BD8",
            "L2__AER_AI",
            "L2__AER_LH",
            "L2__CH4",
            "L2__CLOUD",
            "L2__CO",
            "L2__HCHO",
            "L2__NO2",
            "L2__NP_BD3",
            "L2__NP_BD6",
            "L2__NP_BD7",
            "L2__O3_TCL",
            "L2__O3__PR",
            "L2__O3",
            "L2__SO2",
        ],
    };

    /// Sentinel-6 (ocean altimetry).
    pub const SENTINEL_6: Self = Self {
        name: "SENTINEL-6",
        product_types: &["MW_2__AMR", "P4_1B_LR", "P4_2__LR"],
    };

    /// Every built-in mission.
    pub const ALL: [Self; 5] = [
        Self::SENTINEL_1,
        Self::SENTINEL_2,
        Self::SENTINEL_3,
        Self::SENTINEL_5P,
        Self::SENTINEL_6,
    ];

    /// Creates a custom mission descriptor.
    #[must_use]
    pub const fn new(name: &'static str, product_types: &'static [&'static str]) -> Self {
        Self {
            name,
            product_types,
        }
    }

    /// Looks up a built-in mission by collection name or short alias.
    ///
    /// Accepts `SENTINEL-2`, `sentinel-2`, `sentinel2`, `S2` and so on.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMission`] if the name matches no built-in mission.
    pub fn from_name(name: &str) -> Result<Self, UnknownMission> {
        let key = name.trim().to_ascii_uppercase().replace(['-', '_'], "");
        let key = key.strip_prefix("SENTINEL").map_or(key.clone(), |rest| {
            format!("S{rest}")
        });
        Self::ALL
            .into_iter()
            .find(|mission| {
                let short = mission.name.replace('-', "").replace("SENTINEL", "S");
                short == key
            })
            .ok_or_else(|| UnknownMission {
                name: name.to_string(),
            })
    }

    /// Catalog collection name, e.g. `SENTINEL-1`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Product-type tokens known for this mission.
    #[must_use]
    pub fn product_types(&self) -> &'static [&'static str] {
        self.product_types
    }

    /// Returns true if `requested` occurs in at least one known product-type token.
    #[must_use]
    pub fn recognizes_product_type(&self, requested: &str) -> bool {
        self.product_types
            .iter()
            .any(|known| known.contains(requested))
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for Mission {
    type Err = UnknownMission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
