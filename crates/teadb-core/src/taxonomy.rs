//! Closed vocabularies shared by the normalizers, the database layer, and the
//! notes generator.
//!
//! Each enum serializes as its `snake_case` database label and round-trips
//! through [`std::str::FromStr`].

use serde::{Deserialize, Serialize};

use crate::catalog::SteepingParams;

/// Tea families recognised by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeaType {
    Black,
    Green,
    White,
    Oolong,
    Puerh,
    Herbal,
    Rooibos,
    Mate,
}

impl TeaType {
    pub const ALL: [TeaType; 8] = [
        TeaType::Black,
        TeaType::Green,
        TeaType::White,
        TeaType::Oolong,
        TeaType::Puerh,
        TeaType::Herbal,
        TeaType::Rooibos,
        TeaType::Mate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TeaType::Black => "black",
            TeaType::Green => "green",
            TeaType::White => "white",
            TeaType::Oolong => "oolong",
            TeaType::Puerh => "puerh",
            TeaType::Herbal => "herbal",
            TeaType::Rooibos => "rooibos",
            TeaType::Mate => "mate",
        }
    }

    /// Brewing defaults applied when a vendor publishes no steeping guidance.
    #[must_use]
    pub fn default_steeping(self) -> SteepingParams {
        let (temp_f, min, max) = match self {
            TeaType::Black | TeaType::Puerh => (212, 3, 5),
            TeaType::Green => (175, 2, 3),
            TeaType::White => (175, 2, 4),
            TeaType::Oolong | TeaType::Mate => (195, 3, 5),
            TeaType::Herbal | TeaType::Rooibos => (212, 5, 7),
        };
        SteepingParams {
            temp_f,
            time_min_minutes: min,
            time_max_minutes: max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeawareCategory {
    Gaiwan,
    Teapot,
    Cup,
    Pitcher,
    TeaPet,
    TeaTray,
    Canister,
    TravelSet,
    Kettle,
    TeaTools,
    Other,
}

impl TeawareCategory {
    pub const ALL: [TeawareCategory; 11] = [
        TeawareCategory::Gaiwan,
        TeawareCategory::Teapot,
        TeawareCategory::Cup,
        TeawareCategory::Pitcher,
        TeawareCategory::TeaPet,
        TeawareCategory::TeaTray,
        TeawareCategory::Canister,
        TeawareCategory::TravelSet,
        TeawareCategory::Kettle,
        TeawareCategory::TeaTools,
        TeawareCategory::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TeawareCategory::Gaiwan => "gaiwan",
            TeawareCategory::Teapot => "teapot",
            TeawareCategory::Cup => "cup",
            TeawareCategory::Pitcher => "pitcher",
            TeawareCategory::TeaPet => "tea_pet",
            TeawareCategory::TeaTray => "tea_tray",
            TeawareCategory::Canister => "canister",
            TeawareCategory::TravelSet => "travel_set",
            TeawareCategory::Kettle => "kettle",
            TeawareCategory::TeaTools => "tea_tools",
            TeawareCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeawareMaterial {
    YixingClay,
    JianshuiClay,
    Porcelain,
    Glass,
    CastIron,
    Silver,
    Stoneware,
    Ceramic,
    Other,
}

impl TeawareMaterial {
    pub const ALL: [TeawareMaterial; 9] = [
        TeawareMaterial::YixingClay,
        TeawareMaterial::JianshuiClay,
        TeawareMaterial::Porcelain,
        TeawareMaterial::Glass,
        TeawareMaterial::CastIron,
        TeawareMaterial::Silver,
        TeawareMaterial::Stoneware,
        TeawareMaterial::Ceramic,
        TeawareMaterial::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TeawareMaterial::YixingClay => "yixing_clay",
            TeawareMaterial::JianshuiClay => "jianshui_clay",
            TeawareMaterial::Porcelain => "porcelain",
            TeawareMaterial::Glass => "glass",
            TeawareMaterial::CastIron => "cast_iron",
            TeawareMaterial::Silver => "silver",
            TeawareMaterial::Stoneware => "stoneware",
            TeawareMaterial::Ceramic => "ceramic",
            TeawareMaterial::Other => "other",
        }
    }
}

/// Named clays for unglazed teaware. Optional on a teaware row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClayType {
    ZiSha,
    HongNi,
    DuanNi,
    ZiNi,
    QingShuiNi,
    DiCaoQing,
    Jianshui,
    Huaning,
}

impl ClayType {
    pub const ALL: [ClayType; 8] = [
        ClayType::ZiSha,
        ClayType::HongNi,
        ClayType::DuanNi,
        ClayType::ZiNi,
        ClayType::QingShuiNi,
        ClayType::DiCaoQing,
        ClayType::Jianshui,
        ClayType::Huaning,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClayType::ZiSha => "zi_sha",
            ClayType::HongNi => "hong_ni",
            ClayType::DuanNi => "duan_ni",
            ClayType::ZiNi => "zi_ni",
            ClayType::QingShuiNi => "qing_shui_ni",
            ClayType::DiCaoQing => "di_cao_qing",
            ClayType::Jianshui => "jianshui",
            ClayType::Huaning => "huaning",
        }
    }
}

impl std::fmt::Display for TeaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for TeawareCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for TeawareMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for ClayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks `s` up among `all` by database label.
fn parse_label<T: Copy>(
    s: &str,
    all: &[T],
    label: fn(T) -> &'static str,
    kind: &str,
) -> Result<T, String> {
    let s = s.trim();
    all.iter()
        .copied()
        .find(|v| label(*v) == s)
        .ok_or_else(|| format!("unknown {kind} '{s}'"))
}

impl std::str::FromStr for TeaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str, "tea type")
    }
}

impl std::str::FromStr for TeawareCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str, "teaware category")
    }
}

impl std::str::FromStr for TeawareMaterial {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str, "teaware material")
    }
}

impl std::str::FromStr for ClayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str, "clay type")
    }
}
