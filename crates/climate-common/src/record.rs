//! Normalized projection records.
//!
//! Every data source produces rows of a different shape. They are all
//! normalized into [`ProjectionRecord`], a closed union whose serialized
//! `attribute` field names the climate variable.

use serde::{Deserialize, Serialize};

/// Warming projections from the downscaled CMIP5 table (degrees C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureIncrease {
    pub place_name: String,
    pub year_start: i32,
    pub year_end: i32,
    pub lat: f64,
    pub lon: f64,
    pub observed_warming: f64,
    pub model_26_warming: f64,
    pub model_45_warming: f64,
    pub model_60_warming: f64,
    pub model_85_warming: f64,
}

/// A NOAA climate-explorer projection for one year, with the nearest
/// observed 1950-2013 average as baseline when one is in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoaaProjection {
    pub place_name: String,
    pub year: i32,
    pub lat: f64,
    pub lon: f64,
    pub rcp45_weighted_mean: f64,
    pub rcp45_min: f64,
    pub rcp45_max: f64,
    pub rcp85_weighted_mean: f64,
    pub rcp85_min: f64,
    pub rcp85_max: f64,
    pub historical_average: Option<f64>,
}

/// Single-year flooding probabilities per emissions scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeaLevelRisk {
    pub place_name: String,
    pub year: i32,
    pub lat: f64,
    pub lon: f64,
    pub rcp26: f64,
    pub rcp45: f64,
    pub rcp85: f64,
}

/// Weighted-mean projections from the gridded API alongside the
/// historical mean of the same element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GriddedProjection {
    pub rcp45_mean: f64,
    pub rcp85_mean: f64,
    pub historical_average: f64,
}

/// Attributes stored in the NOAA projections / observations tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoaaAttribute {
    NumDaysAbove100f,
    NumDryDays,
}

impl NoaaAttribute {
    pub const ALL: [NoaaAttribute; 2] = [NoaaAttribute::NumDaysAbove100f, NoaaAttribute::NumDryDays];

    /// Value of the `attribute` column, which is also the name of the
    /// matching baseline column in `noaa_observations`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoaaAttribute::NumDaysAbove100f => "num_days_above_100f",
            NoaaAttribute::NumDryDays => "num_dry_days",
        }
    }
}

/// Public attribute names for gridded API elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GriddedAttribute {
    TempNumDaysAbove100f,
    TempNumDaysAbove90f,
    TempAvg,
    TempNumDaysBelow32f,
    PrecipitationNumDryDays,
    PrecipitationTotal,
}

impl GriddedAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            GriddedAttribute::TempNumDaysAbove100f => "temp_num_days_above_100f",
            GriddedAttribute::TempNumDaysAbove90f => "temp_num_days_above_90f",
            GriddedAttribute::TempAvg => "temp_avg",
            GriddedAttribute::TempNumDaysBelow32f => "temp_num_days_below_32f",
            GriddedAttribute::PrecipitationNumDryDays => "precipitation_num_dry_days",
            GriddedAttribute::PrecipitationTotal => "precipitation_total",
        }
    }
}

/// One normalized result entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute")]
pub enum ProjectionRecord {
    #[serde(rename = "temperature_increase")]
    TemperatureIncrease(TemperatureIncrease),
    #[serde(rename = "num_days_above_100f")]
    NumDaysAbove100f(NoaaProjection),
    #[serde(rename = "num_dry_days")]
    NumDryDays(NoaaProjection),
    #[serde(rename = "coastal_flooding_single_year_5ft")]
    CoastalFloodingSingleYear5ft(SeaLevelRisk),
    #[serde(rename = "temp_num_days_above_100f")]
    TempNumDaysAbove100f(GriddedProjection),
    #[serde(rename = "temp_num_days_above_90f")]
    TempNumDaysAbove90f(GriddedProjection),
    #[serde(rename = "temp_avg")]
    TempAvg(GriddedProjection),
    #[serde(rename = "temp_num_days_below_32f")]
    TempNumDaysBelow32f(GriddedProjection),
    #[serde(rename = "precipitation_num_dry_days")]
    PrecipitationNumDryDays(GriddedProjection),
    #[serde(rename = "precipitation_total")]
    PrecipitationTotal(GriddedProjection),
}

impl ProjectionRecord {
    pub fn noaa(attribute: NoaaAttribute, projection: NoaaProjection) -> Self {
        match attribute {
            NoaaAttribute::NumDaysAbove100f => ProjectionRecord::NumDaysAbove100f(projection),
            NoaaAttribute::NumDryDays => ProjectionRecord::NumDryDays(projection),
        }
    }

    pub fn gridded(attribute: GriddedAttribute, projection: GriddedProjection) -> Self {
        match attribute {
            GriddedAttribute::TempNumDaysAbove100f => ProjectionRecord::TempNumDaysAbove100f(projection),
            GriddedAttribute::TempNumDaysAbove90f => ProjectionRecord::TempNumDaysAbove90f(projection),
            GriddedAttribute::TempAvg => ProjectionRecord::TempAvg(projection),
            GriddedAttribute::TempNumDaysBelow32f => ProjectionRecord::TempNumDaysBelow32f(projection),
            GriddedAttribute::PrecipitationNumDryDays => {
                ProjectionRecord::PrecipitationNumDryDays(projection)
            }
            GriddedAttribute::PrecipitationTotal => ProjectionRecord::PrecipitationTotal(projection),
        }
    }

    /// The serialized `attribute` tag.
    pub fn attribute(&self) -> &'static str {
        match self {
            ProjectionRecord::TemperatureIncrease(_) => "temperature_increase",
            ProjectionRecord::NumDaysAbove100f(_) => NoaaAttribute::NumDaysAbove100f.as_str(),
            ProjectionRecord::NumDryDays(_) => NoaaAttribute::NumDryDays.as_str(),
            ProjectionRecord::CoastalFloodingSingleYear5ft(_) => "coastal_flooding_single_year_5ft",
            ProjectionRecord::TempNumDaysAbove100f(_) => {
                GriddedAttribute::TempNumDaysAbove100f.as_str()
            }
            ProjectionRecord::TempNumDaysAbove90f(_) => GriddedAttribute::TempNumDaysAbove90f.as_str(),
            ProjectionRecord::TempAvg(_) => GriddedAttribute::TempAvg.as_str(),
            ProjectionRecord::TempNumDaysBelow32f(_) => GriddedAttribute::TempNumDaysBelow32f.as_str(),
            ProjectionRecord::PrecipitationNumDryDays(_) => {
                GriddedAttribute::PrecipitationNumDryDays.as_str()
            }
            ProjectionRecord::PrecipitationTotal(_) => GriddedAttribute::PrecipitationTotal.as_str(),
        }
    }
}
