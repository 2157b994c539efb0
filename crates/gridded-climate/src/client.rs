//! Cached projection and historical-average queries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics::counter;
use tracing::{debug, instrument, warn};

use climate_common::{
    ClimateError, ClimateResult, Coordinate, DateRange, GriddedAttribute, GriddedProjection,
    ProjectionRecord,
};
use storage::{GridCacheKey, GridResponseCache};

use crate::api::{GridDataApi, GridDataRequest, GridFetch};
use crate::elements::{element_attributes, GRID_ELEMENTS};
use crate::response::{parse_number, parse_year, GridDataResponse};

/// Element key (`name:reduce`) to value.
pub type ElementValues = HashMap<String, f64>;

/// Grid used for historical averages (observation-based).
const HISTORICAL_GRID: &str = "livneh";

/// Emissions scenario of a projection grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Rcp45,
    Rcp85,
}

impl Scenario {
    /// Weighted-mean LOCA grid for this scenario.
    pub fn grid(&self) -> &'static str {
        match self {
            Scenario::Rcp45 => "loca:wmean:rcp45",
            Scenario::Rcp85 => "loca:wmean:rcp85",
        }
    }
}

/// Gridded-climate client. All upstream calls go through the response cache.
pub struct GriddedClimateClient {
    api: Arc<dyn GridDataApi>,
    cache: Arc<dyn GridResponseCache>,
    attributes: Vec<(String, GriddedAttribute)>,
    historical_range: DateRange,
}

impl GriddedClimateClient {
    /// Build the client. Fails if any requested element lacks a public
    /// attribute name.
    pub fn new(api: Arc<dyn GridDataApi>, cache: Arc<dyn GridResponseCache>) -> ClimateResult<Self> {
        // Observation data stops at 2013
        let historical_range = DateRange::new(ymd(1950, 1, 1)?, ymd(2013, 1, 1)?);

        Ok(Self {
            api,
            cache,
            attributes: element_attributes()?,
            historical_range,
        })
    }

    pub fn historical_range(&self) -> DateRange {
        self.historical_range
    }

    /// Projected values for one year. Elements the service has no value for
    /// that year are left out.
    #[instrument(skip(self), fields(grid = scenario.grid()))]
    pub async fn get_projection(
        &self,
        point: Coordinate,
        year: i32,
        scenario: Scenario,
    ) -> ClimateResult<ElementValues> {
        let range = DateRange::for_year(year).ok_or_else(|| ClimateError::InvalidParameter {
            param: "year".to_string(),
            message: format!("{} is out of range", year),
        })?;

        let body = self.fetch_cached(scenario.grid(), point, range).await?;
        decode_projection(&body, year)
    }

    /// Per-element mean over every year in `range`. Any missing year is fatal.
    #[instrument(skip(self))]
    pub async fn get_historical_average(
        &self,
        point: Coordinate,
        range: DateRange,
    ) -> ClimateResult<ElementValues> {
        let body = self.fetch_cached(HISTORICAL_GRID, point, range).await?;
        decode_historical_average(&body)
    }

    /// rcp45, rcp85 and historical values merged into one record per element
    /// present in all three, in element-list order.
    pub async fn get_results(&self, point: Coordinate, year: i32) -> ClimateResult<Vec<ProjectionRecord>> {
        let (rcp45, rcp85, historical) = tokio::try_join!(
            self.get_projection(point, year, Scenario::Rcp45),
            self.get_projection(point, year, Scenario::Rcp85),
            self.get_historical_average(point, self.historical_range),
        )?;

        let records = self
            .attributes
            .iter()
            .filter_map(|(key, attribute)| {
                let projection = GriddedProjection {
                    rcp45_mean: *rcp45.get(key)?,
                    rcp85_mean: *rcp85.get(key)?,
                    historical_average: *historical.get(key)?,
                };
                Some(ProjectionRecord::gridded(*attribute, projection))
            })
            .collect();

        Ok(records)
    }

    /// Cached body for a grid request, fetching and storing it on a miss.
    async fn fetch_cached(&self, grid: &str, point: Coordinate, range: DateRange) -> ClimateResult<String> {
        let key = GridCacheKey::new(grid, point, range, self.api.endpoint());

        if let Some(cached) = self.cache.get(&key).await? {
            counter!("grid_cache_hits_total").increment(1);
            debug!(grid, "Grid data cache hit");
            return Ok(cached.body);
        }
        counter!("grid_cache_misses_total").increment(1);

        let request = GridDataRequest::new(grid, point, range);
        let fetched = self.api.fetch(&request).await?;
        if let GridFetch::NoData(_) = fetched {
            counter!("grid_data_void_total").increment(1);
        }

        self.cache.put(&key, fetched.body()).await?;
        Ok(match fetched {
            GridFetch::Data(body) | GridFetch::NoData(body) => body,
        })
    }
}

fn ymd(year: i32, month: u32, day: u32) -> ClimateResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ClimateError::Config(format!("Invalid date {}-{}-{}", year, month, day)))
}

/// Decode a single-year projection body.
///
/// The only row must be for `year` and hold one value per element.
/// Negative values (the -999 sentinel) mean no data and are omitted.
pub fn decode_projection(body: &str, year: i32) -> ClimateResult<ElementValues> {
    let response = GridDataResponse::parse(body)?;
    if response.is_data_void() {
        return Ok(ElementValues::new());
    }

    let rows = response.rows()?;
    let row = rows
        .first()
        .ok_or_else(|| ClimateError::DataContract("Projection response has no rows".to_string()))?;
    let (year_value, values) = row
        .split_first()
        .ok_or_else(|| ClimateError::DataContract("Projection row is empty".to_string()))?;

    if parse_year(year_value) != Some(year) || values.len() != GRID_ELEMENTS.len() {
        return Err(ClimateError::DataContract(format!(
            "Unexpected year or elems: expected {} with {} values, got {} with {} values",
            year,
            GRID_ELEMENTS.len(),
            year_value,
            values.len()
        )));
    }

    let mut result = ElementValues::new();
    for (element, value) in GRID_ELEMENTS.iter().zip(values) {
        let key = element.key();
        let value = parse_number(value).ok_or_else(|| {
            ClimateError::DataContract(format!("Non-numeric value {} for {}", value, key))
        })?;
        if value < 0.0 {
            warn!(element = %key, value, year, "No projection value for element");
            continue;
        }
        result.insert(key, value);
    }

    Ok(result)
}

/// Decode a multi-year body into per-element means.
///
/// Every row must be complete; a negative reading in any year is fatal.
pub fn decode_historical_average(body: &str) -> ClimateResult<ElementValues> {
    let response = GridDataResponse::parse(body)?;
    if response.is_data_void() {
        return Ok(ElementValues::new());
    }

    let rows = response.rows()?;
    if rows.is_empty() {
        return Err(ClimateError::DataContract(
            "Historical response has no rows".to_string(),
        ));
    }

    let mut sums = vec![0.0_f64; GRID_ELEMENTS.len()];
    for row in &rows {
        let (year_value, values) = row
            .split_first()
            .ok_or_else(|| ClimateError::DataContract("Historical row is empty".to_string()))?;
        if values.len() != GRID_ELEMENTS.len() {
            return Err(ClimateError::DataContract(format!(
                "Expected {} values for {}, got {}",
                GRID_ELEMENTS.len(),
                year_value,
                values.len()
            )));
        }

        for ((sum, element), value) in sums.iter_mut().zip(GRID_ELEMENTS).zip(values) {
            match parse_number(value) {
                Some(v) if v >= 0.0 => *sum += v,
                _ => {
                    return Err(ClimateError::DataContract(format!(
                        "No data for {} for year {}",
                        element.key(),
                        year_value
                    )))
                }
            }
        }
    }

    let count = rows.len() as f64;
    Ok(GRID_ELEMENTS
        .iter()
        .zip(sums)
        .map(|(element, sum)| (element.key(), sum / count))
        .collect())
}
