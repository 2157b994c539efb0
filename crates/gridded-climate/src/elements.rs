//! The fixed list of requested climate elements and their public names.
//!
//! Cached responses are positional: column N of every cached row is element
//! N of this list. The cache key does not encode the list, so any change
//! here (order, reductions, units) requires truncating `acis_responses`.

use serde::Serialize;

use climate_common::{ClimateError, ClimateResult, GriddedAttribute};

/// One requested element: variable name plus interval/duration/reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridElement {
    pub name: &'static str,
    pub interval: &'static str,
    pub duration: &'static str,
    pub reduce: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<&'static str>,
}

impl GridElement {
    const fn yearly(name: &'static str, reduce: &'static str) -> Self {
        Self {
            name,
            interval: "yly",
            duration: "yly",
            reduce,
            units: None,
        }
    }

    const fn with_units(mut self, units: &'static str) -> Self {
        self.units = Some(units);
        self
    }

    /// Stable element key, `name:reduce`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.name, self.reduce)
    }
}

/// Elements requested for every grid, in response column order.
pub const GRID_ELEMENTS: &[GridElement] = &[
    GridElement::yearly("maxt", "cnt_gt_100"),
    GridElement::yearly("maxt", "cnt_gt_90"),
    GridElement::yearly("avgt", "mean"),
    GridElement::yearly("mint", "cnt_lt_32"),
    GridElement::yearly("pcpn", "cnt_lt_0.01"),
    GridElement::yearly("pcpn", "sum").with_units("inch"),
];

/// Element key to public attribute name.
const ELEMENT_ATTRIBUTES: &[(&str, GriddedAttribute)] = &[
    ("maxt:cnt_gt_100", GriddedAttribute::TempNumDaysAbove100f),
    ("maxt:cnt_gt_90", GriddedAttribute::TempNumDaysAbove90f),
    ("avgt:mean", GriddedAttribute::TempAvg),
    ("mint:cnt_lt_32", GriddedAttribute::TempNumDaysBelow32f),
    ("pcpn:cnt_lt_0.01", GriddedAttribute::PrecipitationNumDryDays),
    ("pcpn:sum", GriddedAttribute::PrecipitationTotal),
];

/// Public attribute for an element key.
pub fn attribute_for(key: &str) -> Option<GriddedAttribute> {
    ELEMENT_ATTRIBUTES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, attribute)| *attribute)
}

/// Resolve every requested element to its public attribute, in request order.
///
/// Fails if any element has no mapping. Called once at startup.
pub fn element_attributes() -> ClimateResult<Vec<(String, GriddedAttribute)>> {
    GRID_ELEMENTS
        .iter()
        .map(|element| {
            let key = element.key();
            attribute_for(&key)
                .map(|attribute| (key.clone(), attribute))
                .ok_or_else(|| {
                    ClimateError::Config(format!("No attribute mapping for grid element '{}'", key))
                })
        })
        .collect()
}

/// Check that every requested element has a public attribute name.
pub fn validate_element_mappings() -> ClimateResult<()> {
    element_attributes().map(|_| ())
}
