//! Left outer join of country polygons against per-country aggregates.

use crate::aggregator::CountryAggregate;
use crate::records::CountryPolygon;
use atlas_common::{CountryCode, JoinKeyNormalization};
use geo::Geometry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Non-fatal conditions reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// More than one aggregate matched a polygon; the first was used.
    JoinAmbiguity {
        /// Polygon code
        country_code: CountryCode,
        /// Number of matching aggregates
        matches: usize,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JoinAmbiguity {
                country_code,
                matches,
            } => write!(
                f,
                "code {country_code} matched {matches} aggregate rows; the first one was used"
            ),
        }
    }
}

/// A polygon with its joined value.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    /// Polygon code
    pub country_code: CountryCode,
    /// Polygon geometry
    pub geometry: Geometry<f64>,
    /// Joined value; 0.0 when unmatched or when the match has no value
    pub value: f64,
    /// Whether any aggregate matched
    pub matched: bool,
    /// Polygon attributes
    pub attributes: Map<String, Value>,
}

/// Joined features plus the warnings raised while joining.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// One feature per input polygon, in polygon order
    pub features: Vec<JoinedFeature>,
    /// Ambiguous matches
    pub warnings: Vec<PipelineWarning>,
}

/// Joins polygons to aggregates by country code.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJoiner {
    normalization: JoinKeyNormalization,
}

impl GeoJoiner {
    /// Creates a joiner comparing keys under `normalization`.
    pub fn new(normalization: JoinKeyNormalization) -> Self {
        Self { normalization }
    }

    /// Every polygon is kept; unmatched polygons get 0.0.
    pub fn join(&self, polygons: &[CountryPolygon], aggregates: &[CountryAggregate]) -> JoinOutcome {
        // key -> (first matching index, match count)
        let mut index: HashMap<CountryCode, (usize, usize)> = HashMap::with_capacity(aggregates.len());
        for (position, aggregate) in aggregates.iter().enumerate() {
            index
                .entry(self.normalization.key(&aggregate.country_code))
                .and_modify(|(_, count)| *count += 1)
                .or_insert((position, 1));
        }

        let mut warnings = Vec::new();
        let features: Vec<JoinedFeature> = polygons
            .iter()
            .map(|polygon| {
                let found = index.get(&self.normalization.key(&polygon.country_code));
                if let Some(&(_, matches)) = found.filter(|(_, count)| *count > 1) {
                    warn!(code = %polygon.country_code, matches, "Ambiguous join, using first match");
                    warnings.push(PipelineWarning::JoinAmbiguity {
                        country_code: polygon.country_code.clone(),
                        matches,
                    });
                }

                JoinedFeature {
                    country_code: polygon.country_code.clone(),
                    geometry: polygon.geometry.clone(),
                    value: found
                        .and_then(|&(first, _)| aggregates[first].total_cases_latest)
                        .unwrap_or(0.0),
                    matched: found.is_some(),
                    attributes: polygon.attributes.clone(),
                }
            })
            .collect();

        debug!(
            features = features.len(),
            matched = features.iter().filter(|feature| feature.matched).count(),
            "Joined polygons to aggregates"
        );
        JoinOutcome { features, warnings }
    }
}
