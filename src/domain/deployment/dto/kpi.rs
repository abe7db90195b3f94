use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Key performance indicator watched on the deployed flow.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    #[validate(length(min = 1))]
    pub metric_id: String,
    pub component_id: Option<String>,
    pub alert: Option<KpiAlert>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KpiAlert {
    pub threshold_more_than: Option<AlertThreshold>,
    pub threshold_less_than: Option<AlertThreshold>,
    pub frequency_tolerance: Option<FrequencyTolerance>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertThreshold {
    pub unit_id: Option<String>,
    pub value: Option<f64>,
}

/// How long a KPI may stay out of bounds before an alert is raised.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FrequencyTolerance {
    pub value: Option<f64>,
    pub unit: Option<TimeUnit>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUnit {
    pub id: TimeUnitId,
    pub label: Option<String>,
    pub abbreviation: Option<String>,
}

impl TimeUnit {
    pub fn new(id: TimeUnitId) -> Self {
        Self {
            id,
            label: None,
            abbreviation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnitId {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnitId {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Seconds => "SECONDS",
            Self::Minutes => "MINUTES",
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_time_unit_is_rejected() {
        let parsed: Result<TimeUnit, _> = serde_json::from_value(json!({ "id": "WEEKS" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn kpi_round_trips_with_absent_fields_omitted() {
        let raw = json!({
            "metricId": "cpuUtilization",
            "alert": {
                "thresholdMoreThan": { "unitId": "percentage", "value": 75.0 },
                "frequencyTolerance": { "value": 2.0, "unit": { "id": "MINUTES" } }
            }
        });

        let kpi: Kpi = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&kpi).unwrap(), raw);
    }
}
