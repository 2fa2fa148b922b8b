use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meteorological variable reported in a monthly SMN station report.
///
/// Each variant owns exactly one section label, the heading line that opens
/// its block of yearly records inside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TopicKey {
    #[serde(rename = "pmax24")]
    MaxRainfall24h,
    #[serde(rename = "p")]
    TotalRainfall,
    #[serde(rename = "evo")]
    Evaporation,
    #[serde(rename = "tmax_x")]
    ExtremeMaxTemperature,
    #[serde(rename = "tmax_mean")]
    MeanMaxTemperature,
    #[serde(rename = "tmin_x")]
    ExtremeMinTemperature,
    #[serde(rename = "tmin_mean")]
    MeanMinTemperature,
    #[serde(rename = "t")]
    MeanTemperature,
}

impl TopicKey {
    /// All topics in report order.
    pub const ALL: [TopicKey; 8] = [
        TopicKey::MaxRainfall24h,
        TopicKey::TotalRainfall,
        TopicKey::Evaporation,
        TopicKey::ExtremeMaxTemperature,
        TopicKey::MeanMaxTemperature,
        TopicKey::ExtremeMinTemperature,
        TopicKey::MeanMinTemperature,
        TopicKey::MeanTemperature,
    ];

    /// Short key used in the store and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKey::MaxRainfall24h => "pmax24",
            TopicKey::TotalRainfall => "p",
            TopicKey::Evaporation => "evo",
            TopicKey::ExtremeMaxTemperature => "tmax_x",
            TopicKey::MeanMaxTemperature => "tmax_mean",
            TopicKey::ExtremeMinTemperature => "tmin_x",
            TopicKey::MeanMinTemperature => "tmin_mean",
            TopicKey::MeanTemperature => "t",
        }
    }

    /// Section label as printed in the report.
    pub fn label(&self) -> &'static str {
        match self {
            TopicKey::MaxRainfall24h => "LLUVIA MÁXIMA 24H",
            TopicKey::TotalRainfall => "LLUVIA TOTAL MENSUAL",
            TopicKey::Evaporation => "EVAPORACIÓN MENSUAL",
            TopicKey::ExtremeMaxTemperature => "TEMPERATURA MÁXIMA EXTREMA",
            TopicKey::MeanMaxTemperature => "TEMPERATURA MÁXIMA PROMEDIO",
            TopicKey::ExtremeMinTemperature => "TEMPERATURA MÍNIMA EXTREMA",
            TopicKey::MeanMinTemperature => "TEMPERATURA MÍNIMA PROMEDIO",
            TopicKey::MeanTemperature => "TEMPERATURA MEDIA MENSUAL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TopicKey::MaxRainfall24h => "Maximum 24-hour rainfall (mm)",
            TopicKey::TotalRainfall => "Total monthly rainfall (mm)",
            TopicKey::Evaporation => "Monthly evaporation (mm)",
            TopicKey::ExtremeMaxTemperature => "Extreme maximum temperature (°C)",
            TopicKey::MeanMaxTemperature => "Mean maximum temperature (°C)",
            TopicKey::ExtremeMinTemperature => "Extreme minimum temperature (°C)",
            TopicKey::MeanMinTemperature => "Mean minimum temperature (°C)",
            TopicKey::MeanTemperature => "Mean monthly temperature (°C)",
        }
    }

    /// Topic whose section label is exactly `label`.
    pub fn from_label(label: &str) -> Option<TopicKey> {
        Self::ALL.iter().copied().find(|topic| topic.label() == label)
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| format!("Unknown topic key: {}", s))
    }
}
