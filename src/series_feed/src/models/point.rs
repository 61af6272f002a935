//! Canonical in-memory representation of one day of a time series.
//!
//! Every resource that returns a series (GitHub activity, air quality, crypto
//! price) has its own point type, but all of them implement [`SeriesPoint`] so
//! the [`CorrelationEngine`](crate::correlation::CorrelationEngine) can align
//! and compare them by date and metric name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated record of one or more named numeric metrics.
pub trait SeriesPoint {
    /// The calendar day this point describes.
    fn date(&self) -> NaiveDate;

    /// Looks up a metric by its wire name (e.g. `"commits"`, `"marketCap"`).
    ///
    /// Returns `None` for names this point type does not carry.
    fn metric(&self, name: &str) -> Option<f64>;
}

/// Developer activity for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    /// Commits pushed that day.
    pub commits: u32,
    /// New stars received that day.
    pub stars: u32,
    /// Not every upstream reports forks.
    #[serde(default)]
    pub forks: u32,
}

impl SeriesPoint for ActivityPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "commits" => Some(f64::from(self.commits)),
            "stars" => Some(f64::from(self.stars)),
            "forks" => Some(f64::from(self.forks)),
            _ => None,
        }
    }
}

/// Air quality readings for one city and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityPoint {
    pub date: NaiveDate,
    /// Air quality index (0-500).
    pub aqi: f64,
    /// Fine particulate matter, µg/m³.
    pub pm25: f64,
    /// Coarse particulate matter, µg/m³.
    pub pm10: f64,
}

impl SeriesPoint for AirQualityPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "aqi" => Some(self.aqi),
            "pm25" => Some(self.pm25),
            "pm10" => Some(self.pm10),
            _ => None,
        }
    }
}

/// Daily market data for one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Closing price in USD.
    pub price: f64,
    /// Traded volume in USD.
    pub volume: f64,
    /// Market capitalization in USD.
    pub market_cap: f64,
}

impl SeriesPoint for PricePoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "price" => Some(self.price),
            "volume" => Some(self.volume),
            "marketCap" | "market_cap" => Some(self.market_cap),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_point_uses_camel_case_on_the_wire() {
        let p: PricePoint = serde_json::from_str(
            r#"{"date":"2025-03-01","price":101.5,"volume":2000.0,"marketCap":9.5e9}"#,
        )
        .unwrap();
        assert_eq!(p.metric("marketCap"), Some(9.5e9));
        assert_eq!(p.metric("market_cap"), Some(9.5e9));
        assert_eq!(p.metric("aqi"), None);
    }

    #[test]
    fn activity_point_defaults_missing_forks() {
        let p: ActivityPoint =
            serde_json::from_str(r#"{"date":"2025-03-01","commits":12,"stars":40}"#).unwrap();
        assert_eq!(p.forks, 0);
        assert_eq!(p.metric("commits"), Some(12.0));
        assert_eq!(p.date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
