//! Plausible stand-in series for when the live API is unavailable.
//!
//! Activity-style metrics (commits, stars, AQI, ...) combine a weekday/weekend
//! multiplier, a weekly sinusoidal trend and multiplicative noise around a fixed
//! base magnitude. Price-style metrics follow a bounded random walk around a
//! per-asset base price, with volume and market cap as fixed multiples of price.
//!
//! Output always has exactly `period.points()` points, one per calendar day, oldest
//! first, ending at the `end` date the caller passes (normally today).
//! Pass a seed to get reproducible series.

use std::f64::consts::TAU;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::models::{ActivityPoint, AirQualityPoint, EntityId, Period, PricePoint};

const WEEKEND_FACTOR: f64 = 0.6;
const TREND_AMPLITUDE: f64 = 0.2;
const TREND_PERIOD_DAYS: f64 = 7.0;
const NOISE: (f64, f64) = (0.8, 1.2);
/// Largest relative move of the price walk in one day.
const MAX_DAILY_MOVE: f64 = 0.05;
const PRICE_BAND: (f64, f64) = (0.7, 1.3);

const BASE_COMMITS: f64 = 45.0;
const BASE_STARS: f64 = 120.0;
const BASE_FORKS: f64 = 18.0;

struct AssetProfile {
    base_price: f64,
    /// Market cap = price × circulating supply.
    supply: f64,
    /// Volume = price × units traded per day.
    daily_units: f64,
}

fn asset_profile(coin: &EntityId) -> AssetProfile {
    let (base_price, supply, daily_units) = match coin.as_str() {
        "bitcoin" | "btc" => (43_000.0, 19_600_000.0, 600_000.0),
        "ethereum" | "eth" => (2_600.0, 120_000_000.0, 5_000_000.0),
        "solana" | "sol" => (100.0, 440_000_000.0, 20_000_000.0),
        "cardano" | "ada" => (0.5, 35_000_000_000.0, 600_000_000.0),
        "dogecoin" | "doge" => (0.08, 143_000_000_000.0, 8_000_000_000.0),
        _ => (100.0, 10_000_000.0, 1_000_000.0),
    };
    AssetProfile {
        base_price,
        supply,
        daily_units,
    }
}

/// Typical AQI for a city; unknown cities get a middling value.
fn base_aqi(city: &EntityId) -> f64 {
    match city.as_str() {
        "delhi" => 180.0,
        "beijing" => 150.0,
        "mumbai" => 110.0,
        "bangalore" => 90.0,
        "shanghai" => 95.0,
        "london" => 45.0,
        "san-francisco" | "san_francisco" | "sanfrancisco" => 40.0,
        _ => 80.0,
    }
}

pub struct SyntheticSeriesGenerator {
    rng: StdRng,
}

impl SyntheticSeriesGenerator {
    /// A generator seeded from the OS; two calls with the same inputs differ.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    pub fn activity(&mut self, period: Period, end: NaiveDate) -> Vec<ActivityPoint> {
        days(period, end)
            .map(|(i, date)| {
                let shape = activity_shape(i, date);
                ActivityPoint {
                    date,
                    commits: self.count(BASE_COMMITS * shape),
                    stars: self.count(BASE_STARS * shape),
                    forks: self.count(BASE_FORKS * shape),
                }
            })
            .collect()
    }

    pub fn air_quality(
        &mut self,
        city: &EntityId,
        period: Period,
        end: NaiveDate,
    ) -> Vec<AirQualityPoint> {
        let base = base_aqi(city);
        days(period, end)
            .map(|(i, date)| {
                let shape = activity_shape(i, date);
                let aqi = (base * shape * self.noise()).clamp(0.0, 500.0);
                AirQualityPoint {
                    date,
                    aqi: round1(aqi),
                    pm25: round1(base * 0.45 * shape * self.noise()),
                    pm10: round1(base * 0.8 * shape * self.noise()),
                }
            })
            .collect()
    }

    pub fn prices(&mut self, coin: &EntityId, period: Period, end: NaiveDate) -> Vec<PricePoint> {
        let profile = asset_profile(coin);
        let lo = profile.base_price * PRICE_BAND.0;
        let hi = profile.base_price * PRICE_BAND.1;
        let mut price = profile.base_price * self.rng.random_range(0.95..=1.05);

        days(period, end)
            .map(|(_, date)| {
                let step = self.rng.random_range(-MAX_DAILY_MOVE..=MAX_DAILY_MOVE);
                price = (price * (1.0 + step)).clamp(lo, hi);
                PricePoint {
                    date,
                    price,
                    volume: price * profile.daily_units,
                    market_cap: price * profile.supply,
                }
            })
            .collect()
    }

    fn noise(&mut self) -> f64 {
        self.rng.random_range(NOISE.0..=NOISE.1)
    }

    fn count(&mut self, expected: f64) -> u32 {
        (expected * self.noise()).round().max(0.0) as u32
    }
}

/// `(index, date)` for each day of the window, oldest first, last one `end`.
fn days(period: Period, end: NaiveDate) -> impl Iterator<Item = (usize, NaiveDate)> {
    let n = period.points();
    (0..n).map(move |i| (i, end - Duration::days((n - 1 - i) as i64)))
}

fn activity_shape(i: usize, date: NaiveDate) -> f64 {
    let weekday = match date.weekday() {
        Weekday::Sat | Weekday::Sun => WEEKEND_FACTOR,
        _ => 1.0,
    };
    let trend = 1.0 + TREND_AMPLITUDE * (TAU * i as f64 / TREND_PERIOD_DAYS).sin();
    weekday * trend
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
