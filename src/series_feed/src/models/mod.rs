pub mod correlation;
pub mod entity;
pub mod envelope;
pub mod period;
pub mod point;

pub use correlation::{CorrelationResult, Strength};
pub use entity::{Entity, EntityError, EntityId};
pub use envelope::{ApiEnvelope, SourceTag};
pub use period::{Period, PeriodError};
pub use point::{ActivityPoint, AirQualityPoint, PricePoint, SeriesPoint};
