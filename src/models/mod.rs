pub mod moving_average;
pub mod sample;

pub use moving_average::{MovingAveragePoint, MOVING_AVG_FIELD, MOVING_AVG_MEASUREMENT, TICKER_TAG};
pub use sample::VolumeSample;
