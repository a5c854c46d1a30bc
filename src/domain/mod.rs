// Domain layer - Plain data shared by every other layer
pub mod equipment;
pub mod error;
pub mod hierarchy;
pub mod plant;
pub mod signal;
pub mod time_series;
