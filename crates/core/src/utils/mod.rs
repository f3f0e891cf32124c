pub mod math;
pub mod time_utils;
