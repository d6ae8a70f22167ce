pub mod personalization;
pub mod resume;
