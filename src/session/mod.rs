pub mod autoplay;
pub mod import;
pub mod quiz;
pub mod result;
pub mod study;
