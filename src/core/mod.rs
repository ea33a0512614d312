pub mod batch;
pub mod caption;
pub mod fetch;
pub mod media;
pub mod recognize;
