pub mod analysis;
pub mod content_filter;
pub mod image_fetcher;
pub mod media;
pub mod prompt;
pub mod providers;

pub use analysis::Analyzer;
pub use content_filter::BannedTermList;
pub use image_fetcher::ImageFetcher;
