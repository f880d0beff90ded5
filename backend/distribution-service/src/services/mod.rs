pub mod composer;
pub mod eligibility;
pub mod feed;
pub mod scoring;

pub use feed::FeedAssembler;
