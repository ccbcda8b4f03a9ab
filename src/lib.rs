pub mod analysis;
pub mod answerer;
pub mod config;
pub mod db;
pub mod fetcher;
pub mod key_points;
pub mod merger;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod ranking;
pub mod service;
pub mod store;
pub mod summarizer;
pub mod text;
pub mod tui;
pub mod utils;

pub use answerer::{Answer, AnswerComposer, DegradeReason};
pub use db::Database;
pub use models::{FetchResult, KnowledgeRecord, KnowledgeRecordBuilder, NewRecord, Quality};
pub use pipeline::Pipeline;
pub use service::KnowledgeService;
