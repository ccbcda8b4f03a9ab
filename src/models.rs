mod fetch_result;
mod history;
mod ids;
mod quality;
mod record;

pub use fetch_result::FetchResult;
pub use history::HistoryEntry;
pub use ids::RecordId;
pub use quality::Quality;
pub use record::{KnowledgeRecord, KnowledgeRecordBuilder, NewRecord};
