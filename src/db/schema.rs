/// Complete database schema for the knowledge store.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Timestamps are Unix milliseconds.
pub const INITIAL_SCHEMA: &str = r#"
-- Knowledge table: one row per stored fetch result
CREATE TABLE IF NOT EXISTS knowledge (
    id INTEGER PRIMARY KEY,
    query TEXT NOT NULL,
    original_text TEXT NOT NULL,
    summary TEXT NOT NULL,
    source TEXT NOT NULL,
    url TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    quality TEXT NOT NULL DEFAULT 'medium' CHECK (quality IN ('high', 'medium', 'low'))
);

-- History table: one row per answered question
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY,
    query TEXT NOT NULL,
    results_count INTEGER NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_knowledge_query ON knowledge(query);
CREATE INDEX IF NOT EXISTS idx_knowledge_timestamp ON knowledge(timestamp);
CREATE INDEX IF NOT EXISTS idx_knowledge_source ON knowledge(source);
CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);
"#;
