//! Behavioral properties of the text pipeline, exercised through the public API.

use maktaba::merger::merge;
use maktaba::models::{FetchResult, KnowledgeRecord, KnowledgeRecordBuilder, Quality, RecordId};
use maktaba::ranking::recency_bonus;
use maktaba::text::{MIN_SENTENCE_CHARS, segment};
use maktaba::{Answer, Pipeline};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2024-03-10 12:00 UTC);

const EGYPT: &str = "Egypt is a country in North Africa. \
                     Its population is over 100 million people. \
                     The Nile is the main river flowing through it. \
                     Cairo is the capital and the largest city of Egypt.";

fn pipeline() -> Pipeline {
    Pipeline::bundled().expect("bundled pipeline")
}

fn record(id: i64, query: &str, text: &str, age_days: i64, quality: Quality) -> KnowledgeRecord {
    KnowledgeRecordBuilder::new()
        .id(RecordId::new(id))
        .query(query)
        .original_text(text)
        .summary(text)
        .timestamp(NOW - Duration::days(age_days))
        .quality(quality)
        .build()
}

#[test]
fn clean_is_idempotent() {
    let pipeline = pipeline();
    let samples = [
        "",
        "  Wow!!!   Really ()  ",
        "a\r\n\r\n\r\n\r\nb\t\tc",
        "([ ]) nested (( )) brackets?? yes..",
        "Line one   \n\n\n\n  Line two\u{7}\u{200b} end",
        "مرحبا!!!   بالعالم  ()",
    ];
    for sample in samples {
        let once = pipeline.normalizer.clean(sample);
        assert_eq!(pipeline.normalizer.clean(&once), once, "input: {sample:?}");
    }
}

#[test]
fn segment_never_yields_short_fragments() {
    let text = "Hi. Ok! This sentence is long enough to keep. No? \
                Another sufficiently long sentence follows here!";
    let sentences: Vec<&str> = segment(text).collect();
    assert_eq!(sentences.len(), 2);
    assert!(sentences.iter().all(|s| s.chars().count() > MIN_SENTENCE_CHARS));
}

#[test]
fn segment_of_all_short_input_is_empty() {
    assert_eq!(segment("Yes. No. Maybe so. Why not?").count(), 0);
}

#[test]
fn summarize_returns_short_text_unchanged() {
    let pipeline = pipeline();
    let text = "The first sentence is long enough. The second one is long as well.";
    assert_eq!(pipeline.summarizer.summarize(text, 2), text);
    assert_eq!(pipeline.summarizer.summarize(text, 5), text);
}

#[test]
fn summary_keeps_document_order() {
    let pipeline = pipeline();
    let sentences = [
        "Plain opening words without any weight at all",
        "The river is the main source of water for farms",
        "Filler sentence that carries nothing of note here",
        "In 1970 the important high dam was completed upstream",
    ];
    let text = format!("{}.", sentences.join(". "));

    let summary = pipeline.summarizer.summarize(&text, 2);
    let positions: Vec<usize> = segment(&summary)
        .map(|s| sentences.iter().position(|orig| *orig == s).unwrap())
        .collect();

    assert_eq!(positions.len(), 2);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn ranking_is_bounded_and_strictly_positive() {
    let pipeline = pipeline();
    let records: Vec<KnowledgeRecord> = (0..12)
        .map(|i| record(i, "nile", "The nile flows north", i * 3, Quality::Medium))
        .chain([record(99, "sahara", "Sand dunes", 400, Quality::Low)])
        .collect();

    let ranked = pipeline.ranker.rank_at("nile delta", &records, NOW);
    assert!(ranked.len() <= 5);
    assert!(ranked.iter().all(|r| r.score > 0.0));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn ranking_nothing_is_empty() {
    assert!(pipeline().ranker.rank_at("anything", &[], NOW).is_empty());
}

#[test]
fn recency_bonus_decreases_and_floors_at_zero() {
    let bonuses: Vec<f64> = [0, 1, 5, 10, 11, 365]
        .iter()
        .map(|days| recency_bonus(NOW - Duration::days(*days), NOW))
        .collect();

    assert_eq!(bonuses[0], 10.0);
    assert!(bonuses.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(bonuses[4], 0.0);
    assert_eq!(bonuses[5], 0.0);
}

#[test]
fn high_quality_breaks_ties() {
    let pipeline = pipeline();
    let records = vec![
        record(1, "nile", "nile", 30, Quality::Medium),
        record(2, "nile", "nile", 30, Quality::High),
    ];
    let ranked = pipeline.ranker.rank_at("nile", &records, NOW);
    assert_eq!(ranked[0].record.id, RecordId::new(2));
    assert_eq!(ranked[0].score - ranked[1].score, 5.0);
}

#[test]
fn key_points_fall_back_to_three_sentence_summary() {
    let pipeline = pipeline();
    let text = "Quiet streets wind between the old houses. \
                Children play football in the evening light. \
                Vendors sell bread from wooden carts nearby. \
                Cats sleep on warm walls through the afternoon.";

    let points = pipeline.key_points.extract_key_points(text);
    assert_eq!(points, vec![pipeline.summarizer.summarize(text, 3)]);
}

#[test]
fn merge_keeps_first_case_insensitive_title() {
    let merged = merge(vec![
        vec![FetchResult::new("Cairo", "first", "", "Wikipedia", None)],
        vec![FetchResult::new("cairo", "second", "", "DBpedia", None)],
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].title, "Cairo");
    assert_eq!(merged[0].content, "first");
}

#[test]
fn egypt_answer_has_summary_and_numbered_key_points() {
    let answer = pipeline().composer.generate_answer("Egypt", EGYPT);

    let Answer::Full(text) = answer else {
        panic!("expected a full answer, got {answer:?}");
    };
    assert!(text.starts_with("**Summary:**\n\n"));
    let (_, points) = text.split_once("**Key Points:**\n\n").unwrap();
    assert!(points.starts_with("1. "));
    assert!(points.contains("\n2. "));
}

#[test]
fn empty_context_degrades_to_empty_answer() {
    let answer = pipeline().composer.generate_answer("Egypt", "");
    assert!(answer.is_degraded());
    assert!(answer.is_empty());
}
