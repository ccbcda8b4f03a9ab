//! Multi-source result merging and sentence-level deduplication.

use std::collections::HashSet;

use crate::models::FetchResult;
use crate::text::segment;

/// Default number of unique sentences kept by [`merge_information`].
pub const DEFAULT_MERGE_SENTENCE_LIMIT: usize = 15;

/// Concatenates result sets in arrival order and keeps the first result for
/// each case-insensitive title.
///
/// # Examples
///
/// ```
/// use maktaba::merger::merge;
/// use maktaba::models::FetchResult;
///
/// let a = FetchResult::new("Cairo", "first", "", "Wikipedia", None);
/// let b = FetchResult::new("cairo", "second", "", "DBpedia", None);
///
/// let merged = merge(vec![vec![a], vec![b]]);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].content, "first");
/// ```
pub fn merge(result_sets: impl IntoIterator<Item = Vec<FetchResult>>) -> Vec<FetchResult> {
    let mut seen = HashSet::new();
    result_sets
        .into_iter()
        .flatten()
        .filter(|result| seen.insert(result.title.to_lowercase()))
        .collect()
}

/// Merges the contents of several results into one text.
///
/// Returns `None` when there are no results and the lone content when there is
/// one. Otherwise the exact distinct sentences of all contents are kept in
/// first-seen order, up to `limit`, joined with `". "` and terminated with a
/// period; `None` again if no content holds a sentence.
pub fn merge_information(results: &[FetchResult], limit: usize) -> Option<String> {
    match results {
        [] => None,
        [only] => Some(only.content.clone()),
        _ => {
            let mut seen = HashSet::new();
            let sentences: Vec<&str> = results
                .iter()
                .flat_map(|result| segment(&result.content))
                .filter(|sentence| seen.insert(*sentence))
                .take(limit)
                .collect();
            if sentences.is_empty() {
                return None;
            }
            Some(format!("{}.", sentences.join(". ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, content: &str) -> FetchResult {
        FetchResult::new(title, content, "", "test", None)
    }

    #[test]
    fn merge_keeps_first_of_case_insensitive_duplicates() {
        let merged = merge(vec![
            vec![result("Cairo", "from the first source")],
            vec![result("cairo", "from the second source"), result("Giza", "giza")],
        ]);

        let titles: Vec<&str> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Cairo", "Giza"]);
        assert_eq!(merged[0].content, "from the first source");
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge(Vec::<Vec<FetchResult>>::new()).is_empty());
    }

    #[test]
    fn merge_information_none_for_no_results() {
        assert_eq!(merge_information(&[], 15), None);
    }

    #[test]
    fn merge_information_returns_single_content_verbatim() {
        let only = result("Nile", "Short text!");
        assert_eq!(merge_information(&[only], 15).as_deref(), Some("Short text!"));
    }

    #[test]
    fn merge_information_unions_sentences_in_first_seen_order() {
        let results = vec![
            result("a", "The Nile flows north to the sea. Cairo sits on its banks."),
            result("b", "Cairo sits on its banks. The delta is very fertile land."),
        ];

        assert_eq!(
            merge_information(&results, 15).as_deref(),
            Some("The Nile flows north to the sea. Cairo sits on its banks. The delta is very fertile land.")
        );
    }

    #[test]
    fn merge_information_is_case_sensitive() {
        let results = vec![
            result("a", "Cairo sits on its banks."),
            result("b", "cairo sits on its banks."),
        ];

        assert_eq!(
            merge_information(&results, 15).as_deref(),
            Some("Cairo sits on its banks. cairo sits on its banks.")
        );
    }

    #[test]
    fn merge_information_caps_sentences() {
        let content = (1..=20)
            .map(|i| format!("Unique sentence number {i} is here"))
            .collect::<Vec<_>>()
            .join(". ");
        let results = vec![result("a", &content), result("b", "")];

        let merged = merge_information(&results, 15).unwrap();
        assert_eq!(segment(&merged).count(), 15);
        assert!(merged.ends_with("number 15 is here."));
    }

    #[test]
    fn merge_information_none_when_no_sentence_survives() {
        let results = vec![result("a", "Too short. Tiny!"), result("b", "Also brief?")];
        assert_eq!(merge_information(&results, 15), None);
    }
}
