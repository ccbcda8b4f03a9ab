/// Candidates with this many characters or fewer are treated as fragments.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Splits text into candidate sentences.
///
/// Splits on runs of `.`, `!` and `?`, trims each piece and drops pieces of
/// [`MIN_SENTENCE_CHARS`] characters or fewer. The iterator is lazy and yields
/// sentences in document order.
///
/// # Examples
///
/// ```
/// use maktaba::text::segment;
///
/// let text = "Cairo is the capital of Egypt. Yes! It lies on the banks of the Nile river?!";
/// let sentences: Vec<&str> = segment(text).collect();
/// assert_eq!(
///     sentences,
///     vec!["Cairo is the capital of Egypt", "It lies on the banks of the Nile river"]
/// );
/// ```
pub fn segment(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|candidate| candidate.chars().count() > MIN_SENTENCE_CHARS)
}
