//! # Caption Tokenizer and Vocabulary Suggestions
//!
//! Captions are comma-separated tag lists. This module finds the token under
//! the cursor, matches its prefix against the merged vocabulary, and rewrites
//! the caption when a suggestion is committed.
//!
//! All offsets are byte offsets into the caption string; a cursor that lands
//! inside a multi-byte character is floored to the previous boundary.

/// Maximum number of suggestions shown at once.
pub const SUGGESTION_LIMIT: usize = 12;

/// The caption token under edit.
///
/// `start..end` spans the whole comma-delimited segment containing the
/// cursor (untrimmed); `prefix` is the trimmed text between the segment
/// start and the cursor, which is what suggestions match against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub prefix: String,
}

/// Identify the token under edit: text since the last comma before the
/// cursor, extending to the next comma or end of string.
pub fn token_at(text: &str, cursor: usize) -> TokenSpan {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let start = text[..cursor].rfind(',').map(|i| i + 1).unwrap_or(0);
    let end = text[cursor..]
        .find(',')
        .map(|i| cursor + i)
        .unwrap_or(text.len());
    TokenSpan {
        start,
        end,
        prefix: text[start..cursor].trim().to_string(),
    }
}

/// Split a caption into its non-empty trimmed tokens.
pub fn split_tokens(caption: &str) -> Vec<&str> {
    caption
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Replace the token at `cursor` with `word`.
///
/// Empty tokens produced by stray commas are dropped, the remaining tokens
/// are rejoined with `", "`, and the returned cursor sits immediately after
/// the replaced token. Applying the same word again is a no-op rewrite
/// (idempotent once the token already equals `word`).
pub fn apply_suggestion(text: &str, cursor: usize, word: &str) -> (String, usize) {
    let span = token_at(text, cursor);
    let mut tokens: Vec<&str> = Vec::new();
    let mut replaced_index = 0;

    let mut offset = 0;
    for segment in text.split(',') {
        let seg_start = offset;
        offset += segment.len() + 1;
        if seg_start == span.start {
            replaced_index = tokens.len();
            tokens.push(word);
        } else {
            let trimmed = segment.trim();
            if !trimmed.is_empty() {
                tokens.push(trimmed);
            }
        }
    }
    // `span.start` is always a segment start, so the loop pushed `word`.
    debug_assert!(!tokens.is_empty());

    let rebuilt = tokens.join(", ");
    let new_cursor = tokens[..=replaced_index].join(", ").len();
    (rebuilt, new_cursor)
}

/// Caption vocabulary: the global word set merged with the per-dataset set.
///
/// Merged iteration order is global first, then dataset-local entries not
/// already present (first-seen dedupe); suggestion ranking preserves that
/// order among ties.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    global: Vec<String>,
    dataset: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global(&mut self, words: Vec<String>) {
        self.global = words;
    }

    pub fn set_dataset(&mut self, words: Vec<String>) {
        self.dataset = words;
    }

    pub fn clear_dataset(&mut self) {
        self.dataset.clear();
    }

    /// Union of both sets, first-seen order.
    pub fn merged(&self) -> Vec<&str> {
        let mut words: Vec<&str> = Vec::with_capacity(self.global.len() + self.dataset.len());
        for word in self.global.iter().chain(self.dataset.iter()) {
            if !words.contains(&word.as_str()) {
                words.push(word);
            }
        }
        words
    }

    /// Vocabulary entries whose lower-cased form starts with `prefix`
    /// (case-insensitive), capped at [`SUGGESTION_LIMIT`]. An empty prefix
    /// yields nothing so the suggestion panel stays suppressed.
    pub fn suggest(&self, prefix: &str) -> Vec<String> {
        let needle = prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.merged()
            .into_iter()
            .filter(|word| word.to_lowercase().starts_with(&needle))
            .take(SUGGESTION_LIMIT)
            .map(str::to_string)
            .collect()
    }
}

/// Keys the suggestion panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestKey {
    Down,
    Up,
    Enter,
    Tab,
    Escape,
}

/// What a key press did, and whether the caller should suppress the field's
/// default behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Key not handled; default field behavior applies.
    Ignored,
    /// Active suggestion moved to this index.
    CycledTo(usize),
    /// The active suggestion was committed; apply it to the caption.
    Commit(String),
    /// The list was cleared without altering the caption.
    Dismissed,
}

/// Suggestion panel state: the current entries and the active index.
#[derive(Debug, Default)]
pub struct SuggestionList {
    items: Vec<String>,
    active: Option<usize>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries; the active selection resets.
    pub fn update(&mut self, items: Vec<String>) {
        self.items = items;
        self.active = None;
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Down/Up cycle circularly; Enter/Tab commit the active entry; Escape
    /// clears the list. With no entries every key is ignored.
    pub fn handle_key(&mut self, key: SuggestKey) -> KeyOutcome {
        if self.items.is_empty() {
            return KeyOutcome::Ignored;
        }
        let len = self.items.len();
        match key {
            SuggestKey::Down => {
                let next = self.active.map(|i| (i + 1) % len).unwrap_or(0);
                self.active = Some(next);
                KeyOutcome::CycledTo(next)
            }
            SuggestKey::Up => {
                let next = self.active.map(|i| (i + len - 1) % len).unwrap_or(len - 1);
                self.active = Some(next);
                KeyOutcome::CycledTo(next)
            }
            SuggestKey::Enter | SuggestKey::Tab => match self.active {
                Some(index) => {
                    let word = self.items[index].clone();
                    self.items.clear();
                    self.active = None;
                    KeyOutcome::Commit(word)
                }
                None => KeyOutcome::Ignored,
            },
            SuggestKey::Escape => {
                self.items.clear();
                self.active = None;
                KeyOutcome::Dismissed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(global: &[&str], dataset: &[&str]) -> Vocabulary {
        let mut v = Vocabulary::new();
        v.set_global(global.iter().map(|s| s.to_string()).collect());
        v.set_dataset(dataset.iter().map(|s| s.to_string()).collect());
        v
    }

    #[test]
    fn token_at_finds_trailing_token() {
        let caption = "cat, dog, bi";
        let span = token_at(caption, caption.len());
        assert_eq!(span.prefix, "bi");
        assert_eq!(span.start, 9);
        assert_eq!(span.end, caption.len());
    }

    #[test]
    fn token_at_mid_caption_spans_to_next_comma() {
        let span = token_at("cat, dog, bird", 6);
        assert_eq!(span.prefix, "d");
        assert_eq!((span.start, span.end), (4, 8));
    }

    #[test]
    fn token_at_clamps_cursor_past_end() {
        let span = token_at("cat", 99);
        assert_eq!(span.prefix, "cat");
    }

    #[test]
    fn suggestions_match_prefix_case_insensitively_in_order() {
        let v = vocab(&["Bird", "bicycle", "cat", "big sky"], &["bison"]);
        assert_eq!(
            v.suggest("bi"),
            vec!["Bird", "bicycle", "big sky", "bison"]
        );
    }

    #[test]
    fn empty_prefix_suppresses_suggestions() {
        let v = vocab(&["cat"], &[]);
        assert!(v.suggest("").is_empty());
        assert!(v.suggest("   ").is_empty());
    }

    #[test]
    fn suggestions_are_capped() {
        let words: Vec<String> = (0..30).map(|i| format!("tag{i:02}")).collect();
        let mut v = Vocabulary::new();
        v.set_global(words);
        assert_eq!(v.suggest("tag").len(), SUGGESTION_LIMIT);
    }

    #[test]
    fn merged_dedupes_across_sets() {
        let v = vocab(&["cat", "dog"], &["dog", "bird"]);
        assert_eq!(v.merged(), vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn apply_suggestion_replaces_trailing_token() {
        let caption = "cat, dog, bi";
        let (text, cursor) = apply_suggestion(caption, caption.len(), "bird");
        assert_eq!(text, "cat, dog, bird");
        assert_eq!(cursor, 14);
    }

    #[test]
    fn apply_suggestion_is_idempotent() {
        let (text, cursor) = apply_suggestion("cat, dog, bi", 12, "bird");
        let (again, cursor_again) = apply_suggestion(&text, cursor, "bird");
        assert_eq!(again, text);
        assert_eq!(cursor_again, cursor);
    }

    #[test]
    fn apply_suggestion_drops_stray_empty_tokens() {
        let (text, cursor) = apply_suggestion("cat,, do, ,dog", 8, "door");
        assert_eq!(text, "cat, door, dog");
        assert_eq!(cursor, "cat, door".len());
    }

    #[test]
    fn apply_suggestion_on_empty_caption() {
        let (text, cursor) = apply_suggestion("", 0, "cat");
        assert_eq!(text, "cat");
        assert_eq!(cursor, 3);
    }

    #[test]
    fn keys_cycle_circularly() {
        let mut list = SuggestionList::new();
        list.update(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(list.handle_key(SuggestKey::Down), KeyOutcome::CycledTo(0));
        assert_eq!(list.handle_key(SuggestKey::Down), KeyOutcome::CycledTo(1));
        assert_eq!(list.handle_key(SuggestKey::Down), KeyOutcome::CycledTo(2));
        assert_eq!(list.handle_key(SuggestKey::Down), KeyOutcome::CycledTo(0));
        assert_eq!(list.handle_key(SuggestKey::Up), KeyOutcome::CycledTo(2));
    }

    #[test]
    fn enter_commits_only_with_active_entry() {
        let mut list = SuggestionList::new();
        list.update(vec!["bird".into()]);
        assert_eq!(list.handle_key(SuggestKey::Enter), KeyOutcome::Ignored);
        list.handle_key(SuggestKey::Down);
        assert_eq!(
            list.handle_key(SuggestKey::Tab),
            KeyOutcome::Commit("bird".into())
        );
        assert!(list.is_empty());
    }

    #[test]
    fn escape_dismisses_without_commit() {
        let mut list = SuggestionList::new();
        list.update(vec!["bird".into()]);
        assert_eq!(list.handle_key(SuggestKey::Escape), KeyOutcome::Dismissed);
        assert!(list.is_empty());
        assert_eq!(list.handle_key(SuggestKey::Escape), KeyOutcome::Ignored);
    }
}
