use crate::models::{SpellSuggestions, SymptomSearchResult};
use crate::services::dataset::SymptomDataset;

pub const SIMILARITY_THRESHOLD: f64 = 60.0;
pub const MAX_SUGGESTIONS: usize = 5;
const SEARCH_SUGGESTIONS: usize = 3;

/// Classic dynamic-programming edit distance over the full matrix.
/// Insertion, deletion, and substitution each cost 1.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; a.len() + 1]; b.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=a.len() {
        matrix[0][j] = j;
    }

    for i in 1..=b.len() {
        for j in 1..=a.len() {
            if b[i - 1] == a[j - 1] {
                matrix[i][j] = matrix[i - 1][j - 1];
            } else {
                let substitution = matrix[i - 1][j - 1] + 1;
                let insertion = matrix[i][j - 1] + 1;
                let deletion = matrix[i - 1][j] + 1;
                matrix[i][j] = substitution.min(insertion).min(deletion);
            }
        }
    }

    matrix[b.len()][a.len()]
}

/// Similarity percentage between two strings. Both empty counts as a
/// perfect match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    // max_len must come from the same strings the distance was computed
    // on; lowercasing can change the char count ("İ" becomes two chars).
    let distance = levenshtein_distance(&a, &b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        100.0
    } else {
        (max_len - distance) as f64 / max_len as f64 * 100.0
    }
}

/// Fuzzy lookup over the dataset's symptom terms.
pub struct SpellChecker {
    terms: Vec<String>,
}

impl SpellChecker {
    pub fn new(dataset: &SymptomDataset) -> Self {
        Self {
            terms: dataset.all_terms(),
        }
    }

    /// Bidirectional containment counts as an exact match and skips
    /// fuzzy scoring entirely. Otherwise every term is scored and the
    /// best `max_suggestions` at or above the threshold are returned,
    /// ranked by similarity descending then edit distance ascending.
    pub fn find_suggestions(
        &self,
        query: &str,
        threshold: f64,
        max_suggestions: usize,
    ) -> SpellSuggestions {
        let query_lower = query.to_lowercase().trim().to_string();

        let exact_matches: Vec<String> = self
            .terms
            .iter()
            .filter(|term| term.contains(&query_lower) || query_lower.contains(term.as_str()))
            .cloned()
            .collect();

        if !exact_matches.is_empty() {
            return SpellSuggestions {
                has_exact_match: true,
                exact_matches: exact_matches.into_iter().take(max_suggestions).collect(),
                suggestions: Vec::new(),
                original_query: query.to_string(),
            };
        }

        let mut scored: Vec<(String, f64, usize)> = self
            .terms
            .iter()
            .filter_map(|term| {
                let score = similarity(&query_lower, term);
                if score >= threshold {
                    Some((
                        term.clone(),
                        score,
                        levenshtein_distance(&query_lower, term),
                    ))
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.cmp(&b.2))
        });

        SpellSuggestions {
            has_exact_match: false,
            exact_matches: Vec::new(),
            suggestions: scored
                .into_iter()
                .take(max_suggestions)
                .map(|(term, _, _)| term)
                .collect(),
            original_query: query.to_string(),
        }
    }
}

/// Dataset search with a spell-correction fallback: exact containment
/// first, then a re-search through each suggested spelling with
/// duplicates removed.
pub fn search_with_spell_check(dataset: &SymptomDataset, query: &str) -> SymptomSearchResult {
    let exact = dataset.search(query);
    if !exact.is_empty() {
        return SymptomSearchResult {
            matches: exact,
            spell_suggestions: None,
            has_spelling_suggestions: false,
            original_query: query.to_string(),
        };
    }

    let checker = SpellChecker::new(dataset);
    let spell_check = checker.find_suggestions(query, SIMILARITY_THRESHOLD, SEARCH_SUGGESTIONS);

    if !spell_check.suggestions.is_empty() {
        let mut matches = Vec::new();
        for suggestion in &spell_check.suggestions {
            for entry in dataset.search(suggestion) {
                if !matches.contains(&entry) {
                    matches.push(entry);
                }
            }
        }

        return SymptomSearchResult {
            matches,
            spell_suggestions: Some(spell_check.suggestions),
            has_spelling_suggestions: true,
            original_query: query.to_string(),
        };
    }

    SymptomSearchResult {
        matches: Vec::new(),
        spell_suggestions: Some(Vec::new()),
        has_spelling_suggestions: false,
        original_query: query.to_string(),
    }
}
