//! Relevance scoring and ranking.
//!
//! # Weights
//!
//! Per query term, each field contributes its best match:
//!
//! | Field       | Exact | Prefix |
//! |-------------|-------|--------|
//! | title       | 10    | 4      |
//! | tags        | 6     | 2.5    |
//! | categories  | 6     | 2.5    |
//! | description | 3     | 1      |
//! | body        | 1 + ln(tf) | 0.5 |
//!
//! Multi-term queries earn a phrase bonus when the whole query appears in
//! order: +15 in the title, +5 in the description, +6 when it equals a tag or
//! category.
//!
//! A featured document's total is multiplied by 1.2.

use super::{
    SearchFilters,
    index::{DocumentTerms, Entry, LabelTerms, SearchIndex},
    tokenizer::{Term, contains_phrase, tokenize},
};
use crate::document::Document;
use rayon::prelude::*;
use serde::Serialize;
use std::{cmp::Ordering, sync::Arc};

const TITLE_EXACT: f64 = 10.0;
const TITLE_PREFIX: f64 = 4.0;
const LABEL_EXACT: f64 = 6.0;
const LABEL_PREFIX: f64 = 2.5;
const DESCRIPTION_EXACT: f64 = 3.0;
const DESCRIPTION_PREFIX: f64 = 1.0;
const BODY_PREFIX: f64 = 0.5;

const TITLE_PHRASE: f64 = 15.0;
const DESCRIPTION_PHRASE: f64 = 5.0;
const LABEL_PHRASE: f64 = 6.0;

const FEATURED_BOOST: f64 = 1.2;

/// Query terms shorter than this never prefix-match.
const MIN_PREFIX_LEN: usize = 3;

/// Field a query matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Tags,
    Categories,
    Body,
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: Arc<Document>,
    pub score: f64,
    pub matched_fields: Vec<Field>,
}

/// Which fields a search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    TitleOnly,
}

struct Query {
    /// Distinct terms in query order
    terms: Vec<Term>,
    /// Full term sequence, when the query has more than one term
    phrase: Option<Vec<Term>>,
}

impl Query {
    fn parse(text: &str) -> Option<Self> {
        let all = tokenize(text);
        let mut seen = rustc_hash::FxHashSet::default();
        let terms: Vec<Term> = all.iter().filter(|t| seen.insert(*t)).cloned().collect();
        if terms.is_empty() {
            return None;
        }
        let phrase = (all.len() > 1).then_some(all);
        Some(Self { terms, phrase })
    }
}

#[derive(Default)]
struct Score {
    total: f64,
    fields: Vec<Field>,
}

impl Score {
    fn add(&mut self, field: Field, points: f64) {
        if points > 0.0 {
            self.total += points;
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
    }
}

fn is_prefix(term: &str, query: &str) -> bool {
    query.len() >= MIN_PREFIX_LEN && term.len() > query.len() && term.starts_with(query)
}

/// Best exact/prefix score of `query` against a term sequence.
fn best_match<'a>(
    terms: impl IntoIterator<Item = &'a Term>,
    query: &str,
    exact: f64,
    prefix: f64,
) -> f64 {
    let mut best = 0.0;
    for term in terms {
        if term == query {
            return exact;
        }
        if is_prefix(term, query) {
            best = prefix;
        }
    }
    best
}

fn label_match(labels: &[LabelTerms], query: &str) -> f64 {
    best_match(
        labels.iter().flat_map(|l| l.terms.iter()),
        query,
        LABEL_EXACT,
        LABEL_PREFIX,
    )
}

fn body_match(terms: &DocumentTerms, query: &str) -> f64 {
    if let Some(&tf) = terms.body.get(query) {
        return 1.0 + f64::from(tf).ln();
    }
    if query.len() >= MIN_PREFIX_LEN && terms.body.keys().any(|t| is_prefix(t, query)) {
        return BODY_PREFIX;
    }
    0.0
}

fn score(terms: &DocumentTerms, query: &Query, scope: Scope) -> Score {
    let mut score = Score::default();

    for q in &query.terms {
        let q = q.as_str();
        score.add(Field::Title, best_match(&terms.title, q, TITLE_EXACT, TITLE_PREFIX));
        if scope == Scope::TitleOnly {
            continue;
        }
        score.add(Field::Tags, label_match(&terms.tags, q));
        score.add(Field::Categories, label_match(&terms.categories, q));
        score.add(
            Field::Description,
            best_match(&terms.description, q, DESCRIPTION_EXACT, DESCRIPTION_PREFIX),
        );
        score.add(Field::Body, body_match(terms, q));
    }

    if let Some(phrase) = &query.phrase {
        if contains_phrase(&terms.title, phrase) {
            score.add(Field::Title, TITLE_PHRASE);
        }
        if scope == Scope::All {
            if contains_phrase(&terms.description, phrase) {
                score.add(Field::Description, DESCRIPTION_PHRASE);
            }
            if terms.tags.iter().any(|l| &l.terms == phrase) {
                score.add(Field::Tags, LABEL_PHRASE);
            }
            if terms.categories.iter().any(|l| &l.terms == phrase) {
                score.add(Field::Categories, LABEL_PHRASE);
            }
        }
    }

    score.fields.sort_unstable();
    score
}

/// Score desc, then date desc (undated last), then slug asc.
pub(crate) fn rank_order(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| crate::store::newest_first(&a.document, &b.document))
}

impl SearchIndex {
    /// Rank published documents against `query`.
    ///
    /// Every candidate is scored before the list is cut to `limit`
    /// (0 means unlimited). Blank queries return nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.run(query, limit, Scope::All, None)
    }

    /// Like [`search`](Self::search) but only titles are considered.
    pub fn search_in_title(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.run(query, limit, Scope::TitleOnly, None)
    }

    /// Search restricted to documents passing `filters`.
    ///
    /// A blank query with active filters lists every matching document,
    /// newest first, with a score of zero.
    pub fn search_with_filters(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Vec<SearchResult> {
        if query.trim().is_empty() && !filters.is_empty() {
            let mut results: Vec<SearchResult> = self
                .entries
                .iter()
                .filter(|e| filters.matches(&e.document))
                .map(|e| SearchResult {
                    document: Arc::clone(&e.document),
                    score: 0.0,
                    matched_fields: Vec::new(),
                })
                .collect();
            results.sort_by(rank_order);
            truncate(&mut results, limit);
            return results;
        }
        self.run(query, limit, Scope::All, Some(filters))
    }

    /// Title words and tags that start with `prefix`, most used first.
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(&Term, u32)> = self
            .suggestions
            .iter()
            .filter(|(term, _)| term.len() > prefix.len() && term.starts_with(&prefix))
            .map(|(term, &count)| (term, count))
            .collect();
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let limit = if limit == 0 { matches.len() } else { limit };
        matches
            .into_iter()
            .take(limit)
            .map(|(term, _)| term.to_string())
            .collect()
    }

    fn run(
        &self,
        query: &str,
        limit: usize,
        scope: Scope,
        filters: Option<&SearchFilters>,
    ) -> Vec<SearchResult> {
        let Some(query) = Query::parse(query) else {
            return Vec::new();
        };

        let mut results: Vec<SearchResult> = self
            .entries
            .par_iter()
            .filter(|e| filters.is_none_or(|f| f.matches(&e.document)))
            .filter_map(|Entry { document, terms }| {
                let Score { total, fields } = score(terms, &query, scope);
                let boost = if document.featured { FEATURED_BOOST } else { 1.0 };
                (total > 0.0).then(|| SearchResult {
                    document: Arc::clone(document),
                    score: total * boost,
                    matched_fields: fields,
                })
            })
            .collect();

        results.sort_by(rank_order);
        truncate(&mut results, limit);
        results
    }
}

fn truncate(results: &mut Vec<SearchResult>, limit: usize) {
    if limit > 0 {
        results.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::DocumentParser, search::DocumentTerms};
    use chrono::NaiveDate;
    use std::path::Path;

    fn index(files: &[(&str, &str)]) -> SearchIndex {
        SearchIndex::build(files.iter().map(|(name, text)| {
            let document = DocumentParser::default()
                .parse(Path::new(name), text.as_bytes())
                .unwrap();
            let terms = DocumentTerms::new(&document, document.plain_body().unwrap_or_default());
            (Arc::new(document), terms)
        }))
    }

    fn slugs(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| &*r.document.slug).collect()
    }

    #[test]
    fn test_title_outranks_tag() {
        let index = index(&[
            ("tagged.md", "---\ntitle: Concurrency Notes\ntags: [golang]\n---\nChannels."),
            ("titled.md", "---\ntitle: Why Golang\n---\nChannels."),
        ]);

        let results = index.search("golang", 10);
        assert_eq!(slugs(&results), vec!["titled", "tagged"]);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].matched_fields, vec![Field::Title]);
        assert_eq!(results[1].matched_fields, vec![Field::Tags]);
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let index = index(&[("a.md", "---\ntitle: Anything\n---\nbody")]);
        assert!(index.search("", 10).is_empty());
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("the and", 10).is_empty());
    }

    #[test]
    fn test_zero_score_excluded() {
        let index = index(&[
            ("a.md", "---\ntitle: Rust\n---\nbody"),
            ("b.md", "---\ntitle: Python\n---\nbody"),
        ]);
        assert_eq!(slugs(&index.search("rust", 10)), vec!["a"]);
    }

    #[test]
    fn test_drafts_never_returned() {
        let index = index(&[("a.md", "---\ntitle: Rust\ndraft: true\n---\nrust")]);
        assert!(index.search("rust", 10).is_empty());
    }

    #[test]
    fn test_ties_by_date_then_slug() {
        let index = index(&[
            ("b.md", "---\ntitle: Rust\ndate: 2024-01-01\n---\n"),
            ("a.md", "---\ntitle: Rust\ndate: 2024-01-01\n---\n"),
            ("c.md", "---\ntitle: Rust\ndate: 2024-06-01\n---\n"),
            ("d.md", "---\ntitle: Rust\n---\n"),
        ]);
        assert_eq!(slugs(&index.search("rust", 0)), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_limit_applied_after_scoring() {
        let mut files: Vec<(String, String)> = (0..20)
            .map(|i| (format!("filler-{i:02}.md"), "---\ntitle: Filler\n---\nrust".to_owned()))
            .collect();
        files.push(("zz-best.md".into(), "---\ntitle: Rust Deep Dive\n---\nrust".into()));
        let files: Vec<(&str, &str)> = files.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();

        let results = index(&files).search("rust", 1);
        assert_eq!(slugs(&results), vec!["zz-best"]);
    }

    #[test]
    fn test_featured_boost() {
        let index = index(&[
            ("newer.md", "---\ntitle: Rust\ndate: 2024-06-01\n---\n"),
            ("pinned.md", "---\ntitle: Rust\ndate: 2024-01-01\nfeatured: true\n---\n"),
        ]);
        let results = index.search("rust", 10);
        assert_eq!(slugs(&results), vec!["pinned", "newer"]);
        assert!((results[0].score - results[1].score * FEATURED_BOOST).abs() < 1e-9);

        // The boost never lifts a non-match into the results
        assert_eq!(slugs(&index.search("python", 10)), Vec::<&str>::new());
    }

    #[test]
    fn test_exact_beats_prefix() {
        let index = index(&[
            ("prefix.md", "---\ntitle: Programming Basics\n---\n"),
            ("exact.md", "---\ntitle: Program Design\n---\n"),
        ]);
        let results = index.search("program", 10);
        assert_eq!(slugs(&results), vec!["exact", "prefix"]);
    }

    #[test]
    fn test_phrase_bonus() {
        let index = index(&[
            ("scattered.md", "---\ntitle: Patterns for Rust and Async\n---\n"),
            ("phrase.md", "---\ntitle: Async Rust Patterns\n---\n"),
        ]);
        let results = index.search("async rust", 10);
        assert_eq!(slugs(&results), vec!["phrase", "scattered"]);
    }

    #[test]
    fn test_body_frequency_grows_score() {
        let index = index(&[
            ("once.md", "---\ntitle: A\n---\nrust"),
            ("often.md", "---\ntitle: B\n---\nrust rust rust rust"),
        ]);
        let results = index.search("rust", 10);
        assert_eq!(slugs(&results), vec!["often", "once"]);
        assert_eq!(results[0].matched_fields, vec![Field::Body]);
    }

    #[test]
    fn test_description_between_tags_and_body() {
        let index = index(&[
            ("body.md", "---\ntitle: One\n---\nwasm"),
            ("desc.md", "---\ntitle: Two\ndescription: About wasm\n---\n"),
            ("tag.md", "---\ntitle: Three\ntags: [wasm]\n---\n"),
        ]);
        assert_eq!(slugs(&index.search("wasm", 10)), vec!["tag", "desc", "body"]);
    }

    #[test]
    fn test_search_in_title_ignores_other_fields() {
        let index = index(&[
            ("a.md", "---\ntitle: Rust Tips\n---\n"),
            ("b.md", "---\ntitle: Other\ntags: [rust]\n---\nrust"),
        ]);
        assert_eq!(slugs(&index.search_in_title("rust", 10)), vec!["a"]);
    }

    #[test]
    fn test_search_with_filters() {
        let index = index(&[
            ("a.md", "---\ntitle: Rust A\ntags: [web]\ndate: 2024-01-10\n---\n"),
            ("b.md", "---\ntitle: Rust B\ntags: [cli]\ndate: 2024-02-10\nfeatured: true\n---\n"),
            ("c.md", "---\ntitle: Rust C\ntags: [WEB]\ndate: 2024-03-10\n---\n"),
        ]);

        let filters = SearchFilters {
            tags: vec!["web".into()],
            ..Default::default()
        };
        assert_eq!(slugs(&index.search_with_filters("rust", &filters, 10)), vec!["c", "a"]);

        let filters = SearchFilters {
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        assert_eq!(slugs(&index.search_with_filters("rust", &filters, 10)), vec!["b", "c"]);

        let filters = SearchFilters {
            featured_only: true,
            ..Default::default()
        };
        assert_eq!(slugs(&index.search_with_filters("", &filters, 10)), vec!["b"]);
    }

    #[test]
    fn test_suggestions() {
        let index = index(&[
            ("a.md", "---\ntitle: Rust Tips\ntags: [rustacean]\n---\n"),
            ("b.md", "---\ntitle: Rust Errors\n---\n"),
            ("c.md", "---\ntitle: Running Fast\n---\n"),
        ]);

        assert_eq!(index.suggestions("ru", 10), vec!["rust", "running", "rustacean"]);
        assert_eq!(index.suggestions("RU", 1), vec!["rust"]);
        assert!(index.suggestions("rust", 10).contains(&"rustacean".to_owned()));
        assert!(!index.suggestions("rust", 10).contains(&"rust".to_owned()));
        assert!(index.suggestions("", 10).is_empty());
    }
}
