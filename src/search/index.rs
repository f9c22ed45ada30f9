//! Per-snapshot search index.
//!
//! Every published document is tokenized exactly once, when its snapshot is
//! built. Queries only compare terms.

use super::tokenizer::{Term, tokenize};
use crate::document::Document;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A tag or category, normalized for matching.
#[derive(Debug, Clone)]
pub struct LabelTerms {
    /// Lowercased full label (`"web dev"`)
    pub label: String,
    pub terms: Vec<Term>,
}

impl LabelTerms {
    fn new(label: &str) -> Self {
        Self {
            label: label.trim().to_lowercase(),
            terms: tokenize(label),
        }
    }
}

/// Precomputed terms of one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentTerms {
    pub title: Vec<Term>,
    pub description: Vec<Term>,
    pub tags: Vec<LabelTerms>,
    pub categories: Vec<LabelTerms>,
    /// Term frequencies of the body.
    pub body: FxHashMap<Term, u32>,
}

impl DocumentTerms {
    /// Tokenize `document`'s fields. `body` is its uncompressed Markdown.
    pub fn new(document: &Document, body: &str) -> Self {
        let mut frequencies = FxHashMap::default();
        for term in tokenize(body) {
            *frequencies.entry(term).or_insert(0) += 1;
        }

        Self {
            title: document.title.as_deref().map(tokenize).unwrap_or_default(),
            description: document
                .description
                .as_deref()
                .map(tokenize)
                .unwrap_or_default(),
            tags: document.tags.iter().map(|t| LabelTerms::new(t)).collect(),
            categories: document
                .categories
                .iter()
                .map(|c| LabelTerms::new(c))
                .collect(),
            body: frequencies,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub document: Arc<Document>,
    pub terms: DocumentTerms,
}

/// Terms of all published documents of one snapshot.
#[derive(Debug, Default)]
pub struct SearchIndex {
    pub(crate) entries: Vec<Entry>,
    /// Title words and tags → number of documents using them.
    pub(crate) suggestions: FxHashMap<Term, u32>,
}

impl SearchIndex {
    /// Build from documents in snapshot order. Drafts are left out.
    pub fn build(documents: impl IntoIterator<Item = (Arc<Document>, DocumentTerms)>) -> Self {
        let entries: Vec<Entry> = documents
            .into_iter()
            .filter(|(document, _)| document.is_published())
            .map(|(document, terms)| Entry { document, terms })
            .collect();

        let mut suggestions: FxHashMap<Term, u32> = FxHashMap::default();
        for entry in &entries {
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            let title = entry.terms.title.iter().map(Term::as_str);
            let tags = entry.terms.tags.iter().map(|t| t.label.as_str());
            for term in title.chain(tags).filter(|t| !t.is_empty()) {
                if seen.insert(term) {
                    *suggestions.entry(Term::from(term)).or_insert(0) += 1;
                }
            }
        }

        Self {
            entries,
            suggestions,
        }
    }

    /// Number of searchable (published) documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentParser;
    use std::path::Path;

    fn doc(name: &str, text: &str) -> (Arc<Document>, DocumentTerms) {
        let document = DocumentParser::default()
            .parse(Path::new(name), text.as_bytes())
            .unwrap();
        let body = document.plain_body().unwrap_or_default().to_owned();
        let terms = DocumentTerms::new(&document, &body);
        (Arc::new(document), terms)
    }

    #[test]
    fn test_document_terms() {
        let (_, terms) = doc(
            "a.md",
            "---\ntitle: Learning Rust\ndescription: A gentle start\ntags: [Web Dev]\n---\nRust rust borrow checker.",
        );

        assert_eq!(terms.title, vec![Term::from("learning"), Term::from("rust")]);
        assert_eq!(terms.description, vec![Term::from("gentle"), Term::from("start")]);
        assert_eq!(terms.tags[0].label, "web dev");
        assert_eq!(terms.body.get("rust"), Some(&2));
        assert_eq!(terms.body.get("checker"), Some(&1));
    }

    #[test]
    fn test_index_excludes_drafts() {
        let index = SearchIndex::build([
            doc("a.md", "---\ntitle: Public\n---\nx"),
            doc("b.md", "---\ntitle: Secret\ndraft: true\n---\nx"),
        ]);
        assert_eq!(index.len(), 1);
        assert!(!index.suggestions.contains_key("secret"));
    }

    #[test]
    fn test_suggestion_counts_per_document() {
        let index = SearchIndex::build([
            doc("a.md", "---\ntitle: Rust Rust Tips\ntags: [rust]\n---\n"),
            doc("b.md", "---\ntitle: Rust Errors\n---\n"),
        ]);
        // "rust" appears as title word and tag in a.md but counts once there
        assert_eq!(index.suggestions.get("rust"), Some(&2));
        assert_eq!(index.suggestions.get("tips"), Some(&1));
    }
}
