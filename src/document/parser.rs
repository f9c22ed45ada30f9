//! File bytes → [`Document`].

use super::{
    Body, ContentType, DISPLAY_TITLE_LENGTH, Document, Labels, excerpt,
    frontmatter::{self, FrontMatter},
};
use crate::{
    config::ContentConfig,
    error::{ParseError, ParseErrorKind},
    utils::{
        date::{date_to_utc, parse_datetime},
        slug::{slug_from_path, slugify, split_date_prefix, title_from_path},
    },
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use std::{fs, path::Path, sync::Arc};

/// Knobs for the derived fields.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Untitled bodies with fewer words than this are thoughts.
    pub thought_word_threshold: usize,
    pub words_per_minute: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from(&ContentConfig::default())
    }
}

impl From<&ContentConfig> for ParseOptions {
    fn from(config: &ContentConfig) -> Self {
        Self {
            thought_word_threshold: config.thought_word_threshold,
            words_per_minute: config.words_per_minute,
        }
    }
}

/// Stateless parser; cheap to share across rayon workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser {
    options: ParseOptions,
}

impl DocumentParser {
    pub const fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Read and parse a file, recording its modification time.
    pub fn parse_file(&self, path: &Path) -> Result<Document, ParseError> {
        let bytes = fs::read(path).map_err(|err| ParseError::new(path, err.into()))?;
        let mut document = self.parse(path, &bytes)?;
        document.last_modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(document)
    }

    /// Parse one file's contents. `path` is used for slug/title/date fallbacks
    /// and error reporting only; nothing is read from disk.
    pub fn parse(&self, path: &Path, bytes: &[u8]) -> Result<Document, ParseError> {
        let fingerprint = blake3::hash(bytes);
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let (yaml, body) = frontmatter::split(text).map_err(|kind| ParseError::new(path, kind))?;
        let front = match yaml {
            Some(yaml) => FrontMatter::from_yaml(yaml).map_err(|kind| ParseError::new(path, kind))?,
            None => FrontMatter::default(),
        };
        let body = body.trim();

        let slug = derive_slug(path, front.slug.as_deref())?;
        let date = derive_date(path, front.date.as_deref())?;

        let title = non_empty(front.title)
            .or_else(|| yaml.is_none().then(|| title_from_path(path)))
            .filter(|t| !t.is_empty())
            .map(Arc::<str>::from);
        let link_url = non_empty(front.link_url);

        let word_count = body.split_whitespace().count();
        let reading_time_minutes = (word_count / self.options.words_per_minute.max(1)).max(1);
        let kind = ContentType::infer(
            link_url.is_some(),
            title.is_some(),
            word_count,
            self.options.thought_word_threshold,
        );

        let display_title = match &title {
            Some(title) => Arc::clone(title),
            None => untitled_label(body, &slug),
        };

        Ok(Document {
            path: path.to_path_buf(),
            slug: Arc::from(slug),
            title,
            description: non_empty(front.description),
            date,
            tags: labels(front.tags),
            categories: labels(front.categories),
            author: non_empty(front.author).map(Arc::from),
            draft: front.draft,
            featured: front.featured,
            link_url,
            kind,
            word_count,
            reading_time_minutes,
            last_modified: None,
            fingerprint,
            display_title,
            body: Body::Plain(Arc::from(body)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Explicit front-matter slug (normalized) or one derived from the file name.
fn derive_slug(path: &Path, explicit: Option<&str>) -> Result<String, ParseError> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let slug = slugify(raw);
            if slug.is_empty() {
                return Err(ParseError::invalid_field(
                    path,
                    "slug",
                    format!("`{raw}` contains no URL-safe characters"),
                ));
            }
            Ok(slug)
        }
        None => {
            let slug = slug_from_path(path);
            if slug.is_empty() {
                return Err(ParseError::new(path, ParseErrorKind::EmptySlug));
            }
            Ok(slug)
        }
    }
}

/// Front-matter date, falling back to a `YYYY-MM-DD-` file name prefix.
fn derive_date(path: &Path, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ParseError> {
    if let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) {
        return parse_datetime(raw).map(Some).ok_or_else(|| {
            ParseError::invalid_field(
                path,
                "date",
                format!("`{raw}` is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"),
            )
        });
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    Ok(split_date_prefix(stem).0.map(date_to_utc))
}

/// Trimmed, non-empty labels with case-insensitive duplicates removed.
/// The first spelling wins.
fn labels(values: Vec<String>) -> Labels {
    let mut seen = FxHashSet::default();
    values
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .map(Arc::from)
        .collect()
}

fn untitled_label(body: &str, slug: &str) -> Arc<str> {
    let text = excerpt::plain_text(body);
    if text.is_empty() {
        return Arc::from(slug);
    }
    Arc::from(excerpt::truncate_words(&text, DISPLAY_TITLE_LENGTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::excerpt::ELLIPSIS;
    use chrono::{Datelike, Timelike};

    fn parse(path: &str, text: &str) -> Result<Document, ParseError> {
        DocumentParser::default().parse(Path::new(path), text.as_bytes())
    }

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    #[test]
    fn test_slug_from_dated_filename() {
        let doc = parse(
            "articles/2024-01-15-hello-world.md",
            "---\ntitle: \"Hello World\"\n---\nBody",
        )
        .unwrap();

        assert_eq!(&*doc.slug, "hello-world");
        assert_eq!(doc.title.as_deref(), Some("Hello World"));
        assert_eq!(doc.kind, ContentType::Article);
    }

    #[test]
    fn test_untitled_short_body_is_thought() {
        let text = format!("---\ntags: [life]\n---\n{}", words(40));
        let doc = parse("articles/quick-note.md", &text).unwrap();

        assert_eq!(doc.kind, ContentType::Thought);
        assert!(doc.title.is_none());
        assert_eq!(doc.word_count, 40);
        assert!(doc.display_title().ends_with(ELLIPSIS));
        assert!(doc.display_title().chars().count() <= DISPLAY_TITLE_LENGTH);
    }

    #[test]
    fn test_untitled_long_body_is_article() {
        let text = format!("---\ndraft: false\n---\n{}", words(150));
        let doc = parse("long.md", &text).unwrap();
        assert_eq!(doc.kind, ContentType::Article);
        assert!(doc.title.is_none());
    }

    #[test]
    fn test_link_wins_regardless_of_body() {
        let text = format!(
            "---\ntitle: Worth reading\nlink_url: \"https://example.com\"\n---\n{}",
            words(500)
        );
        let doc = parse("link.md", &text).unwrap();
        assert_eq!(doc.kind, ContentType::Link);
        assert_eq!(doc.link_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let parser = DocumentParser::new(ParseOptions {
            thought_word_threshold: 10,
            words_per_minute: 200,
        });
        let text = format!("---\nauthor: me\n---\n{}", words(40));
        let doc = parser.parse(Path::new("note.md"), text.as_bytes()).unwrap();
        assert_eq!(doc.kind, ContentType::Article);
    }

    #[test]
    fn test_missing_front_matter_uses_filename_title() {
        let doc = parse("articles/my_first-post.md", "Just a body.").unwrap();
        assert_eq!(doc.title.as_deref(), Some("My First Post"));
        assert_eq!(&*doc.slug, "my-first-post");
        assert_eq!(doc.kind, ContentType::Article);
        assert!(!doc.draft);
    }

    #[test]
    fn test_malformed_front_matter_names_file() {
        let err = parse("bad.md", "---\ntitle: [oops\n---\nBody").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::FrontMatter(_)));
        assert!(err.to_string().starts_with("bad.md"));
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = parse("open.md", "---\ntitle: Never closed\nbody").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedFrontMatter));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = parse("d.md", "---\ndate: last tuesday\n---\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { field: "date", .. }
        ));
    }

    #[test]
    fn test_date_parsing_and_filename_fallback() {
        let doc = parse("x.md", "---\ndate: 2024-03-01T10:30:00Z\n---\n").unwrap();
        let date = doc.date.unwrap();
        assert_eq!((date.month(), date.hour()), (3, 10));

        let doc = parse("2023-07-04-party.md", "---\ntitle: Party\n---\n").unwrap();
        assert_eq!(doc.date.unwrap().year(), 2023);

        let doc = parse("undated.md", "---\ntitle: T\n---\n").unwrap();
        assert!(doc.date.is_none());
    }

    #[test]
    fn test_explicit_slug_normalized() {
        let doc = parse("file.md", "---\nslug: My Custom Slug!\n---\n").unwrap();
        assert_eq!(&*doc.slug, "my-custom-slug");

        let err = parse("file.md", "---\nslug: \"!!!\"\n---\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { field: "slug", .. }
        ));
    }

    #[test]
    fn test_empty_slug_error() {
        let err = parse("!!!.md", "body").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::EmptySlug));
    }

    #[test]
    fn test_labels_trimmed_and_deduplicated() {
        let doc = parse(
            "t.md",
            "---\ntags: [Rust, rust, \" Go \"]\ncategories: Programming\n---\n",
        )
        .unwrap();
        let tags: Vec<&str> = doc.tags.iter().map(|t| &**t).collect();
        assert_eq!(tags, vec!["Rust", "Go"]);
        assert_eq!(&*doc.categories[0], "Programming");
        assert!(doc.has_tag("RUST"));
        assert!(doc.has_category("programming"));
    }

    #[test]
    fn test_reading_time_minimum_one() {
        let doc = parse("r.md", "---\ntitle: R\n---\nshort").unwrap();
        assert_eq!(doc.reading_time_minutes, 1);

        let doc = parse("r.md", &format!("---\ntitle: R\n---\n{}", words(450))).unwrap();
        assert_eq!(doc.reading_time_minutes, 2);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "---\ntitle: Same\ntags: [a, b]\n---\nSame body.";
        let a = parse("same.md", text).unwrap();
        let b = parse("same.md", text).unwrap();

        assert_eq!(a.slug, b.slug);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.display_title(), b.display_title());
        assert_eq!(a.tags, b.tags);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = parse("f.md", "---\ntitle: A\n---\none").unwrap();
        let b = parse("f.md", "---\ntitle: A\n---\ntwo").unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let doc = parse("bom.md", "\u{feff}---\ntitle: BOM\n---\nBody").unwrap();
        assert_eq!(doc.title.as_deref(), Some("BOM"));
    }

    #[test]
    fn test_parse_file_sets_last_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("on-disk.md");
        fs::write(&path, "---\ntitle: Disk\n---\nBody").unwrap();

        let doc = DocumentParser::default().parse_file(&path).unwrap();
        assert!(doc.last_modified.is_some());
        assert_eq!(doc.path, path);
    }

    #[test]
    fn test_parse_file_missing_is_io_error() {
        let err = DocumentParser::default()
            .parse_file(Path::new("/nonexistent/nope.md"))
            .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Io(_)));
    }
}
