//! Folio - inspect, search and live-reload a Markdown content directory.

mod cli;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use folio::{
    ContentService, Document, FolioConfig, SearchFilters, SearchResult, log, logger::set_quiet,
};
use serde::Serialize;
use std::sync::Arc;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Keep stdout machine-readable
    set_quiet(cli.json && !cli.is_watch());

    let config = load_config(&cli)?;
    let service = ContentService::open(&config)
        .with_context(|| format!("Failed to load {}", config.content.dir.display()))?;

    match &cli.command {
        Commands::Stats => print(&cli, &service.get_stats(), |stats| {
            println!("documents:  {} ({} drafts)", stats.total_articles, stats.draft_count);
            println!("tags:       {}", stats.total_tags);
            println!("categories: {}", stats.total_categories);
            println!(
                "bodies:     {} bytes, {} resident ({} compressed)",
                stats.memory.body_bytes, stats.memory.resident_body_bytes, stats.memory.compressed_documents
            );
            if !stats.popular_tags.is_empty() {
                let tags: Vec<String> = stats
                    .popular_tags
                    .iter()
                    .map(|t| format!("{} ({})", t.name, t.count))
                    .collect();
                println!("popular:    {}", tags.join(", "));
            }
        }),
        Commands::List { tag, category, drafts, limit } => {
            let mut documents = match (tag, category, drafts) {
                (_, _, true) => service.get_draft_articles(),
                (Some(tag), _, _) => service.get_articles_by_tag(tag),
                (_, Some(category), _) => service.get_articles_by_category(category),
                _ => service.get_all_articles(),
            };
            if *limit > 0 {
                documents.truncate(*limit);
            }
            print(&cli, &documents, |documents| {
                documents.iter().for_each(|d| println!("{}", list_line(d)));
            })
        }
        Commands::Show { slug, html } => {
            let document = service
                .get_article_by_slug(slug)
                .or_else(|_| service.get_draft_by_slug(slug))?;
            let text = if *html {
                service.rendered_html(&document)
            } else {
                service.excerpt(&document)
            };
            print(&cli, &document, |document| {
                println!("{}", list_line(document));
                println!();
                println!("{text}");
            })
        }
        Commands::Search { query, limit, title, tag, suggest } => {
            let limit = limit.unwrap_or(service.search_config().default_limit);
            if *suggest {
                let limit = limit.min(service.search_config().suggestion_limit);
                return print(&cli, &service.get_search_suggestions(query, limit), |terms| {
                    terms.iter().for_each(|t| println!("{t}"));
                });
            }

            let results = if *title {
                service.search_in_title(query, limit)
            } else if !tag.is_empty() {
                let filters = SearchFilters {
                    tags: tag.clone(),
                    ..SearchFilters::default()
                };
                service.search_with_filters(query, &filters, limit)
            } else {
                service.search_articles(query, limit)
            };
            print(&cli, &results, |results| {
                results.iter().for_each(|r| println!("{}", result_line(r)));
            })
        }
        Commands::Publish { slug } => {
            let document = service.publish_draft(slug)?;
            print(&cli, &document, |d| println!("published {}", d.slug))
        }
        Commands::Unpublish { slug } => {
            let document = service.unpublish_article(slug)?;
            print(&cli, &document, |d| println!("unpublished {}", d.slug))
        }
        Commands::Watch => watch_for_changes_blocking(&service, &config),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error: defaults apply.
fn load_config(cli: &Cli) -> Result<FolioConfig> {
    let mut config = if cli.config.exists() {
        FolioConfig::from_path(&cli.config)?
    } else {
        log!("config"; "{} not found, using defaults", cli.config.display());
        FolioConfig::default()
    };
    if let Some(dir) = &cli.content {
        config = config.with_content_dir(dir);
    }

    config.validate()?;
    Ok(config)
}

/// Print `value` as JSON when `--json` is set, otherwise through `human`.
fn print<T: Serialize>(cli: &Cli, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn list_line(document: &Arc<Document>) -> String {
    let date = document
        .date
        .map_or_else(|| "----------".to_string(), |d| d.format("%Y-%m-%d").to_string());
    let draft = if document.draft { " [draft]" } else { "" };
    format!(
        "{date}  {:<8} {}  ({}){draft}",
        document.kind.as_str(),
        document.display_title(),
        document.slug
    )
}

fn result_line(result: &SearchResult) -> String {
    let fields: Vec<String> = result
        .matched_fields
        .iter()
        .map(|f| format!("{f:?}").to_lowercase())
        .collect();
    format!(
        "{:>7.2}  {}  [{}]",
        result.score,
        list_line(&result.document),
        fields.join(", ")
    )
}
