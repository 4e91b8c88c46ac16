//! Search-as-you-type over in-memory collections.
//!
//! A record matches when any of its designated fields, lower-cased, contains
//! the lower-cased query. The query is used as typed: no trimming, no
//! tokenizing, no fuzzy matching. An empty query keeps everything.
//!
//! ```
//! use snipshelf_core::filter::{filter, FieldAccessor};
//!
//! struct Item { title: String }
//! fn title(item: &Item) -> &str { &item.title }
//!
//! let items = vec![Item { title: "Debounce function".into() }];
//! let fields: &[FieldAccessor<Item>] = &[title];
//! assert_eq!(filter("DEBOUNCE", &items, fields).len(), 1);
//! ```

use crate::model::{Snippet, ToolConfig};
use std::borrow::Borrow;

/// Reads one searchable string field out of a record.
pub type FieldAccessor<T> = fn(&T) -> &str;

/// Records with a fixed set of display fields to search.
pub trait Searchable: Sized + 'static {
    fn search_fields() -> &'static [FieldAccessor<Self>];
}

/// Keep the items matching `query` on at least one of `fields`, in input order.
///
/// Works over owned records or references (`&[T]`, `Vec<T>`, `Vec<&T>`).
pub fn filter<T, I>(query: &str, items: I, fields: &[FieldAccessor<T>]) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    if query.is_empty() {
        return items.into_iter().collect();
    }

    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| matches_lowercased(&needle, item.borrow(), fields))
        .collect()
}

/// Filter using the record type's own display fields.
pub fn search<T, I>(query: &str, items: I) -> Vec<I::Item>
where
    T: Searchable,
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    filter(query, items, T::search_fields())
}

fn matches_lowercased<T>(needle: &str, item: &T, fields: &[FieldAccessor<T>]) -> bool {
    fields
        .iter()
        .any(|field| field(item).to_lowercase().contains(needle))
}

fn snippet_title(s: &Snippet) -> &str {
    &s.title
}

fn snippet_language(s: &Snippet) -> &str {
    &s.language
}

impl Searchable for Snippet {
    fn search_fields() -> &'static [FieldAccessor<Self>] {
        &[snippet_title, snippet_language]
    }
}

fn config_name(c: &ToolConfig) -> &str {
    &c.name
}

fn config_tool(c: &ToolConfig) -> &str {
    c.tool.as_str()
}

impl Searchable for ToolConfig {
    fn search_fields() -> &'static [FieldAccessor<Self>] {
        &[config_name, config_tool]
    }
}
