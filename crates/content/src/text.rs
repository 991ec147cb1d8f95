use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Default cap for display titles.
pub const DEFAULT_TITLE_MAX_LENGTH: usize = 60;

const ELLIPSIS: &str = "...";

/// Normalize a language tag: primary subtag lowercased, region uppercased,
/// anything after left untouched (`EN-gb` → `en-GB`).
pub fn format_language_code(raw: &str) -> String {
    raw.trim()
        .split('-')
        .enumerate()
        .map(|(position, segment)| match position {
            0 => segment.to_ascii_lowercase(),
            1 => segment.to_ascii_uppercase(),
            _ => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Text content of an HTML fragment: markup dropped, character references
/// decoded, text of every element concatenated in document order.
pub fn strip_html(raw: &str) -> String {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let dom = parse_document(RcDom::default(), opts).one(raw);
    let mut text = String::with_capacity(raw.len());
    collect_text(&dom.document, &mut text);
    text
}

fn collect_text(handle: &Handle, text: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Document | NodeData::Element { .. } => {
            for child in handle.children.borrow().iter() {
                collect_text(child, text);
            }
        }
        _ => {}
    }
}

/// Plain-text title capped at `max_length` characters; longer titles are cut
/// and end in `...`.
pub fn create_title(raw: &str, max_length: usize) -> String {
    let title = strip_html(raw);
    if title.chars().count() <= max_length {
        return title;
    }
    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut cut: String = title.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}
