//! Aggregation of child reporting capabilities.
//!
//! Every function walks the records in order and asks each unit for one
//! capability. Empty slots and units without the capability contribute
//! nothing.

use content::text::strip_html;
use content::xapi::{ACTIVITY_TYPE_INTERACTION, FALLBACK_LANGUAGE, LanguageMap};
use content::{Definition, InteractionType, XapiData};
use serde_json::Value;

use crate::children::ChildRecord;
use crate::restore::empty_state;

/// Sum of child scores. Missing or non-finite scores count as 0.
pub fn total_score(records: &[ChildRecord]) -> f64 {
    records
        .iter()
        .filter_map(|record| record.instance()?.score())
        .filter(|score| score.is_finite())
        .sum()
}

/// Sum of child max scores. Missing or non-finite values count as 0.
pub fn total_max_score(records: &[ChildRecord]) -> f64 {
    records
        .iter()
        .filter_map(|record| record.instance()?.max_score())
        .filter(|score| score.is_finite())
        .sum()
}

pub fn any_answer_given(records: &[ChildRecord]) -> bool {
    records
        .iter()
        .any(|record| record.instance().and_then(|unit| unit.answer_given()) == Some(true))
}

/// One state per record, `{}` where a child has none. This is the list
/// [`state_for`](crate::restore::state_for) reads back.
pub fn collect_states(records: &[ChildRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|record| {
            record
                .instance()
                .and_then(|unit| unit.current_state())
                .unwrap_or_else(empty_state)
        })
        .collect()
}

pub fn reveal_solutions(records: &[ChildRecord]) {
    for unit in records.iter().filter_map(ChildRecord::instance) {
        unit.show_solutions();
    }
}

/// Child reports in child order; children without one are skipped.
pub fn child_reports(records: &[ChildRecord]) -> Vec<XapiData> {
    records
        .iter()
        .filter_map(|record| record.instance()?.xapi_data())
        .collect()
}

/// Statement definition for the aggregate. Name and description are keyed by
/// `language_tag` and duplicated under `en-US`.
pub fn definition(
    title: &str,
    description: &str,
    language_tag: &str,
    interaction_type: InteractionType,
) -> Definition {
    Definition {
        name: localized(language_tag, title),
        description: localized(language_tag, &strip_html(description)),
        activity_type: Some(ACTIVITY_TYPE_INTERACTION.to_owned()),
        interaction_type: Some(interaction_type),
        ..Definition::default()
    }
}

fn localized(language_tag: &str, text: &str) -> LanguageMap {
    let mut map = LanguageMap::new();
    map.insert(language_tag.to_owned(), text.to_owned());
    map.insert(FALLBACK_LANGUAGE.to_owned(), text.to_owned());
    map
}
