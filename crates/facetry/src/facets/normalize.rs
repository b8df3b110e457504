//! Maps the historical spellings of facet fields onto [`FacetDraft`].
//!
//! Generator output has used three key styles for the same field: the
//! canonical snake_case name, the lettered export header
//! (`"C. Filter Attributes"`) and the bare header (`"Filter Attributes"`).
//! Lookups try them in that order. Nothing downstream sees the variants.

use serde_json::{Map, Value};

use super::facet::{FacetDraft, Priority};

struct Field {
    canonical: &'static str,
    lettered: &'static str,
    human: &'static str,
}

const CATEGORY_ID: Field = Field {
    canonical: "category_id",
    lettered: "A. Category ID",
    human: "Category ID",
};
const FACET_NAME: Field = Field {
    canonical: "facet_name",
    lettered: "C. Filter Attributes",
    human: "Filter Attributes",
};
const POSSIBLE_VALUES: Field = Field {
    canonical: "possible_values",
    lettered: "D. Possible Values",
    human: "Possible Values",
};
const FILLING: Field = Field {
    canonical: "filling_percentage",
    lettered: "E. Filling Percentage",
    human: "Filling Percentage",
};
const PRIORITY: Field = Field {
    canonical: "priority",
    lettered: "F. Priority",
    human: "Priority",
};
const CONFIDENCE: Field = Field {
    canonical: "confidence_score",
    lettered: "G. Confidence Score",
    human: "Confidence Score",
};
const NUM_SOURCES: Field = Field {
    canonical: "num_sources",
    lettered: "H. Number of Sources",
    human: "Number of Sources",
};
const SOURCE_URLS: Field = Field {
    canonical: "source_urls",
    lettered: "I. Source URLs",
    human: "Source URLs",
};

fn lookup<'a>(obj: &'a Map<String, Value>, field: &Field) -> Option<&'a Value> {
    [field.canonical, field.lettered, field.human]
        .into_iter()
        .filter_map(|key| obj.get(key))
        .find(|v| !v.is_null())
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads a number, accepting numeric strings such as `"85%"`.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn urls(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalizes one raw facet object.
///
/// `default_category` is used when the object names no category. Returns
/// `None` for non-objects and for rows with no facet name or category.
pub fn normalize(raw: &Value, default_category: Option<&str>) -> Option<FacetDraft> {
    let obj = raw.as_object()?;

    let facet_name = text(lookup(obj, &FACET_NAME));
    if facet_name.is_empty() {
        return None;
    }
    let category_id = match text(lookup(obj, &CATEGORY_ID)) {
        id if !id.is_empty() => id,
        _ => default_category?.to_string(),
    };

    let urls = urls(lookup(obj, &SOURCE_URLS));
    let num_sources = number(lookup(obj, &NUM_SOURCES))
        .map(|n| n.max(0.0).round() as u32)
        .unwrap_or(urls.len() as u32);

    Some(FacetDraft {
        category_id,
        facet_name,
        possible_values: text(lookup(obj, &POSSIBLE_VALUES)),
        filling_percentage: number(lookup(obj, &FILLING))
            .unwrap_or(0.0)
            .clamp(0.0, 100.0),
        priority: Priority::parse_lenient(&text(lookup(obj, &PRIORITY))),
        confidence_score: number(lookup(obj, &CONFIDENCE))
            .unwrap_or(1.0)
            .round()
            .clamp(1.0, 10.0) as u8,
        num_sources,
        source_urls: urls,
    })
}

/// Normalizes every usable object in `raw`, dropping the rest.
pub fn normalize_all(raw: &[Value], default_category: Option<&str>) -> Vec<FacetDraft> {
    let drafts: Vec<FacetDraft> = raw
        .iter()
        .filter_map(|v| normalize(v, default_category))
        .collect();
    if drafts.len() < raw.len() {
        tracing::warn!(
            dropped = raw.len() - drafts.len(),
            "Discarded facet rows without a name or category"
        );
    }
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_keys() {
        let draft = normalize(
            &json!({
                "category_id": "c1",
                "facet_name": "Size",
                "possible_values": ["S", "M", "L"],
                "filling_percentage": 92.5,
                "priority": "high",
                "confidence_score": 8,
                "num_sources": 2,
                "source_urls": ["https://a", "https://b"]
            }),
            None,
        )
        .unwrap();
        assert_eq!(draft.category_id, "c1");
        assert_eq!(draft.possible_values, "S, M, L");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.confidence_score, 8);
        assert_eq!(draft.source_urls.len(), 2);
    }

    #[test]
    fn test_lettered_and_human_variants() {
        let lettered = normalize(
            &json!({
                "C. Filter Attributes": "Color",
                "E. Filling Percentage": "75%",
                "F. Priority": "Low",
                "G. Confidence Score": "6"
            }),
            Some("c9"),
        )
        .unwrap();
        let human = normalize(
            &json!({
                "Filter Attributes": "Color",
                "Filling Percentage": 75,
                "Priority": "LOW",
                "Confidence Score": 6
            }),
            Some("c9"),
        )
        .unwrap();
        assert_eq!(lettered, human);
        assert_eq!(lettered.category_id, "c9");
        assert_eq!(lettered.filling_percentage, 75.0);
    }

    #[test]
    fn test_canonical_wins_over_variants() {
        let draft = normalize(
            &json!({"facet_name": "Canon", "Filter Attributes": "Human"}),
            Some("c1"),
        )
        .unwrap();
        assert_eq!(draft.facet_name, "Canon");
    }

    #[test]
    fn test_clamps_and_defaults() {
        let draft = normalize(
            &json!({
                "facet_name": "Material",
                "confidence_score": 42,
                "filling_percentage": -5,
                "source_urls": "https://a, https://b"
            }),
            Some("c1"),
        )
        .unwrap();
        assert_eq!(draft.confidence_score, 10);
        assert_eq!(draft.filling_percentage, 0.0);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.num_sources, 2);

        let low = normalize(&json!({"facet_name": "X", "confidence_score": 0}), Some("c1")).unwrap();
        assert_eq!(low.confidence_score, 1);
    }

    #[test]
    fn test_rejects_unusable_rows() {
        assert!(normalize(&json!({"priority": "High"}), Some("c1")).is_none());
        assert!(normalize(&json!({"facet_name": "Size"}), None).is_none());
        assert!(normalize(&json!("Size"), Some("c1")).is_none());
        assert_eq!(
            normalize_all(&[json!({"facet_name": "Size"}), json!(null)], Some("c1")).len(),
            1
        );
    }
}
