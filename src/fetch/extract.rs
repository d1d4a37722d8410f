//! Record extraction and validation from directory search payloads
//!
//! The search endpoint returns JSON of the shape
//! `{ "searchResult": { "results": [...], "totalPages": N } }`. Each result is
//! flattened into a [`BusinessRecord`]; fields the payload does not carry stay
//! empty. Validation mirrors the inclusion criteria: keyword in the business
//! name, allowed state, and minimally plausible address, city, and postal code.

use crate::config::FilterConfig;
use crate::records::BusinessRecord;
use serde_json::Value;

/// Returns true if `name` contains any of the keywords, case-insensitively
pub fn contains_keyword(name: &str, keywords: &[String]) -> bool {
    let lowered = name.to_lowercase();
    keywords.iter().any(|k| lowered.contains(&k.to_lowercase()))
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Checks a raw result against the record inclusion filters
pub fn record_passes_filters(result: &Value, filters: &FilterConfig) -> bool {
    let name = str_field(result, "businessName");
    if name.len() < filters.min_business_name_length
        || !contains_keyword(&name, &filters.keywords)
    {
        return false;
    }

    let state = str_field(result, "state").to_uppercase();
    if !filters.states.iter().any(|s| s == &state) {
        return false;
    }

    if str_field(result, "address").len() < filters.min_address_length {
        return false;
    }

    if str_field(result, "city").len() < 2 {
        return false;
    }

    if str_field(result, "postalcode").is_empty() {
        return false;
    }

    true
}

/// Flattens a raw search result into a [`BusinessRecord`]
///
/// Relative report URLs are absolutized against `base_url`. Phone comes from the
/// first entry of the payload's phone array; categories are joined with "; ".
pub fn extract_record(result: &Value, base_url: &str) -> BusinessRecord {
    let phone = result
        .get("phone")
        .and_then(Value::as_array)
        .and_then(|phones| phones.first())
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    let business_categories = result
        .get("categories")
        .and_then(Value::as_array)
        .map(|categories| {
            categories
                .iter()
                .filter_map(|c| c.get("name").and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default();

    let mut source_url = str_field(result, "reportUrl");
    if !source_url.is_empty() && !source_url.starts_with("http") {
        source_url = format!("{}{}", base_url.trim_end_matches('/'), source_url);
    }

    BusinessRecord {
        business_name: str_field(result, "businessName"),
        street_address: str_field(result, "address"),
        city: str_field(result, "city"),
        state: str_field(result, "state").to_uppercase(),
        postal_code: str_field(result, "postalcode"),
        phone,
        business_categories,
        source_url,
        ..Default::default()
    }
}
