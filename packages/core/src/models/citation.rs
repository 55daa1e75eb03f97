//! Citation Records
//!
//! Bibliographic metadata attached to a node, in CSL-JSON shape
//! (Citation Style Language). Fields the model doesn't know about are kept
//! in a flattened passthrough map so third-party citation data survives a
//! round trip untouched.

use serde::{Deserialize, Serialize};

/// `issued` date of a citation: CSL's array-of-arrays `date-parts`
/// (`[[year, month, day]]`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssuedDate {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<i32>>,
}

/// One citation record in CSL-JSON shape.
///
/// A record is only treated as well formed when [`Citation::is_valid`]
/// holds: `type`, `title` and a non-empty `issued.date-parts` entry.
/// Records failing that check are still stored and serialized — they are
/// only excluded from rendering paths such as
/// `SymthinkDocument::get_showable_sources`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<CitationAuthor>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<IssuedDate>,

    #[serde(rename = "container-title", skip_serializing_if = "Option::is_none")]
    pub container_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Anything else the citation carried (`id`, `DOI`, ...), preserved
    /// verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// CSL author entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CitationAuthor {
    pub family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
}

impl Citation {
    /// Shape check for a renderable citation: requires `type`, `title` and
    /// a non-empty first `issued.date-parts` array.
    pub fn is_valid(&self) -> bool {
        self.kind.is_some()
            && self.title.is_some()
            && self
                .issued
                .as_ref()
                .and_then(|issued| issued.date_parts.first())
                .is_some_and(|parts| !parts.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_citation() -> Citation {
        serde_json::from_value(json!({
            "type": "webpage",
            "title": "A source",
            "issued": {"date-parts": [[2023, 5, 1]]},
            "URL": "https://example.org/a"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_shape() {
        assert!(valid_citation().is_valid());
    }

    #[test]
    fn test_missing_title_is_invalid() {
        let mut citation = valid_citation();
        citation.title = None;
        assert!(!citation.is_valid());
    }

    #[test]
    fn test_empty_date_parts_is_invalid() {
        let mut citation = valid_citation();
        citation.issued = Some(IssuedDate { date_parts: vec![] });
        assert!(!citation.is_valid());
        citation.issued = Some(IssuedDate {
            date_parts: vec![vec![]],
        });
        assert!(!citation.is_valid());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let value = json!({
            "id": "cite-1",
            "type": "book",
            "title": "T",
            "issued": {"date-parts": [[1999]]},
            "DOI": "10.1000/xyz"
        });
        let citation: Citation = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(citation.extra["id"], json!("cite-1"));
        assert_eq!(citation.extra["DOI"], json!("10.1000/xyz"));
        assert_eq!(serde_json::to_value(&citation).unwrap(), value);
    }

    #[test]
    fn test_wire_renames() {
        let citation = Citation {
            kind: Some("webpage".into()),
            url: Some("https://example.org".into()),
            container_title: Some("Journal".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&citation).unwrap();
        assert_eq!(value["type"], json!("webpage"));
        assert_eq!(value["URL"], json!("https://example.org"));
        assert_eq!(value["container-title"], json!("Journal"));
    }
}
