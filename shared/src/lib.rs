use serde::{Deserialize, Serialize};

/// A child profile with the ingredients to keep out of their snacks.
///
/// The `id` is assigned by the server on creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: i64,
    pub name: String,
    /// Free-text, comma-separated ingredient names to avoid for this child.
    #[serde(default)]
    pub exclusions: String,
}

impl Child {
    /// Split the free-text exclusions into individual ingredient terms.
    ///
    /// Terms are trimmed and empty entries are dropped, so "nuts, , dairy"
    /// yields `["nuts", "dairy"]`.
    pub fn exclusion_list(&self) -> Vec<String> {
        split_exclusions(&self.exclusions)
    }
}

/// Split a comma-separated exclusion string into trimmed, non-empty terms.
pub fn split_exclusions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// A transient snack recommendation. Not persisted until explicitly saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnackSuggestion {
    pub snack: String,
    pub image_url: String,
    /// True when an identical snack is already saved for the child a save
    /// action would target.
    #[serde(default)]
    pub exists: bool,
}

/// A snack previously saved for a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSnack {
    pub id: i64,
    pub snack: String,
    #[serde(default)]
    pub image_url: String,
}

/// Body of `POST /get_snack`: the selected child ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnackRequest {
    #[serde(default)]
    pub children: Vec<i64>,
}

/// Body of `POST /save_snack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnackRequest {
    pub child_id: i64,
    pub snack: String,
    #[serde(default)]
    pub image_url: String,
}

/// Body of `POST /api/children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub name: String,
    #[serde(default)]
    pub exclusions: String,
}

/// Body of `PUT /api/children/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateChildRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<String>,
}

/// Success envelope used by mutation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error envelope used by every endpoint on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response of `POST /api/children`: confirmation plus the created row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildResponse {
    pub message: String,
    pub child: Child,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_serializes_with_wire_field_names() {
        let child = Child {
            id: 3,
            name: "Maya".to_string(),
            exclusions: "nuts, dairy".to_string(),
        };
        let json = serde_json::to_value(&child).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Maya");
        assert_eq!(json["exclusions"], "nuts, dairy");
    }

    #[test]
    fn child_exclusions_default_to_empty() {
        let child: Child = serde_json::from_str(r#"{"id":1,"name":"Leo"}"#).unwrap();
        assert_eq!(child.exclusions, "");
        assert!(child.exclusion_list().is_empty());
    }

    #[test]
    fn exclusion_list_trims_and_drops_empty_terms() {
        let child = Child {
            id: 1,
            name: "Ana".to_string(),
            exclusions: " nuts ,, dairy , ".to_string(),
        };
        assert_eq!(child.exclusion_list(), vec!["nuts", "dairy"]);
    }

    #[test]
    fn suggestion_exists_defaults_to_false() {
        let suggestion: SnackSuggestion =
            serde_json::from_str(r#"{"snack":"Apple slices","image_url":"x"}"#).unwrap();
        assert!(!suggestion.exists);
    }

    #[test]
    fn snack_request_roundtrips_through_json() {
        let request = SnackRequest {
            children: vec![1, 4, 9],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"children":[1,4,9]}"#);
        let back: SnackRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn update_request_all_fields_optional() {
        let request: UpdateChildRequest = serde_json::from_str("{}").unwrap();
        assert!(request.name.is_none());
        assert!(request.exclusions.is_none());
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let request = UpdateChildRequest {
            name: Some("Ben".to_string()),
            exclusions: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"name":"Ben"}"#);
    }

    #[test]
    fn error_envelope_uses_error_field() {
        let envelope = ErrorResponse {
            error: "Child not found".to_string(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error"], "Child not found");
    }
}
