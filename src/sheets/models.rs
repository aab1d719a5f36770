use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `ValueRange` resource of the Sheets v4 API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn rows(range: &str, values: Vec<Vec<Value>>) -> Self {
        Self {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<SheetRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRequest {
    pub add_sheet: AddSheetRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetProperties {
    pub title: String,
}

impl BatchUpdateRequest {
    pub fn add_sheet(title: &str) -> Self {
        Self {
            requests: vec![SheetRequest {
                add_sheet: AddSheetRequest {
                    properties: SheetProperties {
                        title: title.to_string(),
                    },
                },
            }],
        }
    }
}

/// Quote a tab title for A1 notation: `2019-12` becomes `'2019-12'`.
pub fn quote_tab(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Join a tab title and a suffix such as `!A1` or `!X2:AA` into an A1 range.
pub fn a1_range(title: &str, suffix: &str) -> String {
    if suffix.starts_with('!') {
        format!("{}{}", quote_tab(title), suffix)
    } else {
        format!("{}!{}", quote_tab(title), suffix)
    }
}
