use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// Query-string values arrive as strings, and `serde(flatten)` makes the
// urlencoded deserializer hand them over as strings too, so numeric fields
// must parse rather than deserialize directly.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub total: i64,
    pub limit: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(20),
            page: Some(1),
        }
    }
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams {
            limit: Some(1000),
            page: None,
        };
        assert_eq!(params.limit(), 100);

        let params = PaginationParams {
            limit: Some(0),
            page: None,
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn offset_follows_page() {
        let params = PaginationParams {
            limit: Some(20),
            page: Some(3),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn deserializes_string_values() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit":"25","page":"2"}"#).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.page(), 2);
    }

    #[test]
    fn deserializes_empty_strings_as_defaults() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit":"","page":""}"#).unwrap();
        assert_eq!(params.limit(), 20);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn deserializes_missing_fields_as_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit(), 20);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(serde_json::from_str::<PaginationParams>(r#"{"limit":"abc"}"#).is_err());
    }
}
