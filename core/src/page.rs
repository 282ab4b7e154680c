use serde::{Deserialize, Serialize};

/// Pagination envelope shared by every list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    /// Total item count. The backend serializes int64 as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
}

/// Common list-query parameters (page/size/filter).
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub page: Option<i32>,
    pub size: Option<i32>,
    pub query: Option<String>,
}

impl PageQuery {
    /// Render into query pairs, omitting unset fields.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        if let Some(query) = &self.query {
            pairs.push(("query".to_string(), query.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted() {
        let pairs = PageQuery {
            page: Some(2),
            size: None,
            query: Some("badge".to_string()),
        }
        .to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("query".to_string(), "badge".to_string())
            ]
        );
    }
}
