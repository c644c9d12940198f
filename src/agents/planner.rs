use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WebSearchItem {
    /// Your reasoning for why this search is important to the query
    pub reason: String,
    /// The search term to use for the web search
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WebSearchPlan {
    /// A list of web searches to perform to best answer the query
    pub searches: Vec<WebSearchItem>,
}

impl WebSearchPlan {
    /// Planner input for an enriched query
    pub fn prompt(query: &str, how_many: usize) -> String {
        format!(
            "Query:\n{}\n\nPlan exactly {} web searches.",
            query.trim(),
            how_many
        )
    }

    /// Drop blank and duplicate search terms, keep at most `limit`
    pub fn normalized(self, limit: usize) -> Vec<WebSearchItem> {
        let mut seen = std::collections::HashSet::new();
        self.searches
            .into_iter()
            .filter(|item| !item.query.trim().is_empty())
            .filter(|item| seen.insert(item.query.trim().to_lowercase()))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(query: &str) -> WebSearchItem {
        WebSearchItem {
            reason: "because".to_string(),
            query: query.to_string(),
        }
    }

    #[test]
    fn test_normalized_drops_blank_and_duplicates() {
        let plan = WebSearchPlan {
            searches: vec![item("housing prices"), item("  "), item("Housing Prices"), item("commute")],
        };
        let searches = plan.normalized(5);
        assert_eq!(searches, vec![item("housing prices"), item("commute")]);
    }

    #[test]
    fn test_normalized_respects_limit() {
        let plan = WebSearchPlan {
            searches: vec![item("a"), item("b"), item("c")],
        };
        assert_eq!(plan.normalized(2).len(), 2);
    }

    #[test]
    fn test_prompt_mentions_count() {
        let prompt = WebSearchPlan::prompt("  remote work  ", 4);
        assert!(prompt.starts_with("Query:\nremote work\n"));
        assert!(prompt.contains("exactly 4 web searches"));
    }
}
