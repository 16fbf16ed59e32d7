use std::collections::HashMap;

use crate::query::PostFilter;

/// Query parameters of the home page's filter form.
#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    /// True when the filter form was submitted at all; an empty submission
    /// still counts (it clears the filters).
    pub fn has_filter(&self) -> bool {
        self.items.contains_key("title") || self.items.contains_key("q")
    }

    pub fn get_filter(&self) -> PostFilter {
        let title = self.items.get("title").map(|t| t.as_str());
        let search = self.items.get("q").map(|q| q.as_str()).unwrap_or("");
        PostFilter::new(title, search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let qs = QueryString::from("title=Rome+Day+1&q=gelato");
        assert!(qs.has_filter());
        let filter = qs.get_filter();
        assert_eq!(filter.title, Some("Rome Day 1".to_string()));
        assert_eq!(filter.search, "gelato");
    }

    #[test]
    fn test_empty_submission_clears() {
        let qs = QueryString::from("title=&q=");
        assert!(qs.has_filter());
        assert_eq!(qs.get_filter(), PostFilter::default());
    }

    #[test]
    fn test_no_filter_params() {
        let qs = QueryString::from("");
        assert!(!qs.has_filter());

        let qs = QueryString::from("page=2");
        assert!(!qs.has_filter());
    }

    #[test]
    fn test_urlencoded_values() {
        let qs = QueryString::from("q=cr%C3%A8me%20br%C3%BBl%C3%A9e");
        assert_eq!(qs.get_filter().search, "crème brûlée");
    }
}
