use crate::post::Post;

/// User-entered filters for the home view. Both compose with logical AND;
/// filtering never mutates the posts themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Exact title to keep; `None` is the "All" selector.
    pub title: Option<String>,
    /// Case-insensitive substring over title, location, tags, content and date.
    pub search: String,
}

impl PostFilter {
    pub fn new(title: Option<&str>, search: &str) -> Self {
        let title = match title.map(|t| t.trim()) {
            None | Some("") => None,
            Some(t) => Some(t.to_string()),
        };

        PostFilter {
            title,
            search: search.trim().to_string(),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(ref title) = self.title {
            if post.title.trim() != title {
                return false;
            }
        }

        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            if !post.search_blob().contains(&needle) {
                return false;
            }
        }

        true
    }
}

/// Newest first. The sort is stable, so posts sharing a date keep the
/// order the store returned them in.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

pub fn apply_filter(mut posts: Vec<Post>, filter: &PostFilter) -> Vec<Post> {
    posts.retain(|post| filter.matches(post));
    posts
}

/// Distinct trimmed titles of the visible posts, for the title selector.
pub fn title_options(posts: &[Post]) -> Vec<String> {
    let mut titles: Vec<String> = posts.iter()
        .map(|post| post.title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect();
    titles.sort();
    titles.dedup();
    titles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::sample_post;

    fn posts() -> Vec<Post> {
        vec![
            sample_post("1", "Rome Day 1", "2024-05-01", true),
            sample_post("2", "Rome Day 2", "2024-05-02", true),
            sample_post("3", "Florence Notes", "2024-05-03", false),
        ]
    }

    #[test]
    fn test_sort_newest_first() {
        let mut posts = posts();
        sort_newest_first(&mut posts);
        let dates: Vec<_> = posts.iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(posts[0].id.0, "3");
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut posts = vec![
            sample_post("a", "First", "2024-05-01", true),
            sample_post("b", "Second", "2024-05-01", true),
        ];
        sort_newest_first(&mut posts);
        assert_eq!(posts[0].id.0, "a");
        assert_eq!(posts[1].id.0, "b");
    }

    #[test]
    fn test_title_filter() {
        let filter = PostFilter::new(Some("Rome Day 1"), "");
        let kept = apply_filter(posts(), &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, "1");

        // "All" keeps everything
        let all = PostFilter::new(None, "");
        assert_eq!(apply_filter(posts(), &all).len(), 3);
        let all = PostFilter::new(Some("  "), "");
        assert_eq!(apply_filter(posts(), &all).len(), 3);
    }

    #[test]
    fn test_search_filter() {
        let filter = PostFilter::new(None, "  FLORENCE ");
        let kept = apply_filter(posts(), &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, "3");

        // matches the date string too
        let filter = PostFilter::new(None, "2024-05-02");
        let kept = apply_filter(posts(), &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, "2");

        // no post mentions gelato flavors
        let filter = PostFilter::new(None, "stracciatella");
        assert!(apply_filter(posts(), &filter).is_empty());
    }

    #[test]
    fn test_filters_compose_with_and() {
        let filter = PostFilter::new(Some("Rome Day 1"), "florence");
        assert!(apply_filter(posts(), &filter).is_empty());

        let filter = PostFilter::new(Some("Rome Day 1"), "rome");
        assert_eq!(apply_filter(posts(), &filter).len(), 1);
    }

    #[test]
    fn test_filter_idempotence() {
        let filter = PostFilter::new(Some("Rome Day 2"), "rome");
        let once = apply_filter(posts(), &filter);
        let twice = apply_filter(once.clone(), &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_title_options() {
        let mut posts = posts();
        posts.push(sample_post("4", "Rome Day 1", "2024-05-04", true));
        posts.push(sample_post("5", "   ", "2024-05-05", true));
        let options = title_options(&posts);
        assert_eq!(options, ["Florence Notes", "Rome Day 1", "Rome Day 2"]);
    }
}
