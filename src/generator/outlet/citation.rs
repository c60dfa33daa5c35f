//! APA 风格的引用格式

use chrono::{Datelike, Local};
use tracing::debug;

use crate::research::EncyclopediaSource;

/// 一条参考资料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub citation: String,
}

/// `<title>. (<year>). Retrieved from <url>`
pub fn format_citation(title: &str, url: &str, year: i32) -> String {
    format!("{}. ({}). Retrieved from {}", title, year, url)
}

/// 使用当前年份格式化引用
pub fn cite(title: &str, url: &str) -> String {
    format_citation(title, url, Local::now().year())
}

/// 引用标题：百科链接反查页面标题，其余链接以及任何反查失败都使用链接本身
pub async fn resolve_citation_title(source: &dyn EncyclopediaSource, url: &str) -> String {
    if !url.contains("wikipedia.org") {
        return url.to_string();
    }
    match source.title_for_url(url).await {
        Ok(title) => title,
        Err(err) => {
            debug!(url, error = %err, "citation title lookup failed");
            url.to_string()
        }
    }
}

/// 为检索得到的链接逐条生成引用，保持原有顺序
pub async fn collect_references(
    source: &dyn EncyclopediaSource,
    links: &[String],
) -> Vec<Reference> {
    let mut references = Vec::with_capacity(links.len());
    for url in links {
        let title = resolve_citation_title(source, url).await;
        references.push(Reference {
            url: url.clone(),
            citation: cite(&title, url),
        });
    }
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::LookupError;
    use crate::research::wikipedia::WikiPage;
    use async_trait::async_trait;

    struct TitleSource;

    #[async_trait]
    impl EncyclopediaSource for TitleSource {
        async fn summary(&self, title: &str) -> Result<String, LookupError> {
            Err(LookupError::NotFound(title.to_string()))
        }

        async fn page(&self, title: &str) -> Result<WikiPage, LookupError> {
            Err(LookupError::NotFound(title.to_string()))
        }

        async fn search(&self, _query: &str) -> Result<Vec<String>, LookupError> {
            Ok(Vec::new())
        }

        async fn title_for_url(&self, url: &str) -> Result<String, LookupError> {
            if url.ends_with("/Rust_(programming_language)") {
                Ok("Rust (programming language)".to_string())
            } else {
                Err(LookupError::Transport("offline".to_string()))
            }
        }
    }

    #[test]
    fn test_format_citation() {
        assert_eq!(
            format_citation("X", "http://y", 2024),
            "X. (2024). Retrieved from http://y"
        );
    }

    #[test]
    fn test_cite_uses_current_year() {
        let year = Local::now().year();
        assert_eq!(
            cite("X", "http://y"),
            format!("X. ({}). Retrieved from http://y", year)
        );
    }

    #[tokio::test]
    async fn test_wikipedia_links_resolve_to_page_title() {
        let title = resolve_citation_title(
            &TitleSource,
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        )
        .await;
        assert_eq!(title, "Rust (programming language)");
    }

    #[tokio::test]
    async fn test_failed_lookup_falls_back_to_url() {
        let url = "https://en.wikipedia.org/wiki/Unknown";
        assert_eq!(resolve_citation_title(&TitleSource, url).await, url);
    }

    #[tokio::test]
    async fn test_other_links_use_url_as_title() {
        let references =
            collect_references(&TitleSource, &["https://example.com/a".to_string()]).await;

        assert_eq!(references.len(), 1);
        assert_eq!(references[0].url, "https://example.com/a");
        assert!(
            references[0]
                .citation
                .starts_with("https://example.com/a. (")
        );
        assert!(
            references[0]
                .citation
                .ends_with("Retrieved from https://example.com/a")
        );
    }
}
