//! Wikipedia 百科检索
//!
//! [`WikipediaApi`] 是对 MediaWiki Action API 的薄封装（摘要、页面、搜索），
//! [`WikipediaProvider`] 在其之上实现消歧义与缺页的兜底策略。

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::SearchConfig;
use crate::research::{ResearchProvider, ResearchResult};

/// 缺页且搜索无结果时返回的提示信息
pub const NO_MATCH_MESSAGE: &str = "No Wikipedia page found, and no close matches found. Please try a different or more specific topic.";

/// 百科源查询错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// 一个标题对应多个候选页面
    #[error("\"{title}\" may refer to: {}", .options.join(", "))]
    Disambiguation { title: String, options: Vec<String> },
    #[error("Page \"{0}\" does not match any pages")]
    NotFound(String),
    #[error("{0}")]
    Transport(String),
}

/// 百科页面信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub url: String,
    pub images: Vec<String>,
}

/// 百科源接口
#[async_trait]
pub trait EncyclopediaSource: Send + Sync {
    /// 获取页面摘要（纯文本，句数受配置限制）
    async fn summary(&self, title: &str) -> Result<String, LookupError>;

    /// 获取页面的规范地址与图片
    async fn page(&self, title: &str) -> Result<WikiPage, LookupError>;

    /// 关键词搜索，按相关度返回页面标题
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError>;

    /// 根据页面地址反查页面标题
    async fn title_for_url(&self, url: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<ApiQuery>,
    #[serde(default)]
    parse: Option<ApiParse>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// `action=parse` 的结果，`text` 为渲染后的页面 HTML
#[derive(Debug, Deserialize)]
struct ApiParse {
    title: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: Vec<ApiPage>,
    #[serde(default)]
    search: Vec<ApiSearchHit>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<ApiPageProps>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    original: Option<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiPageProps {
    #[serde(default)]
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    source: String,
}

#[derive(Debug, Deserialize)]
struct ApiSearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

/// MediaWiki Action API 客户端
#[derive(Clone)]
pub struct WikipediaApi {
    client: reqwest::Client,
    endpoint: String,
    sentences: u32,
}

impl WikipediaApi {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.wikipedia_endpoint.clone(),
            sentences: config.wikipedia_sentences,
        }
    }

    async fn request(
        &self,
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, LookupError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", action), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Transport(format!(
                "Wikipedia API returned status {}",
                status.as_u16()
            )));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(LookupError::Transport(format!(
                "Wikipedia API error {}: {}",
                error.code, error.info
            )));
        }

        Ok(body)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<ApiQuery, LookupError> {
        let body = self.request("query", params).await?;
        Ok(body.query.unwrap_or_default())
    }

    /// 取查询结果中的唯一页面，缺页时返回 NotFound
    fn single_page(query: ApiQuery, title: &str) -> Result<ApiPage, LookupError> {
        match query.pages.into_iter().next() {
            Some(page) if !page.missing && !page.invalid => Ok(page),
            _ => Err(LookupError::NotFound(title.to_string())),
        }
    }

    /// 消歧义页上列出的候选标题，保持页面上的顺序
    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>, LookupError> {
        let body = self
            .request(
                "parse",
                &[("page", title), ("prop", "text"), ("redirects", "1")],
            )
            .await?;
        let parsed = body
            .parse
            .ok_or_else(|| LookupError::NotFound(title.to_string()))?;
        debug!(title = %parsed.title, "parsed disambiguation page");
        Ok(disambiguation_candidates(&parsed.text))
    }
}

/// 从消歧义页 HTML 中按出现顺序取出候选：每个列表项的第一个链接文字，跳过目录项
fn disambiguation_candidates(html: &str) -> Vec<String> {
    let (Ok(li_selector), Ok(a_selector)) = (Selector::parse("li"), Selector::parse("a")) else {
        return Vec::new();
    };
    let document = Html::parse_fragment(html);

    document
        .select(&li_selector)
        .filter(|li| {
            !li.value()
                .classes()
                .any(|class| class.contains("tocsection"))
        })
        .filter_map(|li| li.select(&a_selector).next())
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[async_trait]
impl EncyclopediaSource for WikipediaApi {
    async fn summary(&self, title: &str) -> Result<String, LookupError> {
        let sentences = self.sentences.to_string();
        let query = self
            .query(&[
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exsentences", sentences.as_str()),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        let page = Self::single_page(query, title)?;

        let is_disambiguation = page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some());
        if is_disambiguation {
            let options = self.disambiguation_options(&page.title).await?;
            debug!(title = %page.title, candidates = options.len(), "disambiguation page");
            return Err(LookupError::Disambiguation {
                title: page.title,
                options,
            });
        }

        Ok(page.extract.unwrap_or_default().trim().to_string())
    }

    async fn page(&self, title: &str) -> Result<WikiPage, LookupError> {
        let query = self
            .query(&[
                ("prop", "info|pageimages"),
                ("inprop", "url"),
                ("piprop", "original"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        let page = Self::single_page(query, title)?;

        let url = page
            .fullurl
            .ok_or_else(|| LookupError::Transport(format!("page \"{}\" has no url", title)))?;
        let images = page.original.map(|image| image.source).into_iter().collect();

        Ok(WikiPage {
            title: page.title,
            url,
            images,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let result = self
            .query(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "10"),
                ("srprop", ""),
            ])
            .await?;
        Ok(result.search.into_iter().map(|hit| hit.title).collect())
    }

    async fn title_for_url(&self, url: &str) -> Result<String, LookupError> {
        let slug = url
            .split("/wiki/")
            .nth(1)
            .map(|rest| rest.split(['#', '?']).next().unwrap_or(rest))
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| LookupError::NotFound(url.to_string()))?;
        let decoded = urlencoding::decode(slug)
            .map_err(|e| LookupError::Transport(e.to_string()))?
            .replace('_', " ");

        let query = self
            .query(&[("prop", "info"), ("redirects", "1"), ("titles", decoded.as_str())])
            .await?;
        Ok(Self::single_page(query, &decoded)?.title)
    }
}

/// Wikipedia 检索提供方
pub struct WikipediaProvider<S> {
    source: S,
}

impl<S: EncyclopediaSource> WikipediaProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 摘要 + 页面，组成一次完整的命中
    async fn fetch_article(
        &self,
        title: &str,
    ) -> Result<(String, String, Option<String>), LookupError> {
        let summary = self.source.summary(title).await?;
        let page = self.source.page(title).await?;
        Ok((summary, page.url, page.images.into_iter().next()))
    }

    /// 消歧义：确定性地取第一个候选
    async fn resolve_disambiguation(&self, topic: &str, options: Vec<String>) -> ResearchResult {
        let ambiguous = format!(
            "Disambiguation error: The topic '{}' is ambiguous. Please be more specific.",
            topic
        );

        let Some(first_option) = options.into_iter().next() else {
            return ResearchResult::failed(ambiguous);
        };

        match self.fetch_article(&first_option).await {
            Ok((summary, url, image_url)) => {
                info!(topic, substitute = %first_option, "resolved disambiguation to first candidate");
                let notice = format!(
                    "Disambiguation: Showing results for '{}' instead of ambiguous topic '{}'.",
                    first_option, topic
                );
                ResearchResult::found(format!("{}\n\n{}", notice, summary), vec![url], image_url)
            }
            Err(err) => {
                warn!(topic, candidate = %first_option, error = %err, "first disambiguation candidate failed");
                ResearchResult::failed(ambiguous)
            }
        }
    }

    /// 缺页：先用原始主题重试，再退回到搜索的第一条命中
    async fn resolve_missing_page(&self, topic: &str) -> ResearchResult {
        match self.fetch_article(topic).await {
            Ok((summary, url, image_url)) => {
                return ResearchResult::found(summary, vec![url], image_url);
            }
            Err(err) => debug!(topic, error = %err, "retry with original topic failed"),
        }

        let hits = match self.source.search(topic).await {
            Ok(hits) => hits,
            Err(err) => return ResearchResult::failed(format!("Error: {}", err)),
        };

        if let Some(first_hit) = hits.into_iter().next() {
            match self.fetch_article(&first_hit).await {
                Ok((summary, url, image_url)) => {
                    info!(topic, related = %first_hit, "using first search hit as related topic");
                    let notice = format!(
                        "No exact page found. Showing results for related topic '{}'.",
                        first_hit
                    );
                    return ResearchResult::found(
                        format!("{}\n\n{}", notice, summary),
                        vec![url],
                        image_url,
                    );
                }
                Err(err) => debug!(topic, hit = %first_hit, error = %err, "first search hit failed"),
            }
        }

        ResearchResult::informational(NO_MATCH_MESSAGE)
    }
}

#[async_trait]
impl<S: EncyclopediaSource> ResearchProvider for WikipediaProvider<S> {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    #[instrument(name = "research.wikipedia", skip(self))]
    async fn search(&self, topic: &str) -> ResearchResult {
        let normalized = topic.trim().replace(' ', "_");

        match self.fetch_article(&normalized).await {
            Ok((summary, url, image_url)) => ResearchResult::found(summary, vec![url], image_url),
            Err(LookupError::Disambiguation { options, .. }) => {
                self.resolve_disambiguation(topic, options).await
            }
            Err(LookupError::NotFound(_)) => self.resolve_missing_page(topic).await,
            Err(err) => {
                warn!(topic, error = %err, "wikipedia lookup failed");
                ResearchResult::failed(format!("Error: {}", err))
            }
        }
    }
}
