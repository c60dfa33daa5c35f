use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::generator::state::PipelineState;

pub mod citation;
pub mod report;

pub use citation::{Reference, cite, collect_references, format_citation};
pub use report::{ConsoleObserver, render_report};

/// 运行结果的输出方式
pub trait Outlet {
    /// 保存文章，返回写入的位置
    fn save(&self, state: &PipelineState) -> Result<PathBuf>;
}

/// 把主题转换为可用作文件名的片段
///
/// 空白折叠为 `_`，去掉文件名中不安全的字符；结果为空时使用 `article`。
pub fn topic_slug(topic: &str) -> String {
    let joined = topic.split_whitespace().collect::<Vec<_>>().join("_");
    let slug: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let slug = slug.trim_matches('.').to_string();

    if slug.is_empty() {
        String::from("article")
    } else {
        slug
    }
}

/// 文章导出文件名：`<slug>_article.txt`
pub fn article_file_name(topic: &str) -> String {
    format!("{}_article.txt", topic_slug(topic))
}

/// 把文章以纯文本写入输出目录
pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Outlet for DiskOutlet {
    fn save(&self, state: &PipelineState) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory: {:?}",
            self.output_dir
        ))?;

        let output_file_path = self.output_dir.join(article_file_name(&state.topic));
        fs::write(&output_file_path, &state.article).context(format!(
            "Failed to write article: {:?}",
            output_file_path
        ))?;

        info!(path = %output_file_path.display(), "article exported");
        Ok(output_file_path)
    }
}
