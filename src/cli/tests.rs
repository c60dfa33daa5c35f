#[cfg(test)]
mod tests {
    use crate::cli::{Args, next_topic};
    use crate::config::LLMProvider;
    use crate::generator::state::{Depth, Style};
    use crate::i18n::TargetLanguage;
    use crate::research::SearchEngine;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, BufReader};

    /// 空的临时配置文件，避免读到工作目录下的 quill.toml
    fn empty_config() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quill.toml");
        std::fs::write(&path, "").unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["quill", "Artificial Intelligence"]).unwrap();

        assert_eq!(args.topic.as_deref(), Some("Artificial Intelligence"));
        assert!(!args.interactive);
        assert!(!args.no_export);
        assert!(!args.check_connection);
        assert!(!args.verbose);
        assert!(args.config.is_none());
        assert!(args.output_path.is_none());
    }

    #[test]
    fn test_topic_required_without_interactive() {
        assert!(Args::try_parse_from(["quill"]).is_err());
        assert!(Args::try_parse_from(["quill", "--interactive"]).is_ok());
        assert!(Args::try_parse_from(["quill", "--check-connection"]).is_ok());
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from([
            "quill", "Rust", "-l", "hi", "-d", "detailed", "-s", "opinionated", "-e", "ddg", "-o",
            "/tmp/out", "-v",
        ])
        .unwrap();

        assert_eq!(args.language.as_deref(), Some("hi"));
        assert_eq!(args.depth.as_deref(), Some("detailed"));
        assert_eq!(args.style.as_deref(), Some("opinionated"));
        assert_eq!(args.engine.as_deref(), Some("ddg"));
        assert_eq!(args.output_path, Some(PathBuf::from("/tmp/out")));
        assert!(args.verbose);
    }

    #[test]
    fn test_into_config_applies_overrides() {
        let (_temp_dir, path) = empty_config();
        let config_arg = path.to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "quill",
            "Rust",
            "--config",
            config_arg.as_str(),
            "--language",
            "Tamil",
            "--depth",
            "detailed",
            "--style",
            "opinionated",
            "--engine",
            "serper",
            "--output-path",
            "/tmp/articles",
            "--no-export",
            "--halt-on-empty-research",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.target_language, TargetLanguage::Tamil);
        assert_eq!(config.depth, Depth::Detailed);
        assert_eq!(config.style, Style::Opinionated);
        assert_eq!(config.search_engine, SearchEngine::Serper);
        assert_eq!(config.output_path, PathBuf::from("/tmp/articles"));
        assert!(!config.export_article);
        assert!(config.halt_on_empty_research);
    }

    #[test]
    fn test_into_config_llm_options() {
        let (_temp_dir, path) = empty_config();
        let config_arg = path.to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "quill",
            "Rust",
            "--config",
            config_arg.as_str(),
            "--llm-provider",
            "openai",
            "--llm-api-key",
            "sk-test",
            "--llm-api-base-url",
            "https://api.openai.com/v1",
            "--model-efficient",
            "gpt-4o-mini",
            "--model-powerful",
            "gpt-4o",
            "--max-tokens",
            "4096",
            "--temperature",
            "0.2",
            "--serper-api-key",
            "serper-test",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.model_efficient, "gpt-4o-mini");
        assert_eq!(config.llm.model_powerful, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.search.serper_api_key, "serper-test");
    }

    #[test]
    fn test_into_config_keeps_values_on_unknown_input() {
        let (_temp_dir, path) = empty_config();
        let config_arg = path.to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "quill",
            "Rust",
            "--config",
            config_arg.as_str(),
            "--language",
            "klingon",
            "--engine",
            "bing",
            "--llm-provider",
            "mystery",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.target_language, TargetLanguage::English);
        assert_eq!(config.search_engine, SearchEngine::Wikipedia);
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_into_config_missing_config_file_is_error() {
        let args =
            Args::try_parse_from(["quill", "Rust", "--config", "/nonexistent/quill.toml"]).unwrap();
        assert!(args.into_config().is_err());
    }

    #[tokio::test]
    async fn test_next_topic_trims_input() {
        let mut lines = BufReader::new("  Rust language \nGo\n".as_bytes()).lines();

        let first = next_topic(&mut lines, std::future::pending()).await.unwrap();
        let second = next_topic(&mut lines, std::future::pending()).await.unwrap();
        let end = next_topic(&mut lines, std::future::pending()).await.unwrap();

        assert_eq!(first.as_deref(), Some("Rust language"));
        assert_eq!(second.as_deref(), Some("Go"));
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_next_topic_empty_line_ends_session() {
        let mut lines = BufReader::new("   \nRust\n".as_bytes()).lines();
        assert_eq!(
            next_topic(&mut lines, std::future::pending()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_next_topic_interrupt_while_waiting() {
        // 写端保持打开，读取会一直挂起
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        assert_eq!(
            next_topic(&mut lines, std::future::ready(())).await.unwrap(),
            None
        );
    }
}
