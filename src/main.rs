use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use quill_rs::cli::{Args, next_topic};
use quill_rs::generator::context::GeneratorContext;
use quill_rs::generator::outlet::{
    ConsoleObserver, DiskOutlet, Outlet, collect_references, render_report,
};
use quill_rs::generator::state::{PipelineRequest, PipelineState};
use quill_rs::generator::workflow::launch;
use quill_rs::llm::client::LLMClient;
use quill_rs::research::{ProviderRegistry, WikipediaApi, build_http_client};

/// 单个终端会话：上下文、引用查询与导出方式
struct Session {
    context: GeneratorContext,
    encyclopedia: WikipediaApi,
    outlet: Option<DiskOutlet>,
}

impl Session {
    /// 运行一个主题，成功返回 true
    async fn run_topic(&self, topic: &str) -> bool {
        let request = PipelineRequest::from_config(topic, &self.context.config);
        match launch(&self.context, &request, &ConsoleObserver, wait_for_interrupt()).await {
            Ok(state) => {
                self.present(&state).await;
                true
            }
            // 提示语已经由观察者打印
            Err(_) => false,
        }
    }

    async fn present(&self, state: &Arc<PipelineState>) {
        let references = collect_references(&self.encyclopedia, &state.links).await;
        println!("{}", render_report(state, &references));

        if let Some(outlet) = &self.outlet {
            match outlet.save(state) {
                Ok(path) => println!("💾 Article saved to {}", path.display()),
                Err(e) => eprintln!("⚠️  Failed to export article: {:#}", e),
            }
        }
    }
}

/// 等待 Ctrl-C；信号注册失败时永不触发
async fn wait_for_interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_interactive(session: &Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all("\n🔍 Enter a topic (empty line to quit): ".as_bytes())
            .await?;
        stdout.flush().await?;

        // 提示符处的 Ctrl-C 结束会话
        let Some(topic) = next_topic(&mut lines, wait_for_interrupt()).await? else {
            println!();
            break;
        };

        if !session.run_topic(&topic).await {
            if let Some(previous) = session.context.latest().await {
                println!("ℹ️  Last successful result kept: {}", previous.topic);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let interactive = args.interactive;
    let check_connection = args.check_connection;
    let topic = args.topic.clone();
    let config = args.into_config()?;

    init_tracing(config.verbose);

    if let Err(e) = config.validate_credentials() {
        eprintln!("❌ {}", e);
        return Ok(ExitCode::FAILURE);
    }

    let client = LLMClient::new(config.llm.clone())?;
    if check_connection {
        client.check_connection().await?;
        println!("✅ Model connection OK ({})", config.llm.provider);
        if topic.is_none() && !interactive {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let providers = ProviderRegistry::from_config(&config.search)?;
    let encyclopedia = WikipediaApi::new(build_http_client(&config.search)?, &config.search);
    let outlet = config
        .export_article
        .then(|| DiskOutlet::new(config.output_path.clone()));
    let session = Session {
        context: GeneratorContext::with_parts(config, Arc::new(client), providers),
        encyclopedia,
        outlet,
    };

    if interactive {
        run_interactive(&session).await?;
        return Ok(ExitCode::SUCCESS);
    }

    match topic {
        Some(topic) if session.run_topic(&topic).await => Ok(ExitCode::SUCCESS),
        Some(_) => Ok(ExitCode::FAILURE),
        None => Ok(ExitCode::SUCCESS),
    }
}
