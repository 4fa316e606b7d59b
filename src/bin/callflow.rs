use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use callflow::agent::Capabilities;
use callflow::llm::ScriptedClient;
use callflow::utils::LoggingConfig;
use callflow::{CallAnalyzer, CallInput, Settings, StepEvent, Target};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "callflow", version, about = "Call transcript analysis CLI", author)]
struct Cli {
    /// JSON 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 分析单个文件并输出最终状态
    Analyze {
        file: PathBuf,
        /// 将文件作为音频处理
        #[arg(long)]
        audio: bool,
        #[arg(long)]
        compact: bool,
        /// 在 stderr 打印每一步
        #[arg(long)]
        progress: bool,
    },
    /// 并发分析多个文本文件
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// 打印默认分析图的拓扑
    Graph,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Command::Analyze {
            file,
            audio,
            compact,
            progress,
        } => handle_analyze(&settings, &file, audio, compact, progress).await?,
        Command::Batch { files, concurrency } => {
            handle_batch(&settings, files, concurrency).await?
        }
        Command::Graph => handle_graph(&settings)?,
    }
    Ok(())
}

fn read_input(file: &Path, audio: bool) -> anyhow::Result<CallInput> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let input = if audio {
        let bytes = fs::read(file).with_context(|| format!("failed to read `{}`", file.display()))?;
        CallInput::audio(bytes)
    } else {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read `{}`", file.display()))?;
        CallInput::transcript(text)
    };
    Ok(input.with_file_name(name))
}

async fn handle_analyze(
    settings: &Settings,
    file: &Path,
    audio: bool,
    compact: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let input = read_input(file, audio)?;
    let mut analyzer = CallAnalyzer::from_settings(settings)?;

    let printer = if progress {
        let (tx, rx) = mpsc::unbounded_channel();
        analyzer = analyzer.with_events(tx);
        Some(tokio::spawn(print_progress(rx)))
    } else {
        None
    };

    let state = analyzer.analyze(input).await?;
    drop(analyzer);
    if let Some(printer) = printer {
        printer.await?;
    }

    let output = if compact {
        serde_json::to_string(&state)?
    } else {
        serde_json::to_string_pretty(&state)?
    };
    println!("{}", output);
    Ok(())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<StepEvent>) {
    while let Some(event) = rx.recv().await {
        eprintln!(
            "[{:>2}] {:<18} model={} errors={}",
            event.step, event.label, event.model, event.error_count
        );
    }
}

async fn handle_batch(
    settings: &Settings,
    files: Vec<PathBuf>,
    concurrency: usize,
) -> anyhow::Result<()> {
    let inputs = files
        .iter()
        .map(|file| read_input(file, false))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let analyzer = CallAnalyzer::from_settings(settings)?;
    let results = analyzer.analyze_many(inputs, concurrency).await;

    let outcomes: Vec<Value> = files
        .iter()
        .zip(results)
        .map(|(file, result)| match result {
            Ok(state) => json!({
                "file": file.display().to_string(),
                "ok": true,
                "state": state,
            }),
            Err(err) => json!({
                "file": file.display().to_string(),
                "ok": false,
                "error": err.to_string(),
            }),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

fn handle_graph(settings: &Settings) -> anyhow::Result<()> {
    // 只需要拓扑，不访问外部服务
    let offline = Capabilities::shared(Arc::new(ScriptedClient::default()));
    let analyzer = CallAnalyzer::with_capabilities(settings, offline)?;
    let graph = analyzer.graph();
    println!("{} (entry: {})", graph.name(), graph.start());
    for (node, targets) in graph.topology() {
        let rendered: Vec<String> = targets.iter().map(Target::to_string).collect();
        println!("  {:<16} -> {}", node.as_str(), rendered.join(" | "));
    }
    Ok(())
}
