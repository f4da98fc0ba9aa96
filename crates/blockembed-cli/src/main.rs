use std::io::Read;
use std::path::{Path, PathBuf};

use blockembed_common::EmbedConfig;
use blockembed_common::telemetry::{self, TelemetryConfig};
use blockembed_core::registry::{self, AdapterKind};
use blockembed_core::{FrameSpec, Processor, SandboxMessage};
use blockembed_renderer::highlight::highlight;
use blockembed_renderer::typeset;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "blockembed - render and inspect embed block content", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file. Without it, BLOCKEMBED_* environment variables apply
    #[arg(long, global = true, env = "BLOCKEMBED_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Typeset a LaTeX formula to MathML
    Latex {
        /// Source file (reads stdin when omitted)
        source: Option<PathBuf>,

        /// Inline instead of display mode
        #[arg(long)]
        inline: bool,

        /// Print the links the formula emits instead of the markup
        #[arg(long)]
        links: bool,
    },
    /// Highlight block source the way the editor shows it
    Highlight {
        #[arg(short, long)]
        processor: Processor,

        /// Source file (reads stdin when omitted)
        source: Option<PathBuf>,
    },
    /// Print the message a sandbox frame receives for this source
    Message {
        #[arg(short, long)]
        processor: Processor,

        /// Theme class; defaults to the configured theme
        #[arg(long)]
        theme: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Source file (reads stdin when omitted)
        source: Option<PathBuf>,
    },
    /// Print the frame a processor's preview is mounted in
    Frame {
        #[arg(short, long)]
        processor: Processor,

        /// Address of the page hosting the editor
        #[arg(long)]
        location: Option<String>,
    },
    /// List every processor with its render adapter
    Processors,
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();

    let mut telemetry_config = TelemetryConfig::from_env("blockembed-cli");
    if cli.verbose {
        telemetry_config = telemetry_config.with_level(tracing::Level::DEBUG);
    }
    telemetry::init(telemetry_config);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(target: "blockembed::cli", ?config, "loaded configuration");

    match cli.command {
        Commands::Latex {
            source,
            inline,
            links,
        } => {
            let text = read_source(source.as_deref())?;
            let out = typeset(&text, !inline);
            for error in &out.errors {
                tracing::warn!(target: "blockembed::cli", "{error}");
            }
            if links {
                for link in &out.links {
                    println!("{link}");
                }
            } else {
                println!("{}", out.html);
            }
        }
        Commands::Highlight { processor, source } => {
            let text = read_source(source.as_deref())?;
            let html = highlight(&text, processor.highlight_lang())?;
            print!("{html}");
        }
        Commands::Message {
            processor,
            theme,
            pretty,
            source,
        } => {
            require_sandbox(processor)?;
            let text = read_source(source.as_deref())?;
            let theme = theme.unwrap_or_else(|| config.theme.clone());
            let message = SandboxMessage::build(processor, &text, &theme, &config);
            let json = if pretty {
                serde_json::to_string_pretty(&message).into_diagnostic()?
            } else {
                message.to_json()?
            };
            println!("{json}");
        }
        Commands::Frame {
            processor,
            location,
        } => {
            require_sandbox(processor)?;
            let spec = FrameSpec::for_processor(processor, &config, location.as_deref());
            println!("id: {}", spec.element_id);
            println!("src: {}", spec.src);
            println!("sandbox: {}", spec.sandbox_attribute());
        }
        Commands::Processors => {
            for processor in Processor::ALL {
                let info = registry::info(processor);
                println!(
                    "{:<12} {:<8} {:<8} {}",
                    processor.as_str(),
                    adapter_name(info.adapter),
                    info.lang.token(),
                    info.placeholder
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EmbedConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).into_diagnostic()?;
            Ok(EmbedConfig::from_json_str(&json)?)
        }
        None => Ok(EmbedConfig::from_env()?),
    }
}

fn read_source(path: Option<&Path>) -> Result<String> {
    let mut text = match path {
        Some(path) => std::fs::read_to_string(path).into_diagnostic()?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            buf
        }
    };
    let trimmed = text.trim_end_matches(['\r', '\n']).len();
    text.truncate(trimmed);
    Ok(text)
}

fn require_sandbox(processor: Processor) -> Result<()> {
    if registry::adapter_kind(processor) != AdapterKind::Sandbox {
        miette::bail!(
            help = "only html, chart and provider embeds render in a frame",
            "{processor} is not rendered in a sandbox frame"
        );
    }
    Ok(())
}

fn adapter_name(kind: AdapterKind) -> &'static str {
    match kind {
        AdapterKind::Sandbox => "sandbox",
        AdapterKind::Latex => "latex",
        AdapterKind::Diagram => "diagram",
    }
}

fn init_miette() {
    let hook = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    if hook.is_err() {
        eprintln!("couldn't set the miette hook");
    }
    miette::set_panic_hook();
}
