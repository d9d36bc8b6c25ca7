use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use projdoc::document::{
    classify, generate_outline, read_blocks, render, DocumentBlock, DocumentStats, DocxBackend,
    HeadingMode,
};
use projdoc::ingest::{self, Ingested};
use projdoc::llm::{ApiKey, ChatClient};
use projdoc::prompt::{build_prompt, PromptInputs};
use projdoc::Config;

#[derive(Parser)]
#[command(name = "projdoc")]
#[command(about = "Turn stakeholder notes and supporting files into a Word project document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a text file into a .docx document
    Render {
        /// Text file to convert ("-" reads stdin)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show how each line of a text file is classified
    Classify {
        /// Text file to classify ("-" reads stdin)
        input: PathBuf,

        #[arg(short, long, value_enum)]
        mode: Option<HeadingMode>,

        /// Print blocks as JSON
        #[arg(long)]
        json: bool,

        /// Print only the heading outline
        #[arg(long, conflicts_with = "json")]
        outline: bool,
    },

    /// Generate a project document from notes and files with an LLM
    Generate(GenerateArgs),

    /// Read a .docx file back into blocks
    Inspect {
        file: PathBuf,

        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the configuration file
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output .docx path (defaults to the configured output file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Heading convention of the text
    #[arg(short, long, value_enum)]
    mode: Option<HeadingMode>,

    /// Render bullets as plain paragraphs
    #[arg(long)]
    no_list_styles: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Stakeholder notes
    #[arg(short, long, default_value = "")]
    notes: String,

    /// Read stakeholder notes from a file
    #[arg(long, conflicts_with = "notes")]
    notes_file: Option<PathBuf>,

    /// Additional focus for the document
    #[arg(long, default_value = "")]
    focus: String,

    /// Supporting files (CSV, XLSX, TXT, DOCX); may be repeated
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// API key (overrides OPENAI_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Also print the generated text
    #[arg(long)]
    print: bool,

    /// Save the generated text next to the document
    #[arg(long)]
    save_text: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Render { input, output } => {
            let text = read_input(&input)?;
            write_document(&text, &output, &config)?;
        }
        Command::Classify {
            input,
            mode,
            json,
            outline,
        } => {
            let text = read_input(&input)?;
            let blocks = classify(&text, mode.unwrap_or(config.mode));
            print_blocks(&blocks, json, outline)?;
        }
        Command::Generate(args) => generate(args, &config).await?,
        Command::Inspect { file, json } => {
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let blocks = read_blocks(&bytes)?;
            print_blocks(&blocks, json, false)?;
        }
        Command::Config { init, path } => {
            let config_path = cli.config.clone().or_else(Config::get_config_path);
            if path {
                match &config_path {
                    Some(p) => println!("{}", p.display()),
                    None => println!("No config directory available"),
                }
            }
            if init {
                match &config_path {
                    Some(p) if p.exists() => bail!("{} already exists", p.display()),
                    Some(p) => {
                        Config::default().save_to(p)?;
                        println!("Wrote default config to {}", p.display());
                    }
                    None => bail!("No config directory available"),
                }
            }
            if !init && !path {
                print!("{}", toml::to_string_pretty(&redacted(&config))?);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "projdoc=debug" } else { "projdoc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("reading stdin");
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

fn write_document(text: &str, args: &OutputArgs, config: &Config) -> Result<()> {
    let mode = args.mode.unwrap_or(config.mode);
    let output = args.output.as_ref().unwrap_or(&config.output_file);

    let blocks = classify(text, mode);
    let backend = if args.no_list_styles {
        DocxBackend::without_list_styles()
    } else {
        DocxBackend::new()
    };
    let bytes = render(&blocks, backend)?;

    std::fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    let stats = DocumentStats::from_blocks(&blocks);
    info!(
        path = %output.display(),
        headings = stats.headings,
        bullets = stats.bullets,
        words = stats.word_count,
        "document written"
    );
    println!("Wrote {} (~{} page(s))", output.display(), stats.page_count);
    Ok(())
}

async fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let notes = match &args.notes_file {
        Some(path) => read_input(path)?,
        None => args.notes.clone(),
    };

    let mut uploads = Vec::new();
    for path in &args.files {
        let file = ingest::read_file(path)?;
        match &file.content {
            Ingested::Table(table) => {
                eprintln!("Table: {} ({} rows)", file.name, table.total_rows)
            }
            Ingested::Text(_) => eprintln!("Text: {}", file.name),
        }
        eprintln!("{}\n", file.content.preview());
        uploads.push(file);
    }

    let mode = args.output.mode.unwrap_or(config.mode);
    let inputs = PromptInputs {
        notes,
        file_text: ingest::combine(&uploads),
        focus: args.focus.clone(),
    };
    let prompt = build_prompt(&inputs, mode);

    // Credential lookup happens here only; the client receives it explicitly
    let api_key = args
        .api_key
        .as_deref()
        .and_then(ApiKey::new)
        .or_else(|| std::env::var("OPENAI_API_KEY").ok().and_then(ApiKey::new))
        .or_else(|| config.api_key.as_deref().and_then(ApiKey::new));

    let mut settings = config.chat_settings();
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }

    let client = ChatClient::new(api_key, settings)?;
    info!("generating with {}", client.settings().model);
    let text = client.complete(&prompt).await?;

    if args.print {
        println!("{text}");
    }
    if let Some(path) = &args.save_text {
        std::fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
    }

    write_document(&text, &args.output, config)
}

fn print_blocks(blocks: &[DocumentBlock], json: bool, outline: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(blocks)?);
        return Ok(());
    }

    if outline {
        for item in generate_outline(blocks) {
            let indent = "  ".repeat(item.level.saturating_sub(2) as usize);
            println!("{indent}{} (line {})", item.title, item.block_index + 1);
        }
        return Ok(());
    }

    for block in blocks {
        match block {
            DocumentBlock::Heading { level, text } => println!("H{level}  {text}"),
            DocumentBlock::BulletItem { text } => println!("•   {text}"),
            DocumentBlock::Paragraph { text } => println!("    {text}"),
        }
    }
    Ok(())
}

fn redacted(config: &Config) -> Config {
    Config {
        api_key: config.api_key.as_ref().map(|_| "***".to_string()),
        ..config.clone()
    }
}
