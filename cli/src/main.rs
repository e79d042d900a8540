mod http;

use canvas::autostack::EstimateMeasure;
use canvas::content::{ContentError, ContentKind, ContentStore, PageRecord, SaveError, find_page, record_id, save_page};
use canvas::doc::ViewMode;
use canvas::engine::EngineCore;
use canvas::render::render_html;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::http::{HttpContentStore, HttpStoreError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] HttpStoreError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Save(#[from] SaveError<HttpStoreError>),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "studio-cli", about = "Studio content and page builder CLI")]
struct Cli {
    #[arg(long, env = "STUDIO_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Pages(PagesCommand),
}

#[derive(Args, Debug)]
struct PagesCommand {
    #[command(subcommand)]
    command: PagesSubcommand,
}

#[derive(Subcommand, Debug)]
enum PagesSubcommand {
    /// One line per record: id, title, block count, canvas height.
    List { kind: ContentKind },
    /// Print a record, or its rendered HTML with `--html`.
    Show {
        kind: ContentKind,
        id: String,
        #[arg(long, value_enum)]
        html: Option<View>,
    },
    /// Rebuild the mobile layout of a page from its desktop layout.
    Autostack {
        kind: ContentKind,
        id: String,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Desktop,
    Mobile,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Desktop => ViewMode::Desktop,
            View::Mobile => ViewMode::Mobile,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let store = HttpContentStore::new(&cli.base_url)?;

    match cli.command {
        Command::Ping => {
            store.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::Pages(pages) => run_pages(&store, pages.command).await,
    }
}

async fn run_pages(store: &HttpContentStore, command: PagesSubcommand) -> Result<(), CliError> {
    match command {
        PagesSubcommand::List { kind } => {
            for item in store.fetch(kind).await? {
                println!("{}", summary_line(&item));
            }
            Ok(())
        }
        PagesSubcommand::Show { kind, id, html } => {
            let items = store.fetch(kind).await?;
            let record = find_page(&items, &id)?;
            match html {
                Some(view) => println!("{}", render_html(record.blocks(), view.into())),
                None => print_json(&serde_json::to_value(&record)?)?,
            }
            Ok(())
        }
        PagesSubcommand::Autostack { kind, id, dry_run } => {
            let items = store.fetch(kind).await?;
            let record = find_page(&items, &id)?;
            let core = stack_page(&record);
            for block in core.doc.blocks() {
                let rect = block.mobile_rect();
                println!("{}\t{}\t{}\t{}\t{}", block.id, rect.x, rect.y, rect.width, rect.height);
            }
            eprintln!("canvas height: {}", core.canvas_height());

            if dry_run {
                eprintln!("dry run: nothing saved");
                return Ok(());
            }
            save_page(store, kind, &id, &core.snapshot()).await?;
            eprintln!("saved {kind}/{id}");
            Ok(())
        }
    }
}

/// Load `record` into an engine and run auto-stack with estimated text
/// heights.
fn stack_page(record: &PageRecord) -> EngineCore {
    let mut core = EngineCore::new();
    core.load(record);
    core.auto_stack(&mut EstimateMeasure);
    core
}

fn summary_line(item: &Value) -> String {
    let id = record_id(item).unwrap_or_else(|| "-".to_owned());
    let title = item.get("title").and_then(Value::as_str).unwrap_or("-");
    match PageRecord::from_value(item) {
        Ok(record) => format!(
            "{id}\t{title}\t{} blocks\t{}",
            record.blocks().len(),
            record.initial_canvas_height()
        ),
        Err(_) => format!("{id}\t{title}\tunreadable"),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
