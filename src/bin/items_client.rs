//! Terminal front end for a running items-board server.
//!
//! Reads one command per line and keeps a local list in sync with the server
//! through `ItemList`, the same optimistic rules the browser page follows.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::FmtSubscriber;

use items_board::client::{HttpItemsApi, ItemList, ItemsApi, Modal};
use items_board::ItemId;

const HELP: &str = "\
commands:
  list                 show the items
  add <name>           add an item
  edit <n>             toggle edit mode on item n
  set <n> <name>       change the edit input of item n
  save <n>             save item n's edit input
  delete <n>           delete item n
  clear                delete all items (asks first)
  yes | no             answer the open question
  refresh              reload from the server
  quit";

#[derive(Parser, Debug)]
#[command(name = "items-client", about = "Interactive client for the items API")]
struct Args {
    /// Collection URL of the items API.
    #[arg(long, default_value = "http://127.0.0.1:5000/api/items")]
    url: String,

    /// Log level for tracing output.
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let api = HttpItemsApi::new(args.url.clone());
    let mut list = ItemList::load(api)
        .await
        .with_context(|| format!("Could not load items from {}", args.url))?;

    println!("{HELP}");
    render(&list);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));

        match cmd {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "list" => {}
            "add" => {
                list.set_add_input(rest);
                list.add().await;
            }
            "edit" => {
                if let Some(id) = pick(&list, rest) {
                    list.toggle_edit(&id);
                }
            }
            "set" => {
                let (n, name) = rest.split_once(' ').unwrap_or((rest, ""));
                if let Some(id) = pick(&list, n) {
                    list.set_edit_input(&id, name);
                    list.blur(&id);
                }
            }
            "save" => {
                if let Some(id) = pick(&list, rest) {
                    list.update(&id).await;
                }
            }
            "delete" => {
                if let Some(id) = pick(&list, rest) {
                    list.delete(&id).await;
                }
            }
            "clear" => list.request_delete_all(),
            "yes" => list.confirm_delete_all().await,
            "no" => list.dismiss_modal(),
            "refresh" => {
                if let Err(e) = list.refresh().await {
                    println!("Could not refresh: {e}");
                }
            }
            other => println!("unknown command {other:?}, try `help`"),
        }

        // No animations here: every transition ends right away.
        list.settle();
        render(&list);

        if let Some(Modal::Error { .. }) = list.modal() {
            list.dismiss_modal();
        }
    }

    Ok(())
}

/// Resolve a 1-based position in the current list.
fn pick<A: ItemsApi>(list: &ItemList<A>, arg: &str) -> Option<ItemId> {
    let found = arg
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| list.items().get(i))
        .map(|view| *view.id());

    if found.is_none() {
        println!("no item {arg:?}");
    }
    found
}

fn render<A: ItemsApi>(list: &ItemList<A>) {
    println!();
    if list.items().is_empty() {
        println!("  (no items)");
    }
    for (i, view) in list.items().iter().enumerate() {
        if view.is_editing() {
            println!("  {:>2}. [editing] {}", i + 1, view.input());
        } else {
            println!("  {:>2}. {}", i + 1, view.name());
        }
    }

    if let Some(err) = list.input_error() {
        println!("  ! {err}");
    }
    match list.modal() {
        Some(Modal::ConfirmDeleteAll) => {
            println!("  ? {} (yes/no)", Modal::ConfirmDeleteAll.describe())
        }
        Some(modal) => println!("  ! {}", modal.describe()),
        None => {}
    }
}
