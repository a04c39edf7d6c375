mod logging;
mod tui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use pocketdo_core::{default_data_dir, open_file_list, TodoList};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tracing::debug;

#[derive(Parser)]
#[command(name = "pocketdo")]
#[command(about = "A single-list todo manager", long_about = None)]
struct Cli {
    /// Directory holding the stored list [default: ~/.pocketdo]
    #[arg(long, global = true, env = "POCKETDO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a new item (usage: add Buy milk)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List all items
    List,
    /// Mark an item done, or open again, by its position in `list`
    Toggle { position: usize },
    /// Delete an item by its position in `list`
    Delete { position: usize },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
}

fn status_icon(done: bool) -> &'static str {
    if done {
        "✔"
    } else {
        "☐"
    }
}

fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Positions start at 1"))
}

fn print_list(list: &TodoList) {
    if list.is_empty() {
        println!("No tasks found.");
        return;
    }

    let rows: Vec<ListRow> = list
        .todos()
        .iter()
        .enumerate()
        .map(|(i, todo)| ListRow {
            position: i + 1,
            done: status_icon(todo.done),
            text: todo.text.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
    println!("{} of {} remaining", list.remaining(), list.len());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    if matches!(cli.command, None | Some(Commands::Tui)) {
        logging::init_file(&data_dir)?;
    } else {
        logging::init_stderr()?;
    }
    debug!(data_dir = %data_dir.display(), "opening todo list");

    match cli.command {
        Some(Commands::Add { args }) => {
            let mut list = open_file_list(Some(data_dir))?;
            let text = args.join(" ");

            match list.add(&text) {
                Some(ticket) => {
                    ticket.wait()?;
                    println!("Task added: {} (#{})", text.trim(), list.len());
                }
                None => println!("Error: Task text is required."),
            }
        }
        Some(Commands::List) => {
            let list = open_file_list(Some(data_dir))?;
            print_list(&list);
        }
        Some(Commands::Toggle { position }) => {
            let mut list = open_file_list(Some(data_dir))?;
            let index = to_index(position)?;

            let id = list.id_at(index)?;
            list.toggle(id)?.wait()?;
            if let Some(todo) = list.get(id) {
                println!("{} {}", status_icon(todo.done), todo.text);
            }
        }
        Some(Commands::Delete { position }) => {
            let mut list = open_file_list(Some(data_dir))?;
            let index = to_index(position)?;

            let text = list.todos().get(index).map(|t| t.text.clone());
            list.delete_at(index)?.wait()?;
            if let Some(text) = text {
                println!("Task deleted: {}", text);
            }
        }
        Some(Commands::Tui) | None => {
            let list = open_file_list(Some(data_dir))?;
            tui::run(list)?;
        }
    }
    Ok(())
}
