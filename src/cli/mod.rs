use std::{collections::HashSet, io::Write};

use anyhow::Context;
use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{board::Board, persistence::PersistenceGateway};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    /// Print the stored board, or the default board when nothing usable is stored.
    Show(ShowArgs),
    /// Replace the stored board with the default board.
    Reset,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub json: bool,
}

/// Runs a one-shot command against the store and returns the process exit
/// code.
pub fn run(command: RootCommand, gateway: &mut PersistenceGateway, out: &mut dyn Write) -> i32 {
    let json_output = matches!(&command, RootCommand::Show(args) if args.json);
    let result = execute(command, gateway).and_then(|output| {
        write_success(out, &output, json_output).map_err(|err| runtime_error(&err.into()))
    });

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
}

type CliResult<T> = Result<T, CliError>;

fn execute(command: RootCommand, gateway: &mut PersistenceGateway) -> CliResult<CommandOutput> {
    match command {
        RootCommand::Show(_) => board_show(&gateway.load_or_seed()),
        RootCommand::Reset => board_reset(gateway),
    }
}

fn board_show(board: &Board) -> CliResult<CommandOutput> {
    Ok(CommandOutput {
        command: "show",
        data: board_json(board)?,
        text: render_board_text(board),
    })
}

fn board_reset(gateway: &mut PersistenceGateway) -> CliResult<CommandOutput> {
    let board = Board::seeded();
    gateway
        .try_save(&board)
        .map_err(|err| CliError {
            exit_code: 1,
            code: "STORE_WRITE_FAILED",
            message: format_anyhow_error_chain(&err),
        })?;
    info!("board reset to default");

    Ok(CommandOutput {
        command: "reset",
        data: board_json(&board)?,
        text: format!(
            "board reset: {} columns, {} cards",
            board.columns().len(),
            board.card_count()
        ),
    })
}

/// The `columns` array has the same shape as the persisted board.
fn board_json(board: &Board) -> CliResult<Value> {
    let columns = serde_json::to_value(board)
        .context("failed to encode board")
        .map_err(|err| runtime_error(&err))?;
    Ok(json!({ "columns": columns }))
}

fn render_board_text(board: &Board) -> String {
    if board.is_empty() {
        return "board has no columns".to_string();
    }

    let headers = ["COLUMN", "CARD", "CONTENT"];
    let rows = board
        .columns()
        .iter()
        .flat_map(|column| {
            let title = column.title.replace('\n', " ");
            if column.tasks.is_empty() {
                return vec![vec![title, "-".to_string(), String::new()]];
            }
            column
                .tasks
                .iter()
                .map(|card| vec![title.clone(), card.id.clone(), card.content.replace('\n', " ")])
                .collect()
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if width > widths[index] {
                widths[index] = width;
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let format_row = |cells: Vec<String>| {
        format!(
            "| {} |",
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };

    let mut lines = Vec::new();
    lines.push(border.clone());
    lines.push(format_row(headers.iter().map(|header| header.to_string()).collect()));
    lines.push(border.clone());
    for row in rows {
        lines.push(format_row(row.clone()));
    }
    lines.push(border);
    lines.join("\n")
}

fn runtime_error(err: &anyhow::Error) -> CliError {
    CliError {
        exit_code: 1,
        code: "RUNTIME_ERROR",
        message: format_anyhow_error_chain(err),
    }
}

fn write_success(out: &mut dyn Write, output: &CommandOutput, json_output: bool) -> std::io::Result<()> {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => writeln!(out, "{value}"),
            Err(_) => writeln!(out, "{payload}"),
        }
    } else {
        writeln!(out, "{}", output.text)
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(code = err.code, message = %err.message, "cli command failed");

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{payload}"),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}

fn format_anyhow_error_chain(err: &anyhow::Error) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if seen.insert(text.clone()) {
            parts.push(text);
        }
    }

    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result, anyhow, bail};

    use super::*;
    use crate::board::{Card, Column};
    use crate::persistence::{BOARD_KEY, KeyValueStore, MemoryStore};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            bail!("store is read-only")
        }
    }

    fn run_to_string(command: RootCommand, gateway: &mut PersistenceGateway) -> (i32, String) {
        let mut out = Vec::new();
        let code = run(command, gateway, &mut out);
        (code, String::from_utf8(out).expect("cli output is utf-8"))
    }

    #[test]
    fn show_prints_seeded_board_when_store_is_empty() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let (code, text) = run_to_string(RootCommand::Show(ShowArgs { json: false }), &mut gateway);

        assert_eq!(code, 0);
        assert!(text.contains("| COLUMN"));
        assert!(text.contains("Try dragging this card"));
        assert!(text.contains("| Done        | -"));
    }

    #[test]
    fn show_json_wraps_board_in_schema_envelope() -> Result<()> {
        let board = Board::from_columns(vec![Column::new(
            "a",
            "Alpha",
            vec![Card::new("c1", "first")],
        )]);
        let store = MemoryStore::new().with_entry(BOARD_KEY, &serde_json::to_string(&board)?);
        let mut gateway = PersistenceGateway::new(store);

        let (code, text) = run_to_string(RootCommand::Show(ShowArgs { json: true }), &mut gateway);
        assert_eq!(code, 0);

        let value: Value = serde_json::from_str(&text).context("output should be json")?;
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["command"], "show");
        assert_eq!(value["data"]["columns"][0]["title"], "Alpha");
        assert_eq!(value["data"]["columns"][0]["tasks"][0]["content"], "first");
        Ok(())
    }

    #[test]
    fn show_json_columns_match_persisted_board() -> Result<()> {
        let board = Board::from_columns(vec![
            Column::new("a", "Alpha", vec![Card::new("c1", "first")]),
            Column::new("b", "Beta", Vec::new()),
        ]);
        let raw = serde_json::to_string(&board)?;
        let mut gateway = PersistenceGateway::new(MemoryStore::new().with_entry(BOARD_KEY, &raw));

        let (code, text) = run_to_string(RootCommand::Show(ShowArgs { json: true }), &mut gateway);
        assert_eq!(code, 0);

        let value: Value = serde_json::from_str(&text).context("output should be json")?;
        let persisted: Value = serde_json::from_str(&raw)?;
        assert_eq!(value["data"]["columns"], persisted);
        Ok(())
    }

    #[test]
    fn reset_overwrites_stored_board() -> Result<()> {
        let board = Board::from_columns(vec![Column::new("a", "Alpha", Vec::new())]);
        let store = MemoryStore::new().with_entry(BOARD_KEY, &serde_json::to_string(&board)?);
        let mut gateway = PersistenceGateway::new(store.clone());

        let (code, text) = run_to_string(RootCommand::Reset, &mut gateway);
        assert_eq!(code, 0);
        assert!(text.contains("3 columns, 2 cards"));

        let raw = store.raw(BOARD_KEY).context("board should be stored")?;
        let stored: Board = serde_json::from_str(&raw)?;
        assert_eq!(stored, Board::seeded());
        Ok(())
    }

    #[test]
    fn reset_reports_store_failure_with_exit_code() {
        let mut gateway = PersistenceGateway::new(ReadOnlyStore);
        let (code, text) = run_to_string(RootCommand::Reset, &mut gateway);
        assert_eq!(code, 1);
        assert!(text.is_empty());
    }

    #[test]
    fn render_text_table_pads_columns() {
        let table = render_text_table(
            &["A", "LONGER"],
            &[vec!["wide cell".to_string(), "x".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+-----------+--------+");
        assert_eq!(lines[1], "| A         | LONGER |");
        assert_eq!(lines[3], "| wide cell | x      |");
    }

    #[test]
    fn empty_board_text() {
        assert_eq!(render_board_text(&Board::default()), "board has no columns");
    }

    #[test]
    fn format_anyhow_error_chain_includes_context_and_root_cause() {
        let err = anyhow!("permission denied").context("failed to write store");
        assert_eq!(
            format_anyhow_error_chain(&err),
            "failed to write store: permission denied"
        );
    }
}
