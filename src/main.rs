use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use leafdb::{
    planner::{meta::MetaCommand, statement::Statement},
    storage::{
        config::{TableConfig, TableMode},
        table::Table,
    },
    types::{TABLE_MAX_PAGES, error::DatabaseError, page::describe_constants},
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "db > ";

#[derive(Parser, Debug)]
#[command(name = "leafdb", version, about = "Single-table persistent row store")]
struct Args {
    /// Database file, created if missing
    db_path: PathBuf,

    /// Store rows as a flat array in insertion order instead of a keyed leaf
    #[arg(long)]
    flat: bool,

    /// Page limit for the file
    #[arg(long, default_value_t = TABLE_MAX_PAGES)]
    max_pages: u32,
}

enum Flow {
    Continue,
    Exit,
}

fn process_line(table: &mut Table, line: &str, out: &mut impl Write) -> io::Result<Flow> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Flow::Continue);
    }

    if MetaCommand::is_meta(line) {
        match MetaCommand::parse(line) {
            Ok(MetaCommand::Exit) => return Ok(Flow::Exit),
            Ok(MetaCommand::BTree) => {
                writeln!(out, "Tree:")?;
                match table.describe_tree() {
                    Ok(tree) => write!(out, "{}", tree)?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            Ok(MetaCommand::Constants) => {
                writeln!(out, "Constants:")?;
                for (name, value) in describe_constants() {
                    writeln!(out, "{}: {}", name, value)?;
                }
            }
            Err(e) => writeln!(out, "{}", e)?,
        }
        return Ok(Flow::Continue);
    }

    match Statement::prepare(line) {
        Ok(statement) => execute(table, statement, out)?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(Flow::Continue)
}

fn execute(table: &mut Table, statement: Statement, out: &mut impl Write) -> io::Result<()> {
    match statement {
        Statement::Insert(row) => match table.insert(&row) {
            Ok(()) => writeln!(out, "Executed."),
            Err(DatabaseError::DuplicateKey(_)) => writeln!(out, "Error: Duplicate key."),
            Err(DatabaseError::TableFull { .. }) => writeln!(out, "Error: Table full."),
            Err(e) => writeln!(out, "Error: {}", e),
        },
        Statement::Select => match table.scan() {
            Ok(rows) => {
                for row in rows {
                    writeln!(out, "{}", row)?;
                }
                writeln!(out, "Executed.")
            }
            Err(e) => writeln!(out, "Error: {}", e),
        },
    }
}

fn run_piped(table: &mut Table, input: impl BufRead) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let mut lines = input.lines();
    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        if let Flow::Exit = process_line(table, &line?, &mut stdout)? {
            return Ok(());
        }
    }
}

fn run_interactive(table: &mut Table) -> io::Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| io::Error::other(e.to_string()))?;
    let mut stdout = io::stdout();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if let Flow::Exit = process_line(table, &line, &mut stdout)? {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(io::Error::other(err.to_string())),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mode = if args.flat {
        TableMode::Flat
    } else {
        TableMode::Tree
    };
    let config = TableConfig::default()
        .with_mode(mode)
        .with_max_pages(args.max_pages);

    let mut table = match Table::open_with_config(&args.db_path, config) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Unable to open {}: {}", args.db_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let session = if io::stdin().is_terminal() {
        run_interactive(&mut table)
    } else {
        run_piped(&mut table, io::stdin().lock())
    };

    let closed = table.close();
    match (session, closed) {
        (Ok(()), Ok(())) => ExitCode::SUCCESS,
        (Err(e), _) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        (_, Err(e)) => {
            eprintln!("Error closing database: {}", e);
            ExitCode::FAILURE
        }
    }
}
