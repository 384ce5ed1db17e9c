// Command line shell: input validation, delete confirmation, re-listing after changes

use crate::error::ErrorKind;
use crate::models::Employee;
use crate::store::Store;
use clap::{Parser, Subcommand};
use colored::*;
use eyre::{Context, Result, eyre};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// MIME type handed to sharing tools along with an export
pub const SHARE_MIME_TYPE: &str = "text/csv";
pub const SHARE_SUBJECT: &str = "CSV File Attachment";
pub const SHARE_TEXT: &str = "Please find the attached CSV file.";

#[derive(Parser, Debug)]
#[command(name = "employeestore")]
#[command(about = "Employee directory backed by SQLite with CSV export")]
#[command(version = env!("GIT_DESCRIBE"))]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides the config file)
    #[arg(short, long)]
    pub store_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new employee
    Add {
        /// Employee name
        name: String,

        /// Employee email
        email: String,
    },

    /// List all employees
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single employee
    Show {
        /// Employee id
        id: i64,
    },

    /// Replace name and email of an employee
    Update {
        /// Employee id
        id: i64,

        /// New name
        name: String,

        /// New email
        email: String,
    },

    /// Delete an employee
    Delete {
        /// Employee id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export all employees to CSV for sharing
    Export,
}

/// Reject empty or whitespace-only input, returning the trimmed value
pub fn require_field<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(eyre!("{}", message));
    }
    Ok(trimmed)
}

/// Run one command against the store
///
/// `input` is only read when a delete needs confirmation.
pub fn execute<W: Write, R: BufRead>(store: &Store, command: Command, out: &mut W, input: &mut R) -> Result<()> {
    match command {
        Command::Add { name, email } => {
            let name = require_field(&name, "Field cannot be empty")?;
            let email = require_field(&email, "Field cannot be empty")?;

            let id = store.create(name, email).context("Failed to save record")?;
            writeln!(out, "{} Record saved (id {})", "✓".green(), id)?;
            print_list(store, out)?;
        }
        Command::List { json } => {
            let employees = store.read_all().context("Failed to read records")?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&employees)?)?;
            } else {
                write_employees(&employees, out)?;
            }
        }
        Command::Show { id } => {
            let employee = store
                .get(id)
                .context("Failed to read record")?
                .ok_or_else(|| eyre!("No employee with id {}", id))?;
            writeln!(out, "id:    {}", employee.id)?;
            writeln!(out, "name:  {}", employee.name)?;
            writeln!(out, "email: {}", employee.email)?;
        }
        Command::Update { id, name, email } => {
            let name = require_field(&name, "Name or email cannot be blank")?;
            let email = require_field(&email, "Name or email cannot be blank")?;

            let changed = store.update(id, name, email).context("Failed to update record")?;
            if changed == 0 {
                return Err(eyre!("No employee with id {}", id));
            }
            writeln!(out, "{} Record updated", "✓".green())?;
            print_list(store, out)?;
        }
        Command::Delete { id, yes } => {
            let employee = store
                .get(id)
                .context("Failed to read record")?
                .ok_or_else(|| eyre!("No employee with id {}", id))?;

            if !yes && !confirm(&format!("Are you sure you want to delete {}?", employee.name), out, input)? {
                writeln!(out, "Delete cancelled")?;
                return Ok(());
            }

            let removed = store.delete(id).context("Failed to delete record")?;
            if removed == 0 {
                return Err(eyre!("No employee with id {}", id));
            }
            writeln!(out, "{} Record deleted", "✓".green())?;
            print_list(store, out)?;
        }
        Command::Export => {
            let report = store.export_all().map_err(|e| {
                let what = match e.kind() {
                    ErrorKind::Export => "Failed to write export file",
                    _ => "Failed to read records for export",
                };
                eyre::Report::new(e).wrap_err(what)
            })?;
            writeln!(
                out,
                "{} Exported {} records to {}",
                "✓".green(),
                report.rows,
                report.path.display()
            )?;
            writeln!(out, "  type:    {}", SHARE_MIME_TYPE)?;
            writeln!(out, "  subject: {}", SHARE_SUBJECT)?;
            writeln!(out, "  text:    {}", SHARE_TEXT)?;
        }
    }

    Ok(())
}

fn print_list<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    let employees = store.read_all().context("Failed to refresh records")?;
    write_employees(&employees, out)
}

fn write_employees<W: Write>(employees: &[Employee], out: &mut W) -> Result<()> {
    if employees.is_empty() {
        writeln!(out, "No records available")?;
        return Ok(());
    }
    for employee in employees {
        writeln!(out, "{}", employee)?;
    }
    Ok(())
}

fn confirm<W: Write, R: BufRead>(question: &str, out: &mut W, input: &mut R) -> Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
