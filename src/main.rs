//! Tablemill CLI - clean up, transform and analyze spreadsheet data
//!
//! # Main Commands
//!
//! ```bash
//! tablemill process input.csv -p ops.json   # Apply an operation list
//! tablemill summary input.csv               # Per-column statistics
//! tablemill pivot input.csv -c pivot.json   # Pivot table
//! tablemill template list                   # Manage operation templates
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! tablemill parse input.csv                 # Just parse CSV to JSON rows
//! tablemill export input.csv -f xlsx -o out.xlsx
//! tablemill operations                      # Show available operations
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tablemill::{
    apply_operations, group_by, operations_description, parse_file_auto, pivot, process_file,
    summarize, write_table, Aggregation, ExportFormat, Operation, PivotConfig, TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "tablemill")]
#[command(about = "Clean up, transform and analyze spreadsheet data", long_about = None)]
struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an operation list to a CSV file
    Process {
        /// Input CSV file
        input: PathBuf,

        /// JSON file with the ordered operation list
        #[arg(short = 'p', long)]
        operations: PathBuf,

        /// Output file for JSON rows (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export the result to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Export format: csv or xlsx
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Per-column summary statistics
    Summary {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Group rows by one column and aggregate another
    GroupBy {
        /// Input CSV file
        input: PathBuf,

        /// Column to group by
        #[arg(short, long)]
        group: String,

        /// Column to aggregate
        #[arg(short, long)]
        aggregate: String,

        /// Aggregation: sum, avg, count, min or max
        #[arg(short = 'p', long, default_value = "sum")]
        operation: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a pivot table from a config file
    Pivot {
        /// Input CSV file
        input: PathBuf,

        /// JSON pivot config: {"rows": [...], "columns": [...], "values": [...], "aggregation": "sum"}
        #[arg(short, long)]
        config: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-export a CSV file as csv or xlsx
    Export {
        /// Input CSV file
        input: PathBuf,

        /// Export format: csv or xlsx
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show available operations
    Operations,

    /// Manage operation templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List all stored templates
    List,

    /// Save an operation list file as a template
    Save {
        /// JSON file with the operation list
        file: PathBuf,
        /// Name for the template
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show details of a template
    Show {
        /// Template ID
        id: String,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },

    /// Apply a stored template to a CSV file
    Use {
        /// Template ID
        id: String,
        /// Input CSV file
        input: PathBuf,
        /// Output file for JSON rows (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the result to this file
        #[arg(short, long)]
        export: Option<PathBuf>,
        /// Export format: csv or xlsx
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.quiet {
        tablemill::logs::LOG_SINK.set_quiet(true);
    }

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Process { input, operations, output, export, format } => {
            cmd_process(&input, &operations, output.as_deref(), export.as_deref(), &format)
        }

        Commands::Summary { input, output } => cmd_summary(&input, output.as_deref()),

        Commands::GroupBy { input, group, aggregate, operation, output } => {
            cmd_group_by(&input, &group, &aggregate, &operation, output.as_deref())
        }

        Commands::Pivot { input, config, output } => {
            cmd_pivot(&input, &config, output.as_deref())
        }

        Commands::Export { input, format, output } => cmd_export(&input, &format, &output),

        Commands::Operations => cmd_operations(),

        Commands::Template { action } => cmd_template(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_file_auto(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", tablemill::transform::pipeline::format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("Parsed {} rows", result.table.len());

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)
}

fn cmd_process(
    input: &Path,
    operations_path: &Path,
    output: Option<&Path>,
    export: Option<&Path>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Processing: {}", input.display());

    let ops_json = fs::read_to_string(operations_path)?;
    let operations: Vec<Operation> = serde_json::from_str(&ops_json)?;

    let result = process_file(input, &operations)?;
    eprintln!("{} rows in, {} rows out", result.input_rows, result.table.len());

    if let Some(export_path) = export {
        let format: ExportFormat = format.parse()?;
        write_table(&result.table, format, export_path)?;
        eprintln!("Exported to: {}", export_path.display());
    }

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)
}

fn cmd_summary(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let result = parse_file_auto(input)?;
    let summary = summarize(&result.table);

    let json = serde_json::to_string_pretty(&summary)?;
    write_output(&json, output)
}

fn cmd_group_by(
    input: &Path,
    group: &str,
    aggregate: &str,
    operation: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let operation: Aggregation = operation.parse()?;
    let result = parse_file_auto(input)?;

    let grouped = group_by(&result.table, group, aggregate, operation);
    let json = serde_json::to_string_pretty(&grouped)?;
    write_output(&json, output)
}

fn cmd_pivot(
    input: &Path,
    config_path: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_json = fs::read_to_string(config_path)?;
    let config: PivotConfig = serde_json::from_str(&config_json)?;

    let result = parse_file_auto(input)?;
    let table = pivot(&result.table, &config);

    let json = serde_json::to_string_pretty(&table)?;
    write_output(&json, output)
}

fn cmd_export(
    input: &Path,
    format: &str,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let format: ExportFormat = format.parse()?;
    let result = parse_file_auto(input)?;

    write_table(&result.table, format, output)?;
    eprintln!("Exported {} rows to: {}", result.table.len(), output.display());
    Ok(())
}

fn cmd_operations() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", operations_description());
    Ok(())
}

fn cmd_template(action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = TemplateRegistry::new();

    match action {
        TemplateAction::List => {
            let templates = registry.list();
            if templates.is_empty() {
                eprintln!("No templates stored yet.");
                eprintln!("Use 'tablemill template save <file>' to add one.");
                return Ok(());
            }

            eprintln!("Stored templates ({}):\n", templates.len());
            for t in templates {
                println!("  {} ({})", t.name, t.id);
                println!("     Operations: {}", t.operations.len());
                println!("     Uses: {}", t.use_count);
                if let Some(ref last) = t.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        TemplateAction::Save { file, name } => {
            eprintln!("Importing operations from: {}", file.display());
            let id = registry.import(&file, name.as_deref())?;
            eprintln!("Template saved with ID: {}", id);
        }

        TemplateAction::Show { id } => match registry.get(&id) {
            Some(t) => {
                println!("Template: {} ({})\n", t.name, t.id);
                println!("Created: {}", t.created_at);
                println!("Uses: {}", t.use_count);
                println!("\nOperations:");
                println!("{}", serde_json::to_string_pretty(&t.operations)?);
            }
            None => {
                return Err(format!("Template not found: {}", id).into());
            }
        },

        TemplateAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("Template deleted: {}", id);
        }

        TemplateAction::Use { id, input, output, export, format } => {
            let template = registry
                .get(&id)
                .ok_or_else(|| format!("Template not found: {}", id))?;

            eprintln!("Using template: {} ({})", template.name, template.id);
            let operations = template.operations.clone();

            let parsed = parse_file_auto(&input)?;
            eprintln!("   Found {} rows", parsed.table.len());

            let table = apply_operations(&parsed.table, &operations)?;
            eprintln!("   Transformed: {} rows", table.len());

            registry.touch(&id);

            if let Some(export_path) = export {
                let format: ExportFormat = format.parse()?;
                write_table(&table, format, &export_path)?;
                eprintln!("Exported to: {}", export_path.display());
            } else {
                let json = serde_json::to_string_pretty(&table)?;
                write_output(&json, output.as_deref())?;
            }
        }
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
