//! Resource command - CRUD on Campus API resources.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde_json::Value;

use campus_client::{ADMIN_RESOURCES, Envelope, PageQuery};

use super::{Context, parse_json, print_value};

/// Arguments for the resource command.
#[derive(Args, Debug)]
pub struct ResourceArgs {
    /// Resource name (Course, Lesson, Quiz, Question, Answer, Enrollment,
    /// Attendance, Employee, Progress)
    pub name: String,

    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List records, one page at a time
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Records per page
        #[arg(short, long, default_value = "10")]
        size: u32,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Restrict to these ids (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,
    },

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record
    Create {
        /// JSON body
        #[arg(short, long)]
        data: String,
    },

    /// Update a record
    Update {
        /// Record id
        id: String,

        /// JSON body
        #[arg(short, long)]
        data: String,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },
}

/// Run the resource command.
pub async fn run(args: ResourceArgs, ctx: &Context) -> Result<()> {
    if ctx.verbose && !ADMIN_RESOURCES.contains(&args.name.as_str()) {
        let dim = Style::new().dim();
        eprintln!(
            "{}",
            dim.apply_to(format!("'{}' is not a known admin resource", args.name))
        );
    }

    let client = ctx.client()?;
    let resource = client.resource(args.name);

    let envelope = match args.command {
        ResourceCommand::List {
            page,
            size,
            search,
            ids,
        } => {
            let query = PageQuery {
                search,
                ids,
                ..PageQuery::page(page, size)
            };
            resource.list(&query).await?
        }
        ResourceCommand::Get { id } => resource.get(&id).await?,
        ResourceCommand::Create { data } => resource.create(&parse_json(&data)?).await?,
        ResourceCommand::Update { id, data } => {
            resource.update(&id, &parse_json(&data)?).await?
        }
        ResourceCommand::Delete { id } => resource.delete(&id).await?,
    };

    print_envelope(&envelope, ctx)
}

fn print_envelope(envelope: &Envelope<Value>, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(envelope)?);
        return Ok(());
    }

    if let Some(result) = &envelope.result {
        print_value(result)?;
    }

    if envelope.is_paged() {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to(page_footer(
                envelope.page_number.unwrap_or(1),
                envelope.page_size,
                envelope.total_records.unwrap_or_default(),
            ))
        );
    }

    Ok(())
}

fn page_footer(page: u32, size: Option<u32>, total: u64) -> String {
    match size {
        Some(size) if size > 0 => {
            let pages = total.div_ceil(u64::from(size)).max(1);
            format!("Page {} of {} ({} records)", page, pages, total)
        }
        _ => format!("Page {} ({} records)", page, total),
    }
}
