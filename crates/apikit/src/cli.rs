//! Command-line arguments

use clap::{Parser, Subcommand};
use serde_json::Value;

use pagespeed_client::{Category, Strategy};
use unipile_client::Provider;

#[derive(Parser, Debug)]
#[command(name = "apikit")]
#[command(about = "Supabase, Unipile and PageSpeed from the command line", long_about = None)]
#[command(version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "APIKIT_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Table operations against a Supabase project
    #[command(subcommand)]
    Supabase(SupabaseCommand),

    /// LinkedIn profile lookups through Unipile
    #[command(subcommand)]
    Unipile(UnipileCommand),

    /// Google PageSpeed Insights
    #[command(subcommand)]
    Pagespeed(PageSpeedCommand),
}

#[derive(Subcommand, Debug)]
pub enum SupabaseCommand {
    /// Read rows
    Select {
        table: String,
        /// Equality filter, repeatable
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,
        #[arg(short, long, default_value = "*")]
        columns: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        order_by: Option<String>,
        /// Sort descending
        #[arg(long, requires = "order_by")]
        desc: bool,
    },

    /// Insert one JSON object
    Insert {
        table: String,
        #[arg(value_parser = parse_json)]
        record: Value,
    },

    /// Update the row with the given id
    Update {
        table: String,
        #[arg(value_parser = parse_scalar)]
        id: Value,
        #[arg(value_parser = parse_json)]
        fields: Value,
        #[arg(long, default_value = "id")]
        id_column: String,
    },

    /// Delete the row with the given id
    Delete {
        table: String,
        #[arg(value_parser = parse_scalar)]
        id: Value,
        #[arg(long, default_value = "id")]
        id_column: String,
    },

    /// Count matching rows
    Count {
        table: String,
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,
    },

    /// Check that the project is reachable
    Ping,
}

#[derive(Subcommand, Debug)]
pub enum UnipileCommand {
    /// Fetch a profile; the account owner's when no identifier is given
    Profile {
        account_id: String,
        /// Public identifier, provider id or profile URL
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short, long, default_value = "LINKEDIN")]
        provider: Provider,
    },

    /// Fetch two profiles side by side
    Compare {
        account_id: String,
        first: String,
        second: String,
        #[arg(short, long, default_value = "LINKEDIN")]
        provider: Provider,
    },

    /// Check that the DSN is accepted
    Ping,
}

#[derive(Subcommand, Debug)]
pub enum PageSpeedCommand {
    /// Run Lighthouse against a URL
    Analyze {
        url: String,
        #[arg(short, long, default_value = "mobile")]
        strategy: Strategy,
        /// Category to score, repeatable; defaults to the four standard ones
        #[arg(short = 'C', long = "category")]
        categories: Vec<Category>,
    },
}

/// Parse a `column=value` filter
fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got `{raw}`"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in `{raw}`"));
    }
    Ok((column.to_string(), parse_scalar(value)?))
}

/// JSON literal when it parses as one, otherwise the raw string
fn parse_scalar(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_string())
    }
}
