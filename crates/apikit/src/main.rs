//! apikit command-line client
//!
//! Runs one client operation and prints the resulting envelope as JSON.
//! Credentials come from the environment, optionally seeded from a `.env` file.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::{debug, info};

use apikit_common::{logging, Envelope, FailureKind};
use pagespeed_client::PageSpeedClient;
use supabase_client::{filters, QueryOptions, SupabaseApi};
use unipile_client::UnipileApi;

use cli::{Args, Command, PageSpeedCommand, SupabaseCommand, UnipileCommand};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let loaded = dotenv::dotenv().ok();
    let args = Args::parse();

    logging::init(&args.log_level, args.json_logs)?;
    info!("apikit v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = loaded {
        debug!(path = %path.display(), "loaded environment file");
    }

    let envelope = match args.command {
        Command::Supabase(command) => run_supabase(command).await?,
        Command::Unipile(command) => run_unipile(command).await?,
        Command::Pagespeed(command) => run_pagespeed(command).await?,
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);

    match envelope.kind() {
        None => Ok(ExitCode::SUCCESS),
        Some(kind) => {
            eprintln!("apikit: {}", kind.summary());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_supabase(command: SupabaseCommand) -> anyhow::Result<Envelope> {
    let api = SupabaseApi::from_env()?;

    let envelope = match command {
        SupabaseCommand::Select {
            table,
            filters: pairs,
            columns,
            limit,
            offset,
            order_by,
            desc,
        } => {
            let mut options = QueryOptions::new().columns(columns);
            options.limit = limit;
            options.offset = offset;
            if let Some(column) = order_by {
                options = options.order_by(column, !desc);
            }

            let service = api.table(&table);
            if pairs.is_empty() {
                service.get_all(&options).await
            } else {
                service.find(&filters(pairs), &options).await
            }
        }
        SupabaseCommand::Insert { table, record } => api.quick_insert(&table, &record).await,
        SupabaseCommand::Update {
            table,
            id,
            fields,
            id_column,
        } => api.quick_update(&table, id, &fields, &id_column).await,
        SupabaseCommand::Delete {
            table,
            id,
            id_column,
        } => api.quick_delete(&table, id, &id_column).await,
        SupabaseCommand::Count {
            table,
            filters: pairs,
        } => api.table(&table).count(&filters(pairs)).await,
        SupabaseCommand::Ping => {
            reachability(api.test_connection().await, "Supabase project is not reachable")
        }
    };

    Ok(envelope)
}

async fn run_unipile(command: UnipileCommand) -> anyhow::Result<Envelope> {
    let api = UnipileApi::from_env()?;
    let profiles = api.profiles();

    let envelope = match command {
        UnipileCommand::Profile {
            account_id,
            identifier: Some(identifier),
            provider,
        } => {
            profiles
                .get_user_profile(&account_id, &identifier, &provider)
                .await
        }
        UnipileCommand::Profile {
            account_id,
            identifier: None,
            provider,
        } => profiles.get_own_profile(&account_id, &provider).await,
        UnipileCommand::Compare {
            account_id,
            first,
            second,
            provider,
        } => {
            profiles
                .compare_profiles(&account_id, &first, &second, &provider)
                .await
        }
        UnipileCommand::Ping => {
            reachability(api.test_connection().await, "Unipile API rejected the DSN")
        }
    };

    Ok(envelope)
}

async fn run_pagespeed(command: PageSpeedCommand) -> anyhow::Result<Envelope> {
    let client = PageSpeedClient::from_env()?;

    let envelope = match command {
        PageSpeedCommand::Analyze {
            url,
            strategy,
            categories,
        } => client.analyze_url(&url, strategy, &categories).await,
    };

    Ok(envelope)
}

fn reachability(ok: bool, message: &str) -> Envelope {
    if ok {
        Envelope::success(json!({"reachable": true}))
    } else {
        Envelope::failure(FailureKind::Connection, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachability() {
        let up = reachability(true, "down");
        assert!(up.is_success());
        assert_eq!(up.data(), &json!({"reachable": true}));
        assert_eq!(up.exists(), None);

        let down = reachability(false, "down");
        assert_eq!(down.kind(), Some(FailureKind::Connection));
        assert_eq!(down.error(), Some("down"));
    }
}
