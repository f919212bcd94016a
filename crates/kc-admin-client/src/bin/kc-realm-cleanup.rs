// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Keycloak Realm Cleanup
//!
//! Deletes every realm except `master` from a Keycloak server. Meant for
//! resetting development and CI instances.
//!
//! Usage:
//!   kc-realm-cleanup [--dry-run] [--keep <realm>]...

use std::collections::BTreeSet;
use std::process::ExitCode;

use kc_admin_client::{AdminConfig, KeycloakAdmin};
use tracing::{info, warn};

const MASTER_REALM: &str = "master";

fn print_usage() {
    eprintln!(
        r#"Usage: kc-realm-cleanup [options]

Delete all realms except master from a Keycloak server.

OPTIONS:
    --dry-run                       List the realms that would be deleted
    --keep <realm>                  Keep this realm as well (repeatable)
    -h, --help                      Show this help

ENVIRONMENT:
    KEYCLOAK_BASE_URL               Server base URL (required)
    KEYCLOAK_ADMIN_USERNAME         Admin username in the master realm (required)
    KEYCLOAK_ADMIN_PASSWORD         Admin password (required)
    KEYCLOAK_ADMIN_CLIENT_ID        Client for the password grant (default: admin-cli)

EXAMPLES:
    # Preview
    kc-realm-cleanup --dry-run

    # Delete everything but master and a shared fixture realm
    kc-realm-cleanup --keep fixtures
"#
    );
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Cleanup { dry_run: bool, keep: Vec<String> },
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

fn parse_args_from_vec(args: &[String]) -> Result<Command, String> {
    let mut dry_run = false;
    let mut keep = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "help" | "--help" | "-h" => return Ok(Command::Help),
            "--dry-run" => dry_run = true,
            "--keep" => {
                i += 1;
                let realm = args.get(i).ok_or("--keep requires a realm name")?;
                if realm.trim().is_empty() {
                    return Err("--keep requires a realm name".to_string());
                }
                keep.push(realm.clone());
            }
            arg => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    Ok(Command::Cleanup { dry_run, keep })
}

/// Realms to delete, in listing order. `master` is never included.
fn realms_to_delete(realms: &[String], keep: &[String]) -> Vec<String> {
    let keep: BTreeSet<&str> = keep
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(MASTER_REALM))
        .collect();
    realms
        .iter()
        .filter(|realm| !keep.contains(realm.as_str()))
        .cloned()
        .collect()
}

/// Password grant against `master`, whatever realm the environment names.
fn cleanup_config() -> kc_admin_client::Result<AdminConfig> {
    AdminConfig::from_lookup(|key| match key {
        "KEYCLOAK_REALM" => Some(MASTER_REALM.to_string()),
        "KEYCLOAK_AUTH_METHOD" => Some("password".to_string()),
        _ => std::env::var(key).ok(),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kc_realm_cleanup=info,kc_admin_client=warn".into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let (dry_run, keep) = match parse_args() {
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Cleanup { dry_run, keep }) => (dry_run, keep),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = match cleanup_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let admin = match KeycloakAdmin::new(config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to create admin client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_cleanup(&admin, dry_run, &keep).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_cleanup(admin: &KeycloakAdmin, dry_run: bool, keep: &[String]) -> Result<(), String> {
    let realms: Vec<String> = admin
        .realms()
        .list()
        .await
        .map_err(|e| format!("Failed to list realms: {}", e))?
        .into_iter()
        .filter_map(|realm| realm.realm)
        .collect();

    let targets = realms_to_delete(&realms, keep);
    info!(
        total = realms.len(),
        to_delete = targets.len(),
        dry_run,
        "Realm cleanup planned"
    );

    if targets.is_empty() {
        println!("Nothing to delete");
        return Ok(());
    }

    if dry_run {
        for realm in &targets {
            println!("would delete {}", realm);
        }
        return Ok(());
    }

    let mut failed = Vec::new();
    for realm in &targets {
        match admin.realms().delete(realm).await {
            Ok(()) => println!("deleted {}", realm),
            Err(e) => {
                println!("FAILED {}: {}", realm, e);
                failed.push(realm.as_str());
            }
        }
    }

    println!(
        "{} deleted, {} failed",
        targets.len() - failed.len(),
        failed.len()
    );

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("Could not delete: {}", failed.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    fn names(a: &[&str]) -> Vec<String> {
        args(a)
    }

    // ==========================================================================
    // parse_args_from_vec
    // ==========================================================================

    #[test]
    fn test_parse_no_args() {
        let result = parse_args_from_vec(&args(&["kc-realm-cleanup"]));
        assert_eq!(
            result.unwrap(),
            Command::Cleanup {
                dry_run: false,
                keep: vec![]
            }
        );
    }

    #[test]
    fn test_parse_help() {
        for flag in ["help", "--help", "-h"] {
            let result = parse_args_from_vec(&args(&["kc-realm-cleanup", flag]));
            assert_eq!(result.unwrap(), Command::Help);
        }
    }

    #[test]
    fn test_parse_dry_run_and_keep() {
        let result = parse_args_from_vec(&args(&[
            "kc-realm-cleanup",
            "--keep",
            "fixtures",
            "--dry-run",
            "--keep",
            "demo",
        ]));
        assert_eq!(
            result.unwrap(),
            Command::Cleanup {
                dry_run: true,
                keep: names(&["fixtures", "demo"])
            }
        );
    }

    #[test]
    fn test_parse_keep_missing_value() {
        let result = parse_args_from_vec(&args(&["kc-realm-cleanup", "--keep"]));
        assert_eq!(result.unwrap_err(), "--keep requires a realm name");
    }

    #[test]
    fn test_parse_unknown_argument() {
        let result = parse_args_from_vec(&args(&["kc-realm-cleanup", "--force"]));
        assert!(result.unwrap_err().contains("Unknown argument"));
    }

    // ==========================================================================
    // realms_to_delete
    // ==========================================================================

    #[test]
    fn test_master_is_never_deleted() {
        let realms = names(&["master", "acme", "test-1"]);
        assert_eq!(realms_to_delete(&realms, &[]), names(&["acme", "test-1"]));
    }

    #[test]
    fn test_keep_list_is_respected() {
        let realms = names(&["master", "acme", "fixtures", "test-1"]);
        assert_eq!(
            realms_to_delete(&realms, &names(&["fixtures"])),
            names(&["acme", "test-1"])
        );
    }

    #[test]
    fn test_only_master_leaves_nothing() {
        assert!(realms_to_delete(&names(&["master"]), &[]).is_empty());
    }
}
