use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use appstore_core::{ClientConfig, LoginOptions, SearchOptions, SessionCredential, StoreClient};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use dialoguer::{Input, Password};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "App Store configurator protocol client", long_about = None)]
struct Args {
    /// Path to the credential file
    #[arg(long, global = true, env = "APPLE_CRED", default_value = "apple.cred.json")]
    cred: PathBuf,

    /// Path to a TOML client configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and save the session credential
    Login {
        /// Hardware address to present as the device
        #[arg(long, env = "APPLE_MAC")]
        mac: Option<String>,

        /// Account region (ISO 3166-1 alpha-2)
        #[arg(long, env = "APPLE_REGION")]
        region: Option<String>,
    },
    /// Search the public catalog
    Search {
        query: String,

        #[arg(long, env = "APPLE_REGION")]
        region: Option<String>,

        #[arg(long, env = "APPLE_SEARCH_LIMIT", default_value_t = 50)]
        limit: u32,
    },
    /// Negotiate a download with the saved credential
    Download {
        #[arg(long, env = "APPLE_TRACK_ID")]
        track_id: String,
    },
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {}", e);
    }

    if let Err(e) = run(args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ClientConfig::load_from_file(path)?,
        None => ClientConfig::default(),
    };
    debug!(?config, "Loaded configuration");

    match args.command {
        Command::Login { mac, region } => login(&args.cred, config, mac, region),
        Command::Search {
            query,
            region,
            limit,
        } => search(&args.cred, config, query, region, limit),
        Command::Download { track_id } => download(&args.cred, config, &track_id),
    }
}

fn prompt_optional(prompt: &str, value: Option<String>) -> Result<Option<String>> {
    if value.is_some() {
        return Ok(value);
    }
    let answer: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

fn login(
    cred_path: &Path,
    config: ClientConfig,
    mac: Option<String>,
    region: Option<String>,
) -> Result<()> {
    if cred_path.exists() {
        bail!(
            "credential file {} already exists; remove it to sign in again",
            cred_path.display()
        );
    }

    let account_id: String = Input::new().with_prompt("Apple ID").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let mac = prompt_optional("MAC address (blank to detect)", mac)?;
    let region = prompt_optional("Region (blank for US)", region)?;

    let mut options = LoginOptions::new(account_id.trim(), password);
    options.mac_address = mac;
    options.region = region;

    let mut client = StoreClient::new(config)?;
    client.login(options)?;

    let credential = client
        .credential()
        .context("login finished without a credential")?;
    println!(
        "Welcome {} (storefront {})",
        credential.account_id(),
        credential.storefront()
    );
    credential.save(cred_path)?;
    info!(path = %cred_path.display(), "Credential saved");
    Ok(())
}

fn search(
    cred_path: &Path,
    config: ClientConfig,
    query: String,
    region: Option<String>,
    limit: u32,
) -> Result<()> {
    let mut client = StoreClient::new(config)?;
    // A saved credential only contributes its region here.
    if cred_path.exists() {
        client = client.with_credential(SessionCredential::load(cred_path)?);
    }

    let items = client.search(&SearchOptions {
        query,
        region,
        limit,
    })?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "ID", "Name", "Bundle ID", "Genre"]);
    for (index, item) in items.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            item.track_id.to_string(),
            item.track_name.clone(),
            item.bundle_id.clone(),
            item.primary_genre_name.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn download(cred_path: &Path, config: ClientConfig, track_id: &str) -> Result<()> {
    let credential = SessionCredential::load(cred_path)
        .with_context(|| format!("run `appstore login` first ({})", cred_path.display()))?;
    let client = StoreClient::new(config)?.with_credential(credential);

    let result = client.negotiate_download(track_id)?;
    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}
