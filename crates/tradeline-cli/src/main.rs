//! Tradeline CLI - Call inspection and simulation
//!
//! Talks to a running Tradeline server the way an operator or the voice
//! provider would.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;
use uuid::Uuid;

use api::{PolishedOutcome, TradelineClient, VoiceResponse};
use config::Config;

const INCOMING_PATH: &str = "/webhooks/voice/incoming";
const STEP_PATH: &str = "/webhooks/voice/transcription-available";

/// Scripted steps in the order the server asks for them
const SCRIPTED_STEPS: [&str; 3] = ["job-details", "address-details", "final-notes"];

#[derive(Parser)]
#[command(name = "tradeline")]
#[command(about = "Tradeline CLI - Call inspection and simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the server URL and debug API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
        /// Server base URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// List recorded calls
    Calls {
        /// Show at most this many calls
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Print each call's steps
        #[arg(long)]
        steps: bool,
    },

    /// Show LLM-extracted summaries of recorded calls
    Polished,

    /// Replay a scripted call against the server
    Simulate {
        /// Caller number (defaults to config)
        #[arg(long)]
        from: Option<String>,
        /// Business virtual number (defaults to config)
        #[arg(long)]
        to: Option<String>,
        /// Call identifier (random when omitted)
        #[arg(long)]
        call_sid: Option<String>,
        /// What the caller says for the job description
        #[arg(long, default_value = "fix my switchboard")]
        job: String,
        /// What the caller says for the address
        #[arg(long, default_value = "42 Main St")]
        address: String,
        /// What the caller says as final notes
        #[arg(long, default_value = "thanks")]
        notes: String,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { key, url } => cmd_login(key, url).await,
        Commands::Calls { limit, steps } => cmd_calls(limit, steps).await,
        Commands::Polished => cmd_polished().await,
        Commands::Simulate {
            from,
            to,
            call_sid,
            job,
            address,
            notes,
        } => cmd_simulate(from, to, call_sid, [job, address, notes]).await,
        Commands::Config => cmd_config(),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(key: Option<String>, url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = url {
        config.set_base_url(url);
    }

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("API Key")
            .interact()
            .context("Failed to read API key")?,
    };

    let client = TradelineClient::new(&config.base_url, Some(&api_key));
    print!("Testing connection... ");

    match client.health().await {
        Ok(true) => println!("{}", "OK".green()),
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not reach Tradeline at {}", config.base_url);
        }
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);

    Ok(())
}

async fn cmd_calls(limit: usize, show_steps: bool) -> Result<()> {
    let config = Config::load()?;
    let client = TradelineClient::new(&config.base_url, config.api_key.as_deref());

    let calls = client.list_calls().await?;

    if calls.is_empty() {
        println!("No calls recorded.");
        return Ok(());
    }

    println!("{} ({} total):", "Calls".bold(), calls.len());
    for call in calls.iter().take(limit) {
        println!(
            "  {} {} {} → {} {}",
            call.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            call.call_sid.cyan(),
            call.from,
            call.to,
            status_badge(&call.status)
        );

        if show_steps {
            for step in &call.steps {
                println!("      {} {}", format!("[{}]", step.name).dimmed(), step.text);
            }
            if let Some(url) = &call.recording_url {
                println!("      {} {}", "recording".dimmed(), url);
            }
        } else if let Some(transcript) = &call.transcript {
            println!("      {}", truncate_string(&transcript.replace('\n', " "), 70).dimmed());
        }
    }

    Ok(())
}

async fn cmd_polished() -> Result<()> {
    let config = Config::load()?;
    let client = TradelineClient::new(&config.base_url, config.api_key.as_deref());

    match client.polished_calls().await? {
        PolishedOutcome::Empty { error } => println!("{}", error.yellow()),
        PolishedOutcome::Calls(calls) => {
            println!("{} ({}):", "Enquiries".bold(), calls.len());
            for call in calls {
                let customer = call.customerdetails;
                println!("  {}", call.details.cyan());
                println!(
                    "      {} {}  {} {}",
                    "name".dimmed(),
                    customer.name.as_deref().unwrap_or("-"),
                    "phone".dimmed(),
                    customer.phone.as_deref().unwrap_or("-")
                );
                println!(
                    "      {} {}",
                    "address".dimmed(),
                    customer.address.as_deref().unwrap_or("-")
                );
                if let Some(email) = customer.email {
                    println!("      {} {}", "email".dimmed(), email);
                }
            }
        }
    }

    Ok(())
}

async fn cmd_simulate(
    from: Option<String>,
    to: Option<String>,
    call_sid: Option<String>,
    answers: [String; 3],
) -> Result<()> {
    let config = Config::load()?;
    let client = TradelineClient::new(&config.base_url, config.api_key.as_deref());

    let from = from.unwrap_or(config.simulation.from);
    let to = to.unwrap_or(config.simulation.to);
    let call_sid = call_sid.unwrap_or_else(simulated_call_sid);

    println!("{} {} ({} → {})", "Simulating".bold(), call_sid.cyan(), from, to);

    let base = [("CallSid", call_sid.as_str()), ("From", from.as_str()), ("To", to.as_str())];

    let reply = client.post_callback(INCOMING_PATH, None, &base).await?;
    print_reply(&reply);
    if reply.ends_call() {
        println!("{}", "Call ended before any step.".yellow());
        return Ok(());
    }

    for (step, answer) in SCRIPTED_STEPS.iter().zip(answers.iter()) {
        println!("  {} {}", "caller:".green(), answer);

        let mut fields = base.to_vec();
        fields.push(("SpeechResult", answer.as_str()));

        let reply = client.post_callback(STEP_PATH, Some(step), &fields).await?;
        print_reply(&reply);
        if reply.ends_call() {
            break;
        }
    }

    println!("\n{}", "Inspect the record with:".dimmed());
    println!("  tradeline calls --steps");

    Ok(())
}

fn print_reply(reply: &VoiceResponse) {
    for line in &reply.spoken {
        println!("  {} {}", "server:".blue(), line);
    }
    if let Some(number) = &reply.dials {
        println!("  {} {}", "dial:".blue(), number);
    }
    if reply.hangs_up {
        println!("  {}", "(hangup)".dimmed());
    }
}

fn simulated_call_sid() -> String {
    format!("CA{}", Uuid::new_v4().simple())
}

fn status_badge(status: &str) -> colored::ColoredString {
    match status {
        "PROCESSED" => status.green(),
        "PROCESSING" => status.yellow(),
        _ => status.dimmed(),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!(
        "  API Key: {}",
        if config.api_key.is_some() { "Set".green() } else { "Not set".red() }
    );
    println!(
        "  Simulation: {} → {}",
        config.simulation.from.cyan(),
        config.simulation.to.cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_counts_chars() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("42 Main Street", 7), "42 Main...");
        assert_eq!(truncate_string("ééééé", 2), "éé...");
    }

    #[test]
    fn test_simulated_call_sid_shape() {
        let sid = simulated_call_sid();
        assert!(sid.starts_with("CA"));
        assert_eq!(sid.len(), 34);
    }

    #[test]
    fn test_cli_parses_simulate_defaults() {
        let cli = Cli::try_parse_from(["tradeline", "simulate", "--to", "+61400000000"]).unwrap();
        match cli.command {
            Commands::Simulate { to, job, notes, .. } => {
                assert_eq!(to.as_deref(), Some("+61400000000"));
                assert_eq!(job, "fix my switchboard");
                assert_eq!(notes, "thanks");
            }
            _ => panic!("expected simulate"),
        }
    }
}
