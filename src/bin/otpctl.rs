use anyhow::Context;
use clap::{Parser, Subcommand};
use snsotp::config::DEFAULT_CONFIG_FILE;
use snsotp::{Config, Otp, new_secret};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "otpctl", version, about = "Operator tool for the admin one-time password")]
struct Cli {
    /// YAML config holding the `cred` section
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a fresh Base32 secret for `cred.secret`
    Secret,

    /// Print the otpauth:// provisioning URI
    Uri,

    /// Write the provisioning URI as a QR PNG
    Qr {
        /// Output file
        #[arg(short, long, default_value = "otp.png")]
        output: PathBuf,
    },

    /// Print the code accepted right now
    Code,

    /// Check a code; for HOTP the next counter is printed but not saved
    Verify { code: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snsotp=info,otpctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Secret => {
            println!("{}", new_secret().context("failed to generate secret")?);
        }
        Commands::Uri => {
            println!("{}", load_otp(&cli.config)?.create_uri());
        }
        Commands::Qr { output } => {
            let png = load_otp(&cli.config)?
                .qr_png()
                .context("failed to generate QR code")?;
            std::fs::write(&output, png)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(path = %output.display(), "QR code written");
        }
        Commands::Code => {
            let otp = load_otp(&cli.config)?;
            let code = otp.generate_code().context("failed to generate code")?;
            match otp.counter() {
                Some(counter) => println!("{code} (counter {counter})"),
                None => println!("{code} ({}s left)", otp.ttl()?),
            }
        }
        Commands::Verify { code } => {
            let mut otp = load_otp(&cli.config)?;
            let valid = otp.verify_code(&code).context("failed to verify code")?;
            println!("{}", verify_report(&otp, valid));
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// HOTP verification moves the counter, which this tool cannot persist
fn verify_report(otp: &Otp, valid: bool) -> String {
    let verdict = if valid { "valid" } else { "invalid" };
    match otp.counter() {
        Some(next) => format!("{verdict} (next counter {next}, update cred.counter to keep it)"),
        None => verdict.to_owned(),
    }
}

fn load_otp(path: &Path) -> anyhow::Result<Otp> {
    let config =
        Config::load(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(config.cred.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snsotp::create_code;

    const SECRET: &str = "JBSWY3DPEHPK3PXP";

    #[test]
    fn totp_report_is_the_verdict() {
        let mut otp = Otp::totp(SECRET);
        let code = create_code(SECRET, snsotp::time_interval(90)).unwrap();
        let valid = otp.verify_code_at(&code, 90).unwrap();
        assert_eq!(verify_report(&otp, valid), "valid");
        assert_eq!(verify_report(&otp, false), "invalid");
    }

    #[test]
    fn hotp_report_shows_advanced_counter() {
        let mut otp = Otp::hotp_at(SECRET, 4).with_window(1);
        let code = create_code(SECRET, 5).unwrap();
        let valid = otp.verify_code_at(&code, 0).unwrap();
        assert_eq!(
            verify_report(&otp, valid),
            "valid (next counter 6, update cred.counter to keep it)"
        );

        let valid = otp.verify_code_at("abcdef", 0).unwrap();
        assert_eq!(
            verify_report(&otp, valid),
            "invalid (next counter 7, update cred.counter to keep it)"
        );
    }
}
