//! Command-line interface for the mdi-check tool
//!
//! The surface is deliberately small: one required domain plus two switches,
//! one for the output format and one for the government cloud endpoint.
//! Logging verbosity is controlled through `RUST_LOG`, not through flags.

use clap::Parser;

use crate::http::Cloud;
use crate::output::OutputMode;

/// Main command-line interface structure
///
/// # Examples
///
/// ```
/// use clap::Parser;
/// use mdi_check::cli::Cli;
/// use mdi_check::http::Cloud;
///
/// let cli = Cli::try_parse_from(["mdi-check", "-d", "example.com", "--gov"]).unwrap();
/// assert_eq!(cli.domain, "example.com");
/// assert_eq!(cli.cloud(), Cloud::Government);
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "mdi-check",
    about = "Enumerates valid Microsoft 365 domains, retrieves tenant name, and checks for an MDI instance",
    version
)]
pub struct Cli {
    /// Input domain name, example format: example.com
    #[arg(short, long)]
    pub domain: String,

    /// Print the result as a single JSON object
    #[arg(short, long)]
    pub json: bool,

    /// Query the government cloud Autodiscover endpoint
    #[arg(long)]
    pub gov: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_json_flag(self.json)
    }

    pub fn cloud(&self) -> Cloud {
        Cloud::from_gov_flag(self.gov)
    }
}
