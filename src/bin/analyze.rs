//! One-shot chart analysis from the command line.
//!
//! Prints the analysis as pretty JSON. Pillars with spaces must be quoted,
//! e.g. `analyze "Giáp Tý" "Bính Dần" "Mậu Thìn" "Canh Ngọ" "sức khỏe"`.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;

use tu_tru::narrative::Language;
use tu_tru::utils::telemetry::init_logging;
use tu_tru::{compute_chart_analysis, PillarInput};

/// Analyze a Tứ Trụ (Four Pillars) chart
#[derive(Parser, Debug)]
#[command(name = "analyze")]
#[command(version)]
#[command(about = "Analyze a Four Pillars chart and print the result as JSON")]
struct Args {
    /// Hour pillar, e.g. "Giáp Tý"
    gio: String,
    /// Day pillar
    ngay: String,
    /// Month pillar
    thang: String,
    /// Year pillar
    nam: String,
    /// Question used to pick the narrative topic
    text: Option<String>,
    /// Answer in English instead of Vietnamese
    #[arg(long)]
    en: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging("tu_tru=warn")?;

    let args = Args::parse();
    let language = if args.en { Language::En } else { Language::Vi };
    let pillars = PillarInput::new(args.gio, args.ngay, args.thang, args.nam);
    let text = args.text.unwrap_or_default();
    debug!("Analyzing {:?} with text {:?}", pillars, text);

    match compute_chart_analysis(&pillars, &text, language) {
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Err(e) => {
            let message = e.bilingual();
            match language {
                Language::Vi => bail!("{}", message.vi),
                Language::En => bail!("{}", message.en),
            }
        }
    }
}
