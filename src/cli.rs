use crate::history::downsample::TierTransition;
use crate::history::tier::DurationKey;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "smart-health",
    version,
    about = "SMART attribute health evaluation and tiered history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a smartctl JSON report and print the snapshot.
    Evaluate(ReportArgs),
    /// Evaluate a report and append it to the primary tier.
    Ingest(ReportArgs),
    /// Print attribute history for one device, newest first.
    History(HistoryArgs),
    /// Print hourly temperature history for every device.
    Temperature(TemperatureArgs),
    /// Run one downsample transition now.
    Downsample(DownsampleArgs),
    /// Run the downsample schedules and retention sweep until interrupted.
    Serve,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    pub report: PathBuf,
    #[arg(long)]
    pub wwn: String,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(long)]
    pub wwn: String,
    #[arg(long, default_value = "week")]
    pub duration: DurationKey,
    /// Zero returns every point in range.
    #[arg(long, default_value_t = 1)]
    pub limit: usize,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Restrict output to these attribute ids; repeatable.
    #[arg(long = "attribute")]
    pub attributes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TemperatureArgs {
    #[arg(long, default_value = "week")]
    pub duration: DurationKey,
}

#[derive(Args, Debug)]
pub struct DownsampleArgs {
    pub transition: TierTransition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_flags_parse() {
        let cli = Cli::try_parse_from([
            "smart-health",
            "history",
            "--wwn",
            "0x5000",
            "--duration",
            "forever",
            "--limit",
            "6",
            "--offset",
            "4",
            "--attribute",
            "5",
            "--attribute",
            "197",
        ])
        .expect("parse");
        match cli.command {
            Commands::History(args) => {
                assert_eq!(args.duration, DurationKey::Forever);
                assert_eq!((args.limit, args.offset), (6, 4));
                assert_eq!(args.attributes, vec!["5".to_string(), "197".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_duration_and_transition_are_rejected() {
        assert!(Cli::try_parse_from(["smart-health", "temperature", "--duration", "decade"]).is_err());
        assert!(Cli::try_parse_from(["smart-health", "downsample", "daily"]).is_err());
        let cli = Cli::try_parse_from(["smart-health", "downsample", "yearly"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Downsample(DownsampleArgs {
                transition: TierTransition::Yearly
            })
        ));
    }
}
