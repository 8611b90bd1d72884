use std::path::PathBuf;

use clap::ArgAction;
use log::LevelFilter;

use crate::config::Config;

#[derive(Clone, Debug, clap::Parser)]
#[command(about = "Rewrite a UFO font source in canonical form")]
pub struct Args {
    /// The UFO to normalize
    pub ufo: PathBuf,
    #[arg(short, long)]
    /// Normalize a copy written to this path, leaving the source untouched
    pub output: Option<PathBuf>,
    /// Number of threads used for glyph files
    #[arg(short, long)]
    pub jobs: Option<usize>,
    /// Log more; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn config(&self) -> Config {
        Config {
            source: self.ufo.clone(),
            output: self.output.clone(),
            jobs: self.jobs,
        }
    }

    /// The default log filter, used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["ufonormalizer", "font.ufo"]);
        assert_eq!(args.config(), Config::new("font.ufo"));
        assert_eq!(args.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn all_options() {
        let args = Args::parse_from(["ufonormalizer", "font.ufo", "-o", "out.ufo", "-j", "4", "-vv"]);
        assert_eq!(
            args.config(),
            Config::new("font.ufo").with_output("out.ufo").with_jobs(4)
        );
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn quiet() {
        let args = Args::parse_from(["ufonormalizer", "--quiet", "font.ufo"]);
        assert_eq!(args.log_level(), LevelFilter::Error);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["ufonormalizer", "-q", "-v", "font.ufo"]).is_err());
    }
}
