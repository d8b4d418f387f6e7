use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use talkback_common::Report;
use talkback_config::{ExtractionVariant, TalkbackConfig};

/// Summarize the reader comments of a B92 article.
#[derive(Parser, Debug)]
#[command(name = "talkback")]
#[command(version)]
#[command(about = "Summarize what readers say under a B92 article", long_about = None)]
pub struct Cli {
    /// Full article URL, e.g. https://www.b92.net/info/komentari/2398712
    pub url: String,

    /// YAML configuration file; skipped when absent.
    #[arg(short, long, default_value = "talkback.yaml")]
    pub config: PathBuf,

    /// Override the configured page layout.
    #[arg(long, value_enum)]
    pub variant: Option<VariantArg>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Mirror log events to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantArg {
    Api,
    Scrape,
}

impl From<VariantArg> for ExtractionVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Api => ExtractionVariant::Api,
            VariantArg::Scrape => ExtractionVariant::Scrape,
        }
    }
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply(&self, config: &mut TalkbackConfig) {
        if let Some(variant) = self.variant {
            config.extraction.variant = variant.into();
        }
        if self.verbose {
            config.logging.stderr = true;
        }
    }
}

pub fn render_text(report: &Report) -> String {
    format!(
        "Number of Comments: {}\n\n{}",
        report.num_comments, report.summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_reach_the_config() {
        let cli = Cli::parse_from([
            "talkback",
            "https://www.b92.net/info/vesti/index.php?nav_id=1",
            "--variant",
            "scrape",
            "-v",
        ]);
        let mut cfg = TalkbackConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.extraction.variant, ExtractionVariant::Scrape);
        assert!(cfg.logging.stderr);
        assert_eq!(cli.config, PathBuf::from("talkback.yaml"));
        assert!(!cli.json);
    }

    #[test]
    fn variant_defaults_to_config() {
        let cli = Cli::parse_from(["talkback", "https://www.b92.net/komentari/1"]);
        let mut cfg = TalkbackConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.extraction.variant, ExtractionVariant::Api);
    }

    #[test]
    fn text_report_leads_with_the_count() {
        let text = render_text(&Report::assemble(70, "<p>ok</p>".into()));
        assert_eq!(text, "Number of Comments: 70\n\n<p>ok</p>");
    }
}
