use clap::{Parser, Subcommand};

use oca_core::config::{CoreConfig, LimitsConfig, PrefixPolicy, SaidConfig};
use oca_core::hash::DigestAlgorithm;

#[derive(Parser, Debug, Clone)]
#[command(name = "oca", version, about = "Secure OCA bundles with self-addressing identifiers")]
pub struct Cli {
    /// Emit compact JSON on stdout instead of pretty-printed JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Write log lines to stderr as JSON (filter with RUST_LOG).
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Digest algorithm used to derive identifiers (blake3, sha256).
    #[arg(long, global = true, value_parser = parse_algorithm, default_value = "blake3")]
    pub algorithm: DigestAlgorithm,

    /// Strip every leading 'A' before prepending the derivation code
    /// (compatibility with older bundles; identifiers may be shorter than 44).
    #[arg(long, global = true)]
    pub strip_all_leading: bool,

    /// Maximum nesting depth accepted while canonicalizing.
    #[arg(long, global = true, default_value_t = LimitsConfig::default().max_depth)]
    pub max_depth: usize,

    #[command(subcommand)]
    pub command: Command,
}

fn parse_algorithm(s: &str) -> Result<DigestAlgorithm, String> {
    DigestAlgorithm::parse(s).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draft an unsecured bundle from a schema file.
    Draft {
        /// Schema JSON: {"name", "description", "issuer"?, "attributes": [...]}
        schema: String,
        /// Write the bundle here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Secure a bundle: derive the capture base digest and chain every overlay to it.
    Secure {
        /// Bundle JSON file.
        bundle: String,
        /// Write the secured bundle here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Recompute every digest of a secured bundle and report mismatches.
    Verify {
        /// Secured bundle JSON file.
        bundle: String,
    },

    /// Print the first overlay of the given type.
    Overlay {
        /// Bundle JSON file.
        bundle: String,
        /// Overlay type tag, e.g. spec/overlays/label/1.0
        #[arg(long = "type")]
        type_tag: String,
    },

    /// Derive the identifier of a single record (its `digest` field is replaced by the placeholder).
    Said {
        /// Record JSON file.
        record: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    pub fn core_config(&self) -> CoreConfig {
        let prefix_policy = if self.strip_all_leading {
            PrefixPolicy::StripAllLeading
        } else {
            PrefixPolicy::FixedWidth
        };
        CoreConfig {
            said: SaidConfig {
                algorithm: self.algorithm,
                prefix_policy,
            },
            limits: LimitsConfig {
                max_depth: self.max_depth,
                ..LimitsConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_core_config() {
        let cli = Cli::try_parse_from([
            "oca",
            "--algorithm",
            "sha256",
            "--strip-all-leading",
            "--max-depth",
            "8",
            "verify",
            "b.json",
        ])
        .unwrap();
        let cfg = cli.core_config();
        assert_eq!(cfg.said.algorithm, DigestAlgorithm::Sha2_256);
        assert_eq!(cfg.said.prefix_policy, PrefixPolicy::StripAllLeading);
        assert_eq!(cfg.limits.max_depth, 8);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["oca", "overlay", "b.json", "--type", "x"]).unwrap();
        assert_eq!(cli.core_config(), CoreConfig::default());
    }

    #[test]
    fn unknown_algorithm_rejected() {
        assert!(Cli::try_parse_from(["oca", "--algorithm", "md5", "said", "r.json"]).is_err());
        let cli = Cli::try_parse_from(["oca", "--algorithm", "sha2-256", "said", "r.json"]).unwrap();
        assert_eq!(cli.algorithm, DigestAlgorithm::Sha2_256);
    }
}
