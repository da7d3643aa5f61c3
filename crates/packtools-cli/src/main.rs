use std::path::{Path, PathBuf};

use clap::{builder::ArgAction, Parser, Subcommand, ValueEnum};
use console::{style, Emoji};
use errors::PacktoolsCliError;
use packtools::{
  models::{
    aff::Affiliation,
    authors::{Authors, Contrib, ContribScope},
  },
  package::SpsPackage,
  validation::{
    journal_meta::{ExpectedJournalMeta, JournalMetaValidation},
    DocumentValidator, StructureValidator,
  },
  xray::Xray,
};
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");
static MISMATCH: Emoji<'_, '_> = Emoji("❌ ", "x ");

#[derive(Parser)]
#[command(author, version, about = "Inspect, describe and validate SciELO Publishing Schema packages")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List members by type and the SHA-1 of every matching package
  Inspect {
    /// Package path or glob pattern, e.g. `packages/*.zip`
    pattern: String,
  },
  /// Print the journal and issue metadata of a package as JSON
  Meta {
    /// Path to the package
    package: PathBuf,
  },
  /// Print the contributors of a package as JSON
  Authors {
    /// Path to the package
    package:   PathBuf,
    /// Which contributors to extract
    #[arg(long, value_enum, default_value_t = Scope::All)]
    scope:     Scope,
    /// Attach the affiliation records each contributor points at
    #[arg(long)]
    with_affs: bool,
  },
  /// Compare the journal metadata of a package against expected values
  Validate {
    /// Path to the package
    package:  PathBuf,
    /// JSON file with the expected journal metadata
    #[arg(long, short)]
    expected: Option<PathBuf>,
  },
  /// Print a checksum of the package file
  Checksum {
    /// Path to the package
    package:   PathBuf,
    /// Digest algorithm
    #[arg(long, short, value_enum, default_value_t = Algorithm::Sha1)]
    algorithm: Algorithm,
  },
  /// Check that the package document has the structure metadata extraction relies on
  Check {
    /// Path to the package
    package: PathBuf,
  },
}

/// Where to look for contributors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scope {
  /// The whole document
  All,
  /// `article-meta` only
  Article,
  /// `sub-article` elements only
  SubArticle,
}

impl From<Scope> for ContribScope {
  fn from(scope: Scope) -> Self {
    match scope {
      Scope::All => ContribScope::All,
      Scope::Article => ContribScope::ArticleMeta,
      Scope::SubArticle => ContribScope::SubArticle,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
  Sha1,
  Sha256,
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  // stdout carries JSON output
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// `~/.config/packtools/journal.json` or the platform equivalent.
fn default_expected_path() -> PathBuf {
  dirs::config_dir().unwrap_or_default().join("packtools").join("journal.json")
}

/// Expands `pattern` into package paths. A path that exists is taken as is.
fn expand(pattern: &str) -> Result<Vec<PathBuf>, PacktoolsCliError> {
  if Path::new(pattern).exists() {
    return Ok(vec![PathBuf::from(pattern)]);
  }
  let paths: Vec<PathBuf> = glob::glob(pattern)?.flatten().collect();
  debug!("Pattern {pattern} matched {} path(s)", paths.len());
  Ok(paths)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), PacktoolsCliError> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn main() -> Result<(), PacktoolsCliError> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match cli.command {
    Commands::Inspect { pattern } => {
      println!("{} Inspecting: {}", style(LOOKING_GLASS).cyan(), style(&pattern).yellow());

      let paths = expand(&pattern)?;
      if paths.is_empty() {
        println!("{} No packages found", style(WARNING).yellow());
        return Ok(());
      }

      for path in paths {
        let package = match SpsPackage::open(&path) {
          Ok(package) => package,
          Err(e) if e.is_package_error() => {
            println!("\n{} Skipping {}: {e}", style(WARNING).yellow(), style(path.display()).yellow());
            continue;
          },
          Err(e) => return Err(e.into()),
        };

        println!("\n{} {}", style(PACKAGE).cyan(), style(path.display()).white().bold());
        for (ext, names) in &package.list_members_by_type() {
          let ext = if ext.is_empty() { "(none)" } else { ext };
          println!("   {} {}", style(format!("{ext}:")).green().bold(), names.join(", "));
        }
        println!("   {} {}", style("sha1:").green().bold(), package.sha1_checksum()?);
      }
      Ok(())
    },

    Commands::Meta { package } => {
      let package = SpsPackage::open(&package)?;
      trace!("Opened {package}");
      print_json(package.meta()?)
    },

    Commands::Authors { package, scope, with_affs } => {
      let package = SpsPackage::open(&package)?;
      let root = package.document()?.root();

      let authors = Authors::new(root);
      let contribs: Vec<Contrib> = if with_affs {
        let index = Affiliation::new(root).affiliation_by_id();
        authors.contribs_with_affs_in(scope.into(), &index).collect()
      } else {
        authors.contribs_in(scope.into())
      };
      debug!("Extracted {} contributor(s) for {scope:?}", contribs.len());
      print_json(&contribs)
    },

    Commands::Validate { package, expected } => {
      let expected_path = expected.unwrap_or_else(default_expected_path);
      if !expected_path.exists() {
        return Err(PacktoolsCliError::ExpectedNotFound(expected_path));
      }
      trace!("Reading expected journal metadata from {}", expected_path.display());
      let expected: ExpectedJournalMeta =
        serde_json::from_str(&std::fs::read_to_string(&expected_path)?)?;

      let package = SpsPackage::open(&package)?;
      let results = JournalMetaValidation::new(package.document()?.root()).validate(&expected);
      print_json(&results)?;

      let mismatches: Vec<_> = results.iter().filter(|result| !result.is_match).collect();
      if mismatches.is_empty() {
        println!("\n{} All journal metadata matches", style(SUCCESS).green());
      } else {
        println!("\n{} {} mismatch(es):", style(WARNING).yellow(), style(mismatches.len()).red());
        for result in mismatches {
          println!(
            "   {} {}: expected {}, found {}",
            style(MISMATCH).red(),
            style(&result.object).bold(),
            style(&result.output_expected).green(),
            style(&result.output_obteined).red()
          );
        }
      }
      Ok(())
    },

    Commands::Checksum { package, algorithm } => {
      let xray = Xray::open(&package)?;
      let digest = match algorithm {
        Algorithm::Sha1 => xray.checksum::<Sha1>()?,
        Algorithm::Sha256 => xray.checksum::<Sha256>()?,
      };
      println!("{digest}  {}", package.display());
      Ok(())
    },

    Commands::Check { package: path } => {
      let package = SpsPackage::open(&path)?;
      println!("{} Checking: {}", style(PAPER).cyan(), style(path.display()).yellow());

      let validator = StructureValidator::default();
      if package.is_valid(&validator)? {
        println!("{} Package structure is valid", style(SUCCESS).green());
        return Ok(());
      }

      let statuses = validator.validate_all(package.document()?);
      for error in statuses.first().map(|status| status.errors.as_slice()).unwrap_or_default() {
        println!("   {} {}", style(MISMATCH).red(), error);
      }
      Err(PacktoolsCliError::InvalidPackage(path))
    },
  }
}
