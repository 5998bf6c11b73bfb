use clap::Parser;
use etool::sidecar::{self, ProjectSummary, SummaryKey};
use etool::ELangFile;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "etool",
    version,
    about = "Read and write project info for E language source files",
    after_help = "\
Examples:
  show project info:        etool file.e
  export to package.json:   etool -o package.json -F version,name,author file.e
  update and save in place: etool -w -n \"test project\" -v 1.1.0 file.e
  update from JSON:         etool -w -i ./info.json -f version -s new-file.e file.e"
)]
struct Cli {
    /// E language file (.e / .ec)
    file: PathBuf,

    /// Change project name
    #[arg(short, long)]
    name: Option<String>,
    /// Change project description
    #[arg(short, long)]
    description: Option<String>,
    /// Change project author
    #[arg(short, long)]
    author: Option<String>,
    /// Change major version number
    #[arg(short = 'M', long, allow_hyphen_values = true)]
    major: Option<i32>,
    /// Change minor version number
    #[arg(short, long, allow_hyphen_values = true)]
    minor: Option<i32>,
    /// Change patch version number
    #[arg(short, long, allow_hyphen_values = true)]
    patch: Option<i32>,
    /// Change date version number (yyMMdd)
    #[arg(short = 'D', long, allow_hyphen_values = true)]
    date: Option<i32>,
    /// Change project version (major.minor.patch)
    #[arg(short = 'v', long = "ver")]
    ver: Option<String>,
    /// Change full version (major.minor.patch.date)
    #[arg(long)]
    full_version: Option<String>,

    /// JSON file to read field values from
    #[arg(short, long)]
    input_json: Option<PathBuf>,
    /// Fields to read from the input JSON (comma separated)
    #[arg(short = 'f', long)]
    read_json_fields: Option<String>,
    /// JSON file to write project info into
    #[arg(short, long)]
    out_json: Option<PathBuf>,
    /// Fields to write to the output JSON and to display (comma separated)
    #[arg(short = 'F', long)]
    write_json_fields: Option<String>,

    /// Save the new values to the E language file
    #[arg(short, long)]
    write: bool,
    /// E language file to write to instead of FILE
    #[arg(short, long)]
    save_to_file: Option<PathBuf>,
}

impl Cli {
    /// Field edits given on the command line, in application order.
    fn edits(&self) -> Vec<(SummaryKey, String)> {
        let int = |n: Option<i32>| n.map(|n| n.to_string());
        let values = [
            self.name.clone(),
            self.description.clone(),
            self.author.clone(),
            int(self.major),
            int(self.minor),
            int(self.patch),
            int(self.date),
            self.ver.clone(),
            self.full_version.clone(),
        ];
        SummaryKey::ALL
            .into_iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut file = ELangFile::open(&cli.file)?;

    for (key, value) in cli.edits() {
        key.apply(file.info_mut(), &value)?;
    }

    // Values from the input JSON override command-line flags.
    if let Some(path) = &cli.input_json {
        let keys = selection(cli.read_json_fields.as_deref())?;
        let document = sidecar::read_document(path);
        let applied = sidecar::import_from(&document, &keys, file.info_mut())?;
        info!(path = %path.display(), applied = applied.len(), "applied JSON fields");
    }

    let summary = ProjectSummary::from(file.info());
    let shown_keys = selection(cli.write_json_fields.as_deref())?;

    if let Some(path) = &cli.out_json {
        let document = sidecar::export_into(sidecar::read_document(path), &summary, &shown_keys);
        sidecar::write_document(path, &document)?;
        info!(path = %path.display(), "wrote project info");
    }

    if cli.write {
        let target = cli.save_to_file.as_ref().unwrap_or(&cli.file);
        file.save_to(target)?;
        info!(path = %target.display(), "saved project file");
    }

    let shown = sidecar::display_map(&summary, &shown_keys);
    if !shown.is_empty() {
        println!("{}", serde_json::to_string_pretty(&Value::Object(shown))?);
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn selection(list: Option<&str>) -> Result<Vec<SummaryKey>, sidecar::SidecarError> {
    match list {
        Some(list) => SummaryKey::parse_list(list),
        None       => Ok(SummaryKey::ALL.to_vec()),
    }
}
