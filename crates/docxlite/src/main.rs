#![doc = include_str!("../README.md")]

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use docxlite::{DocxExport, ExportFeat, Result};

/// Export rich-text markup or a rendered template to a DOCX file.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct ExportArgs {
    /// Path to the markup or template file
    #[clap(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to output file, `-` for stdout
    #[clap(value_name = "OUTPUT", default_value = None)]
    pub output: Option<String>,

    /// Path to a JSON file binding template values; when given, the input is
    /// rendered as a template before export
    #[clap(long, value_name = "VALUES")]
    pub values: Option<PathBuf>,

    /// Remove the editor's placeholder highlight wrappers before rendering
    #[clap(long)]
    pub strip_decorations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = ExportArgs::parse();

    let markup = std::fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read {}: {err}", args.input.display()))?;

    let exporter = DocxExport::new().with_feature(ExportFeat {
        strip_decorations: args.strip_decorations,
    });

    let result = match &args.values {
        Some(path) => {
            let values = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            let values: serde_json::Value = serde_json::from_str(&values)
                .map_err(|err| format!("failed to parse values file: {err}"))?;
            exporter.export_template(&markup, &values).await?
        }
        None => exporter.export(&markup).await?,
    };

    let is_stdout = args.output.as_deref() == Some("-");
    let output_path = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| args.input.with_extension("docx"));

    if is_stdout {
        std::io::stdout().write_all(&result)?;
    } else {
        std::fs::write(&output_path, &result)
            .map_err(|err| format!("failed to write file {output_path:?}: {err}"))?;
    }

    Ok(())
}
