use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a manifest and report its annotations.
    Check(CheckArgs),
    /// Extract all annotations from a manifest into one AnnotationPage/List.
    Extract(ExtractArgs),
    /// Insert annotations into a manifest and write a new manifest.
    Insert(InsertArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Input manifest file or URL (JSON).
    #[arg(short = 'i', long)]
    pub input_manifest: String,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Input manifest file or URL (JSON).
    #[arg(short = 'i', long)]
    pub input_manifest: String,

    /// Output AnnotationPage/List file (JSON).
    #[arg(long)]
    pub output_file: String,

    /// Output directory for generated files.
    #[arg(long)]
    pub output_directory: Option<String>,

    /// URL prefix for the generated AnnotationPage/List identifier.
    #[arg(long)]
    pub url_prefix: Option<String>,
}

#[derive(Debug, Args)]
pub struct InsertArgs {
    /// Input manifest file or URL (JSON).
    #[arg(short = 'i', long)]
    pub input_manifest: String,

    /// Input AnnotationPage/List file or URL (JSON).
    #[arg(long)]
    pub input_file: String,

    /// Output manifest filename (JSON).
    #[arg(long)]
    pub output_manifest: String,

    /// Output directory for the manifest and AnnotationPage/List files.
    #[arg(long)]
    pub output_directory: Option<String>,

    /// URL prefix for AnnotationPage/List references and the manifest.
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Mode of storing annotations in the manifest.
    #[arg(long, value_enum, default_value = "reference")]
    pub reference_mode: ReferenceMode,

    /// Naming scheme for generated AnnotationPage/List files.
    #[arg(long, value_enum, default_value = "sequence")]
    pub annolist_name_scheme: NamingScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReferenceMode {
    /// Embed the full annotation container in the canvas.
    Inline,
    /// Write the container to its own file and reference it from the canvas.
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingScheme {
    /// Name container files after the last path segment of the canvas id.
    Canvas,
    /// Number container files in canvas traversal order.
    Sequence,
}
