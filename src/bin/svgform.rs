use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{SeedableRng as _, rngs::StdRng};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "svgform", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the field definitions of a template as JSON.
    Fields(FieldsArgs),
    /// Evaluate a generation rule.
    Generate(GenerateArgs),
    /// Replay a patch list against a base document.
    Replay(ReplayArgs),
    /// Write field values into a template.
    Render(RenderArgs),
    /// Detect marker geometry in an image and print it as JSON.
    Detect(DetectArgs),
}

#[derive(Parser, Debug)]
struct FieldsArgs {
    /// Input SVG template.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Rule source, e.g. `FL(rn[5])`.
    #[arg(long)]
    rule: String,

    /// Known field value as `name=value`; may be repeated.
    #[arg(long = "field", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,

    #[arg(long)]
    max_length: Option<usize>,

    /// Seed for reproducible random directives.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Base SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON array of patches.
    #[arg(long)]
    patches: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input SVG template.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON object of field values by field id.
    #[arg(long)]
    values: Option<PathBuf>,

    /// Font file used for line metrics; may be repeated.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Seed for generated values.
    #[arg(long)]
    seed: Option<u64>,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Image to scan (any format the `image` crate decodes).
    #[arg(long)]
    image: PathBuf,

    /// Detector configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Fields(args) => cmd_fields(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Replay(args) => cmd_replay(args),
        Command::Render(args) => cmd_render(args),
        Command::Detect(args) => cmd_detect(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected name=value, got '{s}'"))
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn read_document(path: &Path) -> anyhow::Result<svgform::Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    let doc = svgform::Document::parse(&text)
        .with_context(|| format!("parse document '{}'", path.display()))?;
    Ok(doc)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse JSON '{}'", path.display()))?;
    Ok(value)
}

fn write_document(doc: &svgform::Document, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let xml = doc.to_xml_string()?;
    std::fs::write(out, xml).with_context(|| format!("write svg '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_fields(args: FieldsArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let fields = svgform::parse_fields(&doc);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let known: svgform::KnownFields = args.fields.into_iter().collect();
    let mut rng = make_rng(args.seed);
    let value = svgform::generate_with(&args.rule, &known, args.max_length, &mut rng);
    println!("{value}");
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let base = read_document(&args.in_path)?;
    let patches: Vec<svgform::Patch> = read_json(&args.patches)?;
    let (doc, report) = svgform::replay(&base, &patches);
    for skipped in &report.skipped {
        eprintln!(
            "skipped patch #{} ({}): {:?}",
            skipped.index, skipped.id, skipped.reason
        );
    }
    eprintln!("applied {}/{}", report.applied, report.total);
    write_document(&doc, &args.out)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let mut fields = svgform::parse_fields(&doc);
    if let Some(path) = &args.values {
        let values: BTreeMap<String, svgform::FieldValue> = read_json(path)?;
        svgform::apply_values(&mut fields, &values);
    }
    svgform::resolve_generated(&mut fields, &mut make_rng(args.seed));

    let mut metrics = svgform::ParleyFontMetrics::new();
    for font in &args.fonts {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        let families = metrics
            .register_font(&bytes)
            .with_context(|| format!("register font '{}'", font.display()))?;
        tracing::debug!(font = %font.display(), ?families, "registered font");
    }

    let (out, report) = svgform::render(&doc, &fields, &mut metrics);
    if !report.missing.is_empty() {
        eprintln!("missing targets: {}", report.missing.join(", "));
    }
    eprintln!("rendered {} field(s)", report.rendered);
    write_document(&out, &args.out)
}

fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let config: svgform::DetectorConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => svgform::DetectorConfig::default(),
    };
    let img = image::open(&args.image)
        .with_context(|| format!("decode image '{}'", args.image.display()))?
        .to_rgba8();
    let result = svgform::detect_image(&img, &config);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
