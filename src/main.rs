use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use whitepoint::{
    logging, Corrector, GpuRenderer, RenderBackend, Rgb, Sampler, Settings, SourceImage,
    WhiteBalance,
};

#[derive(Parser)]
#[command(name = "whitepoint")]
#[command(version, about = "Correct white balance from a picked neutral point", long_about = None)]
struct Cli {
    /// Input image
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// X coordinate of the neutral point, in source pixels
    #[arg(short, long, allow_negative_numbers = true)]
    x: i64,

    /// Y coordinate of the neutral point, in source pixels
    #[arg(short, long, allow_negative_numbers = true)]
    y: i64,

    /// Side length of the averaged square
    #[arg(long, value_name = "N")]
    size: Option<f64>,

    /// Balance in linear light (true) or display space (false); defaults to the saved setting
    #[arg(long, value_name = "BOOL")]
    linear: Option<bool>,

    /// Target colour for the picked point
    #[arg(long, value_name = "R,G,B")]
    target: Option<String>,

    /// Additive bias applied after the multiplier
    #[arg(long, value_name = "R,G,B", allow_hyphen_values = true)]
    bias: Option<String>,

    /// Render on the CPU even when a GPU is available
    #[arg(long)]
    cpu: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn linear_space(&self, settings: &Settings) -> bool {
        self.linear.unwrap_or(settings.linear_space)
    }
}

fn acquire_gpu() -> whitepoint::Result<Box<dyn RenderBackend>> {
    let renderer = GpuRenderer::acquire()?;
    tracing::debug!("GPU adapter: {}", renderer.adapter_summary());
    Ok(Box::new(renderer))
}

fn parse_triple(value: &str) -> Result<Rgb> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("'{}' is not a list of numbers", value))?;
    Ok(Rgb::from_slice(&parts)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug);

    let settings = Settings::load();

    let decoded = image::open(&cli.input)
        .with_context(|| format!("Failed to load image '{}'", cli.input.display()))?;
    let source = SourceImage::from(&decoded);

    let mut sampler = Sampler::new(source.clone());
    sampler.set_sample_size(cli.size.unwrap_or(settings.sample_size as f64))?;

    let balance = WhiteBalance {
        target: match cli.target.as_deref() {
            Some(t) => parse_triple(t)?,
            None => settings.target_white,
        },
        linear_space: cli.linear_space(&settings),
    };
    let mut params = balance.pick(&mut sampler, cli.x, cli.y)?;
    if let Some(bias) = cli.bias.as_deref() {
        params.bias = parse_triple(bias)?;
    }

    let mut corrector = if cli.cpu || !settings.gpu_enabled {
        Corrector::cpu(source)
    } else {
        Corrector::with_fallback_from(acquire_gpu, source)
    }
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    corrector.set_params(params)?;
    let rendered = image::DynamicImage::ImageRgba8(corrector.surface().clone());
    let is_jpeg = cli
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    // JPEG has no alpha channel
    let rendered = if is_jpeg {
        image::DynamicImage::ImageRgb8(rendered.to_rgb8())
    } else {
        rendered
    };
    rendered
        .save(&cli.output)
        .with_context(|| format!("Failed to write '{}'", cli.output.display()))?;

    tracing::info!(
        "Wrote {} (multiplier {:?}, backend {})",
        cli.output.display(),
        corrector.params().multiplier,
        corrector.backend_name()
    );
    corrector.dispose();
    Ok(())
}
