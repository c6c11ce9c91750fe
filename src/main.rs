use clap::Parser;
use revealgen::logger::{self, LogLevel, LoggerConfig};
use revealgen::{GenerationRequest, ReferenceImage, RevealClient, RevealConfig};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "revealgen", version, about = "Generate a cinematic reveal for a piece of text")]
struct Cli {
    /// Text to reveal
    text: String,

    /// Visual style, e.g. "Liquid Chrome"
    #[arg(short, long, default_value = "")]
    style: String,

    /// How the text should be rendered in the image
    #[arg(short, long, default_value = "")]
    typography: String,

    /// Image whose look the generated still should borrow
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Ask the text model for a style when none is given
    #[arg(long)]
    suggest_style: bool,

    /// Also write an animated GIF of the video to this path
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Directory for the image and the video
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    #[arg(long, env = "REVEAL_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level).unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = RevealConfig::from_env();
    if config.api_key().is_none() {
        log::warn!(
            "⚠️  {} is not set, requests will be sent without a credential",
            config.api_key_var
        );
    }
    log::info!(
        "🔧 image model: {}, video model: {}, text model: {}",
        config.image_model,
        config.video_model,
        config.text_model
    );

    let client = RevealClient::new(config)?;

    let mut style = cli.style.trim().to_string();
    if style.is_empty() && cli.suggest_style {
        style = client.suggest_style(&cli.text).await;
        log::info!("🎨 Suggested style: {}", style);
    }

    let mut request = GenerationRequest::new(cli.text.as_str())
        .with_style(style)
        .with_typography(cli.typography.as_str());
    if let Some(path) = &cli.reference {
        request = request.with_reference_image(load_reference(path).await?);
    }

    let reveal = match client.generate_reveal(&request).await {
        Ok(reveal) => reveal,
        Err(e) => {
            log::error!("❌ Reveal failed: {}", e);
            return Err(e.into());
        }
    };

    tokio::fs::create_dir_all(&cli.out).await?;
    let image_path = cli.out.join(format!("reveal.{}", reveal.image.extension()));
    tokio::fs::write(&image_path, &reveal.image.bytes).await?;
    log::info!("💾 Image saved to: {}", image_path.display());

    let video_path = cli.out.join("reveal.mp4");
    tokio::fs::copy(reveal.video.path(), &video_path).await?;
    log::info!(
        "💾 Video saved to: {} ({} bytes)",
        video_path.display(),
        reveal.video.size()
    );

    if let Some(gif_path) = &cli.gif {
        match client.transcode_to_gif(&reveal.video).await {
            Ok(gif) => {
                gif.write_to(gif_path).await?;
                log::info!(
                    "💾 GIF saved to: {} ({} frames)",
                    gif_path.display(),
                    gif.frame_count
                );
            }
            Err(e) => log::error!("❌ GIF conversion failed: {}", e),
        }
    }

    reveal.video.release().await?;
    Ok(())
}

async fn load_reference(path: &Path) -> Result<ReferenceImage, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path).await?;
    let media_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    Ok(ReferenceImage::new(bytes, media_type))
}
