use revealgen::{GenerationRequest, RevealClient, RevealConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    revealgen::logger::init()?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found");
    }

    let client = RevealClient::new(RevealConfig::from_env())?;
    let style = client.suggest_style("HELLO").await;

    let request = GenerationRequest::new("HELLO").with_style(style);
    let reveal = client.generate_reveal(&request).await?;
    println!("{}", reveal.video.locator());

    let gif = client.transcode_to_gif(&reveal.video).await?;
    gif.write_to("hello.gif").await?;
    println!("hello.gif: {} frames, {} bytes", gif.frame_count, gif.bytes.len());

    reveal.video.release().await?;
    Ok(())
}
