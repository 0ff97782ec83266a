//! Caption an existing strip PNG.

use std::path::PathBuf;

use snapstrip_caption_client::CaptionClient;

pub async fn run(strip: PathBuf) -> anyhow::Result<()> {
    let png = std::fs::read(&strip)?;
    let caption = CaptionClient::from_env()?.request_caption(&png).await;
    println!("{caption}");
    Ok(())
}
