use rsamba::models::VisionRequest;
use rsamba::{ClientConfig, SambaClient};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    rsamba::logger::init()?;

    let cookie = env::var("SAMBANOVA_COOKIE")?;
    let client = SambaClient::new(ClientConfig::new().with_cookie(cookie))?;

    let image_path = env::args().nth(1).unwrap_or_else(|| "image.jpg".to_string());
    let request = VisionRequest::new(
        "Please provide a detailed description of the image.",
        image_path,
    )
    .with_model("Llama-3.2-90B-Vision-Instruct");

    let response = client.vision().generate(request).await?;
    println!("{}", response.content);

    Ok(())
}
