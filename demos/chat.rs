use rsamba::models::ChatRequest;
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
    let config = ClientConfig::new().with_cookie(cookie);
    let client = SambaClient::new(config)?;

    let request = ChatRequest::new("Explain what a cookie jar is in two sentences.")
        .with_model("Meta-Llama-3.1-8B-Instruct")
        .with_max_tokens(256);

    let response = client.chat().generate(request).await?;
    println!("{}", response.content);

    // The lossy wrapper logs failures and falls back to an empty string.
    let text = client.chat_text("And now in one sentence.").await;
    println!("{}", text);

    Ok(())
}
