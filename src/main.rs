use futures::StreamExt;
use rsamba::models::{ChatRequest, VisionRequest};
use rsamba::{ChatClient, ClientConfig, SambaClient, VisionClient};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    rsamba::logger::init_with_config(
        rsamba::logger::LoggerConfig::development()
            .with_level(rsamba::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking SambaNova environment...");

    match env::var("SAMBANOVA_COOKIE") {
        Ok(cookie) => {
            log::info!("✅ Authentication cookie found in environment");
            log::debug!("Cookie length: {}", cookie.len());
        }
        Err(_) => {
            log::error!("❌ SAMBANOVA_COOKIE is not set, calls will fail to authenticate");
        }
    }

    let config = ClientConfig::from_env();

    log::info!("🔄 Creating SambaNova client...");
    let client = match SambaClient::new(config) {
        Ok(client) => {
            log::info!("✅ SambaNova client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize SambaNova client: {}", e);
            return Err(e.into());
        }
    };

    log::info!("📚 Available chat models:");
    for id in ChatClient::supported_models() {
        log::info!("  {}", id);
    }

    log::info!("🖼️  Available vision models:");
    for id in VisionClient::supported_models() {
        log::info!("  {}", id);
    }

    // Test 1: Basic chat completion
    log::info!("🔄 Testing chat completion...");
    {
        let _timer = rsamba::logger::timer("chat completion");
        let request = ChatRequest::new("Hi, who are you?").with_max_tokens(256);

        match client.chat().generate(request).await {
            Ok(response) => {
                log::info!("✅ Chat completion successful with {}!", response.model);
                log::info!("📝 Response: {}", response.content);
                if let Some(usage) = response.usage {
                    log::info!(
                        "🔢 Tokens: prompt={:?} completion={:?} total={:?}",
                        usage.prompt_tokens,
                        usage.completion_tokens,
                        usage.total_tokens
                    );
                }
                if let Some(reason) = response.finish_reason {
                    log::info!("🏁 Finish reason: {}", reason);
                }
            }
            Err(e) => {
                log::error!("❌ Chat completion failed: {}", e);
                log::warn!("💡 Check that your cookie is still valid");
            }
        }
    }

    // Test 2: Streaming chat
    log::info!("🌊 Testing streaming chat...");

    let request = ChatRequest::new("Count from one to five, one word per line.")
        .with_model("Meta-Llama-3.2-3B-Instruct");

    match client.chat().generate_stream(request).await {
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(chunk) if chunk.done => {
                        println!();
                        log::info!("🏁 Stream finished: {:?}", chunk.finish_reason);
                    }
                    Ok(chunk) => {
                        print!("{}", chunk.chunk);
                    }
                    Err(e) => {
                        log::error!("❌ Stream failed: {}", e);
                        break;
                    }
                }
            }
        }
        Err(e) => log::error!("❌ Could not start stream: {}", e),
    }

    // Test 3: Vision completion, if a sample image is around
    let image_path = env::var("SAMBANOVA_TEST_IMAGE").unwrap_or_else(|_| "image.jpg".to_string());
    if std::path::Path::new(&image_path).exists() {
        log::info!("🖼️  Testing vision completion with {}...", image_path);

        let request =
            VisionRequest::new("Please provide a detailed description of the image.", &image_path);

        match client.vision().generate(request).await {
            Ok(response) => {
                log::info!("✅ Vision completion successful with {}!", response.model);
                log::info!("📝 Response: {}", response.content);
            }
            Err(e) => log::error!("❌ Vision completion failed: {}", e),
        }
    } else {
        log::warn!(
            "⚠️  No test image at '{}', skipping vision test (set SAMBANOVA_TEST_IMAGE)",
            image_path
        );
    }

    Ok(())
}
