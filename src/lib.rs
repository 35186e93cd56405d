//! Unofficial async client for the SambaNova Cloud completion API.
//!
//! Authentication is a browser cookie supplied by the caller; responses are
//! streamed as server-sent events and assembled into plain text.
//!
//! ```no_run
//! use rsamba::{ClientConfig, SambaClient};
//! use rsamba::models::ChatRequest;
//!
//! # async fn run() -> rsamba::Result<()> {
//! let client = SambaClient::new(ClientConfig::new().with_cookie("nonce=..."))?;
//! let response = client.chat().generate(ChatRequest::new("Hi, who are you?")).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod samba;

pub use config::{ChatModelConfig, ClientConfig, VisionModelConfig};
pub use error::{Result, SambaError};
pub use models::*;
pub use samba::{ChatClient, SambaClient, VisionClient};
