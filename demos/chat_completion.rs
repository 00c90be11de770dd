//! Single-shot chat completion demo.
//!
//! Builds the OpenAI backend from the environment and performs one chat
//! call, printing the model's answer.

use itinera::backends::openai::OpenAI;
use itinera::chat::{ChatMessage, ChatProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    itinera::init_logging();

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let llm = OpenAI::new(
        api_key,
        None,
        Some("gpt-3.5-turbo".to_string()),
        None,
        None,
        Some("You are a helpful assistant.".to_string()),
        None,
        None,
    )?;

    let messages = vec![ChatMessage::user().content("What is the fastest car?").build()];
    let response = llm.chat(&messages).await?;
    println!("{response}");
    Ok(())
}
