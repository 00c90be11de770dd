//! Backend implementation for the OpenAI chat-completion and embedding APIs.

pub mod openai;
