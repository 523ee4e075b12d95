pub mod client;
pub mod invoker;

pub use client::LLMClient;
pub use invoker::{GenerationRequest, InvocationMode, ModelInvoker, TextStream};
