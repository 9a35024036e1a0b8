// Letter generation: request model, prompt construction, the generate-then-persist
// pipeline and its HTTP handlers.
// All completion calls go through llm_client; no direct provider calls here.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompt_builder;
