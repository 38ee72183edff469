/// Represents the backend used for language model inference and embeddings.
///
/// Only a locally hosted Ollama runtime is supported. The enum is kept so the
/// health snapshot and client cache stay provider-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
}
