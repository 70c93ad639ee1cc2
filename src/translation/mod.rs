// Criteria to provider-parameter translation.
// Each provider's vocabulary is a table entry in the registry; nothing else
// branches on provider ids.

pub mod registry;
pub mod transform;
pub mod translator;

/// Query options handed to a provider.
pub type Options = serde_json::Map<String, serde_json::Value>;

pub use registry::{
    Concept, Dialect, DialectSpec, REGISTRY_VERSION, RuleSpec, TranslationRegistry,
    TranslationRule,
};
pub use transform::Transform;
pub use translator::ParameterTranslator;
