// Resume enhancement pipeline: prompt → model → extract → normalize.
// The generator call is the only network hop; every other stage is pure.

pub mod bullets;
pub mod enhancer;
pub mod extractor;
pub mod fallback;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
