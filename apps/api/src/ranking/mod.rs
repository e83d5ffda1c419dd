// Resume ranking core: normalization, TF-IDF similarity, skill extraction,
// and the orchestrator tying them together. `handlers` is the HTTP glue.

pub mod handlers;
pub mod normalizer;
pub mod ranker;
pub mod similarity;
pub mod skills;
pub mod table;
