// Question generation: prompt interpretation, the dispatch cooldown and the
// in-flight request against the panel service.

pub mod orchestrator;
pub mod prompt;
pub mod rate_limiter;
