// Core algorithm exports
pub mod fallback;
pub mod output_parser;
pub mod role_map;

pub use fallback::{FallbackScorer, FALLBACK_LIMIT, GENERIC_RECOMMENDATIONS};
pub use output_parser::{parse_scorer_output, ScorerOutput};
pub use role_map::{RoleEntry, RoleSkillMap};
