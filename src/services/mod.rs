// Service exports
pub mod accounts;
pub mod environment;
pub mod password;
pub mod postgres;
pub mod recommender;
pub mod runner;
pub mod users;

pub use accounts::{AccountError, AccountService};
pub use environment::{
    EnvironmentError, EnvironmentResolver, InterpreterProbe, PlatformCandidates, ProcessProbe,
    INTERPRETER_OVERRIDE_VAR,
};
pub use postgres::PostgresUserStore;
pub use recommender::{ExternalScorerInvocation, RecommendError, Recommender};
pub use runner::{ProcessRunner, RunLimits, RunOutput, RunnerError, ScorerRunner};
pub use users::{InMemoryUserStore, StoreError, UserStore};
