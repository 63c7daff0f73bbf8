use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("config error: {0}")]
    Config(#[from] provbench_config::ConfigError),

    #[error("api error: {0}")]
    Api(#[from] provbench_provider::ApiError),

    #[error("unknown sweeper: {0}")]
    UnknownSweeper(String),

    #[error("sweeper {0} is registered twice")]
    DuplicateSweeper(String),

    #[error("sweeper {sweeper} depends on unknown sweeper {dependency}")]
    UnknownDependency { sweeper: String, dependency: String },

    #[error("sweeper dependency cycle through {0}")]
    DependencyCycle(String),
}
