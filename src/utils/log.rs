use env_logger::Env;
use log::LevelFilter;

pub struct Logger;

impl Logger {
    /// Installs the colored logger. `REPO_HEALTH_LOG` directives override
    /// `level`. Only the first call has any effect.
    pub fn init(level: LevelFilter) {
        let mut builder = colog::default_builder();
        builder
            .filter_level(level)
            .filter_module("reqwest", LevelFilter::Warn)
            .filter_module("hyper_util", LevelFilter::Warn)
            .parse_env(Env::new().filter("REPO_HEALTH_LOG"));

        if builder.try_init().is_err() {
            log::debug!("logger already initialized");
        }
    }
}
