use crate::config::Config;
use crate::store::CourseStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub store: CourseStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = CourseStore::new(config.history_limit);
        Self { config, store }
    }
}
