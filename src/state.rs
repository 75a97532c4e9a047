use crate::coach::LanguageModel;
use crate::repository::Repository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: Repository,
    pub coach: Arc<dyn LanguageModel>,
}

impl AppState {
    pub fn new(repository: Repository, coach: Arc<dyn LanguageModel>) -> Self {
        Self { repository, coach }
    }
}
