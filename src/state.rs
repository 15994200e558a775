/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - getter / setter は cold start で一度だけ組み立てて注入する (global は持たない)
 * - Clone 前提で持つ (内部は Arc/Copy)
 */
use std::sync::Arc;

use crate::config::{AppEnv, Config, ErrorMessagePolicy};
use crate::services::module::{ModuleGetter, ModuleSetter};

#[derive(Clone)]
pub struct AppState {
    pub getter: Arc<dyn ModuleGetter>,
    pub setter: Arc<dyn ModuleSetter>,
    pub app_env: AppEnv,
    pub seed_error_message: ErrorMessagePolicy,
    pub delete_error_message: ErrorMessagePolicy,
}

impl AppState {
    pub fn new(
        getter: Arc<dyn ModuleGetter>,
        setter: Arc<dyn ModuleSetter>,
        config: &Config,
    ) -> Self {
        Self {
            getter,
            setter,
            app_env: config.app_env,
            seed_error_message: config.seed_error_message,
            delete_error_message: config.delete_error_message,
        }
    }
}
