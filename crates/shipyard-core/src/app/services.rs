use std::sync::Arc;

use crate::domain::ProjectSettings;
use crate::ports::{ChainBuilder, Clock, DirectoryProvider, HistoryStore, IdGenerator, Ui};

/// Project と、そこから生成される全 App が共有するコラボレータ
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) directories: Arc<dyn DirectoryProvider>,
    pub(crate) chain_builder: Arc<dyn ChainBuilder>,
    pub(crate) history: Arc<dyn HistoryStore>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ui: Arc<dyn Ui>,
    pub(crate) settings: ProjectSettings,
}
