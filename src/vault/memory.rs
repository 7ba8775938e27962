use super::{DocumentRef, Vault};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 内存文档库
///
/// 按插入顺序保存文档，适合测试和把控制台嵌入到自有数据模型中。
pub struct MemoryVault {
    name: String,
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    documents: Vec<(DocumentRef, String)>,
    active: Option<String>,
}

impl MemoryVault {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// 插入或替换文档
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        let mut state = self.lock();
        match state.documents.iter().position(|(doc, _)| doc.path == path) {
            Some(index) => state.documents[index].1 = content,
            None => state.documents.push((DocumentRef::new(path), content)),
        }
    }

    /// 删除文档，返回其内容
    pub fn remove(&self, path: &str) -> Option<String> {
        let mut state = self.lock();
        let index = state.documents.iter().position(|(doc, _)| doc.path == path)?;
        if state.active.as_deref() == Some(path) {
            state.active = None;
        }
        Some(state.documents.remove(index).1)
    }

    /// 设置活动文档；路径不存在时清空
    pub fn set_active(&self, path: Option<&str>) {
        let mut state = self.lock();
        let active = path
            .filter(|p| state.documents.iter().any(|(doc, _)| doc.path == *p))
            .map(str::to_string);
        state.active = active;
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Vault for MemoryVault {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn markdown_files(&self) -> Vec<DocumentRef> {
        self.lock()
            .documents
            .iter()
            .filter(|(doc, _)| doc.extension() == super::MARKDOWN_EXTENSION)
            .map(|(doc, _)| doc.clone())
            .collect()
    }

    fn active_file(&self) -> Option<DocumentRef> {
        self.lock().active.clone().map(DocumentRef::new)
    }

    fn read(&self, document: &DocumentRef) -> LocalBoxFuture<'static, io::Result<String>> {
        let content = self
            .lock()
            .documents
            .iter()
            .find(|(doc, _)| doc == document)
            .map(|(_, content)| content.clone());

        let result = content.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the vault", document.path),
            )
        });
        future::ready(result).boxed_local()
    }
}
