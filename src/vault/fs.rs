use super::{DocumentRef, Vault, MARKDOWN_EXTENSION};
use futures::future::{FutureExt, LocalBoxFuture};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use walkdir::{DirEntry, WalkDir};

/// 基于目录的文档库
///
/// 每次枚举都重新遍历目录，读取通过 `tokio::fs` 完成，
/// 因此需要在 tokio 运行时中驱动。
pub struct FsVault {
    root: PathBuf,
    name: String,
    active: Mutex<Option<String>>,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("vault")
            .to_string();

        Self {
            root,
            name,
            active: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 设置活动文档（相对路径）
    pub fn set_active(&self, path: Option<&str>) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = path.map(str::to_string);
    }

    fn absolute(&self, document: &DocumentRef) -> PathBuf {
        document
            .path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

/// 递归收集 markdown 文件；跳过隐藏条目，按名称排序
///
/// 同步遍历，与 `app.getAllFiles` 一样在调用线程上完成。
fn collect_markdown(root: &Path) -> Vec<DocumentRef> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(target: "lua_console", "Cannot list {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some(MARKDOWN_EXTENSION)
        })
        .filter_map(|entry| relative_path(root, entry.path()))
        .map(DocumentRef::new)
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// 相对于库根目录、以 `/` 分隔的路径
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

impl Vault for FsVault {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn markdown_files(&self) -> Vec<DocumentRef> {
        collect_markdown(&self.root)
    }

    fn active_file(&self) -> Option<DocumentRef> {
        let active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        let document = DocumentRef::new(active);
        self.absolute(&document).is_file().then_some(document)
    }

    fn read(&self, document: &DocumentRef) -> LocalBoxFuture<'static, io::Result<String>> {
        let path = self.absolute(document);
        async move { tokio::fs::read_to_string(path).await }.boxed_local()
    }
}
