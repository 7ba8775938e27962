//! 文档库抽象
//!
//! 宿主文档存储的最小只读接口：枚举文档、读取内容、查询活动文档。
//! 脚本侧的 `Note` / `app.getAllFiles` 等绑定只通过 [`Vault`] 访问宿主。

use futures::future::LocalBoxFuture;
use std::io;

pub mod fs;
pub mod memory;

pub use fs::FsVault;
pub use memory::MemoryVault;

/// 约定的文档扩展名
pub const MARKDOWN_EXTENSION: &str = "md";

/// 宿主文档引用
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    /// 相对于文档库根目录的路径，以 `/` 分隔
    pub path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// 文件名（路径的最后一段）
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// 去掉扩展名的文件名
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) if index > 0 => &name[..index],
            _ => name,
        }
    }

    /// 扩展名，不含 `.`
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) if index > 0 => &name[index + 1..],
            _ => "",
        }
    }
}

/// 宿主文档存储
///
/// 所有方法都查询宿主的实时状态，实现方不应缓存。
pub trait Vault: 'static {
    /// 文档库名称
    fn name(&self) -> String;

    /// 按集合顺序列出所有 markdown 文档
    fn markdown_files(&self) -> Vec<DocumentRef>;

    /// 当前活动文档
    fn active_file(&self) -> Option<DocumentRef>;

    /// 异步读取文档内容
    fn read(&self, document: &DocumentRef) -> LocalBoxFuture<'static, io::Result<String>>;
}

/// 按名称或路径查找文档
///
/// 依次尝试：文件名精确匹配、去掉 `.md` 后缀后的文件名匹配、完整路径匹配。
/// 每一轮都取集合顺序中的第一个匹配。
pub fn resolve<'a>(documents: &'a [DocumentRef], query: &str) -> Option<&'a DocumentRef> {
    let suffix = format!(".{}", MARKDOWN_EXTENSION);

    documents
        .iter()
        .find(|doc| doc.basename() == query)
        .or_else(|| {
            let stripped = query.strip_suffix(suffix.as_str())?;
            documents.iter().find(|doc| doc.basename() == stripped)
        })
        .or_else(|| documents.iter().find(|doc| doc.path == query))
}
