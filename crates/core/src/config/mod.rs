//! 配置管理
//!
//! 配置按以下顺序合并，后者覆盖前者：
//!
//! 1. 内置默认值（各配置结构的 `Default` 实现）
//! 2. TOML 配置文件
//! 3. 环境变量（前缀 `TECHDISPATCH__`，层级分隔符 `__`）
//!
//! 每个配置段都提供 `validate()`，加载后统一校验。

pub mod models;

pub use models::*;
