//! 派单核心
//!
//! - [`geo_prefilter`]: 大圆距离预筛，生成短名单
//! - [`resolver`]: 并发解析路程距离，带超时、重试和并发上限
//! - [`ranker`]: 选出唯一胜出者
//! - [`coordinator`]: 编排以上步骤并提交派单记录

pub mod coordinator;
pub mod geo_prefilter;
pub mod metrics;
pub mod ranker;
pub mod resolver;

pub use coordinator::DispatchCoordinator;
pub use geo_prefilter::shortlist;
pub use ranker::{select, Selection, Winner};
pub use resolver::DistanceResolver;
