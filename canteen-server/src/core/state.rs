use std::sync::Arc;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::pickup::{PickupService, ScanCache};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | scan_cache | Arc<ScanCache> | 卖家扫码去重缓存 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 扫码去重缓存 (进程内，非持久)
    pub scan_cache: Arc<ScanCache>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/canteen.db)
    /// 3. JWT 服务与扫码缓存
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        // 1. Initialize DB
        let db_path = config.database_dir().join("canteen.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let scan_cache = Arc::new(ScanCache::new());

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            jwt_service,
            scan_cache,
        })
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 单次存储调用超时
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.config.store_timeout_ms)
    }

    /// 用户仓库 (带配置的存储超时)
    pub fn users(&self) -> UserRepository {
        UserRepository::with_timeout(self.db.clone(), self.op_timeout())
    }

    /// 商品仓库
    pub fn products(&self) -> ProductRepository {
        ProductRepository::with_timeout(self.db.clone(), self.op_timeout())
    }

    /// 订单仓库
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::with_timeout(self.db.clone(), self.op_timeout())
    }

    /// 取餐核销服务
    pub fn pickup(&self) -> PickupService {
        PickupService::new(self.orders(), self.scan_cache.clone())
    }
}
