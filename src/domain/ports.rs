use crate::domain::model::StoredUser;
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 使用者資料來源；實作必須使用參數化查詢
pub trait UserRepository {
    fn find_user(&self, id: &str) -> Result<Option<StoredUser>>;
}
