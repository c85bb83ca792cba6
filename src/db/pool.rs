use sqlx::postgres::PgPool;

use crate::types::AppResult;

pub async fn health_check(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
