//! Dashboard aggregates
//!
//! One round trip per counter on the shared pool; the client polls this,
//! so the queries stay cheap and index-friendly.

use pulse_core::traits::Id;
use serde::Serialize;
use sqlx::PgPool;

use crate::chat::ChatRepository;
use crate::emails::EmailRepository;
use crate::finance::FinanceRepository;
use crate::hr::HrRepository;
use crate::repository::RepositoryResult;
use crate::tasks::TaskRepository;

/// Counters shown on the landing dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub open_tasks: i64,
    pub unread_emails: i64,
    pub recent_chat_messages: i64,
    pub unpaid_invoices: i64,
    pub upcoming_shifts: i64,
}

pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn snapshot(&self, user_id: Id) -> RepositoryResult<DashboardSnapshot> {
        let tasks = TaskRepository::new(self.pool.clone());
        let emails = EmailRepository::new(self.pool.clone());
        let chat = ChatRepository::new(self.pool.clone());
        let finance = FinanceRepository::new(self.pool.clone());
        let hr = HrRepository::new(self.pool.clone());

        Ok(DashboardSnapshot {
            open_tasks: tasks.count_open().await?,
            unread_emails: emails.count_unread(user_id).await?,
            recent_chat_messages: chat.count_messages_since(user_id, 24).await?,
            unpaid_invoices: finance.count_unpaid().await?,
            upcoming_shifts: hr.count_upcoming_shifts(7).await?,
        })
    }
}
