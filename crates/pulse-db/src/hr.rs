//! HR repositories: employees and shifts

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::hr::{Employee, Shift};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const EMPLOYEE_COLUMNS: &str = "id, user_id, first_name, last_name, role, hired_on, \
     terminated_on, hourly_cost, created_at, updated_at";
const SHIFT_COLUMNS: &str = "id, employee_id, starts_at, ends_at, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateEmployee {
    pub user_id: Option<Id>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub hired_on: NaiveDate,
    pub hourly_cost: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub terminated_on: Option<NaiveDate>,
    pub hourly_cost: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateShift {
    pub employee_id: Id,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateShift {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

pub struct HrRepository {
    pool: PgPool,
}

impl HrRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_employee(&self, id: Id) -> RepositoryResult<Option<Employee>> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_employees(
        &self,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Employee>> {
        let items = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees \
             ORDER BY last_name ASC, first_name ASC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create_employee(&self, dto: CreateEmployee) -> RepositoryResult<Employee> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            "INSERT INTO employees (user_id, first_name, last_name, role, hired_on, \
                 hourly_cost, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(dto.user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.role)
        .bind(dto.hired_on)
        .bind(dto.hourly_cost)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_employee(&self, id: Id, dto: UpdateEmployee) -> RepositoryResult<Employee> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            "UPDATE employees SET \
                 first_name = COALESCE($1, first_name), \
                 last_name = COALESCE($2, last_name), \
                 role = COALESCE($3, role), \
                 terminated_on = COALESCE($4, terminated_on), \
                 hourly_cost = COALESCE($5, hourly_cost), \
                 updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.role)
        .bind(dto.terminated_on)
        .bind(dto.hourly_cost)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Employee", id))?;

        Ok(row)
    }

    pub async fn delete_employee(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shifts WHERE employee_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Employee", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_shift(&self, id: Id) -> RepositoryResult<Option<Shift>> {
        let row = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Shifts in a window, optionally for one employee.
    pub async fn list_shifts(
        &self,
        employee_id: Option<Id>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts \
             WHERE ($1::bigint IS NULL OR employee_id = $1) \
               AND starts_at < $3 AND ends_at > $2 \
             ORDER BY starts_at ASC"
        ))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Overlapping shifts for the same employee, excluding `exclude_id`.
    pub async fn overlapping_shifts(
        &self,
        employee_id: Id,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts \
             WHERE employee_id = $1 \
               AND starts_at < $3 AND $2 < ends_at \
               AND ($4::bigint IS NULL OR id != $4)"
        ))
        .bind(employee_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_shift(&self, dto: CreateShift) -> RepositoryResult<Shift> {
        let row = sqlx::query_as::<_, Shift>(&format!(
            "INSERT INTO shifts (employee_id, starts_at, ends_at, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING {SHIFT_COLUMNS}"
        ))
        .bind(dto.employee_id)
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .bind(&dto.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_shift(&self, id: Id, dto: UpdateShift) -> RepositoryResult<Shift> {
        let row = sqlx::query_as::<_, Shift>(&format!(
            "UPDATE shifts SET \
                 starts_at = COALESCE($1, starts_at), \
                 ends_at = COALESCE($2, ends_at), \
                 notes = COALESCE($3, notes), \
                 updated_at = NOW() \
             WHERE id = $4 \
             RETURNING {SHIFT_COLUMNS}"
        ))
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .bind(&dto.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Shift", id))?;

        Ok(row)
    }

    pub async fn delete_shift(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Shift", id));
        }

        Ok(())
    }

    pub async fn count_upcoming_shifts(&self, days: i64) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shifts \
             WHERE starts_at > NOW() AND starts_at < NOW() + ($1 || ' days')::interval",
        )
        .bind(days.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
