//! HR services: shift planning

use pulse_core::traits::Id;
use pulse_db::hr::{CreateShift, HrRepository, UpdateShift};
use pulse_db::repository::RepositoryError;
use pulse_models::hr::Shift;
use sqlx::PgPool;

use crate::result::ServiceResult;

/// Plans shifts, rejecting inverted intervals and same-employee overlaps.
pub struct ShiftPlanner {
    hr: HrRepository,
}

impl ShiftPlanner {
    pub fn new(pool: PgPool) -> Self {
        Self {
            hr: HrRepository::new(pool),
        }
    }

    pub async fn plan(&self, dto: CreateShift) -> Result<ServiceResult<Shift>, RepositoryError> {
        if let Err(errors) = Shift::validate_times(dto.starts_at, dto.ends_at) {
            return Ok(ServiceResult::failure(errors));
        }

        if self.hr.find_employee(dto.employee_id).await?.is_none() {
            return Ok(ServiceResult::failure_with_error(
                "employeeId",
                "unknown employee",
            ));
        }

        let overlapping = self
            .hr
            .overlapping_shifts(dto.employee_id, dto.starts_at, dto.ends_at, None)
            .await?;

        if !overlapping.is_empty() {
            return Ok(ServiceResult::failure_with_error(
                "startsAt",
                format!("overlaps {} existing shift(s)", overlapping.len()),
            ));
        }

        let shift = self.hr.create_shift(dto).await?;
        Ok(ServiceResult::success(shift))
    }

    /// Move or annotate an existing shift, revalidating interval order and
    /// overlap against every other shift of the same employee.
    pub async fn replan(
        &self,
        id: Id,
        dto: UpdateShift,
    ) -> Result<ServiceResult<Shift>, RepositoryError> {
        let Some(current) = self.hr.find_shift(id).await? else {
            return Ok(ServiceResult::failure_with_base_error(format!(
                "Shift {} not found",
                id
            )));
        };

        let starts_at = dto.starts_at.unwrap_or(current.starts_at);
        let ends_at = dto.ends_at.unwrap_or(current.ends_at);

        if let Err(errors) = Shift::validate_times(starts_at, ends_at) {
            return Ok(ServiceResult::failure(errors));
        }

        let overlapping = self
            .hr
            .overlapping_shifts(current.employee_id, starts_at, ends_at, Some(id))
            .await?;

        if !overlapping.is_empty() {
            return Ok(ServiceResult::failure_with_error(
                "startsAt",
                format!("overlaps {} existing shift(s)", overlapping.len()),
            ));
        }

        let shift = self.hr.update_shift(id, dto).await?;
        Ok(ServiceResult::success(shift))
    }
}
