//! CV rows and their education, experience and skill collections.

use atomo_core::{CvEducationId, CvExperienceId, CvId, CvSkillId, ProfileId};

use super::count_to_u32;
use crate::local::entities::{CvEducationEntity, CvEntity, CvExperienceEntity, CvSkillEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_CV: &str = r"
    INSERT INTO cvs (id, user_id, full_name, headline, summary, email, phone, location,
                     photo_url, primary_color, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        full_name = excluded.full_name,
        headline = excluded.headline,
        summary = excluded.summary,
        email = excluded.email,
        phone = excluded.phone,
        location = excluded.location,
        photo_url = excluded.photo_url,
        primary_color = excluded.primary_color,
        created_at = excluded.created_at
";

const UPSERT_EDUCATION: &str = r"
    INSERT INTO cv_education (id, cv_id, institution, degree, field_of_study, start_date,
                              end_date, sort_order)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        cv_id = excluded.cv_id,
        institution = excluded.institution,
        degree = excluded.degree,
        field_of_study = excluded.field_of_study,
        start_date = excluded.start_date,
        end_date = excluded.end_date,
        sort_order = excluded.sort_order
";

const UPSERT_EXPERIENCE: &str = r"
    INSERT INTO cv_experience (id, cv_id, company, position, description, start_date,
                               end_date, is_current, sort_order)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        cv_id = excluded.cv_id,
        company = excluded.company,
        position = excluded.position,
        description = excluded.description,
        start_date = excluded.start_date,
        end_date = excluded.end_date,
        is_current = excluded.is_current,
        sort_order = excluded.sort_order
";

const UPSERT_SKILL: &str = r"
    INSERT INTO cv_skills (id, cv_id, name, level, sort_order)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        cv_id = excluded.cv_id,
        name = excluded.name,
        level = excluded.level,
        sort_order = excluded.sort_order
";

/// Query object for `cvs`, `cv_education`, `cv_experience` and `cv_skills`.
pub struct CvDao<'a> {
    store: &'a LocalStore,
}

impl<'a> CvDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // CVs
    // =========================================================================

    /// Get a CV by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &CvId) -> Result<Option<CvEntity>, LocalError> {
        let row = sqlx::query_as::<_, CvEntity>(
            r"
            SELECT id, user_id, full_name, headline, summary, email, phone, location,
                   photo_url, primary_color, created_at
            FROM cvs
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List an owner's CVs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<CvEntity>, LocalError> {
        let rows = sqlx::query_as::<_, CvEntity>(
            r"
            SELECT id, user_id, full_name, headline, summary, email, phone, location,
                   photo_url, primary_color, created_at
            FROM cvs
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Count an owner's CVs.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: &ProfileId) -> Result<u32, LocalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cvs WHERE user_id = ?")
            .bind(owner)
            .fetch_one(self.store.pool())
            .await?;

        Ok(count_to_u32(count))
    }

    /// Insert or replace CVs by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[CvEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_CV)
                .bind(&row.id)
                .bind(&row.user_id)
                .bind(&row.full_name)
                .bind(&row.headline)
                .bind(&row.summary)
                .bind(&row.email)
                .bind(&row.phone)
                .bind(&row.location)
                .bind(&row.photo_url)
                .bind(&row.primary_color)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Cvs]);
        Ok(())
    }

    /// Delete a CV and all of its sections.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &CvId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[
            Table::Cvs,
            Table::CvEducation,
            Table::CvExperience,
            Table::CvSkills,
        ]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Education
    // =========================================================================

    /// List a CV's education entries by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_education(&self, cv_id: &CvId) -> Result<Vec<CvEducationEntity>, LocalError> {
        let rows = sqlx::query_as::<_, CvEducationEntity>(
            r"
            SELECT id, cv_id, institution, degree, field_of_study, start_date, end_date,
                   sort_order
            FROM cv_education
            WHERE cv_id = ?
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(cv_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace education entries by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_education(&self, rows: &[CvEducationEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_EDUCATION)
                .bind(&row.id)
                .bind(&row.cv_id)
                .bind(&row.institution)
                .bind(&row.degree)
                .bind(&row.field_of_study)
                .bind(row.start_date)
                .bind(row.end_date)
                .bind(row.sort_order)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::CvEducation]);
        Ok(())
    }

    /// Delete an education entry.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_education(&self, id: &CvEducationId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM cv_education WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::CvEducation]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Experience
    // =========================================================================

    /// List a CV's work experience by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_experience(
        &self,
        cv_id: &CvId,
    ) -> Result<Vec<CvExperienceEntity>, LocalError> {
        let rows = sqlx::query_as::<_, CvExperienceEntity>(
            r"
            SELECT id, cv_id, company, position, description, start_date, end_date,
                   is_current, sort_order
            FROM cv_experience
            WHERE cv_id = ?
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(cv_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace experience entries by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_experience(&self, rows: &[CvExperienceEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_EXPERIENCE)
                .bind(&row.id)
                .bind(&row.cv_id)
                .bind(&row.company)
                .bind(&row.position)
                .bind(&row.description)
                .bind(row.start_date)
                .bind(row.end_date)
                .bind(row.is_current)
                .bind(row.sort_order)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::CvExperience]);
        Ok(())
    }

    /// Delete an experience entry.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_experience(&self, id: &CvExperienceId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM cv_experience WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::CvExperience]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// List a CV's skills by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_skills(&self, cv_id: &CvId) -> Result<Vec<CvSkillEntity>, LocalError> {
        let rows = sqlx::query_as::<_, CvSkillEntity>(
            r"
            SELECT id, cv_id, name, level, sort_order
            FROM cv_skills
            WHERE cv_id = ?
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(cv_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace skills by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_skills(&self, rows: &[CvSkillEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_SKILL)
                .bind(&row.id)
                .bind(&row.cv_id)
                .bind(&row.name)
                .bind(row.level)
                .bind(row.sort_order)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::CvSkills]);
        Ok(())
    }

    /// Delete a skill.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_skill(&self, id: &CvSkillId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM cv_skills WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::CvSkills]);
        Ok(result.rows_affected())
    }
}
