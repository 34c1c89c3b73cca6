//! CV repository: CVs with education, experience and skills.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{
    Cv, CvDetails, CvEducation, CvEducationId, CvExperience, CvExperienceId, CvId, CvSkill,
    CvSkillId, ProfileId,
};

use super::watch_tables;
use crate::error::RepositoryError;
use crate::local::dao::CvDao;
use crate::local::entities::{CvEducationEntity, CvEntity, CvExperienceEntity, CvSkillEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{CvDto, CvEducationDto, CvExperienceDto, CvSkillDto};
use crate::remote::{self, Filter, RemoteBackend};

const TABLES: &[Table] = &[
    Table::Cvs,
    Table::CvEducation,
    Table::CvExperience,
    Table::CvSkills,
];

/// Local-first access to CVs.
#[derive(Clone)]
pub struct CvRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> CvRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> CvDao<'_> {
        CvDao::new(&self.local)
    }

    /// A cached CV with all three sections.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a query fails.
    pub async fn get(&self, id: &CvId) -> Result<Option<CvDetails>, RepositoryError> {
        match self.dao().get(id).await? {
            Some(row) => Ok(Some(load_details(&self.local, row).await?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn list(&self, owner: &ProfileId) -> Result<Vec<Cv>, RepositoryError> {
        let rows = self.dao().list_by_owner(owner).await?;
        Ok(rows.into_iter().map(Cv::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn count(&self, owner: &ProfileId) -> Result<u32, RepositoryError> {
        Ok(self.dao().count_by_owner(owner).await?)
    }

    pub fn observe(&self, owner: &ProfileId) -> impl Stream<Item = Vec<CvDetails>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                load_all(&store, &owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load CVs");
                    Vec::new()
                })
            }
        })
    }

    // =========================================================================
    // CV writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, cv), fields(cv_id = %cv.id))]
    pub async fn create(&self, cv: &Cv) -> Result<Cv, RepositoryError> {
        let stored: Cv = remote::insert(&self.remote, Table::Cvs, &CvDto::from(cv))
            .await?
            .into();
        self.dao().upsert_all(&[CvEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, cv), fields(cv_id = %cv.id))]
    pub async fn update(&self, cv: &Cv) -> Result<Cv, RepositoryError> {
        let stored: Cv = remote::update(&self.remote, Table::Cvs, cv.id.as_str(), &CvDto::from(cv))
            .await?
            .into();
        self.dao().upsert_all(&[CvEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// Delete a CV and every section entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &CvId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Cvs, id.as_str()).await?;
        self.dao().delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Education
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id, cv_id = %entry.cv_id))]
    pub async fn create_education(&self, entry: &CvEducation) -> Result<CvEducation, RepositoryError> {
        let stored: CvEducation =
            remote::insert(&self.remote, Table::CvEducation, &CvEducationDto::from(entry))
                .await?
                .into();
        self.dao()
            .upsert_education(&[CvEducationEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub async fn update_education(&self, entry: &CvEducation) -> Result<CvEducation, RepositoryError> {
        let stored: CvEducation = remote::update(
            &self.remote,
            Table::CvEducation,
            entry.id.as_str(),
            &CvEducationDto::from(entry),
        )
        .await?
        .into();
        self.dao()
            .upsert_education(&[CvEducationEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_education(&self, id: &CvEducationId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::CvEducation, id.as_str()).await?;
        self.dao().delete_education(id).await?;
        Ok(())
    }

    // =========================================================================
    // Experience
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id, cv_id = %entry.cv_id))]
    pub async fn create_experience(
        &self,
        entry: &CvExperience,
    ) -> Result<CvExperience, RepositoryError> {
        let stored: CvExperience =
            remote::insert(&self.remote, Table::CvExperience, &CvExperienceDto::from(entry))
                .await?
                .into();
        self.dao()
            .upsert_experience(&[CvExperienceEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub async fn update_experience(
        &self,
        entry: &CvExperience,
    ) -> Result<CvExperience, RepositoryError> {
        let stored: CvExperience = remote::update(
            &self.remote,
            Table::CvExperience,
            entry.id.as_str(),
            &CvExperienceDto::from(entry),
        )
        .await?
        .into();
        self.dao()
            .upsert_experience(&[CvExperienceEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_experience(&self, id: &CvExperienceId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::CvExperience, id.as_str()).await?;
        self.dao().delete_experience(id).await?;
        Ok(())
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, skill), fields(skill_id = %skill.id, cv_id = %skill.cv_id))]
    pub async fn create_skill(&self, skill: &CvSkill) -> Result<CvSkill, RepositoryError> {
        let stored: CvSkill = remote::insert(&self.remote, Table::CvSkills, &CvSkillDto::from(skill))
            .await?
            .into();
        self.dao().upsert_skills(&[CvSkillEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, skill), fields(skill_id = %skill.id))]
    pub async fn update_skill(&self, skill: &CvSkill) -> Result<CvSkill, RepositoryError> {
        let stored: CvSkill = remote::update(
            &self.remote,
            Table::CvSkills,
            skill.id.as_str(),
            &CvSkillDto::from(skill),
        )
        .await?
        .into();
        self.dao().upsert_skills(&[CvSkillEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_skill(&self, id: &CvSkillId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::CvSkills, id.as_str()).await?;
        self.dao().delete_skill(id).await?;
        Ok(())
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Pull the owner's CVs, then the three sections of each.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on the first failed pull or cache write.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Vec<Cv>, RepositoryError> {
        let dtos: Vec<CvDto> =
            remote::fetch(&self.remote, Table::Cvs, &[Filter::eq("user_id", owner)]).await?;
        let cvs: Vec<Cv> = dtos.into_iter().map(Cv::from).collect();

        let rows: Vec<CvEntity> = cvs.iter().map(CvEntity::from).collect();
        self.dao().upsert_all(&rows).await?;

        let mut section_rows = 0usize;
        for cv in &cvs {
            let by_cv = [Filter::eq("cv_id", &cv.id)];

            let education: Vec<CvEducationDto> =
                remote::fetch(&self.remote, Table::CvEducation, &by_cv).await?;
            let rows: Vec<CvEducationEntity> = education
                .into_iter()
                .map(|dto| CvEducationEntity::from(&CvEducation::from(dto)))
                .collect();
            section_rows += rows.len();
            self.dao().upsert_education(&rows).await?;

            let experience: Vec<CvExperienceDto> =
                remote::fetch(&self.remote, Table::CvExperience, &by_cv).await?;
            let rows: Vec<CvExperienceEntity> = experience
                .into_iter()
                .map(|dto| CvExperienceEntity::from(&CvExperience::from(dto)))
                .collect();
            section_rows += rows.len();
            self.dao().upsert_experience(&rows).await?;

            let skills: Vec<CvSkillDto> =
                remote::fetch(&self.remote, Table::CvSkills, &by_cv).await?;
            let rows: Vec<CvSkillEntity> = skills
                .into_iter()
                .map(|dto| CvSkillEntity::from(&CvSkill::from(dto)))
                .collect();
            section_rows += rows.len();
            self.dao().upsert_skills(&rows).await?;
        }

        info!(cvs = cvs.len(), section_rows, "Synced CVs");
        Ok(cvs)
    }
}

async fn load_details(store: &LocalStore, row: CvEntity) -> Result<CvDetails, RepositoryError> {
    let dao = CvDao::new(store);
    let education = dao.list_education(&row.id).await?;
    let experience = dao.list_experience(&row.id).await?;
    let skills = dao.list_skills(&row.id).await?;

    Ok(CvDetails {
        cv: Cv::from(row),
        education: education.into_iter().map(CvEducation::from).collect(),
        experience: experience.into_iter().map(CvExperience::from).collect(),
        skills: skills.into_iter().map(CvSkill::from).collect(),
    })
}

async fn load_all(store: &LocalStore, owner: &ProfileId) -> Result<Vec<CvDetails>, RepositoryError> {
    let rows = CvDao::new(store).list_by_owner(owner).await?;

    let mut all = Vec::with_capacity(rows.len());
    for row in rows {
        all.push(load_details(store, row).await?);
    }
    Ok(all)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::remote::MemoryBackend;

    fn cv() -> Cv {
        Cv {
            id: CvId::generate(),
            user_id: ProfileId::new("user_1"),
            full_name: "Ana Pérez".to_string(),
            headline: Some("Backend engineer".to_string()),
            summary: None,
            email: None,
            phone: None,
            location: None,
            photo_url: None,
            primary_color: "#222222".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_assembles_all_sections() {
        let store = LocalStore::in_memory().await.unwrap();
        let repo = CvRepository::new(store, MemoryBackend::new());
        let cv = cv();
        repo.create(&cv).await.unwrap();

        let education = CvEducation {
            id: CvEducationId::generate(),
            cv_id: cv.id.clone(),
            institution: "UNAM".to_string(),
            degree: "BSc".to_string(),
            field_of_study: None,
            start_date: NaiveDate::from_ymd_opt(2015, 8, 1),
            end_date: None,
            sort_order: 0,
        };
        let skill = CvSkill {
            id: CvSkillId::generate(),
            cv_id: cv.id.clone(),
            name: "Rust".to_string(),
            level: 4,
            sort_order: 0,
        };
        repo.create_education(&education).await.unwrap();
        repo.create_skill(&skill).await.unwrap();

        let details = repo.get(&cv.id).await.unwrap().unwrap();
        assert_eq!(details.cv, cv);
        assert_eq!(details.education, vec![education]);
        assert!(details.experience.is_empty());
        assert_eq!(details.skills, vec![skill]);
    }

    #[tokio::test]
    async fn test_delete_cascades_sections() {
        let store = LocalStore::in_memory().await.unwrap();
        let repo = CvRepository::new(store.clone(), MemoryBackend::new());
        let cv = cv();
        repo.create(&cv).await.unwrap();
        repo.create_skill(&CvSkill {
            id: CvSkillId::generate(),
            cv_id: cv.id.clone(),
            name: "SQL".to_string(),
            level: 3,
            sort_order: 0,
        })
        .await
        .unwrap();

        repo.delete(&cv.id).await.unwrap();

        assert!(repo.get(&cv.id).await.unwrap().is_none());
        assert!(CvDao::new(&store).list_skills(&cv.id).await.unwrap().is_empty());
    }
}
