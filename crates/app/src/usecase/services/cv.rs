//! CV editing.

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use atomo_core::{
    Cv, CvEducation, CvEducationId, CvExperience, CvExperienceId, CvId, CvSkill, CvSkillId,
    ProfileId, ServiceType,
};

use super::DEFAULT_COLOR;
use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::CvRepository;
use crate::usecase::limits::CanCreateService;
use crate::usecase::validate;

#[derive(Debug, Clone)]
pub struct NewEducation {
    pub cv_id: CvId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewExperience {
    pub cv_id: CvId,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub sort_order: i32,
}

fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), UseCaseError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(UseCaseError::invalid("end_date", "must not be before start_date"))
        }
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct CvService<R> {
    cvs: CvRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> CvService<R> {
    pub const fn new(cvs: CvRepository<R>, gate: CanCreateService<R>) -> Self {
        Self { cvs, gate }
    }

    /// Start a CV with just the holder's name.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name,
    /// `UseCaseError::LimitReached` if the owner's plan is used up, or
    /// `UseCaseError::Repository` if the write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create(&self, owner: &ProfileId, full_name: &str) -> Result<Cv, UseCaseError> {
        let full_name = validate::name("full_name", full_name)?;
        self.gate.ensure(owner, ServiceType::Cv).await?;

        let cv = Cv {
            id: CvId::generate(),
            user_id: owner.clone(),
            full_name,
            headline: None,
            summary: None,
            email: None,
            phone: None,
            location: None,
            photo_url: None,
            primary_color: DEFAULT_COLOR.to_owned(),
            created_at: Utc::now(),
        };

        let stored = self.cvs.create(&cv).await?;
        info!(cv_id = %stored.id, "CV created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a bad color,
    /// or `UseCaseError::Repository` if the write fails.
    pub async fn update(&self, cv: &Cv) -> Result<Cv, UseCaseError> {
        let mut cv = cv.clone();
        cv.full_name = validate::name("full_name", &cv.full_name)?;
        validate::hex_color("primary_color", &cv.primary_color)?;
        Ok(self.cvs.update(&cv).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, id: &CvId) -> Result<(), UseCaseError> {
        Ok(self.cvs.delete(id).await?)
    }

    // =========================================================================
    // Education
    // =========================================================================

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for blank fields or an end date
    /// before the start, or `UseCaseError::Repository` if the write fails.
    pub async fn add_education(&self, new: NewEducation) -> Result<CvEducation, UseCaseError> {
        date_range(new.start_date, new.end_date)?;

        let entry = CvEducation {
            id: CvEducationId::generate(),
            cv_id: new.cv_id,
            institution: validate::name("institution", &new.institution)?,
            degree: validate::name("degree", &new.degree)?,
            field_of_study: new.field_of_study,
            start_date: new.start_date,
            end_date: new.end_date,
            sort_order: new.sort_order,
        };
        Ok(self.cvs.create_education(&entry).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for blank fields or an end date
    /// before the start, or `UseCaseError::Repository` if the write fails.
    pub async fn update_education(&self, entry: &CvEducation) -> Result<CvEducation, UseCaseError> {
        let mut entry = entry.clone();
        entry.institution = validate::name("institution", &entry.institution)?;
        entry.degree = validate::name("degree", &entry.degree)?;
        date_range(entry.start_date, entry.end_date)?;
        Ok(self.cvs.update_education(&entry).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_education(&self, id: &CvEducationId) -> Result<(), UseCaseError> {
        Ok(self.cvs.delete_education(id).await?)
    }

    // =========================================================================
    // Experience
    // =========================================================================

    /// A current position has no end date; one given is dropped.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for blank fields or an end date
    /// before the start, or `UseCaseError::Repository` if the write fails.
    pub async fn add_experience(&self, new: NewExperience) -> Result<CvExperience, UseCaseError> {
        let end_date = if new.is_current { None } else { new.end_date };
        date_range(new.start_date, end_date)?;

        let entry = CvExperience {
            id: CvExperienceId::generate(),
            cv_id: new.cv_id,
            company: validate::name("company", &new.company)?,
            position: validate::name("position", &new.position)?,
            description: new.description,
            start_date: new.start_date,
            end_date,
            is_current: new.is_current,
            sort_order: new.sort_order,
        };
        Ok(self.cvs.create_experience(&entry).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for blank fields or an end date
    /// before the start, or `UseCaseError::Repository` if the write fails.
    pub async fn update_experience(
        &self,
        entry: &CvExperience,
    ) -> Result<CvExperience, UseCaseError> {
        let mut entry = entry.clone();
        entry.company = validate::name("company", &entry.company)?;
        entry.position = validate::name("position", &entry.position)?;
        if entry.is_current {
            entry.end_date = None;
        }
        date_range(entry.start_date, entry.end_date)?;
        Ok(self.cvs.update_experience(&entry).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_experience(&self, id: &CvExperienceId) -> Result<(), UseCaseError> {
        Ok(self.cvs.delete_experience(id).await?)
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a level
    /// outside 1..=5, or `UseCaseError::Repository` if the write fails.
    pub async fn add_skill(
        &self,
        cv_id: &CvId,
        name: &str,
        level: i32,
        sort_order: i32,
    ) -> Result<CvSkill, UseCaseError> {
        validate::skill_level(level)?;

        let skill = CvSkill {
            id: CvSkillId::generate(),
            cv_id: cv_id.clone(),
            name: validate::name("name", name)?,
            level,
            sort_order,
        };
        Ok(self.cvs.create_skill(&skill).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a level
    /// outside 1..=5, or `UseCaseError::Repository` if the write fails.
    pub async fn update_skill(&self, skill: &CvSkill) -> Result<CvSkill, UseCaseError> {
        let mut skill = skill.clone();
        skill.name = validate::name("name", &skill.name)?;
        validate::skill_level(skill.level)?;
        Ok(self.cvs.update_skill(&skill).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_skill(&self, id: &CvSkillId) -> Result<(), UseCaseError> {
        Ok(self.cvs.delete_skill(id).await?)
    }
}
