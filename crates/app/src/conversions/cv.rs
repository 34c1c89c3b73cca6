use atomo_core::{Cv, CvEducation, CvExperience, CvSkill};

use crate::local::entities::{CvEducationEntity, CvEntity, CvExperienceEntity, CvSkillEntity};
use crate::remote::dto::{CvDto, CvEducationDto, CvExperienceDto, CvSkillDto};

// =============================================================================
// Cv
// =============================================================================

impl From<CvDto> for Cv {
    fn from(dto: CvDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            full_name: dto.full_name,
            headline: dto.headline,
            summary: dto.summary,
            email: dto.email,
            phone: dto.phone,
            location: dto.location,
            photo_url: dto.photo_url,
            primary_color: dto.primary_color,
            created_at: dto.created_at,
        }
    }
}

impl From<&Cv> for CvDto {
    fn from(cv: &Cv) -> Self {
        Self {
            id: cv.id.clone(),
            user_id: cv.user_id.clone(),
            full_name: cv.full_name.clone(),
            headline: cv.headline.clone(),
            summary: cv.summary.clone(),
            email: cv.email.clone(),
            phone: cv.phone.clone(),
            location: cv.location.clone(),
            photo_url: cv.photo_url.clone(),
            primary_color: cv.primary_color.clone(),
            created_at: cv.created_at,
        }
    }
}

impl From<&Cv> for CvEntity {
    fn from(cv: &Cv) -> Self {
        Self {
            id: cv.id.clone(),
            user_id: cv.user_id.clone(),
            full_name: cv.full_name.clone(),
            headline: cv.headline.clone(),
            summary: cv.summary.clone(),
            email: cv.email.clone(),
            phone: cv.phone.clone(),
            location: cv.location.clone(),
            photo_url: cv.photo_url.clone(),
            primary_color: cv.primary_color.clone(),
            created_at: cv.created_at,
        }
    }
}

impl From<CvEntity> for Cv {
    fn from(row: CvEntity) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            headline: row.headline,
            summary: row.summary,
            email: row.email,
            phone: row.phone,
            location: row.location,
            photo_url: row.photo_url,
            primary_color: row.primary_color,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Education
// =============================================================================

impl From<CvEducationDto> for CvEducation {
    fn from(dto: CvEducationDto) -> Self {
        Self {
            id: dto.id,
            cv_id: dto.cv_id,
            institution: dto.institution,
            degree: dto.degree,
            field_of_study: dto.field_of_study,
            start_date: dto.start_date,
            end_date: dto.end_date,
            sort_order: dto.sort_order,
        }
    }
}

impl From<&CvEducation> for CvEducationDto {
    fn from(entry: &CvEducation) -> Self {
        Self {
            id: entry.id.clone(),
            cv_id: entry.cv_id.clone(),
            institution: entry.institution.clone(),
            degree: entry.degree.clone(),
            field_of_study: entry.field_of_study.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            sort_order: entry.sort_order,
        }
    }
}

impl From<&CvEducation> for CvEducationEntity {
    fn from(entry: &CvEducation) -> Self {
        Self {
            id: entry.id.clone(),
            cv_id: entry.cv_id.clone(),
            institution: entry.institution.clone(),
            degree: entry.degree.clone(),
            field_of_study: entry.field_of_study.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            sort_order: entry.sort_order,
        }
    }
}

impl From<CvEducationEntity> for CvEducation {
    fn from(row: CvEducationEntity) -> Self {
        Self {
            id: row.id,
            cv_id: row.cv_id,
            institution: row.institution,
            degree: row.degree,
            field_of_study: row.field_of_study,
            start_date: row.start_date,
            end_date: row.end_date,
            sort_order: row.sort_order,
        }
    }
}

// =============================================================================
// Experience
// =============================================================================

impl From<CvExperienceDto> for CvExperience {
    fn from(dto: CvExperienceDto) -> Self {
        Self {
            id: dto.id,
            cv_id: dto.cv_id,
            company: dto.company,
            position: dto.position,
            description: dto.description,
            start_date: dto.start_date,
            end_date: dto.end_date,
            is_current: dto.is_current,
            sort_order: dto.sort_order,
        }
    }
}

impl From<&CvExperience> for CvExperienceDto {
    fn from(entry: &CvExperience) -> Self {
        Self {
            id: entry.id.clone(),
            cv_id: entry.cv_id.clone(),
            company: entry.company.clone(),
            position: entry.position.clone(),
            description: entry.description.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            is_current: entry.is_current,
            sort_order: entry.sort_order,
        }
    }
}

impl From<&CvExperience> for CvExperienceEntity {
    fn from(entry: &CvExperience) -> Self {
        Self {
            id: entry.id.clone(),
            cv_id: entry.cv_id.clone(),
            company: entry.company.clone(),
            position: entry.position.clone(),
            description: entry.description.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            is_current: entry.is_current,
            sort_order: entry.sort_order,
        }
    }
}

impl From<CvExperienceEntity> for CvExperience {
    fn from(row: CvExperienceEntity) -> Self {
        Self {
            id: row.id,
            cv_id: row.cv_id,
            company: row.company,
            position: row.position,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            is_current: row.is_current,
            sort_order: row.sort_order,
        }
    }
}

// =============================================================================
// Skills
// =============================================================================

impl From<CvSkillDto> for CvSkill {
    fn from(dto: CvSkillDto) -> Self {
        Self {
            id: dto.id,
            cv_id: dto.cv_id,
            name: dto.name,
            level: dto.level,
            sort_order: dto.sort_order,
        }
    }
}

impl From<&CvSkill> for CvSkillDto {
    fn from(skill: &CvSkill) -> Self {
        Self {
            id: skill.id.clone(),
            cv_id: skill.cv_id.clone(),
            name: skill.name.clone(),
            level: skill.level,
            sort_order: skill.sort_order,
        }
    }
}

impl From<&CvSkill> for CvSkillEntity {
    fn from(skill: &CvSkill) -> Self {
        Self {
            id: skill.id.clone(),
            cv_id: skill.cv_id.clone(),
            name: skill.name.clone(),
            level: skill.level,
            sort_order: skill.sort_order,
        }
    }
}

impl From<CvSkillEntity> for CvSkill {
    fn from(row: CvSkillEntity) -> Self {
        Self {
            id: row.id,
            cv_id: row.cv_id,
            name: row.name,
            level: row.level,
            sort_order: row.sort_order,
        }
    }
}
