//! CV aggregate: Cv → CvEducation, CvExperience, CvSkill.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CvEducationId, CvExperienceId, CvId, CvSkillId, ProfileId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cv {
    pub id: CvId,
    pub user_id: ProfileId,
    pub full_name: String,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub primary_color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvEducation {
    pub id: CvEducationId,
    pub cv_id: CvId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvExperience {
    pub id: CvExperienceId,
    pub cv_id: CvId,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSkill {
    pub id: CvSkillId,
    pub cv_id: CvId,
    pub name: String,
    /// 1 (basic) to 5 (expert).
    pub level: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvDetails {
    pub cv: Cv,
    pub education: Vec<CvEducation>,
    pub experience: Vec<CvExperience>,
    pub skills: Vec<CvSkill>,
}
