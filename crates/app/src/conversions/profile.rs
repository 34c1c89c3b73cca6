use atomo_core::Profile;

use crate::local::entities::ProfileEntity;
use crate::remote::dto::ProfileDto;

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Self {
            id: dto.id,
            full_name: dto.full_name,
            email: dto.email,
            phone: dto.phone,
            bio: dto.bio,
            avatar_url: dto.avatar_url,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

impl From<&Profile> for ProfileEntity {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

impl From<ProfileEntity> for Profile {
    fn from(row: ProfileEntity) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            bio: row.bio,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
