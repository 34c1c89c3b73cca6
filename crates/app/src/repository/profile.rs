//! Profile repository.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{Profile, ProfileId};

use super::watch_tables;
use crate::error::RepositoryError;
use crate::local::dao::ProfileDao;
use crate::local::entities::ProfileEntity;
use crate::local::{LocalStore, Table};
use crate::remote::dto::ProfileDto;
use crate::remote::{self, Filter, RemoteBackend};

/// Local-first access to profiles.
#[derive(Clone)]
pub struct ProfileRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> ProfileRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    /// Cached profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn get(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        Ok(ProfileDao::new(&self.local).get(id).await?.map(Profile::from))
    }

    /// The cached profile, re-emitted on every change.
    pub fn observe(&self, id: &ProfileId) -> impl Stream<Item = Option<Profile>> + Send + 'static {
        let store = self.local.clone();
        let id = id.clone();

        watch_tables(&self.local, &[Table::Profiles], move || {
            let store = store.clone();
            let id = id.clone();
            async move {
                match ProfileDao::new(&store).get(&id).await {
                    Ok(row) => row.map(Profile::from),
                    Err(e) => {
                        warn!(error = %e, "Failed to load profile");
                        None
                    }
                }
            }
        })
    }

    /// Create the profile on the backend, then cache it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the backend rejects the row, or
    /// `RepositoryError::Local` if caching it fails.
    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let stored: Profile =
            remote::insert(&self.remote, Table::Profiles, &ProfileDto::from(profile))
                .await?
                .into();
        self.cache(&stored).await?;
        Ok(stored)
    }

    /// Replace the profile on the backend, then cache it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the backend rejects the row, or
    /// `RepositoryError::Local` if caching it fails.
    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let stored: Profile = remote::update(
            &self.remote,
            Table::Profiles,
            profile.id.as_str(),
            &ProfileDto::from(profile),
        )
        .await?
        .into();
        self.cache(&stored).await?;
        Ok(stored)
    }

    /// Pull the owner's profile from the backend into the cache.
    ///
    /// Returns `None` when the backend has no profile for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the pull or the cache write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let dtos: Vec<ProfileDto> =
            remote::fetch(&self.remote, Table::Profiles, &[Filter::eq("id", owner)]).await?;
        let profiles: Vec<Profile> = dtos.into_iter().map(Profile::from).collect();

        let rows: Vec<ProfileEntity> = profiles.iter().map(ProfileEntity::from).collect();
        ProfileDao::new(&self.local).upsert_all(&rows).await?;

        info!(found = !profiles.is_empty(), "Synced profile");
        Ok(profiles.into_iter().next())
    }

    async fn cache(&self, profile: &Profile) -> Result<(), RepositoryError> {
        ProfileDao::new(&self.local)
            .upsert_all(&[ProfileEntity::from(profile)])
            .await
            .inspect_err(|e| warn!(error = %e, "Backend accepted profile but caching failed"))?;
        Ok(())
    }
}
