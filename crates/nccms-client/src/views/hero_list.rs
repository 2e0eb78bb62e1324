//! Hero list with optimistic activate and delete

use crate::api_client::CmsClient;
use crate::error::{ClientError, ClientResult};
use crate::optimistic;
use nccms_core::{Hero, ResourceKind};
use tracing::{error, info};

const RESOURCE_LABEL: &str = "hero blocks";

/// State behind the hero management table
#[derive(Debug, Clone)]
pub struct HeroListView {
    client: CmsClient,
    heroes: Vec<Hero>,
    read_only: bool,
    error: Option<String>,
    loaded: bool,
}

impl HeroListView {
    /// Empty view; call [`Self::load`] to populate it
    #[must_use]
    pub const fn new(client: CmsClient) -> Self {
        Self {
            client,
            heroes: Vec::new(),
            read_only: false,
            error: None,
            loaded: false,
        }
    }

    /// Heroes in server order
    #[must_use]
    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    /// Whether mutations are disabled because no session remains
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Banner message from the last failed action
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a load has completed successfully
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Id of the first hero flagged active
    #[must_use]
    pub fn active_hero_id(&self) -> Option<i64> {
        self.heroes.iter().find(|hero| hero.is_active).map(|hero| hero.id)
    }

    /// Fetch the hero list
    ///
    /// An expired session falls back to a public read; the view is then
    /// read-only because no access token remains.
    ///
    /// # Errors
    ///
    /// Returns the load error; the current list is kept.
    pub async fn load(&mut self) -> ClientResult<()> {
        self.error = None;
        self.read_only = false;

        match self.client.list_heroes().await {
            Ok(heroes) => {
                self.heroes = heroes;
                self.loaded = true;
                self.read_only = !self.client.is_authenticated();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load heroes");
                self.error = Some("Could not load hero records.".to_string());
                Err(e)
            }
        }
    }

    /// Make `id` the only active hero
    ///
    /// The list changes immediately; every hero is then patched with its new
    /// flag. Any failure restores the previous list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ReadOnly`] without a session,
    /// [`ClientError::NotFound`] for an id not in the list, or the remote
    /// error after rolling back.
    pub async fn activate(&mut self, id: i64) -> ClientResult<()> {
        self.ensure_writable()?;
        self.ensure_listed(id)?;
        self.error = None;

        let client = &self.client;
        let result = optimistic::apply(
            &mut self.heroes,
            |heroes| {
                for hero in heroes.iter_mut() {
                    hero.is_active = hero.id == id;
                }
            },
            |updated| async move { client.set_active_flags(&updated).await },
        )
        .await;

        match result {
            Ok(()) => {
                info!(id, "Hero activated");
                Ok(())
            }
            Err(e) => {
                error!(id, error = %e, "Failed to activate hero");
                self.error = Some("Failed to update active hero.".to_string());
                Err(e)
            }
        }
    }

    /// Remove `id`
    ///
    /// The row disappears immediately and reappears in its original position
    /// if the server refuses.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::activate`].
    pub async fn delete(&mut self, id: i64) -> ClientResult<()> {
        self.ensure_writable()?;
        self.ensure_listed(id)?;
        self.error = None;

        let client = &self.client;
        let result = optimistic::apply(
            &mut self.heroes,
            |heroes| heroes.retain(|hero| hero.id != id),
            |_| async move { client.delete(ResourceKind::Hero, id).await },
        )
        .await;

        if let Err(e) = &result {
            error!(id, error = %e, "Failed to delete hero");
            self.error = Some("Failed to delete hero.".to_string());
        }
        result
    }

    fn ensure_writable(&mut self) -> ClientResult<()> {
        if self.read_only {
            let err = ClientError::read_only(RESOURCE_LABEL);
            self.error = Some(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn ensure_listed(&self, id: i64) -> ClientResult<()> {
        if self.heroes.iter().any(|hero| hero.id == id) {
            Ok(())
        } else {
            Err(ClientError::NotFound {
                resource: format!("hero {id}"),
            })
        }
    }
}
