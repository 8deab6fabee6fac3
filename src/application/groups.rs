use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{CreateGroupParams, GroupsRepo, RepoError};
use crate::domain::entities::GroupRecord;
use crate::domain::error::DomainError;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};
use crate::domain::validation::{GroupDraft, validate_group_draft};

#[derive(Debug, Error)]
pub enum GroupError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupsRepo>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupsRepo>) -> Self {
        Self { groups }
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupRecord>, GroupError> {
        self.groups.list_groups().await.map_err(GroupError::from)
    }

    pub async fn find_group(&self, slug: &str) -> Result<GroupRecord, GroupError> {
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group").into())
    }

    /// Creates a group. Without an explicit slug one is derived from the title
    /// and suffixed until it is free; an explicit slug that is taken fails
    /// validation.
    pub async fn create_group(&self, draft: GroupDraft) -> Result<GroupRecord, GroupError> {
        let errors = validate_group_draft(&draft);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors).into());
        }

        let title = draft.title.trim().to_string();
        let slug = match draft.slug {
            Some(slug) => {
                if self.groups.find_by_slug(&slug).await?.is_some() {
                    return Err(slug_taken(&slug).into());
                }
                slug
            }
            None => self.derive_free_slug(&title).await?,
        };

        let params = CreateGroupParams {
            title,
            slug: slug.clone(),
            description: draft.description.trim().to_string(),
        };
        let group = match self.groups.create_group(params).await {
            Ok(group) => group,
            Err(RepoError::Duplicate { .. }) => return Err(slug_taken(&slug).into()),
            Err(err) => return Err(err.into()),
        };

        info!(
            target: "inkwell::groups",
            group_id = group.id,
            slug = %group.slug,
            "group created"
        );
        Ok(group)
    }

    /// Deletes the group; its posts stay published without a group.
    pub async fn delete_group(&self, slug: &str) -> Result<(), GroupError> {
        let group = self.find_group(slug).await?;
        self.groups.delete_group(group.id).await?;

        info!(target: "inkwell::groups", group_id = group.id, slug, "group deleted");
        Ok(())
    }

    async fn derive_free_slug(&self, title: &str) -> Result<String, GroupError> {
        let groups = self.groups.clone();
        let result = generate_unique_slug_async(title, move |candidate| {
            let groups = groups.clone();
            let candidate = candidate.to_string();
            async move {
                groups
                    .find_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await;

        match result {
            Ok(slug) => Ok(slug),
            Err(SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. })) => {
                Err(DomainError::invalid_field(
                    "slug",
                    "could not be derived from the title; supply one explicitly",
                )
                .into())
            }
            Err(SlugAsyncError::Slug(SlugError::Exhausted { base })) => {
                Err(slug_taken(&base).into())
            }
            Err(SlugAsyncError::Predicate(err)) => Err(err.into()),
        }
    }
}

fn slug_taken(slug: &str) -> DomainError {
    DomainError::invalid_field("slug", format!("`{slug}` is already in use"))
}
