use std::collections::BTreeSet;
use std::sync::Arc;

use shared::{Child, CreateChildRequest, SavedSnack, SaveSnackRequest, SnackSuggestion, UpdateChildRequest};
use thiserror::Error;
use tracing::info;

use crate::db::DbConnection;
use crate::suggest::SnackGenerator;

/// Failures surfaced by the domain services. The REST layer maps these onto
/// HTTP statuses and the error envelope.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request itself is unacceptable. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// The referenced row does not exist. Maps to 404.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage or generation failure. Maps to 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Service for managing the roster of children.
#[derive(Clone)]
pub struct ChildService {
    db: DbConnection,
}

impl ChildService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all children
    pub async fn list_children(&self) -> DomainResult<Vec<Child>> {
        let children = self.db.list_children().await?;
        info!("Found {} children", children.len());
        Ok(children)
    }

    /// Create a new child
    pub async fn create_child(&self, request: CreateChildRequest) -> DomainResult<Child> {
        validate_name(&request.name)?;

        let child = self
            .db
            .insert_child(request.name.trim(), &request.exclusions)
            .await?;
        info!("Created child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    /// Update an existing child. Absent fields keep their stored value.
    pub async fn update_child(&self, id: i64, request: UpdateChildRequest) -> DomainResult<Child> {
        let mut child = self
            .db
            .get_child(id)
            .await?
            .ok_or(DomainError::NotFound("Child"))?;

        if let Some(name) = request.name {
            validate_name(&name)?;
            child.name = name.trim().to_string();
        }
        if let Some(exclusions) = request.exclusions {
            child.exclusions = exclusions;
        }

        self.db.update_child(&child).await?;
        info!("Updated child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    /// Delete a child and, through the cascade, their saved snacks.
    pub async fn delete_child(&self, id: i64) -> DomainResult<()> {
        let deleted = self.db.delete_child(id).await?;
        if !deleted {
            return Err(DomainError::NotFound("Child"));
        }
        info!("Deleted child with ID: {}", id);
        Ok(())
    }
}

/// Service for suggesting snacks and managing the ones saved per child.
#[derive(Clone)]
pub struct SnackService {
    db: DbConnection,
    generator: Arc<dyn SnackGenerator>,
}

impl SnackService {
    pub fn new(db: DbConnection, generator: Arc<dyn SnackGenerator>) -> Self {
        Self { db, generator }
    }

    /// Produce a suggestion for the selected children.
    ///
    /// The exclusion lists of every selected child are unioned before asking
    /// the generator. `exists` reports whether an identical snack is already
    /// saved for the first selected child, the one a save action targets.
    pub async fn suggest(&self, child_ids: &[i64]) -> DomainResult<SnackSuggestion> {
        if child_ids.is_empty() {
            return Err(DomainError::Validation("No children selected".to_string()));
        }

        let children = self.db.children_by_ids(child_ids).await?;
        let exclusions: Vec<String> = children
            .iter()
            .flat_map(Child::exclusion_list)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            "Generating snack for {} children with {} exclusions",
            children.len(),
            exclusions.len()
        );
        let generated = self.generator.generate(&exclusions)?;

        let exists = self
            .db
            .find_saved_snack(child_ids[0], &generated.snack)
            .await?
            .is_some();

        Ok(SnackSuggestion {
            snack: generated.snack,
            image_url: generated.image_url,
            exists,
        })
    }

    /// Save a suggestion for a child. Saving the same snack text twice for
    /// one child is a no-op acknowledged with a distinct message.
    pub async fn save(&self, request: SaveSnackRequest) -> DomainResult<String> {
        if request.snack.trim().is_empty() {
            return Err(DomainError::Validation(
                "Child ID and snack are required".to_string(),
            ));
        }

        self.db
            .get_child(request.child_id)
            .await?
            .ok_or(DomainError::NotFound("Child"))?;

        if self
            .db
            .find_saved_snack(request.child_id, &request.snack)
            .await?
            .is_some()
        {
            info!(
                "Snack already saved for child {}: {}",
                request.child_id, request.snack
            );
            return Ok("Snack already saved".to_string());
        }

        self.db
            .insert_snack(request.child_id, &request.snack, &request.image_url)
            .await?;
        info!("Saved snack for child {}: {}", request.child_id, request.snack);
        Ok("Snack saved successfully".to_string())
    }

    /// List the snacks saved for one child.
    pub async fn list_saved(&self, child_id: i64) -> DomainResult<Vec<SavedSnack>> {
        let snacks = self.db.list_snacks_for_child(child_id).await?;
        info!("Found {} snacks for child {}", snacks.len(), child_id);
        Ok(snacks)
    }

    /// Delete a saved snack by id.
    pub async fn delete_saved(&self, snack_id: i64) -> DomainResult<()> {
        let deleted = self.db.delete_snack(snack_id).await?;
        if !deleted {
            return Err(DomainError::NotFound("Snack"));
        }
        info!("Deleted snack with ID: {}", snack_id);
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("Child name is required".to_string()));
    }
    if name.len() > 100 {
        return Err(DomainError::Validation(
            "Child name cannot exceed 100 characters".to_string(),
        ));
    }
    Ok(())
}
