use async_trait::async_trait;
use std::sync::Arc;

use super::mapper;
use super::ports::{
    AddressError, AddressFields, AddressPayload, AddressResponse, AddressService,
};
use crate::repository::{Filter, FindOptions, Repository};
use crate::{DocumentId, UserId};

pub struct AddressServiceImpl {
    repository: Arc<dyn Repository<AddressFields>>,
}

impl AddressServiceImpl {
    pub fn new(repository: Arc<dyn Repository<AddressFields>>) -> Self {
        Self { repository }
    }

    /// `false` if the address does not exist; an error if someone else owns it
    async fn ensure_owner(
        &self,
        user_id: UserId,
        address_id: DocumentId,
    ) -> Result<bool, AddressError> {
        match self.repository.find_by_id(address_id).await? {
            None => Ok(false),
            Some(address) if address.fields.user_id == user_id => Ok(true),
            Some(_) => {
                tracing::warn!(
                    "Address access denied: address_id={}, user_id={}",
                    address_id,
                    user_id
                );
                Err(AddressError::AccessDenied)
            }
        }
    }
}

#[async_trait]
impl AddressService for AddressServiceImpl {
    async fn create_address(
        &self,
        user_id: UserId,
        payload: AddressPayload,
    ) -> Result<AddressResponse, AddressError> {
        tracing::info!("Creating address for user_id={}", user_id);

        let fields = mapper::to_storage(user_id, payload)?.into_fields()?;
        let address = self.repository.create(fields).await?;

        tracing::info!(
            "Address created: address_id={}, user_id={}",
            address.id,
            user_id
        );

        Ok(mapper::to_external(&address))
    }

    async fn list_addresses(&self, user_id: UserId) -> Result<Vec<AddressResponse>, AddressError> {
        tracing::debug!("Listing addresses for user_id={}", user_id);

        let filter = Filter::new().eq("user_id", user_id.to_string());
        let addresses = self.repository.find(&filter, &FindOptions::new()).await?;

        Ok(addresses.iter().map(mapper::to_external).collect())
    }

    async fn update_address(
        &self,
        user_id: UserId,
        address_id: DocumentId,
        payload: AddressPayload,
    ) -> Result<AddressResponse, AddressError> {
        tracing::info!(
            "Updating address: address_id={}, user_id={}",
            address_id,
            user_id
        );

        let patch = mapper::to_storage(user_id, payload)?;
        if !self.ensure_owner(user_id, address_id).await? {
            return Err(AddressError::NotFound);
        }

        let updated = self
            .repository
            .update(address_id, patch)
            .await?
            .ok_or(AddressError::NotFound)?;

        Ok(mapper::to_external(&updated))
    }

    async fn delete_address(
        &self,
        user_id: UserId,
        address_id: DocumentId,
    ) -> Result<bool, AddressError> {
        tracing::info!(
            "Deleting address: address_id={}, user_id={}",
            address_id,
            user_id
        );

        if !self.ensure_owner(user_id, address_id).await? {
            return Ok(false);
        }

        Ok(self.repository.delete(address_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ports::AddressRepository;
    use crate::repository::InMemoryDocumentStore;

    fn service() -> AddressServiceImpl {
        let store = Arc::new(InMemoryDocumentStore::new());
        AddressServiceImpl::new(Arc::new(AddressRepository::new(store)))
    }

    fn payload(label: &str, coords: &str) -> AddressPayload {
        AddressPayload {
            user_id: None,
            label: Some(label.to_string()),
            street: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            zip: Some("62701".to_string()),
            location_coords: Some(coords.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_only_own_addresses() {
        let service = service();
        let alice = UserId::new();
        let bob = UserId::new();

        let created = service
            .create_address(alice, payload("Home", "39.7817,-89.6501"))
            .await
            .unwrap();
        service
            .create_address(bob, payload("Work", "40,-89"))
            .await
            .unwrap();

        assert_eq!(created.location_coords, "39.7817,-89.6501");
        assert_eq!(created.user_id, alice.to_string());

        let listed = service.list_addresses(alice).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_create_rejects_incomplete_payload() {
        let service = service();
        let mut body = payload("Home", "1,2");
        body.city = None;

        let err = service
            .create_address(UserId::new(), body)
            .await
            .unwrap_err();
        assert!(matches!(err, AddressError::Validation(ref v) if v.field == "city"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_label() {
        let service = service();
        let err = service
            .create_address(UserId::new(), payload(" ", "1,2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddressError::Validation(ref v) if v.field == "label"));
    }

    #[tokio::test]
    async fn test_update_changes_location() {
        let service = service();
        let user = UserId::new();
        let created = service
            .create_address(user, payload("Home", "1,2"))
            .await
            .unwrap();
        let id: DocumentId = created.id.parse().unwrap();

        let updated = service
            .update_address(
                user,
                id,
                AddressPayload {
                    location_coords: Some("3.5,4.5".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.location_coords, "3.5,4.5");
        assert_eq!(updated.label, "Home");
    }

    #[tokio::test]
    async fn test_update_by_other_user_is_denied() {
        let service = service();
        let owner = UserId::new();
        let created = service
            .create_address(owner, payload("Home", "1,2"))
            .await
            .unwrap();
        let id: DocumentId = created.id.parse().unwrap();

        let err = service
            .update_address(UserId::new(), id, payload("Mine now", "5,6"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddressError::AccessDenied));
    }

    #[tokio::test]
    async fn test_update_unknown_address_is_not_found() {
        let service = service();
        let err = service
            .update_address(UserId::new(), DocumentId::new(), payload("Home", "1,2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddressError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let user = UserId::new();
        let created = service
            .create_address(user, payload("Home", "1,2"))
            .await
            .unwrap();
        let id: DocumentId = created.id.parse().unwrap();

        assert!(service.delete_address(user, id).await.unwrap());
        assert!(!service.delete_address(user, id).await.unwrap());
        assert!(service.list_addresses(user).await.unwrap().is_empty());
    }
}
