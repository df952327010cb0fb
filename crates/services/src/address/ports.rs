use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{Document, DocumentRepository, Entity, RepositoryError};
use crate::validation::{require_non_empty, require_non_empty_opt, ValidationError};
use crate::{DocumentId, UserId};

/// Geometry kind tag stored next to the coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Point,
}

/// GeoJSON-style point. Coordinates are stored `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: GeometryKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let (lat, lon) = (self.latitude(), self.longitude());
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::new(
                "locationCoords",
                format!("latitude {lat} is outside [-90, 90]"),
            ));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::new(
                "locationCoords",
                format!("longitude {lon} is outside [-180, 180]"),
            ));
        }
        Ok(())
    }
}

/// Persisted address fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressFields {
    pub user_id: UserId,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub location: GeoPoint,
}

/// Persisted-shape fragment produced by the reverse mapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl AddressPatch {
    /// Complete field set for `create`; every field must be present.
    pub fn into_fields(self) -> Result<AddressFields, ValidationError> {
        Ok(AddressFields {
            user_id: self.user_id.ok_or_else(|| ValidationError::missing("userId"))?,
            label: self.label.ok_or_else(|| ValidationError::missing("label"))?,
            street: self.street.ok_or_else(|| ValidationError::missing("street"))?,
            city: self.city.ok_or_else(|| ValidationError::missing("city"))?,
            state: self.state.ok_or_else(|| ValidationError::missing("state"))?,
            zip: self.zip.ok_or_else(|| ValidationError::missing("zip"))?,
            location: self
                .location
                .ok_or_else(|| ValidationError::missing("locationCoords"))?,
        })
    }
}

impl Entity for AddressFields {
    const COLLECTION: &'static str = "addresses";
    type Patch = AddressPatch;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("label", &self.label)?;
        require_non_empty("street", &self.street)?;
        require_non_empty("city", &self.city)?;
        require_non_empty("state", &self.state)?;
        require_non_empty("zip", &self.zip)?;
        self.location.validate()
    }

    fn validate_patch(patch: &AddressPatch) -> Result<(), ValidationError> {
        require_non_empty_opt("label", patch.label.as_deref())?;
        require_non_empty_opt("street", patch.street.as_deref())?;
        require_non_empty_opt("city", patch.city.as_deref())?;
        require_non_empty_opt("state", patch.state.as_deref())?;
        require_non_empty_opt("zip", patch.zip.as_deref())?;
        match &patch.location {
            Some(location) => location.validate(),
            None => Ok(()),
        }
    }
}

pub type Address = Document<AddressFields>;
pub type AddressRepository = DocumentRepository<AddressFields>;

/// Address as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// `"lat,lon"`
    pub location_coords: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound create/update body. `userId` is accepted but never trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub location_coords: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Address not found")]
    NotFound,
    #[error("Address belongs to another user")]
    AccessDenied,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AddressError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            other => Self::Repository(other),
        }
    }
}

#[async_trait]
pub trait AddressService: Send + Sync {
    async fn create_address(
        &self,
        user_id: UserId,
        payload: AddressPayload,
    ) -> Result<AddressResponse, AddressError>;

    /// Addresses owned by the user, oldest first
    async fn list_addresses(&self, user_id: UserId) -> Result<Vec<AddressResponse>, AddressError>;

    async fn update_address(
        &self,
        user_id: UserId,
        address_id: DocumentId,
        payload: AddressPayload,
    ) -> Result<AddressResponse, AddressError>;

    /// Returns whether an address was removed
    async fn delete_address(
        &self,
        user_id: UserId,
        address_id: DocumentId,
    ) -> Result<bool, AddressError>;
}
