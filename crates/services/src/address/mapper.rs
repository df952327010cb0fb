use super::ports::{Address, AddressPatch, AddressPayload, AddressResponse, GeoPoint};
use crate::validation::ValidationError;
use crate::UserId;

/// Render stored `[lon, lat]` as the external `"lat,lon"` string.
pub fn format_location_coords(point: &GeoPoint) -> String {
    format!("{},{}", point.latitude(), point.longitude())
}

/// Parse an external `"lat,lon"` string into a stored point.
pub fn parse_location_coords(raw: &str) -> Result<GeoPoint, ValidationError> {
    let mut parts = raw.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::new(
            "locationCoords",
            format!("expected \"lat,lon\", got {raw:?}"),
        ));
    };

    let latitude = parse_coordinate("latitude", lat)?;
    let longitude = parse_coordinate("longitude", lon)?;

    let point = GeoPoint::from_lat_lon(latitude, longitude);
    point.validate()?;
    Ok(point)
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ValidationError::new("locationCoords", format!("{name} {raw:?} is not a number"))
        })
}

/// Project a stored address into the client DTO.
pub fn to_external(address: &Address) -> AddressResponse {
    let fields = &address.fields;
    AddressResponse {
        id: address.id.to_string(),
        user_id: fields.user_id.to_string(),
        label: fields.label.clone(),
        street: fields.street.clone(),
        city: fields.city.clone(),
        state: fields.state.clone(),
        zip: fields.zip.clone(),
        location_coords: format_location_coords(&fields.location),
        created_at: address.created_at,
        updated_at: address.updated_at,
    }
}

/// Turn an inbound payload into a persisted-shape fragment.
///
/// The owner is always the authenticated caller; a `userId` in the payload is ignored.
/// `locationCoords` is required.
pub fn to_storage(user_id: UserId, payload: AddressPayload) -> Result<AddressPatch, ValidationError> {
    let raw = payload
        .location_coords
        .as_deref()
        .ok_or_else(|| ValidationError::missing("locationCoords"))?;
    let location = parse_location_coords(raw)?;

    if let Some(claimed) = payload.user_id.as_deref() {
        if claimed != user_id.to_string() {
            tracing::warn!(
                "Ignoring client-supplied userId={} for authenticated user_id={}",
                claimed,
                user_id
            );
        }
    }

    Ok(AddressPatch {
        user_id: Some(user_id),
        label: payload.label,
        street: payload.street,
        city: payload.city,
        state: payload.state,
        zip: payload.zip,
        location: Some(location),
    })
}
