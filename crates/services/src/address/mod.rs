pub mod mapper;
pub mod ports;
pub mod service;

pub use ports::{
    Address, AddressError, AddressFields, AddressPatch, AddressPayload, AddressRepository,
    AddressResponse, AddressService, GeoPoint, GeometryKind,
};
pub use service::AddressServiceImpl;
