pub mod mapper;
pub mod ports;
pub mod service;

pub use mapper::to_deposit_init_response;
pub use ports::{
    DepositInitResponse, DepositService, DepositStatus, PaymentError, PaymentOrder,
    PaymentOrderFields, PaymentOrderPatch, PaymentOrderRecord, PaymentOrderRepository,
};
pub use service::DepositServiceImpl;
