pub mod mapper;
pub mod ports;
pub mod service;

pub use mapper::{to_plan_dto, to_plan_list_dto};
pub use ports::{
    BillingInterval, PlanResponse, SubscriptionError, SubscriptionPlan, SubscriptionPlanFields,
    SubscriptionPlanPatch, SubscriptionPlanRepository, SubscriptionPlanService,
};
pub use service::SubscriptionPlanServiceImpl;
