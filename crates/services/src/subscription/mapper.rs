use super::ports::{PlanResponse, SubscriptionPlan};

pub fn to_plan_dto(plan: SubscriptionPlan) -> PlanResponse {
    let fields = plan.fields;
    PlanResponse {
        id: plan.id.to_string(),
        name: fields.name,
        description: fields.description,
        price: fields.price,
        currency: fields.currency,
        interval: fields.interval,
        features: fields.features,
        monthly_tokens: fields.monthly_tokens,
        is_active: fields.is_active,
        created_at: plan.created_at,
        updated_at: plan.updated_at,
    }
}

/// Order-preserving projection of stored plans into client DTOs.
pub fn to_plan_list_dto(plans: impl IntoIterator<Item = SubscriptionPlan>) -> Vec<PlanResponse> {
    plans.into_iter().map(to_plan_dto).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Document;
    use crate::subscription::ports::{BillingInterval, SubscriptionPlanFields};
    use crate::DocumentId;
    use chrono::Utc;

    fn plan(name: &str, price: i64) -> SubscriptionPlan {
        let now = Utc::now();
        Document {
            id: DocumentId::new(),
            fields: SubscriptionPlanFields {
                name: name.to_string(),
                description: Some(format!("{name} plan")),
                price,
                currency: "INR".to_string(),
                interval: BillingInterval::Month,
                features: vec!["priority support".to_string()],
                monthly_tokens: Some(1_000_000),
                is_active: true,
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(to_plan_list_dto(Vec::new()).is_empty());
    }

    #[test]
    fn test_preserves_order_and_adds_string_id() {
        let plans = vec![plan("Pro", 99900), plan("Basic", 19900), plan("Team", 299900)];
        let ids: Vec<String> = plans.iter().map(|p| p.id.to_string()).collect();

        let dtos = to_plan_list_dto(plans);

        let names: Vec<_> = dtos.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Pro", "Basic", "Team"]);
        let dto_ids: Vec<_> = dtos.iter().map(|d| d.id.clone()).collect();
        assert_eq!(dto_ids, ids);
    }

    #[test]
    fn test_carries_every_stored_field() {
        let original = plan("Pro", 99900);
        let dto = to_plan_dto(original.clone());

        assert_eq!(dto.description, original.fields.description);
        assert_eq!(dto.price, 99900);
        assert_eq!(dto.currency, "INR");
        assert_eq!(dto.interval, BillingInterval::Month);
        assert_eq!(dto.features, original.fields.features);
        assert_eq!(dto.monthly_tokens, Some(1_000_000));
        assert!(dto.is_active);
        assert_eq!(dto.created_at, original.created_at);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(to_plan_dto(plan("Pro", 100))).unwrap();
        assert!(json["id"].is_string());
        assert_eq!(json["isActive"], true);
        assert_eq!(json["interval"], "month");
        assert_eq!(json["monthlyTokens"], 1_000_000);
    }
}
