//! tests/scenario_tests.rs

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use serde_json::json;
    use std::sync::Arc;

    use crate::services::scenario_service::{
        parse_json_reply, IndicatorCatalog, ScenarioKind, ScenarioService,
    };
    use crate::tests::support::{memory_pool, FakeGenerator};

    #[test]
    async fn test_parse_json_reply_strips_code_fences() {
        let reply = "```json\n{\"scenario_type\": \"new_solicitation\"}\n```";
        let value = parse_json_reply(reply).unwrap();
        assert_eq!(value["scenario_type"], "new_solicitation");

        let plain = parse_json_reply("  {\"a\": 1}  ").unwrap();
        assert_eq!(plain["a"], 1);
    }

    #[test]
    async fn test_parse_json_reply_rejects_non_objects() {
        assert!(parse_json_reply("[1, 2]").is_err());
        assert!(parse_json_reply("not json").is_err());
    }

    #[test]
    async fn test_scenario_kind_parse_is_lenient() {
        assert_eq!(
            ScenarioKind::parse("Expiring Contract"),
            Some(ScenarioKind::ExpiringContract)
        );
        assert_eq!(
            ScenarioKind::parse("partnership-opportunity"),
            Some(ScenarioKind::PartnershipOpportunity)
        );
        assert_eq!(ScenarioKind::parse("unknown"), None);
    }

    #[test]
    async fn test_classify_picks_kind_with_most_hits() {
        let catalog = IndicatorCatalog::default();
        assert_eq!(
            catalog.classify("The incumbent contract is up for renewal and recompete"),
            ScenarioKind::ExpiringContract
        );
        assert_eq!(
            catalog.classify("New RFP posted, sources sought notice"),
            ScenarioKind::NewSolicitation
        );
        assert_eq!(
            catalog.classify("nothing relevant"),
            ScenarioKind::CapabilityStatement
        );
    }

    #[test]
    async fn test_extend_adds_normalized_unique_patterns() {
        let mut catalog = IndicatorCatalog::default();
        let before = catalog.indicators(ScenarioKind::PartnershipOpportunity).len();
        catalog.extend(
            ScenarioKind::PartnershipOpportunity,
            vec!["  Mentor Protege ".to_string(), "mentor protege".to_string(), "".to_string()],
        );
        let indicators = catalog.indicators(ScenarioKind::PartnershipOpportunity);
        assert_eq!(indicators.len(), before + 1);
        assert!(indicators.contains(&"mentor protege".to_string()));
    }

    #[test]
    async fn test_train_and_learn_from_feedback() {
        let pool = memory_pool().await;
        let generator = FakeGenerator::scripted(&[
            r#"{"scenario_type": "partnership", "key_points": ["teaming"]}"#,
            "```json\n{\"approach\": \"propose teaming\"}\n```",
            r#"{"new_patterns": ["prime seeking subs"], "effective_elements": []}"#,
        ]);
        let service = ScenarioService::new(pool, Arc::new(generator));

        let input = "Prime contractor looking for teaming partners";
        let training = service.train(input, None).await.unwrap();
        // "partnership" no es un tipo válido: se clasifica por indicadores
        assert_eq!(training.scenario_type, "partnership_opportunity");
        assert_eq!(
            training.response_strategy.as_ref().unwrap()["approach"],
            "propose teaming"
        );
        assert_eq!(training.success_metrics, Some(json!({})));

        let updated = service
            .learn_from_feedback(&training.id, json!({"replied": true}))
            .await
            .unwrap();
        assert_eq!(updated.success_metrics, Some(json!({"replied": true})));
        assert!(service
            .indicators(ScenarioKind::PartnershipOpportunity)
            .contains(&"prime seeking subs".to_string()));

        let all = service.list_scenarios().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    async fn test_feedback_for_unknown_scenario_is_not_found() {
        let pool = memory_pool().await;
        let service = ScenarioService::new(pool, Arc::new(FakeGenerator::always("{}")));
        let err = service
            .learn_from_feedback("missing", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
