//! Integration tests for the extraction pipeline (model -> parser -> matcher)
//!
//! The model is a scripted mock; catalogs are built in memory or read from
//! temporary files.

use std::sync::Arc;

use dog_assistant_agent::{ExtractionPipeline, FALLBACK_RESPONSE, SYSTEM_PROMPT};
use dog_assistant_catalog::{Catalog, KeywordMatcher, MatchConfig};
use dog_assistant_core::{LocationSuggestion, ProductRecord};
use dog_assistant_llm::{LlmError, MockBackend, Role};

fn product(name: &str, category: &str, description: &str) -> ProductRecord {
    let slug = name.to_lowercase().replace(' ', "-");
    ProductRecord {
        name: name.to_string(),
        categories: vec![category.to_string()],
        price: "$19.99".to_string(),
        description: description.to_string(),
        product_url: format!("https://shop.example.com/{}", slug),
        graphic_url: format!("https://shop.example.com/{}.png", slug),
    }
}

fn pipeline(backend: Arc<MockBackend>, catalog: Catalog) -> ExtractionPipeline {
    ExtractionPipeline::new(
        backend,
        Arc::new(catalog),
        KeywordMatcher::new(MatchConfig::detailed()),
    )
}

#[tokio::test]
async fn test_leash_request_returns_single_suggestion() {
    let backend = Arc::new(MockBackend::with_reply(
        r#"{"keywords":["leash"],"locations":[],"response":"Here's a leash for your pup!"}"#,
    ));
    let catalog = Catalog::from_records(vec![product(
        "Reflective Leash",
        "Walking",
        "Six foot nylon lead",
    )]);

    let result = pipeline(backend, catalog)
        .extract("My dog needs a new leash")
        .await
        .unwrap();

    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].name, "Reflective Leash");
    assert_eq!(result.suggestions[0].category, "Walking");
    assert_eq!(result.suggestions[0].price, "$19.99");
    assert!(result.locations.is_empty());
    assert_eq!(result.reply_text, "Here's a leash for your pup!");
}

#[tokio::test]
async fn test_truncated_output_uses_fallback() {
    let backend = Arc::new(MockBackend::with_reply(r#"{"keywords": ["toy"], "locations": ["#));
    let catalog = Catalog::from_records(vec![product("Rope Tug", "Toys", "Cotton rope")]);

    let result = pipeline(backend, catalog)
        .extract("Any toys?")
        .await
        .unwrap();

    assert!(result.locations.is_empty());
    assert!(result.suggestions.is_empty());
    assert_eq!(result.reply_text, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn test_chew_toy_matches_toy_keyword() {
    let backend = Arc::new(MockBackend::with_reply(
        r#"{"keywords":["toy"],"locations":[],"response":"Try this one"}"#,
    ));
    let catalog = Catalog::from_records(vec![
        product("Orthopedic Bed", "Beds", "Memory foam"),
        product("Durable Chew Toy", "Toys", "Tough rubber"),
    ]);

    let result = pipeline(backend, catalog)
        .extract("Something to chew on")
        .await
        .unwrap();

    let names: Vec<&str> = result.suggestions.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Durable Chew Toy"]);
}

#[tokio::test]
async fn test_incomplete_location_is_dropped() {
    let backend = Arc::new(MockBackend::with_reply(
        r#"{
            "keywords": [],
            "locations": [
                {"name": "Bark Park", "address": "12 Elm St"},
                {"name": "Mystery Vet"}
            ],
            "response": "Check out Bark Park"
        }"#,
    ));

    let result = pipeline(backend, Catalog::empty())
        .extract("Where can my dog run?")
        .await
        .unwrap();

    assert_eq!(
        result.locations,
        vec![LocationSuggestion::new("Bark Park", "12 Elm St")]
    );
    assert_eq!(result.reply_text, "Check out Bark Park");
}

#[tokio::test]
async fn test_model_failure_is_an_error() {
    let backend = Arc::new(MockBackend::with_error(LlmError::Api(
        "HTTP 401: invalid api key".to_string(),
    )));

    let err = pipeline(backend, Catalog::empty())
        .extract("hello")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invalid api key"));
}

#[tokio::test]
async fn test_absent_catalog_yields_no_products() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::load(dir.path().join("product_data.json"));
    let backend = Arc::new(MockBackend::with_reply(
        r#"{"keywords":["leash"],"locations":[],"response":"Sure"}"#,
    ));

    let result = pipeline(backend, catalog)
        .extract("leash please")
        .await
        .unwrap();

    assert!(result.suggestions.is_empty());
    assert_eq!(result.reply_text, "Sure");
}

#[tokio::test]
async fn test_anchor_terms_match_without_model_keywords() {
    let backend = Arc::new(MockBackend::with_reply(
        r#"{"keywords":[],"locations":[],"response":"Hi!"}"#,
    ));
    let catalog = Catalog::from_records(vec![
        product("Cat Scratcher", "Cats", "Sisal post"),
        product("Pet Water Fountain", "Bowls", "Filtered water"),
        product("Canine Dental Chew", "Treats", "Fresh breath"),
    ]);

    let result = pipeline(backend, catalog).extract("hi").await.unwrap();

    let names: Vec<&str> = result.suggestions.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Pet Water Fountain", "Canine Dental Chew"]);
}

#[tokio::test]
async fn test_catalog_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("product_data.json");
    std::fs::write(
        &path,
        r#"{"products": [{
            "name": "Cozy Dog Sweater",
            "categories": ["Apparel", "Winter"],
            "price": "$29.00",
            "description": "Knit sweater for small breeds",
            "productUrl": "https://shop.example.com/sweater",
            "graphicUrl": "https://shop.example.com/sweater.png"
        }]}"#,
    )
    .unwrap();

    let backend = Arc::new(MockBackend::with_reply(
        r#"Sure thing! {"keywords":["sweater","jumper"],"locations":[],"response":"Stay warm!"}"#,
    ));
    let result = pipeline(backend, Catalog::load(&path))
        .extract("It's cold, what should my pup wear?")
        .await
        .unwrap();

    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].category, "Apparel");
    assert_eq!(
        result.suggestions[0].product_url,
        "https://shop.example.com/sweater"
    );
    assert_eq!(result.reply_text, "Stay warm!");
}

#[tokio::test]
async fn test_sends_system_prompt_and_user_message() {
    let backend = Arc::new(MockBackend::with_reply("{}"));
    let pipeline = pipeline(backend.clone(), Catalog::empty());

    let result = pipeline.extract("Best food for a puppy?").await.unwrap();
    assert_eq!(result.reply_text, FALLBACK_RESPONSE);

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(calls[0][0].role, Role::System);
    assert_eq!(calls[0][0].content, SYSTEM_PROMPT);
    assert_eq!(calls[0][1].role, Role::User);
    assert_eq!(calls[0][1].content, "Best food for a puppy?");
}

#[tokio::test]
async fn test_backend_availability_passthrough() {
    let backend = Arc::new(MockBackend::new());
    let pipeline = pipeline(backend.clone(), Catalog::empty());

    assert!(pipeline.is_backend_available().await);
    backend.set_available(false);
    assert!(!pipeline.is_backend_available().await);
    assert_eq!(pipeline.model_name(), "mock");
}
