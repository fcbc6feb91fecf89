mod common;

use common::{Language, language_schema, store};
use docmodel::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn valid_input_is_projected_onto_the_schema() {
    let store = store().await;
    let languages = store.models::<Language>();

    let input = json!({ "tag": "en", "name": "English", "rtl": false, "legacy_id": 7 });
    let language = languages.build(&input, &language_schema()).await.unwrap();

    assert_eq!(language.identifier(), None);
    assert_eq!(language.payload(), r#"{"name":"English","rtl":false,"tag":"en"}"#);
    assert_eq!(languages.count(&Filter::All).await.unwrap(), 0);
}

#[tokio::test]
async fn optional_properties_are_omitted_not_nulled() {
    let store = store().await;

    let language = store
        .models::<Language>()
        .build(&json!({ "tag": "fr", "name": "French" }), &language_schema())
        .await
        .unwrap();

    let document = language.document().unwrap();
    assert_eq!(document.get("rtl"), None);
    assert_eq!(document.get("speakers"), None);
}

#[tokio::test]
async fn rejections_follow_declaration_order() {
    let store = store().await;
    let languages = store.models::<Language>();
    let schema = language_schema();

    let cases = [
        (json!([1, 2]), BuildError::Validation(ValidationError::NotAnObject)),
        (json!({}), BuildError::Validation(ValidationError::MissingProperty("tag".into()))),
        (json!({ "tag": 1 }), BuildError::Validation(ValidationError::TypeMismatch("tag".into()))),
        (
            json!({ "tag": "en" }),
            BuildError::Validation(ValidationError::MissingProperty("name".into())),
        ),
        (
            json!({ "tag": "en", "name": "English", "speakers": 1.5 }),
            BuildError::Validation(ValidationError::TypeMismatch("speakers".into())),
        ),
    ];

    for (input, expected) in cases {
        assert_eq!(languages.build(&input, &schema).await.unwrap_err(), expected, "input: {input}");
    }
}

#[tokio::test]
async fn integers_do_not_satisfy_double_properties() {
    let store = store().await;
    let schema = Schema::builder()
        .property("ratio", ValueKind::Double, true)
        .build();

    let result = store.models::<Language>().build(&json!({ "ratio": 1 }), &schema).await;
    assert_eq!(
        result.unwrap_err(),
        BuildError::Validation(ValidationError::TypeMismatch("ratio".into()))
    );

    store.models::<Language>().build(&json!({ "ratio": 1.0 }), &schema).await.unwrap();
}

#[tokio::test]
async fn taken_unique_values_are_rejected() {
    let store = store().await;
    let languages = store.models::<Language>();
    let schema = language_schema();

    let input = json!({ "tag": "en", "name": "English" });
    let mut english = languages.build(&input, &schema).await.unwrap();
    languages.save(&mut english).await.unwrap();

    let result = languages.build(&json!({ "tag": "en", "name": "Anglais" }), &schema).await;
    assert_eq!(
        result.unwrap_err(),
        BuildError::Validation(ValidationError::UniqueConstraintViolation("tag".into()))
    );

    languages.build(&json!({ "tag": "fr", "name": "English" }), &schema).await.unwrap();
}

#[tokio::test]
async fn raw_text_is_parsed_before_building() {
    let store = store().await;
    let schema = language_schema();
    let builder = DocumentBuilder::new(&schema);

    let language: Language = builder
        .build_str(r#"{"tag": "de", "name": "German"}"#, store.backend())
        .await
        .unwrap();
    assert_eq!(language.payload(), r#"{"name":"German","tag":"de"}"#);

    let result = builder.build_str::<Language, _>("{ not json", store.backend()).await;
    assert_eq!(result.unwrap_err(), BuildError::Validation(ValidationError::NotAnObject));
}

#[tokio::test]
async fn schemas_load_from_json_configuration() {
    let schema: Schema = serde_json::from_value(json!({
        "properties": [
            { "name": "tag", "kind": "string", "required": true },
            { "name": "name", "kind": "string", "required": true },
        ],
        "unique": ["tag"],
    }))
    .unwrap();

    let store = store().await;
    let language = store
        .models::<Language>()
        .build(&json!({ "tag": "es", "name": "Spanish" }), &schema)
        .await
        .unwrap();

    assert_eq!(language.payload(), r#"{"name":"Spanish","tag":"es"}"#);
}

#[tokio::test]
async fn large_unique_integers_are_compared_exactly() {
    let store = store().await;
    let languages = store.models::<Language>();
    let schema = Schema::builder()
        .property("code", ValueKind::Int64, true)
        .unique("code")
        .build();

    let taken = json!({ "code": 9_007_199_254_740_993_i64 });
    let neighbour = json!({ "code": 9_007_199_254_740_992_i64 });

    let mut saved = languages.build(&taken, &schema).await.unwrap();
    languages.save(&mut saved).await.unwrap();

    languages.build(&neighbour, &schema).await.unwrap();
    assert_eq!(
        languages.build(&taken, &schema).await.unwrap_err(),
        BuildError::Validation(ValidationError::UniqueConstraintViolation("code".into()))
    );
}
