use codebeast_server::imaging::{DallESize, ProviderKind};
use codebeast_server::models::{
    AnimalChoice, ErrorResponse, GalleryEntry, GenerateImageRequest, GenerateImageResponse,
    ParsedProfile, ProcessResponse,
};
use serde_json::json;

#[test]
fn test_animal_choice_serializes_as_pair() {
    let choice = AnimalChoice::new("Fox", "Clever");
    assert_eq!(serde_json::to_value(&choice).unwrap(), json!(["Fox", "Clever"]));

    let parsed: AnimalChoice = serde_json::from_value(json!(["Owl", "Wise"])).unwrap();
    assert_eq!(parsed, AnimalChoice::new("Owl", "Wise"));
}

#[test]
fn test_process_response_from_profile() {
    let profile = ParsedProfile {
        languages: vec!["Rust".to_string()],
        prompt: "a crab".to_string(),
        profile_url: "https://github.com/ferris".to_string(),
        repository_count: 9,
        animal_selection: vec![AnimalChoice::new("Crab", "Safe")],
    };

    let response = ProcessResponse::from(profile);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "response": "a crab",
            "languages": ["Rust"],
            "github_url": "https://github.com/ferris",
            "num_repositories": 9,
            "animal_selection": [["Crab", "Safe"]],
            "status": "success"
        })
    );
}

#[test]
fn test_generate_request_defaults() {
    let request: GenerateImageRequest = serde_json::from_value(json!({"prompt": "a cat"})).unwrap();
    assert_eq!(request.prompt, "a cat");
    assert_eq!(request.model, ProviderKind::DallE);
    assert!(request.handle.is_none());
    assert!(request.size.is_none());
    assert!(request.pixel_size.is_none());
}

#[test]
fn test_generate_request_all_fields() {
    let request: GenerateImageRequest = serde_json::from_value(json!({
        "prompt": "a frog",
        "model": "stability",
        "handle": "frogger",
        "size": "1792x1024",
        "pixel_size": 8
    }))
    .unwrap();
    assert_eq!(request.model, ProviderKind::Stability);
    assert_eq!(request.handle.as_deref(), Some("frogger"));
    assert_eq!(request.size, Some(DallESize::Landscape));
    assert_eq!(request.pixel_size, Some(8));
}

#[test]
fn test_generate_request_unknown_model_is_dall_e() {
    let request: GenerateImageRequest =
        serde_json::from_value(json!({"prompt": "x", "model": "midjourney"})).unwrap();
    assert_eq!(request.model, ProviderKind::DallE);
}

#[test]
fn test_generate_request_rejects_unsupported_size() {
    let result = serde_json::from_value::<GenerateImageRequest>(json!({"prompt": "x", "size": "512x512"}));
    assert!(result.is_err());
}

#[test]
fn test_generate_response_omits_missing_pixelated_url() {
    let response = GenerateImageResponse {
        image_url: "/static/temp/generated_a.png".to_string(),
        pixelated_url: None,
        status: "success".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"image_url": "/static/temp/generated_a.png", "status": "success"})
    );
}

#[test]
fn test_gallery_entry_camel_case() {
    let entry = GalleryEntry {
        username: "octocat".to_string(),
        image_url: "/static/temp/generated_octocat.png".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&entry).unwrap(),
        json!({"username": "octocat", "imageUrl": "/static/temp/generated_octocat.png"})
    );
}

#[test]
fn test_error_response() {
    let body = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
    assert_eq!(body, json!({"error": "boom", "status": "error"}));
}
